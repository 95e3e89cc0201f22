/// CLI Loopback Service - Interactive Session Manager
///
/// Drives the device's command line: one fresh session per call, commands
/// built from validated domain values, output checked line by line for the
/// platform's rejection markers.
///
/// ## Workflow
/// 1. Validate the request (`InvalidInput` never opens a session)
/// 2. Build the command set for the platform
/// 3. Run it inside `SessionScope` (open → act → close)
/// 4. Return the device transcript

use super::session_scope::SessionScope;
use crate::application::outcome::Operation;
use crate::domain::platform::DevicePlatform;
use crate::domain::validation::LoopbackValidator;
use crate::infrastructure::traits::{CliConnector, CliSession};
use crate::shared::error::DeviceError;
use crate::shared::protocol::LoopbackRequest;
use std::sync::Arc;
use tracing::{debug, warn};

/// CLI变体的会话管理器
pub struct CliLoopbackService {
    connector: Arc<dyn CliConnector>,
    platform: DevicePlatform,
    validator: LoopbackValidator,
    scope: SessionScope,
}

impl CliLoopbackService {
    pub fn new(
        connector: Arc<dyn CliConnector>,
        platform: DevicePlatform,
        validator: LoopbackValidator,
        scope: SessionScope,
    ) -> Self {
        Self {
            connector,
            platform,
            validator,
            scope,
        }
    }

    /// 执行只读的接口列表命令
    pub async fn list_interfaces(&self) -> Result<String, DeviceError> {
        let platform = self.platform;
        let command = platform.list_interfaces_command();

        self.scope
            .run(
                Operation::ListInterfaces,
                None,
                self.connector.connect(),
                move |session: &mut (dyn CliSession + 'static)| {
                    Box::pin(async move {
                        let output = session.send_command(command).await?;
                        match platform.detect_rejection(&output) {
                            Some(line) => Err(DeviceError::rejected(line, Some(output))),
                            None => Ok(output),
                        }
                    })
                },
            )
            .await
    }

    /// 创建loopback
    ///
    /// 返回完整的配置会话记录
    pub async fn create_loopback(&self, request: &LoopbackRequest) -> Result<String, DeviceError> {
        let spec = self.validator.validate_create(request)?;
        let platform = self.platform;
        let commands = platform.config_set(platform.create_lines(&spec));

        self.scope
            .run(
                Operation::CreateLoopback,
                Some(spec.id),
                self.connector.connect(),
                move |session: &mut (dyn CliSession + 'static)| {
                    Box::pin(apply_config_set(session, platform, commands))
                },
            )
            .await
    }

    /// 删除loopback
    ///
    /// 提交未产生改动时视为接口不存在，返回 `DeviceRejected`
    pub async fn delete_loopback(&self, request: &LoopbackRequest) -> Result<String, DeviceError> {
        let id = self.validator.validate_target(request)?;
        let platform = self.platform;
        let commands = platform.config_set(platform.delete_lines(id));

        self.scope
            .run(
                Operation::RemoveLoopback,
                Some(id),
                self.connector.connect(),
                move |session: &mut (dyn CliSession + 'static)| {
                    Box::pin(async move {
                        let transcript = apply_config_set(session, platform, commands).await?;
                        if platform.is_noop_commit(&transcript) {
                            return Err(DeviceError::rejected(
                                format!("{} is not configured: no configuration changes to commit", id.name()),
                                Some(transcript),
                            ));
                        }
                        Ok(transcript)
                    })
                },
            )
            .await
    }
}

/// Sends each line in order and stops at the first refused one.
///
/// On refusal the pending changes are dropped with the platform's abort
/// command before the rejection is returned.
async fn apply_config_set(
    session: &mut dyn CliSession,
    platform: DevicePlatform,
    commands: Vec<String>,
) -> Result<String, DeviceError> {
    let mut transcript = String::new();

    for command in &commands {
        let output = session.send_command(command).await?;
        transcript.push_str(command);
        transcript.push('\n');
        if !output.is_empty() {
            transcript.push_str(&output);
            if !output.ends_with('\n') {
                transcript.push('\n');
            }
        }

        if let Some(line) = platform.detect_rejection(&output) {
            debug!(command = %command, "device refused command, aborting");
            if let Err(e) = session.send_command(platform.abort_command()).await {
                warn!(error = %e, "abort after refused command failed");
            }
            return Err(DeviceError::rejected(
                format!("{} (while sending '{}')", line, command),
                Some(transcript),
            ));
        }
    }

    Ok(transcript)
}
