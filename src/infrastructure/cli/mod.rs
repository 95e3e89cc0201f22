/// Interactive CLI transport over SSH
///
/// - `stream`: prompt-driven command execution over any byte stream
/// - `SshCliConnector`: opens a shell channel and prepares the terminal

pub mod stream;

use crate::domain::platform::DevicePlatform;
use crate::infrastructure::ssh::{SshConnector, SshLink};
use crate::infrastructure::traits::{CliConnector, CliSession, ManagedSession};
use crate::shared::error::DeviceError;
use async_trait::async_trait;
use std::sync::Arc;
use stream::PromptStream;
use tracing::{debug, info, warn};

/// SSH交互式CLI连接器
pub struct SshCliConnector {
    ssh: Arc<SshConnector>,
    platform: DevicePlatform,
}

impl SshCliConnector {
    pub fn new(ssh: Arc<SshConnector>, platform: DevicePlatform) -> Self {
        Self { ssh, platform }
    }

    async fn prepare(&self, link: &SshLink) -> Result<PromptStream, DeviceError> {
        let mut prompt = PromptStream::new(link.shell().await?);
        let banner = prompt.read_until_prompt().await?;
        debug!(banner_len = banner.len(), "shell ready");

        for command in self.platform.session_setup_commands() {
            prompt.execute(command).await?;
        }
        Ok(prompt)
    }
}

#[async_trait]
impl CliConnector for SshCliConnector {
    async fn connect(&self) -> Result<Box<dyn CliSession>, DeviceError> {
        let credentials = self.ssh.credentials();
        let link = self.ssh.open(credentials.ssh_port).await?;

        match self.prepare(&link).await {
            Ok(prompt) => {
                info!(
                    host = %credentials.host,
                    user = %credentials.username,
                    platform = %self.platform,
                    "admin logged in"
                );
                Ok(Box::new(SshCliSession { link, prompt }))
            }
            Err(e) => {
                let _ = link.disconnect().await;
                Err(e)
            }
        }
    }
}

/// 一个打开的交互式会话
pub struct SshCliSession {
    link: SshLink,
    prompt: PromptStream,
}

#[async_trait]
impl ManagedSession for SshCliSession {
    async fn close(&mut self) -> Result<(), DeviceError> {
        if let Err(e) = self.prompt.shutdown().await {
            warn!(error = %e, "shell channel shutdown failed");
        }
        self.link.disconnect().await
    }
}

#[async_trait]
impl CliSession for SshCliSession {
    async fn send_command(&mut self, command: &str) -> Result<String, DeviceError> {
        debug!(command, "sending command");
        self.prompt.execute(command).await
    }
}
