/// NETCONF Loopback Service - Structured Session Manager
///
/// Same lifecycle as the CLI service, with XML payloads built by
/// `infrastructure::netconf::rpc` and replies judged by their parsed
/// structure. Edits target the running datastore.

use super::session_scope::SessionScope;
use crate::application::outcome::Operation;
use crate::domain::loopback::{InterfaceConfig, InterfaceId};
use crate::domain::validation::LoopbackValidator;
use crate::infrastructure::netconf::reply::parse_interfaces;
use crate::infrastructure::netconf::rpc::{self, Datastore};
use crate::infrastructure::netconf::RpcReply;
use crate::infrastructure::traits::{NetconfConnector, NetconfSession};
use crate::shared::error::DeviceError;
use crate::shared::protocol::LoopbackRequest;
use serde::Serialize;
use std::sync::Arc;

/// `show_loopback` 的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopbackView {
    /// 设备上不存在该接口时为 `None`
    pub interface: Option<InterfaceConfig>,
    /// `<data>` 子树原文
    pub xml: String,
}

/// NETCONF变体的会话管理器
pub struct NetconfLoopbackService {
    connector: Arc<dyn NetconfConnector>,
    validator: LoopbackValidator,
    scope: SessionScope,
}

impl NetconfLoopbackService {
    pub fn new(
        connector: Arc<dyn NetconfConnector>,
        validator: LoopbackValidator,
        scope: SessionScope,
    ) -> Self {
        Self {
            connector,
            validator,
            scope,
        }
    }

    /// 创建或更新loopback
    pub async fn configure_loopback(&self, request: &LoopbackRequest) -> Result<RpcReply, DeviceError> {
        let spec = self.validator.validate_create(request)?;
        let config = rpc::loopback_config(&spec);

        self.edit(Operation::ConfigureLoopback, spec.id, config).await
    }

    /// 删除loopback；设备上不存在时设备返回 `<rpc-error>`
    pub async fn delete_loopback(&self, request: &LoopbackRequest) -> Result<RpcReply, DeviceError> {
        let id = self.validator.validate_target(request)?;
        let config = rpc::loopback_delete(id);

        self.edit(Operation::DeleteLoopback, id, config).await
    }

    /// 读取单个loopback的运行配置
    pub async fn show_loopback(&self, request: &LoopbackRequest) -> Result<LoopbackView, DeviceError> {
        let id = self.validator.validate_target(request)?;
        let filter = rpc::loopback_filter(id);

        self.scope
            .run(
                Operation::ShowLoopback,
                Some(id),
                self.connector.connect(),
                move |session: &mut (dyn NetconfSession + 'static)| {
                    Box::pin(async move {
                        let reply = session
                            .get_config(Datastore::Running, &filter)
                            .await?
                            .into_result()?;
                        let xml = reply.data().unwrap_or_default().to_string();
                        let interface = find_interface(&xml, id)?;
                        Ok(LoopbackView { interface, xml })
                    })
                },
            )
            .await
    }

    async fn edit(
        &self,
        operation: Operation,
        id: InterfaceId,
        config: String,
    ) -> Result<RpcReply, DeviceError> {
        self.scope
            .run(
                operation,
                Some(id),
                self.connector.connect(),
                move |session: &mut (dyn NetconfSession + 'static)| {
                    Box::pin(async move {
                        session
                            .edit_config(Datastore::Running, &config)
                            .await?
                            .expect_ok()
                    })
                },
            )
            .await
    }
}

fn find_interface(xml: &str, id: InterfaceId) -> Result<Option<InterfaceConfig>, DeviceError> {
    if xml.is_empty() {
        return Ok(None);
    }
    Ok(parse_interfaces(xml)?
        .into_iter()
        .map(|entry| entry.config)
        .find(|config| config.id == Some(id.number())))
}
