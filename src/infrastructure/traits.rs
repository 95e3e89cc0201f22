/// 设备会话核心trait定义
///
/// Session Manager 只依赖这些trait；SSH实现与测试用的内存设备都实现它们。

use crate::infrastructure::netconf::reply::RpcReply;
use crate::infrastructure::netconf::rpc::Datastore;
use crate::shared::error::DeviceError;
use async_trait::async_trait;

/// 可关闭的设备会话
#[async_trait]
pub trait ManagedSession: Send {
    /// 关闭会话
    ///
    /// 必须可以在任何状态下调用，包括上一条命令失败之后
    async fn close(&mut self) -> Result<(), DeviceError>;
}

/// 交互式CLI会话
#[async_trait]
pub trait CliSession: ManagedSession {
    /// 发送一行命令，返回设备输出（不含回显与提示符）
    async fn send_command(&mut self, command: &str) -> Result<String, DeviceError>;
}

/// CLI会话工厂
#[async_trait]
pub trait CliConnector: Send + Sync {
    /// 打开一个新的已认证会话
    async fn connect(&self) -> Result<Box<dyn CliSession>, DeviceError>;
}

/// NETCONF会话
#[async_trait]
pub trait NetconfSession: ManagedSession {
    /// `<edit-config>`，`config` 为完整的 `<config>` 元素
    async fn edit_config(&mut self, target: Datastore, config: &str) -> Result<RpcReply, DeviceError>;

    /// `<get-config>`，`filter` 为完整的 `<filter>` 元素
    async fn get_config(&mut self, source: Datastore, filter: &str) -> Result<RpcReply, DeviceError>;
}

/// NETCONF会话工厂
#[async_trait]
pub trait NetconfConnector: Send + Sync {
    /// 打开一个新的会话（完成hello交换）
    async fn connect(&self) -> Result<Box<dyn NetconfSession>, DeviceError>;
}
