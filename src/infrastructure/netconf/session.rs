/// NETCONF 会话（RFC 6241 / RFC 6242）
///
/// `NetconfStream` 处理任意字节流上的hello交换、分帧切换与RPC往返；
/// `SshNetconfConnector` 在SSH `netconf` 子系统上建立它。

use super::codec::{Framing, NetconfCodec};
use super::reply::{RpcReply, ServerHello};
use super::rpc::{self, Datastore, CAPABILITY_BASE_1_1};
use crate::infrastructure::ssh::{ByteStream, SshConnector, SshLink};
use crate::infrastructure::traits::{ManagedSession, NetconfConnector, NetconfSession};
use crate::shared::error::DeviceError;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

pub const NETCONF_SUBSYSTEM: &str = "netconf";

/// 已完成hello交换的NETCONF流
pub struct NetconfStream {
    framed: Framed<Box<dyn ByteStream>, NetconfCodec>,
    next_message_id: u64,
    server: ServerHello,
}

impl NetconfStream {
    /// 交换hello；双方都支持 base:1.1 时切换到分块分帧
    pub async fn establish(stream: Box<dyn ByteStream>) -> Result<Self, DeviceError> {
        let mut framed = Framed::new(stream, NetconfCodec::new());

        framed.send(rpc::hello()).await?;
        let raw = framed.next().await.ok_or_else(|| {
            DeviceError::Transport("session closed before NETCONF hello".to_string())
        })??;
        let server = ServerHello::parse(&raw)?;

        if server.supports(CAPABILITY_BASE_1_1) {
            framed.codec_mut().set_framing(Framing::Chunked);
        }
        debug!(
            session_id = ?server.session_id,
            capabilities = server.capabilities.len(),
            framing = ?framed.codec().framing(),
            "netconf hello exchanged"
        );

        Ok(Self {
            framed,
            next_message_id: 101,
            server,
        })
    }

    pub fn server(&self) -> &ServerHello {
        &self.server
    }

    /// 发送一个RPC并等待对应的reply
    pub async fn call(&mut self, operation: String) -> Result<RpcReply, DeviceError> {
        let message_id = self.next_message_id;
        self.next_message_id += 1;

        self.framed.send(rpc::rpc(message_id, &operation)).await?;
        let raw = self.framed.next().await.ok_or_else(|| {
            DeviceError::Transport(format!("session closed awaiting reply to message {}", message_id))
        })??;

        let reply = RpcReply::parse(&raw)?;
        let expected = message_id.to_string();
        if reply.message_id.as_deref() != Some(expected.as_str()) {
            return Err(DeviceError::Transport(format!(
                "reply message-id {:?} does not match request {}",
                reply.message_id, message_id
            )));
        }
        Ok(reply)
    }

    /// `<close-session/>`，设备可能在回复后直接断开
    pub async fn close_session(&mut self) -> Result<(), DeviceError> {
        self.call(rpc::close_session()).await?.into_result()?;
        Ok(())
    }
}

/// SSH上的NETCONF连接器
pub struct SshNetconfConnector {
    ssh: Arc<SshConnector>,
}

impl SshNetconfConnector {
    pub fn new(ssh: Arc<SshConnector>) -> Self {
        Self { ssh }
    }
}

#[async_trait]
impl NetconfConnector for SshNetconfConnector {
    async fn connect(&self) -> Result<Box<dyn NetconfSession>, DeviceError> {
        let credentials = self.ssh.credentials();
        let link = self.ssh.open(credentials.netconf_port).await?;

        let stream = match link.subsystem(NETCONF_SUBSYSTEM).await {
            Ok(channel) => NetconfStream::establish(channel).await,
            Err(e) => Err(e),
        };

        match stream {
            Ok(stream) => {
                info!(
                    host = %credentials.host,
                    user = %credentials.username,
                    session_id = ?stream.server().session_id,
                    "admin logged in via netconf"
                );
                Ok(Box::new(SshNetconfSession { stream, link }))
            }
            Err(e) => {
                let _ = link.disconnect().await;
                Err(e)
            }
        }
    }
}

pub struct SshNetconfSession {
    stream: NetconfStream,
    link: SshLink,
}

#[async_trait]
impl ManagedSession for SshNetconfSession {
    async fn close(&mut self) -> Result<(), DeviceError> {
        if let Err(e) = self.stream.close_session().await {
            warn!(error = %e, "close-session failed, dropping connection");
        }
        self.link.disconnect().await
    }
}

#[async_trait]
impl NetconfSession for SshNetconfSession {
    async fn edit_config(&mut self, target: Datastore, config: &str) -> Result<RpcReply, DeviceError> {
        self.stream.call(rpc::edit_config(target, config)).await
    }

    async fn get_config(&mut self, source: Datastore, filter: &str) -> Result<RpcReply, DeviceError> {
        self.stream.call(rpc::get_config(source, filter)).await
    }
}
