/// SSH 连接层（russh）
///
/// 负责建立经过认证的SSH连接，并按需打开交互式shell或 `netconf` 子系统通道。
/// 主机密钥默认按 known_hosts 校验；关闭校验必须显式配置，并在每次连接时告警。

use crate::shared::error::DeviceError;
use async_trait::async_trait;
use russh::client;
use russh_keys::key::PublicKey;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, warn};

/// 会话字节流（SSH通道或测试用的内存管道）
pub trait ByteStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> ByteStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// 设备凭据，进程启动时读取一次
#[derive(Clone)]
pub struct DeviceCredentials {
    pub host: String,
    pub username: String,
    pub password: String,
    pub ssh_port: u16,
    pub netconf_port: u16,
}

impl fmt::Debug for DeviceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCredentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("ssh_port", &self.ssh_port)
            .field("netconf_port", &self.netconf_port)
            .finish()
    }
}

/// 主机密钥校验策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// 按 known_hosts 文件校验
    KnownHosts(PathBuf),
    /// 接受任意主机密钥（显式关闭校验）
    AcceptAny,
}

/// russh 客户端回调：只负责主机密钥校验
pub struct HostKeyCheck {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
}

#[async_trait]
impl client::Handler for HostKeyCheck {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint();
        match &self.policy {
            HostKeyPolicy::AcceptAny => {
                warn!(
                    host = %self.host,
                    port = self.port,
                    %fingerprint,
                    "host key verification disabled, accepting unverified key"
                );
                Ok(true)
            }
            HostKeyPolicy::KnownHosts(path) => {
                match russh_keys::check_known_hosts_path(&self.host, self.port, server_public_key, path) {
                    Ok(true) => {
                        debug!(host = %self.host, %fingerprint, "host key verified");
                        Ok(true)
                    }
                    Ok(false) => {
                        error!(
                            host = %self.host,
                            known_hosts = %path.display(),
                            %fingerprint,
                            "host key not present in known_hosts"
                        );
                        Ok(false)
                    }
                    Err(e) => {
                        error!(host = %self.host, %fingerprint, error = %e, "host key check failed");
                        Ok(false)
                    }
                }
            }
        }
    }
}

/// SSH连接器，每次调用 `open` 建立一条新连接
pub struct SshConnector {
    credentials: Arc<DeviceCredentials>,
    host_keys: HostKeyPolicy,
    config: Arc<client::Config>,
}

impl SshConnector {
    pub fn new(credentials: DeviceCredentials, host_keys: HostKeyPolicy) -> Self {
        let config = client::Config {
            inactivity_timeout: Some(Duration::from_secs(300)),
            ..Default::default()
        };
        Self {
            credentials: Arc::new(credentials),
            host_keys,
            config: Arc::new(config),
        }
    }

    pub fn credentials(&self) -> &DeviceCredentials {
        &self.credentials
    }

    /// 建立连接并完成密码认证
    pub async fn open(&self, port: u16) -> Result<SshLink, DeviceError> {
        let handler = HostKeyCheck {
            host: self.credentials.host.clone(),
            port,
            policy: self.host_keys.clone(),
        };

        let mut handle = client::connect(
            self.config.clone(),
            (self.credentials.host.as_str(), port),
            handler,
        )
        .await
        .map_err(|e| self.connect_error(port, e))?;

        let authenticated = handle
            .authenticate_password(
                self.credentials.username.as_str(),
                self.credentials.password.as_str(),
            )
            .await
            .map_err(transport)?;

        if !authenticated {
            let _ = handle
                .disconnect(russh::Disconnect::ByApplication, "", "English")
                .await;
            return Err(DeviceError::Auth(format!(
                "password rejected for user '{}' on {}:{}",
                self.credentials.username, self.credentials.host, port
            )));
        }

        debug!(host = %self.credentials.host, port, "ssh session authenticated");
        Ok(SshLink { handle })
    }

    fn connect_error(&self, port: u16, err: russh::Error) -> DeviceError {
        match err {
            russh::Error::UnknownKey => DeviceError::Auth(format!(
                "host key for {}:{} was not accepted",
                self.credentials.host, port
            )),
            other => DeviceError::Transport(format!(
                "unable to connect to {}:{}: {}",
                self.credentials.host, port, other
            )),
        }
    }
}

/// 一条已认证的SSH连接
pub struct SshLink {
    handle: client::Handle<HostKeyCheck>,
}

impl SshLink {
    /// 打开带PTY的交互式shell
    pub async fn shell(&self) -> Result<Box<dyn ByteStream>, DeviceError> {
        let mut channel = self.handle.channel_open_session().await.map_err(transport)?;
        channel
            .request_pty(false, "vt100", 511, 24, 0, 0, &[])
            .await
            .map_err(transport)?;
        channel.request_shell(false).await.map_err(transport)?;
        Ok(Box::new(channel.into_stream()))
    }

    /// 打开SSH子系统（如 `netconf`）
    pub async fn subsystem(&self, name: &str) -> Result<Box<dyn ByteStream>, DeviceError> {
        let channel = self.handle.channel_open_session().await.map_err(transport)?;
        channel
            .request_subsystem(false, name)
            .await
            .map_err(transport)?;
        Ok(Box::new(channel.into_stream()))
    }

    pub async fn disconnect(&self) -> Result<(), DeviceError> {
        self.handle
            .disconnect(russh::Disconnect::ByApplication, "", "English")
            .await
            .map_err(transport)
    }
}

fn transport(err: russh::Error) -> DeviceError {
    DeviceError::Transport(err.to_string())
}
