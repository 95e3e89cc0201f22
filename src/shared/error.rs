//! Device Error Taxonomy
//!
//! 所有设备操作统一返回 `Result<T, DeviceError>`。错误按类别区分，
//! 调用方可以据此决定是否重试（传输错误可重试，设备拒绝不可重试）。

use crate::domain::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 错误类别，序列化后出现在响应的 `kind` 字段中
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// SSH认证失败或主机密钥被拒绝
    AuthError,
    /// 网络/会话层失败
    TransportError,
    /// 设备执行了命令但拒绝了它
    DeviceRejected,
    /// 本地输入校验失败，未联系设备
    InvalidInput,
    /// 操作超时
    Timeout,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthError => "AuthError",
            ErrorKind::TransportError => "TransportError",
            ErrorKind::DeviceRejected => "DeviceRejected",
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::Timeout => "Timeout",
        }
    }

    /// 是否意味着设备当前不可达
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            ErrorKind::AuthError | ErrorKind::TransportError | ErrorKind::Timeout
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 设备操作错误
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("device rejected the request: {message}")]
    DeviceRejected {
        message: String,
        /// 设备的原始输出（CLI记录或rpc-reply）
        output: Option<String>,
    },

    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },
}

impl DeviceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeviceError::Auth(_) => ErrorKind::AuthError,
            DeviceError::Transport(_) => ErrorKind::TransportError,
            DeviceError::DeviceRejected { .. } => ErrorKind::DeviceRejected,
            DeviceError::InvalidInput(_) => ErrorKind::InvalidInput,
            DeviceError::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    pub fn rejected(message: impl Into<String>, output: impl Into<Option<String>>) -> Self {
        DeviceError::DeviceRejected {
            message: message.into(),
            output: output.into(),
        }
    }

    /// 设备返回的原始输出（仅DeviceRejected携带）
    pub fn device_output(&self) -> Option<&str> {
        match self {
            DeviceError::DeviceRejected { output, .. } => output.as_deref(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DeviceError {
    fn from(err: std::io::Error) -> Self {
        DeviceError::Transport(err.to_string())
    }
}
