/// Operation catalogue and the uniform result envelope
///
/// Every endpoint answers with the same `{ok, kind?, message, data?}` shape,
/// whatever the transport and whatever went wrong.

use crate::shared::error::{DeviceError, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// 一个对外暴露的设备操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// CLI: 创建loopback
    CreateLoopback,
    /// CLI: 列出接口
    ListInterfaces,
    /// CLI: 删除loopback
    RemoveLoopback,
    /// NETCONF: 配置loopback
    ConfigureLoopback,
    /// NETCONF: 删除loopback
    DeleteLoopback,
    /// NETCONF: 读取loopback
    ShowLoopback,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::CreateLoopback,
        Operation::ListInterfaces,
        Operation::RemoveLoopback,
        Operation::ConfigureLoopback,
        Operation::DeleteLoopback,
        Operation::ShowLoopback,
    ];

    /// 日志与指标中使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateLoopback => "create_loopback",
            Operation::ListInterfaces => "list_interfaces",
            Operation::RemoveLoopback => "remove_loopback",
            Operation::ConfigureLoopback => "configure_loopback",
            Operation::DeleteLoopback => "delete_loopback",
            Operation::ShowLoopback => "show_loopback",
        }
    }

    /// `cli` 或 `netconf`
    pub fn variant(&self) -> &'static str {
        match self {
            Operation::CreateLoopback | Operation::ListInterfaces | Operation::RemoveLoopback => {
                "cli"
            }
            Operation::ConfigureLoopback | Operation::DeleteLoopback | Operation::ShowLoopback => {
                "netconf"
            }
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Operation::ListInterfaces | Operation::ShowLoopback)
    }

    /// HTTP路径
    pub fn path(&self) -> &'static str {
        match self {
            Operation::CreateLoopback => "/create-loopback",
            Operation::ListInterfaces => "/list-interfaces",
            Operation::RemoveLoopback => "/remove-loopback",
            Operation::ConfigureLoopback => "/configure-loopback",
            Operation::DeleteLoopback => "/delete-loopback",
            Operation::ShowLoopback => "/show-loopback",
        }
    }

    /// Path kept for clients of the older Flask services
    pub fn legacy_path(&self) -> &'static str {
        match self {
            Operation::CreateLoopback => "/loopback_configuration",
            Operation::ListInterfaces => "/list_interfaces",
            Operation::RemoveLoopback => "/remove_loopback",
            Operation::ConfigureLoopback => "/netconf_loopback_configuration",
            Operation::DeleteLoopback => "/netconf_delete_loopback",
            Operation::ShowLoopback => "/netconf_show_loopback",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.path() == path || op.legacy_path() == path)
    }

    /// 成功时的提示信息
    pub fn success_message(&self) -> &'static str {
        match self {
            Operation::CreateLoopback => "Configuration done successfully",
            Operation::ListInterfaces => "Interfaces retrieved successfully",
            Operation::RemoveLoopback => "Loopback Configuration deleted successfully",
            Operation::ConfigureLoopback => "Loopback interface configured successfully",
            Operation::DeleteLoopback => "Loopback interface deleted successfully",
            Operation::ShowLoopback => "Loopback interface retrieved successfully",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 统一的操作结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl OperationResult {
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self {
            ok: true,
            kind: None,
            message: message.into(),
            data: Some(data),
        }
    }

    /// 失败结果；设备拒绝时附带设备原始输出
    pub fn failure(error: &DeviceError) -> Self {
        Self {
            ok: false,
            kind: Some(error.kind()),
            message: error.to_string(),
            data: error.device_output().map(|output| json!({ "response": output })),
        }
    }
}
