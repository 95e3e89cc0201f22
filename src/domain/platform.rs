/// Device Platforms
///
/// Each platform knows how to render a loopback into CLI config lines, how
/// its configuration is committed, and which output lines mean the device
/// refused a command. Commands are built from typed values only.

use crate::domain::loopback::{InterfaceId, LoopbackSpec};
use std::fmt;
use std::str::FromStr;

/// 平台拒绝命令时的输出标记
const REJECTION_MARKERS: &[&str] = &[
    "% Invalid input",
    "% Incomplete command",
    "% Ambiguous command",
    "% Failed to commit",
    "% Invalid",
    "% Error",
];

/// XR在提交内容为空时的提示
const NOOP_COMMIT_MARKER: &str = "% No configuration changes to commit";

/// 设备平台（对应环境变量 DEVICE_TYPE）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePlatform {
    /// Cisco IOS-XR：候选配置 + commit
    #[default]
    CiscoXr,
    /// Cisco IOS/IOS-XE：逐行生效
    CiscoIos,
}

impl DevicePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePlatform::CiscoXr => "cisco_xr",
            DevicePlatform::CiscoIos => "cisco_ios",
        }
    }

    /// 是否支持原子提交
    pub fn has_atomic_commit(&self) -> bool {
        matches!(self, DevicePlatform::CiscoXr)
    }

    /// 会话建立后执行，关闭分页
    pub fn session_setup_commands(&self) -> &'static [&'static str] {
        &["terminal length 0"]
    }

    pub fn list_interfaces_command(&self) -> &'static str {
        "show interfaces"
    }

    pub fn config_mode_command(&self) -> &'static str {
        "configure terminal"
    }

    /// 出错时丢弃未提交的改动并退出配置模式
    pub fn abort_command(&self) -> &'static str {
        match self {
            DevicePlatform::CiscoXr => "abort",
            DevicePlatform::CiscoIos => "end",
        }
    }

    /// Lines that configure one loopback (without mode/commit framing)
    pub fn create_lines(&self, spec: &LoopbackSpec) -> Vec<String> {
        let mut lines = vec![format!("interface {}", spec.id.name())];
        if let Some(description) = &spec.description {
            lines.push(format!("description {}", description));
        }
        let family = match self {
            DevicePlatform::CiscoXr => "ipv4",
            DevicePlatform::CiscoIos => "ip",
        };
        lines.push(format!(
            "{} address {} {}",
            family,
            spec.ipv4.address,
            spec.ipv4.netmask()
        ));
        lines
    }

    pub fn delete_lines(&self, id: InterfaceId) -> Vec<String> {
        vec![format!("no interface {}", id.name())]
    }

    /// Full command sequence: enter config mode, body, commit, leave.
    pub fn config_set(&self, body: Vec<String>) -> Vec<String> {
        let mut commands = Vec::with_capacity(body.len() + 3);
        commands.push(self.config_mode_command().to_string());
        commands.extend(body);
        if self.has_atomic_commit() {
            commands.push("commit".to_string());
        }
        commands.push("end".to_string());
        commands
    }

    /// Returns the first output line that signals a refused command.
    pub fn detect_rejection(&self, output: &str) -> Option<String> {
        output
            .lines()
            .map(str::trim)
            .find(|line| REJECTION_MARKERS.iter().any(|marker| line.starts_with(marker)))
            .map(str::to_string)
    }

    /// 提交未产生任何改动（例如删除不存在的接口）
    pub fn is_noop_commit(&self, output: &str) -> bool {
        self.has_atomic_commit() && output.lines().any(|l| l.trim().starts_with(NOOP_COMMIT_MARKER))
    }
}

impl fmt::Display for DevicePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DevicePlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cisco_xr" | "iosxr" | "cisco_iosxr" => Ok(DevicePlatform::CiscoXr),
            "cisco_ios" | "ios" | "cisco_xe" | "iosxe" => Ok(DevicePlatform::CiscoIos),
            other => Err(format!(
                "unsupported device type '{}' (expected cisco_xr or cisco_ios)",
                other
            )),
        }
    }
}
