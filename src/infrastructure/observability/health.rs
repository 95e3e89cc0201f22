//! Health Check Endpoint
//!
//! 报告进程存活状态与最近一次设备操作的结果
//!
//! ## 健康检查端点
//! - `/health` - 详细状态
//! - `/health/ready` - 就绪检查（最近一次设备联系是否成功）
//! - `/health/live` - 存活检查
//!
//! ## 响应格式
//! ```json
//! {
//!   "status": "healthy",
//!   "uptime_seconds": 3600,
//!   "version": "0.1.0",
//!   "timestamp": 1234567890,
//!   "details": { "dry_run": false, "device": "10.10.20.48", "last_outcome": null }
//! }
//! ```

use crate::shared::error::ErrorKind;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// 健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// 健康
    Healthy,
    /// 降级（最近一次联系设备失败）
    Degraded,
    /// 不健康（进程正在关闭）
    Unhealthy,
}

/// 最近一次设备操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceOutcome {
    pub variant: String,
    pub operation: String,
    /// `ok` 或错误类别
    pub outcome: String,
    pub timestamp: u64,
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 状态
    pub status: HealthStatus,
    /// 运行时间（秒）
    pub uptime_seconds: u64,
    /// 版本号
    pub version: String,
    /// 时间戳
    pub timestamp: u64,
    /// 详细信息（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

/// 详细健康信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDetails {
    /// 是否处于dry-run模式
    pub dry_run: bool,
    /// 目标设备地址
    pub device: String,
    /// 最近一次设备操作
    pub last_outcome: Option<DeviceOutcome>,
}

/// 健康检查器
pub struct HealthChecker {
    /// 启动时间
    start_time: SystemTime,
    /// 当前状态
    status: RwLock<HealthStatus>,
    /// 最近一次设备操作
    last_outcome: RwLock<Option<DeviceOutcome>>,
    /// 版本号
    version: String,
}

impl HealthChecker {
    /// 创建新的健康检查器
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            start_time: SystemTime::now(),
            status: RwLock::new(HealthStatus::Healthy),
            last_outcome: RwLock::new(None),
            version: version.into(),
        }
    }

    /// 获取运行时间（秒）
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time
            .elapsed()
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// 获取当前时间戳
    fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// 设置健康状态
    pub fn set_status(&self, status: HealthStatus) {
        *self.status.write() = status;
    }

    /// 获取健康状态
    pub fn get_status(&self) -> HealthStatus {
        *self.status.read()
    }

    /// 开始优雅关闭：此后readiness与 `/health` 均返回503
    pub fn begin_shutdown(&self) {
        self.set_status(HealthStatus::Unhealthy);
    }

    /// 关闭期间状态不再随设备操作变化
    fn transition(&self, status: HealthStatus) {
        let mut current = self.status.write();
        if *current != HealthStatus::Unhealthy {
            *current = status;
        }
    }

    /// 记录一次设备操作结果
    ///
    /// 连接类错误（认证/传输/超时）使状态降级；成功恢复为健康；
    /// 设备拒绝与输入错误说明设备可达，不改变状态
    pub fn record_outcome(&self, variant: &str, operation: &str, result: Result<(), ErrorKind>) {
        let outcome = match result {
            Ok(()) => {
                self.transition(HealthStatus::Healthy);
                "ok".to_string()
            }
            Err(kind) => {
                if kind.is_connectivity() {
                    self.transition(HealthStatus::Degraded);
                } else if kind == ErrorKind::DeviceRejected {
                    self.transition(HealthStatus::Healthy);
                }
                kind.as_str().to_string()
            }
        };

        *self.last_outcome.write() = Some(DeviceOutcome {
            variant: variant.to_string(),
            operation: operation.to_string(),
            outcome,
            timestamp: Self::current_timestamp(),
        });
    }

    pub fn last_outcome(&self) -> Option<DeviceOutcome> {
        self.last_outcome.read().clone()
    }

    /// 生成健康检查响应
    pub fn check_health(&self) -> HealthResponse {
        HealthResponse {
            status: self.get_status(),
            uptime_seconds: self.uptime_seconds(),
            version: self.version.clone(),
            timestamp: Self::current_timestamp(),
            details: None,
        }
    }

    /// 生成详细健康检查响应
    pub fn check_health_detailed(&self, dry_run: bool, device: impl Into<String>) -> HealthResponse {
        HealthResponse {
            details: Some(HealthDetails {
                dry_run,
                device: device.into(),
                last_outcome: self.last_outcome(),
            }),
            ..self.check_health()
        }
    }

    /// 存活检查（liveness probe）
    pub fn check_liveness(&self) -> bool {
        true
    }

    /// 就绪检查（readiness probe）
    pub fn check_readiness(&self) -> bool {
        matches!(self.get_status(), HealthStatus::Healthy)
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}
