//! Observability Module
//!
//! 提供系统可观测性功能：
//! - Prometheus metrics导出
//! - 健康检查端点
//!
//! ## 模块结构
//! - `health` - 健康检查
//! - `http_server` - 可观测性HTTP路由

pub mod health;
pub mod http_server;

pub use health::{DeviceOutcome, HealthChecker, HealthDetails, HealthResponse, HealthStatus};
pub use http_server::{observability_router, ObservabilityState};
