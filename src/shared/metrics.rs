//! Prometheus Metrics Module
//!
//! 记录每一次设备操作的结果与耗时
//!
//! ## 指标类型
//! - **Counter**: 设备操作总数（按变体/操作/结果）、dry-run请求数
//! - **Histogram**: 设备操作耗时（打开会话到关闭会话）
//!
//! ## 使用示例
//! ```rust,ignore
//! use loopback_api::shared::metrics::METRICS;
//!
//! METRICS.record_operation("cli", "create_loopback", "ok", 0.42);
//! ```

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    /// 全局Metrics实例
    pub static ref METRICS: Metrics = Metrics::new();
}

/// 设备操作指标
pub struct Metrics {
    /// 设备操作总数 (variant, operation, outcome)
    pub device_operations_total: CounterVec,

    /// 设备操作耗时分布 (秒)
    pub device_operation_duration: HistogramVec,

    /// dry-run 短路的请求数
    pub dry_run_requests_total: CounterVec,
}

impl Metrics {
    /// 创建新的Metrics实例
    pub fn new() -> Self {
        Self {
            device_operations_total: register_counter_vec!(
                "loopback_api_device_operations_total",
                "Total number of device operations by outcome",
                &["variant", "operation", "outcome"]
            )
            .expect("device_operations_total registers once"),

            device_operation_duration: register_histogram_vec!(
                "loopback_api_device_operation_duration_seconds",
                "Device operation duration including session setup and teardown",
                &["variant", "operation"],
                vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
            )
            .expect("device_operation_duration registers once"),

            dry_run_requests_total: register_counter_vec!(
                "loopback_api_dry_run_requests_total",
                "Requests answered by the dry-run gate without contacting the device",
                &["operation"]
            )
            .expect("dry_run_requests_total registers once"),
        }
    }

    /// 记录一次设备操作
    pub fn record_operation(&self, variant: &str, operation: &str, outcome: &str, seconds: f64) {
        self.device_operations_total
            .with_label_values(&[variant, operation, outcome])
            .inc();
        self.device_operation_duration
            .with_label_values(&[variant, operation])
            .observe(seconds);
    }

    /// 导出Prometheus格式的指标
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = vec![];
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::warn!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
