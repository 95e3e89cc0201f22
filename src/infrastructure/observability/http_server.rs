//! HTTP Observability Routes
//!
//! 提供Prometheus metrics和健康检查端点，与业务路由挂在同一个监听地址上
//!
//! ## 端点
//! - `GET /metrics` - Prometheus格式的指标
//! - `GET /health` - 健康检查
//! - `GET /health/ready` - 就绪检查
//! - `GET /health/live` - 存活检查
//!
//! ## 使用示例
//! ```rust,ignore
//! let health = Arc::new(HealthChecker::default());
//! let app = api_router.merge(observability_router(health, false, "10.10.20.48"));
//! ```

use super::health::{HealthChecker, HealthStatus};
use crate::shared::metrics::METRICS;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// 健康端点共享的状态
#[derive(Clone)]
pub struct ObservabilityState {
    pub health: Arc<HealthChecker>,
    pub dry_run: bool,
    pub device: Arc<str>,
}

/// 构造可观测性路由，不受dry-run影响
pub fn observability_router(health: Arc<HealthChecker>, dry_run: bool, device: &str) -> Router {
    let state = ObservabilityState {
        health,
        dry_run,
        device: Arc::from(device),
    };

    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/health/live", get(liveness_handler))
        .with_state(state)
}

/// Prometheus metrics端点
async fn metrics_handler() -> Response {
    let metrics = METRICS.export();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics,
    )
        .into_response()
}

/// 健康检查端点
async fn health_handler(State(state): State<ObservabilityState>) -> Response {
    let response = state
        .health
        .check_health_detailed(state.dry_run, state.device.as_ref());

    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response)).into_response()
}

/// 就绪检查端点（用于Kubernetes readiness probe）
async fn readiness_handler(State(state): State<ObservabilityState>) -> Response {
    if state.health.check_readiness() {
        StatusCode::OK.into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}

/// 存活检查端点（用于Kubernetes liveness probe）
async fn liveness_handler(State(state): State<ObservabilityState>) -> Response {
    if state.health.check_liveness() {
        StatusCode::OK.into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}
