/// HTTP Interface - Request Router
///
/// Builds the axum router exposing every device operation under its
/// kebab-case path and the legacy Flask path, plus the health and metrics
/// routes.
///
/// ## Endpoints
/// - `POST /create-loopback`, `GET /list-interfaces`, `POST /remove-loopback` (CLI)
/// - `POST /configure-loopback`, `POST /delete-loopback`, `POST /show-loopback` (NETCONF)
/// - `GET /health`, `/health/live`, `/health/ready`, `/metrics`
///
/// ## Usage
/// ```rust,ignore
/// let app = build_router(state, &ApiConfig::default(), health);
/// axum::serve(listener, app).await?;
/// ```

pub mod dry_run;
pub mod handlers;

use crate::application::outcome::Operation;
use crate::application::services::{CliLoopbackService, NetconfLoopbackService};
use crate::infrastructure::observability::{observability_router, HealthChecker};
use axum::{
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use std::sync::Arc;

/// 路由构造时传入的配置，进程生命周期内不变
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    /// 为true时所有设备端点由Dry-Run Gate应答
    pub dry_run: bool,
    /// 设备地址，仅用于健康检查展示
    pub device: String,
}

/// 处理器共享的状态
#[derive(Clone)]
pub struct AppState {
    pub cli: Arc<CliLoopbackService>,
    pub netconf: Arc<NetconfLoopbackService>,
}

impl AppState {
    pub fn new(cli: CliLoopbackService, netconf: NetconfLoopbackService) -> Self {
        Self {
            cli: Arc::new(cli),
            netconf: Arc::new(netconf),
        }
    }
}

fn handler_for(operation: Operation) -> MethodRouter<AppState> {
    match operation {
        Operation::CreateLoopback => post(handlers::create_loopback),
        Operation::ListInterfaces => get(handlers::list_interfaces),
        Operation::RemoveLoopback => post(handlers::remove_loopback),
        Operation::ConfigureLoopback => post(handlers::configure_loopback),
        Operation::DeleteLoopback => post(handlers::delete_loopback),
        Operation::ShowLoopback => post(handlers::show_loopback),
    }
}

/// 构造完整的应用路由
pub fn build_router(state: AppState, config: &ApiConfig, health: Arc<HealthChecker>) -> Router {
    let mut api = Router::new();
    for operation in Operation::ALL {
        api = api
            .route(operation.path(), handler_for(operation))
            .route(operation.legacy_path(), handler_for(operation));
    }

    if config.dry_run {
        api = api.route_layer(middleware::from_fn(dry_run::gate));
    }

    api.with_state(state)
        .merge(observability_router(health, config.dry_run, &config.device))
}
