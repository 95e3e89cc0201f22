/// CLI Interface Module
///
/// This module provides the command-line entry point of the loopback API.
/// It serves as the primary entry point when run as a standalone service.
///
/// ## Responsibilities
/// - Parse command-line arguments and device environment variables
/// - Initialize logging
/// - Build connectors, Session Managers and the router
/// - Serve HTTP until Ctrl-C

use crate::application::services::{CliLoopbackService, NetconfLoopbackService, SessionScope};
use crate::domain::platform::DevicePlatform;
use crate::domain::validation::{LoopbackValidator, ValidationConfig};
use crate::infrastructure::observability::HealthChecker;
use crate::infrastructure::ssh::{DeviceCredentials, HostKeyPolicy, SshConnector};
use crate::infrastructure::{SshCliConnector, SshNetconfConnector};
use crate::interfaces::http::{build_router, ApiConfig, AppState};
use crate::shared::logging::init_logging;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Loopback API 命令行配置
#[derive(Parser, Clone)]
#[command(name = "loopback-api")]
#[command(version)]
#[command(about = "HTTP API for loopback interfaces on a router, over SSH CLI and NETCONF", long_about = None)]
pub struct CliConfig {
    /// 设备平台
    #[arg(long, env = "DEVICE_TYPE", default_value = "cisco_xr")]
    pub device_type: DevicePlatform,

    /// 设备地址
    #[arg(long, env = "IP", required_unless_present = "dry_run")]
    pub device_host: Option<String>,

    /// 设备用户名
    #[arg(long, env = "USERNAME", required_unless_present = "dry_run")]
    pub username: Option<String>,

    /// 设备密码
    #[arg(long, env = "PASSWORD", hide_env_values = true, required_unless_present = "dry_run")]
    pub password: Option<String>,

    /// 交互式CLI的SSH端口
    #[arg(long, env = "SSH_PORT", default_value_t = 22)]
    pub ssh_port: u16,

    /// NETCONF端口
    #[arg(long, env = "NETCONF_PORT", default_value_t = 830)]
    pub netconf_port: u16,

    /// HTTP监听地址
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// HTTP监听端口
    #[arg(short, long, default_value_t = 5000)]
    pub port: u16,

    /// 不联系设备，回显请求
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// 单次设备操作超时（秒）
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// known_hosts 路径（默认 ~/.ssh/known_hosts）
    #[arg(long)]
    pub known_hosts: Option<PathBuf>,

    /// 关闭主机密钥校验
    #[arg(long, default_value_t = false)]
    pub insecure_skip_host_key_verification: bool,

    /// 日志级别
    #[arg(short = 'l', long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,

    /// 追加写入的JSON日志文件
    #[arg(long, default_value = "app.log")]
    pub log_file: PathBuf,

    /// description 最大长度
    #[arg(long, default_value_t = 240)]
    pub max_description_len: usize,
}

impl CliConfig {
    /// 设备凭据；dry-run下缺失的字段为空
    pub fn credentials(&self) -> DeviceCredentials {
        DeviceCredentials {
            host: self.device_host.clone().unwrap_or_default(),
            username: self.username.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            ssh_port: self.ssh_port,
            netconf_port: self.netconf_port,
        }
    }

    pub fn host_key_policy(&self) -> HostKeyPolicy {
        if self.insecure_skip_host_key_verification {
            return HostKeyPolicy::AcceptAny;
        }
        let path = self.known_hosts.clone().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(".ssh")
                .join("known_hosts")
        });
        HostKeyPolicy::KnownHosts(path)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Runs the CLI application
///
/// Parses arguments, wires the services and serves until Ctrl-C.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    let _log_guard = init_logging(&config.log_level, Some(config.log_file.as_path()));

    let credentials = config.credentials();
    let host_keys = config.host_key_policy();
    info!(
        device = %credentials.host,
        platform = %config.device_type,
        ssh_port = credentials.ssh_port,
        netconf_port = credentials.netconf_port,
        dry_run = config.dry_run,
        timeout_secs = config.timeout_secs,
        "loopback api starting"
    );
    if host_keys == HostKeyPolicy::AcceptAny {
        warn!("host key verification disabled by --insecure-skip-host-key-verification");
    }
    if config.dry_run {
        warn!("dry run enabled: device endpoints will not contact the device");
    }

    let health = Arc::new(HealthChecker::default());
    let scope = SessionScope::new(Duration::from_secs(config.timeout_secs), health.clone());
    let validator = LoopbackValidator::with_config(ValidationConfig {
        max_description_len: config.max_description_len,
    });

    let device = credentials.host.clone();
    let ssh = Arc::new(SshConnector::new(credentials, host_keys));
    let cli = CliLoopbackService::new(
        Arc::new(SshCliConnector::new(ssh.clone(), config.device_type)),
        config.device_type,
        validator.clone(),
        scope.clone(),
    );
    let netconf = NetconfLoopbackService::new(Arc::new(SshNetconfConnector::new(ssh)), validator, scope);

    let api_config = ApiConfig {
        dry_run: config.dry_run,
        device,
    };
    let app = build_router(AppState::new(cli, netconf), &api_config, health.clone());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(health))
        .await?;

    info!("loopback api stopped");
    Ok(())
}

async fn shutdown_signal(health: Arc<HealthChecker>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    health.begin_shutdown();
    info!("shutdown requested, draining in-flight requests");
}
