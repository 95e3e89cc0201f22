//! Logging setup: human-readable stdout plus an append-only JSON log file.
//!
//! Every record in the file carries its timestamp, level, and the structured
//! fields of the event (`operation`, `variant`, `outcome`, ...).

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// 初始化日志系统
///
/// `RUST_LOG` 优先于 `level`。返回的guard必须在进程生命周期内持有，
/// 否则文件中的尾部日志可能丢失。
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let stdout_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(stdout_filter);

    let Some(path) = log_file else {
        tracing_subscriber::registry().with(stdout_layer).init();
        return None;
    };

    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "app.log".into());

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(false)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Some(guard)
}
