/// Scoped Session Helper
///
/// Every device operation, whatever its transport, runs as
/// open → act → close inside `SessionScope::run`:
///
/// - session open and the action are each bounded by the configured timeout
/// - close is attempted on every path once a session exists; a close failure
///   is logged at WARN and never replaces the action's result
/// - one structured log record, one metrics sample and one health update per
///   operation
///
/// ## Example
/// ```rust,ignore
/// let output = scope
///     .run(Operation::ListInterfaces, None, connector.connect(), |session| {
///         Box::pin(async move { session.send_command("show interfaces").await })
///     })
///     .await?;
/// ```

use crate::application::outcome::Operation;
use crate::domain::loopback::InterfaceId;
use crate::infrastructure::observability::HealthChecker;
use crate::infrastructure::traits::ManagedSession;
use crate::shared::error::DeviceError;
use crate::shared::metrics::METRICS;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// 默认单次操作超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 会话作用域：统一的获取/释放包装
#[derive(Clone)]
pub struct SessionScope {
    timeout: Duration,
    health: Arc<HealthChecker>,
}

impl SessionScope {
    pub fn new(timeout: Duration, health: Arc<HealthChecker>) -> Self {
        Self { timeout, health }
    }

    /// Opens a session, runs `act` on it and always closes it.
    ///
    /// # Arguments
    /// * `operation` - Label used for logs, metrics and timeout errors
    /// * `interface` - Loopback the operation targets, if any
    /// * `open` - Future resolving to a fresh session
    /// * `act` - Work to do with the open session
    pub async fn run<S, T, O, F>(
        &self,
        operation: Operation,
        interface: Option<InterfaceId>,
        open: O,
        act: F,
    ) -> Result<T, DeviceError>
    where
        S: ManagedSession + ?Sized,
        O: Future<Output = Result<Box<S>, DeviceError>> + Send,
        F: for<'a> FnOnce(&'a mut S) -> BoxFuture<'a, Result<T, DeviceError>> + Send,
        T: Send,
    {
        let started = Instant::now();
        let result = self.scoped(operation, open, act).await;
        let elapsed = started.elapsed();

        self.record(operation, interface, &result, elapsed);
        result
    }

    async fn scoped<S, T, O, F>(&self, operation: Operation, open: O, act: F) -> Result<T, DeviceError>
    where
        S: ManagedSession + ?Sized,
        O: Future<Output = Result<Box<S>, DeviceError>> + Send,
        F: for<'a> FnOnce(&'a mut S) -> BoxFuture<'a, Result<T, DeviceError>> + Send,
        T: Send,
    {
        let mut session = match tokio::time::timeout(self.timeout, open).await {
            Ok(opened) => opened?,
            Err(_) => return Err(self.timed_out(operation)),
        };

        let acted = match tokio::time::timeout(self.timeout, act(&mut *session)).await {
            Ok(result) => result,
            Err(_) => Err(self.timed_out(operation)),
        };

        match tokio::time::timeout(self.timeout, session.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(
                variant = operation.variant(),
                operation = operation.as_str(),
                error = %e,
                "session close failed"
            ),
            Err(_) => warn!(
                variant = operation.variant(),
                operation = operation.as_str(),
                "session close timed out"
            ),
        }

        acted
    }

    fn timed_out(&self, operation: Operation) -> DeviceError {
        DeviceError::Timeout {
            operation: operation.as_str(),
            seconds: self.timeout.as_secs(),
        }
    }

    fn record<T>(
        &self,
        operation: Operation,
        interface: Option<InterfaceId>,
        result: &Result<T, DeviceError>,
        elapsed: Duration,
    ) {
        let interface = interface.map(|id| id.name()).unwrap_or_default();
        let elapsed_ms = elapsed.as_millis() as u64;
        let outcome = match result {
            Ok(_) => "ok",
            Err(e) => e.kind().as_str(),
        };

        match result {
            Ok(_) => info!(
                variant = operation.variant(),
                operation = operation.as_str(),
                outcome,
                elapsed_ms,
                interface = %interface,
                "device operation completed"
            ),
            Err(e) => error!(
                variant = operation.variant(),
                operation = operation.as_str(),
                outcome,
                elapsed_ms,
                interface = %interface,
                error = %e,
                "device operation failed"
            ),
        }

        METRICS.record_operation(
            operation.variant(),
            operation.as_str(),
            outcome,
            elapsed.as_secs_f64(),
        );
        self.health.record_outcome(
            operation.variant(),
            operation.as_str(),
            result.as_ref().map(|_| ()).map_err(DeviceError::kind),
        );
    }
}
