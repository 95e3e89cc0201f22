/// Shared utilities and types used across all layers
///
/// This module contains:
/// - Request body definitions
/// - Error types
/// - Prometheus metrics
/// - Logging setup

pub mod error;
pub mod logging;
pub mod metrics;
pub mod protocol;

// Re-export commonly used types
pub use error::{DeviceError, ErrorKind};
pub use protocol::LoopbackRequest;
