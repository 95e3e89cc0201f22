/// Domain Layer - Loopback Semantics
///
/// Pure values and rules with no I/O: what a loopback is, how requests are
/// validated, and how each platform renders configuration.
///
/// ## Modules
/// - `loopback`: Interface ids, IPv4 prefixes, read-back configuration
/// - `validation`: Request validation (the `InvalidInput` source)
/// - `platform`: Per-platform CLI command builders and output markers

pub mod loopback;
pub mod platform;
pub mod validation;

// Re-export key types
pub use loopback::{InterfaceConfig, InterfaceId, Ipv4Interface, LoopbackSpec};
pub use platform::DevicePlatform;
pub use validation::{LoopbackValidator, ValidationConfig, ValidationError};
