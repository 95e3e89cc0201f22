/// Application Layer - Services and Results
///
/// This layer orchestrates domain logic to implement the device operations.
/// It depends on the domain layer and on the session traits of the
/// infrastructure layer, never on a concrete transport (connectors are
/// injected).
///
/// ## Modules
/// - `outcome`: Operation catalogue and the uniform result envelope
/// - `services`: Session Managers and the scoped-session helper

pub mod outcome;
pub mod services;

// Re-export key services
pub use outcome::{Operation, OperationResult};
pub use services::{CliLoopbackService, NetconfLoopbackService, SessionScope};
