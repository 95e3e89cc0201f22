/// Infrastructure Layer - Technical Implementations
///
/// This layer contains all technical implementations that interact with
/// external systems: SSH transport, device CLI sessions, NETCONF sessions,
/// health and metrics endpoints.
///
/// The infrastructure layer depends on the domain layer but the domain
/// layer does not depend on infrastructure (dependency inversion).
///
/// ## Modules
/// - `ssh`: SSH connection, authentication and host key verification
/// - `cli`: Prompt-driven interactive shell sessions
/// - `netconf`: NETCONF framing, RPC construction and reply parsing
/// - `traits`: Session and connector abstractions used by the services
/// - `observability`: Health checks and Prometheus export

pub mod cli;
pub mod netconf;
pub mod observability;
pub mod ssh;
pub mod traits;

// Re-export key types
pub use cli::SshCliConnector;
pub use netconf::SshNetconfConnector;
pub use ssh::{DeviceCredentials, HostKeyPolicy, SshConnector};
pub use traits::{CliConnector, CliSession, ManagedSession, NetconfConnector, NetconfSession};
