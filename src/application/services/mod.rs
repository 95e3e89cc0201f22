/// Application Services
///
/// Services coordinate validation, command building and device sessions.
///
/// - `session_scope`: the single open → act → close wrapper
/// - `cli_service`: interactive CLI Session Manager
/// - `netconf_service`: NETCONF Session Manager

pub mod cli_service;
pub mod netconf_service;
pub mod session_scope;

pub use cli_service::CliLoopbackService;
pub use netconf_service::{LoopbackView, NetconfLoopbackService};
pub use session_scope::{SessionScope, DEFAULT_TIMEOUT};
