/// Interfaces Layer - External Entry Points
///
/// This layer contains all external interfaces to the system.
///
/// ## Modules
/// - `cli`: Command-line configuration and bootstrap (main.rs logic)
/// - `http`: Request Router, handlers and Dry-Run Gate

pub mod cli;
pub mod http;
