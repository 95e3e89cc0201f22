//! Loopback API
//!
//! HTTP service that creates, deletes and reads loopback interfaces on one
//! router, either through the interactive SSH command line or through
//! NETCONF.
//!
//! ## Layers
//! - `domain`: loopback values, validation, platform command builders
//! - `application`: Session Managers and the uniform result envelope
//! - `infrastructure`: SSH, CLI and NETCONF transports, health checks
//! - `interfaces`: clap bootstrap and the axum Request Router
//! - `shared`: errors, metrics, logging, request bodies

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;
