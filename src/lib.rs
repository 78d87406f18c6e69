//! Map Room - Lobby orchestration microservice for grand-strategy games
//!
//! This crate provides lobby discovery, membership and game lifecycle
//! management over HTTP, with instance self-registration against an
//! external discovery endpoint for load-balanced fleets.

pub mod config;
pub mod error;
pub mod lobby;
pub mod metrics;
pub mod registry;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LobbyError, Result};
pub use types::*;

// Re-export key components
pub use lobby::{GeneratedMapProducer, LobbyEngine, ResultProducer};
pub use registry::InstanceRegistryClient;
pub use store::{InMemoryMembershipStore, MembershipStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
