//! Instance registration with the discovery endpoint
//!
//! Each running instance registers itself at startup and deregisters at
//! shutdown so load balancers can route to live instances. Registration
//! state is independent of lobby logic; only the instance identity is
//! shared.

pub mod client;

// Re-export commonly used types
pub use client::{InstanceRegistryClient, RegistryConfig};
