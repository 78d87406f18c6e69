//! Configuration management for the map-room service
//!
//! This module handles all configuration loading from environment variables
//! or a TOML file, validation, and default values for the lobby service.

pub mod app;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, DiscoverySettings, ServiceSettings};
