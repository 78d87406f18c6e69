//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! map-room lobby service, including environment variable loading and
//! validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub discovery: DiscoverySettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service name for logging, metrics and registry entries
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for the lobby API, health and metrics endpoints
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Discovery registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySettings {
    /// Base URL of the discovery endpoint
    pub url: String,
    /// Identity of this instance; resolved from INSTANCE_ID/HOSTNAME when unset
    pub instance_id: Option<String>,
    /// Bound on each register/deregister request
    pub request_timeout_seconds: u64,
    /// Whether to register with the discovery endpoint at startup
    pub register_on_startup: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            discovery: DiscoverySettings::default(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "map-room".to_string(),
            log_level: "info".to_string(),
            http_port: 7000,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:4444".to_string(),
            instance_id: None,
            request_timeout_seconds: 5,
            register_on_startup: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            config.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            config.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Discovery settings
        if let Ok(url) = env::var("SERVICE_DISCOVERY_URL") {
            config.discovery.url = url;
        }
        if let Ok(instance_id) = env::var("INSTANCE_ID") {
            config.discovery.instance_id = Some(instance_id);
        }
        if let Ok(timeout) = env::var("DISCOVERY_REQUEST_TIMEOUT_SECONDS") {
            config.discovery.request_timeout_seconds = timeout.parse().map_err(|_| {
                anyhow!("Invalid DISCOVERY_REQUEST_TIMEOUT_SECONDS value: {}", timeout)
            })?;
        }
        if let Ok(register) = env::var("REGISTER_ON_STARTUP") {
            config.discovery.register_on_startup = register
                .parse()
                .map_err(|_| anyhow!("Invalid REGISTER_ON_STARTUP value: {}", register))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get discovery request timeout as Duration
    pub fn discovery_request_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery.request_timeout_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.discovery.request_timeout_seconds == 0 {
        return Err(anyhow!("Discovery request timeout must be greater than 0"));
    }

    // Validate discovery settings
    if config.discovery.register_on_startup && config.discovery.url.is_empty() {
        return Err(anyhow!(
            "Discovery URL cannot be empty when registration is enabled"
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.service.name, "map-room");
        assert_eq!(config.service.http_port, 7000);
        assert!(config.discovery.register_on_startup);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = AppConfig::default();
        config.service.log_level = "verbose".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = AppConfig::default();
        config.service.http_port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_discovery_url_rejected_when_registering() {
        let mut config = AppConfig::default();
        config.discovery.url = String::new();
        assert!(validate_config(&config).is_err());

        // Allowed when registration is disabled
        config.discovery.register_on_startup = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_duration_helpers() {
        let config = AppConfig::default();
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.discovery_request_timeout(), Duration::from_secs(5));
    }
}
