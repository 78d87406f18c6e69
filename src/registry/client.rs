//! Discovery registry client
//!
//! Registers this instance with the external discovery endpoint at
//! startup and removes the registration at shutdown. Both calls are
//! fire-and-forget: response codes are observed only for logging, and a
//! failed registration never blocks startup. Deregistration is
//! idempotent and safe to call before any successful registration, so
//! overlapping shutdown paths cannot double-release.

use crate::config::DiscoverySettings;
use crate::error::Result;
use anyhow::Context;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Settings the client needs to talk to the discovery endpoint
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the discovery endpoint
    pub base_url: String,
    /// Service name used as the registration key
    pub service_name: String,
    /// Bound on each register/deregister request
    pub request_timeout: Duration,
}

impl RegistryConfig {
    /// Build from the application's discovery settings
    pub fn from_settings(settings: &DiscoverySettings, service_name: &str) -> Self {
        Self {
            base_url: settings.url.trim_end_matches('/').to_string(),
            service_name: service_name.to_string(),
            request_timeout: Duration::from_secs(settings.request_timeout_seconds),
        }
    }
}

/// Client owning this instance's registration record.
///
/// Two states, `Unregistered` and `Registered`, with one instance per
/// process.
pub struct InstanceRegistryClient {
    http: reqwest::Client,
    config: RegistryConfig,
    instance_id: String,
    registered: AtomicBool,
    deregistered: AtomicBool,
}

impl InstanceRegistryClient {
    pub fn new(config: RegistryConfig, instance_id: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build discovery HTTP client")?;

        Ok(Self {
            http,
            config,
            instance_id,
            registered: AtomicBool::new(false),
            deregistered: AtomicBool::new(false),
        })
    }

    /// Identity this instance registers under
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Whether a registration succeeded at some point
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    /// Whether deregistration has already run
    pub fn is_deregistered(&self) -> bool {
        self.deregistered.load(Ordering::SeqCst)
    }

    /// Register this instance with the discovery endpoint.
    ///
    /// A non-success response or transport error is logged and the
    /// service keeps running unregistered.
    pub async fn register_self(&self) {
        let url = format!("{}/register", self.config.base_url);
        let body: HashMap<&str, &str> = HashMap::from([(
            self.config.service_name.as_str(),
            self.instance_id.as_str(),
        )]);

        match self.http.post(&url).json(&body).send().await {
            Ok(response) if response.status() == StatusCode::CREATED => {
                self.registered.store(true, Ordering::SeqCst);
                info!(
                    instance_id = %self.instance_id,
                    service = %self.config.service_name,
                    "registered instance with discovery endpoint"
                );
            }
            Ok(response) => {
                warn!(
                    instance_id = %self.instance_id,
                    status = %response.status(),
                    "discovery endpoint rejected registration, continuing unregistered"
                );
            }
            Err(e) => {
                warn!(
                    instance_id = %self.instance_id,
                    error = %e,
                    "failed to reach discovery endpoint, continuing unregistered"
                );
            }
        }
    }

    /// Remove this instance's registration.
    ///
    /// Idempotent: only the first call sends the request, regardless of
    /// how many shutdown paths fire and whether registration ever
    /// succeeded. Failures are logged, never propagated.
    pub async fn deregister_self(&self) {
        if self.deregistered.swap(true, Ordering::SeqCst) {
            debug!(
                instance_id = %self.instance_id,
                "deregistration already performed, skipping"
            );
            return;
        }

        let url = format!("{}/deregister", self.config.base_url);
        let body: HashMap<&str, &str> = HashMap::from([(
            self.config.service_name.as_str(),
            self.instance_id.as_str(),
        )]);

        match self.http.post(&url).json(&body).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                self.registered.store(false, Ordering::SeqCst);
                info!(
                    instance_id = %self.instance_id,
                    "deregistered instance from discovery endpoint"
                );
            }
            Ok(response) => {
                warn!(
                    instance_id = %self.instance_id,
                    status = %response.status(),
                    "discovery endpoint rejected deregistration"
                );
            }
            Err(e) => {
                warn!(
                    instance_id = %self.instance_id,
                    error = %e,
                    "failed to reach discovery endpoint for deregistration"
                );
            }
        }
    }
}
