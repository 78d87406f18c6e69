//! Main application state and service coordination
//!
//! This module contains the production AppState that wires the membership
//! store, lifecycle engine, registry client, HTTP server and background
//! tasks together.

use crate::config::AppConfig;
use crate::lobby::engine::LobbyEngine;
use crate::lobby::results::GeneratedMapProducer;
use crate::metrics::MetricsCollector;
use crate::registry::{InstanceRegistryClient, RegistryConfig};
use crate::service::health::ServiceHealth;
use crate::service::routes::{router, ApiState};
use crate::store::InMemoryMembershipStore;
use crate::utils::detect_instance_id;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("HTTP server error: {message}")]
    HttpServer { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Lobby lifecycle engine
    engine: Arc<LobbyEngine>,

    /// Discovery registry client for this instance
    registry: Arc<InstanceRegistryClient>,

    /// Metrics collector shared with the engine and the HTTP facade
    metrics: Arc<MetricsCollector>,

    /// Background task handles
    background_tasks: Vec<JoinHandle<()>>,

    /// Shutdown signal for the HTTP server
    shutdown_tx: broadcast::Sender<()>,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing map-room lobby service");
        info!(
            "Configuration: service={}, discovery_url={}",
            config.service.name, config.discovery.url
        );

        let metrics = Arc::new(
            MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            })?,
        );

        let store = Arc::new(InMemoryMembershipStore::new());
        let engine = Arc::new(LobbyEngine::with_metrics(
            store,
            Arc::new(GeneratedMapProducer::new()),
            metrics.clone(),
        ));

        let instance_id = config
            .discovery
            .instance_id
            .clone()
            .unwrap_or_else(detect_instance_id);
        let registry_config =
            RegistryConfig::from_settings(&config.discovery, &config.service.name);
        let registry = Arc::new(
            InstanceRegistryClient::new(registry_config, instance_id).map_err(|e| {
                ServiceError::Initialization {
                    message: format!("Failed to create registry client: {}", e),
                }
            })?,
        );

        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            config,
            engine,
            registry,
            metrics,
            background_tasks: Vec::new(),
            shutdown_tx,
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Start the HTTP server and background tasks
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting map-room lobby service");

        *self.is_running.write().await = true;

        self.start_http_server().await?;
        self.start_background_tasks();

        info!("✅ map-room lobby service started successfully");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of map-room service");

        *self.is_running.write().await = false;

        // Stop the HTTP server
        if self.shutdown_tx.send(()).is_err() {
            debug!("HTTP server already stopped");
        }

        self.stop_background_tasks().await;

        // Get final statistics
        match self.engine.get_stats().await {
            Ok(stats) => info!("Final service statistics: {:?}", stats),
            Err(e) => warn!("Failed to get final stats: {}", e),
        }

        info!("✅ map-room service shutdown completed");
        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get the lobby engine
    pub fn engine(&self) -> Arc<LobbyEngine> {
        self.engine.clone()
    }

    /// Get the registry client for this instance
    pub fn registry(&self) -> Arc<InstanceRegistryClient> {
        self.registry.clone()
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Bind the listener and serve the lobby API in a background task
    async fn start_http_server(&mut self) -> Result<(), ServiceError> {
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.service.http_port)
            .parse()
            .map_err(|e| ServiceError::Configuration {
                message: format!("Invalid HTTP address: {}", e),
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::HttpServer {
                message: format!("Failed to bind {}: {}", addr, e),
            })?;

        info!("Lobby API listening on http://{}", addr);

        let app = router(ApiState {
            engine: self.engine.clone(),
            metrics: self.metrics.clone(),
            service_name: self.config.service.name.clone(),
        });

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let server_task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                    info!("HTTP server shutdown signal received");
                })
                .await;

            if let Err(e) = result {
                error!("HTTP server failed: {}", e);
            } else {
                info!("HTTP server stopped");
            }
        });

        self.background_tasks.push(server_task);
        Ok(())
    }

    /// Start periodic metrics and health reporting
    fn start_background_tasks(&mut self) {
        info!("Starting background maintenance tasks...");

        let metrics_task = {
            let engine = self.engine.clone();
            let metrics = self.metrics.clone();
            let service_name = self.config.service.name.clone();
            let is_running = self.is_running.clone();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(30));
                let start_time = tokio::time::Instant::now();
                info!("Metrics update task started");

                while *is_running.read().await {
                    interval.tick().await;

                    metrics
                        .service()
                        .uptime_seconds
                        .set(start_time.elapsed().as_secs() as i64);

                    match ServiceHealth::gather(&engine, &service_name).await {
                        Ok(health) => {
                            metrics.update_from_engine_stats(&health.stats);
                            metrics.update_health_status(true);
                            debug!(
                                "Health check: {} - {} active lobbies, {} members waiting",
                                health.status,
                                health.stats.active_lobbies,
                                health.stats.members_waiting
                            );
                        }
                        Err(e) => {
                            warn!("Health check failed: {}", e);
                            metrics.update_health_status(false);
                        }
                    }
                }

                info!("Metrics update task stopped");
            })
        };

        self.background_tasks.push(metrics_task);
    }

    /// Stop all background tasks
    async fn stop_background_tasks(&mut self) {
        let task_count = self.background_tasks.len();
        if task_count == 0 {
            info!("No background tasks to stop");
            return;
        }

        info!("Stopping {} background tasks...", task_count);

        for task in self.background_tasks.drain(..) {
            task.abort();
        }

        // Give tasks time to clean up gracefully
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        info!("✅ All {} background tasks stopped", task_count);
    }
}
