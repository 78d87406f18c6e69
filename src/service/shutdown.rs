//! Shutdown coordination
//!
//! Registration with the discovery endpoint is an acquired resource;
//! deregistration is its guaranteed release. Every exit path in `main`
//! (termination signal, server completion, startup failure after
//! registration) funnels through `release`, and the registry client's
//! first-call gate makes overlapping triggers harmless.

use crate::registry::InstanceRegistryClient;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

/// Coordinates deregistration across all process exit paths
pub struct ShutdownCoordinator {
    registry: Arc<InstanceRegistryClient>,
}

impl ShutdownCoordinator {
    pub fn new(registry: Arc<InstanceRegistryClient>) -> Self {
        Self { registry }
    }

    /// Wait for a termination signal (SIGINT or SIGTERM)
    pub async fn wait_for_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C) signal");
            },
            _ = terminate => {
                info!("Received SIGTERM signal");
            },
        }
    }

    /// Release the registration. Safe to call from multiple exit paths;
    /// only the first call deregisters.
    pub async fn release(&self) {
        info!(
            instance_id = %self.registry.instance_id(),
            "releasing discovery registration"
        );
        self.registry.deregister_self().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryConfig;
    use std::time::Duration;

    fn coordinator() -> ShutdownCoordinator {
        let config = RegistryConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            service_name: "map-room".to_string(),
            request_timeout: Duration::from_secs(1),
        };
        let client =
            InstanceRegistryClient::new(config, "instance-test".to_string()).unwrap();
        ShutdownCoordinator::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_release_runs_exactly_once() {
        let coordinator = coordinator();

        // Signal path followed by normal-exit path
        coordinator.release().await;
        coordinator.release().await;

        assert!(coordinator.registry.is_deregistered());
    }
}
