//! Service health reporting
//!
//! A lightweight health report combining the serving flag with engine
//! statistics, used by the `/stats` endpoint and periodic health logging.

use crate::error::Result;
use crate::lobby::engine::{LobbyEngine, LobbyEngineStats};

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Serving,
    NotServing,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Serving => write!(f, "serving"),
            HealthStatus::NotServing => write!(f, "not serving"),
        }
    }
}

/// Point-in-time health report
#[derive(Debug, Clone)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub stats: LobbyEngineStats,
}

impl ServiceHealth {
    /// Gather a health report from the running engine
    pub async fn gather(engine: &LobbyEngine, service_name: &str) -> Result<Self> {
        let stats = engine.get_stats().await?;

        Ok(Self {
            status: HealthStatus::Serving,
            service: service_name.to_string(),
            version: crate::VERSION.to_string(),
            timestamp: crate::utils::current_timestamp(),
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lobby::results::FixedResultProducer;
    use crate::store::InMemoryMembershipStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_gather_reports_serving_with_stats() {
        let engine = LobbyEngine::new(
            Arc::new(InMemoryMembershipStore::new()),
            Arc::new(FixedResultProducer::new()),
        );
        engine
            .create_lobby("alpha", 2, "u1".to_string())
            .await
            .unwrap();

        let health = ServiceHealth::gather(&engine, "map-room").await.unwrap();
        assert_eq!(health.status, HealthStatus::Serving);
        assert_eq!(health.service, "map-room");
        assert_eq!(health.stats.active_lobbies, 1);
    }
}
