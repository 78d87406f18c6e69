//! Metrics collection using Prometheus

use crate::error::Result;
use crate::lobby::engine::LobbyEngineStats;
use anyhow::Context;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the lobby service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Lobby-related metrics
    lobby_metrics: LobbyMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Total requests handled, by operation
    pub requests_total: IntCounterVec,

    /// Failed requests, by operation
    pub request_errors_total: IntCounterVec,

    /// Health check status (0=not serving, 1=serving)
    pub health_status: IntGauge,
}

/// Lobby-related metrics
#[derive(Clone)]
pub struct LobbyMetrics {
    /// Number of currently visible lobbies
    pub active_lobbies: IntGauge,

    /// Members currently waiting across visible lobbies
    pub members_waiting: IntGauge,

    /// Total lobbies created
    pub lobbies_created_total: IntCounter,

    /// Total games ended
    pub games_ended_total: IntCounter,

    /// Operation processing time, by operation
    pub operation_duration: HistogramVec,
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds = IntGauge::with_opts(Opts::new(
            "map_room_uptime_seconds",
            "Service uptime in seconds",
        ))?;
        let requests_total = IntCounterVec::new(
            Opts::new("map_room_requests_total", "Total requests by operation"),
            &["operation"],
        )?;
        let request_errors_total = IntCounterVec::new(
            Opts::new(
                "map_room_request_errors_total",
                "Failed requests by operation",
            ),
            &["operation"],
        )?;
        let health_status = IntGauge::with_opts(Opts::new(
            "map_room_health_status",
            "Health status (0=not serving, 1=serving)",
        ))?;

        registry
            .register(Box::new(uptime_seconds.clone()))
            .context("Failed to register uptime gauge")?;
        registry
            .register(Box::new(requests_total.clone()))
            .context("Failed to register request counter")?;
        registry
            .register(Box::new(request_errors_total.clone()))
            .context("Failed to register request error counter")?;
        registry
            .register(Box::new(health_status.clone()))
            .context("Failed to register health gauge")?;

        Ok(Self {
            uptime_seconds,
            requests_total,
            request_errors_total,
            health_status,
        })
    }
}

impl LobbyMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let active_lobbies = IntGauge::with_opts(Opts::new(
            "map_room_active_lobbies",
            "Number of currently visible lobbies",
        ))?;
        let members_waiting = IntGauge::with_opts(Opts::new(
            "map_room_members_waiting",
            "Members across visible lobbies",
        ))?;
        let lobbies_created_total = IntCounter::with_opts(Opts::new(
            "map_room_lobbies_created_total",
            "Total lobbies created",
        ))?;
        let games_ended_total = IntCounter::with_opts(Opts::new(
            "map_room_games_ended_total",
            "Total games ended",
        ))?;
        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "map_room_operation_duration_seconds",
                "Lobby operation processing time",
            ),
            &["operation"],
        )?;

        registry
            .register(Box::new(active_lobbies.clone()))
            .context("Failed to register lobby gauge")?;
        registry
            .register(Box::new(members_waiting.clone()))
            .context("Failed to register member gauge")?;
        registry
            .register(Box::new(lobbies_created_total.clone()))
            .context("Failed to register lobby counter")?;
        registry
            .register(Box::new(games_ended_total.clone()))
            .context("Failed to register game counter")?;
        registry
            .register(Box::new(operation_duration.clone()))
            .context("Failed to register duration histogram")?;

        Ok(Self {
            active_lobbies,
            members_waiting,
            lobbies_created_total,
            games_ended_total,
            operation_duration,
        })
    }
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let lobby_metrics = LobbyMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            lobby_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get lobby metrics
    pub fn lobby(&self) -> &LobbyMetrics {
        &self.lobby_metrics
    }

    /// Record a completed operation with its processing time
    pub fn record_operation(&self, operation: &str, duration: Duration) {
        self.service_metrics
            .requests_total
            .with_label_values(&[operation])
            .inc();
        self.lobby_metrics
            .operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Record a failed operation
    pub fn record_operation_error(&self, operation: &str) {
        self.service_metrics
            .requests_total
            .with_label_values(&[operation])
            .inc();
        self.service_metrics
            .request_errors_total
            .with_label_values(&[operation])
            .inc();
    }

    /// Update gauges from an engine statistics snapshot
    pub fn update_from_engine_stats(&self, stats: &LobbyEngineStats) {
        self.lobby_metrics
            .active_lobbies
            .set(stats.active_lobbies as i64);
        self.lobby_metrics
            .members_waiting
            .set(stats.members_waiting as i64);
    }

    /// Update the health status gauge (0=not serving, 1=serving)
    pub fn update_health_status(&self, serving: bool) {
        self.service_metrics.health_status.set(i64::from(serving));
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("metrics collector construction cannot fail with a fresh registry")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_records_operations() {
        let collector = MetricsCollector::new().expect("Failed to create collector");

        collector.record_operation("join_lobby", Duration::from_millis(5));
        collector.record_operation("join_lobby", Duration::from_millis(7));
        collector.record_operation_error("join_lobby");

        let requests = collector
            .service()
            .requests_total
            .with_label_values(&["join_lobby"])
            .get();
        assert_eq!(requests, 3);

        let errors = collector
            .service()
            .request_errors_total
            .with_label_values(&["join_lobby"])
            .get();
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_gauges_follow_engine_stats() {
        let collector = MetricsCollector::new().expect("Failed to create collector");

        let stats = LobbyEngineStats {
            active_lobbies: 3,
            members_waiting: 7,
            ..Default::default()
        };
        collector.update_from_engine_stats(&stats);

        assert_eq!(collector.lobby().active_lobbies.get(), 3);
        assert_eq!(collector.lobby().members_waiting.get(), 7);
    }

    #[test]
    fn test_health_status_gauge() {
        let collector = MetricsCollector::new().expect("Failed to create collector");

        collector.update_health_status(true);
        assert_eq!(collector.service().health_status.get(), 1);

        collector.update_health_status(false);
        assert_eq!(collector.service().health_status.get(), 0);
    }

    #[test]
    fn test_registry_gathers_metric_families() {
        let collector = MetricsCollector::new().expect("Failed to create collector");
        collector.record_operation("list_lobbies", Duration::from_millis(1));

        let families = collector.registry().gather();
        assert!(families
            .iter()
            .any(|f| f.get_name().starts_with("map_room_")));
    }
}
