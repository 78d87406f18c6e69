//! Metrics collection for the map-room service
//!
//! Prometheus-based metrics exposed by the HTTP server's `/metrics`
//! endpoint.

pub mod collector;

// Re-export commonly used types
pub use collector::MetricsCollector;
