//! Prometheus metrics for the Starlane services.
//!
//! - [`MetricsConfig`]: Configuration for the metrics system
//! - [`init_metrics`]: Initialize the Prometheus metrics recorder
//! - [`metrics_handler`]: Axum handler for `/metrics` endpoint
//! - Business metric helpers for route planning
//!
//! # Example
//!
//! ```no_run
//! use starlane_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config).expect("failed to initialize metrics");
//!
//! let app: Router = Router::new().route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// `METRICS_ENABLED`: anything but "false" (case-insensitive) enables metrics.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var("METRICS_ENABLED").ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        let enabled = value
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        Self { enabled }
    }
}

/// Install the Prometheus recorder. Call once at startup.
///
/// # Errors
///
/// Fails when metrics are disabled, already installed, or the builder fails.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    Ok(())
}

/// Axum handler for `/metrics`, in Prometheus exposition format.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Count a completed route request.
///
/// `outcome` is "reachable" or "unreachable"; an unreachable goal is a
/// successful answer, not a failure.
pub fn record_route_planned(outcome: &str, service: &str) {
    metrics::counter!(
        "starlane_routes_planned_total",
        "outcome" => outcome.to_string(),
        "service" => service.to_string()
    )
    .increment(1);
}

/// Count a route request rejected or failed before a plan was produced.
///
/// `reason` is one of "validation_error", "unknown_system", "store_error",
/// "internal_error".
pub fn record_route_failed(reason: &str, service: &str) {
    metrics::counter!(
        "starlane_routes_failed_total",
        "reason" => reason.to_string(),
        "service" => service.to_string()
    )
    .increment(1);
}

/// Hops and legs of a reachable route.
pub fn record_route_hops(hops: usize, legs: usize) {
    metrics::histogram!("starlane_route_hops").record(hops as f64);
    metrics::histogram!("starlane_route_legs").record(legs as f64);
}

/// Size of a visible-systems listing.
pub fn record_systems_listed(count: usize, service: &str) {
    metrics::histogram!(
        "starlane_systems_listed",
        "service" => service.to_string()
    )
    .record(count as f64);
}
