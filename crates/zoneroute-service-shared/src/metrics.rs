//! Prometheus metrics for the zoneroute service.
//!
//! - [`MetricsConfig`] / [`init_metrics`]: install the Prometheus recorder
//! - [`metrics_handler`]: axum handler for `/metrics`
//! - Query and mutation helpers recording the `zoneroute_*` series
//!
//! ```no_run
//! use zoneroute_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! init_metrics(&MetricsConfig::default()).expect("failed to initialize metrics");
//! let app: Router = Router::new().route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use zoneroute_lib::Error as LibError;

/// Route serving the Prometheus exposition unless `METRICS_PATH` overrides it.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Configuration for the metrics system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Path for the metrics endpoint (e.g., "/metrics").
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

impl MetricsConfig {
    /// `METRICS_ENABLED` ("false" disables, default true) and `METRICS_PATH`
    /// (default "/metrics").
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let path = std::env::var("METRICS_PATH")
            .map(|raw| normalize_metrics_path(&raw))
            .unwrap_or_else(|_| DEFAULT_METRICS_PATH.to_string());

        Self { enabled, path }
    }
}

/// Turn a configured route into one axum accepts: blank falls back to the
/// default and a missing leading slash is added.
pub fn normalize_metrics_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "/" {
        DEFAULT_METRICS_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Install the Prometheus recorder. Call once at startup; later calls fail
/// with [`MetricsError::AlreadyInitialized`].
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    Ok(())
}

/// Axum handler for the `/metrics` endpoint (Prometheus exposition format).
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

/// Errors that can occur during metrics initialization.
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

/// Increment `zoneroute_queries_total` for a successful query
/// (`route`, `reachability`, `window`).
pub fn record_query_completed(query: &str) {
    metrics::counter!("zoneroute_queries_total", "query" => query.to_string()).increment(1);
}

/// Increment `zoneroute_queries_failed_total`.
pub fn record_query_failed(query: &str, reason: &str) {
    metrics::counter!(
        "zoneroute_queries_failed_total",
        "query" => query.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record how many zones a query returned in `zoneroute_zones_reached`.
pub fn record_zones_reached(count: usize, query: &str) {
    metrics::histogram!("zoneroute_zones_reached", "query" => query.to_string())
        .record(count as f64);
}

/// Increment `zoneroute_mutations_total`, labelled by operation and outcome.
pub fn record_mutation(operation: &str, succeeded: bool) {
    metrics::counter!(
        "zoneroute_mutations_total",
        "operation" => operation.to_string(),
        "outcome" => if succeeded { "ok" } else { "error" }
    )
    .increment(1);
}

/// Low-cardinality label describing why a library call failed.
pub fn failure_reason(error: &LibError) -> &'static str {
    match error {
        LibError::UnknownSource { .. }
        | LibError::UnknownDestination { .. }
        | LibError::UnknownZone { .. } => "unknown_zone",
        LibError::Unreachable { .. } => "unreachable",
        LibError::BrokenChain { .. } | LibError::ReconstructionLoop { .. } => "invariant_violation",
        LibError::StoreUnavailable { .. } => "store_unavailable",
        LibError::InconsistentData { .. } => "inconsistent_data",
        LibError::ConnectionNotFound { .. } => "connection_not_found",
        LibError::DuplicateZone { .. } => "duplicate_zone",
        LibError::InvalidZone { .. }
        | LibError::InvalidConnection { .. }
        | LibError::InvalidBudget { .. }
        | LibError::InvalidSeed { .. } => "validation_error",
        LibError::Sqlite(_) | LibError::Io(_) | LibError::Json(_) => "internal_error",
    }
}
