//! Health check handlers for liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Zones in the current snapshot (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones_loaded: Option<usize>,

    /// Directed streets in the current snapshot (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections_loaded: Option<usize>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            zones_loaded: None,
            connections_loaded: None,
        }
    }

    pub fn ready(service: &str, version: &str, zones: usize, connections: usize) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            zones_loaded: Some(zones),
            connections_loaded: Some(connections),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            zones_loaded: None,
            connections_loaded: None,
        }
    }
}

/// `GET /health/live`: 200 while the process is running.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// `GET /health/ready`: 200 once a snapshot with at least one zone can be
/// fetched from the store, 503 otherwise.
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"zoneroute-service-shared","version":"0.1.0","zones_loaded":6,"connections_loaded":8}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let store = state.store();
    let snapshot = match tokio::task::spawn_blocking(move || store.fetch_snapshot()).await {
        Ok(Ok(snapshot)) => snapshot,
        Ok(Err(error)) => {
            tracing::warn!(%error, "readiness check could not fetch snapshot");
            let status = HealthStatus::not_ready(service, version, &error.to_string());
            return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
        }
        Err(error) => {
            tracing::error!(%error, "readiness check task failed");
            let status = HealthStatus::not_ready(service, version, "readiness task failed");
            return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
        }
    };

    if snapshot.is_empty() {
        let status = HealthStatus::not_ready(service, version, "no zones loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(
        service,
        version,
        snapshot.zone_count(),
        snapshot.edge_count(),
    );
    (StatusCode::OK, Json(status)).into_response()
}
