//! Shared infrastructure for the zoneroute HTTP service.
//!
//! - [`AppState`]: handle to the zone store, shared by every handler
//! - [`health`]: liveness/readiness probe handlers
//! - [`ProblemDetails`]: RFC 9457 error responses
//! - [`ServiceResponse`]: wrapper for successful responses
//! - [`metrics`]: Prometheus metrics
//! - [`logging`]: structured JSON/text logging setup
//! - [`middleware`]: request correlation and HTTP metrics
//! - Request types with validation for each endpoint
//!
//! # Architecture
//!
//! Handlers stay thin; all graph logic lives in `zoneroute-lib`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse request JSON                                       │
//! │  - Validate parameters                                      │
//! │  - Fetch a fresh snapshot on the blocking pool              │
//! │  - Call zoneroute-lib queries                               │
//! │  - Format response                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Enable the `test-utils` feature to use [`test_utils`] from dependent crates.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    failure_reason, init_metrics, metrics_handler, normalize_metrics_path, record_mutation, record_query_completed,
    record_query_failed, record_zones_reached, MetricsConfig, MetricsError, DEFAULT_METRICS_PATH,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_CONFLICT, PROBLEM_CONNECTION_NOT_FOUND,
    PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST, PROBLEM_ROUTE_NOT_FOUND,
    PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_UNKNOWN_ZONE,
};
pub use request::{
    ConnectionRequest, ConnectionsQuery, CreateZoneRequest, ReachabilityRequest, RouteRequest,
    TravelTimeRequest, Validate, WindowRequest,
};
pub use response::{MessageResponse, ServiceResponse};
pub use state::{AppState, AppStateError};
