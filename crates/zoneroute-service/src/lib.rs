//! Zoneroute delivery-network routing HTTP service.
//!
//! # Endpoints
//!
//! - `GET /api/v1/zones` - List every zone
//! - `POST /api/v1/zones` - Create a zone together with its connections
//! - `POST /api/v1/route` - Minimum travel-time route between two zones
//! - `POST /api/v1/reachability` - Accessible and inaccessible zones from a source
//! - `POST /api/v1/reachability/window` - Zones reachable within a time budget
//! - `GET /api/v1/connections` - List streets, optionally `?traffic=heavy`
//! - `POST /api/v1/connections/close` - Close a street
//! - `POST /api/v1/connections/open` - Reopen a street
//! - `PUT /api/v1/connections/time` - Change a street's travel time
//! - `GET /metrics` - Prometheus metrics endpoint (path set by `METRICS_PATH`)
//! - `GET /health/live` / `GET /health/ready` - Probes
//!
//! # Configuration
//!
//! - `ZONEROUTE_DB_PATH` - SQLite zone store (default: `data/zones.db`, created if missing)
//! - `ZONEROUTE_SEED_PATH` - JSON seed applied at startup when the store is empty
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` / `LOG_FORMAT` - Logging filter and format (json or text)
//! - `METRICS_ENABLED` - Set to `false` to disable the Prometheus recorder
//! - `METRICS_PATH` - Route for the Prometheus endpoint (default: `/metrics`)

use std::path::PathBuf;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use zoneroute_lib::{
    plan_route, reachable_zones, zones_within, Connection, Error as LibError, Result as LibResult,
    RouteRequest as LibRouteRequest, Zone, ZoneStore,
};
use zoneroute_service_shared::{
    failure_reason, from_lib_error, health_live, health_ready, metrics_handler, record_mutation,
    record_query_completed, record_query_failed, record_zones_reached, AppState,
    ConnectionRequest, ConnectionsQuery, CreateZoneRequest, MessageResponse, MetricsLayer,
    ProblemDetails, ReachabilityRequest, RequestId, RouteRequest, ServiceResponse,
    TravelTimeRequest, Validate, WindowRequest, DEFAULT_METRICS_PATH,
};

/// Default location of the zone store.
pub const DEFAULT_DB_PATH: &str = "data/zones.db";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub seed_path: Option<PathBuf>,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("ZONEROUTE_DB_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let port = match lookup("SERVICE_PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, default = DEFAULT_PORT, "invalid SERVICE_PORT, using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };
        let seed_path = lookup("ZONEROUTE_SEED_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            db_path: PathBuf::from(db_path),
            port,
            seed_path,
        }
    }
}

/// Build the application router around `state`, serving metrics on the
/// default path.
pub fn build_router(state: AppState) -> Router {
    build_router_with_metrics(state, DEFAULT_METRICS_PATH)
}

/// Build the application router with the Prometheus endpoint mounted at
/// `metrics_path` (see `METRICS_PATH`).
pub fn build_router_with_metrics(state: AppState, metrics_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/zones", get(list_zones_handler).post(create_zone_handler))
        .route("/api/v1/route", post(route_handler))
        .route("/api/v1/reachability", post(reachability_handler))
        .route("/api/v1/reachability/window", post(window_handler))
        .route("/api/v1/connections", get(list_connections_handler))
        .route("/api/v1/connections/close", post(close_connection_handler))
        .route("/api/v1/connections/open", post(open_connection_handler))
        .route("/api/v1/connections/time", put(travel_time_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(MetricsLayer)
        .layer(cors)
        .with_state(state)
}

type HandlerResult<T> = Result<ServiceResponse<T>, ProblemDetails>;

/// Zone listing returned by `GET /api/v1/zones`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ZonesResponse {
    pub count: usize,
    pub zones: Vec<Zone>,
}

/// Street listing returned by `GET /api/v1/connections`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<String>,
    pub count: usize,
    pub connections: Vec<Connection>,
}

/// Shortest route between two zones.
#[derive(Debug, Serialize, Deserialize)]
pub struct RouteResponse {
    pub from: String,
    pub to: String,
    /// Zone names from source to destination, both inclusive.
    pub path: Vec<String>,
    pub total_minutes: f64,
    pub hops: usize,
}

/// Partition of every zone by reachability from `from`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReachabilityResponse {
    pub from: String,
    pub accessible: Vec<String>,
    pub inaccessible: Vec<String>,
}

/// One destination inside the time budget.
#[derive(Debug, Serialize, Deserialize)]
pub struct WindowDestination {
    pub zone: String,
    pub path: Vec<String>,
    pub total_minutes: f64,
    pub hops: usize,
}

/// Destinations reachable in strictly less than `budget_minutes`, cheapest first.
#[derive(Debug, Serialize, Deserialize)]
pub struct WindowResponse {
    pub from: String,
    pub budget_minutes: f64,
    pub destinations: Vec<WindowDestination>,
}

/// Run `task` against the store on the blocking pool.
async fn blocking<T, F>(state: &AppState, task: F) -> Result<LibResult<T>, ProblemDetails>
where
    T: Send + 'static,
    F: FnOnce(&dyn ZoneStore) -> LibResult<T> + Send + 'static,
{
    let store = state.store();
    tokio::task::spawn_blocking(move || task(store.as_ref()))
        .await
        .map_err(|e| {
            error!(error = %e, "blocking store task failed");
            ProblemDetails::internal_error("store task failed", "")
        })
}

/// Run a read-only query, recording failure metrics and mapping errors to
/// problem responses.
async fn run_query<T, F>(
    state: &AppState,
    query: &'static str,
    request_id: &RequestId,
    task: F,
) -> Result<T, ProblemDetails>
where
    T: Send + 'static,
    F: FnOnce(&dyn ZoneStore) -> LibResult<T> + Send + 'static,
{
    match blocking(state, task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            let reason = failure_reason(&e);
            log_lib_error(&e, request_id, query);
            record_query_failed(query, reason);
            Err(from_lib_error(&e, request_id.as_str()))
        }
        Err(problem) => {
            record_query_failed(query, "internal_error");
            Err(problem.with_request_id(request_id.as_str()))
        }
    }
}

/// Run a store mutation, recording its outcome.
async fn run_mutation<F>(
    state: &AppState,
    operation: &'static str,
    request_id: &RequestId,
    task: F,
) -> Result<(), ProblemDetails>
where
    F: FnOnce(&dyn ZoneStore) -> LibResult<()> + Send + 'static,
{
    let result = match blocking(state, task).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            log_lib_error(&e, request_id, operation);
            Err(from_lib_error(&e, request_id.as_str()))
        }
        Err(problem) => Err(problem.with_request_id(request_id.as_str())),
    };
    record_mutation(operation, result.is_ok());
    result
}

fn log_lib_error(error: &LibError, request_id: &RequestId, operation: &str) {
    match error {
        LibError::StoreUnavailable { .. }
        | LibError::InconsistentData { .. }
        | LibError::BrokenChain { .. }
        | LibError::ReconstructionLoop { .. }
        | LibError::Sqlite(_)
        | LibError::Io(_)
        | LibError::Json(_) => {
            error!(request_id = %request_id, operation, error = %error, "request failed");
        }
        _ => info!(request_id = %request_id, operation, error = %error, "request rejected"),
    }
}

fn reject<R: Validate>(
    request: &R,
    request_id: &RequestId,
    query: &'static str,
) -> Result<(), ProblemDetails> {
    request.validate(request_id.as_str()).map_err(|problem| {
        record_query_failed(query, "validation_error");
        *problem
    })
}

/// Handle `GET /api/v1/zones`.
async fn list_zones_handler(
    State(state): State<AppState>,
    request_id: RequestId,
) -> HandlerResult<ZonesResponse> {
    let zones = run_query(&state, "zones", &request_id, |store| store.list_zones()).await?;
    record_query_completed("zones");
    Ok(ServiceResponse::new(ZonesResponse {
        count: zones.len(),
        zones,
    }))
}

/// Handle `GET /api/v1/connections`.
async fn list_connections_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Query(query): Query<ConnectionsQuery>,
) -> HandlerResult<ConnectionsResponse> {
    reject(&query, &request_id, "connections")?;

    let traffic = query.traffic.map(|t| t.trim().to_string());
    let filter = traffic.clone();
    let connections = run_query(&state, "connections", &request_id, move |store| match filter {
        Some(level) => store.list_connections_by_traffic(&level),
        None => store.list_connections(),
    })
    .await?;

    record_query_completed("connections");
    Ok(ServiceResponse::new(ConnectionsResponse {
        traffic,
        count: connections.len(),
        connections,
    }))
}

/// Handle `POST /api/v1/zones`.
async fn create_zone_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<CreateZoneRequest>,
) -> Result<(StatusCode, ServiceResponse<MessageResponse>), ProblemDetails> {
    if let Err(problem) = request.validate(request_id.as_str()) {
        record_mutation("create_zone", false);
        return Err(*problem);
    }

    let name = request.zone.name.clone();
    let connection_count = request.connections.len();
    run_mutation(&state, "create_zone", &request_id, move |store| {
        store.create_zone(&request.zone, &request.connections)
    })
    .await?;

    info!(
        request_id = %request_id,
        zone = %name,
        connections = connection_count,
        "zone created"
    );
    Ok((
        StatusCode::CREATED,
        ServiceResponse::new(MessageResponse::new(format!(
            "Zone '{}' created with {} connection(s)",
            name, connection_count
        ))),
    ))
}

/// Handle `POST /api/v1/route`.
async fn route_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<RouteRequest>,
) -> HandlerResult<RouteResponse> {
    info!(
        request_id = %request_id,
        from = %request.from,
        to = %request.to,
        "handling route request"
    );
    reject(&request, &request_id, "route")?;

    let lib_request = LibRouteRequest::new(request.from, request.to);
    let plan = run_query(&state, "route", &request_id, move |store| {
        let snapshot = store.fetch_snapshot()?;
        plan_route(&snapshot, &lib_request)
    })
    .await?;

    let hops = plan.hop_count();
    record_query_completed("route");
    record_zones_reached(plan.path.len(), "route");
    info!(
        request_id = %request_id,
        hops,
        total_minutes = plan.total_minutes,
        "route computed successfully"
    );

    Ok(ServiceResponse::new(RouteResponse {
        from: plan.source,
        to: plan.destination,
        path: plan.path,
        total_minutes: plan.total_minutes,
        hops,
    }))
}

/// Handle `POST /api/v1/reachability`.
async fn reachability_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<ReachabilityRequest>,
) -> HandlerResult<ReachabilityResponse> {
    reject(&request, &request_id, "reachability")?;

    let from = request.from;
    let report = run_query(&state, "reachability", &request_id, move |store| {
        let snapshot = store.fetch_snapshot()?;
        Ok(reachable_zones(&snapshot, &from))
    })
    .await?;

    record_query_completed("reachability");
    record_zones_reached(report.accessible.len(), "reachability");
    info!(
        request_id = %request_id,
        accessible = report.accessible.len(),
        inaccessible = report.inaccessible.len(),
        "reachability computed"
    );

    Ok(ServiceResponse::new(ReachabilityResponse {
        from: report.source,
        accessible: report.accessible,
        inaccessible: report.inaccessible,
    }))
}

/// Handle `POST /api/v1/reachability/window`.
async fn window_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<WindowRequest>,
) -> HandlerResult<WindowResponse> {
    reject(&request, &request_id, "window")?;

    let from = request.from.clone();
    let budget = request.budget_minutes;
    let plans = run_query(&state, "window", &request_id, move |store| {
        let snapshot = store.fetch_snapshot()?;
        zones_within(&snapshot, &from, budget)
    })
    .await?;

    record_query_completed("window");
    record_zones_reached(plans.len(), "window");
    info!(
        request_id = %request_id,
        budget_minutes = budget,
        destinations = plans.len(),
        "windowed reachability computed"
    );

    let destinations = plans
        .into_iter()
        .map(|plan| WindowDestination {
            hops: plan.hop_count(),
            zone: plan.destination,
            path: plan.path,
            total_minutes: plan.total_minutes,
        })
        .collect();

    Ok(ServiceResponse::new(WindowResponse {
        from: request.from,
        budget_minutes: budget,
        destinations,
    }))
}

async fn set_accessible(
    state: AppState,
    request_id: RequestId,
    request: ConnectionRequest,
    accessible: bool,
) -> HandlerResult<MessageResponse> {
    let operation = if accessible {
        "open_connection"
    } else {
        "close_connection"
    };
    if let Err(problem) = request.validate(request_id.as_str()) {
        record_mutation(operation, false);
        return Err(*problem);
    }

    let (from, to) = (request.from.clone(), request.to.clone());
    run_mutation(&state, operation, &request_id, move |store| {
        store.set_connection_accessible(&from, &to, accessible)
    })
    .await?;

    let verb = if accessible { "opened" } else { "closed" };
    info!(request_id = %request_id, from = %request.from, to = %request.to, verb, "connection updated");
    Ok(ServiceResponse::new(MessageResponse::new(format!(
        "Connection {} -> {} {}",
        request.from, request.to, verb
    ))))
}

/// Handle `POST /api/v1/connections/close`.
async fn close_connection_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<ConnectionRequest>,
) -> HandlerResult<MessageResponse> {
    set_accessible(state, request_id, request, false).await
}

/// Handle `POST /api/v1/connections/open`.
async fn open_connection_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<ConnectionRequest>,
) -> HandlerResult<MessageResponse> {
    set_accessible(state, request_id, request, true).await
}

/// Handle `PUT /api/v1/connections/time`.
async fn travel_time_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<TravelTimeRequest>,
) -> HandlerResult<MessageResponse> {
    if let Err(problem) = request.validate(request_id.as_str()) {
        record_mutation("update_travel_time", false);
        return Err(*problem);
    }

    let (from, to, minutes) = (
        request.from.clone(),
        request.to.clone(),
        request.travel_minutes,
    );
    run_mutation(&state, "update_travel_time", &request_id, move |store| {
        store.update_travel_time(&from, &to, minutes)
    })
    .await?;

    info!(
        request_id = %request_id,
        from = %request.from,
        to = %request.to,
        minutes,
        "travel time updated"
    );
    Ok(ServiceResponse::new(MessageResponse::new(format!(
        "Travel time {} -> {} set to {} minutes",
        request.from, request.to, minutes
    ))))
}
