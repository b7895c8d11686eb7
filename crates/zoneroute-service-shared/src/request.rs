//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};
use zoneroute_lib::{Connection, Zone, ZoneKind};

use crate::ProblemDetails;

/// Validation trait for request types.
pub trait Validate {
    /// Validate the request. The `request_id` populates the `instance` field
    /// of any returned `ProblemDetails`, which is boxed to keep `Err` small.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

fn require(value: &str, field: &str, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    if value.trim().is_empty() {
        return Err(Box::new(ProblemDetails::bad_request(
            format!("The '{field}' field is required and cannot be empty"),
            request_id,
        )));
    }
    Ok(())
}

fn require_positive(value: f64, field: &str, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Box::new(ProblemDetails::bad_request(
            format!("The '{field}' field must be a positive number"),
            request_id,
        )));
    }
    Ok(())
}

/// Request for the shortest route between two zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub from: String,
    pub to: String,
}

impl Validate for RouteRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require(&self.from, "from", request_id)?;
        require(&self.to, "to", request_id)
    }
}

/// Query string for listing connections, optionally by traffic level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionsQuery {
    #[serde(default)]
    pub traffic: Option<String>,
}

impl Validate for ConnectionsQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        match &self.traffic {
            Some(traffic) => require(traffic, "traffic", request_id),
            None => Ok(()),
        }
    }
}

/// Request for the accessible/inaccessible partition from one zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachabilityRequest {
    pub from: String,
}

impl Validate for ReachabilityRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require(&self.from, "from", request_id)
    }
}

/// Request for every zone reachable within a time budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowRequest {
    pub from: String,
    /// Strict upper bound on travel time, in minutes.
    pub budget_minutes: f64,
}

impl Validate for WindowRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require(&self.from, "from", request_id)?;
        require_positive(self.budget_minutes, "budget_minutes", request_id)
    }
}

/// Addresses one directed street, for closing or reopening it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub from: String,
    pub to: String,
}

impl Validate for ConnectionRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require(&self.from, "from", request_id)?;
        require(&self.to, "to", request_id)
    }
}

/// Request to change the travel time of one directed street.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelTimeRequest {
    pub from: String,
    pub to: String,
    pub travel_minutes: f64,
}

impl Validate for TravelTimeRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require(&self.from, "from", request_id)?;
        require(&self.to, "to", request_id)?;
        require_positive(self.travel_minutes, "travel_minutes", request_id)
    }
}

/// Request to add a zone together with the streets that link it to the
/// network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateZoneRequest {
    pub zone: Zone,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Validate for CreateZoneRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require(&self.zone.name, "zone.name", request_id)?;

        if let ZoneKind::DistributionCenter { vehicle_capacity } = self.zone.kind {
            if vehicle_capacity == 0 {
                return Err(Box::new(ProblemDetails::bad_request(
                    "A distribution center needs a 'vehicle_capacity' of at least 1",
                    request_id,
                )));
            }
        }

        for connection in &self.connections {
            if let Err(error) = connection.validate() {
                return Err(Box::new(ProblemDetails::bad_request(
                    error.to_string(),
                    request_id,
                )));
            }
            if connection.source != self.zone.name && connection.target != self.zone.name {
                return Err(Box::new(ProblemDetails::bad_request(
                    format!(
                        "Connection {} -> {} does not involve zone '{}'",
                        connection.source, connection.target, self.zone.name
                    ),
                    request_id,
                )));
            }
        }

        Ok(())
    }
}
