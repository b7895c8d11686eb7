//! RFC 9457 Problem Details for HTTP APIs.
//!
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use zoneroute_lib::Error as LibError;

/// Problem type URI for unknown zone names.
pub const PROBLEM_UNKNOWN_ZONE: &str = "/problems/unknown-zone";

/// Problem type URI for destinations that cannot be reached.
pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";

/// Problem type URI for mutations addressing a missing connection.
pub const PROBLEM_CONNECTION_NOT_FOUND: &str = "/problems/connection-not-found";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for conflicting writes.
pub const PROBLEM_CONFLICT: &str = "/problems/conflict";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Problem type URI for an unreachable zone store.
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use zoneroute_service_shared::{ProblemDetails, PROBLEM_UNKNOWN_ZONE};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(PROBLEM_UNKNOWN_ZONE, "Unknown Zone", StatusCode::NOT_FOUND)
///     .with_detail("Zone 'Centr' not found. Did you mean: Centro?")
///     .with_request_id("req-12345");
/// assert_eq!(problem.status, 404);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request identifier of the failing call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Always "application/problem+json".
    pub content_type: String,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 Bad Request for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 Not Found for a zone name that is not part of the network.
    pub fn unknown_zone(name: &str, suggestions: &[String], request_id: impl Into<String>) -> Self {
        let detail = if suggestions.is_empty() {
            format!("Zone '{}' not found", name)
        } else {
            format!(
                "Zone '{}' not found. Did you mean: {}?",
                name,
                suggestions.join(", ")
            )
        };

        Self::new(PROBLEM_UNKNOWN_ZONE, "Unknown Zone", StatusCode::NOT_FOUND)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    /// 404 Not Found when no open streets lead to the destination.
    pub fn route_not_found(from: &str, to: &str, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_ROUTE_NOT_FOUND,
            "Route Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("No open route exists from '{}' to '{}'", from, to))
        .with_request_id(request_id)
    }

    /// 404 Not Found for a connection mutation without a matching street.
    pub fn connection_not_found(from: &str, to: &str, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_CONNECTION_NOT_FOUND,
            "Connection Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("No connection from '{}' to '{}'", from, to))
        .with_request_id(request_id)
    }

    /// 409 Conflict for writes that collide with existing data.
    pub fn conflict(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_CONFLICT, "Conflict", StatusCode::CONFLICT)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    /// 500 Internal Server Error.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 503 Service Unavailable.
    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.detail.as_deref().unwrap_or(""))
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails.
///
/// The `request_id` must be provided separately since library errors don't have it.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::UnknownSource { name, suggestions }
        | LibError::UnknownDestination { name, suggestions } => {
            ProblemDetails::unknown_zone(name, suggestions, request_id)
        }
        LibError::UnknownZone { name } => ProblemDetails::unknown_zone(name, &[], request_id),
        LibError::Unreachable {
            source_zone,
            destination,
        } => ProblemDetails::route_not_found(source_zone, destination, request_id),
        LibError::ConnectionNotFound { from, to } => {
            ProblemDetails::connection_not_found(from, to, request_id)
        }
        LibError::InvalidZone { .. }
        | LibError::InvalidConnection { .. }
        | LibError::InvalidBudget { .. }
        | LibError::InvalidSeed { .. } => ProblemDetails::bad_request(error.to_string(), request_id),
        LibError::DuplicateZone { .. } => ProblemDetails::conflict(error.to_string(), request_id),
        LibError::StoreUnavailable { .. } => {
            ProblemDetails::service_unavailable(error.to_string(), request_id)
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_details_new() {
        let problem =
            ProblemDetails::new(PROBLEM_UNKNOWN_ZONE, "Unknown Zone", StatusCode::NOT_FOUND);
        assert_eq!(problem.type_uri, PROBLEM_UNKNOWN_ZONE);
        assert_eq!(problem.status, 404);
        assert_eq!(problem.content_type, "application/problem+json");
    }

    #[test]
    fn test_unknown_zone_with_suggestions() {
        let suggestions = vec!["Centro".to_string(), "Centro Norte".to_string()];
        let problem = ProblemDetails::unknown_zone("Centr", &suggestions, "req-456");

        let detail = problem.detail.as_deref().unwrap();
        assert!(detail.contains("Centr"));
        assert!(detail.contains("Centro, Centro Norte"));
    }

    #[test]
    fn test_unknown_zone_no_suggestions() {
        let problem = ProblemDetails::unknown_zone("XYZ", &[], "req-789");
        assert!(!problem.detail.as_deref().unwrap().contains("Did you mean"));
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = ProblemDetails::bad_request("Test error", "req-test");
        let json = serde_json::to_string(&problem).unwrap();

        assert!(json.contains("\"type\":\"/problems/invalid-request\""));
        assert!(json.contains("\"status\":400"));
        assert!(json.contains("\"instance\":\"req-test\""));
    }

    #[test]
    fn test_from_lib_error_status_mapping() {
        let cases = [
            (
                LibError::UnknownDestination {
                    name: "Nowhere".to_string(),
                    suggestions: vec![],
                },
                404,
                PROBLEM_UNKNOWN_ZONE,
            ),
            (
                LibError::Unreachable {
                    source_zone: "A".to_string(),
                    destination: "B".to_string(),
                },
                404,
                PROBLEM_ROUTE_NOT_FOUND,
            ),
            (
                LibError::InvalidZone {
                    name: String::new(),
                    reason: "zone name is required".to_string(),
                },
                400,
                PROBLEM_INVALID_REQUEST,
            ),
            (
                LibError::InvalidBudget { budget: -1.0 },
                400,
                PROBLEM_INVALID_REQUEST,
            ),
            (
                LibError::DuplicateZone {
                    name: "Centro".to_string(),
                },
                409,
                PROBLEM_CONFLICT,
            ),
            (
                LibError::StoreUnavailable {
                    path: "zones.db".into(),
                    message: "missing".to_string(),
                },
                503,
                PROBLEM_SERVICE_UNAVAILABLE,
            ),
            (
                LibError::ReconstructionLoop {
                    destination: "C".to_string(),
                    limit: 3,
                },
                500,
                PROBLEM_INTERNAL_ERROR,
            ),
        ];

        for (error, status, type_uri) in cases {
            let problem = from_lib_error(&error, "req-lib");
            assert_eq!(problem.status, status, "{error}");
            assert_eq!(problem.type_uri, type_uri, "{error}");
            assert_eq!(problem.instance.as_deref(), Some("req-lib"));
        }
    }

    #[test]
    fn test_from_lib_error_route_not_found_names_both_zones() {
        let error = LibError::Unreachable {
            source_zone: "Centro".to_string(),
            destination: "Sur".to_string(),
        };
        let detail = from_lib_error(&error, "req").detail.unwrap();
        assert!(detail.contains("Centro"));
        assert!(detail.contains("Sur"));
    }
}
