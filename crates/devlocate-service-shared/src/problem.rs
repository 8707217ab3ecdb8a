//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! Every problem also carries an `error` extension member holding the
//! human-readable message, so clients that only look for `{"error": ...}`
//! keep working.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use devlocate_lib::Error as LibError;

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for user ids that do not exist.
pub const PROBLEM_UNKNOWN_USER: &str = "/problems/unknown-user";

/// Problem type URI for paths that match no endpoint.
pub const PROBLEM_NOT_FOUND: &str = "/problems/not-found";

/// Problem type URI for an upstream that did not answer in time.
pub const PROBLEM_UPSTREAM_TIMEOUT: &str = "/problems/upstream-timeout";

/// Problem type URI for an unreachable or misbehaving upstream.
pub const PROBLEM_UPSTREAM_UNAVAILABLE: &str = "/problems/upstream-unavailable";

/// Problem type URI for an upstream that rejected the route request.
pub const PROBLEM_UPSTREAM_ROUTE_ERROR: &str = "/problems/upstream-route-error";

/// Problem type URI for an upstream that found no route.
pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// RFC 9457 Problem Details response structure.
///
/// Provides a consistent format for error responses across all endpoints.
///
/// # Example
///
/// ```
/// use devlocate_service_shared::{ProblemDetails, PROBLEM_INVALID_REQUEST};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_INVALID_REQUEST,
///     "Invalid Request",
///     StatusCode::BAD_REQUEST,
/// )
/// .with_detail("Invalid coordinates")
/// .with_request_id("req-12345");
///
/// assert_eq!(problem.error, "Invalid coordinates");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (e.g., request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Extension member: the message clients display.
    pub error: String,

    /// Content type for this response (always "application/problem+json").
    /// Sent as a header, not as a body member.
    #[serde(skip, default = "problem_content_type")]
    pub content_type: String,
}

fn problem_content_type() -> String {
    "application/problem+json".to_string()
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        let title = title.into();
        Self {
            type_uri: type_uri.into(),
            error: title.clone(),
            title,
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: problem_content_type(),
        }
    }

    /// Add a detailed explanation of this specific problem occurrence.
    ///
    /// The detail also becomes the `error` message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.error = detail.clone();
        self.detail = Some(detail);
        self
    }

    /// Add the request identifier for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// Create a 400 Bad Request problem for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 404 Not Found problem for an unknown user id.
    pub fn unknown_user(id: i64, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_UNKNOWN_USER, "Unknown User", StatusCode::NOT_FOUND)
            .with_detail(format!("User {} not found", id))
            .with_request_id(request_id)
    }

    /// Create a 404 Not Found problem for an unmatched path.
    pub fn endpoint_not_found(request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_NOT_FOUND, "Not Found", StatusCode::NOT_FOUND)
            .with_detail("Endpoint not found")
            .with_request_id(request_id)
    }

    /// Create a 504 Gateway Timeout problem.
    pub fn upstream_timeout(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UPSTREAM_TIMEOUT,
            "Upstream Timeout",
            StatusCode::GATEWAY_TIMEOUT,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 502 Bad Gateway problem for an unreachable upstream.
    pub fn upstream_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UPSTREAM_UNAVAILABLE,
            "Upstream Unavailable",
            StatusCode::BAD_GATEWAY,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 502 Bad Gateway problem for an upstream status code.
    pub fn upstream_route_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UPSTREAM_ROUTE_ERROR,
            "Upstream Route Error",
            StatusCode::BAD_GATEWAY,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 502 Bad Gateway problem for an upstream that found no route.
    pub fn route_not_found(request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_ROUTE_NOT_FOUND,
            "Route Not Found",
            StatusCode::BAD_GATEWAY,
        )
        .with_detail("No route found")
        .with_request_id(request_id)
    }

    /// Create a 500 Internal Server Error problem.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.error)
    }
}

impl std::error::Error for ProblemDetails {}

/// Implement IntoResponse for axum to return ProblemDetails as HTTP responses.
impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Set the content-type header to application/problem+json
        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        // Update status code
        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails.
///
/// Validation-type errors become 4xx problems; everything caused by the
/// upstream becomes a 5xx problem. The library message is preserved.
/// The `request_id` must be provided separately since library errors don't have it.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::Validation { message } => ProblemDetails::bad_request(message.clone(), request_id),
        LibError::UnknownUser { id } => ProblemDetails::unknown_user(*id, request_id),
        LibError::UpstreamTimeout { .. } => {
            ProblemDetails::upstream_timeout(error.to_string(), request_id)
        }
        LibError::UpstreamUnavailable { .. } => {
            ProblemDetails::upstream_unavailable(error.to_string(), request_id)
        }
        LibError::UpstreamRoute { .. } => {
            ProblemDetails::upstream_route_error(error.to_string(), request_id)
        }
        LibError::NoRouteFound => ProblemDetails::route_not_found(request_id),
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_problem_details_new() {
        let problem = ProblemDetails::new(
            PROBLEM_UNKNOWN_USER,
            "Unknown User",
            StatusCode::NOT_FOUND,
        );
        assert_eq!(problem.type_uri, PROBLEM_UNKNOWN_USER);
        assert_eq!(problem.title, "Unknown User");
        assert_eq!(problem.error, "Unknown User");
        assert_eq!(problem.status, 404);
        assert_eq!(problem.content_type, "application/problem+json");
    }

    #[test]
    fn test_problem_details_with_detail() {
        let problem = ProblemDetails::new(
            PROBLEM_INVALID_REQUEST,
            "Bad Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail("Missing required field 'latitude'");

        assert_eq!(
            problem.detail.as_deref(),
            Some("Missing required field 'latitude'")
        );
        assert_eq!(problem.error, "Missing required field 'latitude'");
    }

    #[test]
    fn test_problem_details_bad_request() {
        let problem = ProblemDetails::bad_request("Invalid coordinates", "req-123");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.instance.as_deref(), Some("req-123"));
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = ProblemDetails::bad_request("Test error", "req-test");
        let json = serde_json::to_string(&problem).unwrap();

        assert!(json.contains("\"type\":\"/problems/invalid-request\""));
        assert!(json.contains("\"title\":\"Invalid Request\""));
        assert!(json.contains("\"status\":400"));
        assert!(json.contains("\"detail\":\"Test error\""));
        assert!(json.contains("\"error\":\"Test error\""));
        assert!(json.contains("\"instance\":\"req-test\""));
        assert!(!json.contains("content_type"));
    }

    #[test]
    fn test_from_lib_error_validation() {
        let error = LibError::validation("Invalid origin coordinates");
        let problem = from_lib_error(&error, "req-lib");

        assert_eq!(problem.type_uri, PROBLEM_INVALID_REQUEST);
        assert_eq!(problem.status, 400);
        assert_eq!(problem.error, "Invalid origin coordinates");
    }

    #[test]
    fn test_from_lib_error_upstream_kinds_are_server_errors() {
        let cases = [
            (
                LibError::UpstreamTimeout {
                    timeout: Duration::from_secs(10),
                },
                504,
                PROBLEM_UPSTREAM_TIMEOUT,
            ),
            (
                LibError::UpstreamUnavailable {
                    cause: "connection refused".to_string(),
                },
                502,
                PROBLEM_UPSTREAM_UNAVAILABLE,
            ),
            (
                LibError::UpstreamRoute {
                    code: "NoSegment".to_string(),
                },
                502,
                PROBLEM_UPSTREAM_ROUTE_ERROR,
            ),
            (LibError::NoRouteFound, 502, PROBLEM_ROUTE_NOT_FOUND),
        ];

        for (error, status, type_uri) in cases {
            let problem = from_lib_error(&error, "req-up");
            assert_eq!(problem.status, status, "{error:?}");
            assert_eq!(problem.type_uri, type_uri, "{error:?}");
            assert!(!problem.error.is_empty());
        }
    }

    #[test]
    fn test_from_lib_error_keeps_upstream_code() {
        let error = LibError::UpstreamRoute {
            code: "InvalidQuery".to_string(),
        };
        let problem = from_lib_error(&error, "req-code");
        assert!(problem.error.contains("InvalidQuery"));
    }

    #[test]
    fn test_from_lib_error_unknown_user() {
        let problem = from_lib_error(&LibError::UnknownUser { id: 42 }, "req-user");
        assert_eq!(problem.status, 404);
        assert!(problem.error.contains("42"));
    }
}
