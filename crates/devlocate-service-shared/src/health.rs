//! Health check handlers.
//!
//! `/health` is the plain status check, `/health/live` and `/health/ready`
//! serve orchestrator liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,

    /// Human-readable status line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Service name.
    pub service: String,

    /// Service version from build-time.
    pub version: String,

    /// RFC 3339 time the status was produced.
    pub timestamp: String,

    /// Number of users in the store (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_loaded: Option<usize>,
}

impl HealthStatus {
    fn base(status: String, service: &str, version: &str) -> Self {
        Self {
            status,
            message: None,
            service: service.to_string(),
            version: version.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            users_loaded: None,
        }
    }

    /// A healthy liveness status.
    pub fn alive(service: &str, version: &str) -> Self {
        Self::base("ok".to_string(), service, version)
    }

    /// A ready status reporting the loaded user count.
    pub fn ready(service: &str, version: &str, users: usize) -> Self {
        Self {
            users_loaded: Some(users),
            ..Self::base("ok".to_string(), service, version)
        }
    }

    /// A not-ready status.
    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self::base(format!("not_ready: {}", reason), service, version)
    }

    /// Attach a status message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

const SERVICE: &str = "devlocate";
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `GET /health`.
///
/// ```text
/// {"status":"ok","message":"DevLocate is running","service":"devlocate","version":"0.1.0","timestamp":"..."}
/// ```
pub async fn health_check() -> impl IntoResponse {
    Json(HealthStatus::alive(SERVICE, VERSION).with_message("DevLocate is running"))
}

/// Liveness probe handler. Always 200 while the process serves requests.
pub async fn health_live() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthStatus::alive(SERVICE, VERSION)))
}

/// Readiness probe handler.
///
/// Returns 503 when the user store is empty since nearby queries would all
/// fail with "No users found".
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let user_count = state.users().len();

    if user_count == 0 {
        let status = HealthStatus::not_ready(SERVICE, VERSION, "no users loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(SERVICE, VERSION, user_count);
    (StatusCode::OK, Json(status)).into_response()
}
