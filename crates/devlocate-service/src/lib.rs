//! Router and handlers for the DevLocate HTTP service.
//!
//! The binary in `main.rs` only wires configuration, logging and metrics
//! around [`router`].

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use devlocate_lib::{NearbyUsers, RouteResult, User, UserId, nearby_users};
use devlocate_service_shared::{
    AppState, MetricsConfig, MetricsError, MetricsLayer, NearbyQuery, ProblemDetails, RequestId,
    RouteQuery, ServiceResponse, Validate, from_lib_error, health_check, health_live,
    health_ready, init_metrics, metrics_handler, record_nearby_query, record_neighbors_returned,
    record_route_failed, record_route_proxied, record_upstream_latency,
};

/// Listing returned by `GET /api/users/all`.
#[derive(Debug, Serialize)]
pub struct UserListing {
    pub count: usize,
    pub users: Vec<User>,
}

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success(ServiceResponse<T>),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiResponse::Success(data) => data.into_response(),
            ApiResponse::Error(problem) => problem.into_response(),
        }
    }
}

impl<T> From<Box<ProblemDetails>> for ApiResponse<T> {
    fn from(problem: Box<ProblemDetails>) -> Self {
        ApiResponse::Error(*problem)
    }
}

/// Install the Prometheus recorder, returning whether metrics are active.
///
/// Startup continues without metrics on any failure. A disabled recorder is
/// logged at `info` since it is a deliberate setting.
pub fn install_metrics(config: &MetricsConfig) -> bool {
    match init_metrics(config) {
        Ok(()) => true,
        Err(MetricsError::Disabled) => {
            info!("metrics disabled by configuration");
            false
        }
        Err(e) => {
            warn!(error = %e, "failed to initialize metrics, continuing without metrics");
            false
        }
    }
}

/// Build the service router.
///
/// `cors_allow_any` attaches a permissive CORS layer for browser clients.
pub fn router(state: AppState, cors_allow_any: bool) -> Router {
    let mut router = Router::new()
        .route("/api/users/nearby", get(nearby_handler))
        .route("/api/users/all", get(all_users_handler))
        .route("/api/users/{id}", get(user_by_id_handler))
        .route("/api/osm/route", get(route_handler))
        .route("/api/info", get(info_handler))
        .route("/health", get(health_check))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(MetricsLayer);

    if cors_allow_any {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

/// Handle `GET /api/users/nearby?latitude=..&longitude=..&k=..`.
pub async fn nearby_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> ApiResponse<NearbyUsers> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            record_nearby_query("validation_error");
            return ApiResponse::Error(rejected(rejection.body_text(), &request_id));
        }
    };
    let request = match query.validate(request_id.as_str()) {
        Ok(request) => request,
        Err(problem) => {
            record_nearby_query("validation_error");
            return problem.into();
        }
    };

    info!(
        request_id = %request_id,
        location = %request.location,
        k = request.k,
        "handling nearby request"
    );

    match nearby_users(state.users(), request.location, request.k) {
        Ok(nearby) => {
            record_nearby_query("ok");
            record_neighbors_returned(nearby.count);
            info!(request_id = %request_id, count = nearby.count, "nearby users found");
            ApiResponse::Success(ServiceResponse::new(nearby))
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "nearby query rejected");
            record_nearby_query(e.kind());
            ApiResponse::Error(from_lib_error(&e, request_id.as_str()))
        }
    }
}

/// Handle `GET /api/osm/route?origin_lat=..&origin_lon=..&destination_lat=..&destination_lon=..`.
pub async fn route_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    query: Result<Query<RouteQuery>, QueryRejection>,
) -> ApiResponse<RouteResult> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            record_route_failed("validation_error");
            return ApiResponse::Error(rejected(rejection.body_text(), &request_id));
        }
    };
    let request = match query.validate(request_id.as_str()) {
        Ok(request) => request,
        Err(problem) => {
            record_route_failed("validation_error");
            return problem.into();
        }
    };

    info!(
        request_id = %request_id,
        origin = %request.origin,
        destination = %request.destination,
        "handling route request"
    );

    let started = Instant::now();
    let outcome = state
        .osrm()
        .get_route(request.origin, request.destination)
        .await;

    match outcome {
        Ok(route) => {
            record_upstream_latency(started.elapsed());
            record_route_proxied();
            info!(
                request_id = %request_id,
                distance_km = route.distance_km,
                duration_minutes = route.duration_minutes,
                "route proxied"
            );
            ApiResponse::Success(ServiceResponse::new(route))
        }
        Err(e) => {
            if e.is_upstream() {
                record_upstream_latency(started.elapsed());
            }
            record_route_failed(e.kind());
            warn!(request_id = %request_id, error = %e, kind = e.kind(), "route request failed");
            ApiResponse::Error(from_lib_error(&e, request_id.as_str()))
        }
    }
}

/// Handle `GET /api/users/all`.
pub async fn all_users_handler(State(state): State<AppState>) -> ApiResponse<UserListing> {
    let users = state.users().all().to_vec();
    ApiResponse::Success(ServiceResponse::new(UserListing {
        count: users.len(),
        users,
    }))
}

/// Handle `GET /api/users/{id}`.
pub async fn user_by_id_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    raw_id: Result<Path<String>, PathRejection>,
) -> ApiResponse<User> {
    let id = match raw_id {
        Ok(Path(raw_id)) => raw_id.trim().parse::<UserId>().ok(),
        Err(rejection) => {
            warn!(request_id = %request_id, error = %rejection.body_text(), "user id rejected");
            None
        }
    };
    let Some(id) = id else {
        return ApiResponse::Error(ProblemDetails::bad_request(
            "User id must be an integer",
            request_id.as_str(),
        ));
    };

    match state.users().get(id) {
        Ok(user) => ApiResponse::Success(ServiceResponse::new(user.clone())),
        Err(e) => ApiResponse::Error(from_lib_error(&e, request_id.as_str())),
    }
}

/// Handle `GET /api/info`.
pub async fn info_handler() -> impl IntoResponse {
    Json(json!({
        "app": "DevLocate",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "nearby": "/api/users/nearby",
            "users": "/api/users/all",
            "user": "/api/users/{id}",
            "route": "/api/osm/route",
            "metrics": "/metrics"
        }
    }))
}

/// Map an extractor rejection onto a 400 problem body.
fn rejected(reason: String, request_id: &RequestId) -> ProblemDetails {
    warn!(request_id = %request_id, error = %reason, "query string rejected");
    ProblemDetails::bad_request(reason, request_id.as_str())
}

async fn not_found_handler(request_id: RequestId) -> ProblemDetails {
    ProblemDetails::endpoint_not_found(request_id.as_str())
}
