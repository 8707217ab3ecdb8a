//! Shared infrastructure for the DevLocate HTTP service.
//!
//! - [`AppState`]: Pre-loaded user store and routing client
//! - [`ServiceConfig`]: Environment-driven service configuration
//! - [`health`]: Health check handlers for liveness/readiness probes
//! - [`ProblemDetails`]: RFC 9457 Problem Details with an `error` message member
//! - [`ServiceResponse`]: Wrapper for successful responses
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request ID and metrics middleware
//! - Query types with validation for each endpoint
//!
//! # Architecture
//!
//! Handlers stay thin and all business logic resides in `devlocate-lib`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Capture query parameters                                 │
//! │  - Validate into typed requests                             │
//! │  - Call devlocate-lib APIs                                  │
//! │  - Format response or ProblemDetails                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides shared state for handler tests. Enable
//! the `test-utils` feature to access it from dependent crates.

#![deny(warnings)]

mod config;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ServiceConfig, DEFAULT_PORT};
pub use health::{health_check, health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_nearby_query, record_neighbors_returned,
    record_route_failed, record_route_proxied, record_upstream_latency, MetricsConfig,
    MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_NOT_FOUND, PROBLEM_ROUTE_NOT_FOUND, PROBLEM_UNKNOWN_USER,
    PROBLEM_UPSTREAM_ROUTE_ERROR, PROBLEM_UPSTREAM_TIMEOUT,
    PROBLEM_UPSTREAM_UNAVAILABLE,
};
pub use request::{NearbyQuery, NearbyRequest, RouteQuery, RouteRequest, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
