//! Proxy for the OSRM HTTP route API.
//!
//! [`OsrmClient::get_route`] turns a pair of coordinates into exactly one
//! outbound `GET {base}/driving/{lon},{lat};{lon},{lat}` request, normalizes
//! the first returned route, and translates every failure into a library
//! [`Error`]. Nothing is retried; callers own any retry policy.
//!
//! The request future can be dropped at any point (for example when the HTTP
//! client that triggered it disconnects); the in-flight upstream call is then
//! abandoned and no result is produced.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::{round_to, validate, Coordinate};

/// Public OSRM demo server, route service v1.
pub const DEFAULT_OSRM_BASE_URL: &str = "http://router.project-osrm.org/route/v1";

/// Upstream timeout applied to each route request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Routing profile requested from OSRM.
pub const PROFILE: &str = "driving";

/// Status code OSRM uses for a successful response.
const OSRM_OK: &str = "Ok";

/// Connection settings for the upstream routing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsrmConfig {
    /// Base URL up to, but excluding, the profile segment.
    pub base_url: String,
    /// Total time allowed for one upstream request.
    pub timeout: Duration,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OSRM_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl OsrmConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Route endpoint as exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coordinate> for LatLon {
    fn from(c: Coordinate) -> Self {
        Self {
            lat: c.latitude,
            lon: c.longitude,
        }
    }
}

/// Normalized route between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub origin: LatLon,
    pub destination: LatLon,
    /// Road distance in kilometres, rounded to two decimals.
    pub distance_km: f64,
    /// Travel time in whole minutes.
    pub duration_minutes: i64,
    /// GeoJSON path geometry, passed through from OSRM untouched.
    pub geometry: Value,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Metres.
    distance: f64,
    /// Seconds.
    duration: f64,
    #[serde(default)]
    geometry: Value,
}

/// Build the OSRM route URL for `origin` → `destination`.
///
/// OSRM expects longitude before latitude in each pair.
pub fn route_url(base_url: &str, origin: Coordinate, destination: Coordinate) -> String {
    format!(
        "{base}/{profile}/{olon},{olat};{dlon},{dlat}?overview=full&geometries=geojson",
        base = base_url.trim_end_matches('/'),
        profile = PROFILE,
        olon = origin.longitude,
        olat = origin.latitude,
        dlon = destination.longitude,
        dlat = destination.latitude,
    )
}

/// Validate both endpoints, reporting which one is out of range.
pub fn validate_endpoints(origin: Coordinate, destination: Coordinate) -> Result<()> {
    if !validate(origin) {
        return Err(Error::validation("Invalid origin coordinates"));
    }
    if !validate(destination) {
        return Err(Error::validation("Invalid destination coordinates"));
    }
    Ok(())
}

/// Asynchronous OSRM route client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    http: Client,
    config: OsrmConfig,
}

impl OsrmClient {
    /// Build a client with the given configuration.
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent())
            .build()
            .map_err(|e| Error::UpstreamUnavailable {
                cause: format!("failed to build HTTP client: {}", error_chain(&e)),
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    /// Fetch the driving route from `origin` to `destination`.
    ///
    /// Issues exactly one upstream request. Validation failures are reported
    /// before any network activity.
    pub async fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResult> {
        validate_endpoints(origin, destination)?;

        let url = route_url(&self.config.base_url, origin, destination);
        debug!(url = %url, "requesting route from OSRM");
        let started = Instant::now();

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            latency_ms = started.elapsed().as_secs_f64() * 1000.0,
            "OSRM responded"
        );

        normalize_response(origin, destination, status, &body)
    }

    fn transport_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            warn!(timeout = ?self.config.timeout, "OSRM request timed out");
            return Error::UpstreamTimeout {
                timeout: self.config.timeout,
            };
        }

        let cause = error_chain(&error);
        warn!(cause = %cause, "OSRM request failed");
        Error::UpstreamUnavailable { cause }
    }
}

/// Interpret a raw OSRM response body.
///
/// OSRM reports most failures (`NoRoute`, `InvalidQuery`, ...) with a JSON
/// body and a 4xx status; the `code` field wins over the HTTP status whenever
/// the body can be decoded.
pub fn normalize_response(
    origin: Coordinate,
    destination: Coordinate,
    status: StatusCode,
    body: &[u8],
) -> Result<RouteResult> {
    let parsed: OsrmResponse = match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            return Err(Error::UpstreamUnavailable {
                cause: format!("routing service returned HTTP {status}"),
            });
        }
        Err(e) => {
            return Err(Error::UpstreamUnavailable {
                cause: format!("malformed routing response: {e}"),
            });
        }
    };

    if parsed.code != OSRM_OK {
        warn!(
            code = %parsed.code,
            message = parsed.message.as_deref().unwrap_or(""),
            "OSRM rejected route request"
        );
        return Err(Error::UpstreamRoute { code: parsed.code });
    }

    let Some(route) = parsed.routes.into_iter().next() else {
        return Err(Error::NoRouteFound);
    };

    Ok(RouteResult {
        origin: origin.into(),
        destination: destination.into(),
        distance_km: round_to(route.distance / 1000.0, 2),
        duration_minutes: (route.duration / 60.0).round() as i64,
        geometry: route.geometry,
    })
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn user_agent() -> String {
    format!("devlocate-lib/{version}", version = env!("CARGO_PKG_VERSION"))
}
