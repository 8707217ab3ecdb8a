//! DevLocate library entry points.
//!
//! This crate holds the query core shared by the HTTP service and the CLI:
//! Haversine distance and coordinate validation, the immutable user store,
//! brute-force K-nearest ranking, and the OSRM route proxy. Front ends should
//! only depend on the functions exported here instead of reimplementing
//! behavior.

#![deny(warnings)]

pub mod error;
pub mod geo;
pub mod nearest;
pub mod osrm;
pub mod store;

pub use error::{Error, Result};
pub use geo::{distance, round_to, validate, Coordinate, EARTH_RADIUS_KM};
pub use nearest::{find_nearest, nearby_users, NearbyUsers, RankedUser, DEFAULT_K};
pub use osrm::{
    normalize_response, route_url, validate_endpoints, LatLon, OsrmClient, OsrmConfig,
    RouteResult, DEFAULT_OSRM_BASE_URL, DEFAULT_TIMEOUT,
};
pub use store::{User, UserId, UserStore};
