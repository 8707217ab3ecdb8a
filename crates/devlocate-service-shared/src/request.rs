//! Request types and validation for HTTP endpoints.
//!
//! Query parameters are captured as raw strings so that missing or
//! unparseable values produce a `ProblemDetails` body instead of the
//! framework's plain-text rejection.

use serde::{Deserialize, Serialize};

use devlocate_lib::{Coordinate, DEFAULT_K};

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations check every field and convert the raw parameters into the
/// typed request the handler needs, or return a `ProblemDetails` error.
pub trait Validate {
    /// Typed request produced by successful validation.
    type Output;

    /// Validate the request.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<Self::Output, Box<ProblemDetails>>;
}

/// Raw query for `GET /api/users/nearby`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearbyQuery {
    /// Latitude of the requesting location.
    pub latitude: Option<String>,

    /// Longitude of the requesting location.
    pub longitude: Option<String>,

    /// Number of neighbors to return (default: 5).
    pub k: Option<String>,
}

/// Validated nearby request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyRequest {
    /// Location to rank users against.
    pub location: Coordinate,

    /// Requested neighbor count. Range checks happen in the library.
    pub k: i64,
}

impl Validate for NearbyQuery {
    type Output = NearbyRequest;

    fn validate(&self, request_id: &str) -> Result<NearbyRequest, Box<ProblemDetails>> {
        let latitude = required_f64(&self.latitude, "latitude", request_id)?;
        let longitude = required_f64(&self.longitude, "longitude", request_id)?;
        let k = match self.k.as_deref() {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                Box::new(ProblemDetails::bad_request(
                    "The 'k' parameter must be an integer",
                    request_id,
                ))
            })?,
            None => DEFAULT_K,
        };

        Ok(NearbyRequest {
            location: Coordinate::new(latitude, longitude),
            k,
        })
    }
}

/// Raw query for `GET /api/osm/route`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteQuery {
    /// Origin latitude.
    pub origin_lat: Option<String>,

    /// Origin longitude.
    pub origin_lon: Option<String>,

    /// Destination latitude.
    pub destination_lat: Option<String>,

    /// Destination longitude.
    pub destination_lon: Option<String>,
}

/// Validated route request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    /// Route start.
    pub origin: Coordinate,

    /// Route end.
    pub destination: Coordinate,
}

impl Validate for RouteQuery {
    type Output = RouteRequest;

    fn validate(&self, request_id: &str) -> Result<RouteRequest, Box<ProblemDetails>> {
        let origin_lat = required_f64(&self.origin_lat, "origin_lat", request_id)?;
        let origin_lon = required_f64(&self.origin_lon, "origin_lon", request_id)?;
        let destination_lat = required_f64(&self.destination_lat, "destination_lat", request_id)?;
        let destination_lon = required_f64(&self.destination_lon, "destination_lon", request_id)?;

        Ok(RouteRequest {
            origin: Coordinate::new(origin_lat, origin_lon),
            destination: Coordinate::new(destination_lat, destination_lon),
        })
    }
}

fn required_f64(
    value: &Option<String>,
    name: &str,
    request_id: &str,
) -> Result<f64, Box<ProblemDetails>> {
    let raw = value
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| {
            Box::new(ProblemDetails::bad_request(
                format!("The '{}' parameter is required", name),
                request_id,
            ))
        })?;

    raw.parse::<f64>().map_err(|_| {
        Box::new(ProblemDetails::bad_request(
            format!("The '{}' parameter must be a number", name),
            request_id,
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nearby(lat: Option<&str>, lon: Option<&str>, k: Option<&str>) -> NearbyQuery {
        NearbyQuery {
            latitude: lat.map(String::from),
            longitude: lon.map(String::from),
            k: k.map(String::from),
        }
    }

    #[test]
    fn test_nearby_query_valid() {
        let req = nearby(Some("40.7128"), Some("-74.0060"), Some("3"))
            .validate("test")
            .unwrap();
        assert_eq!(req.location, Coordinate::new(40.7128, -74.0060));
        assert_eq!(req.k, 3);
    }

    #[test]
    fn test_nearby_query_default_k() {
        let req = nearby(Some("0"), Some("0"), None).validate("test").unwrap();
        assert_eq!(req.k, DEFAULT_K);
    }

    #[test]
    fn test_nearby_query_keeps_out_of_range_values() {
        // Range checks belong to the library so the messages stay uniform.
        let req = nearby(Some("91"), Some("0"), Some("0"))
            .validate("test")
            .unwrap();
        assert_eq!(req.location.latitude, 91.0);
        assert_eq!(req.k, 0);
    }

    #[test]
    fn test_nearby_query_missing_latitude() {
        let err = nearby(None, Some("0"), None).validate("req-1").unwrap_err();
        assert_eq!(err.status, 400);
        assert!(err.error.contains("'latitude'"));
        assert_eq!(err.instance.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_nearby_query_unparseable_longitude() {
        let err = nearby(Some("0"), Some("east"), None)
            .validate("test")
            .unwrap_err();
        assert!(err.error.contains("'longitude'"));
        assert!(err.error.contains("number"));
    }

    #[test]
    fn test_nearby_query_fractional_k() {
        let err = nearby(Some("0"), Some("0"), Some("2.5"))
            .validate("test")
            .unwrap_err();
        assert!(err.error.contains("'k'"));
    }

    #[test]
    fn test_route_query_valid() {
        let query = RouteQuery {
            origin_lat: Some("40.7128".into()),
            origin_lon: Some("-74.0060".into()),
            destination_lat: Some("40.7614".into()),
            destination_lon: Some("-73.9776".into()),
        };
        let req = query.validate("test").unwrap();
        assert_eq!(req.origin, Coordinate::new(40.7128, -74.0060));
        assert_eq!(req.destination, Coordinate::new(40.7614, -73.9776));
    }

    #[test]
    fn test_route_query_blank_destination() {
        let query = RouteQuery {
            origin_lat: Some("1".into()),
            origin_lon: Some("2".into()),
            destination_lat: Some("  ".into()),
            destination_lon: Some("4".into()),
        };
        let err = query.validate("test").unwrap_err();
        assert!(err.error.contains("'destination_lat'"));
    }

    #[test]
    fn test_route_query_deserialization() {
        let json = r#"{"origin_lat":"1","origin_lon":"2"}"#;
        let query: RouteQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.origin_lat.as_deref(), Some("1"));
        assert!(query.destination_lat.is_none());
    }
}
