//! Service configuration read from the environment.
//!
//! # Environment Variables
//!
//! - `SERVICE_PORT`: HTTP port (default: 8000)
//! - `OSRM_BASE_URL`: Upstream route API base (default: public OSRM demo server)
//! - `OSRM_TIMEOUT_SECS`: Upstream timeout in seconds (default: 10)
//! - `DEVLOCATE_USERS_PATH`: Optional JSON user dataset (default: built-in users)
//! - `CORS_ALLOW_ANY`: "true" or "false" (default: true)

use std::path::PathBuf;
use std::time::Duration;

use devlocate_lib::{OsrmConfig, DEFAULT_OSRM_BASE_URL, DEFAULT_TIMEOUT};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime configuration for the HTTP service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Port to listen on.
    pub port: u16,
    /// JSON dataset replacing the built-in users, if set.
    pub users_path: Option<PathBuf>,
    /// Upstream routing service settings.
    pub osrm: OsrmConfig,
    /// Attach a permissive CORS layer.
    pub cors_allow_any: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            users_path: None,
            osrm: OsrmConfig::default(),
            cors_allow_any: true,
        }
    }
}

impl ServiceConfig {
    /// Create configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Unparseable numeric values and a zero timeout fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or_default(&lookup, "SERVICE_PORT", DEFAULT_PORT);

        let base_url = lookup("OSRM_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OSRM_BASE_URL.to_string());
        let timeout_secs = parse_where(
            &lookup,
            "OSRM_TIMEOUT_SECS",
            DEFAULT_TIMEOUT.as_secs(),
            |secs| *secs > 0,
        );

        let users_path = lookup("DEVLOCATE_USERS_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let cors_allow_any = lookup("CORS_ALLOW_ANY")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        Self {
            port,
            users_path,
            osrm: OsrmConfig::default()
                .with_base_url(base_url)
                .with_timeout(Duration::from_secs(timeout_secs)),
            cors_allow_any,
        }
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    parse_where(lookup, key, default, |_| true)
}

/// Parse `key`, falling back to `default` when the value is unparseable or
/// rejected by `accept`.
fn parse_where<F, T, A>(lookup: &F, key: &str, default: T, accept: A) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy + std::fmt::Display,
    A: Fn(&T) -> bool,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().ok().filter(accept).unwrap_or_else(|| {
            tracing::warn!(
                key,
                value = %raw,
                default = %default,
                "invalid value, using default"
            );
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServiceConfig::from_lookup(|_| None);
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.port, 8000);
        assert_eq!(config.osrm.timeout, Duration::from_secs(10));
        assert!(config.users_path.is_none());
        assert!(config.cors_allow_any);
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("SERVICE_PORT", "9090"),
            ("OSRM_BASE_URL", "http://osrm.internal:5000/route/v1"),
            ("OSRM_TIMEOUT_SECS", "3"),
            ("DEVLOCATE_USERS_PATH", "/data/users.json"),
            ("CORS_ALLOW_ANY", "FALSE"),
        ]));

        assert_eq!(config.port, 9090);
        assert_eq!(config.osrm.base_url, "http://osrm.internal:5000/route/v1");
        assert_eq!(config.osrm.timeout, Duration::from_secs(3));
        assert_eq!(config.users_path, Some(PathBuf::from("/data/users.json")));
        assert!(!config.cors_allow_any);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("SERVICE_PORT", "eighty"),
            ("OSRM_TIMEOUT_SECS", "-1"),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.osrm.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_zero_timeout_falls_back() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("OSRM_TIMEOUT_SECS", "0")]));
        assert_eq!(config.osrm.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("OSRM_BASE_URL", "  "),
            ("DEVLOCATE_USERS_PATH", ""),
        ]));
        assert_eq!(config.osrm.base_url, DEFAULT_OSRM_BASE_URL);
        assert!(config.users_path.is_none());
    }
}
