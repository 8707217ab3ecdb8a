//! Test utilities for handler testing.
//!
//! Provides an `AppState` backed by the built-in users and helpers for
//! pointing the routing client at a local upstream.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use devlocate_lib::{OsrmClient, OsrmConfig, UserStore};

use crate::state::AppState;

/// Query point matching the first built-in user (New York City).
pub const NYC: (f64, f64) = (40.7128, -74.0060);

static TEST_STATE: OnceLock<AppState> = OnceLock::new();

/// Shared test state with the built-in users and the default upstream.
///
/// Cached after the first call.
///
/// # Panics
///
/// Panics if the routing client cannot be built.
pub fn test_state() -> AppState {
    TEST_STATE
        .get_or_init(|| {
            AppState::with_users(UserStore::builtin())
                .unwrap_or_else(|e| panic!("failed to build test state: {}", e))
        })
        .clone()
}

/// Test state whose routing client targets `base_url` with a short timeout.
///
/// # Panics
///
/// Panics if the routing client cannot be built.
pub fn state_with_upstream(base_url: &str, timeout: Duration) -> AppState {
    let config = OsrmConfig::default()
        .with_base_url(base_url)
        .with_timeout(timeout);
    let osrm = OsrmClient::new(config)
        .unwrap_or_else(|e| panic!("failed to build routing client: {}", e));
    AppState::from_components(UserStore::builtin(), osrm)
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!("test-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}
