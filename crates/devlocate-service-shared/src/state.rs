//! Application state for the HTTP service.
//!
//! This module provides the shared state structure that axum handlers use to
//! access the loaded user store and the OSRM client.

use std::path::Path;
use std::sync::Arc;

use devlocate_lib::{Error as LibError, OsrmClient, OsrmConfig, UserStore};

use crate::config::ServiceConfig;

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to load the user dataset.
    UsersLoad(LibError),

    /// Failed to construct the upstream routing client.
    OsrmClient(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsersLoad(e) => write!(f, "failed to load user dataset: {}", e),
            Self::OsrmClient(e) => write!(f, "failed to build routing client: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UsersLoad(e) | Self::OsrmClient(e) => Some(e),
        }
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor. The user store inside is never
/// mutated after construction, so handlers read it without locking.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use devlocate_service_shared::{AppState, ServiceConfig};
///
/// async fn handler(State(state): State<AppState>) {
///     let users = state.users();
///     // ... use users
/// }
///
/// let state = AppState::load(&ServiceConfig::default()).unwrap();
/// let app = Router::new()
///     .route("/api/users/all", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    users: UserStore,
    osrm: OsrmClient,
}

impl AppState {
    /// Build application state from the service configuration.
    ///
    /// Loads users from `config.users_path` when set, otherwise uses the
    /// built-in dataset.
    pub fn load(config: &ServiceConfig) -> Result<Self, AppStateError> {
        let users = match config.users_path.as_deref() {
            Some(path) => load_users(path)?,
            None => {
                tracing::info!("using built-in user dataset");
                UserStore::builtin()
            }
        };
        tracing::info!(user_count = users.len(), "user dataset ready");

        let osrm = OsrmClient::new(config.osrm.clone()).map_err(AppStateError::OsrmClient)?;
        tracing::info!(
            base_url = %config.osrm.base_url,
            timeout = ?config.osrm.timeout,
            "routing client configured"
        );

        Ok(Self::from_components(users, osrm))
    }

    /// Create application state from pre-built components.
    ///
    /// This is useful for testing with synthetic user sets or a fake upstream.
    pub fn from_components(users: UserStore, osrm: OsrmClient) -> Self {
        Self {
            inner: Arc::new(AppStateInner { users, osrm }),
        }
    }

    /// Create application state with the default OSRM configuration.
    pub fn with_users(users: UserStore) -> Result<Self, AppStateError> {
        let osrm = OsrmClient::new(OsrmConfig::default()).map_err(AppStateError::OsrmClient)?;
        Ok(Self::from_components(users, osrm))
    }

    /// Access the loaded user store.
    pub fn users(&self) -> &UserStore {
        &self.inner.users
    }

    /// Access the routing client.
    pub fn osrm(&self) -> &OsrmClient {
        &self.inner.osrm
    }
}

fn load_users(path: &Path) -> Result<UserStore, AppStateError> {
    tracing::info!(path = %path.display(), "loading user dataset");
    UserStore::from_json_path(path).map_err(AppStateError::UsersLoad)
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("user_count", &self.inner.users.len())
            .field("osrm_base_url", &self.inner.osrm.config().base_url)
            .finish()
    }
}
