//! Immutable in-memory user dataset.
//!
//! A [`UserStore`] is built once at startup, either from the built-in dataset
//! or from a JSON file, and is read-only afterwards. It is cheap to share
//! between threads behind an `Arc`; there is no mutation path.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::{validate, Coordinate};

/// Numeric identifier for a user.
pub type UserId = i64;

/// A located user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            username: username.into(),
            latitude,
            longitude,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

const BUILTIN_USERS: &[(UserId, &str, f64, f64)] = &[
    (1, "Alice Johnson", 40.7128, -74.0060),
    (2, "Bob Smith", 40.7489, -73.9680),
    (3, "Carol Davis", 40.7614, -73.9776),
    (4, "David Wilson", 40.7505, -73.9972),
    (5, "Emma Brown", 40.7549, -73.9840),
    (6, "Frank Miller", 40.7282, -74.0076),
    (7, "Grace Lee", 40.7580, -73.9855),
    (8, "Henry Taylor", 40.7549, -73.9965),
    (9, "Ivy Martinez", 40.7614, -74.0037),
    (10, "Jack Thompson", 40.7128, -73.9352),
    (11, "Kate Anderson", 40.7489, -73.9680),
    (12, "Leo Clark", 40.7505, -73.9680),
    (13, "Mia Rodriguez", 40.7282, -73.9965),
    (14, "Noah Garcia", 40.7549, -73.9840),
    (15, "Olivia Martinez", 40.7614, -73.9776),
];

/// Read-only snapshot of every known user, in load order.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Vec<User>,
}

impl UserStore {
    /// Build a store from an explicit list of users.
    ///
    /// Rejects duplicate ids and out-of-range coordinates. An empty list is
    /// accepted; queries against it fail at query time.
    pub fn new(users: Vec<User>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(users.len());
        for user in &users {
            if !seen.insert(user.id) {
                return Err(Error::validation(format!("duplicate user id {}", user.id)));
            }
            if !validate(user.coordinate()) {
                return Err(Error::validation(format!(
                    "user {} has invalid coordinates {}",
                    user.id,
                    user.coordinate()
                )));
            }
        }
        Ok(Self { users })
    }

    /// The 15-user dataset shipped with the application.
    pub fn builtin() -> Self {
        let users = BUILTIN_USERS
            .iter()
            .map(|&(id, name, lat, lon)| User::new(id, name, lat, lon))
            .collect();
        Self { users }
    }

    /// Load a JSON array of users from `path`.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::DatasetNotFound {
                path: path.to_path_buf(),
            });
        }

        debug!(path = %path.display(), "reading user dataset");
        let raw = fs::read_to_string(path)?;
        let users: Vec<User> = serde_json::from_str(&raw)?;
        if users.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let store = Self::new(users)?;
        info!(path = %path.display(), users = store.len(), "user dataset loaded");
        Ok(store)
    }

    /// Every user, in load order.
    pub fn all(&self) -> &[User] {
        &self.users
    }

    /// Look up a user by id.
    pub fn by_id(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    /// Like [`UserStore::by_id`], but reports a missing user as
    /// [`Error::UnknownUser`].
    pub fn get(&self, id: UserId) -> Result<&User> {
        self.by_id(id).ok_or(Error::UnknownUser { id })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
