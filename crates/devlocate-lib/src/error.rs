use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Convenient result alias for the DevLocate library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Validation-type variants are caused by the caller and never carry an
/// upstream cause. Upstream variants are raised by [`crate::OsrmClient`] and
/// are never retried by the library.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller input was malformed or out of range.
    #[error("{message}")]
    Validation { message: String },

    /// A user id was requested that the store does not contain.
    #[error("user {id} not found")]
    UnknownUser { id: i64 },

    /// The upstream routing service did not answer within the configured timeout.
    #[error("request timeout - routing service did not respond within {timeout:?}")]
    UpstreamTimeout { timeout: Duration },

    /// The upstream routing service could not be reached or answered garbage.
    #[error("routing service unavailable: {cause}")]
    UpstreamUnavailable { cause: String },

    /// The upstream routing service answered with a non-`Ok` status code.
    #[error("OSRM API error: {code}")]
    UpstreamRoute { code: String },

    /// The upstream routing service answered `Ok` without any route.
    #[error("no route found")]
    NoRouteFound,

    /// Dataset file could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// Dataset file parsed but contained no users.
    #[error("dataset contains no users")]
    EmptyDataset,

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a validation error from any message.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// True when the failure was caused by the caller (4xx class).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::UnknownUser { .. })
    }

    /// True when the failure originated from the upstream routing service.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::UpstreamTimeout { .. }
                | Error::UpstreamUnavailable { .. }
                | Error::UpstreamRoute { .. }
                | Error::NoRouteFound
        )
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "validation_error",
            Error::UnknownUser { .. } => "unknown_user",
            Error::UpstreamTimeout { .. } => "upstream_timeout",
            Error::UpstreamUnavailable { .. } => "upstream_unavailable",
            Error::UpstreamRoute { .. } => "upstream_route_error",
            Error::NoRouteFound => "no_route",
            Error::DatasetNotFound { .. } => "dataset_not_found",
            Error::EmptyDataset => "empty_dataset",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
        }
    }
}
