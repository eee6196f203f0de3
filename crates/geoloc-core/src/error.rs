//! Error types for the geocoding flows.
//!
//! Only collaborator failures are errors. A request with a bad coordinate is
//! answered with [`Outcome::Rejected`](crate::Outcome::Rejected) carrying an
//! [`ErrorPayload`], built by [`ErrorPayload::invalid_coordinates`].
//!
//! ## Error Cases
//! - `Backend`: the provider, document store or cache failed. The source
//!   error is kept as-is so the transport can report it unfiltered.

use crate::Status;
use core::fmt;
use serde::{Deserialize, Serialize};

pub type Result<T> = core::result::Result<T, Error>;

/// Boxed error returned by collaborator implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Message sent back when any coordinate in a request fails validation.
pub const INVALID_COORDINATES_MSG: &str = "Invalid latitude or longitude";

/// The collaborator a failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    Provider,
    DocumentStore,
    Cache,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Provider => write!(f, "geocoding provider"),
            Backend::DocumentStore => write!(f, "document store"),
            Backend::Cache => write!(f, "cache"),
        }
    }
}

/// Unified error type for the geocoding flows.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A collaborator call failed. Not retried.
    #[error("{backend} error: {source}")]
    Backend {
        backend: Backend,
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub fn provider(source: impl Into<BoxError>) -> Self {
        Self::Backend {
            backend: Backend::Provider,
            source: source.into(),
        }
    }

    pub fn store(source: impl Into<BoxError>) -> Self {
        Self::Backend {
            backend: Backend::DocumentStore,
            source: source.into(),
        }
    }

    pub fn cache(source: impl Into<BoxError>) -> Self {
        Self::Backend {
            backend: Backend::Cache,
            source: source.into(),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            Error::Backend { backend, .. } => *backend,
        }
    }
}

/// Structured failure body, distinguishable from success payloads by its
/// `ERROR` status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub status: Status,
    #[serde(rename = "msg")]
    pub message: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
        }
    }

    /// The payload every flow answers with when validation fails.
    pub fn invalid_coordinates() -> Self {
        Self::new(INVALID_COORDINATES_MSG)
    }
}

impl From<&Error> for ErrorPayload {
    fn from(err: &Error) -> Self {
        Self::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_coordinates_payload_is_an_error() {
        let payload = ErrorPayload::invalid_coordinates();
        assert_eq!(payload.status, Status::Error);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"status": "ERROR", "msg": "Invalid latitude or longitude"})
        );
    }

    #[test]
    fn backend_error_keeps_source_message() {
        let err = Error::store("connection refused");
        assert_eq!(err.backend(), Backend::DocumentStore);
        assert_eq!(err.to_string(), "document store error: connection refused");
        assert_eq!(
            ErrorPayload::from(&err).message,
            "document store error: connection refused"
        );
    }
}
