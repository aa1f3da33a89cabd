//! Error types for the BPM REST client.
//!
//! # Design
//! Every HTTP response outside 200..=399 becomes `ApiError::Status`, carrying
//! the folded `ApiStatus` and the response body untouched. A request that
//! never got a response surfaces the raw `TransportError` instead of a
//! `Status` wrapper; the accessors still report it as status 0,
//! "Request Error", so callers can treat both uniformly when they want to.

use serde_json::Value;

use crate::http::TransportError;
use crate::status::ApiStatus;

/// Errors returned by `BpmClient` parse methods and `BpmSession` calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{} ({})", .status.message(), .status.code())]
    Status { status: ApiStatus, data: Value },

    /// No HTTP response was obtained. The original error is kept as-is.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        self.api_status().code()
    }

    pub fn message(&self) -> &'static str {
        self.api_status().message()
    }

    pub fn api_status(&self) -> ApiStatus {
        match self {
            ApiError::Status { status, .. } => *status,
            ApiError::Transport(_) | ApiError::Serialization(_) => ApiStatus::RequestError,
            ApiError::Deserialization(_) => ApiStatus::UnknownException,
        }
    }

    /// The error body as received, for `Status` errors only.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ApiError::Status { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Rewrite the body of a `Status` error; other variants pass through.
    pub fn map_data(self, f: impl FnOnce(Value) -> Value) -> Self {
        match self {
            ApiError::Status { status, data } => ApiError::Status {
                status,
                data: f(data),
            },
            other => other,
        }
    }
}

/// Configuration could not be loaded or is unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid REST URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
