//! Response classification into the success envelope or a typed error.
//!
//! # Design
//! `classify` is a pure function over one round-trip outcome. It only maps
//! HTTP status to application status and builds the envelope; it never looks
//! inside error bodies; endpoint parsers reshape those when they need to.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::HttpOutcome;
use crate::status::ApiStatus;

/// Uniform success wrapper returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub status: String,
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            status: self.status,
            message: self.message,
            data: f(self.data),
        }
    }
}

impl Envelope<Value> {
    /// Decode `data` into a typed view.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<Envelope<T>, ApiError> {
        let data = serde_json::from_value(self.data)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        Ok(Envelope {
            status: self.status,
            message: self.message,
            data,
        })
    }
}

/// Turn a round-trip outcome into an envelope or an `ApiError`.
pub fn classify(outcome: HttpOutcome) -> Result<Envelope, ApiError> {
    let response = match outcome {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "request failed before a response arrived");
            return Err(ApiError::Transport(err));
        }
    };

    let status = ApiStatus::from_http(response.status);
    let body = parse_body(&response.body);
    debug!(http_status = response.status, %status, "classified response");

    if status.is_success() {
        let data = match body {
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
            _ => Value::Null,
        };
        return Ok(Envelope {
            status: response.status.to_string(),
            message: status.message().to_string(),
            data,
        });
    }

    if status == ApiStatus::UnknownException && response.status != 500 {
        warn!(http_status = response.status, "unmapped status folded into 500");
    }
    Err(ApiError::Status { status, data: body })
}

/// JSON if it parses, the raw text otherwise, `null` when empty.
fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
