//! Application status codes and their fixed messages.
//!
//! # Design
//! The BPM server answers with a wide range of HTTP statuses, but callers only
//! ever see the small set below. `ApiStatus::from_http` is the single place
//! where an HTTP code is folded into that set.

use std::fmt;

/// The fixed set of statuses surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiStatus {
    /// No HTTP response was obtained.
    RequestError,
    Ok,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    /// Any 5xx, or a status outside the table.
    UnknownException,
}

impl ApiStatus {
    pub const fn code(self) -> u16 {
        match self {
            ApiStatus::RequestError => 0,
            ApiStatus::Ok => 200,
            ApiStatus::BadRequest => 400,
            ApiStatus::Unauthorized => 401,
            ApiStatus::Forbidden => 403,
            ApiStatus::NotFound => 404,
            ApiStatus::Conflict => 409,
            ApiStatus::UnknownException => 500,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            ApiStatus::RequestError => "Request Error",
            ApiStatus::Ok => "OK",
            ApiStatus::BadRequest => "Bad HTTP Request",
            ApiStatus::Unauthorized => "Unauthorized Access",
            ApiStatus::Forbidden => "Forbidden",
            ApiStatus::NotFound => "Not Found",
            ApiStatus::Conflict => "Conflict",
            ApiStatus::UnknownException => "Unknown Exception",
        }
    }

    /// Fold an HTTP status code into the application table.
    pub const fn from_http(code: u16) -> Self {
        match code {
            200..=399 => ApiStatus::Ok,
            400 => ApiStatus::BadRequest,
            401 => ApiStatus::Unauthorized,
            403 => ApiStatus::Forbidden,
            404 => ApiStatus::NotFound,
            409 => ApiStatus::Conflict,
            _ => ApiStatus::UnknownException,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, ApiStatus::Ok)
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.message())
    }
}
