//! Client core for a business-process-management (BPM) server's REST API.
//!
//! # Overview
//! Builds `HttpRequest` values and classifies round-trip outcomes without
//! touching the network (host-does-IO pattern). `BpmSession` pairs the client
//! with a `Transport` for callers that want the library to run the call.
//!
//! # Design
//! - `BpmClient` is stateless: base URL plus the Basic-Auth header.
//! - Each endpoint is split into `build_*` and `parse_*`, so the I/O boundary
//!   is explicit.
//! - `response::classify` maps every HTTP outcome to an `Envelope` or an
//!   `ApiError` using the fixed `ApiStatus` table.
//! - `filter::filter_properties` prunes payloads to per-endpoint allow-lists
//!   (`fields`), applying value transforms such as date normalization.

pub mod client;
pub mod config;
pub mod error;
pub mod fields;
pub mod filter;
pub mod http;
pub mod message;
pub mod response;
pub mod session;
pub mod status;
pub mod transform;
pub mod transport;
pub mod types;

pub use client::BpmClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError};
pub use filter::{filter_each, filter_properties, AllowList, FieldSpec, Transform};
pub use http::{HttpMethod, HttpOutcome, HttpRequest, HttpResponse, TransportError};
pub use message::TriggerMessage;
pub use response::{classify, Envelope};
pub use session::BpmSession;
pub use status::ApiStatus;
pub use transport::Transport;
#[cfg(feature = "blocking")]
pub use transport::{UreqTransport, DEFAULT_BODY_LIMIT};
pub use types::{
    BulkItem, BulkResult, Group, GroupList, GroupQuery, InstanceAction, ProcessInstance,
    StartProcess, SystemDetails, SystemInfo, Task, User, UserList, UserQuery,
};
