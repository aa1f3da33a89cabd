//! Typed views of filtered payloads and request inputs.
//!
//! # Design
//! Parse methods return filtered `serde_json::Value` envelopes; these structs
//! are an optional typed layer on top via `Envelope::into_typed`. Date fields
//! decode the canonical strings produced by `transform::date_or_null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A user as returned by the user endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userID")]
    pub user_id: Option<u64>,
    pub user_name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_disabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memberships: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(rename = "groupID")]
    pub group_id: Option<u64>,
    pub group_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub manager_group_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deleted: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<Group>,
}

/// A BPM process instance with its filtered task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstance {
    pub piid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub execution_state: Option<String>,
    #[serde(default)]
    pub bpd_name: Option<String>,
    #[serde(default)]
    pub process_app_name: Option<String>,
    #[serde(default)]
    pub process_app_acronym: Option<String>,
    #[serde(default)]
    pub snapshot_name: Option<String>,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modification_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub close_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub execution_tree: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub tkiid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub originator: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub assigned_to_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completion_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modification_time: Option<DateTime<Utc>>,
}

/// Outcome of a bulk instance action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub succeeded: Vec<BulkItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed: Vec<BulkItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItem {
    pub instance_id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error_number: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub systems: Vec<SystemInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    #[serde(rename = "systemID")]
    pub system_id: String,
    #[serde(default)]
    pub system_type: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
}

/// An explicit `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Query for the user list. `None` fields are omitted from the query string.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub filter: Option<String>,
    pub max_count: Option<u32>,
    pub sort: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct GroupQuery {
    pub filter: Option<String>,
    pub include_deleted: Option<bool>,
}

/// Input for starting a process instance.
#[derive(Debug, Clone)]
pub struct StartProcess {
    pub bpd_id: String,
    pub process_app_id: String,
    pub snapshot_id: Option<String>,
    /// Input variables, sent as one JSON-encoded `params` query value.
    pub params: Map<String, Value>,
}

impl StartProcess {
    pub fn new(bpd_id: &str, process_app_id: &str) -> Self {
        Self {
            bpd_id: bpd_id.to_string(),
            process_app_id: process_app_id.to_string(),
            snapshot_id: None,
            params: Map::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }
}

/// Control verbs accepted by single and bulk instance actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceAction {
    Suspend,
    Resume,
    Terminate,
    Retry,
    Delete,
}

impl InstanceAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            InstanceAction::Suspend => "suspend",
            InstanceAction::Resume => "resume",
            InstanceAction::Terminate => "terminate",
            InstanceAction::Retry => "retry",
            InstanceAction::Delete => "delete",
        }
    }
}
