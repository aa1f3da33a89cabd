//! Stateless HTTP request builder and response parser for the BPM REST API.
//!
//! # Design
//! `BpmClient` holds only the parsed base URL and the precomputed Basic-Auth
//! header. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes the round-trip outcome.
//! Parsing always goes through `response::classify` first and then through the
//! endpoint's allow-list.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::fields;
use crate::filter::filter_nested_list;
use crate::http::{HttpMethod, HttpOutcome, HttpRequest};
use crate::message::TriggerMessage;
use crate::response::{classify, Envelope};
use crate::types::{GroupQuery, InstanceAction, StartProcess, UserQuery};

/// Synchronous, stateless client for the BPM REST API.
#[derive(Clone)]
pub struct BpmClient {
    base: Url,
    authorization: String,
}

impl fmt::Debug for BpmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BpmClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl BpmClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: config.rest_url.clone(),
            reason,
        };
        let base = Url::parse(&config.rest_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL".to_string()));
        }
        let credentials = STANDARD.encode(format!("{}:{}", config.username, config.password));
        Ok(Self {
            base,
            authorization: format!("Basic {credentials}"),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    // ----- users & groups ---------------------------------------------------

    pub fn build_list_users(&self, query: &UserQuery) -> HttpRequest {
        let mut params = Vec::new();
        if let Some(filter) = &query.filter {
            params.push(("filter", filter.clone()));
        }
        if let Some(max_count) = query.max_count {
            params.push(("maxCount", max_count.to_string()));
        }
        if let Some(sort) = query.sort {
            params.push(("sort", sort.to_string()));
        }
        self.request(HttpMethod::Get, &["users"], &params)
    }

    pub fn build_get_user(&self, user: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &["user", user], &[("parts", "all".into())])
    }

    pub fn build_list_groups(&self, query: &GroupQuery) -> HttpRequest {
        let mut params = Vec::new();
        if let Some(filter) = &query.filter {
            params.push(("filter", filter.clone()));
        }
        if let Some(include_deleted) = query.include_deleted {
            params.push(("includeDeleted", include_deleted.to_string()));
        }
        self.request(HttpMethod::Get, &["groups"], &params)
    }

    pub fn build_get_group(&self, group: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &["group", group], &[("parts", "all".into())])
    }

    pub fn parse_list_users(&self, outcome: HttpOutcome) -> Result<Envelope, ApiError> {
        let envelope = classify(outcome)?;
        Ok(envelope.map(|data| filter_nested_list(fields::USER_LIST.filter(data), "users", &fields::USER)))
    }

    pub fn parse_get_user(&self, outcome: HttpOutcome) -> Result<Envelope, ApiError> {
        Ok(classify(outcome)?.map(|data| fields::USER.filter(data)))
    }

    pub fn parse_list_groups(&self, outcome: HttpOutcome) -> Result<Envelope, ApiError> {
        let envelope = classify(outcome)?;
        Ok(envelope.map(|data| filter_nested_list(fields::GROUP_LIST.filter(data), "groups", &fields::GROUP)))
    }

    pub fn parse_get_group(&self, outcome: HttpOutcome) -> Result<Envelope, ApiError> {
        Ok(classify(outcome)?.map(|data| fields::GROUP.filter(data)))
    }

    // ----- process instances ------------------------------------------------

    pub fn build_start_instance(&self, input: &StartProcess) -> Result<HttpRequest, ApiError> {
        let params = serde_json::to_string(&input.params)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut query = vec![
            ("action", "start".to_string()),
            ("bpdId", input.bpd_id.clone()),
            ("processAppId", input.process_app_id.clone()),
        ];
        if let Some(snapshot_id) = &input.snapshot_id {
            query.push(("snapshotId", snapshot_id.clone()));
        }
        query.push(("params", params));
        query.push(("parts", "all".to_string()));
        Ok(self.request(HttpMethod::Post, &["process"], &query))
    }

    pub fn build_get_instance(&self, instance_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &["process", instance_id], &[("parts", "all".into())])
    }

    pub fn build_instance_action(&self, instance_id: &str, action: InstanceAction) -> HttpRequest {
        self.request(
            HttpMethod::Put,
            &["process", instance_id],
            &[("action", action.as_str().into()), ("parts", "all".into())],
        )
    }

    pub fn build_bulk_action(&self, action: InstanceAction, instance_ids: &[&str]) -> HttpRequest {
        self.request(
            HttpMethod::Put,
            &["process"],
            &[
                ("action", action.as_str().into()),
                ("instanceIds", instance_ids.join(",")),
            ],
        )
    }

    pub fn build_fire_timer(&self, instance_id: &str, timer_token_id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Put,
            &["process", instance_id],
            &[
                ("action", "fireTimer".into()),
                ("timerTokenId", timer_token_id.into()),
                ("parts", "all".into()),
            ],
        )
    }

    pub fn build_move_token(
        &self,
        instance_id: &str,
        token_id: &str,
        target: &str,
        resume: bool,
    ) -> HttpRequest {
        self.request(
            HttpMethod::Put,
            &["process", instance_id],
            &[
                ("action", "moveToken".into()),
                ("tokenId", token_id.into()),
                ("target", target.into()),
                ("resume", resume.to_string()),
                ("parts", "all".into()),
            ],
        )
    }

    pub fn build_delete_token(&self, instance_id: &str, token_id: &str, resume: bool) -> HttpRequest {
        self.request(
            HttpMethod::Put,
            &["process", instance_id],
            &[
                ("action", "deleteToken".into()),
                ("tokenId", token_id.into()),
                ("resume", resume.to_string()),
                ("parts", "all".into()),
            ],
        )
    }

    pub fn build_send_message(&self, message: &TriggerMessage) -> Result<HttpRequest, ApiError> {
        let xml = message.to_xml()?;
        Ok(self.request(
            HttpMethod::Post,
            &["process"],
            &[("action", "sendMessage".into()), ("message", xml)],
        ))
    }

    /// Instance details: the top level and its `tasks` list are filtered.
    pub fn parse_instance(&self, outcome: HttpOutcome) -> Result<Envelope, ApiError> {
        Ok(classify(outcome)?.map(filter_instance))
    }

    /// Deleting an instance returns no instance payload, so its data is
    /// passed through; every other action answers with the instance.
    pub fn parse_instance_action(
        &self,
        action: InstanceAction,
        outcome: HttpOutcome,
    ) -> Result<Envelope, ApiError> {
        let envelope = classify(outcome)?;
        Ok(match action {
            InstanceAction::Delete => envelope,
            _ => envelope.map(filter_instance),
        })
    }

    pub fn parse_bulk_action(&self, outcome: HttpOutcome) -> Result<Envelope, ApiError> {
        Ok(classify(outcome)?.map(|data| fields::BULK.filter(data)))
    }

    pub fn parse_send_message(&self, outcome: HttpOutcome) -> Result<Envelope, ApiError> {
        classify(outcome)
    }

    // ----- system -----------------------------------------------------------

    pub fn build_system_details(&self) -> HttpRequest {
        self.request(HttpMethod::Get, &["systems"], &[])
    }

    /// Error bodies are flattened to `{errorNumber, errorMessage}` taken from
    /// their nested `Data` object.
    pub fn parse_system_details(&self, outcome: HttpOutcome) -> Result<Envelope, ApiError> {
        match classify(outcome) {
            Ok(envelope) => Ok(envelope.map(|data| {
                filter_nested_list(fields::SYSTEM_LIST.filter(data), "systems", &fields::SYSTEM)
            })),
            Err(err) => Err(err.map_data(flatten_error_detail)),
        }
    }

    // ----- plumbing ---------------------------------------------------------

    fn request(&self, method: HttpMethod, segments: &[&str], query: &[(&str, String)]) -> HttpRequest {
        let url = self.endpoint(segments, query);
        debug!(%method, %url, "built request");
        HttpRequest {
            method,
            url,
            headers: vec![
                ("authorization".to_string(), self.authorization.clone()),
                ("accept".to_string(), "application/json".to_string()),
            ],
        }
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> String {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url.into()
    }
}

fn filter_instance(data: Value) -> Value {
    filter_nested_list(fields::INSTANCE.filter(data), "tasks", &fields::TASK)
}

fn flatten_error_detail(data: Value) -> Value {
    match data {
        Value::Object(mut map) => match map.remove("Data") {
            Some(detail @ Value::Object(_)) => fields::ERROR_DETAIL.filter(detail),
            Some(other) => {
                map.insert("Data".to_string(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}
