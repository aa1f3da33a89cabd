//! One call per endpoint: build, execute, parse.

use crate::client::BpmClient;
use crate::error::ApiError;
use crate::message::TriggerMessage;
use crate::response::Envelope;
use crate::transport::Transport;
use crate::types::{GroupQuery, InstanceAction, StartProcess, UserQuery};

/// A `BpmClient` bound to a `Transport`.
///
/// Each method issues exactly one request. Nothing is retried or cached;
/// concurrent use only needs a transport that is itself shareable.
#[derive(Debug, Clone)]
pub struct BpmSession<T> {
    client: BpmClient,
    transport: T,
}

impl<T: Transport> BpmSession<T> {
    pub fn new(client: BpmClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &BpmClient {
        &self.client
    }

    pub fn list_users(&self, query: &UserQuery) -> Result<Envelope, ApiError> {
        let outcome = self.transport.execute(self.client.build_list_users(query));
        self.client.parse_list_users(outcome)
    }

    pub fn get_user(&self, user: &str) -> Result<Envelope, ApiError> {
        let outcome = self.transport.execute(self.client.build_get_user(user));
        self.client.parse_get_user(outcome)
    }

    pub fn list_groups(&self, query: &GroupQuery) -> Result<Envelope, ApiError> {
        let outcome = self.transport.execute(self.client.build_list_groups(query));
        self.client.parse_list_groups(outcome)
    }

    pub fn get_group(&self, group: &str) -> Result<Envelope, ApiError> {
        let outcome = self.transport.execute(self.client.build_get_group(group));
        self.client.parse_get_group(outcome)
    }

    pub fn start_instance(&self, input: &StartProcess) -> Result<Envelope, ApiError> {
        let outcome = self.transport.execute(self.client.build_start_instance(input)?);
        self.client.parse_instance(outcome)
    }

    pub fn get_instance(&self, instance_id: &str) -> Result<Envelope, ApiError> {
        let outcome = self.transport.execute(self.client.build_get_instance(instance_id));
        self.client.parse_instance(outcome)
    }

    pub fn instance_action(&self, instance_id: &str, action: InstanceAction) -> Result<Envelope, ApiError> {
        let outcome = self
            .transport
            .execute(self.client.build_instance_action(instance_id, action));
        self.client.parse_instance_action(action, outcome)
    }

    pub fn suspend_instance(&self, instance_id: &str) -> Result<Envelope, ApiError> {
        self.instance_action(instance_id, InstanceAction::Suspend)
    }

    pub fn resume_instance(&self, instance_id: &str) -> Result<Envelope, ApiError> {
        self.instance_action(instance_id, InstanceAction::Resume)
    }

    pub fn terminate_instance(&self, instance_id: &str) -> Result<Envelope, ApiError> {
        self.instance_action(instance_id, InstanceAction::Terminate)
    }

    pub fn retry_instance(&self, instance_id: &str) -> Result<Envelope, ApiError> {
        self.instance_action(instance_id, InstanceAction::Retry)
    }

    pub fn delete_instance(&self, instance_id: &str) -> Result<Envelope, ApiError> {
        self.instance_action(instance_id, InstanceAction::Delete)
    }

    pub fn bulk_action(&self, action: InstanceAction, instance_ids: &[&str]) -> Result<Envelope, ApiError> {
        let outcome = self
            .transport
            .execute(self.client.build_bulk_action(action, instance_ids));
        self.client.parse_bulk_action(outcome)
    }

    pub fn fire_timer(&self, instance_id: &str, timer_token_id: &str) -> Result<Envelope, ApiError> {
        let outcome = self
            .transport
            .execute(self.client.build_fire_timer(instance_id, timer_token_id));
        self.client.parse_instance(outcome)
    }

    pub fn move_token(
        &self,
        instance_id: &str,
        token_id: &str,
        target: &str,
        resume: bool,
    ) -> Result<Envelope, ApiError> {
        let outcome = self
            .transport
            .execute(self.client.build_move_token(instance_id, token_id, target, resume));
        self.client.parse_instance(outcome)
    }

    pub fn delete_token(&self, instance_id: &str, token_id: &str, resume: bool) -> Result<Envelope, ApiError> {
        let outcome = self
            .transport
            .execute(self.client.build_delete_token(instance_id, token_id, resume));
        self.client.parse_instance(outcome)
    }

    pub fn send_message(&self, message: &TriggerMessage) -> Result<Envelope, ApiError> {
        let outcome = self.transport.execute(self.client.build_send_message(message)?);
        self.client.parse_send_message(outcome)
    }

    pub fn system_details(&self) -> Result<Envelope, ApiError> {
        let outcome = self.transport.execute(self.client.build_system_details());
        self.client.parse_system_details(outcome)
    }
}

#[cfg(feature = "blocking")]
impl BpmSession<crate::transport::UreqTransport> {
    /// Session over a fresh blocking ureq agent.
    pub fn connect(config: &crate::config::ClientConfig) -> Result<Self, crate::error::ConfigError> {
        Ok(Self::new(BpmClient::new(config)?, crate::transport::UreqTransport::new()))
    }
}
