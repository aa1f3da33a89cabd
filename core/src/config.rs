//! Connection settings for the BPM server.

use std::fmt;

use crate::error::ConfigError;

pub const ENV_REST_URL: &str = "BPM_REST_URL";
pub const ENV_USERNAME: &str = "BPM_USERNAME";
pub const ENV_PASSWORD: &str = "BPM_PASSWORD";

/// Base REST URL (e.g. `https://host:9443/rest/bpm/wle/v1`) and the
/// Basic-Auth credentials sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub rest_url: String,
    pub username: String,
    pub password: String,
}

impl ClientConfig {
    pub fn new(rest_url: &str, username: &str, password: &str) -> Self {
        Self {
            rest_url: rest_url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Read `BPM_REST_URL`, `BPM_USERNAME` and `BPM_PASSWORD`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };
        Ok(Self {
            rest_url: get(ENV_REST_URL)?,
            username: get(ENV_USERNAME)?,
            password: get(ENV_PASSWORD)?,
        })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("rest_url", &self.rest_url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_all_three_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_REST_URL, "https://bpm:9443/rest/bpm/wle/v1"),
            (ENV_USERNAME, "admin"),
            (ENV_PASSWORD, "secret"),
        ]))
        .unwrap();
        assert_eq!(config, ClientConfig::new("https://bpm:9443/rest/bpm/wle/v1", "admin", "secret"));
    }

    #[test]
    fn missing_or_empty_variable_is_reported() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_REST_URL, "http://x"), (ENV_USERNAME, "")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ENV_USERNAME)));
    }

    #[test]
    fn debug_hides_password() {
        let config = ClientConfig::new("http://x", "admin", "secret");
        let shown = format!("{config:?}");
        assert!(!shown.contains("secret"));
        assert!(shown.contains("admin"));
    }
}
