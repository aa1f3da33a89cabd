//! Executing `HttpRequest`s.
//!
//! # Design
//! `Transport` is the seam between the I/O-free client and the network. Any
//! `Fn(HttpRequest) -> HttpOutcome` is a transport, which keeps tests free of
//! sockets. `UreqTransport` is the blocking implementation; it turns off
//! ureq's status-as-error handling so every status reaches `classify`.

use crate::http::{HttpOutcome, HttpRequest};

pub trait Transport {
    fn execute(&self, request: HttpRequest) -> HttpOutcome;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> HttpOutcome,
{
    fn execute(&self, request: HttpRequest) -> HttpOutcome {
        self(request)
    }
}

#[cfg(feature = "blocking")]
pub use blocking::{UreqTransport, DEFAULT_BODY_LIMIT};

#[cfg(feature = "blocking")]
mod blocking {
    use std::fmt;

    use tracing::{debug, warn};

    use super::Transport;
    use crate::http::{HttpMethod, HttpOutcome, HttpRequest, HttpResponse, TransportError};

    /// Largest response body `UreqTransport` reads by default (64 MiB).
    /// ureq's own default is 10 MB, which large instance trees can exceed.
    pub const DEFAULT_BODY_LIMIT: u64 = 64 * 1024 * 1024;

    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
        body_limit: u64,
    }

    impl fmt::Debug for UreqTransport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("UreqTransport")
                .field("body_limit", &self.body_limit)
                .finish_non_exhaustive()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self::with_agent(agent)
        }

        /// Use a preconfigured agent. It must not treat HTTP statuses as
        /// errors, or 4xx/5xx responses will surface as transport failures.
        pub fn with_agent(agent: ureq::Agent) -> Self {
            Self {
                agent,
                body_limit: DEFAULT_BODY_LIMIT,
            }
        }

        /// Cap on response body size in bytes. A larger body is reported as
        /// a `TransportError`, even though the server did answer.
        pub fn body_limit(mut self, bytes: u64) -> Self {
            self.body_limit = bytes;
            self
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: HttpRequest) -> HttpOutcome {
            let HttpRequest {
                method,
                url,
                headers,
            } = request;

            let result = match method {
                HttpMethod::Get => with_headers(self.agent.get(&url), &headers).call(),
                HttpMethod::Post => with_headers(self.agent.post(&url), &headers).send_empty(),
                HttpMethod::Put => with_headers(self.agent.put(&url), &headers).send_empty(),
            };

            let mut response = result.map_err(|e| {
                warn!(%method, error = %e, "transport failure");
                TransportError::new(e.to_string())
            })?;

            let status = response.status().as_u16();
            let body = response
                .body_mut()
                .with_config()
                .limit(self.body_limit)
                .read_to_string()
                .map_err(|e| {
                    warn!(%method, status, error = %e, "unreadable response body");
                    TransportError::new(e.to_string())
                })?;
            debug!(%method, status, "received response");

            Ok(HttpResponse::new(status, body))
        }
    }

    fn with_headers<B>(
        mut builder: ureq::RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }
}
