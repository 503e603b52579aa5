//! Executes the requests built by `todo_core`.
//!
//! Non-2xx responses come back as data so the core client can interpret the
//! store's error body; only failures to complete the exchange are errors here.

use std::time::Duration;

use thiserror::Error;
use todo_core::{HttpMethod, HttpRequest, HttpResponse};

/// The request never produced a response.
#[derive(Debug, Error)]
#[error("{method} {url} failed")]
pub struct TransportError {
    pub method: &'static str,
    pub url: String,
    #[source]
    pub source: ureq::Error,
}

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking HTTP transport on a shared `ureq::Agent`.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let fail = |source| TransportError {
            method: request.method.as_str(),
            url: request.path.clone(),
            source,
        };

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.path);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.path);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(fail)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(fail)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
