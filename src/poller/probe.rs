//! Health probes: one request against the backend per call.

use std::time::Duration;

use async_trait::async_trait;
use http::header::ACCEPT;

use crate::config::PROBE_USER_AGENT;
use crate::error::PollError;

use super::state::{HealthPayload, PollOutcome};

/// A single liveness check against the backend.
///
/// Implementations must not panic on bad responses; every failure is
/// reported as a [`PollError`].
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self) -> PollOutcome;

    /// URL or other description of what is being probed, for logs
    fn target(&self) -> &str;
}

/// Probe that issues `GET <health-url>` with reqwest
#[derive(Clone)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpHealthProbe {
    /// Build a probe whose requests give up after `timeout`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(PROBE_USER_AGENT)
            .build()?;

        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self) -> PollOutcome {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| PollError::Transport(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PollError::Transport(describe(&e)))?;

        HealthPayload::from_slice(&body)
    }

    fn target(&self) -> &str {
        &self.url
    }
}

/// Flatten a reqwest error and its sources into one line
fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "request timed out".to_string();
    }

    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
