//! Remote peer executor.
//!
//! The peer implements the same logical operation behind two endpoints: a
//! health probe (`GET /health`) and an execute call (`POST /execute`). The
//! probe timeout is much shorter than the execute timeout so a dead peer is
//! detected quickly instead of stalling the whole request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use td_domain::chat::ChatMessage;
use td_domain::error::{Error, Result};

use crate::traits::{ChatExecutor, RemoteEndpoint};
use crate::util::from_reqwest;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(1);
const EXECUTE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    reply: String,
}

/// Executes chat completions against a remote HTTP peer.
///
/// The execute protocol carries no model field: the peer's own default
/// model applies regardless of any local model override. This is a known
/// limitation of the wire contract, not something this executor works
/// around.
pub struct RemoteExecutor {
    base_url: String,
    client: reqwest::Client,
    health_timeout: Duration,
    execute_timeout: Duration,
}

impl RemoteExecutor {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeouts(base_url, HEALTH_TIMEOUT, EXECUTE_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        health_timeout: Duration,
        execute_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().build().map_err(from_reqwest)?;
        let base_url: String = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            health_timeout,
            execute_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatExecutor for RemoteExecutor {
    async fn execute(&self, messages: &[ChatMessage]) -> Result<String> {
        tracing::debug!(url = %self.base_url, "remote execute start");

        let resp = self
            .client
            .post(format!("{}/execute", self.base_url))
            .timeout(self.execute_timeout)
            .json(&ExecuteRequest { messages })
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "remote execute non-200");
            return Err(Error::Remote(format!(
                "status {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let out: ExecuteResponse = resp.json().await.map_err(from_reqwest)?;
        if out.reply.is_empty() {
            // A legitimate answer is never empty; treat it as a protocol
            // violation by the peer.
            return Err(Error::Remote("empty reply".into()));
        }
        tracing::debug!(chars = out.reply.len(), "remote execute ok");
        Ok(out.reply)
    }
}

#[async_trait]
impl RemoteEndpoint for RemoteExecutor {
    async fn available(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        tracing::debug!(url = %url, "remote health check");

        let resp = self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| Error::HealthCheck(e.to_string()))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::HealthCheck(format!("status {}", status.as_u16())));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let e = RemoteExecutor::new("http://peer:8080/").unwrap();
        assert_eq!(e.base_url(), "http://peer:8080");
    }

    #[test]
    fn default_probe_timeout_is_shorter_than_execute() {
        let e = RemoteExecutor::new("http://peer:8080").unwrap();
        assert!(e.health_timeout < e.execute_timeout);
    }

    #[test]
    fn execute_request_wire_shape() {
        let messages = vec![ChatMessage::user("ping")];
        let json = serde_json::to_string(&ExecuteRequest { messages: &messages }).unwrap();
        assert_eq!(json, r#"{"messages":[{"role":"user","content":"ping"}]}"#);
    }

    #[test]
    fn execute_response_defaults_to_empty_reply() {
        let out: ExecuteResponse = serde_json::from_str("{}").unwrap();
        assert!(out.reply.is_empty());
    }
}
