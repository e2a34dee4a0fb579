//! Health-checked local/remote routing.
//!
//! The decision order: forced-local wins outright; with no remote
//! configured the request runs locally (or fails when the caller demanded
//! remote-only); otherwise the remote peer is probed with a short timeout
//! and executed on success, falling back to the local runtime on any remote
//! failure unless remote-only was demanded. Intermediate failures are
//! logged, never surfaced; the caller sees exactly one reply with a source
//! tag, or one error describing the terminal failure.

use serde::Serialize;
use std::fmt;

use td_agents::AgentProfile;
use td_domain::chat::ChatMessage;
use td_domain::error::{Error, Result};
use td_domain::stream::{BoxStream, StreamEvent};

use crate::ollama::{OllamaExecutor, DEFAULT_HOST};
use crate::remote::RemoteExecutor;
use crate::traits::{ChatExecutor, RemoteEndpoint};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Result and config types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which path served the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionSource {
    Local,
    Remote,
    /// Remote was attempted or probed, then local answered.
    Fallback,
}

impl fmt::Display for ExecutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionSource::Local => "local",
            ExecutionSource::Remote => "remote",
            ExecutionSource::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// The reply and the path that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub reply: String,
    pub source: ExecutionSource,
}

/// Per-request routing configuration. Constructed fresh for each request
/// and never mutated during a routing decision.
#[derive(Debug, Clone, Default)]
pub struct FallbackConfig {
    /// Explicit local model override; beats the profile's model.
    pub model_override: Option<String>,
    /// Remote peer base URL. Absent or blank means "no remote configured".
    pub remote_url: Option<String>,
    /// Force the local path. Wins over `remote_only` when both are set.
    pub local_only: bool,
    /// Demand the remote path; failures are fatal instead of recovered.
    pub remote_only: bool,
    pub profile: Option<AgentProfile>,
    /// Effective verbosity, already resolved and clamped.
    pub verbosity: u8,
    /// Local runtime base URL; the built-in default when absent.
    pub ollama_host: Option<String>,
}

impl FallbackConfig {
    /// Local model resolution chain: explicit override, then the profile's
    /// local model, then the runtime's own default (`None`).
    pub fn local_model(&self) -> Option<String> {
        [
            self.model_override.as_deref(),
            self.profile.as_ref().map(|p| p.local_model.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(String::from)
    }

    fn host(&self) -> &str {
        self.ollama_host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_HOST)
    }

    fn remote_url(&self) -> Option<&str> {
        self.remote_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Routing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The routing decision itself, over injected executors. Separated from
/// [`execute_with_fallback`] so callers and tests can supply their own
/// implementations of the executor seams.
pub async fn route(
    cfg: &FallbackConfig,
    local: &dyn ChatExecutor,
    remote: Option<&dyn RemoteEndpoint>,
    messages: &[ChatMessage],
) -> Result<ExecutionResult> {
    // Forced local execution.
    if cfg.local_only {
        tracing::info!("execution path: local runtime (forced)");
        let reply = local.execute(messages).await?;
        return Ok(ExecutionResult { reply, source: ExecutionSource::Local });
    }

    // No remote configured.
    let remote = match remote {
        Some(r) => r,
        None => {
            if cfg.remote_only {
                return Err(Error::Config(
                    "remote execution requested but no remote is configured".into(),
                ));
            }
            tracing::info!("execution path: local runtime (no remote configured)");
            let reply = local.execute(messages).await?;
            return Ok(ExecutionResult { reply, source: ExecutionSource::Local });
        }
    };

    // Probe, then try remote execution.
    match remote.available().await {
        Ok(true) => match remote.execute(messages).await {
            Ok(reply) => {
                tracing::info!("execution path: remote");
                return Ok(ExecutionResult { reply, source: ExecutionSource::Remote });
            }
            Err(e) if cfg.remote_only => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "remote execute failed, falling back to local");
            }
        },
        Ok(false) => {
            if cfg.remote_only {
                return Err(Error::HealthCheck("remote peer reports not ready".into()));
            }
            tracing::warn!("remote peer not ready, falling back to local");
        }
        Err(e) => {
            if cfg.remote_only {
                return Err(e);
            }
            tracing::warn!(error = %e, "remote health check failed, falling back to local");
        }
    }

    let reply = local.execute(messages).await?;
    Ok(ExecutionResult { reply, source: ExecutionSource::Fallback })
}

/// Execute a chat request with health-checked fallback.
///
/// Timeouts are fixed internally (short health probe, longer execute);
/// there is no caller-initiated cancellation beyond them. Callers that
/// need it must wrap the returned future themselves.
pub async fn execute_with_fallback(
    cfg: &FallbackConfig,
    messages: &[ChatMessage],
) -> Result<ExecutionResult> {
    let local = OllamaExecutor::new(cfg.host(), cfg.local_model(), cfg.verbosity)?;
    let remote = match cfg.remote_url() {
        Some(url) => Some(RemoteExecutor::new(url)?),
        None => None,
    };
    route(
        cfg,
        &local,
        remote.as_ref().map(|r| r as &dyn RemoteEndpoint),
        messages,
    )
    .await
}

/// Streaming variant. The remote execute protocol has no streaming
/// endpoint, so the stream always comes from the local runtime; demanding
/// remote-only streaming is a configuration error.
pub async fn execute_streaming(
    cfg: &FallbackConfig,
    messages: &[ChatMessage],
) -> Result<BoxStream<'static, Result<StreamEvent>>> {
    if cfg.remote_only {
        return Err(Error::Config(
            "streaming is only available from the local runtime".into(),
        ));
    }
    tracing::info!("execution path: local runtime (streaming)");
    let local = OllamaExecutor::new(cfg.host(), cfg.local_model(), cfg.verbosity)?;
    local.execute_streaming(messages).await
}

/// Accumulate a token stream into the full reply, invoking `on_token` for
/// each fragment as it arrives. An error from `on_token` aborts the stream
/// immediately; the accumulated text is returned on success so callers
/// that need the whole string don't have to reassemble it.
pub async fn collect_stream<F>(
    mut stream: BoxStream<'_, Result<StreamEvent>>,
    mut on_token: F,
) -> Result<String>
where
    F: FnMut(&str) -> Result<()>,
{
    use futures_util::StreamExt;

    let mut full = String::new();
    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Token { text } => {
                on_token(&text)?;
                full.push_str(&text);
            }
            StreamEvent::Done => break,
        }
    }
    Ok(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_display_matches_serde() {
        for (source, tag) in [
            (ExecutionSource::Local, "local"),
            (ExecutionSource::Remote, "remote"),
            (ExecutionSource::Fallback, "fallback"),
        ] {
            assert_eq!(source.to_string(), tag);
            assert_eq!(serde_json::to_string(&source).unwrap(), format!("\"{tag}\""));
        }
    }

    #[test]
    fn local_model_chain_prefers_override() {
        let profile = AgentProfile {
            name: "code".into(),
            local_model: "qwen2.5:14b".into(),
            remote_model: String::new(),
            system_prompt: String::new(),
            default_verbosity: 2,
        };

        let cfg = FallbackConfig {
            model_override: Some("llama3:8b".into()),
            profile: Some(profile.clone()),
            ..Default::default()
        };
        assert_eq!(cfg.local_model().as_deref(), Some("llama3:8b"));

        let cfg = FallbackConfig { profile: Some(profile), ..Default::default() };
        assert_eq!(cfg.local_model().as_deref(), Some("qwen2.5:14b"));

        let cfg = FallbackConfig::default();
        assert_eq!(cfg.local_model(), None);
    }

    #[test]
    fn blank_override_falls_through_to_profile() {
        let profile = AgentProfile {
            name: "code".into(),
            local_model: "qwen2.5:14b".into(),
            remote_model: String::new(),
            system_prompt: String::new(),
            default_verbosity: 2,
        };
        let cfg = FallbackConfig {
            model_override: Some("  ".into()),
            profile: Some(profile),
            ..Default::default()
        };
        assert_eq!(cfg.local_model().as_deref(), Some("qwen2.5:14b"));
    }

    #[test]
    fn blank_remote_url_counts_as_unconfigured() {
        let cfg = FallbackConfig { remote_url: Some("  ".into()), ..Default::default() };
        assert_eq!(cfg.remote_url(), None);
    }
}
