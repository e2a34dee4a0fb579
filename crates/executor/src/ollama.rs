//! Local runtime executor.
//!
//! Drives an Ollama-compatible runtime over HTTP: checks that the requested
//! model is present (pulling it when missing), then issues a chat
//! completion, blocking or streaming. Model presence is re-checked on every
//! call rather than cached; the runtime owns that state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use td_domain::chat::ChatMessage;
use td_domain::error::{Error, Result};
use td_domain::stream::{BoxStream, StreamEvent};

use crate::ndjson;
use crate::traits::ChatExecutor;
use crate::util::from_reqwest;
use crate::verbosity;

pub const DEFAULT_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen2.5:7b";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Serialize)]
struct ChatOptions {
    num_predict: u32,
}

/// One response object, whole (non-streaming) or per line (streaming).
#[derive(Deserialize)]
struct ChatFrame {
    #[serde(default)]
    message: Option<FrameMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct FrameMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TaggedModel>,
}

#[derive(Deserialize)]
struct TaggedModel {
    name: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Executor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Executes chat completions against the local runtime.
pub struct OllamaExecutor {
    host: String,
    model: Option<String>,
    verbosity: u8,
    client: reqwest::Client,
}

impl OllamaExecutor {
    pub fn new(host: impl Into<String>, model: Option<String>, verbosity: u8) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(from_reqwest)?;
        let host: String = host.into();
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            model,
            verbosity,
            client,
        })
    }

    /// The effective model: configured override when non-empty, else the
    /// built-in default.
    pub fn selected_model(&self) -> &str {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    fn chat_options(&self) -> Option<ChatOptions> {
        verbosity::max_tokens(self.verbosity).map(|n| ChatOptions { num_predict: n })
    }

    // ── Model presence ─────────────────────────────────────────────

    async fn has_model(&self, model: &str) -> Result<bool> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.host))
            .send()
            .await
            .map_err(from_reqwest)?;
        if !resp.status().is_success() {
            return Err(Error::Local(format!(
                "model list status {}",
                resp.status().as_u16()
            )));
        }
        let tags: TagsResponse = resp.json().await.map_err(from_reqwest)?;
        Ok(tags.models.iter().any(|m| m.name == model))
    }

    async fn pull_model(&self, model: &str) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/api/pull", self.host))
            .json(&serde_json::json!({ "name": model, "stream": false }))
            .send()
            .await
            .map_err(from_reqwest)?;
        if !resp.status().is_success() {
            return Err(Error::Local(format!(
                "pull of '{}' failed with status {}",
                model,
                resp.status().as_u16()
            )));
        }
        Ok(())
    }

    /// Make sure the selected model is present, pulling it when missing.
    /// Pull failures are fatal.
    pub async fn ensure_model(&self) -> Result<()> {
        let model = self.selected_model();
        if self.has_model(model).await? {
            tracing::debug!(model = %model, "model ready");
            return Ok(());
        }
        tracing::info!(model = %model, "model missing, pulling");
        self.pull_model(model).await?;
        tracing::info!(model = %model, "model ready");
        Ok(())
    }

    // ── Completion ─────────────────────────────────────────────────

    /// Issue a single non-streaming completion and return the assistant's
    /// content.
    pub async fn execute(&self, messages: &[ChatMessage]) -> Result<String> {
        self.ensure_model().await?;

        let model = self.selected_model();
        tracing::debug!(model = %model, host = %self.host, "local chat request");

        let body = ChatRequestBody {
            model,
            messages,
            stream: false,
            options: self.chat_options(),
        };
        let resp = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;
        if !resp.status().is_success() {
            return Err(Error::Local(format!(
                "chat status {}",
                resp.status().as_u16()
            )));
        }

        let frame: ChatFrame = resp.json().await.map_err(from_reqwest)?;
        if let Some(err) = frame.error.filter(|e| !e.is_empty()) {
            return Err(Error::Local(err));
        }
        let content = frame.message.map(|m| m.content).unwrap_or_default();
        if content.is_empty() {
            return Err(Error::Local("no response from runtime".into()));
        }
        tracing::debug!(model = %model, chars = content.len(), "local chat response");
        Ok(content)
    }

    /// Open a streaming completion. The returned stream yields one
    /// [`StreamEvent::Token`] per incremental fragment and a terminal
    /// [`StreamEvent::Done`]; runtime errors arrive as `Err` items.
    pub async fn execute_streaming(
        &self,
        messages: &[ChatMessage],
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        self.ensure_model().await?;

        let model = self.selected_model();
        tracing::debug!(model = %model, host = %self.host, "local streaming request");

        let body = ChatRequestBody {
            model,
            messages,
            stream: true,
            options: self.chat_options(),
        };
        let resp = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Local(format!(
                "chat status {}: {}",
                status.as_u16(),
                text.trim()
            )));
        }

        let stream = async_stream::stream! {
            let mut response = resp;
            let mut buffer = String::new();

            loop {
                match response.chunk().await {
                    Ok(Some(bytes)) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        for line in ndjson::drain_lines(&mut buffer) {
                            match parse_stream_frame(&line) {
                                Ok(Some(text)) => yield Ok(StreamEvent::Token { text }),
                                Ok(None) => {}
                                Err(e) => {
                                    yield Err(e);
                                    return;
                                }
                            }
                        }
                    }
                    Ok(None) => {
                        // Body closed -- flush a trailing unterminated line.
                        let rest = buffer.trim();
                        if !rest.is_empty() {
                            match parse_stream_frame(rest) {
                                Ok(Some(text)) => yield Ok(StreamEvent::Token { text }),
                                Ok(None) => {}
                                Err(e) => {
                                    yield Err(e);
                                    return;
                                }
                            }
                        }
                        break;
                    }
                    Err(e) => {
                        yield Err(from_reqwest(e));
                        return;
                    }
                }
            }

            yield Ok(StreamEvent::Done);
        };

        Ok(Box::pin(stream))
    }
}

/// Parse one streamed response line into its text fragment, if any.
fn parse_stream_frame(line: &str) -> Result<Option<String>> {
    let frame: ChatFrame =
        serde_json::from_str(line).map_err(|e| Error::Local(format!("bad stream frame: {e}")))?;
    if let Some(err) = frame.error.filter(|e| !e.is_empty()) {
        return Err(Error::Local(err));
    }
    Ok(frame
        .message
        .map(|m| m.content)
        .filter(|c| !c.is_empty()))
}

#[async_trait]
impl ChatExecutor for OllamaExecutor {
    async fn execute(&self, messages: &[ChatMessage]) -> Result<String> {
        OllamaExecutor::execute(self, messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_model_prefers_override() {
        let e = OllamaExecutor::new(DEFAULT_HOST, Some("llama3:8b".into()), 2).unwrap();
        assert_eq!(e.selected_model(), "llama3:8b");
    }

    #[test]
    fn selected_model_ignores_blank_override() {
        let e = OllamaExecutor::new(DEFAULT_HOST, Some("   ".into()), 2).unwrap();
        assert_eq!(e.selected_model(), DEFAULT_MODEL);
        let e = OllamaExecutor::new(DEFAULT_HOST, None, 2).unwrap();
        assert_eq!(e.selected_model(), DEFAULT_MODEL);
    }

    #[test]
    fn host_trailing_slash_is_trimmed() {
        let e = OllamaExecutor::new("http://box:11434/", None, 2).unwrap();
        assert_eq!(e.host, "http://box:11434");
    }

    #[test]
    fn options_omitted_at_level_five() {
        let capped = OllamaExecutor::new(DEFAULT_HOST, None, 0).unwrap();
        assert_eq!(capped.chat_options().map(|o| o.num_predict), Some(128));

        let uncapped = OllamaExecutor::new(DEFAULT_HOST, None, 5).unwrap();
        assert!(uncapped.chat_options().is_none());
    }

    #[test]
    fn request_body_skips_absent_options() {
        let body = ChatRequestBody {
            model: "m",
            messages: &[],
            stream: false,
            options: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("options"));

        let body = ChatRequestBody {
            model: "m",
            messages: &[],
            stream: false,
            options: Some(ChatOptions { num_predict: 256 }),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""options":{"num_predict":256}"#));
    }

    #[test]
    fn stream_frame_extracts_content() {
        let text = parse_stream_frame(r#"{"message":{"role":"assistant","content":"hi"},"done":false}"#)
            .unwrap();
        assert_eq!(text.as_deref(), Some("hi"));
    }

    #[test]
    fn stream_frame_final_line_has_no_content() {
        let text = parse_stream_frame(r#"{"done":true,"total_duration":12345}"#).unwrap();
        assert!(text.is_none());
    }

    #[test]
    fn stream_frame_error_field_is_fatal() {
        let err = parse_stream_frame(r#"{"error":"model exploded"}"#).unwrap_err();
        assert!(matches!(err, Error::Local(ref m) if m == "model exploded"));
    }

    #[test]
    fn stream_frame_rejects_garbage() {
        assert!(parse_stream_frame("not json").is_err());
    }
}
