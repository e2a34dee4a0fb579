use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Runtime endpoints and timeouts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the local runtime and the optional remote peer live, and how long
/// we wait for them.
///
/// The health probe timeout is deliberately much shorter than the execute
/// timeout: a dead peer should cost ~1s of probing, never a full execution
/// attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "d_ollama_host")]
    pub ollama_host: String,
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub local_model: Option<String>,
    #[serde(default = "d_1000")]
    pub health_timeout_ms: u64,
    #[serde(default = "d_30000")]
    pub execute_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            ollama_host: d_ollama_host(),
            remote_url: None,
            local_model: None,
            health_timeout_ms: 1000,
            execute_timeout_ms: 30_000,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `TANDEM_OLLAMA_HOST`, `TANDEM_REMOTE_URL`,
    /// and `TANDEM_LOCAL_MODEL` when set and non-empty.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(host) = env_non_empty("TANDEM_OLLAMA_HOST") {
            cfg.ollama_host = host;
        }
        cfg.remote_url = env_non_empty("TANDEM_REMOTE_URL");
        cfg.local_model = env_non_empty("TANDEM_LOCAL_MODEL");
        cfg
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn d_ollama_host() -> String {
    "http://localhost:11434".into()
}

fn d_1000() -> u64 {
    1000
}

fn d_30000() -> u64 {
    30_000
}
