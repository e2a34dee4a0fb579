//! Agent profiles.
//!
//! A profile is a named bundle of model choice, system prompt, and default
//! verbosity. The executor reads profiles through the [`AgentRegistry`]
//! trait so callers can inject their own backing store; [`StaticProfiles`]
//! is the built-in set.

use serde::{Deserialize, Serialize};

/// A competency-focused agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    /// Model for the local runtime. Empty means "runtime default".
    pub local_model: String,
    /// Model the remote peer should use. Currently informational only:
    /// the remote execute protocol carries no model field.
    pub remote_model: String,
    pub system_prompt: String,
    /// Baseline verbosity (0–5) when the caller requests none.
    pub default_verbosity: u8,
}

/// Read-only profile lookup, injected into every resolution call.
pub trait AgentRegistry: Send + Sync {
    fn get(&self, name: &str) -> Option<AgentProfile>;
    /// All profile names, sorted alphabetically.
    fn list(&self) -> Vec<String>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Built-in registry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The compiled-in profile set.
pub struct StaticProfiles {
    profiles: Vec<AgentProfile>,
}

impl Default for StaticProfiles {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticProfiles {
    pub fn new() -> Self {
        Self { profiles: builtin_profiles() }
    }
}

impl AgentRegistry for StaticProfiles {
    fn get(&self, name: &str) -> Option<AgentProfile> {
        self.profiles.iter().find(|p| p.name == name).cloned()
    }

    fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.iter().map(|p| p.name.clone()).collect();
        names.sort();
        names
    }
}

fn profile(
    name: &str,
    local_model: &str,
    remote_model: &str,
    system_prompt: &str,
    default_verbosity: u8,
) -> AgentProfile {
    AgentProfile {
        name: name.into(),
        local_model: local_model.into(),
        remote_model: remote_model.into(),
        system_prompt: system_prompt.trim().into(),
        default_verbosity,
    }
}

fn builtin_profiles() -> Vec<AgentProfile> {
    vec![
        profile("default", "", "", "", 2),
        profile(
            "code",
            "qwen2.5:14b",
            "deepseek-coder-v2:16b",
            "You are an expert programming assistant. Provide clear, well-documented \
             code with proper error handling. Focus on production-ready solutions, \
             best practices, and maintainable designs. Explain your reasoning when \
             making architectural decisions.",
            2,
        ),
        profile(
            "go-dev",
            "qwen2.5:14b",
            "deepseek-coder-v2:16b",
            "You are an expert Go developer. Write idiomatic Go code following \
             official style guides. Emphasize proper error handling with wrapped \
             errors, effective use of goroutines and channels, interface-based \
             design where appropriate, table-driven tests, and clear documentation \
             and naming. Focus on simplicity, readability, and Go best practices.",
            2,
        ),
        profile(
            "go-architect",
            "qwen2.5:14b",
            "deepseek-coder-v2:16b",
            "You are a Go systems architect. Reason about package boundaries, \
             dependency direction, concurrency topology, and failure modes before \
             writing code. Present trade-offs explicitly and recommend the simplest \
             design that satisfies the stated constraints.",
            3,
        ),
        profile(
            "sql-dev",
            "qwen2.5:14b",
            "deepseek-coder-v2:16b",
            "You are an expert SQL database developer. Provide optimized queries \
             and schema designs: proper indexing strategies, query optimization and \
             execution plans, normalized schema design, transaction management, and \
             SQL injection prevention. Support PostgreSQL, MySQL, and SQLite \
             syntax. Explain performance implications.",
            2,
        ),
        profile(
            "bash-dev",
            "qwen2.5:14b",
            "deepseek-coder-v2:16b",
            "You are an expert Bash scripting specialist. Write robust, portable \
             shell scripts with proper error handling (set -euo pipefail), input \
             validation and quoting, POSIX compatibility when possible, and safe \
             handling of edge cases. Focus on reliability and defensive \
             programming.",
            2,
        ),
    ]
}
