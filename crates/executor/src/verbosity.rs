//! Verbosity policy.
//!
//! A verbosity level (0–5) maps to a hard completion-length budget and an
//! advisory system-prompt constraint. The budget is the backstop: models do
//! not reliably honor prose instructions alone.

use td_agents::AgentRegistry;

pub const MIN_VERBOSITY: u8 = 0;
pub const MAX_VERBOSITY: u8 = 5;

/// Clamp into `[0,5]`; the flag reports whether clamping changed the value.
pub fn clamp_verbosity(value: i64) -> (u8, bool) {
    if value < MIN_VERBOSITY as i64 {
        (MIN_VERBOSITY, true)
    } else if value > MAX_VERBOSITY as i64 {
        (MAX_VERBOSITY, true)
    } else {
        (value as u8, false)
    }
}

/// Hard token budget per level. Keep 0 as smallest for predictability.
///
/// Level 5 returns `None`: no cap at all. The limit option is omitted from
/// the request and the model decides when it is done.
pub fn max_tokens(verbosity: u8) -> Option<u32> {
    match verbosity {
        0 => Some(128),
        1 => Some(256),
        2 => Some(512),
        3 => Some(2048),
        4 => Some(8192),
        _ => None,
    }
}

/// Advisory system-prompt instruction per level. Empty means "append
/// nothing".
pub fn system_constraint(verbosity: u8) -> &'static str {
    match verbosity {
        0 => {
            "IMPORTANT: Respond with extreme brevity. No explanations. No lists. \
             No markdown headings. Answer in at most 3 short lines. Do not explain."
        }
        1 => {
            "IMPORTANT: Respond concisely. Minimal explanation only. No step-by-step \
             tutorials. Short code examples are allowed. Avoid adjectives and filler."
        }
        2 => "Respond with balanced, normal detail.",
        3 => "Respond with detailed, pedagogical explanations. Use sections and lists when helpful.",
        4 => {
            "Respond with exhaustive detail, covering rationale, alternatives, and \
             edge cases with examples."
        }
        5 => {
            "Complete your answer fully. Do not pad, and do not truncate or \
             summarize prematurely."
        }
        _ => "",
    }
}

/// Append the level's constraint to an existing system prompt.
pub fn append_constraint(system: &str, verbosity: u8) -> String {
    let constraint = system_constraint(verbosity);
    if constraint.is_empty() {
        return system.to_string();
    }
    if system.is_empty() {
        return constraint.to_string();
    }
    format!("{system}\n\n{constraint}")
}

/// The global default verbosity: the "default" agent's configured level
/// when present and in range, otherwise 2 (normal).
pub fn default_verbosity(registry: &dyn AgentRegistry) -> u8 {
    if let Some(profile) = registry.get("default") {
        if profile.default_verbosity <= MAX_VERBOSITY {
            return profile.default_verbosity;
        }
    }
    2
}
