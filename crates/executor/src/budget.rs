//! Pre-execution token budget estimate.

use serde::Serialize;
use td_domain::chat::ChatMessage;

use crate::verbosity;

/// Estimated token usage for a request. Not precise, just a rough
/// approximation for progress reporting before the model runs.
#[derive(Debug, Clone, Serialize)]
pub struct TokenBudget {
    pub estimated_prompt_tokens: u32,
    /// `None` mirrors the uncapped level-5 budget.
    pub max_completion_tokens: Option<u32>,
    pub total_estimated_tokens: u32,
}

/// Heuristic: ~4 characters per token, plus a small per-message overhead
/// for role and formatting.
pub fn estimate_token_budget(messages: &[ChatMessage], verbosity: u8) -> TokenBudget {
    const CHARS_PER_TOKEN: usize = 4;
    const MESSAGE_OVERHEAD_CHARS: usize = 20;

    let total_chars: usize = messages
        .iter()
        .map(|m| m.content.len() + MESSAGE_OVERHEAD_CHARS)
        .sum();

    let estimated_prompt_tokens = (total_chars / CHARS_PER_TOKEN) as u32;
    let max_completion_tokens = verbosity::max_tokens(verbosity);

    TokenBudget {
        estimated_prompt_tokens,
        max_completion_tokens,
        total_estimated_tokens: estimated_prompt_tokens + max_completion_tokens.unwrap_or(0),
    }
}
