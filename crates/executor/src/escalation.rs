//! Keyword-triggered verbosity escalation.
//!
//! The effective level is the maximum of the agent-biased requested level
//! and the highest `escalate_to` among matching keywords. Escalation only
//! ever raises the level relative to what the caller asked for: the system
//! may compensate for models ignoring terse instructions on complex asks,
//! but never silently reduces verbosity below the caller's minimum.

use td_domain::error::{Error, Result};
use td_domain::keyword::{EscalationKeyword, KeywordLister};

use crate::verbosity::clamp_verbosity;

/// Outcome of one verbosity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbosityResolution {
    pub effective: u8,
    /// Human-readable notes about clamping or auto-escalation, joined with
    /// `"; "`. `None` when nothing noteworthy happened.
    pub warning: Option<String>,
}

/// Resolve the effective verbosity level for one request.
///
/// `requested` is the caller's explicit level (unclamped); when absent,
/// `default_level` applies. `last_user_message` is scanned for escalation
/// keywords from `keywords`; a lookup failure propagates as
/// [`Error::KeywordLookup`] with no partial result.
pub async fn resolve_verbosity(
    requested: Option<i64>,
    default_level: u8,
    agent_name: &str,
    last_user_message: &str,
    keywords: &dyn KeywordLister,
) -> Result<VerbosityResolution> {
    let mut warnings: Vec<String> = Vec::new();

    let raw = requested.unwrap_or(default_level as i64);
    let (requested_value, was_clamped) = clamp_verbosity(raw);
    if was_clamped {
        warnings.push(format!("verbosity {raw} clamped to {requested_value}"));
    }

    let biased = requested_value + agent_baseline_bias(agent_name);
    let mut effective = biased;

    if !last_user_message.trim().is_empty() {
        let records = keywords
            .list_keywords()
            .await
            .map_err(|e| Error::KeywordLookup(e.to_string()))?;
        tracing::debug!(
            count = records.len(),
            agent = %agent_name,
            requested = requested_value,
            "loaded escalation keywords"
        );

        if let Some(highest) =
            highest_escalation(&records, agent_name, requested_value, last_user_message)
        {
            if highest > effective {
                tracing::debug!(from = effective, to = highest, "escalating verbosity");
                effective = highest;
            }
        }
    }

    let (effective, _) = clamp_verbosity(effective as i64);
    if effective > biased {
        warnings.push(format!(
            "verbosity auto-escalated from {requested_value} to {effective} due to detected intent"
        ));
    }

    Ok(VerbosityResolution {
        effective,
        warning: if warnings.is_empty() {
            None
        } else {
            Some(warnings.join("; "))
        },
    })
}

/// The highest `escalate_to` among keywords that match the message and
/// apply at the requested level. Agent-scoped matches take precedence over
/// global ones when both kinds match.
fn highest_escalation(
    records: &[EscalationKeyword],
    agent_name: &str,
    requested: u8,
    message: &str,
) -> Option<u8> {
    let lowered = message.to_lowercase();

    let mut scoped_best: Option<u8> = None;
    let mut global_best: Option<u8> = None;

    for kw in records {
        if !kw.enabled || kw.keyword.is_empty() {
            continue;
        }
        match &kw.agent_scope {
            Some(scope) if scope != agent_name => continue,
            _ => {}
        }
        if !lowered.contains(&kw.keyword.to_lowercase()) {
            continue;
        }
        // The keyword does not apply at this low a request.
        if requested < kw.min_requested {
            tracing::debug!(keyword = %kw.keyword, min = kw.min_requested, "keyword below minimum request");
            continue;
        }
        // Escalation would be a no-op or a downgrade.
        if requested >= kw.escalate_to {
            continue;
        }

        let slot = if kw.agent_scope.is_some() {
            &mut scoped_best
        } else {
            &mut global_best
        };
        *slot = Some(slot.map_or(kw.escalate_to, |b| b.max(kw.escalate_to)));
    }

    scoped_best.or(global_best)
}

/// Small per-agent constant for agents that habitually need more detail.
pub fn agent_baseline_bias(agent_name: &str) -> u8 {
    match agent_name.trim().to_lowercase().as_str() {
        "go-dev" => 1,
        "go-architect" => 2,
        _ => 0,
    }
}
