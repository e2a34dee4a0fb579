//! Verbosity escalation keywords.
//!
//! A keyword record says: when this text appears in the user's latest
//! message and the requested verbosity falls inside the record's window,
//! raise the effective verbosity to `escalate_to`. Records live in an
//! external store; this module defines the record shape, the lister
//! capability, and two in-process implementations (a null object for
//! callers without a store, and an in-memory store for tests and the CLI).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationKeyword {
    pub id: i64,
    pub keyword: String,
    /// Lowest requested verbosity at which this keyword applies.
    pub min_requested: u8,
    pub escalate_to: u8,
    pub enabled: bool,
    pub priority: i32,
    /// When set, the keyword only applies to the named agent.
    #[serde(default)]
    pub agent_scope: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EscalationKeyword {
    /// An enabled, globally-scoped keyword with default priority.
    pub fn new(id: i64, keyword: impl Into<String>, min_requested: u8, escalate_to: u8) -> Self {
        Self {
            id,
            keyword: keyword.into(),
            min_requested,
            escalate_to,
            enabled: true,
            priority: 0,
            agent_scope: None,
            created_at: Utc::now(),
        }
    }

    pub fn scoped_to(mut self, agent: impl Into<String>) -> Self {
        self.agent_scope = Some(agent.into());
        self
    }
}

/// The lister capability consumed by verbosity resolution.
///
/// Lookup failures must surface as errors; resolution never guesses a
/// default when the store is broken.
#[async_trait]
pub trait KeywordLister: Send + Sync {
    async fn list_keywords(&self) -> Result<Vec<EscalationKeyword>>;
}

/// Null-object lister for callers without a configured keyword store.
pub struct NoopKeywordStore;

#[async_trait]
impl KeywordLister for NoopKeywordStore {
    async fn list_keywords(&self) -> Result<Vec<EscalationKeyword>> {
        Ok(Vec::new())
    }
}

/// In-memory keyword store.
#[derive(Default)]
pub struct InMemoryKeywordStore {
    keywords: RwLock<Vec<EscalationKeyword>>,
}

impl InMemoryKeywordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, keyword: EscalationKeyword) {
        self.keywords.write().push(keyword);
    }
}

#[async_trait]
impl KeywordLister for InMemoryKeywordStore {
    /// Lists in the persistent store's order: priority descending, longer
    /// keywords first, then insertion order.
    async fn list_keywords(&self) -> Result<Vec<EscalationKeyword>> {
        let mut keywords = self.keywords.read().clone();
        keywords.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.keyword.len().cmp(&a.keyword.len()))
                .then(a.id.cmp(&b.id))
        });
        Ok(keywords)
    }
}
