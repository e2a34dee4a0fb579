use async_trait::async_trait;
use td_domain::chat::ChatMessage;
use td_domain::error::Result;

/// Anything that can turn an ordered message set into a reply.
#[async_trait]
pub trait ChatExecutor: Send + Sync {
    async fn execute(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// A remote peer that can be probed for reachability before committing to
/// a full execution attempt.
#[async_trait]
pub trait RemoteEndpoint: ChatExecutor {
    /// `Ok(true)` when the peer answered healthy, `Ok(false)` when it is
    /// reachable but reports itself not ready, `Err` on transport failure
    /// or an unexpected status.
    async fn available(&self) -> Result<bool>;
}
