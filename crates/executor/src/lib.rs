//! Execution routing and verbosity resolution.
//!
//! Two entry points for callers:
//! - [`resolve_verbosity`] combines the requested level, the agent's
//!   baseline tendency, and keyword-triggered escalation into an effective
//!   verbosity level.
//! - [`execute_with_fallback`] routes a chat request to the local runtime
//!   or a remote peer with a health-checked fallback, tagging the result
//!   with the path that served it. [`execute_streaming`] is the streaming
//!   variant.

pub mod budget;
pub mod escalation;
pub mod fallback;
pub mod ollama;
pub mod remote;
pub mod traits;
pub mod verbosity;

pub(crate) mod ndjson;
pub(crate) mod util;

// Re-exports for convenience.
pub use escalation::{resolve_verbosity, VerbosityResolution};
pub use fallback::{
    collect_stream, execute_streaming, execute_with_fallback, ExecutionResult, ExecutionSource,
    FallbackConfig,
};
pub use traits::{ChatExecutor, RemoteEndpoint};
