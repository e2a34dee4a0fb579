use serde::Serialize;
use std::pin::Pin;

/// A boxed async stream, used for local-runtime streaming responses.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// Events emitted while a completion streams in.
///
/// The stream yields zero or more `Token` chunks followed by a terminal
/// `Done`; transport and runtime failures arrive as `Err` items instead.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// An incremental text fragment.
    #[serde(rename = "token")]
    Token { text: String },

    /// The stream finished.
    #[serde(rename = "done")]
    Done,
}
