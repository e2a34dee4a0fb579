pub mod chat;
pub mod config;
pub mod error;
pub mod keyword;
pub mod stream;

pub use chat::{ChatMessage, Role};
pub use error::{Error, Result};
