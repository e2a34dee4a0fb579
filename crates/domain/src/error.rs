/// Shared error type used across all Tandem crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("config: {0}")]
    Config(String),

    #[error("remote health check failed: {0}")]
    HealthCheck(String),

    #[error("remote executor: {0}")]
    Remote(String),

    #[error("local runtime: {0}")]
    Local(String),

    #[error("keyword lookup: {0}")]
    KeywordLookup(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
