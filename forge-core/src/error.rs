//! Error types for forge

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for forge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for forge operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error talking to the model provider
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Model provider returned an error status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Model conversation error
    #[error("LLM error: {0}")]
    Llm(String),

    /// A stage got no parseable structured object back from the model
    #[error("{stage} did not return a valid response")]
    EmptyResponse { stage: &'static str },

    /// The run invoked more stages than allowed
    #[error("Step limit of {limit} stage invocations exceeded")]
    StepLimitExceeded { limit: usize },

    /// A tool path resolved outside the project root
    #[error("Path escapes project root: {}", path.display())]
    PathEscape { path: PathBuf },

    /// Tool dispatch error (unknown tool, malformed arguments)
    #[error("Tool error: {0}")]
    Tool(String),

    /// Illegal workflow transition
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::Api { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// HTTP statuses worth retrying: timeouts, rate limits and server errors
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}
