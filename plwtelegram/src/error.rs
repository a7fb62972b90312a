//! Error types for the Telegram client

/// Result type alias for Telegram operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when calling the Telegram Bot API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with ok=false
    #[error("Telegram API error: {0}")]
    Api(String),
}

impl Error {
    /// Create an API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }
}
