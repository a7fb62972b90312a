//! Error types for the SoundCloud client

/// Result type alias for SoundCloud operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when fetching a playlist page
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Regex error
    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    /// Scraping failed (HTML parsing error)
    #[error("Scraping failed: {0}")]
    ScrapingError(String),
}

impl Error {
    /// Create a scraping error
    pub fn scraping_error(msg: impl Into<String>) -> Self {
        Self::ScrapingError(msg.into())
    }
}
