//! HTTP client scraping track titles from a SoundCloud playlist page
//!
//! SoundCloud renders playlist entries as `<meta itemprop="name">` tags in
//! the server-side markup. The extraction here is deliberately
//! approximate: the page layout is a brittle detail of the source site,
//! and the only contract upheld is "fetch returns an ordered list of
//! title strings, deduplicated, best-effort".
//!
//! # Example
//!
//! ```no_run
//! use plwsoundcloud::SoundCloudClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SoundCloudClient::builder("https://soundcloud.com/someone/sets/test")
//!         .build()
//!         .await?;
//!
//!     let tracks = client.fetch_playlist_tracks().await?;
//!     for title in tracks {
//!         println!("{title}");
//!     }
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "PlaylistWatch/0.1 (plwsoundcloud)";

/// SoundCloud playlist page client
///
/// The client is stateless and holds no snapshot of the playlist; diffing
/// against prior fetches is the watcher's concern.
#[derive(Debug, Clone)]
pub struct SoundCloudClient {
    client: Client,
    playlist_url: Url,
    timeout: Duration,
}

impl SoundCloudClient {
    /// Create a builder for the given playlist page URL
    pub fn builder(playlist_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(playlist_url)
    }

    /// The watched playlist page URL
    pub fn playlist_url(&self) -> &str {
        self.playlist_url.as_str()
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Fetch the playlist page and extract its track titles.
    ///
    /// Returns titles in page order, deduplicated keeping the first
    /// occurrence, with empty and obviously-non-track entries dropped.
    /// The list may be empty when the page yields nothing recognizable.
    pub async fn fetch_playlist_tracks(&self) -> Result<Vec<String>> {
        let html = self
            .client
            .get(self.playlist_url.clone())
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let tracks = extract_titles(&html)?;
        debug!(
            url = %self.playlist_url,
            tracks = tracks.len(),
            "playlist page scraped"
        );
        Ok(tracks)
    }
}

/// Extract track titles from playlist page HTML
pub(crate) fn extract_titles(html: &str) -> Result<Vec<String>> {
    let mut titles = Vec::new();

    // Method 1: parse the DOM and read <meta itemprop="name" content="...">
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"meta[itemprop="name"]"#)
        .map_err(|e| Error::scraping_error(e.to_string()))?;
    for element in document.select(&selector) {
        if let Some(content) = element.value().attr("content") {
            titles.push(content.trim().to_string());
        }
    }

    // Method 2: regex fallback over the raw HTML, for markup the DOM
    // parser does not surface.
    if titles.is_empty() {
        let re = Regex::new(r#"<meta[^>]*itemprop="name"[^>]*content="([^"]*)""#)?;
        for cap in re.captures_iter(html) {
            titles.push(cap[1].trim().to_string());
        }
    }

    Ok(normalize_titles(titles))
}

/// Drop empty and non-track entries, dedup keeping first occurrence
fn normalize_titles(titles: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    titles
        .into_iter()
        .filter(|t| !t.is_empty())
        // The playlist's own name is rendered with the same markup.
        .filter(|t| !t.to_lowercase().contains("playlist"))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Builder for [`SoundCloudClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    playlist_url: String,
    user_agent: String,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder for the given playlist page URL
    pub fn new(playlist_url: impl Into<String>) -> Self {
        Self {
            client: None,
            playlist_url: playlist_url.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub async fn build(self) -> Result<SoundCloudClient> {
        let playlist_url = Url::parse(&self.playlist_url)?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };

        Ok(SoundCloudClient {
            client,
            playlist_url,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_titles_in_page_order() {
        let html = r#"
            <html><head>
            <meta itemprop="name" content="First Song">
            <meta itemprop="name" content="Second Song">
            </head></html>
        "#;
        assert_eq!(
            extract_titles(html).unwrap(),
            vec!["First Song".to_string(), "Second Song".to_string()]
        );
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let html = r#"
            <meta itemprop="name" content="A">
            <meta itemprop="name" content="A">
            <meta itemprop="name" content="B">
        "#;
        assert_eq!(
            extract_titles(html).unwrap(),
            vec!["A".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn test_playlist_name_and_empty_entries_filtered() {
        let html = r#"
            <meta itemprop="name" content="My Test Playlist">
            <meta itemprop="name" content="  ">
            <meta itemprop="name" content="Actual Song">
        "#;
        assert_eq!(extract_titles(html).unwrap(), vec!["Actual Song".to_string()]);
    }

    #[test]
    fn test_titles_are_trimmed() {
        let html = r#"<meta itemprop="name" content="  Padded Title  ">"#;
        assert_eq!(extract_titles(html).unwrap(), vec!["Padded Title".to_string()]);
    }

    #[test]
    fn test_metas_without_itemprop_are_ignored() {
        let html = r#"
            <meta name="description" content="Not a track">
            <meta itemprop="name" content="Track">
        "#;
        assert_eq!(extract_titles(html).unwrap(), vec!["Track".to_string()]);
    }

    #[test]
    fn test_regex_fallback_when_dom_yields_nothing() {
        // The DOM parser drops commented-out markup; the raw-text pass
        // still finds it.
        let html = r#"<!-- <meta itemprop="name" content="Hidden Track"> -->"#;
        assert_eq!(extract_titles(html).unwrap(), vec!["Hidden Track".to_string()]);
    }

    #[test]
    fn test_empty_page_yields_empty_list() {
        assert!(extract_titles("<html></html>").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_builder_rejects_invalid_url() {
        let result = SoundCloudClient::builder("not a url").build().await;
        assert!(matches!(result, Err(crate::Error::InvalidUrl(_))));
    }
}
