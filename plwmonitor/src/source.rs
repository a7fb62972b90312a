//! Track source seam consumed by the watcher

use crate::error::FetchError;
use async_trait::async_trait;

/// Produces the current ordered list of track titles for the watched
/// playlist.
///
/// Implementations must return titles in page order, deduplicated keeping
/// the first occurrence, with empty titles dropped. The list may be empty
/// when the page yields nothing recognizable.
///
/// How the titles are obtained (HTTP, scraping selectors, APIs) is an
/// implementation detail of the source site; the watcher only relies on
/// this contract and treats any [`FetchError`] the same way regardless of
/// its cause.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Fetch the current track titles
    async fn fetch(&self) -> Result<Vec<String>, FetchError>;
}
