//! [`TrackSource`] implementation for the watcher

use crate::client::SoundCloudClient;
use async_trait::async_trait;
use plwmonitor::{FetchError, TrackSource};

#[async_trait]
impl TrackSource for SoundCloudClient {
    async fn fetch(&self) -> Result<Vec<String>, FetchError> {
        // Network and parse failures are equivalent downstream; the cause
        // collapses into the opaque fetch error.
        self.fetch_playlist_tracks()
            .await
            .map_err(|e| FetchError::new(e.to_string()))
    }
}
