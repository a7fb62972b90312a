//! SoundCloud playlist client for PlaylistWatch
//!
//! This crate fetches a public SoundCloud playlist page and extracts its
//! track titles, implementing the watcher's `TrackSource` contract:
//! ordered, deduplicated (first occurrence wins), best-effort.
//!
//! Scraping correctness against arbitrary page-markup changes is a
//! non-goal; when the markup shifts, fetches degrade to an empty list (or
//! a fetch error) and the watcher keeps its previous snapshot.
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
//!     let tracks = client.fetch_playlist_tracks().await?;
//!     println!("Found {} tracks", tracks.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod source;

// Re-exports
pub use client::{ClientBuilder, SoundCloudClient};
pub use error::{Error, Result};
