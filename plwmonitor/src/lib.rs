//! # PLWMonitor
//!
//! Core monitoring loop for PlaylistWatch.
//!
//! This crate owns the poll/diff/persist/notify cycle and the trait seams
//! the collaborators plug into:
//!
//! - **[`SnapshotStore`]**: persists the last-known ordered track list as
//!   a small JSON file, replaced atomically (write-temp-then-rename).
//! - **[`TrackSource`]**: produces the current ordered, deduplicated list
//!   of track titles (implemented by `plwsoundcloud`).
//! - **[`Notifier`]**: delivers one text message per newly observed track
//!   (implemented by `plwtelegram`).
//! - **[`diff`]**: pure delta computation between snapshot and fetch.
//! - **[`PlaylistWatcher`]**: the scheduler tying it all together, with a
//!   timer-driven background loop, an on-demand `check_now` trigger, and
//!   cancellation-token shutdown.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plwmonitor::{PlaylistWatcher, SnapshotStore};
//! use tokio_util::sync::CancellationToken;
//!
//! let store = SnapshotStore::new("playlist_state.json");
//! let (watcher, handle) = PlaylistWatcher::new(
//!     source,            // Arc<dyn TrackSource>
//!     notifier,          // Arc<dyn Notifier>
//!     store,
//!     "https://soundcloud.com/someone/sets/some-playlist",
//!     std::time::Duration::from_secs(300),
//! );
//!
//! let cancel = CancellationToken::new();
//! tokio::spawn(watcher.run(cancel.clone()));
//!
//! // Interactive "check now":
//! let report = handle.check_now().await?;
//! println!("{report}");
//! ```
//!
//! ## Failure model
//!
//! Every per-cycle failure is recovered: a fetch failure drops the cycle
//! and leaves the snapshot untouched, a delivery failure is scoped to one
//! message, and a save failure is retried on a later cycle. Delivery is
//! at-most-once per detected track per cycle, and at-least-once across
//! process restarts (a crash between notify and persist re-reports the
//! same tracks after restart).

pub mod diff;
pub mod error;
pub mod notify;
pub mod snapshot;
pub mod source;
pub mod watcher;

// Re-exports
pub use error::{CheckError, DeliveryError, FetchError, PersistenceError};
pub use notify::Notifier;
pub use snapshot::SnapshotStore;
pub use source::TrackSource;
pub use watcher::{CheckReport, PlaylistWatcher, WatcherHandle, WatcherState};
