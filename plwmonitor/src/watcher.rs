//! The poll loop: fetch → diff → notify → persist
//!
//! [`PlaylistWatcher`] drives periodic check cycles against a
//! [`TrackSource`], compares the result with the persisted snapshot, sends
//! one notification per newly observed title through a [`Notifier`], and
//! replaces the snapshot when something changed.
//!
//! # Single-flight
//!
//! Timer ticks and on-demand triggers are multiplexed through one
//! `tokio::select!` loop, so at most one check cycle is ever in flight. A
//! trigger arriving while a cycle runs queues behind it (bounded queue, no
//! coalescing). The same loop serializes all snapshot writes.
//!
//! # Bootstrap
//!
//! "No snapshot yet" and "empty snapshot" are the same condition: the
//! watcher stays in [`WatcherState::Bootstrapping`] until a fetch returns
//! at least one title, then persists that list as the initial snapshot
//! without notifying. An existing playlist therefore never floods the
//! recipient on first run, even when the very first scrape comes back
//! empty.

use crate::diff;
use crate::error::CheckError;
use crate::notify::Notifier;
use crate::snapshot::SnapshotStore;
use crate::source::TrackSource;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Capacity of the on-demand trigger queue. Triggers arriving while a
/// cycle is in flight queue behind it; they are never coalesced.
const TRIGGER_QUEUE_CAPACITY: usize = 8;

/// Observable watcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// No non-empty snapshot yet; the next successful fetch seeds it
    Bootstrapping,
    /// Waiting for the next tick or an on-demand trigger
    Idle,
    /// A fetch/diff/notify/persist cycle is in flight
    Checking,
    /// Shut down; no further cycles will run
    Stopped,
}

/// Outcome of one completed check cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Titles first observed in this cycle, in page order
    pub new_tracks: Vec<String>,
    /// Total number of titles in the fetch
    pub total_tracks: usize,
    /// Whether this cycle seeded the initial snapshot (no notifications)
    pub bootstrapped: bool,
    /// Notifications that failed; the remaining sends were still attempted
    pub delivery_failures: usize,
}

impl CheckReport {
    fn quiet(total_tracks: usize) -> Self {
        Self {
            new_tracks: Vec::new(),
            total_tracks,
            bootstrapped: false,
            delivery_failures: 0,
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bootstrapped {
            return write!(
                f,
                "Initial snapshot saved with {} track(s). You will be notified of additions from now on.",
                self.total_tracks
            );
        }
        if self.total_tracks == 0 {
            return write!(f, "No tracks found in the playlist. Is the URL correct?");
        }
        if self.new_tracks.is_empty() {
            return write!(f, "No new tracks since the last check.");
        }
        write!(f, "{} new track(s):", self.new_tracks.len())?;
        for title in &self.new_tracks {
            write!(f, "\n- {}", title)?;
        }
        if self.delivery_failures > 0 {
            write!(
                f,
                "\n({} notification(s) could not be delivered)",
                self.delivery_failures
            )?;
        }
        Ok(())
    }
}

struct CheckRequest {
    reply: oneshot::Sender<Result<CheckReport, CheckError>>,
}

/// Cloneable handle for interacting with a running watcher task
#[derive(Clone)]
pub struct WatcherHandle {
    trigger_tx: mpsc::Sender<CheckRequest>,
    state_rx: watch::Receiver<WatcherState>,
}

impl WatcherHandle {
    /// Run one check cycle now and wait for its report.
    ///
    /// If a cycle is already in flight the request queues behind it and
    /// runs once that cycle completes.
    pub async fn check_now(&self) -> Result<CheckReport, CheckError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.trigger_tx
            .send(CheckRequest { reply: reply_tx })
            .await
            .map_err(|_| CheckError::Stopped)?;
        reply_rx.await.map_err(|_| CheckError::Stopped)?
    }

    /// Current state of the watcher loop
    pub fn state(&self) -> WatcherState {
        *self.state_rx.borrow()
    }
}

/// The poll loop driving fetch → diff → notify → persist cycles.
///
/// The watcher exclusively owns the [`SnapshotStore`] and an in-memory
/// mirror of its contents. Collaborators are injected behind trait
/// objects so the loop can be exercised with in-memory fakes.
pub struct PlaylistWatcher {
    source: Arc<dyn TrackSource>,
    notifier: Arc<dyn Notifier>,
    store: SnapshotStore,
    playlist_url: String,
    poll_interval: Duration,
    /// In-memory mirror of the persisted snapshot
    snapshot: Vec<String>,
    /// Set when a save failed; the write is retried on the next cycle
    dirty: bool,
    trigger_rx: mpsc::Receiver<CheckRequest>,
    state_tx: watch::Sender<WatcherState>,
}

impl PlaylistWatcher {
    /// Create a watcher and its handle.
    ///
    /// Loads the persisted snapshot immediately: a non-empty prior state
    /// means monitoring resumes where it left off, an empty (or corrupt,
    /// or absent) one means the first successful fetch will seed it.
    pub fn new(
        source: Arc<dyn TrackSource>,
        notifier: Arc<dyn Notifier>,
        store: SnapshotStore,
        playlist_url: impl Into<String>,
        poll_interval: Duration,
    ) -> (Self, WatcherHandle) {
        let snapshot = store.load();
        let state = if snapshot.is_empty() {
            WatcherState::Bootstrapping
        } else {
            info!(tracks = snapshot.len(), "resuming from persisted snapshot");
            WatcherState::Idle
        };

        let (trigger_tx, trigger_rx) = mpsc::channel(TRIGGER_QUEUE_CAPACITY);
        let (state_tx, state_rx) = watch::channel(state);

        (
            Self {
                source,
                notifier,
                store,
                playlist_url: playlist_url.into(),
                poll_interval,
                snapshot,
                dirty: false,
                trigger_rx,
                state_tx,
            },
            WatcherHandle {
                trigger_tx,
                state_rx,
            },
        )
    }

    /// Track list the watcher currently considers known
    pub fn snapshot(&self) -> &[String] {
        &self.snapshot
    }

    /// Run the loop until `cancel` fires.
    ///
    /// The interval's first tick completes immediately, so an empty store
    /// is bootstrapped at startup rather than one full interval later.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            playlist = %self.playlist_url,
            "watcher started"
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut triggers_open = true;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once(&cancel).await {
                        // Already logged inside the cycle; the failed
                        // cycle is dropped and the next tick retries.
                        debug!(error = %e, "scheduled check skipped");
                    }
                }
                request = self.trigger_rx.recv(), if triggers_open => {
                    match request {
                        Some(request) => {
                            let outcome = self.run_once(&cancel).await;
                            // The caller may have gone away; that is fine.
                            let _ = request.reply.send(outcome);
                        }
                        // All handles dropped: the timer alone keeps the
                        // loop alive from here on.
                        None => triggers_open = false,
                    }
                }
            }
        }

        self.set_state(WatcherState::Stopped);
        info!("watcher stopped");
    }

    /// Run exactly one check cycle.
    ///
    /// Public so cycles can be single-stepped (tests, one-shot
    /// invocations) without spawning the loop.
    pub async fn run_once(&mut self, cancel: &CancellationToken) -> Result<CheckReport, CheckError> {
        self.set_state(WatcherState::Checking);
        let outcome = self.check_cycle(cancel).await;

        match &outcome {
            Ok(report) if report.bootstrapped => {
                info!(tracks = report.total_tracks, "initial snapshot saved");
            }
            Ok(report) if !report.new_tracks.is_empty() => {
                info!(
                    new = report.new_tracks.len(),
                    total = report.total_tracks,
                    "new tracks detected"
                );
            }
            Ok(report) => {
                debug!(total = report.total_tracks, "no new tracks");
            }
            Err(CheckError::Stopped) => {}
            Err(CheckError::Fetch(e)) => {
                warn!(error = %e, "check failed, keeping previous snapshot");
            }
        }

        let next = if matches!(outcome, Err(CheckError::Stopped)) {
            WatcherState::Stopped
        } else if self.snapshot.is_empty() {
            WatcherState::Bootstrapping
        } else {
            WatcherState::Idle
        };
        self.set_state(next);

        outcome
    }

    async fn check_cycle(&mut self, cancel: &CancellationToken) -> Result<CheckReport, CheckError> {
        // An in-flight fetch may be abandoned on shutdown: nothing has
        // been sent yet, so there is nothing to roll back. Once the fetch
        // returns, the rest of the cycle runs to completion.
        let current = tokio::select! {
            _ = cancel.cancelled() => return Err(CheckError::Stopped),
            fetched = self.source.fetch() => fetched?,
        };

        if self.snapshot.is_empty() {
            if current.is_empty() {
                // Still nothing to seed with; stay in bootstrap.
                return Ok(CheckReport::quiet(0));
            }

            // Bootstrap: persist the first non-empty fetch as the initial
            // snapshot, with zero notifications.
            if let Err(e) = self.store.save(&current) {
                warn!(error = %e, "failed to persist initial snapshot, will retry");
                self.dirty = true;
            }
            let total_tracks = current.len();
            self.snapshot = current;
            return Ok(CheckReport {
                new_tracks: Vec::new(),
                total_tracks,
                bootstrapped: true,
                delivery_failures: 0,
            });
        }

        if current.is_empty() {
            // More likely a transient scraping hiccup than an actually
            // emptied playlist; never overwrite good state with it.
            debug!(
                known = self.snapshot.len(),
                "empty fetch, keeping previous snapshot"
            );
            return Ok(CheckReport::quiet(0));
        }

        let new_tracks = diff::new_tracks(&self.snapshot, &current);
        if new_tracks.is_empty() {
            if self.dirty {
                // A previous save failed; bring the file back in line with
                // the in-memory state.
                match self.store.save(&self.snapshot) {
                    Ok(()) => self.dirty = false,
                    Err(e) => warn!(error = %e, "failed to persist snapshot, will retry"),
                }
            }
            return Ok(CheckReport::quiet(current.len()));
        }

        // One message per new track, in page order. A failed send never
        // aborts the remaining sends and never blocks persistence.
        let mut delivery_failures = 0;
        for title in &new_tracks {
            let text = notification_text(title, &self.playlist_url);
            if let Err(e) = self.notifier.send(&text).await {
                warn!(track = %title, error = %e, "failed to deliver notification");
                delivery_failures += 1;
            }
        }

        match self.store.save(&current) {
            Ok(()) => self.dirty = false,
            Err(e) => {
                // Notifications are already out; re-sending them next
                // cycle would break at-most-once per cycle, so only the
                // write is retried.
                warn!(error = %e, "failed to persist snapshot, will retry");
                self.dirty = true;
            }
        }
        self.snapshot = current;

        Ok(CheckReport {
            new_tracks,
            total_tracks: self.snapshot.len(),
            bootstrapped: false,
            delivery_failures,
        })
    }

    fn set_state(&self, state: WatcherState) {
        self.state_tx.send_replace(state);
    }
}

/// Message body for a single new-track notification
fn notification_text(title: &str, playlist_url: &str) -> String {
    format!("🎵 New track detected in the playlist:\n{title}\n\nPlaylist: {playlist_url}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_text_names_track_and_playlist() {
        let text = notification_text("So What", "https://example.com/sets/test");
        assert!(text.contains("So What"));
        assert!(text.contains("https://example.com/sets/test"));
    }

    #[test]
    fn test_report_display_lists_new_tracks_in_order() {
        let report = CheckReport {
            new_tracks: vec!["C".to_string(), "D".to_string()],
            total_tracks: 4,
            bootstrapped: false,
            delivery_failures: 0,
        };
        assert_eq!(report.to_string(), "2 new track(s):\n- C\n- D");
    }

    #[test]
    fn test_report_display_no_change() {
        let report = CheckReport::quiet(3);
        assert_eq!(report.to_string(), "No new tracks since the last check.");
    }

    #[test]
    fn test_report_display_empty_fetch() {
        let report = CheckReport::quiet(0);
        assert_eq!(
            report.to_string(),
            "No tracks found in the playlist. Is the URL correct?"
        );
    }

    #[test]
    fn test_report_display_bootstrap() {
        let report = CheckReport {
            new_tracks: Vec::new(),
            total_tracks: 12,
            bootstrapped: true,
            delivery_failures: 0,
        };
        assert!(report.to_string().starts_with("Initial snapshot saved with 12 track(s)"));
    }

    #[test]
    fn test_report_display_mentions_delivery_failures() {
        let report = CheckReport {
            new_tracks: vec!["C".to_string()],
            total_tracks: 3,
            bootstrapped: false,
            delivery_failures: 1,
        };
        assert!(report.to_string().contains("1 notification(s) could not be delivered"));
    }
}
