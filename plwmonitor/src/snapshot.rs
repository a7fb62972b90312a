//! Persisted playlist snapshot
//!
//! The snapshot is the ordered track list from the last cycle that changed
//! it. It lives in a small JSON file (`{"tracks": [...]}`) and is replaced
//! wholesale, never merged. Writes go to a sibling temp file first and are
//! renamed into place, so a crash mid-write can never leave a state that
//! `load` reads back as valid-but-wrong.

use crate::error::PersistenceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// On-disk layout of the snapshot file.
///
/// The `tracks` field name is stable so the file stays readable across
/// restarts and versions.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    tracks: Vec<String>,
}

/// File-backed store for the last-known track list.
///
/// The store is exclusively owned by the watcher: there is never more than
/// one writer per state file, and the system assumes a single running
/// instance per persisted-state location.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store backed by the given file path.
    ///
    /// The file (and its parent directory) is created lazily on the first
    /// `save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last persisted track list.
    ///
    /// A missing, unreadable, or corrupt file degrades to an empty list:
    /// the watcher then re-bootstraps instead of failing startup.
    pub fn load(&self) -> Vec<String> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted snapshot");
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read snapshot, treating as no prior state"
                );
                return Vec::new();
            }
        };

        match serde_json::from_slice::<SnapshotFile>(&bytes) {
            Ok(state) => state.tracks,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "corrupt snapshot, treating as no prior state"
                );
                Vec::new()
            }
        }
    }

    /// Atomically replace the persisted track list.
    ///
    /// The new state is written to a temp file in the same directory and
    /// renamed over the destination, so `load` only ever observes the
    /// previous state or the complete new one.
    pub fn save(&self, tracks: &[String]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let state = SnapshotFile {
            tracks: tracks.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&state)?;

        let tmp = self.temp_path();
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), tracks = tracks.len(), "snapshot saved");
        Ok(())
    }

    // Sibling path so the rename stays on one filesystem.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
