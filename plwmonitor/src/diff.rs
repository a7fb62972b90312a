//! Delta computation between the persisted snapshot and a fresh fetch

use std::collections::HashSet;

/// Returns the titles of `current` that do not occur in `previous`,
/// preserving `current`'s order.
///
/// Membership is exact string match (no normalization, no case-folding)
/// against the whole of `previous`; the previous list's own order is
/// irrelevant here. Pure and deterministic, O(|previous| + |current|).
///
/// The bootstrap case (no prior snapshot at all) is handled by the
/// watcher, which skips diffing entirely on the seeding cycle.
pub fn new_tracks(previous: &[String], current: &[String]) -> Vec<String> {
    let known: HashSet<&str> = previous.iter().map(String::as_str).collect();
    current
        .iter()
        .filter(|title| !known.contains(title.as_str()))
        .cloned()
        .collect()
}
