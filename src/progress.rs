//! Per-track completion state: strict linear gating plus guarded persistence.
//!
//! The status layout mirrors what the browser client stores per track: a JSON
//! object keyed by exercise index, `{"0": true, "1": false, ...}`. The whole
//! store lives in one JSON file (PROGRESS_PATH); without it, state is
//! memory-only and lost on restart.
//!
//! Invariant: an exercise can only be marked passed while it is accessible,
//! so `status[i] == true` implies `status[j] == true` for every `j < i`.
//! `mark_passed` enforces this for every caller, not just navigation UI.
//!
//! Concurrent writers race like concurrent browser tabs did: last write wins.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

/// Completion flags for one track, keyed by exercise index.
pub type StatusMap = BTreeMap<usize, bool>;

/// Exercise `index` is accessible iff it is first or its predecessor passed.
pub fn can_access(status: &StatusMap, index: usize) -> bool {
    index == 0 || status.get(&(index - 1)).copied().unwrap_or(false)
}

/// Refusal from `mark_passed`: recording the pass would break linear gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Locked;

pub struct ProgressStore {
    path: Option<PathBuf>,
    by_track: RwLock<HashMap<String, StatusMap>>,
}

impl ProgressStore {
    /// Build the store from PROGRESS_PATH. A missing or unreadable file is
    /// not fatal: we start empty and log why.
    #[instrument(level = "info")]
    pub fn from_env() -> Self {
        Self::with_path(std::env::var("PROGRESS_PATH").ok().map(PathBuf::from))
    }

    /// Build the store over an explicit file path (or none for memory-only).
    pub fn with_path(path: Option<PathBuf>) -> Self {
        let initial = match &path {
            Some(p) => match std::fs::read_to_string(p) {
                Ok(raw) => match serde_json::from_str::<HashMap<String, StatusMap>>(&raw) {
                    Ok(data) => {
                        info!(target: "webcraft_backend", path = %p.display(), tracks = data.len(), "Loaded progress file");
                        data
                    }
                    Err(e) => {
                        error!(target: "webcraft_backend", path = %p.display(), error = %e, "Progress file is not valid JSON; starting empty");
                        HashMap::new()
                    }
                },
                Err(e) => {
                    warn!(target: "webcraft_backend", path = %p.display(), error = %e, "No readable progress file; starting empty");
                    HashMap::new()
                }
            },
            None => {
                info!(target: "webcraft_backend", "PROGRESS_PATH not set; progress is memory-only");
                HashMap::new()
            }
        };
        Self { path, by_track: RwLock::new(initial) }
    }

    /// Memory-only store, used by tests and by deployments without a data dir.
    pub fn in_memory() -> Self {
        Self::with_path(None)
    }

    /// Current status map for a track (empty map if never touched).
    #[instrument(level = "debug", skip(self))]
    pub async fn status(&self, track_id: &str) -> StatusMap {
        self.by_track.read().await.get(track_id).cloned().unwrap_or_default()
    }

    /// Record a pass for `index`. Refuses when gating does not grant access,
    /// which keeps the completion map monotonic at the data layer. Returns
    /// the updated status map. Marking an already-passed exercise again is a
    /// no-op that still reports success.
    #[instrument(level = "info", skip(self), fields(%track_id, index))]
    pub async fn mark_passed(&self, track_id: &str, index: usize) -> Result<StatusMap, Locked> {
        let snapshot = {
            let mut by_track = self.by_track.write().await;
            let status = by_track.entry(track_id.to_string()).or_default();
            if !can_access(status, index) {
                return Err(Locked);
            }
            status.insert(index, true);
            by_track.clone()
        };
        self.persist(&snapshot).await;
        Ok(self.status(track_id).await)
    }

    /// Write the whole store. Failures are logged, never propagated: losing a
    /// progress write must not fail the request that graded the exercise.
    async fn persist(&self, snapshot: &HashMap<String, StatusMap>) {
        let Some(path) = &self.path else { return };
        let payload = match serde_json::to_string_pretty(snapshot) {
            Ok(p) => p,
            Err(e) => {
                error!(target: "webcraft_backend", error = %e, "Could not serialize progress; skipping write");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(path, payload).await {
            error!(target: "webcraft_backend", path = %path.display(), error = %e, "Progress write failed; state kept in memory only");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gating_follows_the_documented_example() {
        let mut status = StatusMap::new();
        status.insert(0, true);
        status.insert(1, false);
        assert!(can_access(&status, 0));
        assert!(can_access(&status, 1));
        assert!(!can_access(&status, 2));
    }

    #[test]
    fn first_exercise_is_always_accessible() {
        assert!(can_access(&StatusMap::new(), 0));
    }

    #[tokio::test]
    async fn mark_passed_refuses_locked_exercises() {
        let store = ProgressStore::in_memory();
        assert_eq!(store.mark_passed("css-beginner", 2).await, Err(Locked));
        assert!(store.status("css-beginner").await.is_empty());
    }

    #[tokio::test]
    async fn status_stays_monotonic_through_the_store() {
        let store = ProgressStore::in_memory();
        store.mark_passed("css-beginner", 0).await.expect("first is open");
        store.mark_passed("css-beginner", 1).await.expect("second unlocked");
        // re-marking a passed exercise stays a success and changes nothing
        store.mark_passed("css-beginner", 0).await.expect("idempotent");

        let status = store.status("css-beginner").await;
        for (&i, &done) in &status {
            if done {
                for j in 0..i {
                    assert_eq!(status.get(&j), Some(&true), "gap below passed index {i} at {j}");
                }
            }
        }
    }

    #[tokio::test]
    async fn store_round_trips_through_its_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("progress.json");

        let store = ProgressStore::with_path(Some(path.clone()));
        store.mark_passed("html-beginner", 0).await.expect("mark");
        store.mark_passed("html-beginner", 1).await.expect("mark");

        let raw = std::fs::read_to_string(&path).expect("file written");
        // On-disk layout keeps the original string-keyed object shape.
        assert!(raw.contains("\"html-beginner\""));
        assert!(raw.contains("\"0\""));

        let reloaded = ProgressStore::with_path(Some(path));
        let status = reloaded.status("html-beginner").await;
        assert_eq!(status.get(&0), Some(&true));
        assert_eq!(status.get(&1), Some(&true));
    }
}
