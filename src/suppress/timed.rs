use std::path::{Path, PathBuf};
use std::time::Instant;

use dashmap::DashMap;

/// Deadline-based ignores for self-caused writes whose timing is unknown
/// (build output, files written by another process).
#[derive(Debug, Default)]
pub struct TimedIgnores {
    deadlines: DashMap<PathBuf, Instant>,
}

impl TimedIgnores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress changes on `path` until `deadline`. A newer deadline replaces the old one.
    pub fn register(&self, path: PathBuf, deadline: Instant) {
        self.deadlines.insert(path, deadline);
    }

    /// Whether `path` is still covered at `now`. Expired entries are purged here.
    pub fn is_active(&self, path: &Path, now: Instant) -> bool {
        let active = match self.deadlines.get(path) {
            Some(deadline) => now < *deadline,
            None => return false,
        };

        if !active {
            self.deadlines.remove_if(path, |_, deadline| *deadline <= now);
        }
        active
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self, now: Instant) {
        self.deadlines.retain(|_, deadline| now < *deadline);
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn clear(&self) {
        self.deadlines.clear();
    }
}
