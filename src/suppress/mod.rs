//! Ignore-list suppressor.
//!
//! Keeps the session from reacting to file changes it caused itself.
//! Two ledgers work side by side:
//!
//! | Ledger    | Registered by                         | Applies to        |
//! |-----------|---------------------------------------|-------------------|
//! | `counted` | synchronous editor writes (N writes)  | all but deletes   |
//! | `timed`   | out-of-process writes (until a time)  | every change kind |
//!
//! A counted entry never suppresses a delete, so a delete + recreate pair
//! cannot swallow the recreate. Both ledgers are safe to register from any
//! thread while the watcher consumes them.

mod counted;
mod timed;

pub use counted::CountedIgnores;
pub use timed::TimedIgnores;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::actor::fs::ChangeKind;
use crate::utils::path::normalize_path;

/// Upper bound for a timed ignore window.
pub const LONGEST_IGNORE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Default)]
pub struct Suppressor {
    counted: CountedIgnores,
    timed: TimedIgnores,
}

impl Suppressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tolerate the next `times` changes on `path`.
    pub fn register_ignore(&self, path: impl AsRef<Path>, times: u32) {
        let path = Self::key(path.as_ref());
        crate::debug!("ignore"; "ignoring next {} change(s) on {}", times, path.display());
        self.counted.register(path, times);
    }

    /// Tolerate every change on `path` until `deadline`.
    pub fn register_ignore_until(&self, path: impl AsRef<Path>, deadline: Instant) {
        let path = Self::key(path.as_ref());
        crate::debug!("ignore"; "ignoring changes on {} for a while", path.display());
        self.timed.register(path, deadline);
    }

    /// Tolerate every change on `path` for `duration`, capped at [`LONGEST_IGNORE`].
    pub fn register_ignore_for(&self, path: impl AsRef<Path>, duration: Duration) {
        let now = Instant::now();
        let deadline = now.checked_add(duration.min(LONGEST_IGNORE)).unwrap_or(now);
        self.register_ignore_until(path, deadline);
    }

    /// Decide whether an observed change should be dropped.
    ///
    /// A counted entry is used up by this call when it matches.
    pub fn should_suppress(&self, path: &Path, kind: ChangeKind) -> bool {
        if self.timed.is_active(path, Instant::now()) {
            crate::debug!("ignore"; "Ignoring {} on {} (timed)", kind.label(), path.display());
            return true;
        }

        if kind != ChangeKind::Deleted && self.counted.consume(path) {
            crate::debug!("ignore"; "Ignoring {} on {}", kind.label(), path.display());
            return true;
        }

        false
    }

    /// Forget everything (project closed).
    pub fn clear(&self) {
        self.counted.clear();
        self.timed.clear();
    }

    pub fn counted(&self) -> &CountedIgnores {
        &self.counted
    }

    pub fn timed(&self) -> &TimedIgnores {
        &self.timed
    }

    fn key(path: &Path) -> PathBuf {
        normalize_path(path)
    }
}
