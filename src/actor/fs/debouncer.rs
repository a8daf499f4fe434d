use std::path::PathBuf;
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

use super::types::{ChangeKind, FileChange};

/// Upper bound on how long the actor sleeps between ticks.
pub(super) const TICK: Duration = Duration::from_secs(1);

/// Ordered, path-deduplicated set of changes with its own quiescence clock.
#[derive(Default)]
pub(super) struct PendingSet {
    pub(super) changes: Vec<FileChange>,
    seen: FxHashSet<PathBuf>,
    pub(super) last_add: Option<Instant>,
}

impl PendingSet {
    /// Add a change; a path already present keeps its first entry.
    /// Either way the quiescence clock restarts.
    fn admit(&mut self, change: FileChange, now: Instant) -> bool {
        self.last_add = Some(now);
        if !self.seen.insert(change.path.clone()) {
            return false;
        }
        self.changes.push(change);
        true
    }

    fn can_flush(&self, now: Instant, window: Duration) -> bool {
        self.last_add
            .is_none_or(|last| now.saturating_duration_since(last) >= window)
    }

    fn remaining(&self, now: Instant, window: Duration) -> Duration {
        self.last_add
            .map(|last| window.saturating_sub(now.saturating_duration_since(last)))
            .unwrap_or(Duration::ZERO)
    }

    fn take(&mut self) -> Vec<FileChange> {
        self.seen.clear();
        self.last_add = None;
        std::mem::take(&mut self.changes)
    }

    fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Pure debouncer: only handles timing and deduplication.
///
/// Deletes and everything else are kept in separate sets, each with its
/// own clock. A batch is released only when both sets have been quiet for
/// the whole window.
pub(super) struct Debouncer {
    pub(super) changed: PendingSet,
    pub(super) deleted: PendingSet,
    window: Duration,
}

impl Debouncer {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            changed: PendingSet::default(),
            deleted: PendingSet::default(),
            window,
        }
    }

    /// Admit one change. Returns false if the path was already pending.
    pub(super) fn admit(&mut self, path: PathBuf, kind: ChangeKind) -> bool {
        self.admit_at(FileChange::new(path, kind), Instant::now())
    }

    pub(super) fn admit_at(&mut self, change: FileChange, now: Instant) -> bool {
        let set = match change.kind {
            ChangeKind::Deleted => &mut self.deleted,
            _ => &mut self.changed,
        };
        let (kind, path) = (change.kind, change.path.clone());
        let added = set.admit(change, now);
        if added {
            crate::debug!("watch"; "Storing change {} on {} for flushing", kind.label(), path.display());
        }
        added
    }

    pub(super) fn can_flush(&self, now: Instant) -> bool {
        self.changed.can_flush(now, self.window) && self.deleted.can_flush(now, self.window)
    }

    /// Take the pending batch if both sets are quiescent: deletes first,
    /// then everything else, each in arrival order.
    pub(super) fn try_flush(&mut self) -> Option<Vec<FileChange>> {
        self.try_flush_at(Instant::now())
    }

    pub(super) fn try_flush_at(&mut self, now: Instant) -> Option<Vec<FileChange>> {
        if self.is_empty() || !self.can_flush(now) {
            return None;
        }

        let mut batch = self.deleted.take();
        batch.extend(self.changed.take());
        Some(batch)
    }

    pub(super) fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty()
    }

    /// Precise sleep duration until next possible flush, capped at one tick.
    pub(super) fn sleep_duration(&self) -> Duration {
        if self.is_empty() {
            return TICK;
        }

        let now = Instant::now();
        self.changed
            .remaining(now, self.window)
            .max(self.deleted.remaining(now, self.window))
            .clamp(Duration::from_millis(1), TICK)
    }
}
