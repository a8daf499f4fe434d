//! FileSystem Actor
//!
//! Watches the project tree and sends debounced change batches to the
//! SyncActor. The watcher starts in `new`, so nothing written between
//! construction and `run` is lost.
//!
//! Architecture:
//! ```text
//! Watcher → ChangeFilter (exclude + suppress) → Debouncer (timing, dedup) → SyncMsg::Files
//! ```

use std::path::PathBuf;
use std::time::Duration;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::SyncMsg;

// Admission filter and file classification.
mod classifier;
// Pure timing and deduplication.
mod debouncer;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;

#[cfg(test)]
mod tests;

pub use classifier::{ChangeFilter, FileClass};
pub use types::{ChangeKind, Entry, FileChange};

use debouncer::Debouncer;
use types::changes_from_event;
use watch_roots::WatchRoots;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    filter: ChangeFilter,
    debouncer: Debouncer,
    sync_tx: mpsc::Sender<SyncMsg>,
}

impl FsActor {
    /// Create the actor and start watching immediately.
    pub fn new(
        paths: Vec<PathBuf>,
        filter: ChangeFilter,
        debounce: Duration,
        sync_tx: mpsc::Sender<SyncMsg>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        // Missing roots are re-attached later
        let mut watch_roots = WatchRoots::new(paths);
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            filter,
            debouncer: Debouncer::new(debounce),
            sync_tx,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let sync_tx = self.sync_tx;
        let filter = self.filter;
        let mut debouncer = self.debouncer;
        let mut watcher = self.watcher;
        let mut watch_roots = self.watch_roots;

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        // notify is callback based; bridge it into the async world on its own thread
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        crate::debug!("watch"; "{} root(s) attached", watch_roots.attached_count());

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => {
                    let Some(event) = event else { break };
                    admit_event(&mut debouncer, &filter, &event);
                }
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    let Some(batch) = debouncer.try_flush() else { continue };
                    if sync_tx.send(SyncMsg::Files(batch)).await.is_err() {
                        break;
                    }
                }
            }
        }

        crate::debug!("watch"; "stopped");
    }
}

/// Filter one raw event and admit what survives.
fn admit_event(debouncer: &mut Debouncer, filter: &ChangeFilter, event: &notify::Event) {
    crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

    for (path, kind, entry) in changes_from_event(event) {
        let path = crate::utils::path::normalize_path(&path);
        if filter.admits(&path, kind, entry) {
            debouncer.admit(path, kind);
        }
    }
}
