use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

/// One watched path: the project directory, or a config file outside it.
struct Root {
    path: PathBuf,
    attached: bool,
}

/// Keeps the watcher attached to every root.
///
/// Roots missing at startup, or deleted and recreated later (a project
/// folder restored from version control), are attached on the next tick.
pub(super) struct WatchRoots {
    roots: Vec<Root>,
}

impl WatchRoots {
    pub(super) fn new(paths: Vec<PathBuf>) -> Self {
        let roots = paths
            .into_iter()
            .map(|path| Root {
                path,
                attached: false,
            })
            .collect();
        Self { roots }
    }

    /// Attach every root that exists now. Errors only for a root that
    /// exists but cannot be watched.
    pub(super) fn attach_existing(
        &mut self,
        watcher: &mut RecommendedWatcher,
    ) -> notify::Result<()> {
        for root in &mut self.roots {
            if !root.path.exists() {
                crate::log!("watch"; "{} does not exist yet, waiting for it", root.path.display());
                continue;
            }
            watcher.watch(&root.path, mode_for(&root.path))?;
            root.attached = true;
        }
        Ok(())
    }

    /// Drop roots that vanished and re-attach the ones that came back.
    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        for root in &mut self.roots {
            let exists = root.path.exists();
            if root.attached && !exists {
                let _ = watcher.unwatch(&root.path);
                root.attached = false;
                crate::log!("watch"; "{} was removed", root.path.display());
            } else if !root.attached
                && exists
                && watcher.watch(&root.path, mode_for(&root.path)).is_ok()
            {
                root.attached = true;
                crate::log!("watch"; "watching {} again", root.path.display());
            }
        }
    }

    pub(super) fn attached_count(&self) -> usize {
        self.roots.iter().filter(|root| root.attached).count()
    }
}

/// Directories are watched recursively, single files on their own.
fn mode_for(path: &Path) -> RecursiveMode {
    if path.is_dir() {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    }
}
