use std::path::PathBuf;

use crate::config::SessionConfig;

/// The watched root, plus the config file when it lives outside of it.
pub(super) fn collect_watch_paths(config: &SessionConfig) -> Vec<PathBuf> {
    let root = &config.watch.root;
    let mut paths = vec![root.clone()];

    if config.config_path.exists() && !config.config_path.starts_with(root) {
        paths.push(config.config_path.clone());
    }

    paths
}
