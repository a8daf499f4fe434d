//! Session config with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads and atomic config replacement.
//! Each session owns one handle; `relive.toml` is hot-reloaded through it
//! when the file shows up in a change batch.

use crate::config::SessionConfig;
use anyhow::Result;
use arc_swap::ArcSwap;
use std::{
    fs,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

pub struct ConfigHandle {
    current: ArcSwap<SessionConfig>,
    /// Hash of the config file content the current config was built from.
    hash: AtomicU64,
}

impl ConfigHandle {
    pub fn new(config: SessionConfig) -> Self {
        let hash = fs::read_to_string(&config.config_path)
            .map(|content| crate::utils::hash::compute(content.as_bytes()))
            .unwrap_or(0);
        Self {
            current: ArcSwap::from_pointee(config),
            hash: AtomicU64::new(hash),
        }
    }

    #[inline]
    pub fn get(&self) -> Arc<SessionConfig> {
        self.current.load_full()
    }

    /// Reload config from disk if content changed.
    ///
    /// Returns `Ok(true)` if config was updated, `Ok(false)` if unchanged.
    /// On error the previous config stays active.
    pub fn reload(&self) -> Result<bool> {
        let current = self.get();

        let content = fs::read_to_string(&current.config_path)?;
        let new_hash = crate::utils::hash::compute(content.as_bytes());
        if new_hash == self.hash.load(Ordering::Relaxed) {
            return Ok(false);
        }

        let new_config = current.reload_from_disk()?;
        self.current.store(Arc::new(new_config));
        self.hash.store(new_hash, Ordering::Relaxed);

        Ok(true)
    }
}
