//! `[watch]` section configuration.
//!
//! Controls which directory is watched, how long a burst of writes must
//! stay quiet before it is acted on, and how changed files are classified.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! root = "."                      # Directory watched, relative to relive.toml
//! debounce_ms = 500               # Quiescence window (minimum 500)
//! content_dirs = ["Content"]
//! global_content_dir = "Content/GlobalContent"
//! code_extensions = ["cs"]
//! reload_extensions = ["csv"]     # Reloaded one file at a time by the game
//! localization_files = ["Localization.csv"]
//! ```

use crate::config::ConfigDiagnostics;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Smallest accepted quiescence window. Tighter windows react mid-write.
pub const MIN_DEBOUNCE_MS: u64 = 500;

/// File watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory watched recursively. Absolute after loading.
    pub root: PathBuf,

    /// Quiescence window in milliseconds.
    pub debounce_ms: u64,

    /// Regex patterns matched against `/`-joined paths relative to the root.
    /// Matching paths never enter a change batch.
    pub exclude: Vec<String>,

    /// Project file extensions. Only modifications of these are admitted.
    pub project_extensions: Vec<String>,

    /// Content directories, relative to the root.
    pub content_dirs: Vec<PathBuf>,

    /// Global content directory, relative to the root.
    pub global_content_dir: PathBuf,

    /// Extensions that require a rebuild when changed.
    pub code_extensions: Vec<String>,

    /// Extensions the live process can reload file by file.
    pub reload_extensions: Vec<String>,

    /// File names whose reload also restarts the current screen.
    pub localization_files: Vec<String>,

    /// File names never acted on.
    pub ignored_files: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            debounce_ms: 500,
            exclude: default_excludes(),
            project_extensions: ["glux", "gluj", "glsj", "glej"]
                .map(String::from)
                .to_vec(),
            content_dirs: vec![PathBuf::from("Content")],
            global_content_dir: PathBuf::from("Content/GlobalContent"),
            code_extensions: vec!["cs".into()],
            reload_extensions: vec!["csv".into()],
            localization_files: Vec::new(),
            ignored_files: vec!["CompilerSettings.json".into()],
        }
    }
}

fn default_excludes() -> Vec<String> {
    [
        r"(?i)\.generated\.cs$",
        r"(?i)\.generated\.xml$",
        r"/\.vs/",
        r"/\.git/",
        r"(?i)/bin/",
        r"(?i)/obj/",
        r"~$",
        r"(?i)\.(swp|swx|tmp|bak)$",
        r"/\.#[^/]*$",
    ]
    .map(String::from)
    .to_vec()
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Compile the exclusion patterns, skipping invalid ones.
    pub fn exclude_patterns(&self) -> Vec<Regex> {
        self.exclude
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.debounce_ms < MIN_DEBOUNCE_MS {
            diag.error_with_hint(
                "watch.debounce_ms",
                format!("{}ms is below the {MIN_DEBOUNCE_MS}ms minimum", self.debounce_ms),
                format!("editors write files in several steps; use {MIN_DEBOUNCE_MS} or more"),
            );
        }

        for pattern in &self.exclude {
            if let Err(err) = Regex::new(pattern) {
                diag.error("watch.exclude", format!("invalid pattern `{pattern}`: {err}"));
            }
        }

        if self.global_content_dir.is_absolute() {
            diag.error(
                "watch.global_content_dir",
                "must be relative to the watch root",
            );
        }
    }
}
