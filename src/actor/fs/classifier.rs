//! Change admission and file classification.
//!
//! Admission runs before a change enters the debouncer:
//! ```text
//! raw change → directory? → excluded pattern? → project-file rule? → suppressed? → admit
//! ```
//! Classification runs on flushed batches and tells the sync policy what
//! kind of file it is looking at.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use super::types::{ChangeKind, Entry};
use crate::config::SessionConfig;
use crate::suppress::Suppressor;

// ============================================================================
// Admission
// ============================================================================

/// Decides which raw changes may enter the pending set.
pub struct ChangeFilter {
    root: PathBuf,
    excludes: Vec<Regex>,
    project_extensions: Vec<String>,
    suppressor: Arc<Suppressor>,
}

impl ChangeFilter {
    pub fn new(config: &SessionConfig, suppressor: Arc<Suppressor>) -> Self {
        Self {
            root: config.watch.root.clone(),
            excludes: config.watch.exclude_patterns(),
            project_extensions: config.watch.project_extensions.clone(),
            suppressor,
        }
    }

    /// `entry` comes from the raw event; only `Entry::Unknown` costs a stat.
    pub fn admits(&self, path: &Path, kind: ChangeKind, entry: Entry) -> bool {
        let folder = match entry {
            Entry::Folder => true,
            Entry::File => false,
            // A deleted path cannot be checked; treat it as a file
            Entry::Unknown => kind != ChangeKind::Deleted && path.is_dir(),
        };
        if folder {
            return false;
        }

        if self.is_excluded(path) {
            return false;
        }

        // The editor owns project-file structure; only content edits matter
        if kind != ChangeKind::Modified && has_extension(path, &self.project_extensions) {
            crate::debug!("watch"; "skip {} of project file {}", kind.label(), path.display());
            return false;
        }

        !self.suppressor.should_suppress(path, kind)
    }

    /// Generated-file patterns, matched against the `/`-joined path relative to the root.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let mut joined = String::new();
        for component in relative.components() {
            joined.push('/');
            joined.push_str(&component.as_os_str().to_string_lossy());
        }
        self.excludes.iter().any(|re| re.is_match(&joined))
    }
}

// ============================================================================
// Classification
// ============================================================================

/// What a changed file is, from the session's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Never acted on (tool output, configured ignores, no extension).
    Ignored,
    /// This session's `relive.toml`.
    Config,
    /// Source code; a change needs a rebuild.
    Code,
    /// Editor project file (screens, entities, project).
    Project,
    /// A file under a content directory.
    Content {
        global: bool,
        /// The game can reload it on its own.
        reloadable: bool,
        /// Its reload also needs a screen restart.
        localization: bool,
    },
    Other,
}

impl FileClass {
    pub fn of(path: &Path, config: &SessionConfig) -> Self {
        if config.is_config_file(path) {
            return Self::Config;
        }

        let watch = &config.watch;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Ignored;
        };
        let generated_code = name.contains(".Generated.") && has_extension(path, &watch.code_extensions);
        if generated_code
            || name.ends_with(".Generated.xml")
            || watch.ignored_files.iter().any(|ignored| ignored.eq_ignore_ascii_case(&name))
        {
            return Self::Ignored;
        }

        if has_extension(path, &watch.code_extensions) {
            return Self::Code;
        }
        if has_extension(path, &watch.project_extensions) {
            return Self::Project;
        }

        let relative = config.root_relative(path);
        let global = relative.starts_with(&watch.global_content_dir);
        let content = global || watch.content_dirs.iter().any(|dir| relative.starts_with(dir));
        if content {
            return Self::Content {
                global,
                reloadable: watch.reload_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
                localization: watch
                    .localization_files
                    .iter()
                    .any(|loc| loc.eq_ignore_ascii_case(&name)),
            };
        }

        Self::Other
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}
