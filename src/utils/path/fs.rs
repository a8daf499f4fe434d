//! Path normalization utilities.
//!
//! Watch events, ignore registrations and config paths all go through
//! `normalize_path` so the same file always produces the same key:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - resolve relative paths against a base directory

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// A path that no longer exists (a delete event) canonicalizes its parent
/// and re-joins the file name, so it keys the same as before the delete.
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && let Ok(parent) = parent.canonicalize()
    {
        return parent.join(name);
    }

    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    }
}

/// Resolve a path relative to `base` unless it is already absolute.
///
/// `~` is expanded first, so config values like `~/games/demo` work.
#[inline]
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = Path::new(&expanded);

    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// File name without directory and extension (`Content/Levels/Level1.csv` -> `Level1`).
#[inline]
pub fn stripped_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
