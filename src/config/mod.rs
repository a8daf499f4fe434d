//! Session configuration management for `relive.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── live       # [live]
//! │   ├── restart    # [restart]
//! │   └── watch      # [watch]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── handle     # Hot-reloadable config handle
//! └── mod.rs         # SessionConfig (this file)
//! ```
//!
//! A missing `relive.toml` is not an error: the session runs on defaults
//! rooted at the current directory.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{LiveConfig, RestartConfig, WatchConfig};
pub use types::{ConfigDiagnostics, ConfigError, ConfigHandle};

use crate::{debug, log, utils::path::normalize_path, utils::path::resolve_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// command line overrides
// ============================================================================

/// Values from the command line that win over `relive.toml`.
///
/// Kept on the config so a hot reload re-applies them.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Watched directory (relative to cwd).
    pub root: Option<PathBuf>,
    pub port: Option<u16>,
    pub edit_mode: Option<bool>,
}

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing relive.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(skip)]
    pub overrides: ConfigOverrides,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub live: LiveConfig,

    #[serde(default)]
    pub restart: RestartConfig,
}

impl SessionConfig {
    /// Load configuration, searching upward from cwd for `config_name`.
    pub fn load(config_name: &Path, overrides: ConfigOverrides) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(config_name) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", config_name.display());
                Self {
                    config_path: cwd.join(config_name),
                    ..Self::default()
                }
            }
        };

        config.overrides = overrides;
        config.finalize();
        config.validate()?;
        Ok(config)
    }

    /// Re-read the same file with the same overrides.
    pub fn reload_from_disk(&self) -> Result<Self> {
        let mut config = Self::from_path(&self.config_path)?;
        config.config_path = self.config_path.clone();
        config.overrides = self.overrides.clone();
        config.finalize();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    ///
    /// Unknown fields only warn: stdin carries editor events, so there is
    /// nobody to ask.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("config"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Resolve paths against the project root and apply overrides.
    fn finalize(&mut self) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.root = normalize_path(&root);
        self.config_path = normalize_path(&self.config_path);

        self.watch.root = match &self.overrides.root {
            Some(root) => normalize_path(root),
            None => normalize_path(&resolve_path(&self.watch.root, &self.root)),
        };

        Self::update_option(&mut self.live.port, self.overrides.port.as_ref());
        Self::update_option(&mut self.live.edit_mode, self.overrides.edit_mode.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Get path relative to the watched root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.watch.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Whether `path` is this session's config file.
    pub fn is_config_file(&self, path: &Path) -> bool {
        path == self.config_path
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.watch.validate(&mut diag);
        self.live.validate(&mut diag);
        self.restart.validate(&self.root, &mut diag);

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config text. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SessionConfig {
    let (parsed, ignored) = SessionConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Finalized config rooted at `root`, as a session would see it.
#[cfg(test)]
pub fn test_session_config(root: &Path, content: &str) -> SessionConfig {
    let mut config = test_parse_config(content);
    config.config_path = root.join("relive.toml");
    config.finalize();
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SessionConfig::from_str("[watch\nroot = \".\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[live]\nport = 9000\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SessionConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.live.port, 9000);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_load_resolves_watch_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Game")).unwrap();
        let path = dir.path().join("relive.toml");
        fs::write(&path, "[watch]\nroot = \"Game\"\n").unwrap();

        let config = SessionConfig::load(&path, ConfigOverrides::default()).unwrap();
        assert_eq!(config.watch.root, normalize_path(&dir.path().join("Game")));
        assert!(config.is_config_file(&normalize_path(&path)));
    }

    #[test]
    fn test_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relive.toml");
        fs::write(&path, "[live]\nport = 9000\nedit_mode = true\n").unwrap();

        let overrides = ConfigOverrides {
            root: Some(dir.path().to_path_buf()),
            port: Some(7000),
            edit_mode: Some(false),
        };
        let config = SessionConfig::load(&path, overrides).unwrap();
        assert_eq!(config.live.port, 7000);
        assert!(!config.live.edit_mode);
        assert_eq!(config.watch.root, normalize_path(dir.path()));
    }

    #[test]
    fn test_validation_reports_every_problem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relive.toml");
        fs::write(
            &path,
            "[watch]\ndebounce_ms = 10\n[live]\nport = 0\n[restart]\ncompile = []\n",
        )
        .unwrap();

        let err = SessionConfig::load(&path, ConfigOverrides::default()).unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics, got {err}");
        };
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn test_root_relative() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_session_config(dir.path(), "");
        let file = config.watch.root.join("Content/Items.csv");
        assert_eq!(config.root_relative(&file), PathBuf::from("Content/Items.csv"));
    }
}
