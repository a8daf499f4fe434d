//! `[restart]` section configuration.
//!
//! How the game is rebuilt and relaunched. Command arrays may reference
//! `$RELIVE_ROOT`, `$RELIVE_CONFIGURATION` and `$RELIVE_SCREEN`.
//!
//! # Example
//!
//! ```toml
//! [restart]
//! enabled = true
//! auto_restart = false
//! configuration = "Debug"
//! compile = ["dotnet", "build", "-c", "$RELIVE_CONFIGURATION"]
//! launch = ["dotnet", "run", "--no-build", "--", "--screen", "$RELIVE_SCREEN"]
//! startup_screen = "MainMenu"
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rebuild and relaunch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    /// Whether this session may relaunch the game at all.
    pub enabled: bool,

    /// Rebuild and restart on every qualifying change.
    pub auto_restart: bool,

    /// Act on content changes even outside edit mode.
    pub restart_screen_on_content_change: bool,

    /// Build configuration name, passed as `$RELIVE_CONFIGURATION`.
    pub configuration: String,

    pub compile: Vec<String>,

    pub launch: Vec<String>,

    /// Screen used when the current one cannot be fetched before a restart.
    pub startup_screen: Option<String>,

    /// Ask the game not to steal focus when it starts.
    pub prevent_focus: bool,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_restart: false,
            restart_screen_on_content_change: false,
            configuration: "Debug".into(),
            compile: ["dotnet", "build", "-c", "$RELIVE_CONFIGURATION"]
                .map(String::from)
                .to_vec(),
            launch: [
                "dotnet",
                "run",
                "--no-build",
                "-c",
                "$RELIVE_CONFIGURATION",
                "--",
                "--screen",
                "$RELIVE_SCREEN",
            ]
            .map(String::from)
            .to_vec(),
            startup_screen: None,
            prevent_focus: false,
        }
    }
}

impl RestartConfig {
    pub fn validate(&self, root: &Path, diag: &mut ConfigDiagnostics) {
        if !self.enabled {
            return;
        }

        Self::validate_command("restart.compile", &self.compile, root, diag);
        Self::validate_command("restart.launch", &self.launch, root, diag);
    }

    fn validate_command(
        field: &'static str,
        command: &[String],
        root: &Path,
        diag: &mut ConfigDiagnostics,
    ) {
        let Some(program) = command.first().filter(|p| !p.trim().is_empty()) else {
            diag.error_with_hint(
                field,
                "command is empty while restarts are enabled",
                "set `restart.enabled = false` to only patch a running game",
            );
            return;
        };

        // Programs may also live inside the project (e.g. ./build.sh)
        if which::which(program).is_err() && !root.join(program).exists() {
            diag.warn(field, format!("`{program}` not found in PATH"));
        }
    }
}
