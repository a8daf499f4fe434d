//! Compile and launch capability.
//!
//! The orchestrator only sees the `Launcher` trait; `CommandLauncher` runs
//! the `[restart]` commands from `relive.toml`. Both calls block, so the
//! orchestrator runs them on the blocking pool.

use std::process::Child;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::config::{ConfigHandle, SessionConfig};
use crate::utils::exec::{Cmd, resolve_args, tail_output};

/// Lines of compiler output kept for the error status.
const OUTPUT_TAIL: usize = 15;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutcome {
    pub succeeded: bool,
    pub was_cancelled: bool,
    /// Tail of the compiler output on failure.
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub succeeded: bool,
    pub message: String,
}

pub trait Launcher: Send + Sync {
    fn compile(&self, configuration: &str) -> CompileOutcome;
    fn launch(&self, prevent_focus: bool, start_screen: Option<&str>) -> LaunchOutcome;
    /// Stop the process this launcher started, if any.
    fn kill(&self);
}

#[derive(Debug, Error)]
pub enum RestartError {
    #[error("[restart] {0} command is empty")]
    EmptyCommand(&'static str),

    #[error(transparent)]
    Exec(#[from] anyhow::Error),
}

/// Runs the configured compile and launch commands.
pub struct CommandLauncher {
    config: Arc<ConfigHandle>,
    child: Mutex<Option<Child>>,
}

impl CommandLauncher {
    pub fn new(config: Arc<ConfigHandle>) -> Self {
        Self {
            config,
            child: Mutex::new(None),
        }
    }

    fn command(
        config: &SessionConfig,
        which: &'static str,
        args: &[String],
        screen: Option<&str>,
    ) -> Result<Cmd, RestartError> {
        let mut vars = FxHashMap::default();
        vars.insert("RELIVE_ROOT".to_string(), config.root.display().to_string());
        vars.insert(
            "RELIVE_CONFIGURATION".to_string(),
            config.restart.configuration.clone(),
        );
        vars.insert("RELIVE_SCREEN".to_string(), screen.unwrap_or_default().to_string());

        let cmd = Cmd::new(drop_empty_args(resolve_args(args, &vars)))
            .ok_or(RestartError::EmptyCommand(which))?
            .cwd(&config.root);
        crate::debug!("restart"; "{} `{}`", which, cmd.display());
        Ok(cmd)
    }

    fn try_compile(&self, configuration: &str) -> Result<CompileOutcome, RestartError> {
        let mut config = (*self.config.get()).clone();
        config.restart.configuration = configuration.to_string();
        let output = Self::command(&config, "compile", &config.restart.compile, None)?.run()?;

        // killed by a signal: somebody cancelled the build
        let was_cancelled = output.status.code().is_none();
        let succeeded = output.status.success();
        Ok(CompileOutcome {
            succeeded,
            was_cancelled,
            detail: if succeeded {
                String::new()
            } else {
                tail_output(&output, OUTPUT_TAIL)
            },
        })
    }

    fn try_launch(&self, prevent_focus: bool, screen: Option<&str>) -> Result<Child, RestartError> {
        let config = self.config.get();
        let screen = screen.or(config.restart.startup_screen.as_deref());
        let cmd = Self::command(&config, "launch", &config.restart.launch, screen)?
            .env("RELIVE_PREVENT_FOCUS", if prevent_focus { "1" } else { "0" });
        Ok(cmd.spawn()?)
    }
}

impl Launcher for CommandLauncher {
    fn compile(&self, configuration: &str) -> CompileOutcome {
        self.try_compile(configuration).unwrap_or_else(|err| CompileOutcome {
            succeeded: false,
            was_cancelled: false,
            detail: err.to_string(),
        })
    }

    fn launch(&self, prevent_focus: bool, start_screen: Option<&str>) -> LaunchOutcome {
        match self.try_launch(prevent_focus, start_screen) {
            Ok(child) => {
                let pid = child.id();
                *self.child.lock() = Some(child);
                LaunchOutcome {
                    succeeded: true,
                    message: format!("started process {pid}"),
                }
            }
            Err(err) => LaunchOutcome {
                succeeded: false,
                message: format!("{err:#}"),
            },
        }
    }

    fn kill(&self) {
        let child = self.child.lock().take();
        if let Some(mut child) = child {
            crate::debug!("restart"; "stopping process {}", child.id());
            if let Err(e) = child.kill() {
                crate::debug!("restart"; "kill failed: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl Drop for CommandLauncher {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Drop arguments that resolved to nothing, with the flag naming them.
///
/// `["--screen", ""]` disappears entirely when no screen is known.
fn drop_empty_args(args: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(args.len());
    for arg in args {
        if arg.is_empty() {
            if kept.last().is_some_and(|prev| prev.starts_with('-')) {
                kept.pop();
            }
            continue;
        }
        kept.push(arg);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_session_config;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_drop_empty_args() {
        assert_eq!(
            drop_empty_args(strings(&["run", "--", "--screen", ""])),
            ["run", "--"]
        );
        assert_eq!(drop_empty_args(strings(&["", "build"])), ["build"]);
        assert_eq!(
            drop_empty_args(strings(&["--screen", "Level1"])),
            ["--screen", "Level1"]
        );
    }

    #[test]
    fn test_empty_command_is_error() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_session_config(temp.path(), "[restart]\ncompile = []\n");
        let err = CommandLauncher::command(&config, "compile", &config.restart.compile, None)
            .err()
            .unwrap();
        assert!(matches!(err, RestartError::EmptyCommand("compile")));
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_reports_failure_output() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_session_config(
            temp.path(),
            r#"
[restart]
compile = ["sh", "-c", "echo building $0; echo 'error CS1002: ; expected' >&2; exit 1", "$RELIVE_CONFIGURATION"]
"#,
        );
        let launcher = CommandLauncher::new(Arc::new(ConfigHandle::new(config)));

        let outcome = launcher.compile("Release");
        assert!(!outcome.succeeded);
        assert!(!outcome.was_cancelled);
        assert!(outcome.detail.contains("building Release"));
        assert!(outcome.detail.contains("CS1002"));
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_and_kill() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_session_config(
            temp.path(),
            "[restart]\nlaunch = [\"sleep\", \"30\"]\n",
        );
        let launcher = CommandLauncher::new(Arc::new(ConfigHandle::new(config)));

        let outcome = launcher.launch(true, Some("Level1"));
        assert!(outcome.succeeded, "{}", outcome.message);
        assert!(launcher.child.lock().is_some());

        launcher.kill();
        assert!(launcher.child.lock().is_none());
    }

    #[test]
    fn test_launch_missing_program() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_session_config(
            temp.path(),
            "[restart]\nlaunch = [\"relive-no-such-program\"]\n",
        );
        let launcher = CommandLauncher::new(Arc::new(ConfigHandle::new(config)));

        let outcome = launcher.launch(false, None);
        assert!(!outcome.succeeded);
        assert!(outcome.message.contains("relive-no-such-program"));
    }
}
