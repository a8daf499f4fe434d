//! Running the project's compile and launch commands.
//!
//! ```ignore
//! let cmd = Cmd::new(resolve_args(&config.restart.compile, &vars))
//!     .ok_or(RestartError::EmptyCommand("compile"))?
//!     .cwd(&config.root);
//! crate::debug!("restart"; "compile `{}`", cmd.display());
//! let output = cmd.run()?;
//! ```

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use std::{
    path::{Path, PathBuf},
    process::{Child, Command, Output, Stdio},
    sync::LazyLock,
};

/// `$NAME` placeholders; the longest name wins, so `$RELIVE_ROOT_DIR` is not `$RELIVE_ROOT`.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Z][A-Z0-9_]*)").expect("valid placeholder regex"));

/// A resolved command line.
#[derive(Debug, Clone)]
pub struct Cmd {
    argv: Vec<String>,
    cwd: Option<PathBuf>,
    envs: FxHashMap<String, String>,
}

impl Cmd {
    /// `None` for an empty argv.
    pub fn new(argv: Vec<String>) -> Option<Self> {
        if argv.is_empty() {
            return None;
        }
        Some(Self {
            argv,
            cwd: None,
            envs: FxHashMap::default(),
        })
    }

    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    /// The command line as typed in a shell, for logs.
    pub fn display(&self) -> String {
        self.argv
            .iter()
            .map(|arg| {
                if arg.is_empty() || arg.contains(char::is_whitespace) {
                    format!("\"{arg}\"")
                } else {
                    arg.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn program(&self) -> &str {
        &self.argv[0]
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(&self.argv[1..]).envs(&self.envs);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run to completion. A non-zero exit is not an error here; callers
    /// inspect `output.status`.
    pub fn run(&self) -> Result<Output> {
        self.command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute `{}`", self.program()))
    }

    /// Start without waiting. stdin is ours (editor events), so the child
    /// gets none; its console output stays visible.
    pub fn spawn(&self) -> Result<Child> {
        self.command()
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to spawn `{}`", self.program()))
    }
}

/// Replace `$NAME` placeholders with values from `vars`. Unknown names stay as written.
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    args.iter()
        .map(|arg| {
            PLACEHOLDER
                .replace_all(arg, |caps: &Captures| {
                    vars.get(&caps[1])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned()
        })
        .collect()
}

/// Last lines of a failed command's output, for the status block.
pub fn tail_output(output: &Output, lines: usize) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let combined: Vec<&str> = stdout
        .lines()
        .chain(stderr.lines())
        .filter(|line| !line.trim().is_empty())
        .collect();
    let start = combined.len().saturating_sub(lines);
    combined[start..].join("\n")
}
