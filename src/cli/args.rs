//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Keeps a running game in sync with an editor project
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: relive.toml)
    #[arg(short = 'C', long, global = true, default_value = "relive.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Watch the project and keep the game in sync
    #[command(visible_alias = "w")]
    Watch {
        /// Directory to watch (relative to current directory)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        root: Option<PathBuf>,

        /// Port the game listens on for commands
        #[arg(short, long)]
        port: Option<u16>,

        /// Start with edit mode off
        #[arg(long)]
        no_edit: bool,

        /// Do not read editor events from stdin
        #[arg(long)]
        no_stdin: bool,
    },

    /// Send one command to the game and print the response
    Send {
        /// Command type, e.g. `GetCurrentScreen`
        kind: String,

        /// JSON payload
        payload: Option<String>,

        /// Port the game listens on for commands
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the game's current screen and camera position
    Screen {
        /// Port the game listens on for commands
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Command line values that override `relive.toml`.
    pub fn overrides(&self) -> ConfigOverrides {
        match &self.command {
            Commands::Watch {
                root,
                port,
                no_edit,
                ..
            } => ConfigOverrides {
                root: root.clone(),
                port: *port,
                edit_mode: no_edit.then_some(false),
            },
            Commands::Send { port, .. } | Commands::Screen { port } => ConfigOverrides {
                port: *port,
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag_is_not_verbose() {
        let err = Cli::try_parse_from(["relive", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);

        let cli = Cli::parse_from(["relive", "watch", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_watch_overrides() {
        let cli = Cli::parse_from(["relive", "watch", "--root", "game", "-p", "9100", "--no-edit"]);
        let overrides = cli.overrides();

        assert_eq!(overrides.root, Some(PathBuf::from("game")));
        assert_eq!(overrides.port, Some(9100));
        assert_eq!(overrides.edit_mode, Some(false));
    }

    #[test]
    fn test_edit_mode_left_to_config() {
        let cli = Cli::parse_from(["relive", "watch"]);
        assert_eq!(cli.overrides().edit_mode, None);
        assert_eq!(cli.config, PathBuf::from("relive.toml"));
    }

    #[test]
    fn test_send_args() {
        let cli = Cli::parse_from(["relive", "-v", "send", "SetEditMode", "{\"enabled\":true}"]);
        assert!(cli.verbose);
        let Commands::Send { kind, payload, port } = cli.command else {
            panic!("expected send");
        };
        assert_eq!(kind, "SetEditMode");
        assert_eq!(payload.as_deref(), Some("{\"enabled\":true}"));
        assert_eq!(port, None);
    }
}
