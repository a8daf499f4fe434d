//! Relive - keeps a running game in sync with its editor project.

mod actor;
mod cli;
mod config;
mod core;
mod live;
mod logger;
mod restart;
mod session;
mod suppress;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SessionConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SessionConfig::load(&cli.config, cli.overrides())?;

    match &cli.command {
        Commands::Watch { no_stdin, .. } => cli::watch::watch(config, !no_stdin),
        Commands::Send { kind, payload, .. } => cli::send::send(config, kind, payload.as_deref()),
        Commands::Screen { .. } => cli::send::screen(config),
    }
}
