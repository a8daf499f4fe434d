//! Command-line interface module.

mod args;
pub mod send;
pub mod watch;

pub use args::{Cli, Commands};
