//! Core types shared across the session.

mod state;

pub use state::{SessionState, is_shutdown, register_shutdown, setup_shutdown_handler};
