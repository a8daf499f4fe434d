//! Configuration utility types.
//!
//! | Module   | Purpose                                      |
//! |----------|----------------------------------------------|
//! | `error`  | Configuration error types                    |
//! | `handle` | Session configuration handle (hot reload)    |

mod error;
pub mod handle;

pub use error::{ConfigDiagnostics, ConfigError};
pub use handle::ConfigHandle;
