//! Talking to the live process.
//!
//! # Module Structure
//!
//! ```text
//! live/
//! ├── message      # wire frames (Command, Response)
//! ├── error        # LiveError
//! ├── transport    # one TCP connection, id correlation, per-send timeout
//! ├── dto          # typed commands and responses
//! ├── dispatch     # one method per command
//! └── selection    # selection reconciler
//! ```

pub mod dispatch;
pub mod dto;
pub mod error;
pub mod message;
pub mod selection;
pub mod transport;

#[cfg(test)]
pub mod testing;


pub use dispatch::CommandDispatcher;
pub use error::LiveError;
pub use message::{Command, Response};
pub use selection::{PushOutcome, Reconciler, SelectionRequest};
pub use transport::{CommandTransport, Importance};
