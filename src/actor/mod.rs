//! Actor System for Live Editing
//!
//! Message-passing concurrency for a watch session:
//!
//! ```text
//! FsActor ──────┐
//! (watch)       ├──> SyncActor ──> live process / restart queue
//! EditorInput ──┘    (policy)
//! (stdin)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `editor_input` - Editor events as newline-delimited JSON
//! - `sync` - Turns changes and editor events into commands or restarts
//! - `profiling` - Periodic profiling snapshots
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod editor_input;
pub mod fs;
pub mod messages;
pub mod profiling;
pub mod sync;

pub use coordinator::Coordinator;
