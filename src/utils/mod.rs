//! Shared helpers: paths, hashing, external commands.

pub mod exec;
pub mod hash;
pub mod path;
