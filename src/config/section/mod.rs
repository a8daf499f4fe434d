//! Configuration section definitions.
//!
//! Each module corresponds to a section in `relive.toml`:
//!
//! | Module    | TOML Section | Purpose                                  |
//! |-----------|--------------|------------------------------------------|
//! | `watch`   | `[watch]`    | Watched root, debounce, file classes     |
//! | `live`    | `[live]`     | Live process address and timeouts        |
//! | `restart` | `[restart]`  | Compile and launch commands              |

mod live;
mod restart;
mod watch;

pub use live::LiveConfig;
pub use restart::RestartConfig;
pub use watch::WatchConfig;
