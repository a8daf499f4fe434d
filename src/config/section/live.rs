//! `[live]` section configuration.
//!
//! Connection to the running game process.
//!
//! # Example
//!
//! ```toml
//! [live]
//! host = "127.0.0.1"
//! port = 8888
//! poll_timeout_ms = 500       # Screen name, camera, profiling
//! edit_timeout_ms = 5000      # Structural edits
//! attach_timeout_ms = 15000   # Wait for a relaunched process to listen
//! profiling_interval_ms = 0   # 0 disables the profiling poller
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

/// Live process connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub host: IpAddr,
    pub port: u16,
    pub connect_timeout_ms: u64,
    pub poll_timeout_ms: u64,
    pub edit_timeout_ms: u64,
    pub attach_timeout_ms: u64,
    /// Delay before asking the game to reload a freshly copied content file.
    pub copy_settle_ms: u64,
    pub profiling_interval_ms: u64,
    /// Start the session in edit mode.
    pub edit_mode: bool,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8888,
            connect_timeout_ms: 1000,
            poll_timeout_ms: 500,
            edit_timeout_ms: 5000,
            attach_timeout_ms: 15000,
            copy_settle_ms: 600,
            profiling_interval_ms: 0,
            edit_mode: true,
        }
    }
}

impl LiveConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn edit_timeout(&self) -> Duration {
        Duration::from_millis(self.edit_timeout_ms)
    }

    pub fn attach_timeout(&self) -> Duration {
        Duration::from_millis(self.attach_timeout_ms)
    }

    pub fn copy_settle(&self) -> Duration {
        Duration::from_millis(self.copy_settle_ms)
    }

    /// `None` when the profiling poller is disabled.
    pub fn profiling_interval(&self) -> Option<Duration> {
        (self.profiling_interval_ms > 0).then(|| Duration::from_millis(self.profiling_interval_ms))
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error_with_hint("live.port", "port must not be 0", "the game listens on 8888 by default");
        }
        if self.poll_timeout_ms == 0 {
            diag.error("live.poll_timeout_ms", "timeout must be positive");
        }
        if self.edit_timeout_ms == 0 {
            diag.error("live.edit_timeout_ms", "timeout must be positive");
        }
        if self.attach_timeout_ms < self.connect_timeout_ms {
            diag.warn(
                "live.attach_timeout_ms",
                "shorter than connect_timeout_ms; a relaunched game gets a single connection attempt",
            );
        }
    }
}
