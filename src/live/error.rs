//! Live-process communication errors.

use thiserror::Error;

/// Errors talking to the live process.
///
/// Transport-level and command-level failures are recovered by the caller,
/// usually by requesting a restart. None of them end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiveError {
    /// Connection lost, reset, or refused.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("live process is not connected")]
    NotConnected,

    /// No response within the command's own timeout.
    #[error("`{0}` timed out")]
    Timeout(String),

    /// A batch command applied only part of its items.
    #[error("{succeeded} succeeded, {failed} failed")]
    PartialFailure { succeeded: usize, failed: usize },

    /// The live process answered with `succeeded: false`.
    #[error("live process rejected the command: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    /// Dropped because a command of the same type was still in flight.
    #[error("`{0}` already in flight, dropped")]
    Busy(String),
}

impl LiveError {
    /// Failures of a single command that leave the connection usable.
    pub fn is_timeout_like(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Malformed(_))
    }

    /// The live state can no longer be trusted; a full restart is due.
    pub fn escalates_to_restart(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::NotConnected | Self::PartialFailure { .. } | Self::Rejected(_)
        )
    }
}

impl From<std::io::Error> for LiveError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy() {
        assert!(LiveError::Timeout("GetCurrentScreen".into()).is_timeout_like());
        assert!(LiveError::Malformed("eof".into()).is_timeout_like());
        assert!(!LiveError::Malformed("eof".into()).escalates_to_restart());

        assert!(LiveError::NotConnected.escalates_to_restart());
        assert!(
            LiveError::PartialFailure {
                succeeded: 2,
                failed: 1
            }
            .escalates_to_restart()
        );
        assert!(!LiveError::Busy("GetProfilingData".into()).escalates_to_restart());
    }

    #[test]
    fn test_display() {
        let err = LiveError::PartialFailure {
            succeeded: 4,
            failed: 1,
        };
        assert_eq!(err.to_string(), "4 succeeded, 1 failed");
    }
}
