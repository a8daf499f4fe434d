//! Restart phase state machine.
//!
//! ```text
//!            change requires restart
//!   Idle ──────────────────────────────▶ Compiling ──build ok──▶ Relaunching ──attached──▶ Running
//!    ▲  ▲                                 │    │                    │                       │
//!    │  └──────── cancelled/superseded ───┘    └──build failed──▶ Failed ◀──launch failed───┘
//!    │                                                             │
//!    └──────────────────── reset / process lost ───────────────────┘
//! ```
//!
//! `Failed` never retries on its own; the next qualifying trigger moves it
//! back to `Compiling`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Compiling,
    Relaunching,
    Running,
    Failed,
}

impl Phase {
    /// A compile or relaunch is executing.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Compiling | Self::Relaunching)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn allows(self, next: Phase) -> bool {
        use Phase::*;
        match (self, next) {
            (Idle | Running | Failed, Compiling) => true,
            (Compiling, Relaunching | Failed) => true,
            (Relaunching, Running | Failed) => true,
            // A game that was already listening when the session attached
            (Idle | Failed, Running) => true,
            (_, Idle) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Compiling => "compiling",
            Self::Relaunching => "relaunching",
            Self::Running => "running",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        assert!(Phase::Idle.allows(Phase::Compiling));
        assert!(Phase::Compiling.allows(Phase::Relaunching));
        assert!(Phase::Relaunching.allows(Phase::Running));
        assert!(Phase::Running.allows(Phase::Compiling));
    }

    #[test]
    fn test_failed_requires_new_trigger() {
        assert!(Phase::Compiling.allows(Phase::Failed));
        assert!(Phase::Failed.allows(Phase::Compiling));
        assert!(!Phase::Failed.allows(Phase::Relaunching));
    }

    #[test]
    fn test_compile_cannot_skip_relaunch() {
        assert!(!Phase::Compiling.allows(Phase::Running));
        assert!(!Phase::Idle.allows(Phase::Relaunching));
        assert!(!Phase::Compiling.allows(Phase::Compiling));
    }

    #[test]
    fn test_busy() {
        assert!(Phase::Compiling.is_busy());
        assert!(Phase::Relaunching.is_busy());
        assert!(!Phase::Failed.is_busy());
        assert_eq!(Phase::Relaunching.to_string(), "relaunching");
    }
}
