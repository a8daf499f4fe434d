//! Session state and process shutdown.
//!
//! `SessionState` is owned by one session (one editor-project attachment)
//! and shared by reference with the actors working for it:
//! - `running`: the live process is attached and answering
//! - `edit_mode`: the live process accepts edit commands
//! - `failed_last_restart`: the last build failed
//! - `last_pushed_selection`: what the game's inspector currently shows
//!
//! Shutdown stays process-wide: there is one Ctrl+C handler per process.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::live::dto::Selection;
use crate::restart::phase::Phase;

// =============================================================================
// SessionState
// =============================================================================

#[derive(Debug, Default)]
pub struct SessionState {
    running: AtomicBool,
    edit_mode: AtomicBool,
    auto_restart: AtomicBool,
    /// This session started the live process itself.
    did_launch_process: AtomicBool,
    failed_last_restart: AtomicBool,
    /// Swallow the next selection event from the editor.
    ignore_next_select: AtomicBool,
    phase: Mutex<Phase>,
    last_pushed_selection: Mutex<Option<Selection>>,
}

impl SessionState {
    pub fn new(edit_mode: bool, auto_restart: bool) -> Self {
        let state = Self::default();
        state.edit_mode.store(edit_mode, Ordering::SeqCst);
        state.auto_restart.store(auto_restart, Ordering::SeqCst);
        state
    }

    /// Back to a freshly attached session (project closed).
    pub fn reset(&self, edit_mode: bool, auto_restart: bool) {
        self.running.store(false, Ordering::SeqCst);
        self.edit_mode.store(edit_mode, Ordering::SeqCst);
        self.auto_restart.store(auto_restart, Ordering::SeqCst);
        self.did_launch_process.store(false, Ordering::SeqCst);
        self.failed_last_restart.store(false, Ordering::SeqCst);
        self.ignore_next_select.store(false, Ordering::SeqCst);
        *self.phase.lock() = Phase::Idle;
        *self.last_pushed_selection.lock() = None;
    }

    // -------------------------------------------------------------------------
    // flags
    // -------------------------------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode.load(Ordering::SeqCst)
    }

    pub fn set_edit_mode(&self, enabled: bool) {
        self.edit_mode.store(enabled, Ordering::SeqCst);
    }

    pub fn is_auto_restart(&self) -> bool {
        self.auto_restart.load(Ordering::SeqCst)
    }

    pub fn set_auto_restart(&self, enabled: bool) {
        self.auto_restart.store(enabled, Ordering::SeqCst);
    }

    pub fn did_launch_process(&self) -> bool {
        self.did_launch_process.load(Ordering::SeqCst)
    }

    pub fn set_did_launch_process(&self, launched: bool) {
        self.did_launch_process.store(launched, Ordering::SeqCst);
    }

    pub fn failed_last_restart(&self) -> bool {
        self.failed_last_restart.load(Ordering::SeqCst)
    }

    pub fn set_failed_last_restart(&self, failed: bool) {
        self.failed_last_restart.store(failed, Ordering::SeqCst);
    }

    pub fn set_ignore_next_select(&self) {
        self.ignore_next_select.store(true, Ordering::SeqCst);
    }

    /// Returns true (once) if the next selection should be swallowed.
    pub fn take_ignore_next_select(&self) -> bool {
        self.ignore_next_select.swap(false, Ordering::SeqCst)
    }

    /// Running in edit mode: object-structure commands are accepted.
    pub fn accepts_edits(&self) -> bool {
        self.is_running() && self.is_edit_mode()
    }

    // -------------------------------------------------------------------------
    // phase
    // -------------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    /// Move to `next` if the state machine allows it.
    pub fn transition(&self, next: Phase) -> bool {
        let mut phase = self.phase.lock();
        if !phase.allows(next) {
            crate::debug!("restart"; "refusing phase change {} -> {}", *phase, next);
            return false;
        }
        *phase = next;
        true
    }

    // -------------------------------------------------------------------------
    // selection
    // -------------------------------------------------------------------------

    pub fn last_pushed_selection(&self) -> Option<Selection> {
        self.last_pushed_selection.lock().clone()
    }

    pub fn set_last_pushed_selection(&self, selection: Option<Selection>) {
        *self.last_pushed_selection.lock() = selection;
    }
}

// =============================================================================
// SHUTDOWN state
// =============================================================================

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for actor system
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_shutdown()`: exits immediately, nothing is running yet
/// - After `register_shutdown()`: notifies the actor system
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(tx) = SHUTDOWN_TX.get() {
            crate::log!("watch"; "shutting down...");
            let _ = tx.send(());
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the actor system's shutdown channel
pub fn register_shutdown(shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_shutdown_channel_delivers() {
        let (tx, rx) = crossbeam::channel::bounded(1);
        register_shutdown(tx);

        SHUTDOWN_TX.get().unwrap().send(()).unwrap();
        assert!(rx.recv_timeout(std::time::Duration::from_secs(1)).is_ok());
        assert!(!is_shutdown());
    }

    #[test]
    fn test_accepts_edits_needs_both_flags() {
        let state = SessionState::new(true, false);
        assert!(!state.accepts_edits());
        state.set_running(true);
        assert!(state.accepts_edits());
        state.set_edit_mode(false);
        assert!(!state.accepts_edits());
    }

    #[test]
    fn test_ignore_next_select_is_one_shot() {
        let state = SessionState::default();
        assert!(!state.take_ignore_next_select());
        state.set_ignore_next_select();
        assert!(state.take_ignore_next_select());
        assert!(!state.take_ignore_next_select());
    }

    #[test]
    fn test_transition_refuses_illegal_moves() {
        let state = SessionState::default();
        assert!(!state.transition(Phase::Relaunching));
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.transition(Phase::Compiling));
        assert!(state.transition(Phase::Failed));
        assert_eq!(state.phase(), Phase::Failed);
    }

    #[test]
    fn test_reset_clears_everything() {
        let state = SessionState::new(false, true);
        state.set_running(true);
        state.set_failed_last_restart(true);
        state.set_did_launch_process(true);
        state.set_last_pushed_selection(Some(Selection::element("Screens/GameScreen")));
        state.transition(Phase::Compiling);

        state.reset(true, false);

        assert!(!state.is_running());
        assert!(state.is_edit_mode());
        assert!(!state.is_auto_restart());
        assert!(!state.failed_last_restart());
        assert!(!state.did_launch_process());
        assert!(state.last_pushed_selection().is_none());
        assert_eq!(state.phase(), Phase::Idle);
    }
}
