//! Restart orchestrator.
//!
//! Every full restart goes through one `TaskQueue`, so at most one
//! compile/relaunch runs at a time:
//!
//! ```text
//! request_restart(reason) ──CanRestart?──▶ queue ("restart", newest reason)
//!                                            │
//!                             run_once ◀─────┘
//!   fetch screen (if running) → kill → [superseded?] → compile
//!     → [superseded?] → launch → attach → Running (+ edit mode restored)
//! ```
//!
//! A compile that started always runs to completion. A newer request that
//! arrives meanwhile makes the running task skip its remaining steps.

mod launcher;
pub mod phase;
pub mod queue;


pub use launcher::{CommandLauncher, CompileOutcome, LaunchOutcome, Launcher};
pub use phase::Phase;
pub use queue::{RESTART_KEY, Task, TaskQueue};

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ConfigHandle;
use crate::core::SessionState;
use crate::live::CommandDispatcher;
use crate::logger::{status_error, status_success, status_warning};

/// Pause between connection attempts while a relaunched game starts up.
const ATTACH_RETRY: Duration = Duration::from_millis(250);

/// How a restart task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    Relaunched,
    /// A newer restart request was queued; it will do the work.
    Superseded,
    Cancelled,
    BuildFailed,
    LaunchFailed,
    /// Launched, but never started listening.
    AttachFailed,
}

pub struct Orchestrator {
    config: Arc<ConfigHandle>,
    state: Arc<SessionState>,
    queue: Arc<TaskQueue>,
    dispatcher: Arc<CommandDispatcher>,
    launcher: Arc<dyn Launcher>,
}

impl Orchestrator {
    pub fn new(
        config: Arc<ConfigHandle>,
        state: Arc<SessionState>,
        queue: Arc<TaskQueue>,
        dispatcher: Arc<CommandDispatcher>,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        Self {
            config,
            state,
            queue,
            dispatcher,
            launcher,
        }
    }

    // ========================================================================
    // requests
    // ========================================================================

    /// Whether a restart may be started now.
    pub fn can_restart(&self) -> bool {
        if !self.config.get().restart.enabled {
            return false;
        }
        let state = &self.state;
        state.did_launch_process()
            || (!state.is_running() && state.failed_last_restart())
            || (state.is_running() && state.is_edit_mode())
            || state.is_auto_restart()
    }

    /// Queue a restart. Returns false when restarting is not allowed.
    pub fn request_restart(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        if !self.can_restart() {
            crate::debug!("restart"; "not restarting ({})", reason);
            return false;
        }

        crate::log!("restart"; "Restarting because: {}", reason);
        if self.queue.add_or_move_to_end(RESTART_KEY, reason) {
            crate::debug!("restart"; "merged with queued restart");
        }
        true
    }

    /// The live process went away without us.
    pub fn process_lost(&self) {
        if self.state.is_running() {
            crate::log!("restart"; "live process is gone");
        }
        self.state.set_running(false);
        if !self.state.phase().is_busy() {
            self.state.transition(Phase::Idle);
        }
        self.dispatcher.transport().disconnect();
    }

    /// Attach to a live process that is already listening.
    pub async fn attach_existing(&self) -> bool {
        if self.dispatcher.transport().connect().await.is_err() {
            return false;
        }
        self.on_attached(self.state.is_edit_mode()).await;
        true
    }

    // ========================================================================
    // execution
    // ========================================================================

    /// Run queued tasks forever.
    pub async fn run(&self) {
        loop {
            let (task, outcome) = self.run_once().await;
            crate::debug!("restart"; "`{}` finished: {:?}", task.reason, outcome);
        }
    }

    /// Wait for the next task and run it.
    pub async fn run_once(&self) -> (Task, RestartOutcome) {
        let task = self.queue.next().await;
        let outcome = self.restart(&task.reason).await;
        (task, outcome)
    }

    async fn restart(&self, reason: &str) -> RestartOutcome {
        let config = self.config.get();
        let restore_edit_mode = self.state.is_edit_mode();

        let screen = self.resume_screen(config.restart.startup_screen.clone()).await;

        self.state.transition(Phase::Compiling);
        self.stop_process().await;
        if self.superseded() {
            return RestartOutcome::Superseded;
        }

        let configuration = config.restart.configuration.clone();
        let launcher = Arc::clone(&self.launcher);
        let compiled = tokio::task::spawn_blocking(move || launcher.compile(&configuration))
            .await
            .unwrap_or_else(|e| CompileOutcome {
                succeeded: false,
                was_cancelled: false,
                detail: e.to_string(),
            });

        if compiled.was_cancelled {
            crate::log!("restart"; "build cancelled");
            self.state.transition(Phase::Idle);
            return RestartOutcome::Cancelled;
        }
        if !compiled.succeeded {
            self.fail("Build failed", &compiled.detail);
            return RestartOutcome::BuildFailed;
        }
        if self.superseded() {
            return RestartOutcome::Superseded;
        }
        // Ctrl+C during the build: don't leave a fresh game behind
        if crate::core::is_shutdown() {
            self.state.transition(Phase::Idle);
            return RestartOutcome::Cancelled;
        }

        self.state.transition(Phase::Relaunching);
        let launcher = Arc::clone(&self.launcher);
        let prevent_focus = config.restart.prevent_focus;
        let launched = tokio::task::spawn_blocking(move || {
            launcher.launch(prevent_focus, screen.as_deref())
        })
        .await
        .unwrap_or_else(|e| LaunchOutcome {
            succeeded: false,
            message: e.to_string(),
        });

        if !launched.succeeded {
            self.fail("Launch failed", &launched.message);
            return RestartOutcome::LaunchFailed;
        }
        crate::debug!("restart"; "{}", launched.message);
        self.state.set_did_launch_process(true);

        if !self.wait_for_attach(config.live.attach_timeout()).await {
            let addr = self.dispatcher.transport().addr();
            self.fail(
                "Relaunch failed",
                &format!("live process never listened on {addr}"),
            );
            return RestartOutcome::AttachFailed;
        }

        self.on_attached(restore_edit_mode).await;
        status_success(&format!("restarted ({reason})"));
        RestartOutcome::Relaunched
    }

    /// Screen to relaunch on: the one showing now, else the startup screen.
    async fn resume_screen(&self, fallback: Option<String>) -> Option<String> {
        if !self.state.is_running() {
            return fallback;
        }
        match self.dispatcher.current_screen().await {
            Ok(screen) => Some(screen),
            Err(e) => {
                crate::debug!("restart"; "could not get current screen: {}", e);
                fallback
            }
        }
    }

    async fn stop_process(&self) {
        self.state.set_running(false);
        self.state.set_last_pushed_selection(None);
        self.dispatcher.transport().disconnect();

        let launcher = Arc::clone(&self.launcher);
        let _ = tokio::task::spawn_blocking(move || launcher.kill()).await;
    }

    fn superseded(&self) -> bool {
        if self.queue.has_pending(RESTART_KEY) {
            crate::debug!("restart"; "newer restart queued, skipping the rest");
            self.state.transition(Phase::Idle);
            return true;
        }
        false
    }

    async fn wait_for_attach(&self, timeout: Duration) -> bool {
        let transport = self.dispatcher.transport();
        let deadline = Instant::now() + timeout;
        loop {
            match transport.connect().await {
                Ok(()) => return true,
                Err(e) if Instant::now() >= deadline => {
                    crate::debug!("restart"; "attach gave up: {}", e);
                    return false;
                }
                Err(_) => tokio::time::sleep(ATTACH_RETRY).await,
            }
        }
    }

    async fn on_attached(&self, edit_mode: bool) {
        self.state.set_running(true);
        self.state.set_failed_last_restart(false);
        self.state.transition(Phase::Running);

        if edit_mode
            && let Err(e) = self.dispatcher.set_edit_mode(true).await
        {
            status_warning(&format!("could not enable edit mode: {e}"));
        }
    }

    fn fail(&self, summary: &str, detail: &str) {
        self.state.set_failed_last_restart(true);
        self.state.transition(Phase::Failed);
        status_error(summary, detail);
    }
}
