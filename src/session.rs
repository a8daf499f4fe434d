//! One editor-project attachment.
//!
//! Everything a live-edit session needs is built here once and handed to
//! the actors by `Arc`. Two sessions never share state.

use std::sync::Arc;

use anyhow::Result;

use crate::config::{ConfigHandle, SessionConfig};
use crate::core::SessionState;
use crate::live::{CommandDispatcher, CommandTransport, Reconciler};
use crate::restart::{CommandLauncher, Launcher, Orchestrator, TaskQueue};
use crate::suppress::Suppressor;

pub struct Session {
    pub config: Arc<ConfigHandle>,
    pub state: Arc<SessionState>,
    pub suppressor: Arc<Suppressor>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub reconciler: Arc<Reconciler>,
    pub queue: Arc<TaskQueue>,
    pub orchestrator: Arc<Orchestrator>,
}

impl Session {
    /// Session that compiles and launches with the configured commands.
    pub fn new(config: SessionConfig) -> Arc<Self> {
        let config = Arc::new(ConfigHandle::new(config));
        let launcher = Arc::new(CommandLauncher::new(Arc::clone(&config)));
        Self::build(config, launcher)
    }

    pub fn with_launcher(config: SessionConfig, launcher: Arc<dyn Launcher>) -> Arc<Self> {
        Self::build(Arc::new(ConfigHandle::new(config)), launcher)
    }

    fn build(config: Arc<ConfigHandle>, launcher: Arc<dyn Launcher>) -> Arc<Self> {
        let current = config.get();
        let state = Arc::new(SessionState::new(
            current.live.edit_mode,
            current.restart.auto_restart,
        ));
        let transport = Arc::new(CommandTransport::new(
            current.live.addr(),
            current.live.connect_timeout(),
        ));
        let dispatcher = Arc::new(CommandDispatcher::new(transport, Arc::clone(&config)));
        let reconciler = Arc::new(Reconciler::new(Arc::clone(&dispatcher), Arc::clone(&state)));
        let queue = Arc::new(TaskQueue::new());
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&config),
            Arc::clone(&state),
            Arc::clone(&queue),
            Arc::clone(&dispatcher),
            launcher,
        ));

        Arc::new(Self {
            config,
            state,
            suppressor: Arc::new(Suppressor::new()),
            dispatcher,
            reconciler,
            queue,
            orchestrator,
        })
    }

    #[inline]
    pub fn config(&self) -> Arc<SessionConfig> {
        self.config.get()
    }

    /// Re-read `relive.toml`. Returns true if the config changed.
    pub fn reload_config(&self) -> Result<bool> {
        if !self.config.reload()? {
            return Ok(false);
        }

        let config = self.config.get();
        self.dispatcher.transport().set_addr(config.live.addr());
        self.state.set_auto_restart(config.restart.auto_restart);
        crate::log!("config"; "reloaded");
        Ok(true)
    }

    /// Project closed: forget everything learned since attaching.
    pub fn reset(&self) {
        let config = self.config.get();
        self.queue.clear();
        self.suppressor.clear();
        self.dispatcher.transport().disconnect();
        self.state
            .reset(config.live.edit_mode, config.restart.auto_restart);
        crate::debug!("sync"; "session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::fs::ChangeKind;
    use crate::config::test_session_config;
    use crate::live::dto::Selection;
    use crate::restart::RESTART_KEY;

    #[test]
    fn test_new_session_from_config() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_session_config(
            temp.path(),
            "[live]\nport = 9123\nedit_mode = false\n[restart]\nauto_restart = true\n",
        );
        let session = Session::new(config);

        assert!(!session.state.is_edit_mode());
        assert!(session.state.is_auto_restart());
        assert_eq!(session.dispatcher.transport().addr().port(), 9123);
    }

    #[test]
    fn test_reset_forgets_session() {
        let temp = tempfile::tempdir().unwrap();
        let session = Session::new(test_session_config(temp.path(), ""));

        session.state.set_running(true);
        session.state.set_edit_mode(false);
        session.state.set_failed_last_restart(true);
        session
            .state
            .set_last_pushed_selection(Some(Selection::element("Screens\\GameScreen")));
        session.suppressor.register_ignore(temp.path().join("a.glux"), 2);
        session.queue.add_or_move_to_end(RESTART_KEY, "pending");

        session.reset();

        assert!(!session.state.is_running());
        assert!(session.state.is_edit_mode());
        assert!(!session.state.failed_last_restart());
        assert!(session.state.last_pushed_selection().is_none());
        assert!(session.queue.is_empty());
        assert!(
            !session
                .suppressor
                .should_suppress(&temp.path().join("a.glux"), ChangeKind::Modified)
        );
    }

    #[test]
    fn test_reload_moves_transport() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("relive.toml");
        std::fs::write(&path, "[live]\nport = 9001\n").unwrap();
        let config = SessionConfig::load(&path, Default::default()).unwrap();
        let session = Session::new(config);
        assert_eq!(session.dispatcher.transport().addr().port(), 9001);

        std::fs::write(&path, "[live]\nport = 9002\n").unwrap();
        assert!(session.reload_config().unwrap());
        assert_eq!(session.dispatcher.transport().addr().port(), 9002);

        assert!(!session.reload_config().unwrap());
    }
}
