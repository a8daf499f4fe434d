//! Actor Coordinator - wires up a live-edit session
//!
//! Creates the channel, builds the watcher, sync, editor-input and
//! profiling actors around one [`Session`], attaches to a game that is
//! already running, and runs everything until shutdown.

mod runtime;
mod watch_paths;

use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::editor_input::EditorInput;
use super::fs::{ChangeFilter, FsActor};
use super::messages::SyncMsg;
use super::profiling::ProfilingActor;
use super::sync::SyncActor;
use crate::session::Session;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    session: Arc<Session>,
    read_stdin: bool,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn with_session(session: Arc<Session>) -> Self {
        Self {
            session,
            read_stdin: true,
            shutdown_rx: None,
        }
    }

    /// Do not read editor events from stdin.
    pub fn without_editor_input(mut self) -> Self {
        self.read_stdin = false;
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let (sync_tx, sync_rx) = mpsc::channel::<SyncMsg>(CHANNEL_BUFFER);
        let config = self.session.config();

        let filter = ChangeFilter::new(&config, Arc::clone(&self.session.suppressor));
        let fs = FsActor::new(
            watch_paths::collect_watch_paths(&config),
            filter,
            config.watch.debounce(),
            sync_tx.clone(),
        )
        .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;

        let sync = SyncActor::new(sync_rx, Arc::clone(&self.session));
        let input = self
            .read_stdin
            .then(|| EditorInput::stdin(sync_tx.clone()));
        let profiling = config
            .live
            .profiling_interval()
            .map(|interval| ProfilingActor::new(Arc::clone(&self.session), interval));

        crate::log!("watch"; "watching {}", config.watch.root.display());
        if self.session.orchestrator.attach_existing().await {
            crate::log!("live"; "attached to running game at {}", config.live.addr());
        }

        let actors = runtime::Actors {
            fs,
            sync,
            input,
            profiling,
            orchestrator: Arc::clone(&self.session.orchestrator),
        };
        runtime::run_actors(actors, sync_tx, self.shutdown_rx.take()).await
    }
}
