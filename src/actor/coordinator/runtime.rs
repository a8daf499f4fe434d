use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::editor_input::EditorInput;
use crate::actor::fs::FsActor;
use crate::actor::messages::SyncMsg;
use crate::actor::profiling::ProfilingActor;
use crate::actor::sync::SyncActor;
use crate::restart::Orchestrator;

pub(super) struct Actors {
    pub fs: FsActor,
    pub sync: SyncActor,
    pub input: Option<EditorInput<tokio::io::Stdin>>,
    pub profiling: Option<ProfilingActor>,
    pub orchestrator: Arc<Orchestrator>,
}

/// Run all actors until shutdown or until the watcher/sync loop ends.
pub(super) async fn run_actors(
    actors: Actors,
    sync_tx: mpsc::Sender<SyncMsg>,
    shutdown_rx: Option<Receiver<()>>,
) -> Result<()> {
    let Actors {
        fs,
        sync,
        input,
        profiling,
        orchestrator,
    } = actors;

    let mut sync_handle = tokio::spawn(sync.run());
    let mut fs_handle = tokio::spawn(fs.run());
    let restart_handle = tokio::spawn(async move { orchestrator.run().await });
    let input_handle = input.map(|input| tokio::spawn(input.run()));
    let profiling_handle = profiling.map(|profiling| tokio::spawn(profiling.run()));

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            if fs_handle.is_finished() || sync_handle.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        tokio::select! {
            _ = &mut fs_handle => {}
            _ = &mut sync_handle => {}
        }
    }

    // a compile in flight is not waited for
    restart_handle.abort();
    if let Some(handle) = input_handle {
        handle.abort();
    }
    if let Some(handle) = profiling_handle {
        handle.abort();
    }
    fs_handle.abort();

    let _ = sync_tx.send(SyncMsg::Shutdown).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), sync_handle).await;

    Ok(())
}
