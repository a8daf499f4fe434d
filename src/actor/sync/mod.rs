//! Sync Actor
//!
//! Turns file batches and editor events into commands for the live process
//! or restart requests. Editor events are handled in arrival order; file
//! batches run on their own task so the copy settle delay never holds up
//! the editor.

mod editor;
mod files;


use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::SyncMsg;
use crate::session::Session;

pub struct SyncActor {
    rx: mpsc::Receiver<SyncMsg>,
    session: Arc<Session>,
}

impl SyncActor {
    pub fn new(rx: mpsc::Receiver<SyncMsg>, session: Arc<Session>) -> Self {
        Self { rx, session }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                SyncMsg::Files(batch) => {
                    crate::debug!("sync"; "{} change(s)", batch.len());
                    let session = Arc::clone(&self.session);
                    tokio::spawn(async move { files::handle_batch(&session, batch).await });
                }
                SyncMsg::Editor(event) => editor::handle(&self.session, event).await,
                SyncMsg::Shutdown => break,
            }
        }
        crate::debug!("sync"; "stopped");
    }
}
