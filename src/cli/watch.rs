//! `relive watch`: run a live-edit session until Ctrl+C.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::actor::Coordinator;
use crate::config::SessionConfig;
use crate::core::register_shutdown;
use crate::session::Session;

/// How long shutdown waits for tasks still blocked on stdin or a compile.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

pub fn watch(config: SessionConfig, read_stdin: bool) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = crossbeam::channel::bounded(1);
    register_shutdown(shutdown_tx);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let result = rt.block_on(async {
        let mut coordinator =
            Coordinator::with_session(Session::new(config)).with_shutdown_signal(shutdown_rx);
        if !read_stdin {
            coordinator = coordinator.without_editor_input();
        }
        coordinator.run().await
    });

    // stdin reads sit on a blocking thread that never returns on its own
    rt.shutdown_timeout(SHUTDOWN_GRACE);
    result
}
