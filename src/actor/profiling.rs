//! Profiling poller.
//!
//! Asks the running game for a profiling snapshot every interval. Polls use
//! if-not-busy mode, so a slow game never gets a backlog of snapshot requests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::live::LiveError;
use crate::session::Session;

pub struct ProfilingActor {
    session: Arc<Session>,
    interval: Duration,
}

impl ProfilingActor {
    pub fn new(session: Arc<Session>, interval: Duration) -> Self {
        Self { session, interval }
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if !self.session.state.is_running() {
                continue;
            }

            // run the poll beside the ticker so a slow answer shows up as Busy
            let session = Arc::clone(&self.session);
            tokio::spawn(async move { poll(&session).await });
        }
    }
}

/// One poll; returns the snapshot when one came back.
async fn poll(session: &Session) -> Option<Value> {
    match session.dispatcher.profiling_data().await {
        Ok(data) => {
            crate::debug!("profile"; "{}", summarize(&data));
            Some(data)
        }
        Err(LiveError::Busy(_)) => None,
        Err(e) => {
            crate::debug!("profile"; "snapshot failed: {}", e);
            None
        }
    }
}

/// One line out of whatever the game reported.
fn summarize(data: &Value) -> String {
    match data {
        Value::String(text) => text.lines().next().unwrap_or_default().to_string(),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" "),
        Value::Null => "no data".to_string(),
        other => other.to_string(),
    }
}
