//! Editor input: newline-delimited JSON editor events, usually on stdin.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::mpsc;

use super::messages::{EditorEvent, SyncMsg};

pub struct EditorInput<R> {
    lines: Lines<BufReader<R>>,
    sync_tx: mpsc::Sender<SyncMsg>,
}

impl EditorInput<tokio::io::Stdin> {
    pub fn stdin(sync_tx: mpsc::Sender<SyncMsg>) -> Self {
        Self::new(tokio::io::stdin(), sync_tx)
    }
}

impl<R: AsyncRead + Unpin> EditorInput<R> {
    pub fn new(reader: R, sync_tx: mpsc::Sender<SyncMsg>) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            sync_tx,
        }
    }

    /// Forward events until the input closes.
    pub async fn run(mut self) {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    crate::log!("editor"; "input error: {}", e);
                    break;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<EditorEvent>(line) {
                Ok(event) => {
                    if self.sync_tx.send(SyncMsg::Editor(event)).await.is_err() {
                        break;
                    }
                }
                Err(e) => crate::log!("editor"; "unreadable event ({}): {}", e, line),
            }
        }
        crate::debug!("editor"; "input closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forwards_events_and_skips_garbage() {
        let input = b"{\"event\":\"IgnoreNextSelect\"}\n\nnot json\n{\"event\":\"SetEditMode\",\"enabled\":false}\n";
        let (tx, mut rx) = mpsc::channel(8);

        EditorInput::new(&input[..], tx).run().await;

        let mut events = Vec::new();
        while let Ok(SyncMsg::Editor(event)) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            [
                EditorEvent::IgnoreNextSelect,
                EditorEvent::SetEditMode { enabled: false }
            ]
        );
    }
}
