//! In-process fake live process for tests.
//!
//! Listens on an ephemeral localhost port, records every command it
//! receives and answers through a handler. Replies can be delayed (to get
//! out-of-order responses), withheld (to force timeouts) or garbled.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::task::JoinHandle;

use super::message::Command;

/// How the fake answers one command.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Value),
    Fail(String),
    /// Answer after a delay.
    Delayed(Duration, Box<Reply>),
    /// Never answer.
    Silent,
    /// Write this line verbatim.
    Raw(String),
}

impl Reply {
    pub fn ok() -> Self {
        Self::Ok(Value::Null)
    }
}

type Handler = Arc<dyn Fn(&Command) -> Reply + Send + Sync>;

#[derive(Deserialize)]
struct Incoming {
    id: u64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

pub struct FakeGame {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Command>>>,
    connections: Arc<AtomicUsize>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
    accept: JoinHandle<()>,
}

impl FakeGame {
    /// A game that accepts every command.
    pub async fn start() -> Self {
        Self::with_handler(|_| Reply::ok()).await
    }

    pub async fn with_handler(handler: impl Fn(&Command) -> Reply + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self::serve(listener, Arc::new(handler))
    }

    /// Listen on a given port (e.g. one a transport already points at).
    pub async fn bind(
        addr: SocketAddr,
        handler: impl Fn(&Command) -> Reply + Send + Sync + 'static,
    ) -> Self {
        let listener = TcpListener::bind(addr).await.unwrap();
        Self::serve(listener, Arc::new(handler))
    }

    fn serve(listener: TcpListener, handler: Handler) -> Self {
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let tasks: Arc<Mutex<Vec<JoinHandle<()>>>> = Arc::new(Mutex::new(Vec::new()));

        let accept = {
            let received = Arc::clone(&received);
            let connections = Arc::clone(&connections);
            let tasks = Arc::clone(&tasks);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    connections.fetch_add(1, Ordering::Relaxed);
                    let (read_half, write_half) = stream.into_split();
                    let writer = Arc::new(tokio::sync::Mutex::new(write_half));
                    let conn = tokio::spawn(serve_connection(
                        read_half,
                        writer,
                        Arc::clone(&handler),
                        Arc::clone(&received),
                        Arc::clone(&tasks),
                    ));
                    tasks.lock().push(conn);
                }
            })
        };

        Self {
            addr,
            received,
            connections,
            tasks,
            accept,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn received(&self) -> Vec<Command> {
        self.received.lock().clone()
    }

    /// Connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }

    pub fn kinds(&self) -> Vec<String> {
        self.received.lock().iter().map(|c| c.kind.clone()).collect()
    }

    /// Wait until at least `count` commands arrived.
    pub async fn wait_for(&self, count: usize) -> Vec<Command> {
        for _ in 0..200 {
            if self.received.lock().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.received()
    }

    /// Stop listening and drop every connection.
    pub fn stop(&self) {
        self.accept.abort();
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

impl Drop for FakeGame {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn serve_connection(
    read_half: tokio::net::tcp::OwnedReadHalf,
    writer: Arc<tokio::sync::Mutex<OwnedWriteHalf>>,
    handler: Handler,
    received: Arc<Mutex<Vec<Command>>>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
) {
    let mut lines = BufReader::new(read_half).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(incoming) = serde_json::from_str::<Incoming>(&line) else {
            continue;
        };
        let command = Command::new(incoming.kind, incoming.payload);
        let reply = handler(&command);
        received.lock().push(command);

        let writer = Arc::clone(&writer);
        let task = tokio::spawn(async move {
            let mut reply = reply;
            while let Reply::Delayed(delay, inner) = reply {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
            let line = match reply {
                Reply::Ok(data) => json!({"id": incoming.id, "succeeded": true, "data": data}).to_string(),
                Reply::Fail(message) => {
                    json!({"id": incoming.id, "succeeded": false, "message": message}).to_string()
                }
                Reply::Raw(raw) => raw,
                Reply::Silent | Reply::Delayed(..) => return,
            };
            let mut writer = writer.lock().await;
            let _ = writer.write_all(format!("{line}\n").as_bytes()).await;
        });
        tasks.lock().push(task);
    }
}
