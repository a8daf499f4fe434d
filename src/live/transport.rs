//! Command transport: one TCP connection to the live process.
//!
//! ```text
//! send() ──frame──▶ writer task ──▶ socket ──▶ live process
//!   │                                              │
//!   └─ oneshot ◀── pending[id] ◀── reader task ◀───┘
//! ```
//!
//! A single writer task keeps frames in send order. Responses may come back
//! in any order and are matched by id. Every send has its own timeout, so a
//! slow command never holds up the others. When the connection drops, every
//! command still waiting on it fails with `LiveError::Transport`; nothing is
//! retried here.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::error::LiveError;
use super::message::{Command, Response, parse_response};

/// How a command competes with others of its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Normal,
    /// Drop the command if one of the same type is still in flight.
    IfNotBusy,
}

type Reply = Result<Response, LiveError>;

struct Pending {
    /// Connection the command was written to.
    generation: u64,
    reply: oneshot::Sender<Reply>,
}

struct Link {
    generation: u64,
    frames: mpsc::UnboundedSender<Vec<u8>>,
    reader: JoinHandle<()>,
}

#[derive(Default)]
struct Shared {
    pending: DashMap<u64, Pending>,
    in_flight: DashMap<String, usize>,
    link: Mutex<Option<Link>>,
}

impl Shared {
    fn resolve(&self, line: &str) {
        let (id, reply) = match parse_response(line) {
            Ok(response) => (response.id, Ok(response)),
            Err((Some(id), err)) => (id, Err(err)),
            Err((None, err)) => {
                crate::log!("live"; "ignoring unreadable frame: {}", err);
                return;
            }
        };

        match self.pending.remove(&id) {
            Some((_, pending)) => {
                let _ = pending.reply.send(reply);
            }
            None => crate::debug!("live"; "late response for #{} dropped", id),
        }
    }

    /// Forget `generation`'s connection and fail everything waiting on it.
    fn drop_link(&self, generation: u64, err: LiveError) {
        {
            let mut link = self.link.lock();
            if link.as_ref().is_some_and(|l| l.generation == generation) {
                *link = None;
            }
        }
        self.fail_pending(generation, err);
    }

    fn fail_pending(&self, generation: u64, err: LiveError) {
        let ids: Vec<u64> = self
            .pending
            .iter()
            .filter(|entry| entry.generation == generation)
            .map(|entry| *entry.key())
            .collect();

        for id in ids {
            if let Some((_, pending)) = self.pending.remove(&id) {
                let _ = pending.reply.send(Err(err.clone()));
            }
        }
    }
}

/// Per-type in-flight counter, released on drop.
struct InFlight {
    shared: Arc<Shared>,
    kind: String,
}

impl InFlight {
    fn acquire(shared: &Arc<Shared>, kind: &str, importance: Importance) -> Result<Self, LiveError> {
        {
            let mut count = shared.in_flight.entry(kind.to_string()).or_insert(0);
            if importance == Importance::IfNotBusy && *count > 0 {
                return Err(LiveError::Busy(kind.to_string()));
            }
            *count += 1;
        }
        Ok(Self {
            shared: Arc::clone(shared),
            kind: kind.to_string(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Some(mut count) = self.shared.in_flight.get_mut(&self.kind) {
            *count = count.saturating_sub(1);
        }
        self.shared
            .in_flight
            .remove_if(&self.kind, |_, count| *count == 0);
    }
}

/// Request/response channel to the live process.
pub struct CommandTransport {
    addr: Mutex<SocketAddr>,
    connect_timeout: Duration,
    next_id: AtomicU64,
    next_generation: AtomicU64,
    /// Held while a connection is being opened, so concurrent first sends share one.
    connecting: tokio::sync::Mutex<()>,
    shared: Arc<Shared>,
}

impl CommandTransport {
    pub fn new(addr: SocketAddr, connect_timeout: Duration) -> Self {
        Self {
            addr: Mutex::new(addr),
            connect_timeout,
            next_id: AtomicU64::new(1),
            next_generation: AtomicU64::new(1),
            connecting: tokio::sync::Mutex::new(()),
            shared: Arc::new(Shared::default()),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        *self.addr.lock()
    }

    /// Point at a new address; an open connection to the old one is closed.
    pub fn set_addr(&self, addr: SocketAddr) {
        let changed = {
            let mut current = self.addr.lock();
            let changed = *current != addr;
            *current = addr;
            changed
        };
        if changed {
            self.disconnect();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.shared.link.lock().is_some()
    }

    /// Open the connection. Connecting while connected is a no-op.
    pub async fn connect(&self) -> Result<(), LiveError> {
        if self.is_connected() {
            return Ok(());
        }
        let _connecting = self.connecting.lock().await;
        if self.is_connected() {
            return Ok(());
        }

        let addr = self.addr();
        let stream = match tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr)).await
        {
            Ok(stream) => stream?,
            Err(_) => return Err(LiveError::Transport(format!("connecting to {addr} timed out"))),
        };
        stream.set_nodelay(true)?;

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let (read_half, write_half) = stream.into_split();
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();

        let reader = tokio::spawn(read_loop(read_half, Arc::clone(&self.shared), generation));
        tokio::spawn(write_loop(write_half, frames_rx, Arc::clone(&self.shared), generation));

        *self.shared.link.lock() = Some(Link {
            generation,
            frames: frames_tx,
            reader,
        });

        crate::debug!("live"; "connected to {}", addr);
        Ok(())
    }

    /// Close the connection and fail everything waiting on it.
    pub fn disconnect(&self) {
        let link = self.shared.link.lock().take();
        if let Some(link) = link {
            link.reader.abort();
            self.shared
                .fail_pending(link.generation, LiveError::Transport("disconnected".into()));
            crate::debug!("live"; "disconnected");
        }
    }

    /// Send a command and wait for its response, up to `timeout`.
    ///
    /// Connects lazily once if no connection is open. A response with
    /// `succeeded: false` is still `Ok`; see `Response::into_success`.
    pub async fn send(
        &self,
        command: &Command,
        timeout: Duration,
        importance: Importance,
    ) -> Result<Response, LiveError> {
        let _in_flight = InFlight::acquire(&self.shared, &command.kind, importance)?;

        let (frames, generation) = self.link_or_connect().await?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = command.to_frame(id)?;
        let reply_rx = self.register(id, generation)?;

        if frames.send(frame).is_err() {
            self.shared.pending.remove(&id);
            return Err(LiveError::Transport("connection closed".into()));
        }
        crate::debug!("live"; "→ #{} {}", id, command.kind);

        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => Err(LiveError::Transport("connection dropped".into())),
            Err(_) => {
                self.shared.pending.remove(&id);
                Err(LiveError::Timeout(command.kind.clone()))
            }
        }
    }

    /// Send and forget. Failures are only logged.
    pub fn fire(self: &Arc<Self>, command: Command, timeout: Duration) {
        let transport = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = transport.send(&command, timeout, Importance::Normal).await {
                crate::debug!("live"; "{} failed: {}", command.kind, err);
            }
        });
    }

    /// Number of commands waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.shared.pending.len()
    }

    /// Park a reply slot for `id` on connection `generation`.
    ///
    /// The link can drop between picking it and inserting here; its
    /// `fail_pending` sweep may then have missed the entry, so the
    /// generation is checked again after the insert.
    pub(super) fn register(
        &self,
        id: u64,
        generation: u64,
    ) -> Result<oneshot::Receiver<Reply>, LiveError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.shared.pending.insert(
            id,
            Pending {
                generation,
                reply: reply_tx,
            },
        );
        if self.generation() != Some(generation) {
            self.shared.pending.remove(&id);
            return Err(LiveError::Transport("connection dropped".into()));
        }
        Ok(reply_rx)
    }

    /// Generation of the open connection, if any.
    pub(super) fn generation(&self) -> Option<u64> {
        self.current_link().map(|(_, generation)| generation)
    }

    async fn link_or_connect(&self) -> Result<(mpsc::UnboundedSender<Vec<u8>>, u64), LiveError> {
        if let Some(link) = self.current_link() {
            return Ok(link);
        }
        self.connect().await.map_err(|err| {
            crate::debug!("live"; "connect failed: {}", err);
            LiveError::NotConnected
        })?;
        self.current_link().ok_or(LiveError::NotConnected)
    }

    fn current_link(&self) -> Option<(mpsc::UnboundedSender<Vec<u8>>, u64)> {
        self.shared
            .link
            .lock()
            .as_ref()
            .map(|link| (link.frames.clone(), link.generation))
    }
}

impl Drop for CommandTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn read_loop(read_half: OwnedReadHalf, shared: Arc<Shared>, generation: u64) {
    let mut lines = BufReader::new(read_half).lines();
    let err = loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => shared.resolve(&line),
            Ok(None) => break LiveError::Transport("connection closed by live process".into()),
            Err(e) => break LiveError::from(e),
        }
    };
    crate::debug!("live"; "{}", err);
    shared.drop_link(generation, err);
}

async fn write_loop(
    mut write_half: OwnedWriteHalf,
    mut frames: mpsc::UnboundedReceiver<Vec<u8>>,
    shared: Arc<Shared>,
    generation: u64,
) {
    while let Some(frame) = frames.recv().await {
        if let Err(e) = write_half.write_all(&frame).await {
            shared.drop_link(generation, LiveError::from(e));
            return;
        }
    }
    let _ = write_half.shutdown().await;
}
