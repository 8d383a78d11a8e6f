//! In-process loopback transport.
//!
//! A [`MemoryConnector`] hands every successful `connect` to a paired
//! [`MemoryListener`], which yields a [`MemoryPeer`] playing the server
//! side. Connect attempts are recorded with their Tokio instant, so tests
//! running on paused time can assert exact backoff spacing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;

use crate::{CloseCode, Connection, ConnectionId, Connector, Incoming, TransportError};

static NEXT_MEMORY_ID: AtomicU64 = AtomicU64::new(1);

/// A frame written by the client side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// A text frame.
    Text(String),
    /// The client closed the connection.
    Close(CloseCode),
}

#[derive(Default)]
struct Script {
    /// Outcomes for upcoming attempts; `false` refuses. Empty means accept.
    outcomes: VecDeque<bool>,
    attempts: Vec<(String, Instant)>,
}

/// Client half of the loopback transport.
#[derive(Clone)]
pub struct MemoryConnector {
    script: Arc<StdMutex<Script>>,
    peers: mpsc::UnboundedSender<MemoryPeer>,
}

/// Server half: receives one [`MemoryPeer`] per accepted connection.
pub struct MemoryListener {
    peers: mpsc::UnboundedReceiver<MemoryPeer>,
}

impl MemoryConnector {
    /// Creates a connector and the listener that sees its connections.
    pub fn pair() -> (Self, MemoryListener) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                script: Arc::new(StdMutex::new(Script::default())),
                peers: tx,
            },
            MemoryListener { peers: rx },
        )
    }

    /// Refuses the next `n` connection attempts.
    pub fn refuse_next(&self, n: usize) {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.outcomes.extend(std::iter::repeat_n(false, n));
    }

    /// Number of connection attempts seen so far (accepted or refused).
    pub fn attempts(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .attempts
            .len()
    }

    /// Instants at which each connection attempt was made.
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .attempts
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }

    fn record(&self, url: &str) -> bool {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.attempts.push((url.to_owned(), Instant::now()));
        script.outcomes.pop_front().unwrap_or(true)
    }
}

impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    async fn connect(&self, url: &str) -> Result<Self::Connection, TransportError> {
        if !self.record(url) {
            return Err(TransportError::ConnectFailed(format!("{url}: connection refused")));
        }

        let (to_server, from_client) = mpsc::unbounded_channel();
        let (to_client, from_server) = mpsc::unbounded_channel();
        let id = ConnectionId::new(NEXT_MEMORY_ID.fetch_add(1, Ordering::Relaxed));

        let peer = MemoryPeer {
            id,
            to_client,
            from_client,
        };
        if self.peers.send(peer).is_err() {
            return Err(TransportError::ConnectFailed("listener dropped".into()));
        }

        Ok(MemoryConnection {
            id,
            to_server,
            from_server: Mutex::new(from_server),
        })
    }
}

impl MemoryListener {
    /// Waits for the next accepted connection.
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.peers.recv().await
    }

    /// Returns an already-accepted connection without waiting.
    pub fn try_accept(&mut self) -> Option<MemoryPeer> {
        self.peers.try_recv().ok()
    }
}

/// The server side of one loopback connection.
pub struct MemoryPeer {
    id: ConnectionId,
    to_client: mpsc::UnboundedSender<Incoming>,
    from_client: mpsc::UnboundedReceiver<ClientFrame>,
}

impl MemoryPeer {
    /// Identifier shared with the client half.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Delivers a text frame to the client.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.to_client.send(Incoming::Text(text.into()));
    }

    /// Closes the connection from the server side with `code`.
    pub fn close(&self, code: CloseCode) {
        let _ = self.to_client.send(Incoming::Closed(code));
    }

    /// Waits for the next frame the client wrote.
    pub async fn recv(&mut self) -> Option<ClientFrame> {
        self.from_client.recv().await
    }

    /// Returns a frame the client already wrote, if any.
    pub fn try_recv(&mut self) -> Option<ClientFrame> {
        self.from_client.try_recv().ok()
    }
}

/// The client side of one loopback connection.
pub struct MemoryConnection {
    id: ConnectionId,
    to_server: mpsc::UnboundedSender<ClientFrame>,
    from_server: Mutex<mpsc::UnboundedReceiver<Incoming>>,
}

impl Connection for MemoryConnection {
    async fn send(&self, text: String) -> Result<(), TransportError> {
        self.to_server
            .send(ClientFrame::Text(text))
            .map_err(|_| TransportError::ConnectionClosed("peer dropped".into()))
    }

    async fn recv(&self) -> Result<Incoming, TransportError> {
        match self.from_server.lock().await.recv().await {
            Some(incoming) => Ok(incoming),
            None => Ok(Incoming::Closed(CloseCode::ABNORMAL)),
        }
    }

    async fn close(&self, code: CloseCode) -> Result<(), TransportError> {
        let _ = self.to_server.send(ClientFrame::Close(code));
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
