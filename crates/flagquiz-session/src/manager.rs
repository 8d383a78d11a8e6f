//! The connection manager: sole owner of the server connection.
//!
//! Runs as an actor. A [`ConnectionManager`] handle sends commands over
//! a bounded channel; the actor task owns the socket, drives the
//! reconnection policy and reports everything that happens as
//! [`ConnectionEvent`]s. Nothing else in the client opens, closes or
//! writes to the socket.
//!
//! ## Lifecycle
//!
//! ```text
//! connect() ──→ Connecting ──open──→ Connected ──close 1000──→ Disconnected
//!                   ↑                    │
//!                   │                    ├──close 4000──→ Disconnected + Superseded
//!                   │                    │
//!                   └──── backoff ── Reconnecting ←──other close / failed open
//!                                        │
//!                                        └──attempts used up──→ Disconnected + ReconnectFailed
//! ```

use std::future::{Future, pending};
use std::pin::Pin;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use flagquiz_protocol::{ClientMessage, Codec, JsonCodec};
use flagquiz_transport::{
    CloseCode, Connection, ConnectionId, Connector, Incoming, TransportError,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::{Backoff, ConnectionConfig, ConnectionError, ConnectionState};

/// Something the rest of the client should know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The state machine moved.
    StateChanged(ConnectionState),
    /// A text frame from the server, not yet decoded.
    Message(String),
    /// The server closed with 4000: this identity connected elsewhere.
    Superseded,
    /// Every reconnection attempt failed. No more attempts are made.
    ReconnectFailed { attempts: u32 },
    /// A message was dropped because the connection is down. Reported
    /// once per disconnected period.
    SendDropped { kind: &'static str },
}

/// Commands sent to the connection actor.
enum Command {
    Connect,
    Disconnect { reply: oneshot::Sender<()> },
    Send(ClientMessage),
    Shutdown { reply: oneshot::Sender<()> },
}

/// Handle to the connection actor. Cheap to clone.
#[derive(Clone)]
pub struct ConnectionManager {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ConnectionState>,
}

impl ConnectionManager {
    /// Spawns the actor and returns its handle plus the event stream.
    ///
    /// Must be called from inside a Tokio runtime. The actor starts in
    /// [`ConnectionState::Disconnected`]; call [`connect`](Self::connect).
    pub fn spawn<C: Connector>(
        connector: C,
        config: ConnectionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ConnectionEvent>) {
        let config = config.validated();
        let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let actor = ConnectionActor {
            connector: Arc::new(connector),
            backoff: Backoff::new(
                config.base_delay,
                config.max_delay,
                config.max_reconnect_attempts,
            ),
            config,
            codec: JsonCodec,
            commands: cmd_rx,
            events: event_tx,
            state_tx,
            state: ConnectionState::Disconnected,
            conn: None,
            connecting: None,
            reconnect_at: None,
            send_warned: false,
        };
        tokio::spawn(actor.run());

        (
            Self {
                commands: cmd_tx,
                state: state_rx,
            },
            event_rx,
        )
    }

    /// Opens the connection. A no-op unless currently disconnected.
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        self.command(Command::Connect).await
    }

    /// Cancels any pending reconnect and closes with code 1000.
    ///
    /// Returns once the close frame has been written.
    pub async fn disconnect(&self) -> Result<(), ConnectionError> {
        let (reply, done) = oneshot::channel();
        self.command(Command::Disconnect { reply }).await?;
        done.await.map_err(|_| ConnectionError::Unavailable)
    }

    /// Sends a message if connected, otherwise drops it.
    ///
    /// There is no queueing or replay. A drop is reported through
    /// [`ConnectionEvent::SendDropped`].
    pub async fn send(&self, message: ClientMessage) -> Result<(), ConnectionError> {
        self.command(Command::Send(message)).await
    }

    /// Disconnects and stops the actor.
    pub async fn shutdown(&self) -> Result<(), ConnectionError> {
        let (reply, done) = oneshot::channel();
        self.command(Command::Shutdown { reply }).await?;
        done.await.map_err(|_| ConnectionError::Unavailable)
    }

    /// The current state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// A receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    async fn command(&self, cmd: Command) -> Result<(), ConnectionError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| ConnectionError::Unavailable)
    }
}

type PendingConnect<T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send>>;

/// The internal actor state. Runs inside a Tokio task.
struct ConnectionActor<C: Connector> {
    connector: Arc<C>,
    config: ConnectionConfig,
    codec: JsonCodec,
    backoff: Backoff,
    commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    state_tx: watch::Sender<ConnectionState>,
    state: ConnectionState,
    conn: Option<C::Connection>,
    /// In-flight connection attempt.
    connecting: Option<PendingConnect<C::Connection>>,
    /// When the next reconnection attempt is due.
    reconnect_at: Option<Instant>,
    /// Whether a drop was already reported for this disconnected period.
    send_warned: bool,
}

impl<C: Connector> ConnectionActor<C> {
    async fn run(mut self) {
        debug!(url = %self.config.url, "connection actor started");

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Connect) => self.handle_connect(),
                    Some(Command::Disconnect { reply }) => {
                        self.handle_disconnect().await;
                        let _ = reply.send(());
                    }
                    Some(Command::Send(message)) => self.handle_send(message).await,
                    Some(Command::Shutdown { reply }) => {
                        self.commands.close();
                        self.handle_disconnect().await;
                        let _ = reply.send(());
                        break;
                    }
                    None => {
                        self.handle_disconnect().await;
                        break;
                    }
                },
                result = finish_connect(&mut self.connecting), if self.connecting.is_some() => {
                    self.connecting = None;
                    self.handle_connect_result(result);
                }
                incoming = recv_from(&self.conn), if self.conn.is_some() => {
                    self.handle_incoming(incoming);
                }
                () = wait_until(self.reconnect_at), if self.reconnect_at.is_some() => {
                    self.reconnect_at = None;
                    self.start_connect();
                }
            }
        }

        debug!(url = %self.config.url, "connection actor stopped");
    }

    fn handle_connect(&mut self) {
        if self.state != ConnectionState::Disconnected {
            debug!(state = %self.state, "connect ignored");
            return;
        }
        self.backoff.reset();
        self.start_connect();
    }

    fn start_connect(&mut self) {
        let connector = Arc::clone(&self.connector);
        let url = self.config.url.clone();
        self.connecting = Some(Box::pin(async move { connector.connect(&url).await }));
        self.set_state(ConnectionState::Connecting);
    }

    fn handle_connect_result(&mut self, result: Result<C::Connection, TransportError>) {
        match result {
            Ok(conn) => {
                info!(url = %self.config.url, conn_id = %conn.id(), "connected");
                self.conn = Some(conn);
                self.backoff.reset();
                self.send_warned = false;
                self.set_state(ConnectionState::Connected);
            }
            Err(e) => {
                warn!(url = %self.config.url, error = %e, "connection attempt failed");
                self.schedule_reconnect();
            }
        }
    }

    fn handle_incoming(&mut self, incoming: Result<Incoming, TransportError>) {
        let code = match incoming {
            Ok(Incoming::Text(text)) => {
                self.emit(ConnectionEvent::Message(text));
                return;
            }
            Ok(Incoming::Closed(code)) => code,
            Err(e) => {
                warn!(error = %e, "connection read failed");
                CloseCode::ABNORMAL
            }
        };

        let id = self.conn.take().map(|conn| conn.id());
        self.handle_close(id, code);
    }

    fn handle_close(&mut self, id: Option<ConnectionId>, code: CloseCode) {
        if code.is_normal() {
            info!(conn_id = ?id, %code, "connection closed");
            self.set_state(ConnectionState::Disconnected);
        } else if code.is_superseded() {
            warn!(conn_id = ?id, %code, "session superseded by another connection");
            self.set_state(ConnectionState::Disconnected);
            self.emit(ConnectionEvent::Superseded);
        } else {
            warn!(conn_id = ?id, %code, "connection lost");
            self.schedule_reconnect();
        }
    }

    fn schedule_reconnect(&mut self) {
        match self.backoff.next_attempt() {
            Some((attempt, delay)) => {
                info!(attempt, delay_ms = delay.as_millis() as u64, "reconnecting");
                self.reconnect_at = Some(Instant::now() + delay);
                self.set_state(ConnectionState::Reconnecting { attempt });
            }
            None => {
                let attempts = self.backoff.attempts();
                warn!(attempts, "giving up on reconnection");
                self.backoff.reset();
                self.set_state(ConnectionState::Disconnected);
                self.emit(ConnectionEvent::ReconnectFailed { attempts });
            }
        }
    }

    async fn handle_disconnect(&mut self) {
        self.reconnect_at = None;
        self.connecting = None;
        self.backoff.reset();
        if let Some(conn) = self.conn.take() {
            if let Err(e) = conn.close(CloseCode::NORMAL).await {
                debug!(error = %e, "close frame not delivered");
            }
        }
        self.set_state(ConnectionState::Disconnected);
    }

    async fn handle_send(&mut self, message: ClientMessage) {
        let kind = message.kind();
        if !self.state.is_connected() || self.conn.is_none() {
            if self.send_warned {
                debug!(kind, state = %self.state, "message dropped");
            } else {
                warn!(kind, state = %self.state, "not connected, message dropped");
                self.send_warned = true;
                self.emit(ConnectionEvent::SendDropped { kind });
            }
            return;
        }

        let frame = match self.codec.encode(&message, epoch_ms()) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(kind, error = %e, "failed to encode message");
                return;
            }
        };
        let Some(conn) = self.conn.as_ref() else {
            return;
        };
        if let Err(e) = conn.send(frame).await {
            warn!(kind, error = %e, "failed to send message");
        }
    }

    fn set_state(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }
        debug!(from = %self.state, to = %next, "connection state changed");
        self.state = next;
        self.state_tx.send_replace(next);
        self.emit(ConnectionEvent::StateChanged(next));
    }

    fn emit(&self, event: ConnectionEvent) {
        let _ = self.events.send(event);
    }
}

async fn finish_connect<T>(
    pending_connect: &mut Option<PendingConnect<T>>,
) -> Result<T, TransportError> {
    match pending_connect {
        Some(fut) => fut.await,
        None => pending().await,
    }
}

async fn recv_from<T: Connection>(conn: &Option<T>) -> Result<Incoming, TransportError> {
    match conn {
        Some(conn) => conn.recv().await,
        None => pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}
