//! Client transport abstraction for Flagquiz.
//!
//! Provides the [`Connector`] and [`Connection`] traits that abstract over
//! how the quiz client reaches the multiplayer server. The connection
//! manager above this layer only ever sees text frames and close codes.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client transport via `tokio-tungstenite`
//! - `memory`: in-process loopback transport, used by tests and demos

mod error;
#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "memory")]
pub use memory::{
    ClientFrame, MemoryConnection, MemoryConnector, MemoryListener, MemoryPeer,
};
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketConnector};

use std::fmt;
use std::future::Future;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A WebSocket close status code.
///
/// Only two codes carry meaning for the quiz client: [`CloseCode::NORMAL`]
/// (the user left on purpose) and [`CloseCode::SUPERSEDED`] (the server
/// replaced this session with a newer one for the same identity). Anything
/// else counts as an abnormal close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CloseCode(pub u16);

impl CloseCode {
    /// Clean, user-initiated close.
    pub const NORMAL: Self = Self(1000);
    /// The peer sent a close frame without a status code.
    pub const NO_STATUS: Self = Self(1005);
    /// The connection dropped without a close frame.
    pub const ABNORMAL: Self = Self(1006);
    /// Another session for the same identity took over.
    pub const SUPERSEDED: Self = Self(4000);

    /// `true` for the clean close code.
    pub fn is_normal(self) -> bool {
        self == Self::NORMAL
    }

    /// `true` when the server replaced this session.
    pub fn is_superseded(self) -> bool {
        self == Self::SUPERSEDED
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a connection yields when read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// One text frame.
    Text(String),
    /// The connection is gone. No more frames will arrive.
    Closed(CloseCode),
}

/// Opens outbound connections.
///
/// The returned futures are `Send` so the connection manager can drive
/// them from inside a spawned Tokio task.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Opens a new connection to `url`.
    fn connect(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// A single open connection that exchanges text frames.
pub trait Connection: Send + Sync + 'static {
    /// Sends one text frame to the server.
    fn send(
        &self,
        text: String,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Waits for the next frame or for the connection to close.
    ///
    /// Must be cancel-safe: the connection manager polls it inside
    /// `tokio::select!` and drops it whenever another branch wins.
    fn recv(&self) -> impl Future<Output = Result<Incoming, TransportError>> + Send;

    /// Closes the connection with the given code.
    fn close(
        &self,
        code: CloseCode,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
