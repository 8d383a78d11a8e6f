/// Failures reported by a [`Connector`](crate::Connector) or
/// [`Connection`](crate::Connection).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// DNS, TCP or the WebSocket upgrade did not go through.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// The socket is already gone.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// A frame could not be written.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// A frame could not be read.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}
