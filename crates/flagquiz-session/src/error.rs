//! Error types for the session layer.

/// Errors from talking to the connection manager.
///
/// Transport failures are not errors here: the manager absorbs them
/// into its state machine and reports them as
/// [`ConnectionEvent`](crate::ConnectionEvent)s.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// The manager task has stopped, e.g. after `shutdown`.
    #[error("connection manager is not running")]
    Unavailable,
}
