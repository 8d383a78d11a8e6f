//! Unified error type for the Flagquiz client.

use flagquiz_protocol::ProtocolError;
use flagquiz_quiz::QuizError;
use flagquiz_room::ReduceError;
use flagquiz_session::ConnectionError;
use flagquiz_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `flagquiz` crate you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant generates the `From` impls, so `?`
/// converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum FlagquizError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Question generation or solo-game bookkeeping failed.
    #[error(transparent)]
    Quiz(#[from] QuizError),

    /// A local action or server event did not fit the session.
    #[error(transparent)]
    Reduce(#[from] ReduceError),

    /// The connection actor is gone.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The client event loop has stopped.
    #[error("quiz client is shut down")]
    Closed,

    /// The action changes local state and needs a live connection.
    #[error("not connected to the quiz server")]
    NotConnected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagquiz_protocol::GamePhase;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let flagquiz_err: FlagquizError = err.into();
        assert!(matches!(flagquiz_err, FlagquizError::Transport(_)));
        assert!(flagquiz_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let flagquiz_err: FlagquizError = err.into();
        assert!(matches!(flagquiz_err, FlagquizError::Protocol(_)));
    }

    #[test]
    fn test_from_quiz_error() {
        let flagquiz_err: FlagquizError = QuizError::NoOpenQuestion.into();
        assert!(matches!(flagquiz_err, FlagquizError::Quiz(_)));
    }

    #[test]
    fn test_from_reduce_error() {
        let err = ReduceError::WrongPhase {
            action: "submit-answer",
            phase: GamePhase::Results,
        };
        let flagquiz_err: FlagquizError = err.into();
        assert!(matches!(flagquiz_err, FlagquizError::Reduce(_)));
        assert!(flagquiz_err.to_string().contains("results"));
    }

    #[test]
    fn test_not_connected_message() {
        assert_eq!(
            FlagquizError::NotConnected.to_string(),
            "not connected to the quiz server"
        );
    }

    #[test]
    fn test_from_connection_error() {
        let flagquiz_err: FlagquizError = ConnectionError::Unavailable.into();
        assert!(matches!(flagquiz_err, FlagquizError::Connection(_)));
    }
}
