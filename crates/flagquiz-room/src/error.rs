//! Error types for the room layer.

use flagquiz_protocol::{CountryCode, GamePhase};

/// Errors from applying an event or local action to the session.
///
/// A rejected event leaves the session untouched.
#[derive(Debug, thiserror::Error)]
pub enum ReduceError {
    /// The event needs a room but the session has none.
    #[error("{0} requires a room")]
    NoRoom(&'static str),

    /// The action needs a signed-in user.
    #[error("{0} requires a user")]
    NoUser(&'static str),

    /// The action is not valid in the current phase.
    /// For example, answering while the results screen is shown.
    #[error("{action} is not allowed during {phase}")]
    WrongPhase {
        action: &'static str,
        phase: GamePhase,
    },

    /// The local user already answered the current question.
    #[error("already answered question {0}")]
    AlreadyAnswered(u32),

    /// The chosen code is not one of the current question's options.
    #[error("{0} is not an option of the current question")]
    UnknownOption(CountryCode),
}
