//! Error types for the quiz layer.

use flagquiz_protocol::{CountryCode, Difficulty};

/// Errors from question generation and solo game bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// A difficulty tier has too few countries to build a four-option question.
    #[error("difficulty {difficulty} has only {size} countries, need at least 4")]
    PoolTooSmall { difficulty: Difficulty, size: usize },

    /// An answer was given while no question was open.
    #[error("no question is open")]
    NoOpenQuestion,

    /// The selected code is not one of the current options.
    #[error("{0} is not an option of the current question")]
    UnknownOption(CountryCode),
}
