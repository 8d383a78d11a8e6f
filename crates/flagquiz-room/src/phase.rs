//! The game phase state machine.
//!
//! ```text
//!             ┌──────────── stop ────────────┐
//!             ▼                              │
//! Waiting → Starting → Question ⇄ Results → Finished
//!                                    restart ┘→ Starting
//! ```
//!
//! - **Waiting**: lobby, initial state after creating or joining a room.
//! - **Starting**: lead-in countdown before the first question.
//! - **Question**: a question is open and players may answer.
//! - **Results**: answers and the leaderboard for the last question.
//! - **Finished**: final leaderboard; the host may restart.
//!
//! The server is authoritative, so the reducer still applies an
//! unexpected transition; [`can_transition`] only decides whether it is
//! worth a warning.

use flagquiz_protocol::GamePhase;

use GamePhase::{Finished, Question, Results, Starting, Waiting};

/// Phases reachable from `from` in one step.
pub fn successors(from: GamePhase) -> &'static [GamePhase] {
    match from {
        Waiting => &[Starting],
        Starting => &[Question, Waiting],
        Question => &[Results, Waiting],
        Results => &[Question, Finished, Waiting],
        Finished => &[Starting, Waiting],
    }
}

/// Returns `true` if moving from `from` to `to` is an expected step.
pub fn can_transition(from: GamePhase, to: GamePhase) -> bool {
    successors(from).contains(&to)
}

/// Returns `true` if a game is running in `phase`.
pub fn is_in_game(phase: GamePhase) -> bool {
    matches!(phase, Starting | Question | Results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        assert!(can_transition(Waiting, Starting));
        assert!(can_transition(Starting, Question));
        assert!(can_transition(Question, Results));
        assert!(can_transition(Results, Question));
        assert!(can_transition(Results, Finished));
    }

    #[test]
    fn test_stop_returns_to_waiting() {
        assert!(can_transition(Starting, Waiting));
        assert!(can_transition(Question, Waiting));
        assert!(can_transition(Results, Waiting));
    }

    #[test]
    fn test_restart_from_finished() {
        assert!(can_transition(Finished, Starting));
    }

    #[test]
    fn test_no_skipping() {
        assert!(!can_transition(Waiting, Question));
        assert!(!can_transition(Question, Finished));
        assert!(!can_transition(Question, Question));
        assert!(!can_transition(Waiting, Finished));
    }

    #[test]
    fn test_is_in_game() {
        assert!(!is_in_game(Waiting));
        assert!(is_in_game(Starting));
        assert!(is_in_game(Question));
        assert!(is_in_game(Results));
        assert!(!is_in_game(Finished));
    }
}
