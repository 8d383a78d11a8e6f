//! The session reducer.
//!
//! Every server event and local action passes through here. Reduction is
//! synchronous and pure: it touches nothing but the [`Session`] it is
//! given and reports the phase change so the caller can start or cancel
//! countdowns.

use flagquiz_protocol::{
    CountryCode, GamePhase, GameState, LeaderboardEntry, Room, Timer, User, UserId,
};
use tracing::{debug, warn};

use crate::{GameEvent, ReduceError, Session, Transition, phase};

/// Applies `event` to `session`.
///
/// Events that need a room are rejected without mutation when the
/// session has none. Unexpected phase jumps are logged but applied: the
/// server is the authority on game flow.
pub fn reduce(session: &mut Session, event: GameEvent) -> Result<Transition, ReduceError> {
    let name = event.name();
    if event.requires_room() && session.current_room.is_none() {
        return Err(ReduceError::NoRoom(name));
    }
    let from = session.phase();

    match event {
        GameEvent::Authenticated { user_id, username } => {
            authenticate(session, user_id, username);
        }
        GameEvent::RoomJoined { room, user } => {
            session.current_user = Some(user);
            session.current_room = Some(room);
            session.sync_self_from_members();
        }
        GameEvent::Kicked => session.clear(),
        GameEvent::RoomExpired => session.leave_room(),
        event => {
            let Some(room) = session.current_room.as_mut() else {
                return Err(ReduceError::NoRoom(name));
            };
            apply_to_room(room, event);
            session.sync_self_from_members();
        }
    }

    let transition = Transition {
        from,
        to: session.phase(),
    };
    if let (Some(from), Some(to)) = (transition.from, transition.to) {
        if from != to && !phase::can_transition(from, to) {
            warn!(event = name, %from, %to, "unexpected phase transition");
        }
    }
    debug!(
        event = name,
        from = ?transition.from,
        to = ?transition.to,
        "session reduced"
    );
    Ok(transition)
}

/// Records the local user's pick for the open question.
///
/// Returns the question number to send with the answer.
pub fn submit_answer(session: &mut Session, answer: CountryCode) -> Result<u32, ReduceError> {
    const ACTION: &str = "submit-answer";

    let user_id = session.user_id().cloned().ok_or(ReduceError::NoUser(ACTION))?;
    let room = session
        .current_room
        .as_mut()
        .ok_or(ReduceError::NoRoom(ACTION))?;

    let game = &mut room.game_state;
    let question = match (&game.current_question, game.phase) {
        (Some(q), GamePhase::Question) => q,
        (_, phase) => {
            return Err(ReduceError::WrongPhase {
                action: ACTION,
                phase,
            });
        }
    };
    if game.selected_answer.is_some() {
        return Err(ReduceError::AlreadyAnswered(question.question_number));
    }
    if !question.options.iter().any(|c| c.code == answer) {
        return Err(ReduceError::UnknownOption(answer));
    }

    let number = question.question_number;
    debug!(question = number, %answer, "answer selected");
    game.selected_answer = Some(answer);
    if let Some(me) = room.member_mut(&user_id) {
        me.has_answered = true;
    }
    if let Some(user) = &mut session.current_user {
        user.has_answered = true;
    }
    Ok(number)
}

/// Leaves the current room locally. The identity is kept.
pub fn leave_room(session: &mut Session) -> Result<Transition, ReduceError> {
    let Some(from) = session.phase() else {
        return Err(ReduceError::NoRoom("leave-room"));
    };
    session.leave_room();
    debug!(%from, "left room");
    Ok(Transition {
        from: Some(from),
        to: None,
    })
}

fn authenticate(session: &mut Session, user_id: UserId, username: String) {
    match &mut session.current_user {
        Some(user) if user.id == user_id => user.username = username,
        slot => {
            *slot = Some(User {
                id: user_id,
                username,
                is_host: false,
                has_answered: false,
                score: 0,
            });
        }
    }
    session.sync_self_from_members();
}

fn apply_to_room(room: &mut Room, event: GameEvent) {
    match event {
        GameEvent::SettingsUpdated(settings) => room.settings = settings,
        GameEvent::MembersChanged(members) => room.members = members,
        GameEvent::HostChanged(host) => {
            for member in &mut room.members {
                member.is_host = member.id == host;
            }
            room.host = host;
        }
        GameEvent::GameStarting {
            countdown,
            start_time,
        } => {
            let game = &mut room.game_state;
            *game = GameState {
                is_active: true,
                phase: GamePhase::Starting,
                total_questions: room.settings.question_count,
                phase_timer: Some(Timer {
                    duration: countdown,
                    start_time,
                }),
                ..GameState::default()
            };
            clear_answered(&mut room.members);
        }
        GameEvent::NewQuestion {
            question,
            total_questions,
        } => {
            let game = &mut room.game_state;
            game.is_active = true;
            game.phase = GamePhase::Question;
            game.current_question_index = question.question_number;
            game.total_questions = total_questions;
            game.answers.clear();
            game.selected_answer = None;
            game.used_countries.insert(question.country.code.clone());
            game.phase_timer = Some(question.timer());
            game.current_question = Some(question);
            clear_answered(&mut room.members);
        }
        GameEvent::AnswerSubmitted { user_id } => match room.member_mut(&user_id) {
            Some(member) => member.has_answered = true,
            None => debug!(%user_id, "answer from unknown member"),
        },
        GameEvent::QuestionResults {
            player_answers,
            leaderboard,
            timer,
        } => {
            apply_scores(&mut room.members, &leaderboard);
            let game = &mut room.game_state;
            game.phase = GamePhase::Results;
            game.answers = player_answers;
            game.leaderboard = leaderboard;
            game.phase_timer = timer;
        }
        GameEvent::GameEnded { leaderboard } => {
            apply_scores(&mut room.members, &leaderboard);
            let game = &mut room.game_state;
            game.phase = GamePhase::Finished;
            game.is_active = false;
            game.current_question = None;
            game.selected_answer = None;
            game.phase_timer = None;
            game.leaderboard = leaderboard;
        }
        GameEvent::GameStopped => {
            room.game_state = GameState {
                total_questions: room.settings.question_count,
                ..GameState::default()
            };
            clear_answered(&mut room.members);
        }
        GameEvent::Authenticated { .. }
        | GameEvent::RoomJoined { .. }
        | GameEvent::Kicked
        | GameEvent::RoomExpired => {}
    }
}

fn clear_answered(members: &mut [User]) {
    for member in members {
        member.has_answered = false;
    }
}

fn apply_scores(members: &mut [User], leaderboard: &[LeaderboardEntry]) {
    for entry in leaderboard {
        if let Some(member) = members.iter_mut().find(|m| m.id == entry.user_id) {
            member.score = entry.score;
        }
    }
}
