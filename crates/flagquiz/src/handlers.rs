//! The built-in handler table.
//!
//! One function per inbound message type. Each decodes its payload,
//! feeds the matching [`GameEvent`] to the reducer and says which
//! countdowns, notifications and cues should follow. A payload that
//! fails to decode or validate is rejected before the session is
//! touched.

use flagquiz_countdown::TimerPurpose;
use flagquiz_protocol::{
    AnswerSubmitted, AuthSuccess, ClientMessage, Codec, Envelope, GameEnded, GamePhase,
    GameStarting, HostChanged, Kicked, MembersChanged, NewQuestion, QuestionResults, RoomJoined,
    RoomTtlWarning, ServerError, SettingsUpdated, Timer, inbound,
};
use flagquiz_room::{GameEvent, Session, Transition, reduce};

use crate::collaborators::{Cue, Level};
use crate::router::{Context, Effect, MessageRouter};
use crate::FlagquizError;

type Effects = Result<Vec<Effect>, FlagquizError>;

/// Lead-in used when `GAME_STARTING` carries no countdown.
pub const DEFAULT_START_COUNTDOWN_SECS: u32 = 3;

pub(crate) fn register_defaults<C: Codec>(router: &mut MessageRouter<C>) {
    router.register(inbound::AUTH_SUCCESS, auth_success);
    router.register(inbound::CREATE_ROOM_SUCCESS, room_created);
    router.register(inbound::JOIN_ROOM_SUCCESS, room_joined);
    router.register(inbound::USER_JOINED, user_joined);
    router.register(inbound::USER_LEFT, user_left);
    router.register(inbound::USER_KICKED, user_kicked);
    router.register(inbound::HOST_CHANGED, host_changed);
    router.register(inbound::KICKED, kicked);
    router.register(inbound::GAME_STARTING, game_starting);
    router.register(inbound::NEW_QUESTION, new_question);
    router.register(inbound::ANSWER_SUBMITTED, answer_submitted);
    router.register(inbound::QUESTION_RESULTS, question_results);
    router.register(inbound::GAME_ENDED, game_ended);
    router.register(inbound::GAME_STOPPED, game_stopped);
    router.register(inbound::SETTINGS_UPDATED, settings_updated);
    router.register(inbound::ERROR, server_error);
    router.register(inbound::ROOM_TTL_WARNING, room_ttl_warning);
    router.register(inbound::ROOM_EXPIRED, room_expired);
    router.register(inbound::HEARTBEAT, heartbeat);
}

fn apply(session: &mut Session, event: GameEvent) -> Result<Transition, FlagquizError> {
    Ok(reduce(session, event)?)
}

// ---------------------------------------------------------------------------
// Identity and membership
// ---------------------------------------------------------------------------

fn auth_success(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    let AuthSuccess { user_id, username } = envelope.payload()?;
    let username = username
        .or_else(|| cx.session.current_user.as_ref().map(|u| u.username.clone()))
        .unwrap_or_default();
    apply(cx.session, GameEvent::Authenticated { user_id, username })?;
    Ok(Vec::new())
}

fn room_created(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    enter_room(cx, envelope, |code| format!("Room {code} created"))
}

fn room_joined(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    enter_room(cx, envelope, |code| format!("Joined room {code}"))
}

fn enter_room(
    cx: &mut Context<'_>,
    envelope: &Envelope,
    message: fn(&str) -> String,
) -> Effects {
    let RoomJoined { room, user } = envelope.payload()?;
    if let Some(question) = &room.game_state.current_question {
        question.validate()?;
    }
    let text = message(&room.invite_code);
    apply(cx.session, GameEvent::RoomJoined { room, user })?;

    // The snapshot may land mid-game, e.g. after a reconnect.
    let mut effects = vec![Effect::CancelAllTimers];
    effects.extend(resume_countdown(cx.session));
    effects.push(Effect::notify(Level::Success, text));
    Ok(effects)
}

/// The countdown the session's current phase should be running.
fn resume_countdown(session: &Session) -> Option<Effect> {
    let game = session.game()?;
    let purpose = match game.phase {
        GamePhase::Starting => TimerPurpose::StartingCountdown,
        GamePhase::Question => TimerPurpose::QuestionCountdown,
        GamePhase::Results => TimerPurpose::ResultsCountdown,
        GamePhase::Waiting | GamePhase::Finished => return None,
    };
    let timer = game.phase_timer.or_else(|| match game.phase {
        GamePhase::Question => game.current_question.as_ref().map(|q| q.timer()),
        _ => None,
    })?;
    Some(Effect::InstallTimer(purpose, timer))
}

fn user_joined(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    members_changed(cx, envelope, "joined the room")
}

fn user_left(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    members_changed(cx, envelope, "left the room")
}

fn user_kicked(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    members_changed(cx, envelope, "was removed from the room")
}

fn members_changed(cx: &mut Context<'_>, envelope: &Envelope, what: &str) -> Effects {
    let MembersChanged { user, members } = envelope.payload()?;
    apply(cx.session, GameEvent::MembersChanged(members))?;
    Ok(user
        .filter(|u| !cx.session.is_me(&u.id))
        .map(|u| Effect::notify(Level::Info, format!("{} {what}", u.username)))
        .into_iter()
        .collect())
}

fn host_changed(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    let HostChanged { host_id } = envelope.payload()?;
    let promoted = cx.session.is_me(&host_id);
    apply(cx.session, GameEvent::HostChanged(host_id))?;
    if promoted {
        return Ok(vec![Effect::notify(Level::Info, "You are now the host")]);
    }
    Ok(Vec::new())
}

fn kicked(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    let Kicked { reason } = envelope.payload()?;
    apply(cx.session, GameEvent::Kicked)?;
    let reason = reason.unwrap_or_else(|| "You were removed from the room".into());
    Ok(vec![
        Effect::CancelAllTimers,
        Effect::notify(Level::Warning, reason),
    ])
}

fn settings_updated(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    let SettingsUpdated { settings } = envelope.payload()?;
    apply(cx.session, GameEvent::SettingsUpdated(settings))?;
    if cx.session.is_host() {
        return Ok(Vec::new());
    }
    Ok(vec![Effect::notify(Level::Info, "Room settings updated")])
}

// ---------------------------------------------------------------------------
// Game flow
// ---------------------------------------------------------------------------

fn game_starting(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    let GameStarting {
        countdown,
        start_time,
    } = envelope.payload()?;
    let timer = Timer {
        duration: countdown.unwrap_or(DEFAULT_START_COUNTDOWN_SECS),
        start_time: start_time.unwrap_or(cx.now_ms),
    };
    apply(
        cx.session,
        GameEvent::GameStarting {
            countdown: timer.duration,
            start_time: timer.start_time,
        },
    )?;
    Ok(vec![
        Effect::CancelAllTimers,
        Effect::InstallTimer(TimerPurpose::StartingCountdown, timer),
        Effect::PlayCue(Cue::GameStart),
    ])
}

fn new_question(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    let NewQuestion {
        question,
        total_questions,
    } = envelope.payload()?;
    question.validate()?;
    let timer = question.timer();
    apply(
        cx.session,
        GameEvent::NewQuestion {
            question,
            total_questions,
        },
    )?;
    Ok(vec![
        Effect::CancelTimer(TimerPurpose::StartingCountdown),
        Effect::CancelTimer(TimerPurpose::ResultsCountdown),
        Effect::InstallTimer(TimerPurpose::QuestionCountdown, timer),
        Effect::PlayCue(Cue::NewQuestion),
    ])
}

fn answer_submitted(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    let AnswerSubmitted { user_id, .. } = envelope.payload()?;
    apply(cx.session, GameEvent::AnswerSubmitted { user_id })?;
    Ok(Vec::new())
}

fn question_results(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    let QuestionResults {
        player_answers,
        leaderboard,
        timer,
        correct_answer,
    } = envelope.payload()?;

    let timer = timer.unwrap_or_else(|| Timer {
        duration: cx
            .session
            .room()
            .map_or(0, |room| room.settings.results_duration),
        start_time: cx.now_ms,
    });

    // Our own row decides the cue; without one, compare our pick.
    let mine = cx
        .session
        .user_id()
        .and_then(|me| player_answers.iter().find(|a| &a.user_id == me))
        .map(|a| a.is_correct);
    let picked = cx.session.game().and_then(|g| g.selected_answer.clone());
    let correct = mine.or_else(|| Some(picked? == correct_answer?));

    apply(
        cx.session,
        GameEvent::QuestionResults {
            player_answers,
            leaderboard,
            timer: Some(timer),
        },
    )?;

    let mut effects = vec![
        Effect::CancelTimer(TimerPurpose::QuestionCountdown),
        Effect::InstallTimer(TimerPurpose::ResultsCountdown, timer),
    ];
    match correct {
        Some(true) => effects.push(Effect::PlayCue(Cue::Correct)),
        Some(false) => effects.push(Effect::PlayCue(Cue::Incorrect)),
        None => {}
    }
    Ok(effects)
}

fn game_ended(cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    let GameEnded { leaderboard, .. } = envelope.payload()?;
    let message = match leaderboard.first() {
        Some(winner) if cx.session.is_me(&winner.user_id) => "Game over. You won!".to_owned(),
        Some(winner) => format!("Game over. {} wins!", winner.username),
        None => "Game over".to_owned(),
    };
    apply(cx.session, GameEvent::GameEnded { leaderboard })?;
    Ok(vec![
        Effect::CancelAllTimers,
        Effect::PlayCue(Cue::GameOver),
        Effect::notify(Level::Info, message),
    ])
}

fn game_stopped(cx: &mut Context<'_>, _envelope: &Envelope) -> Effects {
    apply(cx.session, GameEvent::GameStopped)?;
    Ok(vec![
        Effect::CancelAllTimers,
        Effect::notify(Level::Info, "The host stopped the game"),
    ])
}

// ---------------------------------------------------------------------------
// Server housekeeping
// ---------------------------------------------------------------------------

fn server_error(_cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    let ServerError { message, code } = envelope.payload()?;
    Ok(vec![Effect::notify(
        Level::Error,
        describe_error(code.as_deref(), &message),
    )])
}

/// User-facing text for a server `ERROR`.
///
/// Known codes get a fixed message; anything else shows what the server
/// sent.
pub fn describe_error(code: Option<&str>, message: &str) -> String {
    let text = match code {
        Some("ROOM_NOT_FOUND") => "Room not found. Check the invite code and try again.",
        Some("ROOM_FULL") => "This room is full.",
        Some("GAME_ALREADY_STARTED") => "The game has already started.",
        Some("INVALID_USERNAME") => "That username is not allowed.",
        Some("NOT_HOST") => "Only the host can do that.",
        Some("RATE_LIMITED") => "Too many requests. Please slow down.",
        _ if message.is_empty() => "Something went wrong.",
        _ => message,
    };
    text.to_owned()
}

fn room_ttl_warning(_cx: &mut Context<'_>, envelope: &Envelope) -> Effects {
    let RoomTtlWarning { remaining_ms, .. } = envelope.payload()?;
    let minutes = remaining_ms.div_ceil(60_000).max(1);
    let unit = if minutes == 1 { "minute" } else { "minutes" };
    Ok(vec![Effect::notify(
        Level::Warning,
        format!("Room closes in {minutes} {unit} due to inactivity"),
    )])
}

fn room_expired(cx: &mut Context<'_>, _envelope: &Envelope) -> Effects {
    apply(cx.session, GameEvent::RoomExpired)?;
    Ok(vec![
        Effect::CancelAllTimers,
        Effect::notify(Level::Warning, "Room expired due to inactivity"),
    ])
}

fn heartbeat(_cx: &mut Context<'_>, _envelope: &Envelope) -> Effects {
    Ok(vec![Effect::Send(ClientMessage::HeartbeatResponse {})])
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagquiz_protocol::{
        Country, CountryCode, GameQuestion, GameState, Room, RoomId, RoomSettings, User, UserId,
    };
    use serde_json::json;

    fn user(id: &str) -> User {
        User {
            id: UserId(id.into()),
            username: id.into(),
            is_host: id == "host",
            has_answered: false,
            score: 0,
        }
    }

    fn country(code: &str) -> Country {
        Country {
            code: CountryCode::from(code),
            name: code.to_uppercase(),
            region: None,
        }
    }

    fn question(codes: &[&str]) -> GameQuestion {
        GameQuestion {
            question_number: 1,
            country: country(codes[0]),
            options: codes.iter().map(|c| country(c)).collect(),
            start_time: 10_000,
            end_time: 25_000,
        }
    }

    fn room(game_state: GameState) -> Room {
        Room {
            id: RoomId("r1".into()),
            invite_code: "QZ4K2P".into(),
            members: vec![user("host"), user("me")],
            host: UserId("host".into()),
            settings: RoomSettings::default(),
            game_state,
        }
    }

    fn envelope(kind: &str, data: serde_json::Value) -> Envelope {
        Envelope {
            kind: kind.into(),
            data,
            timestamp: None,
        }
    }

    fn run(session: &mut Session, kind: &str, data: serde_json::Value) -> Vec<Effect> {
        let router = MessageRouter::new();
        let mut cx = Context {
            session,
            now_ms: 50_000,
        };
        router.dispatch_envelope(&mut cx, &envelope(kind, data))
    }

    fn joined() -> Session {
        let mut session = Session::new();
        let data = json!({ "room": room(GameState::default()), "user": user("me") });
        run(&mut session, inbound::JOIN_ROOM_SUCCESS, data);
        session
    }

    #[test]
    fn test_heartbeat_replies_once() {
        let effects = run(&mut Session::new(), inbound::HEARTBEAT, json!({}));
        assert_eq!(effects, vec![Effect::Send(ClientMessage::HeartbeatResponse {})]);
    }

    #[test]
    fn test_known_error_codes_are_described() {
        assert_eq!(
            describe_error(Some("ROOM_FULL"), "full"),
            "This room is full."
        );
        assert_eq!(describe_error(Some("WHATEVER"), "boom"), "boom");
        assert_eq!(describe_error(None, ""), "Something went wrong.");

        let effects = run(
            &mut Session::new(),
            inbound::ERROR,
            json!({ "message": "no", "code": "NOT_HOST" }),
        );
        assert_eq!(
            effects,
            vec![Effect::Notify(Level::Error, "Only the host can do that.".into())]
        );
    }

    #[test]
    fn test_ttl_warning_rounds_up_to_minutes() {
        let effects = run(
            &mut Session::new(),
            inbound::ROOM_TTL_WARNING,
            json!({ "expiresAt": 0, "remainingMs": 90_000 }),
        );
        assert_eq!(
            effects,
            vec![Effect::Notify(
                Level::Warning,
                "Room closes in 2 minutes due to inactivity".into()
            )]
        );
    }

    #[test]
    fn test_game_starting_defaults_to_now() {
        let mut session = joined();
        let effects = run(&mut session, inbound::GAME_STARTING, json!({}));
        let timer = Timer {
            duration: DEFAULT_START_COUNTDOWN_SECS,
            start_time: 50_000,
        };
        assert!(effects.contains(&Effect::InstallTimer(TimerPurpose::StartingCountdown, timer)));
        assert_eq!(session.phase(), Some(GamePhase::Starting));
    }

    #[test]
    fn test_new_question_replaces_countdowns() {
        let mut session = joined();
        let q = question(&["fr", "be", "it", "ie"]);
        let effects = run(
            &mut session,
            inbound::NEW_QUESTION,
            json!({ "question": q, "totalQuestions": 10 }),
        );
        assert_eq!(
            &effects[..3],
            &[
                Effect::CancelTimer(TimerPurpose::StartingCountdown),
                Effect::CancelTimer(TimerPurpose::ResultsCountdown),
                Effect::InstallTimer(TimerPurpose::QuestionCountdown, q.timer()),
            ]
        );
    }

    #[test]
    fn test_invalid_question_is_rejected_untouched() {
        let mut session = joined();
        let before = session.clone();
        let effects = run(
            &mut session,
            inbound::NEW_QUESTION,
            json!({ "question": question(&["fr", "be", "it"]), "totalQuestions": 10 }),
        );
        assert!(effects.is_empty());
        assert_eq!(session, before);
    }

    #[test]
    fn test_results_cue_follows_own_answer() {
        let mut session = joined();
        let q = question(&["fr", "be", "it", "ie"]);
        run(
            &mut session,
            inbound::NEW_QUESTION,
            json!({ "question": q, "totalQuestions": 10 }),
        );
        let effects = run(
            &mut session,
            inbound::QUESTION_RESULTS,
            json!({
                "playerAnswers": [
                    { "userId": "me", "answer": "be", "isCorrect": false, "points": 0 },
                    { "userId": "host", "answer": "fr", "isCorrect": true, "points": 100 }
                ],
                "leaderboard": []
            }),
        );
        assert!(effects.contains(&Effect::PlayCue(Cue::Incorrect)));
        let results_timer = Timer {
            duration: RoomSettings::default().results_duration,
            start_time: 50_000,
        };
        assert!(effects.contains(&Effect::InstallTimer(
            TimerPurpose::ResultsCountdown,
            results_timer
        )));
    }

    #[test]
    fn test_results_cue_falls_back_to_selected_answer() {
        let mut session = joined();
        let q = question(&["fr", "be", "it", "ie"]);
        run(
            &mut session,
            inbound::NEW_QUESTION,
            json!({ "question": q, "totalQuestions": 10 }),
        );
        flagquiz_room::submit_answer(&mut session, CountryCode::from("fr")).unwrap();
        let effects = run(
            &mut session,
            inbound::QUESTION_RESULTS,
            json!({ "leaderboard": [], "correctAnswer": "fr" }),
        );
        assert!(effects.contains(&Effect::PlayCue(Cue::Correct)));
    }

    #[test]
    fn test_snapshot_mid_question_resumes_countdown() {
        let q = question(&["fr", "be", "it", "ie"]);
        let game = GameState {
            is_active: true,
            phase: GamePhase::Question,
            current_question: Some(q.clone()),
            ..GameState::default()
        };
        let mut session = Session::new();
        let effects = run(
            &mut session,
            inbound::JOIN_ROOM_SUCCESS,
            json!({ "room": room(game), "user": user("me") }),
        );
        assert_eq!(effects[0], Effect::CancelAllTimers);
        assert_eq!(
            effects[1],
            Effect::InstallTimer(TimerPurpose::QuestionCountdown, q.timer())
        );
    }

    #[test]
    fn test_membership_notice_skips_self() {
        let mut session = joined();
        let members = vec![user("host"), user("me"), user("third")];
        let effects = run(
            &mut session,
            inbound::USER_JOINED,
            json!({ "user": user("third"), "members": members }),
        );
        assert_eq!(
            effects,
            vec![Effect::Notify(Level::Info, "third joined the room".into())]
        );

        let effects = run(
            &mut session,
            inbound::USER_JOINED,
            json!({ "user": user("me"), "members": members }),
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_kicked_clears_session_and_timers() {
        let mut session = joined();
        let effects = run(&mut session, inbound::KICKED, json!({ "reason": "bye" }));
        assert_eq!(
            effects,
            vec![
                Effect::CancelAllTimers,
                Effect::Notify(Level::Warning, "bye".into())
            ]
        );
        assert_eq!(session, Session::new());
    }
}
