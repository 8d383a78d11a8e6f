//! Full game flows through the reducer.

use flagquiz_protocol::{
    Country, CountryCode, GamePhase, GameQuestion, GameState, LeaderboardEntry, PlayerAnswer,
    Room, RoomId, RoomSettings, Timer, User, UserId,
};
use flagquiz_room::{GameEvent, Session, Transition, reduce};

// =========================================================================
// Fixtures
// =========================================================================

fn uid(id: &str) -> UserId {
    UserId(id.into())
}

fn user(id: &str) -> User {
    User {
        id: uid(id),
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

fn question(n: u32, target: &str, start: u64) -> GameQuestion {
    let mut options = vec![country(target)];
    options.extend(["aa", "bb", "cc"].map(country));
    GameQuestion {
        question_number: n,
        country: country(target),
        options,
        start_time: start,
        end_time: start + 15_000,
    }
}

fn leaderboard(scores: &[(&str, u32)]) -> Vec<LeaderboardEntry> {
    scores
        .iter()
        .enumerate()
        .map(|(i, (id, score))| LeaderboardEntry {
            user_id: uid(id),
            username: (*id).into(),
            score: *score,
            rank: i as u32 + 1,
        })
        .collect()
}

fn joined() -> Session {
    let mut session = Session::new();
    reduce(
        &mut session,
        GameEvent::RoomJoined {
            room: Room {
                id: RoomId("room-1".into()),
                invite_code: "QZ4K2P".into(),
                members: vec![user("host"), user("guest")],
                host: uid("host"),
                settings: RoomSettings::default(),
                game_state: GameState::default(),
            },
            user: user("guest"),
        },
    )
    .unwrap();
    session
}

fn step(session: &mut Session, event: GameEvent) -> Transition {
    reduce(session, event).expect("event applies")
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn test_waiting_to_finished() {
    let mut session = joined();
    assert_eq!(session.phase(), Some(GamePhase::Waiting));

    let t = step(
        &mut session,
        GameEvent::GameStarting {
            countdown: 3,
            start_time: 10_000,
        },
    );
    assert!(t.entered(GamePhase::Starting));
    let game = session.game().unwrap();
    assert!(game.is_active);
    assert_eq!(
        game.phase_timer,
        Some(Timer {
            duration: 3,
            start_time: 10_000
        })
    );

    let q1 = question(1, "fr", 13_000);
    let t = step(
        &mut session,
        GameEvent::NewQuestion {
            question: q1.clone(),
            total_questions: 10,
        },
    );
    assert!(t.entered(GamePhase::Question));
    let game = session.game().unwrap();
    assert!(game.used_countries.contains(&CountryCode::from("fr")));
    assert_eq!(game.current_question.as_ref(), Some(&q1));
    assert_eq!(game.phase_timer, Some(q1.timer()));

    let l1 = leaderboard(&[("host", 100), ("guest", 0)]);
    let t = step(
        &mut session,
        GameEvent::QuestionResults {
            player_answers: vec![],
            leaderboard: l1.clone(),
            timer: Some(Timer {
                duration: 5,
                start_time: 28_000,
            }),
        },
    );
    assert!(t.entered(GamePhase::Results));
    assert_eq!(session.game().unwrap().leaderboard, l1);
    assert_eq!(session.room().unwrap().members[0].score, 100);

    let l2 = leaderboard(&[("guest", 250), ("host", 100)]);
    let t = step(
        &mut session,
        GameEvent::GameEnded {
            leaderboard: l2.clone(),
        },
    );
    assert!(t.entered(GamePhase::Finished));
    let game = session.game().unwrap();
    assert!(!game.is_active);
    assert_eq!(game.leaderboard, l2);
    assert!(game.current_question.is_none());
    assert_eq!(session.current_user.as_ref().unwrap().score, 250);
}

#[test]
fn test_new_question_clears_answered_flags_and_answers() {
    let mut session = joined();
    step(
        &mut session,
        GameEvent::NewQuestion {
            question: question(1, "fr", 0),
            total_questions: 2,
        },
    );
    step(&mut session, GameEvent::AnswerSubmitted { user_id: uid("host") });
    flagquiz_room::submit_answer(&mut session, CountryCode::from("fr")).unwrap();
    step(
        &mut session,
        GameEvent::QuestionResults {
            player_answers: vec![PlayerAnswer {
                user_id: uid("host"),
                answer: Some(CountryCode::from("aa")),
                is_correct: false,
                points: 0,
            }],
            leaderboard: leaderboard(&[("guest", 100), ("host", 0)]),
            timer: None,
        },
    );
    assert_eq!(session.game().unwrap().answers.len(), 1);

    step(
        &mut session,
        GameEvent::NewQuestion {
            question: question(2, "de", 20_000),
            total_questions: 2,
        },
    );
    let room = session.room().unwrap();
    assert!(room.members.iter().all(|m| !m.has_answered));
    assert!(room.game_state.answers.is_empty());
    assert!(room.game_state.selected_answer.is_none());
    assert!(!session.current_user.as_ref().unwrap().has_answered);
    assert_eq!(room.game_state.used_countries.len(), 2);
}

#[test]
fn test_question_results_keeps_current_question() {
    let mut session = joined();
    let q = question(4, "jp", 0);
    step(
        &mut session,
        GameEvent::NewQuestion {
            question: q.clone(),
            total_questions: 10,
        },
    );
    step(
        &mut session,
        GameEvent::QuestionResults {
            player_answers: vec![],
            leaderboard: vec![],
            timer: None,
        },
    );
    assert_eq!(session.game().unwrap().current_question, Some(q));
}

#[test]
fn test_stop_returns_to_waiting_and_clears_game() {
    let mut session = joined();
    step(
        &mut session,
        GameEvent::GameStarting {
            countdown: 3,
            start_time: 0,
        },
    );
    step(
        &mut session,
        GameEvent::NewQuestion {
            question: question(1, "br", 3_000),
            total_questions: 10,
        },
    );

    let t = step(&mut session, GameEvent::GameStopped);
    assert!(t.entered(GamePhase::Waiting));
    let game = session.game().unwrap();
    assert!(!game.is_active);
    assert!(game.current_question.is_none());
    assert!(game.used_countries.is_empty());
    assert!(game.leaderboard.is_empty());
    assert!(game.phase_timer.is_none());
}

#[test]
fn test_restart_clears_used_countries() {
    let mut session = joined();
    step(
        &mut session,
        GameEvent::NewQuestion {
            question: question(1, "br", 0),
            total_questions: 1,
        },
    );
    step(&mut session, GameEvent::GameEnded { leaderboard: vec![] });
    let t = step(
        &mut session,
        GameEvent::GameStarting {
            countdown: 3,
            start_time: 50_000,
        },
    );
    assert!(t.entered(GamePhase::Starting));
    assert!(session.game().unwrap().used_countries.is_empty());
}

#[test]
fn test_settings_and_members_are_replaced() {
    let mut session = joined();
    let settings = RoomSettings {
        question_count: 20,
        ..RoomSettings::default()
    };
    let t = step(&mut session, GameEvent::SettingsUpdated(settings.clone()));
    assert!(!t.changed());
    assert_eq!(session.room().unwrap().settings, settings);

    step(
        &mut session,
        GameEvent::MembersChanged(vec![user("host"), user("guest"), user("third")]),
    );
    assert_eq!(session.room().unwrap().members.len(), 3);
}

#[test]
fn test_kicked_then_room_event_is_rejected() {
    let mut session = joined();
    step(&mut session, GameEvent::Kicked);
    assert!(session.current_user.is_none());

    let before = session.clone();
    assert!(reduce(&mut session, GameEvent::HostChanged(uid("guest"))).is_err());
    assert_eq!(session, before);
}
