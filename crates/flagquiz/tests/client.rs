//! End-to-end tests for the quiz client over the in-memory transport.

use std::time::Duration;

use flagquiz::prelude::*;
use flagquiz_protocol::{Codec, Envelope, JsonCodec, inbound};
use flagquiz_transport::{ClientFrame, CloseCode, MemoryConnector, MemoryListener, MemoryPeer};
use serde_json::{Value, json};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(60);
const START_MS: u64 = 1_700_000_000_000;

// =========================================================================
// Helpers
// =========================================================================

struct ChannelNotifier(UnboundedSender<(Level, String)>);

impl Notifier for ChannelNotifier {
    fn notify(&self, level: Level, message: &str) {
        let _ = self.0.send((level, message.to_owned()));
    }
}

struct ChannelAudio(UnboundedSender<Cue>);

impl AudioCues for ChannelAudio {
    fn play_cue(&self, cue: Cue) {
        let _ = self.0.send(cue);
    }
}

struct Harness {
    client: QuizClient,
    events: UnboundedReceiver<ClientEvent>,
    connector: MemoryConnector,
    listener: MemoryListener,
    notes: UnboundedReceiver<(Level, String)>,
    cues: UnboundedReceiver<Cue>,
    clock: ManualClock,
}

fn harness_with(sound_effects: bool) -> Harness {
    let (connector, listener) = MemoryConnector::pair();
    let (note_tx, notes) = mpsc::unbounded_channel();
    let (cue_tx, cues) = mpsc::unbounded_channel();
    let clock = ManualClock::new(START_MS);

    let (client, events) = QuizClient::builder()
        .url("mem://quiz")
        .notifier(ChannelNotifier(note_tx))
        .audio(ChannelAudio(cue_tx))
        .settings(StaticSettings { sound_effects })
        .clock(clock.clone())
        .build(connector.clone());

    Harness {
        client,
        events,
        connector,
        listener,
        notes,
        cues,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(true)
}

fn frame(kind: &str, data: Value) -> String {
    json!({ "type": kind, "data": data }).to_string()
}

fn user(id: &str) -> Value {
    json!({ "id": id, "username": id, "isHost": id == "host", "hasAnswered": false, "score": 0 })
}

fn room_snapshot() -> Value {
    json!({
        "room": {
            "id": "room-1",
            "inviteCode": "QZ4K2P",
            "members": [user("host"), user("me")],
            "host": "host",
            "settings": { "difficulty": "easy", "questionCount": 2 }
        },
        "user": user("me")
    })
}

fn question(n: u32, target: &str, start: u64) -> Value {
    let country = |code: &str| json!({ "code": code, "name": code.to_uppercase() });
    let mut options = vec![country(target)];
    options.extend(["aa", "bb", "cc"].map(country));
    json!({
        "question": {
            "questionNumber": n,
            "country": country(target),
            "options": options,
            "startTime": start,
            "endTime": start + 10_000
        },
        "totalQuestions": 2
    })
}

impl Harness {
    async fn connected(&mut self) -> MemoryPeer {
        self.client.connect().await.unwrap();
        let peer = self.listener.accept().await.expect("accepted");
        self.event(|e| *e == ClientEvent::Connection(ConnectionState::Connected))
            .await;
        peer
    }

    /// Connects and joins the standard room.
    async fn in_room(&mut self) -> MemoryPeer {
        let peer = self.connected().await;
        peer.send_text(frame(inbound::JOIN_ROOM_SUCCESS, room_snapshot()));
        self.phase(Some(GamePhase::Waiting)).await;
        peer
    }

    async fn event(&mut self, done: impl Fn(&ClientEvent) -> bool) -> ClientEvent {
        loop {
            let event = timeout(WAIT, self.events.recv())
                .await
                .expect("event should arrive")
                .expect("client alive");
            if done(&event) {
                return event;
            }
        }
    }

    async fn phase(&mut self, phase: Option<GamePhase>) {
        let mut session = self.client.subscribe_session();
        timeout(WAIT, session.wait_for(|s| s.phase() == phase))
            .await
            .expect("phase should be reached")
            .expect("client alive");
    }

    async fn note(&mut self) -> (Level, String) {
        timeout(WAIT, self.notes.recv())
            .await
            .expect("notification should arrive")
            .expect("client alive")
    }

    async fn note_matching(&mut self, level: Level, text: &str) {
        loop {
            let (l, message) = self.note().await;
            if l == level && message.contains(text) {
                return;
            }
        }
    }

    async fn cue(&mut self) -> Cue {
        timeout(WAIT, self.cues.recv())
            .await
            .expect("cue should arrive")
            .expect("client alive")
    }
}

async fn sent(peer: &mut MemoryPeer) -> Envelope {
    let Some(ClientFrame::Text(text)) = timeout(WAIT, peer.recv()).await.expect("frame") else {
        panic!("expected a text frame");
    };
    JsonCodec.decode(&text).unwrap()
}

// =========================================================================
// Protocol housekeeping
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_heartbeat_gets_exactly_one_response() {
    let mut h = harness();
    let mut peer = h.connected().await;

    peer.send_text(frame(inbound::HEARTBEAT, json!({})));
    assert_eq!(sent(&mut peer).await.kind, "HEARTBEAT_RESPONSE");

    sleep(Duration::from_millis(50)).await;
    assert!(peer.try_recv().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_and_malformed_frames_are_ignored() {
    let mut h = harness();
    let mut peer = h.connected().await;

    peer.send_text("{ definitely not json");
    peer.send_text(frame("SOMETHING_NEW", json!({ "x": 1 })));
    peer.send_text(frame(inbound::NEW_QUESTION, json!({ "question": 7 })));
    peer.send_text(frame(inbound::HEARTBEAT, json!({})));

    assert_eq!(sent(&mut peer).await.kind, "HEARTBEAT_RESPONSE");
    assert_eq!(h.client.session(), Session::new());
}

#[tokio::test(start_paused = true)]
async fn test_server_error_is_described() {
    let mut h = harness();
    let peer = h.connected().await;

    peer.send_text(frame(
        inbound::ERROR,
        json!({ "message": "room 12 is full", "code": "ROOM_FULL" }),
    ));
    assert_eq!(h.note().await, (Level::Error, "This room is full.".into()));
}

// =========================================================================
// Game flow
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_full_game_updates_session() {
    let mut h = harness();
    let mut peer = h.connected().await;

    peer.send_text(frame(
        inbound::AUTH_SUCCESS,
        json!({ "userId": "me", "username": "me" }),
    ));
    peer.send_text(frame(inbound::JOIN_ROOM_SUCCESS, room_snapshot()));
    h.phase(Some(GamePhase::Waiting)).await;
    assert!(!h.client.session().current_user.unwrap().is_host);

    peer.send_text(frame(
        inbound::GAME_STARTING,
        json!({ "countdown": 3, "startTime": START_MS }),
    ));
    h.phase(Some(GamePhase::Starting)).await;
    assert_eq!(h.cue().await, Cue::GameStart);

    peer.send_text(frame(inbound::NEW_QUESTION, question(1, "fr", START_MS + 3_000)));
    h.phase(Some(GamePhase::Question)).await;

    h.client.submit_answer(CountryCode::from("fr")).await.unwrap();
    let answer = sent(&mut peer).await;
    assert_eq!(answer.kind, "SUBMIT_ANSWER");
    assert_eq!(answer.data["answer"], "fr");
    assert_eq!(answer.data["questionId"], 1);
    assert!(h.client.session().current_user.unwrap().has_answered);

    peer.send_text(frame(
        inbound::QUESTION_RESULTS,
        json!({
            "playerAnswers": [{ "userId": "me", "answer": "fr", "isCorrect": true, "points": 100 }],
            "leaderboard": [
                { "userId": "me", "username": "me", "score": 100, "rank": 1 },
                { "userId": "host", "username": "host", "score": 0, "rank": 2 }
            ],
            "timer": { "duration": 5, "startTime": START_MS + 13_000 }
        }),
    ));
    h.phase(Some(GamePhase::Results)).await;
    loop {
        if h.cue().await == Cue::Correct {
            break;
        }
    }
    let session = h.client.session();
    assert_eq!(session.current_user.as_ref().unwrap().score, 100);
    assert!(session.game().unwrap().current_question.is_some());

    peer.send_text(frame(
        inbound::GAME_ENDED,
        json!({ "leaderboard": [{ "userId": "me", "username": "me", "score": 100, "rank": 1 }] }),
    ));
    let event = h
        .event(|e| matches!(e, ClientEvent::PhaseChanged(t) if t.to == Some(GamePhase::Finished)))
        .await;
    assert_eq!(
        event,
        ClientEvent::PhaseChanged(Transition {
            from: Some(GamePhase::Results),
            to: Some(GamePhase::Finished),
        })
    );
    h.note_matching(Level::Info, "You won").await;
    assert!(h.client.session().game().unwrap().current_question.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_answer_outside_question_is_rejected_and_not_sent() {
    let mut h = harness();
    let mut peer = h.in_room().await;

    let err = h
        .client
        .submit_answer(CountryCode::from("fr"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlagquizError::Reduce(_)));

    sleep(Duration::from_millis(50)).await;
    assert!(peer.try_recv().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_question_countdown_reports_time_up() {
    let mut h = harness();
    let peer = h.in_room().await;

    peer.send_text(frame(inbound::NEW_QUESTION, question(1, "jp", START_MS)));
    h.phase(Some(GamePhase::Question)).await;

    let remaining = h
        .client
        .countdown(TimerPurpose::QuestionCountdown)
        .await
        .unwrap()
        .expect("question countdown running");
    assert_eq!(*remaining.borrow(), 10);

    h.clock.advance(Duration::from_secs(11));
    let event = h.event(|e| matches!(e, ClientEvent::TimeUp(_))).await;
    assert_eq!(event, ClientEvent::TimeUp(TimerPurpose::QuestionCountdown));
}

#[tokio::test(start_paused = true)]
async fn test_new_question_supersedes_previous_countdown() {
    let mut h = harness();
    let peer = h.in_room().await;

    peer.send_text(frame(inbound::NEW_QUESTION, question(1, "jp", START_MS)));
    peer.send_text(frame(
        inbound::NEW_QUESTION,
        question(2, "kr", START_MS + 8_000),
    ));
    let mut session = h.client.subscribe_session();
    timeout(
        WAIT,
        session.wait_for(|s| {
            s.game()
                .and_then(|g| g.current_question.as_ref())
                .is_some_and(|q| q.question_number == 2)
        }),
    )
    .await
    .unwrap()
    .unwrap();

    // Past the first deadline but not the second.
    h.clock.advance(Duration::from_secs(12));
    sleep(Duration::from_secs(1)).await;
    assert!(!std::iter::from_fn(|| h.events.try_recv().ok())
        .any(|e| matches!(e, ClientEvent::TimeUp(_))));
}

#[tokio::test(start_paused = true)]
async fn test_sound_effects_off_plays_nothing() {
    let mut h = harness_with(false);
    let peer = h.in_room().await;

    peer.send_text(frame(inbound::GAME_STARTING, json!({ "countdown": 3 })));
    h.phase(Some(GamePhase::Starting)).await;
    sleep(Duration::from_millis(50)).await;
    assert!(h.cues.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_leave_room_clears_room_and_tells_server() {
    let mut h = harness();
    let mut peer = h.in_room().await;

    h.client.leave_room().await.unwrap();
    assert_eq!(sent(&mut peer).await.kind, "LEAVE_ROOM");
    let session = h.client.session();
    assert!(session.current_room.is_none());
    assert!(session.current_user.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_kicked_clears_session() {
    let mut h = harness();
    let peer = h.in_room().await;

    peer.send_text(frame(inbound::KICKED, json!({ "reason": "Removed by host" })));
    h.phase(None).await;
    h.note_matching(Level::Warning, "Removed by host").await;
    assert!(h.client.session().current_user.is_none());
}

// =========================================================================
// Connection
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_superseded_close_notifies_user() {
    let mut h = harness();
    let peer = h.connected().await;

    peer.close(CloseCode::SUPERSEDED);
    h.event(|e| *e == ClientEvent::Superseded).await;
    h.note_matching(Level::Warning, "opened somewhere else").await;
    assert_eq!(h.client.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_close_drops_room() {
    let mut h = harness();
    let peer = h.in_room().await;

    peer.close(CloseCode::SUPERSEDED);
    let event = h
        .event(|e| matches!(e, ClientEvent::PhaseChanged(t) if t.to.is_none()))
        .await;
    assert_eq!(
        event,
        ClientEvent::PhaseChanged(Transition {
            from: Some(GamePhase::Waiting),
            to: None,
        })
    );
    h.event(|e| *e == ClientEvent::Superseded).await;
    let session = h.client.session();
    assert!(session.current_room.is_none());
    assert!(session.current_user.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_failure_drops_room() {
    let mut h = harness();
    let peer = h.in_room().await;
    peer.send_text(frame(inbound::NEW_QUESTION, question(1, "fr", START_MS)));
    h.phase(Some(GamePhase::Question)).await;

    h.connector.refuse_next(3);
    peer.close(CloseCode(1011));
    h.event(|e| matches!(e, ClientEvent::ReconnectFailed { .. }))
        .await;

    assert!(h.client.session().current_room.is_none());
    assert!(
        h.client
            .countdown(TimerPurpose::QuestionCountdown)
            .await
            .unwrap()
            .is_none()
    );
    h.note_matching(Level::Error, "Could not reconnect").await;
}

#[tokio::test(start_paused = true)]
async fn test_answer_while_reconnecting_can_be_retried() {
    let mut h = harness();
    let peer = h.in_room().await;
    peer.send_text(frame(inbound::NEW_QUESTION, question(1, "fr", START_MS)));
    h.phase(Some(GamePhase::Question)).await;

    peer.close(CloseCode(1011));
    h.event(|e| matches!(e, ClientEvent::Connection(ConnectionState::Reconnecting { .. })))
        .await;

    let err = h
        .client
        .submit_answer(CountryCode::from("fr"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlagquizError::NotConnected));
    assert!(!h.client.session().current_user.unwrap().has_answered);
    h.note_matching(Level::Warning, "not sent").await;

    let mut peer = h.listener.accept().await.expect("reconnected");
    h.event(|e| *e == ClientEvent::Connection(ConnectionState::Connected))
        .await;
    assert_eq!(h.client.session().phase(), Some(GamePhase::Question));

    h.client.submit_answer(CountryCode::from("fr")).await.unwrap();
    let answer = sent(&mut peer).await;
    assert_eq!(answer.kind, "SUBMIT_ANSWER");
    assert_eq!(answer.data["questionId"], 1);
    assert!(h.client.session().current_user.unwrap().has_answered);
}

#[tokio::test(start_paused = true)]
async fn test_action_while_disconnected_warns() {
    let mut h = harness();

    h.client.start_game().await.unwrap();
    h.note_matching(Level::Warning, "not sent").await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_client() {
    let h = harness();
    h.client.shutdown().await.unwrap();
    assert!(matches!(
        h.client.connect().await,
        Err(FlagquizError::Closed)
    ));
}
