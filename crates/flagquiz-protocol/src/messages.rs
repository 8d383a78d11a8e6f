//! The wire envelope and the messages carried inside it.
//!
//! Every frame, in either direction, is one JSON object:
//!
//! ```text
//! { "type": "NEW_QUESTION", "data": { ... }, "timestamp": 1700000000000 }
//! ```
//!
//! Outbound messages are a closed set, so they are one enum
//! ([`ClientMessage`]). Inbound messages are routed by their `type` tag
//! at runtime, so each one gets a payload struct and a tag constant in
//! [`inbound`]; the router decodes `data` into the matching struct.

use serde::{Deserialize, Serialize};

use crate::types::{
    CountryCode, GameQuestion, GameStats, LeaderboardEntry, PlayerAnswer, Room, RoomSettings,
    Timer, User, UserId,
};
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level frame. `data` stays untyped until a handler claims it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message type tag, e.g. `"QUESTION_RESULTS"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Type-specific payload. Missing `data` decodes as `null`.
    #[serde(default)]
    pub data: serde_json::Value,

    /// Sender's clock in epoch milliseconds, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl Envelope {
    /// Wraps an outbound message, stamping it with `timestamp`.
    pub fn from_message(msg: &ClientMessage, timestamp: u64) -> Result<Self, ProtocolError> {
        let value = serde_json::to_value(msg).map_err(ProtocolError::Encode)?;
        let mut envelope: Envelope = serde_json::from_value(value).map_err(ProtocolError::Decode)?;
        envelope.timestamp = Some(timestamp);
        Ok(envelope)
    }

    /// Decodes `data` into the payload type registered for this tag.
    ///
    /// A `null` payload decodes as an empty object, so payload structs
    /// whose fields all have defaults accept frames that omit `data`.
    pub fn payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        let data = if self.data.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            self.data.clone()
        };
        serde_json::from_value(data).map_err(ProtocolError::Decode)
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Messages the client sends to the server.
///
/// `#[serde(tag = "type", content = "data")]` produces the envelope shape
/// directly: `{ "type": "JOIN_ROOM", "data": { "inviteCode": ..., ... } }`.
/// Variants without fields are written as empty struct variants so they
/// still carry `"data": {}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    CreateRoom {
        username: String,
        settings: RoomSettings,
    },
    JoinRoom {
        invite_code: String,
        username: String,
    },
    LeaveRoom {},
    StartGame {},
    RestartGame {},
    StopGame {},
    SubmitAnswer {
        answer: CountryCode,
        question_id: u32,
    },
    UpdateRoomSettings {
        settings: RoomSettings,
    },
    KickUser {
        user_id: UserId,
    },
    HeartbeatResponse {},
}

impl ClientMessage {
    /// The wire tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "CREATE_ROOM",
            Self::JoinRoom { .. } => "JOIN_ROOM",
            Self::LeaveRoom {} => "LEAVE_ROOM",
            Self::StartGame {} => "START_GAME",
            Self::RestartGame {} => "RESTART_GAME",
            Self::StopGame {} => "STOP_GAME",
            Self::SubmitAnswer { .. } => "SUBMIT_ANSWER",
            Self::UpdateRoomSettings { .. } => "UPDATE_ROOM_SETTINGS",
            Self::KickUser { .. } => "KICK_USER",
            Self::HeartbeatResponse {} => "HEARTBEAT_RESPONSE",
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Type tags of server-to-client messages.
pub mod inbound {
    pub const AUTH_SUCCESS: &str = "AUTH_SUCCESS";
    pub const CREATE_ROOM_SUCCESS: &str = "CREATE_ROOM_SUCCESS";
    pub const JOIN_ROOM_SUCCESS: &str = "JOIN_ROOM_SUCCESS";
    pub const USER_JOINED: &str = "USER_JOINED";
    pub const USER_LEFT: &str = "USER_LEFT";
    pub const USER_KICKED: &str = "USER_KICKED";
    pub const HOST_CHANGED: &str = "HOST_CHANGED";
    pub const KICKED: &str = "KICKED";
    pub const GAME_STARTING: &str = "GAME_STARTING";
    pub const NEW_QUESTION: &str = "NEW_QUESTION";
    pub const ANSWER_SUBMITTED: &str = "ANSWER_SUBMITTED";
    pub const QUESTION_RESULTS: &str = "QUESTION_RESULTS";
    pub const GAME_ENDED: &str = "GAME_ENDED";
    pub const GAME_STOPPED: &str = "GAME_STOPPED";
    pub const SETTINGS_UPDATED: &str = "SETTINGS_UPDATED";
    pub const ERROR: &str = "ERROR";
    pub const ROOM_TTL_WARNING: &str = "ROOM_TTL_WARNING";
    pub const ROOM_EXPIRED: &str = "ROOM_EXPIRED";
    pub const HEARTBEAT: &str = "HEARTBEAT";
}

/// `AUTH_SUCCESS`: the server recognised this connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSuccess {
    pub user_id: UserId,
    #[serde(default)]
    pub username: Option<String>,
}

/// `CREATE_ROOM_SUCCESS` and `JOIN_ROOM_SUCCESS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoined {
    pub room: Room,
    pub user: User,
}

/// `USER_JOINED`, `USER_LEFT` and `USER_KICKED`: the authoritative
/// member list after the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersChanged {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(alias = "users")]
    pub members: Vec<User>,
}

/// `HOST_CHANGED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostChanged {
    #[serde(alias = "newHostId")]
    pub host_id: UserId,
}

/// `KICKED`: the local user was removed from the room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Kicked {
    pub reason: Option<String>,
}

/// `GAME_STARTING`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStarting {
    /// Seconds until the first question.
    pub countdown: Option<u32>,
    /// Epoch milliseconds the countdown is anchored to.
    pub start_time: Option<u64>,
}

/// `NEW_QUESTION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub question: GameQuestion,
    pub total_questions: u32,
}

/// `ANSWER_SUBMITTED`: another player locked in an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmitted {
    pub user_id: UserId,
    #[serde(default)]
    pub username: Option<String>,
}

/// `QUESTION_RESULTS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResults {
    #[serde(default)]
    pub player_answers: Vec<PlayerAnswer>,
    pub leaderboard: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub timer: Option<Timer>,
    #[serde(default)]
    pub correct_answer: Option<CountryCode>,
}

/// `GAME_ENDED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEnded {
    pub leaderboard: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub game_stats: Option<GameStats>,
}

/// `SETTINGS_UPDATED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdated {
    pub settings: RoomSettings,
}

/// `ERROR`: an application-level failure reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// `ROOM_TTL_WARNING`: the room will be reclaimed soon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTtlWarning {
    pub expires_at: u64,
    pub remaining_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;

    #[test]
    fn test_join_room_wire_shape() {
        let msg = ClientMessage::JoinRoom {
            invite_code: "XK42".into(),
            username: "ana".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "JOIN_ROOM");
        assert_eq!(json["data"]["inviteCode"], "XK42");
        assert_eq!(json["data"]["username"], "ana");
    }

    #[test]
    fn test_fieldless_messages_carry_empty_data() {
        let json = serde_json::to_value(ClientMessage::LeaveRoom {}).unwrap();
        assert_eq!(json["type"], "LEAVE_ROOM");
        assert_eq!(json["data"], serde_json::json!({}));
    }

    #[test]
    fn test_kind_matches_serialized_tag() {
        let messages = [
            ClientMessage::CreateRoom {
                username: "ana".into(),
                settings: RoomSettings::default(),
            },
            ClientMessage::StartGame {},
            ClientMessage::RestartGame {},
            ClientMessage::StopGame {},
            ClientMessage::SubmitAnswer {
                answer: "fr".into(),
                question_id: 3,
            },
            ClientMessage::KickUser { user_id: "u2".into() },
            ClientMessage::HeartbeatResponse {},
        ];
        for msg in messages {
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["type"], msg.kind());
        }
    }

    #[test]
    fn test_envelope_from_message_stamps_timestamp() {
        let msg = ClientMessage::SubmitAnswer {
            answer: "jp".into(),
            question_id: 2,
        };
        let envelope = Envelope::from_message(&msg, 42).unwrap();

        assert_eq!(envelope.kind, "SUBMIT_ANSWER");
        assert_eq!(envelope.data["answer"], "jp");
        assert_eq!(envelope.data["questionId"], 2);
        assert_eq!(envelope.timestamp, Some(42));
    }

    #[test]
    fn test_envelope_without_data_or_timestamp() {
        let envelope: Envelope = serde_json::from_str(r#"{"type":"GAME_STOPPED"}"#).unwrap();
        assert_eq!(envelope.kind, inbound::GAME_STOPPED);
        assert!(envelope.data.is_null());
        assert_eq!(envelope.timestamp, None);
    }

    #[test]
    fn test_payload_accepts_missing_data_for_defaulted_structs() {
        let envelope: Envelope = serde_json::from_str(r#"{"type":"KICKED"}"#).unwrap();
        let kicked: Kicked = envelope.payload().unwrap();
        assert_eq!(kicked.reason, None);
    }

    #[test]
    fn test_payload_decodes_question_results() {
        let json = r#"{
            "type": "QUESTION_RESULTS",
            "data": {
                "playerAnswers": [{"userId": "u1", "answer": "fr", "isCorrect": true, "points": 900}],
                "leaderboard": [{"userId": "u1", "username": "ana", "score": 900, "rank": 1}],
                "timer": {"duration": 5, "startTime": 1000}
            }
        }"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        let results: QuestionResults = envelope.payload().unwrap();

        assert_eq!(results.player_answers.len(), 1);
        assert!(results.player_answers[0].is_correct);
        assert_eq!(results.leaderboard[0].score, 900);
        assert_eq!(results.timer, Some(Timer { duration: 5, start_time: 1000 }));
    }

    #[test]
    fn test_payload_with_wrong_shape_is_an_error() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"type":"NEW_QUESTION","data":{"question":7}}"#).unwrap();
        let result: Result<NewQuestion, _> = envelope.payload();
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_members_changed_accepts_users_alias() {
        let json = serde_json::json!({"users": [{"id": "u1", "username": "ana"}]});
        let changed: MembersChanged = serde_json::from_value(json).unwrap();
        assert_eq!(changed.members.len(), 1);
    }

    #[test]
    fn test_create_room_settings_serialize_camel_case() {
        let msg = ClientMessage::UpdateRoomSettings {
            settings: RoomSettings {
                difficulty: Difficulty::Hard,
                ..RoomSettings::default()
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["data"]["settings"]["difficulty"], "hard");
        assert_eq!(json["data"]["settings"]["timePerQuestion"], 15);
    }
}
