//! Wire protocol for Flagquiz.
//!
//! This crate defines the "language" the quiz client and the multiplayer
//! server speak:
//!
//! - **Envelope** ([`Envelope`]): the `{ type, data, timestamp }` frame.
//! - **Messages** ([`ClientMessage`] outbound, payload structs inbound
//!   with their tags in [`inbound`]).
//! - **Types** ([`Room`], [`User`], [`GameQuestion`], [`Timer`], …):
//!   the domain data carried in payloads.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): frames to envelopes.
//!
//! ```text
//! Transport (text) → Protocol (Envelope) → Router (typed payloads)
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use messages::{
    AnswerSubmitted, AuthSuccess, ClientMessage, Envelope, GameEnded, GameStarting, HostChanged,
    Kicked, MembersChanged, NewQuestion, QuestionResults, RoomJoined, RoomTtlWarning, ServerError,
    SettingsUpdated, inbound,
};
pub use types::{
    Country, CountryCode, Difficulty, GamePhase, GameQuestion, GameState, GameStats,
    LeaderboardEntry, PlayerAnswer, Region, Room, RoomId, RoomSettings, Timer, User, UserId,
};
