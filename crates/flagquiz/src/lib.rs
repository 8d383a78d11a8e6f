//! # Flagquiz
//!
//! Real-time session client for a multiplayer "guess the flag" quiz.
//!
//! The client keeps one WebSocket connection to the game server,
//! reconnects with bounded exponential backoff, routes every server
//! frame through a type-tagged [`MessageRouter`] into a pure session
//! reducer, and runs wall-clock countdowns that agree across every
//! player in a room. Presentation stays outside: notifications, sound
//! cues and preferences are reached through the traits in
//! [`collaborators`].
//!
//! ```text
//! Transport → ConnectionManager → MessageRouter → reduce(Session)
//!                                      │
//!                                      └→ Effects: timers, notify, cues, replies
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flagquiz::prelude::*;
//!
//! # async fn run() -> Result<(), FlagquizError> {
//! flagquiz::init_tracing("info");
//! let (client, mut events) = QuizClient::builder()
//!     .url("wss://quiz.example.com/ws")
//!     .build_websocket();
//! client.connect().await?;
//! client.create_room("ana", RoomSettings::default()).await?;
//! while let Some(event) = events.recv().await {
//!     if let ClientEvent::PhaseChanged(t) = event {
//!         println!("{:?} -> {:?}", t.from, t.to);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Solo play needs no server; see [`flagquiz_quiz::SoloGame`].

mod client;
pub mod collaborators;
mod error;
pub mod handlers;
mod router;

pub use client::{ClientConfig, ClientEvent, QuizClient, QuizClientBuilder};
pub use error::FlagquizError;
pub use router::{Context, Effect, Handler, MessageRouter};

pub use flagquiz_countdown as countdown;
pub use flagquiz_protocol as protocol;
pub use flagquiz_quiz as quiz;
pub use flagquiz_room as room;
pub use flagquiz_session as session;
pub use flagquiz_transport as transport;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a `tracing` subscriber that prints to stderr.
///
/// `RUST_LOG` overrides `default_level`. Does nothing if a subscriber is
/// already installed.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Commonly used types.
pub mod prelude {
    pub use crate::collaborators::{
        AudioCues, Cue, Level, Notifier, SettingsReader, SilentAudio, StaticSettings,
        TracingNotifier,
    };
    pub use crate::{
        ClientConfig, ClientEvent, Effect, FlagquizError, MessageRouter, QuizClient,
        QuizClientBuilder,
    };
    pub use flagquiz_countdown::{
        Clock, CountdownConfig, ManualClock, SystemClock, TimerPurpose, WallClockCountdown,
    };
    pub use flagquiz_protocol::{
        Country, CountryCode, Difficulty, GamePhase, GameQuestion, LeaderboardEntry, Room,
        RoomSettings, Timer, User, UserId,
    };
    pub use flagquiz_quiz::{DistractorSelector, GameSummary, GeneratedQuestion, SoloGame};
    pub use flagquiz_room::{Session, Transition};
    pub use flagquiz_session::{ConnectionConfig, ConnectionState};
}
