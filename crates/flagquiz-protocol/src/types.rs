//! Domain types that travel on the wire.
//!
//! Every struct here is what the multiplayer server sends or expects,
//! so the serde attributes are part of the contract: fields are
//! camelCase on the wire and enum values lowercase.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Server-assigned identifier for a user.
///
/// `#[serde(transparent)]` keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Server-assigned identifier for a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// ISO 3166-1 alpha-2 country code, lowercase (`"fr"`, `"jp"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(pub String);

impl CountryCode {
    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryCode {
    fn from(code: &str) -> Self {
        Self(code.to_ascii_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Countries and difficulty
// ---------------------------------------------------------------------------

/// Difficulty tier of a game. Harder tiers draw from larger pools and
/// pick more similar decoys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Every tier, easiest first.
    pub const ALL: [Difficulty; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Expert];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        };
        f.write_str(name)
    }
}

/// Geographic region used by the similarity heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Region {
    Europe,
    Asia,
    MiddleEast,
    Africa,
    NorthAmerica,
    CentralAmerica,
    Caribbean,
    SouthAmerica,
    Oceania,
}

/// A country as it appears in a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: CountryCode,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

// ---------------------------------------------------------------------------
// Users and rooms
// ---------------------------------------------------------------------------

/// A member of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default)]
    pub has_answered: bool,
    #[serde(default)]
    pub score: u32,
}

/// Host-editable room settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomSettings {
    pub difficulty: Difficulty,
    pub question_count: u32,
    /// Seconds each question stays open.
    pub time_per_question: u32,
    /// Seconds the results screen shows between questions.
    pub results_duration: u32,
    pub max_players: u32,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            question_count: 10,
            time_per_question: 15,
            results_duration: 5,
            max_players: 8,
        }
    }
}

/// A multiplayer room as the client sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub invite_code: String,
    pub members: Vec<User>,
    pub host: UserId,
    #[serde(default)]
    pub settings: RoomSettings,
    #[serde(default)]
    pub game_state: GameState,
}

impl Room {
    /// Looks up a member by id.
    pub fn member(&self, id: &UserId) -> Option<&User> {
        self.members.iter().find(|m| &m.id == id)
    }

    /// Mutable lookup by id.
    pub fn member_mut(&mut self, id: &UserId) -> Option<&mut User> {
        self.members.iter_mut().find(|m| &m.id == id)
    }
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// The game-session phase.
///
/// ```text
/// Waiting → Starting → Question ⇄ Results → Finished
///    ↑_________________(stop)_______|
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    #[default]
    Waiting,
    Starting,
    Question,
    Results,
    Finished,
}

impl GamePhase {
    /// `true` in the phases where a question is on screen.
    pub fn has_question(self) -> bool {
        matches!(self, Self::Question | Self::Results)
    }

    /// `true` in the phases where a leaderboard is meaningful.
    pub fn has_leaderboard(self) -> bool {
        matches!(self, Self::Results | Self::Finished)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "waiting",
            Self::Starting => "starting",
            Self::Question => "question",
            Self::Results => "results",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// A fixed-length countdown anchored to an absolute start time.
///
/// Value object: a new `Timer` is issued per phase transition, never
/// edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    /// Length in seconds.
    pub duration: u32,
    /// Milliseconds since the Unix epoch.
    pub start_time: u64,
}

impl Timer {
    /// Absolute deadline in epoch milliseconds.
    pub fn end_time(&self) -> u64 {
        self.start_time
            .saturating_add(u64::from(self.duration).saturating_mul(1000))
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameQuestion {
    pub question_number: u32,
    pub country: Country,
    pub options: Vec<Country>,
    pub start_time: u64,
    pub end_time: u64,
}

impl GameQuestion {
    /// Number of options every question carries.
    pub const OPTION_COUNT: usize = 4;

    /// Checks the option invariant: exactly four options, unique codes,
    /// and the target present exactly once.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.options.len() != Self::OPTION_COUNT {
            return Err(ProtocolError::InvalidMessage(format!(
                "question {} has {} options, expected {}",
                self.question_number,
                self.options.len(),
                Self::OPTION_COUNT
            )));
        }
        let codes: BTreeSet<&CountryCode> = self.options.iter().map(|c| &c.code).collect();
        if codes.len() != self.options.len() {
            return Err(ProtocolError::InvalidMessage(format!(
                "question {} has duplicate options",
                self.question_number
            )));
        }
        if !codes.contains(&self.country.code) {
            return Err(ProtocolError::InvalidMessage(format!(
                "question {} options do not include {}",
                self.question_number, self.country.code
            )));
        }
        if self.end_time < self.start_time {
            return Err(ProtocolError::InvalidMessage(format!(
                "question {} ends before it starts",
                self.question_number
            )));
        }
        Ok(())
    }

    /// The question's countdown, rounded to whole seconds.
    pub fn timer(&self) -> Timer {
        let millis = self.end_time.saturating_sub(self.start_time);
        Timer {
            duration: u32::try_from(millis.div_ceil(1000)).unwrap_or(u32::MAX),
            start_time: self.start_time,
        }
    }
}

/// A player's answer as reported in question results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAnswer {
    pub user_id: UserId,
    #[serde(default)]
    pub answer: Option<CountryCode>,
    pub is_correct: bool,
    #[serde(default)]
    pub points: u32,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub username: String,
    pub score: u32,
    #[serde(default)]
    pub rank: u32,
}

/// End-of-game statistics reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    pub total_questions: u32,
    pub duration_ms: Option<u64>,
    pub average_accuracy: Option<f64>,
}

/// Everything about the running game inside a room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub is_active: bool,
    pub phase: GamePhase,
    pub current_question: Option<GameQuestion>,
    pub answers: Vec<PlayerAnswer>,
    pub current_question_index: u32,
    pub total_questions: u32,
    pub used_countries: BTreeSet<CountryCode>,
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Countdown for the current phase (starting, question or results).
    pub phase_timer: Option<Timer>,
    /// The local player's pick for the current question.
    pub selected_answer: Option<CountryCode>,
}
