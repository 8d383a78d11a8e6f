//! Inputs to the reducer.

use flagquiz_protocol::{
    GamePhase, GameQuestion, LeaderboardEntry, PlayerAnswer, Room, RoomSettings, Timer, User,
    UserId,
};

/// Something that happened to the session, already decoded from the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The server assigned or confirmed our identity.
    Authenticated { user_id: UserId, username: String },
    /// We created or joined a room. Carries the server's room snapshot.
    RoomJoined { room: Room, user: User },
    /// The host changed the room settings.
    SettingsUpdated(RoomSettings),
    /// Someone joined, left or was kicked. Carries the full member list.
    MembersChanged(Vec<User>),
    /// A new host was picked.
    HostChanged(UserId),
    /// The lead-in countdown started.
    GameStarting { countdown: u32, start_time: u64 },
    /// A question opened.
    NewQuestion {
        question: GameQuestion,
        total_questions: u32,
    },
    /// Another player answered (the answer itself stays hidden).
    AnswerSubmitted { user_id: UserId },
    /// The question closed.
    QuestionResults {
        player_answers: Vec<PlayerAnswer>,
        leaderboard: Vec<LeaderboardEntry>,
        timer: Option<Timer>,
    },
    /// The last question's results are done.
    GameEnded { leaderboard: Vec<LeaderboardEntry> },
    /// The host stopped the game.
    GameStopped,
    /// We were removed from the room.
    Kicked,
    /// The room timed out on the server.
    RoomExpired,
}

impl GameEvent {
    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authenticated { .. } => "authenticated",
            Self::RoomJoined { .. } => "room-joined",
            Self::SettingsUpdated(_) => "settings-updated",
            Self::MembersChanged(_) => "members-changed",
            Self::HostChanged(_) => "host-changed",
            Self::GameStarting { .. } => "game-starting",
            Self::NewQuestion { .. } => "new-question",
            Self::AnswerSubmitted { .. } => "answer-submitted",
            Self::QuestionResults { .. } => "question-results",
            Self::GameEnded { .. } => "game-ended",
            Self::GameStopped => "game-stopped",
            Self::Kicked => "kicked",
            Self::RoomExpired => "room-expired",
        }
    }

    /// `true` if applying the event needs a current room.
    pub fn requires_room(&self) -> bool {
        !matches!(
            self,
            Self::Authenticated { .. } | Self::RoomJoined { .. } | Self::Kicked | Self::RoomExpired
        )
    }
}

/// What a reduction did to the phase. `None` means "not in a room".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<GamePhase>,
    pub to: Option<GamePhase>,
}

impl Transition {
    /// `true` if the phase (or room presence) changed.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }

    /// `true` if the reduction moved into `phase` from somewhere else.
    pub fn entered(&self, phase: GamePhase) -> bool {
        self.changed() && self.to == Some(phase)
    }

    /// `true` if the session was in a room before and is not now.
    pub fn left_room(&self) -> bool {
        self.from.is_some() && self.to.is_none()
    }
}
