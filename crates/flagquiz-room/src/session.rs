//! The client's view of who it is and which room it is in.

use flagquiz_protocol::{GamePhase, GameState, Room, User, UserId};

/// Identity plus current room. Mutated only by the reducer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub current_user: Option<User>,
    pub current_room: Option<Room>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The local user's id, once known.
    pub fn user_id(&self) -> Option<&UserId> {
        self.current_user.as_ref().map(|u| &u.id)
    }

    pub fn room(&self) -> Option<&Room> {
        self.current_room.as_ref()
    }

    pub fn room_mut(&mut self) -> Option<&mut Room> {
        self.current_room.as_mut()
    }

    /// The running game, if in a room.
    pub fn game(&self) -> Option<&GameState> {
        self.current_room.as_ref().map(|r| &r.game_state)
    }

    /// Current phase, or `None` outside a room.
    pub fn phase(&self) -> Option<GamePhase> {
        self.game().map(|g| g.phase)
    }

    /// `true` if the local user hosts the current room.
    pub fn is_host(&self) -> bool {
        match (self.user_id(), self.room()) {
            (Some(id), Some(room)) => &room.host == id,
            _ => false,
        }
    }

    /// `true` if `id` is the local user.
    pub fn is_me(&self, id: &UserId) -> bool {
        self.user_id() == Some(id)
    }

    /// Forgets the room but keeps the identity.
    pub fn leave_room(&mut self) {
        self.current_room = None;
        if let Some(user) = &mut self.current_user {
            user.is_host = false;
            user.has_answered = false;
            user.score = 0;
        }
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.current_user = None;
        self.current_room = None;
    }

    /// Copies the local user's row from the member list, if present.
    pub(crate) fn sync_self_from_members(&mut self) {
        let (Some(user), Some(room)) = (&mut self.current_user, &self.current_room) else {
            return;
        };
        if let Some(me) = room.member(&user.id) {
            user.username.clone_from(&me.username);
            user.score = me.score;
            user.has_answered = me.has_answered;
        }
        user.is_host = room.host == user.id;
    }
}
