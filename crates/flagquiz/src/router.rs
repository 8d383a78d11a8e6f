//! Type-tag dispatch for inbound frames.
//!
//! The router decodes a text frame into an [`Envelope`], looks up the
//! handler registered for its `type` and runs it against the session.
//! Handlers are plain functions: they get the session explicitly, mutate
//! it only through the reducer, and return [`Effect`]s for the client to
//! carry out. Nothing here touches the socket, the timers or the UI.
//!
//! Dispatch never fails. A frame that does not parse, a tag nobody
//! registered and a payload that does not decode are all logged and
//! dropped.

use std::collections::HashMap;

use flagquiz_countdown::TimerPurpose;
use flagquiz_protocol::{ClientMessage, Codec, Envelope, JsonCodec, Timer};
use flagquiz_room::Session;
use tracing::{debug, trace, warn};

use crate::collaborators::{Cue, Level};
use crate::{FlagquizError, handlers};

/// Something a handler wants done outside the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show a message to the user.
    Notify(Level, String),
    /// Play a sound, if the user has sound effects on.
    PlayCue(Cue),
    /// Start (or replace) the countdown for a purpose.
    InstallTimer(TimerPurpose, Timer),
    /// Stop the countdown for a purpose.
    CancelTimer(TimerPurpose),
    /// Stop every countdown.
    CancelAllTimers,
    /// Send a message to the server.
    Send(ClientMessage),
}

impl Effect {
    pub(crate) fn notify(level: Level, message: impl Into<String>) -> Self {
        Self::Notify(level, message.into())
    }
}

/// What a handler sees besides the envelope.
pub struct Context<'a> {
    pub session: &'a mut Session,
    /// Wall-clock time the frame is handled, in epoch milliseconds.
    pub now_ms: u64,
}

/// A message handler.
pub type Handler = fn(&mut Context<'_>, &Envelope) -> Result<Vec<Effect>, FlagquizError>;

/// Registry of handlers keyed by message type.
pub struct MessageRouter<C: Codec = JsonCodec> {
    codec: C,
    handlers: HashMap<&'static str, Handler>,
}

impl MessageRouter<JsonCodec> {
    /// A JSON router with every built-in handler registered.
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }
}

impl Default for MessageRouter<JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> MessageRouter<C> {
    /// A router with no handlers.
    pub fn empty(codec: C) -> Self {
        Self {
            codec,
            handlers: HashMap::new(),
        }
    }

    /// A router using `codec` with every built-in handler registered.
    pub fn with_codec(codec: C) -> Self {
        let mut router = Self::empty(codec);
        handlers::register_defaults(&mut router);
        router
    }

    /// Registers `handler` for `kind`, returning the one it replaces.
    pub fn register(&mut self, kind: &'static str, handler: Handler) -> Option<Handler> {
        self.handlers.insert(kind, handler)
    }

    /// Removes the handler for `kind`.
    pub fn unregister(&mut self, kind: &str) -> Option<Handler> {
        self.handlers.remove(kind)
    }

    /// Whether a handler is registered for `kind`.
    pub fn handles(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Decodes `frame` and dispatches it.
    pub fn dispatch(&self, cx: &mut Context<'_>, frame: &str) -> Vec<Effect> {
        match self.codec.decode(frame) {
            Ok(envelope) => self.dispatch_envelope(cx, &envelope),
            Err(e) => {
                warn!(error = %e, len = frame.len(), "dropping malformed frame");
                Vec::new()
            }
        }
    }

    /// Dispatches an already-decoded envelope.
    pub fn dispatch_envelope(&self, cx: &mut Context<'_>, envelope: &Envelope) -> Vec<Effect> {
        let kind = envelope.kind.as_str();
        let Some(handler) = self.handlers.get(kind) else {
            debug!(kind, "no handler registered, dropping message");
            return Vec::new();
        };

        trace!(kind, "dispatching message");
        match handler(cx, envelope) {
            Ok(effects) => effects,
            Err(e) => {
                warn!(kind, error = %e, "handler rejected message");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagquiz_protocol::inbound;

    fn context(session: &mut Session) -> Context<'_> {
        Context {
            session,
            now_ms: 1_000,
        }
    }

    fn always_notify(_: &mut Context<'_>, _: &Envelope) -> Result<Vec<Effect>, FlagquizError> {
        Ok(vec![Effect::notify(Level::Info, "custom")])
    }

    #[test]
    fn test_defaults_cover_every_inbound_tag() {
        let router = MessageRouter::new();
        for kind in [
            inbound::AUTH_SUCCESS,
            inbound::CREATE_ROOM_SUCCESS,
            inbound::JOIN_ROOM_SUCCESS,
            inbound::USER_JOINED,
            inbound::USER_LEFT,
            inbound::USER_KICKED,
            inbound::HOST_CHANGED,
            inbound::KICKED,
            inbound::GAME_STARTING,
            inbound::NEW_QUESTION,
            inbound::ANSWER_SUBMITTED,
            inbound::QUESTION_RESULTS,
            inbound::GAME_ENDED,
            inbound::GAME_STOPPED,
            inbound::SETTINGS_UPDATED,
            inbound::ERROR,
            inbound::ROOM_TTL_WARNING,
            inbound::ROOM_EXPIRED,
            inbound::HEARTBEAT,
        ] {
            assert!(router.handles(kind), "{kind} has no handler");
        }
    }

    #[test]
    fn test_unknown_tag_is_dropped() {
        let router = MessageRouter::new();
        let mut session = Session::new();
        let effects = router.dispatch(&mut context(&mut session), r#"{"type":"NOPE","data":{}}"#);
        assert!(effects.is_empty());
        assert_eq!(session, Session::new());
    }

    #[test]
    fn test_malformed_frame_is_dropped() {
        let router = MessageRouter::new();
        let mut session = Session::new();
        assert!(router.dispatch(&mut context(&mut session), "{not json").is_empty());
        assert!(router.dispatch(&mut context(&mut session), r#"{"data":{}}"#).is_empty());
    }

    #[test]
    fn test_bad_payload_is_dropped_without_mutation() {
        let router = MessageRouter::new();
        let mut session = Session::new();
        let frame = r#"{"type":"AUTH_SUCCESS","data":{"userId":42}}"#;
        assert!(router.dispatch(&mut context(&mut session), frame).is_empty());
        assert!(session.current_user.is_none());
    }

    #[test]
    fn test_register_replaces_handler() {
        let mut router = MessageRouter::empty(JsonCodec);
        assert!(router.register("PING", always_notify).is_none());
        assert!(router.register("PING", always_notify).is_some());

        let mut session = Session::new();
        let effects = router.dispatch(&mut context(&mut session), r#"{"type":"PING"}"#);
        assert_eq!(effects, vec![Effect::Notify(Level::Info, "custom".into())]);

        router.unregister("PING");
        assert!(!router.handles("PING"));
    }
}
