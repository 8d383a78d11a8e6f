//! Codec trait and the JSON implementation.
//!
//! A codec turns envelopes into text frames and back. The transport only
//! moves strings; the connection manager and router only see
//! [`Envelope`]s. Keeping the conversion behind a trait lets tests feed
//! hand-written frames through the same path as real traffic.

use crate::{ClientMessage, Envelope, ProtocolError};

/// Encodes outbound messages and decodes inbound frames.
pub trait Codec: Send + Sync + 'static {
    /// Serializes an outbound message into a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode(&self, msg: &ClientMessage, timestamp: u64) -> Result<String, ProtocolError>;

    /// Parses a text frame into an envelope.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the frame is not a valid
    /// envelope (malformed JSON, missing `type`).
    fn decode(&self, frame: &str) -> Result<Envelope, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that speaks the server's JSON envelope format.
///
/// ```rust
/// use flagquiz_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let frame = JsonCodec.encode(&ClientMessage::StartGame {}, 1_000).unwrap();
/// let envelope = JsonCodec.decode(&frame).unwrap();
/// assert_eq!(envelope.kind, "START_GAME");
/// assert_eq!(envelope.timestamp, Some(1_000));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, msg: &ClientMessage, timestamp: u64) -> Result<String, ProtocolError> {
        let envelope = Envelope::from_message(msg, timestamp)?;
        serde_json::to_string(&envelope).map_err(ProtocolError::Encode)
    }

    fn decode(&self, frame: &str) -> Result<Envelope, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}
