//! Error types for the protocol layer.
//!
//! Each crate in Flagquiz defines its own error enum. When you see a
//! `ProtocolError`, the problem is in turning frames into typed messages
//! (or back), not in networking or game state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into a frame).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a frame into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields,
    /// wrong data types, or truncated frames.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but violates a protocol rule, e.g. a
    /// question whose options do not contain its own country.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
