//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the problem is in message
//! representation — serialization, deserialization, or a frame that
//! violates protocol rules — never in game logic or networking.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, wrong
    /// types, or an invalid ranking.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but violates protocol rules — e.g. the first
    /// message on a connection wasn't `connect`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
