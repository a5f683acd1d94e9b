//! Error types for the protocol layer.
//!
//! Each botlink crate defines its own error enum. A `ProtocolError` always
//! means the bytes or the frame shape were wrong, never that the network
//! or the issuer misbehaved.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (Rust value → bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (bytes → Rust value).
    ///
    /// Common causes: malformed JSON, a `data` object missing required
    /// fields for its `type`, or wrong field types.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame parsed but violates protocol rules (e.g. a position
    /// update carrying a non-finite coordinate).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
