//! Codec trait and the JSON implementation.
//!
//! The transport works in bytes and the client works in [`Inbound`] /
//! [`Outbound`]. A [`Codec`] sits in between so the wire format can be
//! swapped without touching either side.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Frame, Inbound, Outbound, ProtocolError};

/// Encodes Rust values to bytes and decodes them back.
///
/// `Send + Sync + 'static` so a codec can live inside a spawned reader task.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// [`ProtocolError::Decode`] if the bytes are malformed or do not match
    /// the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Encodes an outbound message as a frame.
    fn encode_outbound(&self, message: &Outbound) -> Result<Vec<u8>, ProtocolError> {
        self.encode(message)
    }

    /// Decodes a frame and interprets it as an inbound message.
    fn decode_inbound(&self, data: &[u8]) -> Result<Inbound, ProtocolError> {
        let frame: Frame = self.decode(data)?;
        Inbound::from_frame(frame)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use botlink_protocol::{Codec, Inbound, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg = codec
///     .decode_inbound(br#"{"type":"KeepAlive","data":{"id":3}}"#)
///     .unwrap();
/// assert_eq!(msg, Inbound::KeepAlive { id: 3 });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
