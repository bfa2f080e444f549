//! Type-Length-Value frame envelope.
//!
//! A `Frame` is the transport-layer packet:
//! - 1-byte message type
//! - 2-byte value length (Big Endian)
//! - exactly `length` value bytes
//!
//! This is a pure data holder (type + bytes). For the typed view, see
//! [`Message::into_frame`](crate::Message::into_frame) and
//! [`Message::from_frame`](crate::Message::from_frame).

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    MessageType,
    errors::{ProtocolError, Result},
};

/// Complete protocol frame (transport layer)
///
/// Layout on the wire:
/// `[type: 1 byte] + [length: 2 bytes, BE] + [value: length bytes]`
///
/// The type byte is kept raw so a frame with an unknown type still decodes;
/// rejecting it is the job of the message layer.
///
/// # Invariants
///
/// - Size Consistency: the length written on the wire is always
///   `payload.len()`. It is derived during [`Frame::encode`], never stored.
///
/// - Size Limit: `payload.len()` MUST NOT exceed [`Frame::MAX_PAYLOAD_SIZE`].
///   Oversized frames are rejected during encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw message type byte
    pub message_type: u8,

    /// Value bytes
    pub payload: Bytes,
}

impl Frame {
    /// Size of the type + length header
    pub const HEADER_SIZE: usize = 3;

    /// Largest value the 16-bit length field can describe
    pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

    /// Create a new frame.
    ///
    /// No size validation happens here; oversized frames are rejected by
    /// [`Frame::encode`].
    #[must_use]
    pub fn new(message_type: impl Into<u8>, payload: impl Into<Bytes>) -> Self {
        Self { message_type: message_type.into(), payload: payload.into() }
    }

    /// Typed message type, or `None` if the type byte is unknown.
    pub fn kind(&self) -> Option<MessageType> {
        MessageType::from_u8(self.message_type)
    }

    /// Number of bytes this frame occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_SIZE + self.payload.len()
    }

    /// Encode frame into buffer
    ///
    /// Writes: `[type] + [length BE] + [value]`
    ///
    /// # Errors
    ///
    /// - `ProtocolError::OversizedPayload` if the payload exceeds
    ///   [`Frame::MAX_PAYLOAD_SIZE`]. Nothing is written in that case.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        let length = u16::try_from(self.payload.len()).map_err(|_| {
            ProtocolError::OversizedPayload {
                size: self.payload.len(),
                max: Self::MAX_PAYLOAD_SIZE,
            }
        })?;

        dst.put_u8(self.message_type);
        dst.put_u16(length);
        dst.put_slice(&self.payload);

        Ok(())
    }

    /// Encode frame into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decode one frame from the start of `bytes`.
    ///
    /// Trailing bytes past the frame are ignored; the frame consumed exactly
    /// [`Frame::encoded_len`] bytes. Decoding never mutates the input, so a
    /// caller that gets a short-input error keeps its buffer as-is and
    /// retries after the next read.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MalformedHeader` if fewer than 3 bytes are supplied
    /// - `ProtocolError::IncompleteFrame` if the header declares more value
    ///   bytes than are present. A short read is never reinterpreted as a
    ///   shorter frame.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let Some(header) = bytes.get(..Self::HEADER_SIZE) else {
            return Err(ProtocolError::MalformedHeader {
                expected: Self::HEADER_SIZE,
                actual: bytes.len(),
            });
        };

        let message_type = header[0];
        let length = usize::from(u16::from_be_bytes([header[1], header[2]]));
        let total_size = Self::HEADER_SIZE + length;

        let Some(value) = bytes.get(Self::HEADER_SIZE..total_size) else {
            return Err(ProtocolError::IncompleteFrame {
                expected: length,
                available: bytes.len() - Self::HEADER_SIZE,
            });
        };

        debug_assert_eq!(value.len(), length);

        Ok(Self { message_type, payload: Bytes::copy_from_slice(value) })
    }
}
