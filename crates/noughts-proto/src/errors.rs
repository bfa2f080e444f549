//! Protocol error types.

use thiserror::Error;

use crate::MessageType;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding frames and messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer bytes than a frame header were supplied.
    #[error("malformed header: need {expected} bytes, got {actual}")]
    MalformedHeader {
        /// Header size in bytes
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Header is complete but the declared value is not fully buffered yet.
    #[error("incomplete frame: header declares {expected} value bytes, {available} available")]
    IncompleteFrame {
        /// Value length declared in the header
        expected: usize,
        /// Value bytes currently available
        available: usize,
    },

    /// Payload does not fit the 16-bit length field.
    #[error("payload too large: {size} bytes (max {max})")]
    OversizedPayload {
        /// Actual payload size
        size: usize,
        /// Largest encodable payload
        max: usize,
    },

    /// Type byte does not name a known message.
    #[error("unknown message type: {0:#04x}")]
    UnknownMessageType(u8),

    /// Payload shape does not match its message type.
    #[error("invalid {message_type:?} payload: {reason}")]
    InvalidPayload {
        /// Type of the offending frame
        message_type: MessageType,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Text payload is not valid UTF-8.
    #[error("text payload is not valid UTF-8")]
    InvalidUtf8,
}

impl ProtocolError {
    /// Returns true if the error only means more bytes have to arrive.
    ///
    /// On a byte stream both a short header and a short value are normal:
    /// the caller keeps its buffer and reads again.
    pub fn needs_more_bytes(&self) -> bool {
        matches!(self, Self::MalformedHeader { .. } | Self::IncompleteFrame { .. })
    }
}
