//! Streaming frame decoder.
//!
//! TCP delivers bytes, not frames: one read may hold half a header, or three
//! frames and the start of a fourth. `FrameDecoder` buffers whatever arrived
//! and hands out frames only once they are complete.

use bytes::{Buf, BytesMut};

use crate::Frame;

/// Buffers stream bytes and yields whole frames.
///
/// # Invariants
///
/// - Bytes are consumed only as part of a complete frame. A partial header or
///   partial value stays in the buffer untouched until more bytes arrive.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty decoder with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buffer: BytesMut::with_capacity(capacity) }
    }

    /// Append bytes received from the stream.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Buffer for reading from the stream directly (`AsyncReadExt::read_buf`).
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buffer
    }

    /// Bytes received but not yet consumed by a frame.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Take the next complete frame, or `None` if more bytes are needed.
    pub fn decode_next(&mut self) -> Option<Frame> {
        match Frame::decode(&self.buffer) {
            Ok(frame) => {
                self.buffer.advance(frame.encoded_len());
                Some(frame)
            },
            // Decoding only fails on short input; keep everything and wait
            Err(err) => {
                debug_assert!(err.needs_more_bytes());
                None
            },
        }
    }
}
