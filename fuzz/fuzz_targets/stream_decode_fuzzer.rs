//! Fuzz target for streaming frame decoding
//!
//! Arbitrary bytes are fed to a `FrameDecoder` in arbitrary chunk sizes, the
//! way partial TCP reads arrive.
//!
//! # Invariants
//!
//! - Decoding never panics; undecodable messages are errors, not crashes
//! - Chunking never changes the decoded frame sequence
//! - Every decoded frame re-encodes to exactly the bytes it consumed
//! - Bytes of an incomplete trailing frame are kept, never dropped

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use noughts_proto::{Frame, FrameDecoder, Message};

#[derive(Debug, Arbitrary)]
struct Input {
    data: Vec<u8>,
    chunks: Vec<u8>,
}

fn decode_all(decoder: &mut FrameDecoder, frames: &mut Vec<Frame>) {
    while let Some(frame) = decoder.decode_next() {
        let _ = Message::from_frame(&frame);
        frames.push(frame);
    }
}

fuzz_target!(|input: Input| {
    let mut whole = FrameDecoder::new();
    let mut expected = Vec::new();
    whole.extend_from_slice(&input.data);
    decode_all(&mut whole, &mut expected);

    let mut chunked = FrameDecoder::new();
    let mut actual = Vec::new();
    let mut offset = 0;
    let mut sizes = input.chunks.iter().map(|size| usize::from(*size).max(1)).cycle();
    while offset < input.data.len() {
        let size = sizes.next().unwrap_or(1).min(input.data.len() - offset);
        chunked.extend_from_slice(&input.data[offset..offset + size]);
        offset += size;
        decode_all(&mut chunked, &mut actual);
    }

    assert_eq!(expected, actual, "chunking changed the frame sequence");

    let consumed: usize = expected.iter().map(Frame::encoded_len).sum();
    assert_eq!(whole.buffered(), &input.data[consumed..]);
    assert_eq!(chunked.buffered(), whole.buffered());

    let mut reencoded = Vec::new();
    for frame in &expected {
        frame.encode(&mut reencoded).expect("decoded frame must re-encode");
    }
    assert_eq!(reencoded, &input.data[..consumed]);
});
