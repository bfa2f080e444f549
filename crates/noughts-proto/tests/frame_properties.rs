//! Property-based tests for frame encoding and stream decoding
//!
//! These tests verify that framing is correct for ALL valid inputs, not just
//! specific examples. The stream tests cut an encoded byte sequence at
//! arbitrary points to mimic partial TCP reads.

use bytes::Bytes;
use noughts_proto::{Frame, FrameDecoder, Message, ProtocolError, RejectReason};
use proptest::prelude::*;

/// Strategy for generating arbitrary frames with payloads
fn arbitrary_frame() -> impl Strategy<Value = Frame> {
    (any::<u8>(), prop::collection::vec(any::<u8>(), 0..256))
        .prop_map(|(message_type, payload)| Frame::new(message_type, Bytes::from(payload)))
}

/// Strategy for generating well-formed messages
fn arbitrary_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,32}".prop_map(|name| Message::Join { name }),
        any::<u8>().prop_map(|position| Message::MakeMove { position }),
        any::<[u8; 11]>().prop_map(Message::State),
        ".{0,64}".prop_map(Message::GameOver),
        ".{0,64}".prop_map(Message::Waiting),
        (1u8..=2).prop_map(|symbol| Message::Assigned { symbol }),
        Just(Message::Rejected(RejectReason::NotYourTurn)),
    ]
}

#[test]
fn prop_frame_encode_decode_roundtrip() {
    proptest!(|(frame in arbitrary_frame())| {
        let wire = frame.to_bytes().expect("encode should succeed");

        // PROPERTY: encoded size is header plus payload
        prop_assert_eq!(wire.len(), Frame::HEADER_SIZE + frame.payload.len());

        let decoded = Frame::decode(&wire).expect("decode should succeed");
        prop_assert_eq!(decoded, frame);
    });
}

#[test]
fn prop_message_roundtrip() {
    proptest!(|(message in arbitrary_message())| {
        let wire = message.clone().into_frame().to_bytes().expect("encode should succeed");
        let frame = Frame::decode(&wire).expect("decode should succeed");

        prop_assert_eq!(Message::from_frame(&frame), Ok(message));
    });
}

#[test]
fn prop_truncated_frame_needs_more_bytes() {
    proptest!(|(frame in arbitrary_frame(), cut in any::<prop::sample::Index>())| {
        let wire = frame.to_bytes().expect("encode should succeed");
        let cut = cut.index(wire.len());

        // PROPERTY: any strict prefix is "need more", never a different frame
        let result = Frame::decode(&wire[..cut]);
        let needs_more = matches!(
            result,
            Err(ProtocolError::MalformedHeader { .. } | ProtocolError::IncompleteFrame { .. })
        );
        prop_assert!(needs_more);
    });
}

#[test]
fn prop_stream_split_yields_same_frames() {
    proptest!(|(
        frames in prop::collection::vec(arbitrary_frame(), 1..8),
        chunk_sizes in prop::collection::vec(1usize..16, 1..64),
    )| {
        let mut wire = Vec::new();
        for frame in &frames {
            frame.encode(&mut wire).expect("encode should succeed");
        }

        let mut decoder = FrameDecoder::new();
        let mut decoded = Vec::new();
        let mut offset = 0;
        let mut sizes = chunk_sizes.iter().cycle();

        while offset < wire.len() {
            let size = (*sizes.next().unwrap_or(&1)).min(wire.len() - offset);
            decoder.extend_from_slice(&wire[offset..offset + size]);
            offset += size;

            while let Some(frame) = decoder.decode_next() {
                decoded.push(frame);
            }
        }

        // PROPERTY: chunking never changes the decoded frame sequence
        prop_assert_eq!(decoded, frames);
        prop_assert!(decoder.buffered().is_empty());
    });
}
