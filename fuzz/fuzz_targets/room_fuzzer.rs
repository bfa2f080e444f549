//! Fuzz target for the room state machine
//!
//! Random joins, moves and disconnects from a small pool of connections.
//!
//! # Invariants
//!
//! - Seats never hold the same symbol; the first joiner moves first
//! - Refused moves leave the board untouched and produce no broadcast
//! - An applied move broadcasts exactly one board to each seat
//! - A closed room never changes again

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use noughts_core::{Room, RoomAction, Symbol};
use noughts_proto::Message;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Join { connection: u8 },
    Move { connection: u8, position: u8 },
    Disconnect { connection: u8 },
}

#[derive(Debug, Arbitrary)]
struct Scenario {
    echo_rejections: bool,
    ops: Vec<Op>,
}

fuzz_target!(|scenario: Scenario| {
    let mut room = Room::new(1).with_rejection_echo(scenario.echo_rejections);
    let mut symbols = Vec::new();

    for op in scenario.ops.into_iter().take(256) {
        let before = room.board().clone();
        let was_closed = room.is_closed();

        match op {
            Op::Join { connection } => {
                if let Ok((symbol, _)) = room.join(u64::from(connection % 4), "fuzz") {
                    symbols.push(symbol);
                }
            },
            Op::Move { connection, position } => {
                let (result, actions) = room.submit_move(u64::from(connection % 4), position);
                let boards = actions
                    .iter()
                    .filter(|a| matches!(a, RoomAction::Send { message: Message::State(_), .. }))
                    .count();
                if result.is_applied() {
                    assert_eq!(boards, 2);
                } else {
                    assert_eq!(boards, 0);
                    assert_eq!(room.board(), &before);
                }
            },
            Op::Disconnect { connection } => {
                room.disconnect(u64::from(connection % 4));
            },
        }

        if was_closed {
            assert!(room.is_closed());
            assert_eq!(room.board(), &before);
        }
    }

    assert!(symbols.len() <= 2);
    if let Some(first) = symbols.first() {
        assert_eq!(*first, Symbol::First);
    }
    if let [a, b] = symbols[..] {
        assert_ne!(a, b);
    }
});
