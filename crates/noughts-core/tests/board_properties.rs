//! Property-based tests for the board state machine
//!
//! Random move sequences (legal and illegal) are fed to a board; the tests
//! check the invariants that must hold after every step.

use noughts_core::{Board, MoveError, Outcome, Symbol};
use proptest::prelude::*;

/// Strategy for a move attempt: mover and position, including out-of-range
/// positions and the `Empty` symbol.
fn move_attempt() -> impl Strategy<Value = (Symbol, u8)> {
    (
        prop_oneof![Just(Symbol::First), Just(Symbol::Second), Just(Symbol::Empty)],
        prop_oneof![4 => 0u8..9, 1 => 9u8..=u8::MAX],
    )
}

/// Strategy for a reachable board: play a random order of positions,
/// always as the side to move.
fn reachable_board() -> impl Strategy<Value = Board> {
    (Just((0u8..9).collect::<Vec<_>>()).prop_shuffle(), 0usize..=9).prop_map(|(order, len)| {
        let mut board = Board::new();
        for position in order.into_iter().take(len) {
            let turn = board.turn();
            board.apply_move(turn, position);
        }
        board
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: turn alternates strictly after every accepted move
    #[test]
    fn prop_turn_alternates(attempts in prop::collection::vec(move_attempt(), 0..64)) {
        let mut board = Board::new();

        for (symbol, position) in attempts {
            let before = board.clone();
            match board.try_apply_move(symbol, position) {
                Ok(None) => {
                    prop_assert_eq!(board.turn(), before.turn().opponent());
                },
                Ok(Some(_)) => {
                    prop_assert_eq!(board.turn(), before.turn());
                    prop_assert!(board.is_terminal());
                },
                Err(_) => {
                    prop_assert_eq!(&board, &before);
                },
            }
            prop_assert_ne!(board.turn(), Symbol::Empty);
        }
    }

    /// Property: each accepted move fills exactly one empty cell with the mover
    #[test]
    fn prop_one_cell_per_move(attempts in prop::collection::vec(move_attempt(), 0..64)) {
        let mut board = Board::new();

        for (symbol, position) in attempts {
            let before = board.clone();
            if board.apply_move(symbol, position) {
                let changed: Vec<usize> = (0..Board::CELLS)
                    .filter(|i| before.cell(*i) != board.cell(*i))
                    .collect();
                prop_assert_eq!(changed, vec![usize::from(position)]);
                prop_assert_eq!(before.cell(usize::from(position)), Some(Symbol::Empty));
                prop_assert_eq!(board.cell(usize::from(position)), Some(symbol));
            }
        }
    }

    /// Property: every rejection leaves the board unchanged, with the right reason
    #[test]
    fn prop_rejections_are_noops(board in reachable_board(), (symbol, position) in move_attempt()) {
        let mut candidate = board.clone();
        let result = candidate.try_apply_move(symbol, position);

        let expected = if board.is_terminal() {
            Some(MoveError::GameOver)
        } else if position >= 9 {
            Some(MoveError::InvalidPosition(position))
        } else if symbol != board.turn() {
            Some(MoveError::NotYourTurn)
        } else if board.cell(usize::from(position)) != Some(Symbol::Empty) {
            Some(MoveError::CellOccupied(position))
        } else {
            None
        };

        match expected {
            Some(err) => {
                prop_assert_eq!(result, Err(err));
                prop_assert_eq!(candidate, board);
            },
            None => {
                prop_assert!(result.is_ok());
            },
        }
    }

    /// Property: serialize/deserialize is the identity on reachable boards
    #[test]
    fn prop_serialize_roundtrip(board in reachable_board()) {
        let bytes = board.serialize();
        prop_assert_eq!(Board::deserialize(&bytes), Ok(board));
    }

    /// Property: a win is reported whenever a line exists, even on a full board
    #[test]
    fn prop_line_beats_draw(board in reachable_board()) {
        const LINES: [[usize; 3]; 8] =
            [[0, 1, 2], [3, 4, 5], [6, 7, 8], [0, 3, 6], [1, 4, 7], [2, 5, 8], [0, 4, 8], [2, 4, 6]];

        let line = LINES.iter().find_map(|line| {
            let marks = line.map(|i| board.cell(i).unwrap_or_default());
            (marks[0] != Symbol::Empty && marks[0] == marks[1] && marks[1] == marks[2])
                .then_some(marks[0])
        });

        match line {
            Some(winner) => {
                prop_assert_eq!(board.outcome(), Outcome::win_for(winner));
            },
            None if board.cells().iter().all(|c| *c != Symbol::Empty) => {
                prop_assert_eq!(board.outcome(), Some(Outcome::Draw));
            },
            None => {
                prop_assert_eq!(board.outcome(), None);
            },
        }
    }
}
