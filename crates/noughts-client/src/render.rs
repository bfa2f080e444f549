//! Plain-text board rendering.

use std::fmt::Write;

use noughts_core::{Board, Symbol};

/// ANSI sequence that homes the cursor and clears the terminal.
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// Render the grid with row/column labels, then a status line.
///
/// `me` is the viewer's symbol, if assigned; it decides whether the status
/// asks for a move or says to wait.
pub fn render_board(board: &Board, me: Option<Symbol>) -> String {
    let mut out = String::from("   1   2   3\n");

    for (row, cells) in board.cells().chunks(3).enumerate() {
        let marks: Vec<char> = cells.iter().map(|cell| cell.mark()).collect();
        let _ = writeln!(out, "{}  {} | {} | {} ", row + 1, marks[0], marks[1], marks[2]);
        if row < 2 {
            out.push_str("  -----------\n");
        }
    }

    out.push('\n');
    match board.outcome() {
        Some(outcome) => {
            let _ = writeln!(out, "{}", outcome.summary());
        },
        None if me == Some(board.turn()) => {
            let _ = writeln!(out, "Current turn: {}", board.turn());
            out.push_str("It's YOUR turn! Enter position (row col):\n");
        },
        None => {
            let _ = writeln!(out, "Current turn: {}", board.turn());
            out.push_str("Waiting for opponent's move...\n");
        },
    }
    out
}
