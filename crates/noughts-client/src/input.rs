//! Line-based move input.
//!
//! Two forms are accepted and both map to a 0-8 board position:
//!
//! - `row col`, each 1-3 (`1 1` is top-left, `3 3` bottom-right)
//! - a single cell number 1-9 in reading order

use crate::error::InputError;

/// Parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Place a mark at a 0-8 position
    Move(u8),
    /// Leave the game
    Quit,
}

/// Parse one line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("q") {
        return Ok(Some(Command::Quit));
    }
    parse_position(line).map(|position| Some(Command::Move(position)))
}

/// Parse `row col` or a cell number into a 0-8 position.
pub fn parse_position(line: &str) -> Result<u8, InputError> {
    let numbers = line
        .split_whitespace()
        .map(str::parse::<u32>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| InputError::Unrecognized)?;

    match numbers[..] {
        [row, column] => {
            if !(1..=3).contains(&row) || !(1..=3).contains(&column) {
                return Err(InputError::CoordinateOutOfRange { row, column });
            }
            Ok(((row - 1) * 3 + (column - 1)) as u8)
        },
        [index] => {
            if !(1..=9).contains(&index) {
                return Err(InputError::IndexOutOfRange(index));
            }
            Ok((index - 1) as u8)
        },
        _ => Err(InputError::Unrecognized),
    }
}
