//! Board state machine.
//!
//! The board is the only game state. It changes through exactly one
//! operation, [`Board::try_apply_move`] (and its boolean form
//! [`Board::apply_move`]), which either applies a move completely or leaves
//! the board untouched.
//!
//! # Wire form
//!
//! ```text
//! [cell 0] .. [cell 8] [turn] [outcome]
//! ```
//!
//! Cells are row-major. Cell and turn bytes are [`Symbol`] values. The
//! outcome byte is 0 while the game runs, the winning symbol's value for a
//! win, and 3 for a draw.

use std::fmt;

use noughts_proto::{BOARD_STATE_LEN, BoardState};

use crate::error::{BoardError, MoveError};

/// Every line that wins: 3 rows, 3 columns, 2 diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A cell's mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Symbol {
    /// No mark
    #[default]
    Empty = 0,
    /// Mark of the participant who moves first (X)
    First = 1,
    /// Mark of the participant who moves second (O)
    Second = 2,
}

impl Symbol {
    /// Parse a symbol byte. `None` for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Empty),
            1 => Some(Self::First),
            2 => Some(Self::Second),
            _ => None,
        }
    }

    /// Raw symbol byte.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// The other playable symbol. `Empty` maps to itself.
    pub fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
            Self::Empty => Self::Empty,
        }
    }

    /// Character drawn for this symbol.
    pub fn mark(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::First => 'X',
            Self::Second => 'O',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mark())
    }
}

/// Terminal result of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// First completed a line
    FirstWins,
    /// Second completed a line
    SecondWins,
    /// Board filled without a line
    Draw,
}

impl Outcome {
    /// Draw marker in the wire form.
    const DRAW_BYTE: u8 = 3;

    /// Outcome of a line completed by `symbol`. `None` for `Empty`.
    pub fn win_for(symbol: Symbol) -> Option<Self> {
        match symbol {
            Symbol::First => Some(Self::FirstWins),
            Symbol::Second => Some(Self::SecondWins),
            Symbol::Empty => None,
        }
    }

    /// Winning symbol, or `None` for a draw.
    pub fn winner(self) -> Option<Symbol> {
        match self {
            Self::FirstWins => Some(Symbol::First),
            Self::SecondWins => Some(Symbol::Second),
            Self::Draw => None,
        }
    }

    /// One-line human summary.
    pub fn summary(self) -> String {
        match self.winner() {
            Some(symbol) => format!("{symbol} wins!"),
            None => "It's a draw!".to_string(),
        }
    }

    fn to_u8(outcome: Option<Self>) -> u8 {
        match outcome {
            None => 0,
            Some(Self::FirstWins) => Symbol::First.to_u8(),
            Some(Self::SecondWins) => Symbol::Second.to_u8(),
            Some(Self::Draw) => Self::DRAW_BYTE,
        }
    }

    fn from_u8(value: u8) -> Result<Option<Self>, BoardError> {
        match value {
            0 => Ok(None),
            1 => Ok(Some(Self::FirstWins)),
            2 => Ok(Some(Self::SecondWins)),
            Self::DRAW_BYTE => Ok(Some(Self::Draw)),
            _ => Err(BoardError::InvalidOutcome(value)),
        }
    }
}

/// 3×3 board with turn and outcome.
///
/// # Invariants
///
/// - Each accepted move fills exactly one previously empty cell.
/// - `turn` alternates between `First` and `Second` after every accepted move
///   until `outcome` is set. It is never `Empty`.
/// - Once `outcome` is set no further move is accepted.
/// - A completed line takes precedence over a full board: the winning line
///   is checked before fullness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Symbol; Self::CELLS],
    turn: Symbol,
    outcome: Option<Outcome>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Number of cells.
    pub const CELLS: usize = 9;

    /// Empty board with `First` to move.
    pub fn new() -> Self {
        Self { cells: [Symbol::Empty; Self::CELLS], turn: Symbol::First, outcome: None }
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Symbol; Self::CELLS] {
        &self.cells
    }

    /// Cell at `position`. `None` outside the board.
    pub fn cell(&self, position: usize) -> Option<Symbol> {
        self.cells.get(position).copied()
    }

    /// Symbol that moves next. Meaningless once the board is terminal.
    pub fn turn(&self) -> Symbol {
        self.turn
    }

    /// Outcome, if the game has ended.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether the game has ended.
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// Validate a move without applying it.
    pub fn check_move(&self, symbol: Symbol, position: u8) -> Result<(), MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }
        let Some(cell) = self.cell(usize::from(position)) else {
            return Err(MoveError::InvalidPosition(position));
        };
        if symbol != self.turn {
            return Err(MoveError::NotYourTurn);
        }
        if cell != Symbol::Empty {
            return Err(MoveError::CellOccupied(position));
        }
        Ok(())
    }

    /// Apply a move, returning the outcome it produced (if any).
    ///
    /// On success the mark is placed, the outcome is recomputed and, if the
    /// game continues, the turn passes to the opponent. On error the board is
    /// unchanged.
    pub fn try_apply_move(
        &mut self,
        symbol: Symbol,
        position: u8,
    ) -> Result<Option<Outcome>, MoveError> {
        self.check_move(symbol, position)?;

        self.cells[usize::from(position)] = symbol;

        // Line before fullness: a last-cell win is a win, not a draw
        self.outcome = match self.winning_line() {
            Some(winner) => Outcome::win_for(winner),
            None if self.cells.iter().all(|c| *c != Symbol::Empty) => Some(Outcome::Draw),
            None => None,
        };

        if self.outcome.is_none() {
            self.turn = self.turn.opponent();
        }

        Ok(self.outcome)
    }

    /// Apply a move. Returns whether it was accepted.
    pub fn apply_move(&mut self, symbol: Symbol, position: u8) -> bool {
        self.try_apply_move(symbol, position).is_ok()
    }

    fn winning_line(&self) -> Option<Symbol> {
        LINES.iter().find_map(|[a, b, c]| {
            let first = self.cells[*a];
            (first != Symbol::Empty && first == self.cells[*b] && first == self.cells[*c])
                .then_some(first)
        })
    }

    /// Serialize to the 11-byte wire form.
    pub fn serialize(&self) -> BoardState {
        let mut state = [0u8; BOARD_STATE_LEN];
        for (byte, cell) in state.iter_mut().zip(self.cells.iter()) {
            *byte = cell.to_u8();
        }
        state[Self::CELLS] = self.turn.to_u8();
        state[Self::CELLS + 1] = Outcome::to_u8(self.outcome);
        state
    }

    /// Parse the 11-byte wire form. Exact inverse of [`Board::serialize`].
    pub fn deserialize(bytes: &[u8]) -> Result<Self, BoardError> {
        if bytes.len() != BOARD_STATE_LEN {
            return Err(BoardError::InvalidLength {
                expected: BOARD_STATE_LEN,
                actual: bytes.len(),
            });
        }

        let mut cells = [Symbol::Empty; Self::CELLS];
        for (position, (cell, value)) in cells.iter_mut().zip(bytes.iter()).enumerate() {
            *cell = Symbol::from_u8(*value)
                .ok_or(BoardError::InvalidCell { position, value: *value })?;
        }

        let turn = match Symbol::from_u8(bytes[Self::CELLS]) {
            Some(symbol @ (Symbol::First | Symbol::Second)) => symbol,
            _ => return Err(BoardError::InvalidTurn(bytes[Self::CELLS])),
        };
        let outcome = Outcome::from_u8(bytes[Self::CELLS + 1])?;

        Ok(Self { cells, turn, outcome })
    }
}
