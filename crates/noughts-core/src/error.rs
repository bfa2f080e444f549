//! Error types for board and room state machines.

use thiserror::Error;

use crate::room::{ConnectionId, RoomId};

/// Reasons a move is refused by the board.
///
/// A refused move never changes the board.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// Position outside `0..9`
    #[error("position {0} is outside the board")]
    InvalidPosition(u8),

    /// Target cell already holds a mark
    #[error("cell {0} is already occupied")]
    CellOccupied(u8),

    /// Mover is not the symbol whose turn it is
    #[error("not your turn")]
    NotYourTurn,

    /// Board already has an outcome
    #[error("game is over")]
    GameOver,
}

/// Errors from deserializing a board.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// Serialized board has the wrong size
    #[error("board state must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required size
        expected: usize,
        /// Size supplied
        actual: usize,
    },

    /// Cell byte is not a symbol
    #[error("invalid symbol {value} in cell {position}")]
    InvalidCell {
        /// Cell index
        position: usize,
        /// Offending byte
        value: u8,
    },

    /// Turn byte is not a playable symbol
    #[error("invalid turn byte {0}")]
    InvalidTurn(u8),

    /// Outcome byte is out of range
    #[error("invalid outcome byte {0}")]
    InvalidOutcome(u8),
}

/// Errors from room membership operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Both seats are taken
    #[error("room {0} is full")]
    SessionFull(RoomId),

    /// Room has ended and accepts nobody
    #[error("room {0} is closed")]
    SessionClosed(RoomId),

    /// Connection already holds a seat here
    #[error("connection {connection} already seated in room {room_id}")]
    AlreadySeated {
        /// Room
        room_id: RoomId,
        /// Connection
        connection: ConnectionId,
    },
}

impl RoomError {
    /// Returns true if the caller should try a different room.
    ///
    /// Full and closed rooms are routine during matchmaking and never reach
    /// the remote peer.
    pub fn is_retryable_elsewhere(&self) -> bool {
        matches!(self, Self::SessionFull(_) | Self::SessionClosed(_))
    }
}
