//! Game logic for noughts sessions.
//!
//! Everything here is a pure state machine: no sockets, no clocks, no locks.
//! The server wraps these types with real I/O and synchronization.
//!
//! # Components
//!
//! - [`Board`]: 3×3 grid, turn tracking, win/draw detection
//! - [`Room`]: two seats around one board; turns commands into
//!   [`RoomAction`]s for the driver to execute

#![forbid(unsafe_code)]

pub mod board;
pub mod error;
pub mod room;

pub use board::{Board, Outcome, Symbol};
pub use error::{BoardError, MoveError, RoomError};
pub use room::{
    ConnectionId, MAX_NAME_CHARS, MoveResult, Room, RoomAction, RoomId, RoomPhase, Seat,
};
