//! Wire protocol for noughts sessions.
//!
//! Every message on the wire is a Type-Length-Value [`Frame`]:
//!
//! ```text
//! [type: u8][length: u16 BE][value: length bytes]
//! ```
//!
//! This crate is pure: no sockets, no runtime. [`Frame`] handles the envelope,
//! [`Message`] gives the typed view of a frame, and [`FrameDecoder`] turns an
//! arbitrary sequence of partial reads back into whole frames.

#![forbid(unsafe_code)]

pub mod decoder;
pub mod errors;
pub mod frame;
pub mod message;

pub use decoder::FrameDecoder;
pub use errors::{ProtocolError, Result};
pub use frame::Frame;
pub use message::{BOARD_STATE_LEN, BoardState, Message, MessageType, RejectReason};

/// Port the server listens on when no bind address is configured.
pub const DEFAULT_PORT: u16 = 8080;
