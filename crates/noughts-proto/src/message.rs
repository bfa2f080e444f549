//! Typed protocol messages.
//!
//! Frames carry raw bytes; a `Message` is the typed view of one frame. The
//! frame's type byte selects the variant and the value is the variant's
//! payload, with no further tagging.
//!
//! # Invariants
//!
//! Each message variant maps to exactly one [`MessageType`] (enforced by match
//! exhaustiveness). Converting a message into a frame and back yields the same
//! message.

use bytes::Bytes;

use crate::{
    Frame,
    errors::{ProtocolError, Result},
};

/// Size of a serialized board: 9 cells, the turn, the outcome.
pub const BOARD_STATE_LEN: usize = 11;

/// Serialized board as carried by [`Message::State`].
pub type BoardState = [u8; BOARD_STATE_LEN];

/// Message type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Client asks to be seated, payload is its display name
    Join = 1,
    /// Client places its mark, payload is one position byte
    MakeMove = 2,
    /// Server broadcasts the board
    State = 3,
    /// Server announces the final outcome
    GameOver = 4,
    /// Server reports that the opponent left
    PlayerLeft = 5,
    /// Server tells the first joiner to wait
    Waiting = 6,
    /// Server announces the game start
    GameStart = 7,
    /// Server reports a fatal error
    Error = 8,
    /// Server tells a participant its mark
    Assigned = 9,
    /// Server explains why a move was refused
    Rejected = 10,
}

impl MessageType {
    /// Parse a type byte. `None` for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::Join,
            2 => Self::MakeMove,
            3 => Self::State,
            4 => Self::GameOver,
            5 => Self::PlayerLeft,
            6 => Self::Waiting,
            7 => Self::GameStart,
            8 => Self::Error,
            9 => Self::Assigned,
            10 => Self::Rejected,
            _ => return None,
        })
    }

    /// Raw type byte.
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        value.to_u8()
    }
}

/// Reason carried by a [`Message::Rejected`] frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RejectReason {
    /// It is the other participant's turn
    NotYourTurn = 1,
    /// Position outside 0..9
    InvalidPosition = 2,
    /// Target cell already holds a mark
    CellOccupied = 3,
    /// The game already has an outcome or the session is closed
    GameOver = 4,
    /// The second participant has not joined yet
    WaitingForOpponent = 5,
    /// The sender holds no seat in the session
    NotSeated = 6,
}

impl RejectReason {
    /// Parse a reason code. `None` for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::NotYourTurn,
            2 => Self::InvalidPosition,
            3 => Self::CellOccupied,
            4 => Self::GameOver,
            5 => Self::WaitingForOpponent,
            6 => Self::NotSeated,
            _ => return None,
        })
    }

    /// Human-readable explanation.
    pub fn describe(self) -> &'static str {
        match self {
            Self::NotYourTurn => "it is not your turn",
            Self::InvalidPosition => "that position is not on the board",
            Self::CellOccupied => "that cell is already taken",
            Self::GameOver => "the game is over",
            Self::WaitingForOpponent => "waiting for an opponent",
            Self::NotSeated => "you have not joined a game",
        }
    }
}

/// All protocol messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Request a seat under this display name
    Join {
        /// Display name
        name: String,
    },
    /// Place the sender's mark
    MakeMove {
        /// Board position, row-major. Range is checked by the board, not here.
        position: u8,
    },
    /// Current board
    State(BoardState),
    /// Final outcome summary
    GameOver(String),
    /// Opponent disconnected; ends participation
    PlayerLeft(String),
    /// Waiting for a second participant
    Waiting(String),
    /// Both seats filled
    GameStart(String),
    /// Fatal error; ends participation
    Error(String),
    /// Mark assigned to the recipient
    Assigned {
        /// 1 for the first-moving mark, 2 for the other
        symbol: u8,
    },
    /// The recipient's last move was refused
    Rejected(RejectReason),
}

impl Message {
    /// Type byte this message is sent under.
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Join { .. } => MessageType::Join,
            Self::MakeMove { .. } => MessageType::MakeMove,
            Self::State(_) => MessageType::State,
            Self::GameOver(_) => MessageType::GameOver,
            Self::PlayerLeft(_) => MessageType::PlayerLeft,
            Self::Waiting(_) => MessageType::Waiting,
            Self::GameStart(_) => MessageType::GameStart,
            Self::Error(_) => MessageType::Error,
            Self::Assigned { .. } => MessageType::Assigned,
            Self::Rejected(_) => MessageType::Rejected,
        }
    }

    /// Whether receiving this message ends the recipient's participation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PlayerLeft(_) | Self::Error(_))
    }

    /// Convert into a wire frame.
    ///
    /// Size limits are enforced when the frame is encoded.
    pub fn into_frame(self) -> Frame {
        let message_type = self.message_type();
        let payload = match self {
            Self::Join { name } => Bytes::from(name),
            Self::MakeMove { position } => Bytes::copy_from_slice(&[position]),
            Self::State(state) => Bytes::copy_from_slice(&state),
            Self::GameOver(text)
            | Self::PlayerLeft(text)
            | Self::Waiting(text)
            | Self::GameStart(text)
            | Self::Error(text) => Bytes::from(text),
            Self::Assigned { symbol } => Bytes::copy_from_slice(&[symbol]),
            Self::Rejected(reason) => Bytes::copy_from_slice(&[reason as u8]),
        };
        Frame::new(message_type, payload)
    }

    /// Parse the typed message out of a frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UnknownMessageType` for an unrecognized type byte
    /// - `ProtocolError::InvalidPayload` if the value has the wrong shape
    /// - `ProtocolError::InvalidUtf8` if a text value is not UTF-8
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let message_type = frame
            .kind()
            .ok_or(ProtocolError::UnknownMessageType(frame.message_type))?;
        let payload = &frame.payload[..];

        let message = match message_type {
            MessageType::Join => Self::Join { name: text(payload)? },
            MessageType::MakeMove => Self::MakeMove { position: single_byte(message_type, payload)? },
            MessageType::State => {
                let state = BoardState::try_from(payload).map_err(|_| {
                    ProtocolError::InvalidPayload { message_type, reason: "expected 11 bytes" }
                })?;
                Self::State(state)
            },
            MessageType::GameOver => Self::GameOver(text(payload)?),
            MessageType::PlayerLeft => Self::PlayerLeft(text(payload)?),
            MessageType::Waiting => Self::Waiting(text(payload)?),
            MessageType::GameStart => Self::GameStart(text(payload)?),
            MessageType::Error => Self::Error(text(payload)?),
            MessageType::Assigned => {
                let symbol = single_byte(message_type, payload)?;
                if !matches!(symbol, 1 | 2) {
                    return Err(ProtocolError::InvalidPayload {
                        message_type,
                        reason: "symbol must be 1 or 2",
                    });
                }
                Self::Assigned { symbol }
            },
            MessageType::Rejected => {
                let code = single_byte(message_type, payload)?;
                let reason = RejectReason::from_u8(code).ok_or(ProtocolError::InvalidPayload {
                    message_type,
                    reason: "unknown reject reason",
                })?;
                Self::Rejected(reason)
            },
        };

        Ok(message)
    }
}

fn text(payload: &[u8]) -> Result<String> {
    String::from_utf8(payload.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
}

fn single_byte(message_type: MessageType, payload: &[u8]) -> Result<u8> {
    match payload {
        [byte] => Ok(*byte),
        _ => Err(ProtocolError::InvalidPayload { message_type, reason: "expected exactly 1 byte" }),
    }
}
