//! Room state machine.
//!
//! A room seats at most two connections around one [`Board`]. Commands
//! (`join`, `submit_move`, `disconnect`) mutate the room and return
//! [`RoomAction`]s describing what the driver must send or close. The room
//! never touches a socket, so the driver decides how actions are delivered;
//! it must execute them in order and before the next command is applied, so
//! peers observe broadcasts in mutation order.
//!
//! # Lifecycle
//!
//! ```text
//! ┌─────────┐ second join ┌─────────┐
//! │ Waiting │────────────>│ Playing │
//! └─────────┘             └─────────┘
//!      │                       │
//!      │ disconnect            │ disconnect
//!      ↓                       ↓
//! ┌──────────────────────────────────┐
//! │              Closed              │
//! └──────────────────────────────────┘
//! ```
//!
//! A finished game stays in `Playing` with a terminal board until one of the
//! participants leaves.

use noughts_proto::{Message, RejectReason};

use crate::{
    board::{Board, Outcome, Symbol},
    error::{MoveError, RoomError},
};

/// Room identifier, unique within one matchmaker.
pub type RoomId = u64;

/// Connection identifier, unique within one server.
pub type ConnectionId = u64;

/// Status text sent to the first participant.
pub const WAITING_TEXT: &str = "Waiting for another player...";

/// Notice sent to the remaining participant when the other leaves.
pub const OPPONENT_LEFT_TEXT: &str = "Opponent disconnected! Game ended.";

/// Longest display name kept, in characters. Longer names are truncated so
/// the personalised start text always fits in one frame.
pub const MAX_NAME_CHARS: usize = 32;

/// Seat order fixes symbol order: the first joiner always moves first.
const SEAT_SYMBOLS: [Symbol; 2] = [Symbol::First, Symbol::Second];

/// An occupied seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    /// Connection holding the seat
    pub connection: ConnectionId,
    /// Symbol assigned at join time, permanent for the room's lifetime
    pub symbol: Symbol,
    /// Display name supplied in the join request
    pub name: String,
}

/// Room lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// One seat filled, accepting a second participant
    Waiting,
    /// Both seats filled
    Playing,
    /// A participant left; nothing more is accepted
    Closed,
}

/// Side effects for the driver to execute, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomAction {
    /// Send a message to one connection
    Send {
        /// Recipient
        connection: ConnectionId,
        /// Message to deliver
        message: Message,
    },

    /// Close a connection after everything queued for it has been sent
    Close {
        /// Connection to close
        connection: ConnectionId,
        /// Why it is being closed
        reason: String,
    },
}

/// Result of a submitted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// Move applied and broadcast
    Applied {
        /// Outcome reached by this move, if it ended the game
        outcome: Option<Outcome>,
    },
    /// Move refused for a reason other than turn order or game end
    Rejected(RejectReason),
    /// Sender's symbol is not the one to move
    NotYourTurn,
    /// The board is terminal or the room is closed
    GameOver,
}

impl MoveResult {
    /// Whether the move changed the board.
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Reason code for a refused move. `None` if the move was applied.
    pub fn reject_reason(self) -> Option<RejectReason> {
        match self {
            Self::Applied { .. } => None,
            Self::Rejected(reason) => Some(reason),
            Self::NotYourTurn => Some(RejectReason::NotYourTurn),
            Self::GameOver => Some(RejectReason::GameOver),
        }
    }
}

impl From<MoveError> for MoveResult {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::InvalidPosition(_) => Self::Rejected(RejectReason::InvalidPosition),
            MoveError::CellOccupied(_) => Self::Rejected(RejectReason::CellOccupied),
            MoveError::NotYourTurn => Self::NotYourTurn,
            MoveError::GameOver => Self::GameOver,
        }
    }
}

/// Two seats around one board.
///
/// # Invariants
///
/// - Symbols are handed out in seat order and never reassigned; both seats
///   never hold the same symbol.
/// - A move is applied only for the seat whose symbol equals the board's turn.
/// - `Closed` is terminal: no joins, no moves.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    board: Board,
    seats: [Option<Seat>; 2],
    phase: RoomPhase,
    echo_rejections: bool,
}

impl Room {
    /// Create an empty room.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            board: Board::new(),
            seats: [None, None],
            phase: RoomPhase::Waiting,
            echo_rejections: false,
        }
    }

    /// Send a [`Message::Rejected`] to the mover when a move is refused.
    ///
    /// Off by default: refused moves are silently dropped.
    #[must_use]
    pub fn with_rejection_echo(mut self, enabled: bool) -> Self {
        self.echo_rejections = enabled;
        self
    }

    /// Room identifier.
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Number of occupied seats.
    pub fn participant_count(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    /// Whether a new participant could join right now.
    pub fn is_open(&self) -> bool {
        self.phase == RoomPhase::Waiting && self.participant_count() < SEAT_SYMBOLS.len()
    }

    /// Whether the room has ended.
    pub fn is_closed(&self) -> bool {
        self.phase == RoomPhase::Closed
    }

    /// Seat held by `connection`.
    pub fn seat(&self, connection: ConnectionId) -> Option<&Seat> {
        self.seats.iter().flatten().find(|seat| seat.connection == connection)
    }

    /// Seat a connection.
    ///
    /// The first joiner receives [`Symbol::First`], the second
    /// [`Symbol::Second`]. The second join starts the game. Names are cut to
    /// [`MAX_NAME_CHARS`].
    ///
    /// # Errors
    ///
    /// - `RoomError::SessionClosed` if the room has ended
    /// - `RoomError::AlreadySeated` if `connection` already holds a seat
    /// - `RoomError::SessionFull` if both seats are taken
    pub fn join(
        &mut self,
        connection: ConnectionId,
        name: &str,
    ) -> Result<(Symbol, Vec<RoomAction>), RoomError> {
        if self.is_closed() {
            return Err(RoomError::SessionClosed(self.id));
        }
        if self.seat(connection).is_some() {
            return Err(RoomError::AlreadySeated { room_id: self.id, connection });
        }

        let index = self
            .seats
            .iter()
            .position(Option::is_none)
            .ok_or(RoomError::SessionFull(self.id))?;
        let symbol = SEAT_SYMBOLS[index];
        let name = match name.trim() {
            "" => format!("Player {}", index + 1),
            trimmed => trimmed.chars().take(MAX_NAME_CHARS).collect(),
        };

        self.seats[index] = Some(Seat { connection, symbol, name });

        let mut actions = vec![RoomAction::Send {
            connection,
            message: Message::Assigned { symbol: symbol.to_u8() },
        }];

        if self.participant_count() < SEAT_SYMBOLS.len() {
            actions.push(RoomAction::Send {
                connection,
                message: Message::Waiting(WAITING_TEXT.to_string()),
            });
        } else {
            self.phase = RoomPhase::Playing;
            actions.extend(self.start_actions());
        }

        Ok((symbol, actions))
    }

    fn start_actions(&self) -> Vec<RoomAction> {
        let mut actions = Vec::new();
        for seat in self.seats.iter().flatten() {
            let opponent = self
                .seats
                .iter()
                .flatten()
                .find(|other| other.connection != seat.connection)
                .map_or("nobody", |other| other.name.as_str());
            actions.push(RoomAction::Send {
                connection: seat.connection,
                message: Message::GameStart(format!(
                    "Game started! You are {}, playing against {opponent}.",
                    seat.symbol
                )),
            });
        }
        actions.extend(self.broadcast(&Message::State(self.board.serialize())));
        actions
    }

    fn broadcast(&self, message: &Message) -> Vec<RoomAction> {
        self.seats
            .iter()
            .flatten()
            .map(|seat| RoomAction::Send { connection: seat.connection, message: message.clone() })
            .collect()
    }

    /// Apply a move on behalf of `connection`.
    ///
    /// Applied moves broadcast the new board to both seats, followed by a
    /// [`Message::GameOver`] summary if the move ended the game. Refused moves
    /// change nothing and broadcast nothing.
    pub fn submit_move(
        &mut self,
        connection: ConnectionId,
        position: u8,
    ) -> (MoveResult, Vec<RoomAction>) {
        let result = self.try_move(connection, position);

        let actions = match result {
            MoveResult::Applied { outcome } => {
                let mut actions = self.broadcast(&Message::State(self.board.serialize()));
                if let Some(outcome) = outcome {
                    actions.extend(self.broadcast(&Message::GameOver(outcome.summary())));
                }
                actions
            },
            refused if self.echo_rejections => refused
                .reject_reason()
                .map(|reason| RoomAction::Send { connection, message: Message::Rejected(reason) })
                .into_iter()
                .collect(),
            _ => Vec::new(),
        };

        (result, actions)
    }

    fn try_move(&mut self, connection: ConnectionId, position: u8) -> MoveResult {
        let Some(symbol) = self.seat(connection).map(|seat| seat.symbol) else {
            return MoveResult::Rejected(RejectReason::NotSeated);
        };

        match self.phase {
            RoomPhase::Closed => MoveResult::GameOver,
            RoomPhase::Waiting => MoveResult::Rejected(RejectReason::WaitingForOpponent),
            RoomPhase::Playing => match self.board.try_apply_move(symbol, position) {
                Ok(outcome) => MoveResult::Applied { outcome },
                Err(err) => err.into(),
            },
        }
    }

    /// Remove `connection` and end the room.
    ///
    /// The remaining participant, if any, is told the opponent left and is
    /// closed too: a room cannot continue with one participant. Unknown
    /// connections are ignored, so calling this twice is harmless.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Vec<RoomAction> {
        let Some(index) = self
            .seats
            .iter()
            .position(|seat| seat.as_ref().is_some_and(|s| s.connection == connection))
        else {
            return Vec::new();
        };

        self.seats[index] = None;
        self.phase = RoomPhase::Closed;

        let mut actions = Vec::new();
        for seat in self.seats.iter_mut().filter_map(Option::take) {
            actions.push(RoomAction::Send {
                connection: seat.connection,
                message: Message::PlayerLeft(OPPONENT_LEFT_TEXT.to_string()),
            });
            actions.push(RoomAction::Close {
                connection: seat.connection,
                reason: "opponent disconnected".to_string(),
            });
        }
        actions
    }
}
