//! Session monitor.
//!
//! A [`Session`] is a [`Room`] plus the outbound handles of its participants,
//! behind one mutex. Every command locks the session, applies the room
//! transition and executes the resulting [`RoomAction`]s before unlocking, so
//! two participants observe broadcasts in the order mutations happened.
//!
//! Executing an action never blocks: frames are queued on the participant's
//! unbounded outbound channel and written by that connection's writer task.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use noughts_core::{
    Board, ConnectionId, MoveResult, Room, RoomAction, RoomError, RoomId, RoomPhase, Symbol,
};

use crate::{connection::ConnectionHandle, error::ServerError};

/// One game between up to two connections.
#[derive(Debug)]
pub struct Session {
    id: RoomId,
    state: Mutex<SessionState>,
}

#[derive(Debug)]
struct SessionState {
    room: Room,
    connections: HashMap<ConnectionId, ConnectionHandle>,
}

impl Session {
    /// Create an empty session.
    pub fn new(id: RoomId, echo_rejections: bool) -> Self {
        Self {
            id,
            state: Mutex::new(SessionState {
                room: Room::new(id).with_rejection_echo(echo_rejections),
                connections: HashMap::new(),
            }),
        }
    }

    /// Session (room) identifier.
    pub fn id(&self) -> RoomId {
        self.id
    }

    // A panic while holding the lock leaves the room in a state reached by
    // whole transitions only, so the data is still usable.
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seat `handle`'s connection.
    ///
    /// # Errors
    ///
    /// - `RoomError::SessionFull` if both seats are taken
    /// - `RoomError::SessionClosed` if a participant already left
    /// - `RoomError::AlreadySeated` if the connection is already seated here
    pub fn join(&self, handle: ConnectionHandle, name: &str) -> Result<Symbol, RoomError> {
        let mut state = self.lock();
        let connection = handle.id();
        let (symbol, actions) = state.room.join(connection, name)?;

        state.connections.insert(connection, handle);
        tracing::info!(room_id = self.id, connection, %symbol, "participant joined");
        if state.room.phase() == RoomPhase::Playing {
            tracing::info!(room_id = self.id, "game started");
        }

        state.execute(self.id, actions);
        Ok(symbol)
    }

    /// Apply a move for `connection`. Refused moves change nothing.
    pub fn submit_move(&self, connection: ConnectionId, position: u8) -> MoveResult {
        let mut state = self.lock();
        let (result, actions) = state.room.submit_move(connection, position);

        match result {
            MoveResult::Applied { outcome: Some(outcome) } => {
                tracing::info!(room_id = self.id, connection, position, "{}", outcome.summary());
            },
            MoveResult::Applied { outcome: None } => {
                tracing::debug!(room_id = self.id, connection, position, "move applied");
            },
            refused => {
                tracing::debug!(room_id = self.id, connection, position, ?refused, "move refused");
            },
        }

        state.execute(self.id, actions);
        result
    }

    /// Remove `connection` and end the session.
    ///
    /// The remaining participant is notified and closed. Calling this again,
    /// or for a connection that never joined, does nothing.
    pub fn disconnect(&self, connection: ConnectionId) {
        let mut state = self.lock();
        if state.connections.remove(&connection).is_none() {
            return;
        }

        let actions = state.room.disconnect(connection);
        tracing::info!(room_id = self.id, connection, "participant left, session closed");
        state.execute(self.id, actions);
    }

    /// Whether the session can take another participant.
    pub fn is_open(&self) -> bool {
        self.lock().room.is_open()
    }

    /// Whether a participant has left.
    pub fn is_closed(&self) -> bool {
        self.lock().room.is_closed()
    }

    /// Number of seated participants.
    pub fn participant_count(&self) -> usize {
        self.lock().room.participant_count()
    }

    /// Snapshot of the board.
    pub fn board(&self) -> Board {
        self.lock().room.board().clone()
    }
}

impl SessionState {
    fn execute(&mut self, room_id: RoomId, actions: Vec<RoomAction>) {
        for action in actions {
            match action {
                RoomAction::Send { connection, message } => {
                    let message_type = message.message_type();
                    let bytes = match message.into_frame().to_bytes().map_err(ServerError::from) {
                        Ok(bytes) => bytes,
                        Err(err) => {
                            tracing::error!(room_id, connection, %err, "failed to encode frame");
                            continue;
                        },
                    };

                    match self.connections.get(&connection) {
                        Some(handle) => {
                            tracing::debug!(room_id, connection, ?message_type, "send");
                            if !handle.send(bytes) {
                                tracing::debug!(room_id, connection, "writer already gone");
                            }
                        },
                        None => {
                            tracing::warn!(room_id, connection, "send to unknown connection");
                        },
                    }
                },

                RoomAction::Close { connection, reason } => {
                    tracing::info!(room_id, connection, "closing connection: {reason}");
                    if let Some(handle) = self.connections.remove(&connection) {
                        handle.close();
                    }
                },
            }
        }
    }
}
