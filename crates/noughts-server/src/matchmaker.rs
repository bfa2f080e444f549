//! Matchmaker: pairs arriving connections into sessions.
//!
//! The registry keeps every live session by id plus at most one "open"
//! session, the one still waiting for its second participant. The registry
//! lock is held only while looking up, creating or registering a session;
//! it is never held across I/O.
//!
//! Lock order is registry, then session. Nothing takes a session lock and
//! then asks the matchmaker for anything.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use noughts_core::{RoomError, RoomId, Symbol};

use crate::{connection::ConnectionHandle, session::Session};

/// Assigns connections to sessions.
#[derive(Debug)]
pub struct Matchmaker {
    registry: Mutex<Registry>,
    echo_rejections: bool,
}

#[derive(Debug)]
struct Registry {
    /// Room ID → session
    sessions: HashMap<RoomId, Arc<Session>>,
    /// Session waiting for a second participant
    open: Option<Arc<Session>>,
    next_id: RoomId,
}

impl Registry {
    fn allocate_id(&mut self) -> RoomId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for Matchmaker {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Matchmaker {
    /// Create an empty matchmaker. `echo_rejections` is applied to every
    /// session it creates.
    pub fn new(echo_rejections: bool) -> Self {
        Self {
            registry: Mutex::new(Registry { sessions: HashMap::new(), open: None, next_id: 1 }),
            echo_rejections,
        }
    }

    /// Whether refused moves are answered with a `Rejected` frame.
    pub fn echo_rejections(&self) -> bool {
        self.echo_rejections
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seat a connection in the open session, or in a new one.
    ///
    /// This is the only place sessions are created. A session that fills up
    /// stops being the open session.
    ///
    /// # Errors
    ///
    /// `RoomError::AlreadySeated` if the connection already sits in the open
    /// session. Full or closed sessions are skipped, never reported.
    pub fn admit(
        &self,
        handle: ConnectionHandle,
        name: &str,
    ) -> Result<(Arc<Session>, Symbol), RoomError> {
        let mut registry = self.lock();

        if let Some(open) = registry.open.clone() {
            match open.join(handle.clone(), name) {
                Ok(symbol) => {
                    if !open.is_open() {
                        registry.open = None;
                    }
                    return Ok((open, symbol));
                },
                Err(err) if err.is_retryable_elsewhere() => {
                    tracing::debug!(%err, "open session unavailable, creating another");
                    registry.open = None;
                },
                Err(err) => return Err(err),
            }
        }

        let id = registry.allocate_id();
        let session = Arc::new(Session::new(id, self.echo_rejections));
        registry.sessions.insert(id, Arc::clone(&session));
        tracing::info!(room_id = id, "session created");

        let symbol = session.join(handle, name)?;
        if session.is_open() {
            registry.open = Some(Arc::clone(&session));
        }

        Ok((session, symbol))
    }

    /// Drop a closed session from the registry.
    ///
    /// Returns `false` if the session is unknown or still running.
    pub fn release(&self, room_id: RoomId) -> bool {
        let mut registry = self.lock();

        let closed = registry.sessions.get(&room_id).is_some_and(|session| session.is_closed());
        if !closed {
            return false;
        }

        registry.sessions.remove(&room_id);
        if registry.open.as_ref().is_some_and(|open| open.id() == room_id) {
            registry.open = None;
        }
        tracing::debug!(room_id, "session released");
        true
    }

    /// Look up a registered session.
    pub fn session(&self, room_id: RoomId) -> Option<Arc<Session>> {
        self.lock().sessions.get(&room_id).cloned()
    }

    /// Id of the session waiting for a second participant.
    pub fn open_session(&self) -> Option<RoomId> {
        self.lock().open.as_ref().map(|session| session.id())
    }

    /// Number of registered sessions.
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }
}
