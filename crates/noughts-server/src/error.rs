//! Server error types.

use std::fmt;

use noughts_proto::ProtocolError;

/// Errors that can occur in the server.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error (bad bind address, port in use).
    ///
    /// Fatal: the server cannot start. Fix configuration and restart.
    Config(String),

    /// Transport/network error (accept failure, I/O error).
    ///
    /// Never fatal for the listener; a failed connection is treated as a
    /// disconnect of that connection only.
    Transport(String),

    /// Protocol error (frame could not be encoded or decoded).
    ///
    /// The offending frame is dropped and the connection continues.
    Protocol(ProtocolError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Protocol(err) => write!(f, "protocol error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProtocolError> for ServerError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
