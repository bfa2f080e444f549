//! Client error types.

use noughts_proto::ProtocolError;
use thiserror::Error;

/// Errors that end a client session.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Could not reach the server.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        /// Address we tried
        address: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the server failed.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// An outgoing message could not be framed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Reading the terminal failed.
    #[error("input error: {0}")]
    Input(#[source] std::io::Error),
}

/// Rejected line of user input. Never fatal: the user is told and asked again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Neither `row col` nor a single cell number.
    #[error("Enter a position as 'row col' (e.g. '2 1') or a cell number 1-9")]
    Unrecognized,

    /// Row or column outside 1-3.
    #[error("Row and column must each be 1-3, got {row} {column}")]
    CoordinateOutOfRange {
        /// Row as typed
        row: u32,
        /// Column as typed
        column: u32,
    },

    /// Cell number outside 1-9.
    #[error("Cell number must be 1-9, got {0}")]
    IndexOutOfRange(u32),
}
