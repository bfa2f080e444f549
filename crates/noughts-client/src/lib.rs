//! Terminal client for noughts.
//!
//! # Components
//!
//! - [`ClientApp`]: pure state machine from server messages and input lines
//!   to actions
//! - [`parse_position`]: `row col` / cell-number parsing
//! - [`render_board`]: text board with labels and status
//! - [`run`]: Tokio runtime over TCP and the terminal

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod app;
mod error;
mod input;
mod render;
mod runtime;

pub use app::{ClientAction, ClientApp, ClientEvent};
pub use error::{ClientError, InputError};
pub use input::{Command, parse_command, parse_position};
pub use render::{CLEAR_SCREEN, render_board};
pub use runtime::{ClientConfig, run, run_session};
