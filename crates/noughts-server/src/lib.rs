//! Noughts game server.
//!
//! Wraps the Sans-IO [`noughts_core::Room`] with Tokio I/O: a TCP listener,
//! one task per connection and a mutex-guarded [`Session`] per game.
//!
//! # Components
//!
//! - [`Server`]: binds the listener and spawns a task per accepted connection
//! - [`Matchmaker`]: registry pairing arriving connections into sessions
//! - [`Session`]: a room plus its participants' outbound handles, behind one
//!   lock
//! - [`serve_connection`]: read loop for one connection

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod connection;
mod error;
mod matchmaker;
mod session;

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

pub use config::ServerConfig;
pub use connection::{ConnectionHandle, Outbound, serve_connection};
pub use error::ServerError;
pub use matchmaker::Matchmaker;
pub use session::Session;
use tokio::net::TcpListener;

/// TCP game server.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    matchmaker: Arc<Matchmaker>,
    read_buffer_size: usize,
    next_connection: AtomicU64,
}

impl Server {
    /// Bind the listener.
    ///
    /// # Errors
    ///
    /// `ServerError::Config` if the address cannot be bound. This is the one
    /// error that stops the server.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.bind_address.as_str()).await.map_err(|e| {
            ServerError::Config(format!("failed to bind {}: {e}", config.bind_address))
        })?;

        Ok(Self {
            listener,
            matchmaker: Arc::new(Matchmaker::new(config.echo_rejections)),
            read_buffer_size: config.read_buffer_size,
            next_connection: AtomicU64::new(1),
        })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Matchmaker shared by every connection.
    pub fn matchmaker(&self) -> Arc<Matchmaker> {
        Arc::clone(&self.matchmaker)
    }

    /// Accept connections until the task is dropped.
    ///
    /// Accept failures are logged and the loop continues.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Server listening on {}", self.local_addr()?);

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let connection = self.next_connection.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(connection, %peer, "accepted connection");

                    if let Err(e) = stream.set_nodelay(true) {
                        tracing::debug!(connection, "set_nodelay failed: {e}");
                    }

                    let matchmaker = Arc::clone(&self.matchmaker);
                    let read_buffer_size = self.read_buffer_size;
                    tokio::spawn(async move {
                        serve_connection(stream, connection, matchmaker, read_buffer_size).await;
                        tracing::debug!(connection, "connection finished");
                    });
                },
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                },
            }
        }
    }
}
