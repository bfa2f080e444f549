//! Server configuration.

use noughts_proto::DEFAULT_PORT;

/// Server configuration for the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080")
    pub bind_address: String,
    /// Answer refused moves with a `Rejected` frame instead of dropping them
    pub echo_rejections: bool,
    /// Initial capacity of each connection's read buffer
    pub read_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("0.0.0.0:{DEFAULT_PORT}"),
            echo_rejections: false,
            read_buffer_size: 1024,
        }
    }
}
