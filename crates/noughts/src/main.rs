//! Noughts binary.
//!
//! # Usage
//!
//! ```bash
//! # Start the server on the default port (8080)
//! noughts server
//!
//! # Join a game
//! noughts client --server 127.0.0.1:8080
//! ```

use clap::{Parser, Subcommand};
use noughts_client::ClientConfig;
use noughts_server::{Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Two-player noughts and crosses over TCP
#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Two-player noughts and crosses over TCP")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Accept players and pair them into games
    Server {
        /// Address to bind to
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        bind: String,

        /// Answer refused moves with a rejection frame
        #[arg(long)]
        echo_rejections: bool,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long, default_value = "info")]
        log_level: String,
    },

    /// Play a game from this terminal
    Client {
        /// Server address
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        server: String,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long, default_value = "warn")]
        log_level: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Args::parse().role {
        Role::Server { bind, echo_rejections, log_level } => {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&log_level));
            tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

            tracing::info!("Noughts server starting");
            tracing::info!("Binding to {}", bind);

            let config = ServerConfig { bind_address: bind, echo_rejections, ..Default::default() };
            let server = Server::bind(config).await.inspect_err(|e| tracing::error!("{e}"))?;
            server.run().await?;
        },

        Role::Client { server, log_level } => {
            // The board owns stdout
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&log_level));
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();

            noughts_client::run(ClientConfig { server_address: server }).await?;
        },
    }

    Ok(())
}
