//! Tokio runtime for the client.
//!
//! Connects to the server, asks for a display name, then multiplexes server
//! frames and input lines into [`ClientApp`] with `tokio::select!`. The I/O
//! endpoints are generic so tests can drive a whole session over in-memory
//! pipes.

use noughts_proto::{DEFAULT_PORT, FrameDecoder, Message};
use tokio::{
    io::{
        AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt,
        BufReader,
    },
    net::TcpStream,
};

use crate::{
    app::{ClientAction, ClientApp, ClientEvent},
    error::ClientError,
};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server address (host:port)
    pub server_address: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { server_address: format!("127.0.0.1:{DEFAULT_PORT}") }
    }
}

/// Connect to the configured server and play from the terminal.
pub async fn run(config: ClientConfig) -> Result<(), ClientError> {
    let stream = TcpStream::connect(config.server_address.as_str())
        .await
        .map_err(|source| ClientError::Connect { address: config.server_address.clone(), source })?;
    tracing::debug!(server = %config.server_address, "connected");

    run_session(stream, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Play one session over `stream`, reading lines from `input` and writing
/// the screen to `output`.
///
/// Returns when the user quits, input ends, or the server ends the session.
pub async fn run_session<S, I, O>(stream: S, input: I, mut output: O) -> Result<(), ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    output.write_all(b"Enter your name: ").await?;
    output.flush().await?;
    let name = lines.next_line().await.map_err(ClientError::Input)?.unwrap_or_default();

    let mut app = ClientApp::new(name.trim());
    let (mut reader, mut writer) = tokio::io::split(stream);
    let mut decoder = FrameDecoder::new();

    if execute(app.start(), &mut writer, &mut output).await? {
        return Ok(());
    }

    loop {
        let events = tokio::select! {
            read = reader.read_buf(decoder.buffer_mut()) => match read {
                Ok(0) => vec![ClientEvent::Disconnected],
                Ok(_) => decode_events(&mut decoder),
                Err(err) => {
                    tracing::debug!(%err, "read failed");
                    vec![ClientEvent::Disconnected]
                },
            },
            line = lines.next_line() => match line.map_err(ClientError::Input)? {
                Some(line) => vec![ClientEvent::Input(line)],
                None => {
                    tracing::debug!("input closed");
                    return Ok(());
                },
            },
        };

        for event in events {
            if execute(app.handle(event), &mut writer, &mut output).await? {
                return Ok(());
            }
        }
    }
}

fn decode_events(decoder: &mut FrameDecoder) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    while let Some(frame) = decoder.decode_next() {
        match Message::from_frame(&frame) {
            Ok(message) => {
                tracing::debug!(message_type = ?message.message_type(), "received");
                events.push(ClientEvent::Message(message));
            },
            Err(err) => tracing::warn!(%err, "dropping undecodable frame"),
        }
    }
    events
}

/// Execute actions in order. Returns `true` once the client should stop.
async fn execute<W, O>(
    actions: Vec<ClientAction>,
    writer: &mut W,
    output: &mut O,
) -> Result<bool, ClientError>
where
    W: AsyncWrite + Unpin,
    O: AsyncWrite + Unpin,
{
    for action in actions {
        match action {
            ClientAction::Send(message) => {
                let bytes = message.into_frame().to_bytes()?;
                writer.write_all(&bytes).await?;
            },
            ClientAction::Print(text) => {
                output.write_all(text.as_bytes()).await?;
                output.flush().await?;
            },
            ClientAction::Exit => return Ok(true),
        }
    }
    Ok(false)
}
