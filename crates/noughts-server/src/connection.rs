//! Per-connection tasks.
//!
//! Each accepted stream is split in two. The read half stays with
//! [`serve_connection`], which decodes frames and dispatches them to the
//! matchmaker or the connection's session. The write half goes to a writer
//! task fed by an unbounded channel; sessions hold a [`ConnectionHandle`] to
//! that channel, so nothing but the writer task ever writes to the socket.
//!
//! Read errors and end-of-stream are both treated as a clean disconnect.

use std::sync::Arc;

use bytes::Bytes;
use noughts_core::ConnectionId;
use noughts_proto::{Frame, FrameDecoder, Message, RejectReason};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};

use crate::{error::ServerError, matchmaker::Matchmaker, session::Session};

/// Item queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Encoded frame to write
    Frame(Bytes),
    /// Flush what was queued before, then shut the stream down
    Close,
}

/// Sending side of a connection, held by its session.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl ConnectionHandle {
    /// Create a handle and the receiver its writer task drains.
    pub fn new(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (outbound, receiver) = mpsc::unbounded_channel();
        (Self { id, outbound }, receiver)
    }

    /// Connection identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue an encoded frame. Returns `false` if the writer has stopped.
    pub fn send(&self, frame: Bytes) -> bool {
        self.outbound.send(Outbound::Frame(frame)).is_ok()
    }

    /// Ask the writer to close the stream after pending frames.
    pub fn close(&self) -> bool {
        self.outbound.send(Outbound::Close).is_ok()
    }

    /// Resolves once the writer task has stopped.
    pub async fn closed(&self) {
        self.outbound.closed().await;
    }
}

/// Drive one connection until the peer leaves or its session closes it.
///
/// The first `Join` admits the connection through `matchmaker`. `MakeMove`
/// frames go to the admitted session. Frames that fail to decode, moves
/// before `Join` and repeated `Join`s are logged and dropped; the connection
/// stays open. With rejection echo on, a move before `Join` is answered with
/// `Rejected(NotSeated)`.
pub async fn serve_connection<S>(
    stream: S,
    connection: ConnectionId,
    matchmaker: Arc<Matchmaker>,
    read_buffer_size: usize,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (mut reader, writer) = tokio::io::split(stream);
    let (handle, outbound) = ConnectionHandle::new(connection);
    let writer_task = tokio::spawn(write_loop(writer, outbound, connection));

    let mut decoder = FrameDecoder::with_capacity(read_buffer_size);
    let mut session: Option<Arc<Session>> = None;

    loop {
        decoder.buffer_mut().reserve(read_buffer_size);

        tokio::select! {
            read = reader.read_buf(decoder.buffer_mut()) => match read {
                Ok(0) => {
                    tracing::debug!(connection, "peer closed stream");
                    break;
                },
                Ok(n) => tracing::trace!(connection, bytes = n, "read"),
                Err(err) => {
                    tracing::debug!(connection, %err, "read failed");
                    break;
                },
            },
            () = handle.closed() => {
                tracing::debug!(connection, "closed by session");
                break;
            },
        }

        while let Some(frame) = decoder.decode_next() {
            if let Err(err) = dispatch(&handle, &matchmaker, &mut session, &frame) {
                tracing::warn!(connection, %err, "dropping frame");
            }
        }
    }

    if let Some(session) = session {
        session.disconnect(connection);
        if session.is_closed() {
            matchmaker.release(session.id());
        }
    }

    // The writer stops once every handle clone is gone
    drop(handle);
    if let Err(err) = writer_task.await {
        tracing::warn!(connection, %err, "writer task failed");
    }
}

fn dispatch(
    handle: &ConnectionHandle,
    matchmaker: &Matchmaker,
    session: &mut Option<Arc<Session>>,
    frame: &Frame,
) -> Result<(), ServerError> {
    let connection = handle.id();
    let message = Message::from_frame(frame)?;

    match (message, session.as_ref()) {
        (Message::Join { name }, None) => match matchmaker.admit(handle.clone(), &name) {
            Ok((admitted, _)) => *session = Some(admitted),
            Err(err) => tracing::warn!(connection, %err, "admission failed"),
        },
        (Message::Join { .. }, Some(current)) => {
            tracing::debug!(connection, room_id = current.id(), "ignoring repeated join");
        },
        (Message::MakeMove { position }, Some(current)) => {
            current.submit_move(connection, position);
        },
        (Message::MakeMove { .. }, None) => {
            tracing::warn!(connection, "dropping move before join");
            if matchmaker.echo_rejections() {
                let bytes = Message::Rejected(RejectReason::NotSeated).into_frame().to_bytes()?;
                handle.send(bytes);
            }
        },
        (other, _) => {
            let message_type = other.message_type();
            tracing::warn!(connection, ?message_type, "dropping server-only message");
        },
    }

    Ok(())
}

async fn write_loop<W>(
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    connection: ConnectionId,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(item) = outbound.recv().await {
        match item {
            Outbound::Frame(bytes) => {
                if let Err(err) = writer.write_all(&bytes).await {
                    tracing::debug!(connection, %err, "write failed");
                    break;
                }
            },
            Outbound::Close => break,
        }
    }

    if let Err(err) = writer.shutdown().await {
        tracing::debug!(connection, %err, "shutdown failed");
    }
}
