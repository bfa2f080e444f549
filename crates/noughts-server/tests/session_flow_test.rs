//! End-to-end tests over loopback TCP.
//!
//! A real server is bound to an ephemeral port; clients speak raw frames to
//! it. Every read is bounded by a timeout so a missing frame fails the test
//! instead of hanging it.

use std::{sync::Arc, time::Duration};

use noughts_core::{Board, Outcome, Symbol};
use noughts_proto::{Frame, FrameDecoder, Message, RejectReason};
use noughts_server::{Matchmaker, Server, ServerConfig};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};

const WAIT: Duration = Duration::from_secs(5);

/// Start a real server, spawn its run loop, and return the address.
async fn start_server(echo_rejections: bool) -> (String, Arc<Matchmaker>) {
    let config = ServerConfig {
        bind_address: "127.0.0.1:0".to_string(),
        echo_rejections,
        ..Default::default()
    };
    let server = Server::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap().to_string();
    let matchmaker = server.matchmaker();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    (addr, matchmaker)
}

struct TestClient {
    stream: TcpStream,
    decoder: FrameDecoder,
}

impl TestClient {
    async fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        Self { stream, decoder: FrameDecoder::new() }
    }

    /// Connect and join, waiting until the server has seated us.
    async fn join(addr: &str, name: &str) -> (Self, Symbol) {
        let mut client = Self::connect(addr).await;
        client.send(Message::Join { name: name.to_string() }).await;
        match client.recv().await {
            Message::Assigned { symbol } => (client, Symbol::from_u8(symbol).unwrap()),
            other => panic!("expected Assigned, got {other:?}"),
        }
    }

    async fn send(&mut self, message: Message) {
        let wire = message.into_frame().to_bytes().unwrap();
        self.stream.write_all(&wire).await.unwrap();
    }

    async fn play(&mut self, position: u8) {
        self.send(Message::MakeMove { position }).await;
    }

    async fn next(&mut self) -> Option<Message> {
        loop {
            if let Some(frame) = self.decoder.decode_next() {
                return Some(Message::from_frame(&frame).unwrap());
            }
            let n = timeout(WAIT, self.stream.read_buf(self.decoder.buffer_mut()))
                .await
                .expect("timed out waiting for a frame")
                .unwrap();
            if n == 0 {
                return None;
            }
        }
    }

    async fn recv(&mut self) -> Message {
        self.next().await.expect("server closed the connection")
    }

    async fn recv_board(&mut self) -> Board {
        match self.recv().await {
            Message::State(state) => Board::deserialize(&state).unwrap(),
            other => panic!("expected State, got {other:?}"),
        }
    }
}

/// Seat two clients and consume everything up to the opening board.
async fn start_game(addr: &str) -> (TestClient, TestClient) {
    let (mut first, symbol) = TestClient::join(addr, "alice").await;
    assert_eq!(symbol, Symbol::First);
    assert!(matches!(first.recv().await, Message::Waiting(_)));

    let (mut second, symbol) = TestClient::join(addr, "bob").await;
    assert_eq!(symbol, Symbol::Second);

    for client in [&mut first, &mut second] {
        assert!(matches!(client.recv().await, Message::GameStart(_)));
        assert_eq!(client.recv_board().await, Board::new());
    }

    (first, second)
}

#[tokio::test]
async fn full_game_first_player_wins() {
    let (addr, _) = start_server(false).await;
    let (mut first, mut second) = start_game(&addr).await;

    first.play(4).await;
    for client in [&mut first, &mut second] {
        let board = client.recv_board().await;
        assert_eq!(board.turn(), Symbol::Second);
        assert_eq!(board.cell(4), Some(Symbol::First));
    }

    second.play(3).await;
    first.recv_board().await;
    second.recv_board().await;

    // Out of turn: Second moves again before First answers. First's next move
    // takes the same cell, so the stray move is refused whichever lands first.
    second.play(0).await;
    first.play(0).await;
    for client in [&mut first, &mut second] {
        let board = client.recv_board().await;
        assert_eq!(board.cell(0), Some(Symbol::First));
        assert_eq!(board.turn(), Symbol::Second);
    }

    for (mover, position) in [(1, 6), (0, 1), (1, 7), (0, 2)] {
        if mover == 0 {
            first.play(position).await;
        } else {
            second.play(position).await;
        }
        first.recv_board().await;
        second.recv_board().await;
    }

    assert_eq!(first.recv().await, Message::GameOver("X wins!".to_string()));
    assert_eq!(second.recv().await, Message::GameOver("X wins!".to_string()));

    // No move is accepted after the win: the next thing Second sees is the
    // disconnect notice, not another board
    second.play(8).await;
    first.play(8).await;
    drop(first);
    assert!(matches!(second.recv().await, Message::PlayerLeft(_)));
    assert_eq!(second.next().await, None);
}

#[tokio::test]
async fn final_board_reports_winner() {
    let (addr, _) = start_server(false).await;
    let (mut first, mut second) = start_game(&addr).await;

    let mut outcomes = Vec::new();
    for (mover, position) in [(0, 0), (1, 3), (0, 1), (1, 4), (0, 2)] {
        if mover == 0 {
            first.play(position).await;
        } else {
            second.play(position).await;
        }
        let board = first.recv_board().await;
        assert_eq!(second.recv_board().await, board);
        outcomes.push(board.outcome());
    }

    assert_eq!(outcomes, vec![None, None, None, None, Some(Outcome::FirstWins)]);
}

#[tokio::test]
async fn disconnect_closes_opponent_and_frees_session() {
    let (addr, matchmaker) = start_server(false).await;
    let (first, mut second) = start_game(&addr).await;
    assert_eq!(matchmaker.session_count(), 1);

    drop(first);

    assert_eq!(
        second.recv().await,
        Message::PlayerLeft("Opponent disconnected! Game ended.".to_string())
    );
    assert_eq!(second.next().await, None);

    timeout(WAIT, async {
        while matchmaker.session_count() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session was not released");
}

#[tokio::test]
async fn four_clients_form_two_games() {
    let (addr, matchmaker) = start_server(false).await;

    let mut clients = Vec::new();
    for name in ["a", "b", "c", "d"] {
        let (client, symbol) = TestClient::join(&addr, name).await;
        clients.push((client, symbol));
    }

    let symbols: Vec<Symbol> = clients.iter().map(|(_, symbol)| *symbol).collect();
    assert_eq!(symbols, vec![Symbol::First, Symbol::Second, Symbol::First, Symbol::Second]);
    assert_eq!(matchmaker.session_count(), 2);
    assert_eq!(matchmaker.open_session(), None);

    // Each pair plays its own board
    let (mut a, _) = clients.remove(0);
    let (mut b, _) = clients.remove(0);
    let (mut c, _) = clients.remove(0);
    let (mut d, _) = clients.remove(0);

    assert!(matches!(a.recv().await, Message::Waiting(_)));
    assert!(matches!(c.recv().await, Message::Waiting(_)));
    for client in [&mut a, &mut b, &mut c, &mut d] {
        match client.recv().await {
            Message::GameStart(text) => assert!(text.contains("playing against")),
            other => panic!("expected GameStart, got {other:?}"),
        }
        client.recv_board().await;
    }

    a.play(0).await;
    c.play(8).await;
    let board_b = b.recv_board().await;
    let board_d = d.recv_board().await;
    assert_eq!(board_b.cell(0), Some(Symbol::First));
    assert_eq!(board_b.cell(8), Some(Symbol::Empty));
    assert_eq!(board_d.cell(8), Some(Symbol::First));
    assert_eq!(board_d.cell(0), Some(Symbol::Empty));
}

#[tokio::test]
async fn rejections_echo_when_enabled() {
    let (addr, _) = start_server(true).await;
    let (mut first, mut second) = start_game(&addr).await;

    second.play(0).await;
    assert_eq!(second.recv().await, Message::Rejected(RejectReason::NotYourTurn));

    first.play(9).await;
    assert_eq!(first.recv().await, Message::Rejected(RejectReason::InvalidPosition));
}

#[tokio::test]
async fn malformed_frames_are_dropped() {
    let (addr, _) = start_server(false).await;
    let mut client = TestClient::connect(&addr).await;

    // Unknown type, then a move before joining, then an anonymous join
    let junk = Frame::new(0xEEu8, vec![1, 2, 3]).to_bytes().unwrap();
    client.stream.write_all(&junk).await.unwrap();
    client.send(Message::MakeMove { position: 4 }).await;
    client.send(Message::Join { name: String::new() }).await;

    assert_eq!(client.recv().await, Message::Assigned { symbol: 1 });
    assert!(matches!(client.recv().await, Message::Waiting(_)));
}

#[tokio::test]
async fn bind_failure_is_reported() {
    let (addr, _) = start_server(false).await;
    let config = ServerConfig { bind_address: addr, ..Default::default() };

    assert!(matches!(Server::bind(config).await, Err(noughts_server::ServerError::Config(_))));
}
