//! Client state machine.
//!
//! [`ClientApp`] consumes [`ClientEvent`]s (server messages, input lines,
//! disconnection) and returns [`ClientAction`]s for the runtime to execute.
//! It performs no I/O, so every screen the user sees can be checked in a
//! plain unit test.

use noughts_core::{Board, Symbol};
use noughts_proto::Message;

use crate::{
    input::{Command, parse_command},
    render::{CLEAR_SCREEN, render_board},
};

const PROMPT: &str = "> ";

/// Inputs to the client state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Decoded message from the server
    Message(Message),
    /// One line typed by the user
    Input(String),
    /// Server closed the connection
    Disconnected,
}

/// Side effects for the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Send a message to the server
    Send(Message),
    /// Write text to the terminal as-is
    Print(String),
    /// Stop the client
    Exit,
}

/// Client view of one game.
#[derive(Debug, Clone)]
pub struct ClientApp {
    name: String,
    symbol: Option<Symbol>,
    board: Option<Board>,
    over: bool,
}

impl ClientApp {
    /// Create a client for a player called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), symbol: None, board: None, over: false }
    }

    /// Symbol the server assigned us.
    pub fn symbol(&self) -> Option<Symbol> {
        self.symbol
    }

    /// Last board received.
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Whether the game has ended.
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Actions that open the session.
    pub fn start(&self) -> Vec<ClientAction> {
        vec![
            ClientAction::Send(Message::Join { name: self.name.clone() }),
            ClientAction::Print("Connected! Wait for the game to start...\n".to_string()),
        ]
    }

    /// Process one event.
    pub fn handle(&mut self, event: ClientEvent) -> Vec<ClientAction> {
        match event {
            ClientEvent::Message(message) => {
                let terminal = message.is_terminal();
                let mut actions = self.on_message(message);
                if terminal {
                    self.over = true;
                    actions.push(ClientAction::Exit);
                }
                actions
            },
            ClientEvent::Input(line) => self.on_input(&line),
            ClientEvent::Disconnected => {
                vec![
                    ClientAction::Print("\nDisconnected from server.\n".to_string()),
                    ClientAction::Exit,
                ]
            },
        }
    }

    fn on_message(&mut self, message: Message) -> Vec<ClientAction> {
        match message {
            Message::Assigned { symbol } => {
                self.symbol = Symbol::from_u8(symbol);
                let mark = self.symbol.unwrap_or_default();
                vec![ClientAction::Print(format!("You are playing as: {mark}\n"))]
            },
            Message::Waiting(text) => vec![ClientAction::Print(format!("{text}\n"))],
            Message::GameStart(text) => vec![ClientAction::Print(format!("\n{text}\n"))],
            Message::State(state) => match Board::deserialize(&state) {
                Ok(board) => {
                    let screen = format!(
                        "{CLEAR_SCREEN}=== TIC-TAC-TOE ===\nPlayer: {}\n{}{PROMPT}",
                        self.name,
                        render_board(&board, self.symbol)
                    );
                    self.over = board.is_terminal();
                    self.board = Some(board);
                    vec![ClientAction::Print(screen)]
                },
                Err(err) => {
                    tracing::warn!(%err, "ignoring malformed board");
                    Vec::new()
                },
            },
            Message::GameOver(_) => {
                self.over = true;
                vec![ClientAction::Print("\nGame over! Type 'quit' to exit.\n".to_string())]
            },
            Message::PlayerLeft(text) | Message::Error(text) => {
                vec![ClientAction::Print(format!("\n{text}\n"))]
            },
            Message::Rejected(reason) => {
                vec![ClientAction::Print(format!("Move rejected: {}\n{PROMPT}", reason.describe()))]
            },
            other @ (Message::Join { .. } | Message::MakeMove { .. }) => {
                let message_type = other.message_type();
                tracing::warn!(?message_type, "ignoring client-only message");
                Vec::new()
            },
        }
    }

    fn on_input(&mut self, line: &str) -> Vec<ClientAction> {
        match parse_command(line) {
            Ok(None) => Vec::new(),
            Ok(Some(Command::Quit)) => vec![ClientAction::Exit],
            Ok(Some(Command::Move(_))) if self.over => {
                let text = format!("The game is over. Type 'quit' to exit.\n{PROMPT}");
                vec![ClientAction::Print(text)]
            },
            Ok(Some(Command::Move(position))) => {
                vec![ClientAction::Send(Message::MakeMove { position })]
            },
            Err(err) => vec![ClientAction::Print(format!("{err}\n{PROMPT}"))],
        }
    }
}

#[cfg(test)]
mod tests {
    use noughts_proto::RejectReason;

    use super::*;

    fn printed(actions: &[ClientAction]) -> String {
        actions
            .iter()
            .filter_map(|action| match action {
                ClientAction::Print(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_sends_join_with_name() {
        let app = ClientApp::new("alice");
        assert_eq!(
            app.start()[0],
            ClientAction::Send(Message::Join { name: "alice".to_string() })
        );
    }

    #[test]
    fn assignment_is_remembered() {
        let mut app = ClientApp::new("alice");
        let actions = app.handle(ClientEvent::Message(Message::Assigned { symbol: 2 }));

        assert_eq!(app.symbol(), Some(Symbol::Second));
        assert!(printed(&actions).contains("You are playing as: O"));
    }

    #[test]
    fn state_renders_board_for_our_turn() {
        let mut app = ClientApp::new("alice");
        app.handle(ClientEvent::Message(Message::Assigned { symbol: 1 }));

        let actions = app.handle(ClientEvent::Message(Message::State(Board::new().serialize())));
        let screen = printed(&actions);

        assert!(screen.starts_with(CLEAR_SCREEN));
        assert!(screen.contains("Player: alice"));
        assert!(screen.contains("YOUR turn"));
        assert_eq!(app.board(), Some(&Board::new()));
    }

    #[test]
    fn malformed_state_is_ignored() {
        let mut app = ClientApp::new("alice");
        let mut state = Board::new().serialize();
        state[0] = 7;

        assert!(app.handle(ClientEvent::Message(Message::State(state))).is_empty());
        assert!(app.board().is_none());
    }

    #[test]
    fn moves_are_sent_until_game_over() {
        let mut app = ClientApp::new("alice");

        assert_eq!(
            app.handle(ClientEvent::Input("2 2".to_string())),
            vec![ClientAction::Send(Message::MakeMove { position: 4 })]
        );

        app.handle(ClientEvent::Message(Message::GameOver("X wins!".to_string())));
        assert!(app.is_over());
        let actions = app.handle(ClientEvent::Input("1 1".to_string()));
        assert!(printed(&actions).contains("game is over"));
        assert!(!actions.iter().any(|a| matches!(a, ClientAction::Send(_))));
    }

    #[test]
    fn bad_input_is_explained() {
        let mut app = ClientApp::new("alice");
        let actions = app.handle(ClientEvent::Input("4 4".to_string()));
        assert!(printed(&actions).contains("1-3"));
        assert!(app.handle(ClientEvent::Input(String::new())).is_empty());
    }

    #[test]
    fn opponent_leaving_exits() {
        let mut app = ClientApp::new("alice");
        let actions = app.handle(ClientEvent::Message(Message::PlayerLeft(
            "Opponent disconnected! Game ended.".to_string(),
        )));

        assert_eq!(actions.last(), Some(&ClientAction::Exit));
        assert!(printed(&actions).contains("Opponent disconnected"));
        assert!(app.is_over());
    }

    #[test]
    fn server_error_exits() {
        let mut app = ClientApp::new("alice");
        let actions = app.handle(ClientEvent::Message(Message::Error("room closed".to_string())));

        assert_eq!(
            actions,
            vec![ClientAction::Print("\nroom closed\n".to_string()), ClientAction::Exit]
        );
        assert!(app.is_over());
    }

    #[test]
    fn quit_and_disconnect_exit() {
        let mut app = ClientApp::new("alice");
        assert_eq!(app.handle(ClientEvent::Input("quit".to_string())), vec![ClientAction::Exit]);
        assert_eq!(app.handle(ClientEvent::Disconnected).last(), Some(&ClientAction::Exit));
    }

    #[test]
    fn rejection_is_shown() {
        let mut app = ClientApp::new("alice");
        let rejected = Message::Rejected(RejectReason::CellOccupied);
        let actions = app.handle(ClientEvent::Message(rejected));
        assert!(printed(&actions).starts_with("Move rejected:"));
    }
}
