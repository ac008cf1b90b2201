//! JSON message contract between the server and its clients.
//!
//! Every frame is a UTF-8 JSON object with a `type` discriminator.

use crate::games::skirmish::{
    Board, Cell, Game, MoveError, MoveRecord, PieceKind, PieceSelector, Players, Side,
};
use serde::{Deserialize, Serialize};

/// Messages a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Declares which side this connection plays.
    Init {
        /// Declared side.
        player: Side,
    },
    /// Requests a move.
    Move {
        /// Side the client claims to act for.
        player: Side,
        /// Piece to move.
        piece: PieceRef,
        /// Move token, e.g. `"F"` or `"FR"`.
        #[serde(rename = "move")]
        token: String,
    },
    /// Requests that the last move be taken back.
    Undo {
        /// The client's copy of the move; informational only.
        #[serde(default, rename = "move")]
        last: Option<serde_json::Value>,
    },
    /// Starts a fresh game.
    Restart {
        /// Player1 pieces left to right; default setup when absent.
        #[serde(default, rename = "player1Setup")]
        player1_setup: Option<Vec<PieceKind>>,
        /// Player2 pieces left to right; default setup when absent.
        #[serde(default, rename = "player2Setup")]
        player2_setup: Option<Vec<PieceKind>>,
    },
    /// Chat line to relay.
    Chat {
        /// Sender label as given by the client.
        player: String,
        /// Chat text.
        message: String,
    },
}

impl ClientMessage {
    /// Short name of the message kind for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Init { .. } => "init",
            ClientMessage::Move { .. } => "move",
            ClientMessage::Undo { .. } => "undo",
            ClientMessage::Restart { .. } => "restart",
            ClientMessage::Chat { .. } => "chat",
        }
    }
}

/// The piece named in a move request.
///
/// Either a bare code (`"H2"`) or an object such as the board cell the
/// client clicked (`{"player": "player1", "type": "H2"}`), optionally with
/// `row`/`col` to pick between pieces of the same kind. Parsing is lenient:
/// a reference that names no piece still parses and is refused with
/// `piece not found` when resolved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PieceRef {
    /// Kind code only.
    Code(String),
    /// Piece object.
    Detailed {
        /// Kind code.
        #[serde(rename = "type")]
        kind: String,
        /// Current row, if known.
        #[serde(default)]
        row: Option<i64>,
        /// Current column, if known.
        #[serde(default)]
        col: Option<i64>,
    },
    /// Anything else.
    Unrecognized(serde_json::Value),
}

impl PieceRef {
    /// Converts the reference into a registry selector.
    ///
    /// A position is used only when both `row` and `col` are present.
    ///
    /// # Errors
    ///
    /// [`MoveError::PieceNotFound`] for an unknown kind code, a negative
    /// position or an unrecognized shape.
    pub fn selector(&self) -> Result<PieceSelector, MoveError> {
        match self {
            PieceRef::Code(code) => Ok(PieceSelector::kind(parse_kind(code)?)),
            PieceRef::Detailed {
                kind,
                row: Some(row),
                col: Some(col),
            } => {
                let row = usize::try_from(*row).map_err(|_| MoveError::PieceNotFound)?;
                let col = usize::try_from(*col).map_err(|_| MoveError::PieceNotFound)?;
                Ok(PieceSelector {
                    kind: parse_kind(kind)?,
                    at: Some((row, col)),
                })
            }
            PieceRef::Detailed { kind, .. } => Ok(PieceSelector::kind(parse_kind(kind)?)),
            PieceRef::Unrecognized(_) => Err(MoveError::PieceNotFound),
        }
    }
}

fn parse_kind(code: &str) -> Result<PieceKind, MoveError> {
    code.parse().map_err(|_| MoveError::PieceNotFound)
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Full state snapshot.
    GameState {
        /// The snapshot.
        state: GameSnapshot,
    },
    /// Rejection of the recipient's own request.
    InvalidMove {
        /// Human-readable reason.
        reason: String,
    },
    /// The game has been won.
    GameOver {
        /// Winning side.
        winner: Side,
    },
    /// Relayed chat line.
    Chat {
        /// Sender label.
        player: String,
        /// Chat text.
        message: String,
    },
}

/// Origin and destination of the most recent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LastMove {
    /// Cell the piece left.
    pub from: Cell,
    /// Cell the piece reached.
    pub to: Cell,
}

/// Complete, self-contained view of a game. Never a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Derived board.
    pub board: Board,
    /// Both registries.
    pub players: Players,
    /// Side to move; the winner once the game is over.
    pub turn: Side,
    /// Winner, once the game is over.
    pub winner: Option<Side>,
    /// Committed moves, oldest first.
    pub moves: Vec<MoveRecord>,
    /// Most recent move, for highlighting.
    pub last_move: Option<LastMove>,
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        let turn = game.turn();
        Self {
            board: game.board().clone(),
            players: game.players().clone(),
            turn: turn.to_move().or(turn.winner()).unwrap_or(Side::Player1),
            winner: turn.winner(),
            moves: game.moves().to_vec(),
            last_move: game.last_move().map(|(from, to)| LastMove { from, to }),
        }
    }
}

impl ServerMessage {
    /// Snapshot message for the given game.
    pub fn snapshot(game: &Game) -> Self {
        ServerMessage::GameState {
            state: GameSnapshot::from(game),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_move_with_board_cell_piece() {
        let raw = r#"{"type":"move","player":"player1","piece":{"player":"player1","type":"P"},"move":"F"}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        let ClientMessage::Move { player, piece, token } = msg else {
            panic!("expected move");
        };
        assert_eq!(player, Side::Player1);
        assert_eq!(token, "F");
        assert_eq!(piece.selector(), Ok(PieceSelector::kind(PieceKind::Pawn)));
    }

    #[test]
    fn test_parse_move_with_code_and_position() {
        let code: ClientMessage =
            serde_json::from_str(r#"{"type":"move","player":"player2","piece":"H3","move":"LB"}"#).unwrap();
        let ClientMessage::Move { piece, .. } = code else {
            panic!("expected move");
        };
        assert_eq!(piece.selector(), Ok(PieceSelector::kind(PieceKind::Hero3)));

        let pinned: ClientMessage = serde_json::from_str(
            r#"{"type":"move","player":"player1","piece":{"type":"P","row":0,"col":4},"move":"F"}"#,
        )
        .unwrap();
        let ClientMessage::Move { piece, .. } = pinned else {
            panic!("expected move");
        };
        assert_eq!(piece.selector().unwrap().at, Some((0, 4)));
    }

    #[test]
    fn test_unknown_pieces_parse_but_resolve_to_not_found() {
        let cases = [
            r#""K""#,
            r#"{"type": "K"}"#,
            r#"{"type": "P", "row": -1, "col": 0}"#,
            r#"{"type": 7}"#,
            r#"42"#,
        ];
        for piece in cases {
            let raw = format!(r#"{{"type":"move","player":"player1","piece":{piece},"move":"F"}}"#);
            let msg: ClientMessage = serde_json::from_str(&raw).unwrap();
            let ClientMessage::Move { piece, .. } = msg else {
                panic!("expected move");
            };
            assert_eq!(piece.selector(), Err(MoveError::PieceNotFound), "{raw}");
        }
    }

    #[test]
    fn test_off_board_position_still_selects() {
        let piece: PieceRef = serde_json::from_str(r#"{"type": "H1", "row": 9, "col": 0}"#).unwrap();
        assert_eq!(piece.selector().unwrap().at, Some((9, 0)));
    }

    #[test]
    fn test_parse_restart_defaults_and_setups() {
        let bare: ClientMessage = serde_json::from_str(r#"{"type":"restart"}"#).unwrap();
        assert_eq!(
            bare,
            ClientMessage::Restart {
                player1_setup: None,
                player2_setup: None
            }
        );

        let custom: ClientMessage =
            serde_json::from_str(r#"{"type":"restart","player1Setup":["H1","P"]}"#).unwrap();
        assert_eq!(
            custom,
            ClientMessage::Restart {
                player1_setup: Some(vec![PieceKind::Hero1, PieceKind::Pawn]),
                player2_setup: None
            }
        );
    }

    #[test]
    fn test_parse_undo_carrying_client_move() {
        let raw = r#"{"type":"undo","move":{"player":"player1","pieceType":"P","move":"F","row":1,"col":0}}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.kind(), "undo");
    }

    #[test]
    fn test_reject_unknown_type_and_bad_codes() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"resign"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"restart","player1Setup":["K"]}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
    }

    #[test]
    fn test_snapshot_shape() {
        let msg = ServerMessage::snapshot(&Game::standard());
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "gameState");
        assert_eq!(json["state"]["turn"], "player1");
        assert_eq!(json["state"]["winner"], serde_json::Value::Null);
        assert_eq!(json["state"]["board"][0][1], json!({"player": "player1", "type": "H1"}));
        assert_eq!(json["state"]["board"][2][2], serde_json::Value::Null);
        assert_eq!(json["state"]["players"]["player2"]["pieces"][1], json!({"type": "H2", "row": 4, "col": 1}));
        assert_eq!(json["state"]["moves"], json!([]));
        assert_eq!(json["state"]["lastMove"], serde_json::Value::Null);
    }

    #[test]
    fn test_server_notices_shape() {
        let invalid = serde_json::to_value(ServerMessage::InvalidMove {
            reason: "out of bounds".into(),
        })
        .unwrap();
        assert_eq!(invalid, json!({"type": "invalidMove", "reason": "out of bounds"}));

        let over = serde_json::to_value(ServerMessage::GameOver { winner: Side::Player2 }).unwrap();
        assert_eq!(over, json!({"type": "gameOver", "winner": "player2"}));
    }
}
