//! Wire contract.
//!
//! Inbound payloads are validated at the transport boundary by deserializing
//! into the [`ClientCommand`] tagged union before anything reaches the
//! engine. Outbound payloads are built here as named [`ServerEvent`] values
//! so every adapter emits identical shapes.

use serde::Deserialize;

use super::board::{Color, Position};
use super::game::GameState;
use super::player::Player;
use super::room::{Room, RoomSummary};

/// Inbound client messages, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientCommand {
    #[serde(rename_all = "camelCase")]
    SetUsername { username: String },
    GetLobby,
    #[serde(rename_all = "camelCase")]
    CreateRoom { room_name: String },
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String },
    LeaveRoom,
    #[serde(rename_all = "camelCase")]
    MakeMove { row: usize, col: usize },
    PassTurn,
    RequestHint,
    RestartGame,
}

/// Structured error codes surfaced with `error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    PlayerNotFound,
    JoinFailed,
    NotInRoom,
    GameNotStarted,
    SpectatorCannotMove,
    InvalidMove,
    SpectatorCannotPass,
    CannotPass,
    SpectatorNoHint,
    SpectatorCannotRestart,
    AuthRequired,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::JoinFailed => "JOIN_FAILED",
            Self::NotInRoom => "NOT_IN_ROOM",
            Self::GameNotStarted => "GAME_NOT_STARTED",
            Self::SpectatorCannotMove => "SPECTATOR_CANNOT_MOVE",
            Self::InvalidMove => "INVALID_MOVE",
            Self::SpectatorCannotPass => "SPECTATOR_CANNOT_PASS",
            Self::CannotPass => "CANNOT_PASS",
            Self::SpectatorNoHint => "SPECTATOR_NO_HINT",
            Self::SpectatorCannotRestart => "SPECTATOR_CANNOT_RESTART",
            Self::AuthRequired => "AUTH_REQUIRED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named outbound event with its JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    name: &'static str,
    body: serde_json::Value,
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }

    /// Session handshake acknowledgment.
    pub fn connected(player: &Player, email: Option<&str>, auth_enabled: bool) -> Self {
        Self {
            name: "connected",
            body: serde_json::json!({
                "playerId": player.id,
                "username": player.username,
                "userId": player.user_id,
                "email": email,
                "authEnabled": auth_enabled,
            }),
        }
    }

    /// Structured rejection, sent to the offending caller only.
    pub fn error(code: ErrorCode, message: &str) -> Self {
        Self {
            name: "error",
            body: serde_json::json!({
                "message": message,
                "code": code.as_str(),
            }),
        }
    }

    /// Lobby-wide room directory.
    pub fn lobby_update(rooms: &[RoomSummary], online_count: usize) -> Self {
        Self {
            name: "lobbyUpdate",
            body: serde_json::json!({
                "rooms": rooms.iter().map(|r| r.to_json()).collect::<Vec<_>>(),
                "onlineCount": online_count,
            }),
        }
    }

    pub fn room_joined(room: &Room, your_color: Option<Color>, is_spectator: bool) -> Self {
        Self {
            name: "roomJoined",
            body: serde_json::json!({
                "room": room.to_json(),
                "yourColor": your_color.map(|c| c.as_str()),
                "isSpectator": is_spectator,
            }),
        }
    }

    pub fn room_left() -> Self {
        Self {
            name: "roomLeft",
            body: serde_json::json!({"success": true}),
        }
    }

    pub fn game_started(room: &Room, state: &GameState) -> Self {
        Self {
            name: "gameStarted",
            body: serde_json::json!({
                "gameState": state.to_json(),
                "players": room.players().iter().map(|p| p.to_json()).collect::<Vec<_>>(),
            }),
        }
    }

    pub fn game_state_update(state: &GameState, message: Option<&str>) -> Self {
        Self {
            name: "gameStateUpdate",
            body: serde_json::json!({
                "gameState": state.to_json(),
                "message": message,
            }),
        }
    }

    pub fn player_joined(player: &Player, is_spectator: bool) -> Self {
        Self {
            name: "playerJoined",
            body: serde_json::json!({
                "player": player.to_json(),
                "isSpectator": is_spectator,
            }),
        }
    }

    pub fn player_left(player_id: &str, message: &str) -> Self {
        Self {
            name: "playerLeft",
            body: serde_json::json!({
                "playerId": player_id,
                "message": message,
            }),
        }
    }

    pub fn game_over(state: &GameState) -> Self {
        Self {
            name: "gameOver",
            body: serde_json::json!({
                "winner": state.winner.map(|w| w.as_str()),
                "blackScore": state.black_score,
                "whiteScore": state.white_score,
            }),
        }
    }

    pub fn hint_response(position: Option<Position>) -> Self {
        Self {
            name: "hintResponse",
            body: serde_json::json!({
                "position": position.map(|p| p.to_json()),
            }),
        }
    }

    pub fn turn_passed(player: &Player, state: &GameState) -> Self {
        Self {
            name: "turnPassed",
            body: serde_json::json!({
                "player": player.to_json(),
                "gameState": state.to_json(),
            }),
        }
    }

    /// Full `{type, ...body}` envelope.
    pub fn to_json(&self) -> serde_json::Value {
        let mut envelope = serde_json::json!({"type": self.name});
        if let (Some(env), Some(body)) = (envelope.as_object_mut(), self.body.as_object()) {
            for (key, value) in body {
                env.insert(key.clone(), value.clone());
            }
        }
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_every_inbound_command() {
        let cases = [
            (
                r#"{"type":"setUsername","username":"Alice"}"#,
                ClientCommand::SetUsername {
                    username: "Alice".to_string(),
                },
            ),
            (r#"{"type":"getLobby"}"#, ClientCommand::GetLobby),
            (
                r#"{"type":"createRoom","roomName":"my room"}"#,
                ClientCommand::CreateRoom {
                    room_name: "my room".to_string(),
                },
            ),
            (
                r#"{"type":"joinRoom","roomId":"room-1"}"#,
                ClientCommand::JoinRoom {
                    room_id: "room-1".to_string(),
                },
            ),
            (r#"{"type":"leaveRoom"}"#, ClientCommand::LeaveRoom),
            (
                r#"{"type":"makeMove","row":2,"col":3}"#,
                ClientCommand::MakeMove { row: 2, col: 3 },
            ),
            (r#"{"type":"passTurn"}"#, ClientCommand::PassTurn),
            (r#"{"type":"requestHint"}"#, ClientCommand::RequestHint),
            (r#"{"type":"restartGame"}"#, ClientCommand::RestartGame),
        ];

        for (raw, expected) in cases {
            let parsed: ClientCommand = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed, expected, "payload: {}", raw);
        }
    }

    #[test]
    fn test_reject_malformed_payloads() {
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"launchMissiles"}"#).is_err());
        assert!(serde_json::from_str::<ClientCommand>(r#"{"row":2,"col":3}"#).is_err());
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"makeMove","row":2}"#).is_err());
        assert!(
            serde_json::from_str::<ClientCommand>(r#"{"type":"makeMove","row":-1,"col":0}"#)
                .is_err()
        );
    }

    #[test]
    fn test_error_codes_wire_strings() {
        assert_eq!(ErrorCode::PlayerNotFound.as_str(), "PLAYER_NOT_FOUND");
        assert_eq!(ErrorCode::SpectatorCannotMove.as_str(), "SPECTATOR_CANNOT_MOVE");
        assert_eq!(ErrorCode::CannotPass.as_str(), "CANNOT_PASS");
        assert_eq!(ErrorCode::AuthRequired.as_str(), "AUTH_REQUIRED");
    }

    #[test]
    fn test_error_event_shape() {
        let event = ServerEvent::error(ErrorCode::InvalidMove, "Invalid move");
        assert_eq!(event.name(), "error");
        assert_eq!(
            event.to_json(),
            serde_json::json!({
                "type": "error",
                "message": "Invalid move",
                "code": "INVALID_MOVE",
            })
        );
    }

    #[test]
    fn test_lobby_update_shape() {
        let summary = RoomSummary {
            id: "room-1".to_string(),
            name: "alpha".to_string(),
            player_count: 2,
            spectator_count: 1,
            in_progress: true,
        };
        let event = ServerEvent::lobby_update(&[summary], 7);
        let json = event.to_json();

        assert_eq!(json["type"], serde_json::json!("lobbyUpdate"));
        assert_eq!(json["onlineCount"], serde_json::json!(7));
        assert_eq!(json["rooms"][0]["id"], serde_json::json!("room-1"));
        assert_eq!(json["rooms"][0]["inProgress"], serde_json::json!(true));
    }

    #[test]
    fn test_hint_response_shape() {
        let event = ServerEvent::hint_response(Some(Position::new(0, 7)));
        assert_eq!(
            event.body()["position"],
            serde_json::json!({"row": 0, "col": 7})
        );

        let none = ServerEvent::hint_response(None);
        assert_eq!(none.body()["position"], serde_json::Value::Null);
    }

    #[test]
    fn test_game_over_shape() {
        let mut state = GameState::initial();
        state.game_over = true;
        state.winner = Some(crate::state::board::Outcome::Draw);

        let event = ServerEvent::game_over(&state);
        assert_eq!(event.name(), "gameOver");
        assert_eq!(event.body()["winner"], serde_json::json!("draw"));
        assert_eq!(event.body()["blackScore"], serde_json::json!(2));
    }
}
