//! Event dispatch and transport contracts.
//!
//! [`GameService`] is the single entry point for inbound actions. Each
//! handler runs to completion, including board recomputation and snapshot
//! replacement, before the next event is processed; that discipline is what
//! makes the registries safe without locks.
//!
//! The transport collaborator implements [`SessionBroadcaster`] (fan-out of
//! committed state) and [`ScoreRecorder`] (persistent score sink). Both are
//! invoked strictly after the authoritative transition: a recorder failure
//! is logged and swallowed, never rolled back.

use tracing::{debug, warn};

use super::board::{Color, Outcome, Position};
use super::events::{ClientCommand, ErrorCode, ServerEvent};
use super::game::GameState;
use super::player::PlayerRegistry;
use super::room::{JoinOutcome, LeaveOutcome, Room, RoomRegistry, RoomSummary};

/// Push contract for committed state. Implemented by the transport layer.
pub trait SessionBroadcaster {
    /// Deliver to a single session.
    fn send(&mut self, player_id: &str, event: &ServerEvent);

    /// Deliver to every occupant of a room, players and spectators alike.
    fn broadcast_room(&mut self, room: &Room, event: &ServerEvent);

    /// Deliver to every live session.
    fn broadcast_lobby(&mut self, event: &ServerEvent);
}

/// Final result of one game, keyed by persistent identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalScore {
    pub black_user_id: Option<String>,
    pub white_user_id: Option<String>,
    pub black_score: u8,
    pub white_score: u8,
    pub winner: Outcome,
}

/// Best-effort score sink. Failures must never disturb committed state.
pub trait ScoreRecorder {
    fn record(
        &mut self,
        result: &FinalScore,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// A rejected action: structured code plus human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
}

impl ServiceError {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ServiceError {}

/// The session engine: player registry, room registry, and one handler per
/// inbound operation.
///
/// Owned by the process and passed by handle to every transport adapter.
#[derive(Debug, Default)]
pub struct GameService {
    players: PlayerRegistry,
    rooms: RoomRegistry,
    auth_enabled: bool,
}

impl GameService {
    pub fn new(auth_enabled: bool) -> Self {
        Self {
            players: PlayerRegistry::new(),
            rooms: RoomRegistry::new(),
            auth_enabled,
        }
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    fn lobby_event(&self) -> ServerEvent {
        ServerEvent::lobby_update(&self.rooms.summaries(), self.players.online_count())
    }

    /// Register a session and acknowledge it.
    pub fn connect(
        &mut self,
        player_id: &str,
        username: &str,
        user_id: Option<&str>,
        email: Option<&str>,
        out: &mut dyn SessionBroadcaster,
    ) {
        let player = self.players.connect(
            player_id.to_string(),
            username.to_string(),
            user_id.map(str::to_string),
        );
        out.send(
            player_id,
            &ServerEvent::connected(player, email, self.auth_enabled),
        );
        out.broadcast_lobby(&self.lobby_event());
    }

    /// Tear down a session. The seat is vacated immediately and any game in
    /// the vacated room is discarded; there is no resume.
    pub fn disconnect(&mut self, player_id: &str, out: &mut dyn SessionBroadcaster) {
        if let Some(left) = self.rooms.leave_room(player_id) {
            if !left.room_removed {
                if let Some(room) = self.rooms.get(&left.room_id) {
                    let message = format!("{} disconnected", left.player.username);
                    out.broadcast_room(room, &ServerEvent::player_left(player_id, &message));
                }
            }
        }
        self.players.disconnect(player_id);
        out.broadcast_lobby(&self.lobby_event());
    }

    /// Dispatch one validated inbound command. Rejections go back to the
    /// offending caller only; nothing is mutated or broadcast for them.
    pub fn handle(
        &mut self,
        player_id: &str,
        command: ClientCommand,
        out: &mut dyn SessionBroadcaster,
        scores: &mut dyn ScoreRecorder,
    ) {
        let result = match command {
            ClientCommand::SetUsername { username } => self.set_username(player_id, username),
            ClientCommand::GetLobby => {
                self.get_lobby(player_id, out);
                Ok(())
            }
            ClientCommand::CreateRoom { room_name } => {
                self.create_room(player_id, &room_name, out).map(|_| ())
            }
            ClientCommand::JoinRoom { room_id } => {
                self.join_room(player_id, &room_id, out).map(|_| ())
            }
            ClientCommand::LeaveRoom => self.leave_room(player_id, out).map(|_| ()),
            ClientCommand::MakeMove { row, col } => self
                .make_move(player_id, row, col, out, scores)
                .map(|_| ()),
            ClientCommand::PassTurn => self.pass_turn(player_id, out, scores).map(|_| ()),
            ClientCommand::RequestHint => self.request_hint(player_id, out).map(|_| ()),
            ClientCommand::RestartGame => self.restart_game(player_id, out),
        };

        if let Err(err) = result {
            debug!(player_id, code = err.code.as_str(), "action rejected");
            out.send(player_id, &ServerEvent::error(err.code, &err.message));
        }
    }

    pub fn set_username(&mut self, player_id: &str, username: String) -> Result<(), ServiceError> {
        if self.players.set_username(player_id, username) {
            Ok(())
        } else {
            Err(ServiceError::new(
                ErrorCode::PlayerNotFound,
                "Player not found",
            ))
        }
    }

    /// Send the current lobby snapshot to one caller.
    pub fn get_lobby(&self, player_id: &str, out: &mut dyn SessionBroadcaster) {
        out.send(player_id, &self.lobby_event());
    }

    /// Create an empty room. The creator joins separately.
    pub fn create_room(
        &mut self,
        player_id: &str,
        name: &str,
        out: &mut dyn SessionBroadcaster,
    ) -> Result<String, ServiceError> {
        let player = self
            .players
            .get(player_id)
            .ok_or_else(|| ServiceError::new(ErrorCode::PlayerNotFound, "Player not found"))?;
        if self.auth_enabled && player.user_id.is_none() {
            return Err(ServiceError::new(
                ErrorCode::AuthRequired,
                "Authentication required",
            ));
        }

        let room_id = self.rooms.create_room(name).id.clone();
        out.broadcast_lobby(&self.lobby_event());
        Ok(room_id)
    }

    /// Join as the next seated player or as a spectator. A joiner bound to
    /// another room is migrated through an explicit leave first.
    pub fn join_room(
        &mut self,
        player_id: &str,
        room_id: &str,
        out: &mut dyn SessionBroadcaster,
    ) -> Result<JoinOutcome, ServiceError> {
        let player = self
            .players
            .get(player_id)
            .ok_or_else(|| ServiceError::new(ErrorCode::PlayerNotFound, "Player not found"))?
            .clone();

        let outcome = self
            .rooms
            .join_room(room_id, player)
            .map_err(|e| ServiceError::new(ErrorCode::JoinFailed, e.to_string()))?;

        // Keep the registry's copy of the binding in sync with the room's.
        if let Some(p) = self.players.get_mut(player_id) {
            p.color = outcome.color;
            p.is_spectator = outcome.is_spectator;
        }

        if let Some(left) = &outcome.left_previous {
            if !left.room_removed {
                if let Some(old_room) = self.rooms.get(&left.room_id) {
                    let message = format!("{} left the room", left.player.username);
                    out.broadcast_room(old_room, &ServerEvent::player_left(player_id, &message));
                }
            }
        }

        let room = self
            .rooms
            .get(&outcome.room_id)
            .ok_or_else(|| ServiceError::new(ErrorCode::JoinFailed, "Room no longer exists"))?;

        out.send(
            player_id,
            &ServerEvent::room_joined(room, outcome.color, outcome.is_spectator),
        );
        if let Some(joined) = room.occupant(player_id) {
            out.broadcast_room(room, &ServerEvent::player_joined(joined, outcome.is_spectator));
        }
        if outcome.game_started {
            if let Some(state) = &room.game_state {
                out.broadcast_room(room, &ServerEvent::game_started(room, state));
            }
        }
        out.broadcast_lobby(&self.lobby_event());

        Ok(outcome)
    }

    /// Leave whatever room holds the caller.
    pub fn leave_room(
        &mut self,
        player_id: &str,
        out: &mut dyn SessionBroadcaster,
    ) -> Result<LeaveOutcome, ServiceError> {
        if !self.players.contains(player_id) {
            return Err(ServiceError::new(
                ErrorCode::PlayerNotFound,
                "Player not found",
            ));
        }
        let left = self
            .rooms
            .leave_room(player_id)
            .ok_or_else(|| ServiceError::new(ErrorCode::NotInRoom, "You are not in a room"))?;

        if let Some(p) = self.players.get_mut(player_id) {
            p.color = None;
            p.is_spectator = false;
        }

        out.send(player_id, &ServerEvent::room_left());
        if !left.room_removed {
            if let Some(room) = self.rooms.get(&left.room_id) {
                let message = format!("{} left the room", left.player.username);
                out.broadcast_room(room, &ServerEvent::player_left(player_id, &message));
            }
        }
        out.broadcast_lobby(&self.lobby_event());

        Ok(left)
    }

    /// Play one move for the caller's color.
    pub fn make_move(
        &mut self,
        player_id: &str,
        row: usize,
        col: usize,
        out: &mut dyn SessionBroadcaster,
        scores: &mut dyn ScoreRecorder,
    ) -> Result<GameState, ServiceError> {
        let (room_id, color) = self.seat_of(
            player_id,
            ErrorCode::SpectatorCannotMove,
            "Spectators cannot make moves",
        )?;
        let state = self.active_game(&room_id)?;

        let next = state
            .apply_move(Position::new(row, col), color)
            .map_err(|e| ServiceError::new(ErrorCode::InvalidMove, e.to_string()))?;
        self.commit(&room_id, next.clone())?;

        // A forced pass is worth calling out to the room.
        let message = if !next.game_over && next.current_turn == color {
            Some(format!(
                "{} has no valid moves, {} moves again",
                !color, color
            ))
        } else {
            None
        };

        let room = self.room_ref(&room_id)?;
        out.broadcast_room(room, &ServerEvent::game_state_update(&next, message.as_deref()));
        if next.game_over {
            out.broadcast_room(room, &ServerEvent::game_over(&next));
            Self::record_result(room, &next, scores);
        }

        Ok(next)
    }

    /// Explicit pass, legal only with no moves available.
    pub fn pass_turn(
        &mut self,
        player_id: &str,
        out: &mut dyn SessionBroadcaster,
        scores: &mut dyn ScoreRecorder,
    ) -> Result<GameState, ServiceError> {
        let (room_id, color) = self.seat_of(
            player_id,
            ErrorCode::SpectatorCannotPass,
            "Spectators cannot pass",
        )?;
        let state = self.active_game(&room_id)?;

        let next = state
            .apply_pass(color)
            .map_err(|e| ServiceError::new(ErrorCode::CannotPass, e.to_string()))?;
        self.commit(&room_id, next.clone())?;

        let room = self.room_ref(&room_id)?;
        if let Some(passer) = room.player(player_id) {
            out.broadcast_room(room, &ServerEvent::turn_passed(passer, &next));
        }
        if next.game_over {
            out.broadcast_room(room, &ServerEvent::game_over(&next));
            Self::record_result(room, &next, scores);
        }

        Ok(next)
    }

    /// One-ply hint, answered to the caller only.
    pub fn request_hint(
        &mut self,
        player_id: &str,
        out: &mut dyn SessionBroadcaster,
    ) -> Result<Option<Position>, ServiceError> {
        let (room_id, color) = self.seat_of(
            player_id,
            ErrorCode::SpectatorNoHint,
            "Spectators cannot request hints",
        )?;
        let state = self.active_game(&room_id)?;

        let hint = state.hint(color);
        out.send(player_id, &ServerEvent::hint_response(hint));
        Ok(hint)
    }

    /// Replace the room's game with a fresh one, colors preserved.
    pub fn restart_game(
        &mut self,
        player_id: &str,
        out: &mut dyn SessionBroadcaster,
    ) -> Result<(), ServiceError> {
        let (room_id, _) = self.seat_of(
            player_id,
            ErrorCode::SpectatorCannotRestart,
            "Spectators cannot restart the game",
        )?;

        let state = self
            .rooms
            .restart_game(&room_id)
            .map_err(|e| ServiceError::new(ErrorCode::GameNotStarted, e.to_string()))?
            .clone();

        let room = self.room_ref(&room_id)?;
        out.broadcast_room(room, &ServerEvent::game_started(room, &state));
        Ok(())
    }

    /// Immediate concession: the opponent wins at the current disc counts.
    ///
    /// This is an administrative termination, so the final snapshot keeps
    /// the board as-is and clears `valid_moves`.
    pub fn resign_game(
        &mut self,
        player_id: &str,
        out: &mut dyn SessionBroadcaster,
        scores: &mut dyn ScoreRecorder,
    ) -> Result<GameState, ServiceError> {
        let (room_id, color) = self.seat_of(
            player_id,
            ErrorCode::SpectatorCannotMove,
            "Spectators cannot resign",
        )?;
        let state = self.active_game(&room_id)?;
        if state.game_over {
            return Err(ServiceError::new(ErrorCode::InvalidMove, "Game is over"));
        }

        let mut next = state;
        next.game_over = true;
        next.winner = Some(Outcome::from(!color));
        next.valid_moves = Vec::new();
        self.commit(&room_id, next.clone())?;

        let room = self.room_ref(&room_id)?;
        let message = format!("{} resigned", color);
        out.broadcast_room(room, &ServerEvent::game_state_update(&next, Some(&message)));
        out.broadcast_room(room, &ServerEvent::game_over(&next));
        Self::record_result(room, &next, scores);

        Ok(next)
    }

    /// Resolve the caller to a seated color, with per-operation spectator
    /// rejection codes.
    fn seat_of(
        &self,
        player_id: &str,
        spectator_code: ErrorCode,
        spectator_message: &str,
    ) -> Result<(String, Color), ServiceError> {
        if !self.players.contains(player_id) {
            return Err(ServiceError::new(
                ErrorCode::PlayerNotFound,
                "Player not found",
            ));
        }
        let room = self
            .rooms
            .room_of_player(player_id)
            .ok_or_else(|| ServiceError::new(ErrorCode::NotInRoom, "You are not in a room"))?;
        match room.color_of(player_id) {
            Some(color) => Ok((room.id.clone(), color)),
            None => Err(ServiceError::new(spectator_code, spectator_message)),
        }
    }

    fn active_game(&self, room_id: &str) -> Result<GameState, ServiceError> {
        self.rooms
            .get(room_id)
            .and_then(|r| r.game_state.clone())
            .ok_or_else(|| ServiceError::new(ErrorCode::GameNotStarted, "Game has not started"))
    }

    fn commit(&mut self, room_id: &str, state: GameState) -> Result<(), ServiceError> {
        self.rooms
            .update_game_state(room_id, state)
            .map_err(|e| ServiceError::new(ErrorCode::NotInRoom, e.to_string()))
    }

    fn room_ref(&self, room_id: &str) -> Result<&Room, ServiceError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| ServiceError::new(ErrorCode::NotInRoom, "Room no longer exists"))
    }

    /// Hand the terminal result to the score sink. Strictly after broadcast;
    /// failures are logged and swallowed.
    fn record_result(room: &Room, state: &GameState, scores: &mut dyn ScoreRecorder) {
        let winner = match state.winner {
            Some(winner) => winner,
            None => return,
        };
        let result = FinalScore {
            black_user_id: room
                .player_of_color(Color::Black)
                .and_then(|p| p.user_id.clone()),
            white_user_id: room
                .player_of_color(Color::White)
                .and_then(|p| p.user_id.clone()),
            black_score: state.black_score,
            white_score: state.white_score,
            winner,
        };
        if let Err(err) = scores.record(&result) {
            warn!(error = %err, room_id = %room.id, "score recording failed");
        }
    }
}

/// Call-style adapter for automation clients (bots).
///
/// Wraps the same service operations under a synthetic, non-socket player
/// id, so every mutation flows through the normal broadcast path and live
/// viewers stay consistent.
#[derive(Debug)]
pub struct AutomationAdapter {
    player_id: String,
}

impl AutomationAdapter {
    /// Register a synthetic session and return its adapter.
    pub fn attach(service: &mut GameService, username: &str) -> Self {
        let player_id = service.players.synthetic_id("bot");
        service
            .players
            .connect(player_id.clone(), username.to_string(), None);
        Self { player_id }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn list_rooms(&self, service: &GameService) -> Vec<RoomSummary> {
        service.rooms.summaries()
    }

    pub fn create_room(
        &self,
        service: &mut GameService,
        name: &str,
        out: &mut dyn SessionBroadcaster,
    ) -> Result<String, ServiceError> {
        service.create_room(&self.player_id, name, out)
    }

    pub fn join_room(
        &self,
        service: &mut GameService,
        room_id: &str,
        out: &mut dyn SessionBroadcaster,
    ) -> Result<JoinOutcome, ServiceError> {
        service.join_room(&self.player_id, room_id, out)
    }

    pub fn leave_room(
        &self,
        service: &mut GameService,
        out: &mut dyn SessionBroadcaster,
    ) -> Result<LeaveOutcome, ServiceError> {
        service.leave_room(&self.player_id, out)
    }

    pub fn game_state(&self, service: &GameService) -> Result<GameState, ServiceError> {
        let room = service
            .rooms
            .room_of_player(&self.player_id)
            .ok_or_else(|| ServiceError::new(ErrorCode::NotInRoom, "You are not in a room"))?;
        room.game_state
            .clone()
            .ok_or_else(|| ServiceError::new(ErrorCode::GameNotStarted, "Game has not started"))
    }

    pub fn valid_moves(&self, service: &GameService) -> Result<Vec<Position>, ServiceError> {
        Ok(self.game_state(service)?.valid_moves)
    }

    pub fn make_move(
        &self,
        service: &mut GameService,
        row: usize,
        col: usize,
        out: &mut dyn SessionBroadcaster,
        scores: &mut dyn ScoreRecorder,
    ) -> Result<GameState, ServiceError> {
        service.make_move(&self.player_id, row, col, out, scores)
    }

    pub fn pass_turn(
        &self,
        service: &mut GameService,
        out: &mut dyn SessionBroadcaster,
        scores: &mut dyn ScoreRecorder,
    ) -> Result<GameState, ServiceError> {
        service.pass_turn(&self.player_id, out, scores)
    }

    pub fn hint(
        &self,
        service: &mut GameService,
        out: &mut dyn SessionBroadcaster,
    ) -> Result<Option<Position>, ServiceError> {
        service.request_hint(&self.player_id, out)
    }

    pub fn resign_game(
        &self,
        service: &mut GameService,
        out: &mut dyn SessionBroadcaster,
        scores: &mut dyn ScoreRecorder,
    ) -> Result<GameState, ServiceError> {
        service.resign_game(&self.player_id, out, scores)
    }

    /// Unregister the synthetic session.
    pub fn detach(self, service: &mut GameService, out: &mut dyn SessionBroadcaster) {
        service.disconnect(&self.player_id, out);
    }
}
