//! Room state management.
//!
//! A room is a bounded session: at most two seated players, unbounded
//! spectators, and at most one active [`GameState`]. The registry owns the
//! room directory and the player-to-room index.
//!
//! All mutation here assumes the run-to-completion event discipline: each
//! inbound action finishes (including snapshot replacement) before the next
//! is processed, so no per-room lock is needed. A port to a parallel
//! runtime must reintroduce per-room exclusion around read-modify-write of
//! `game_state`.

use std::collections::HashMap;

use rand::Rng;
use tracing::info;

use super::board::Color;
use super::game::GameState;
use super::player::Player;

/// Seated players per room.
pub const MAX_ROOM_PLAYERS: usize = 2;

/// Lobby-facing view of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub player_count: usize,
    pub spectator_count: usize,
    pub in_progress: bool,
}

impl RoomSummary {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "playerCount": self.player_count,
            "spectatorCount": self.spectator_count,
            "inProgress": self.in_progress,
        })
    }
}

/// One game session container.
///
/// Invariants: `players.len() <= 2`; `game_state` is `Some` iff the room
/// has exactly two seated players; a seated player's color never changes
/// for the duration of their tenure.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub name: String,
    players: Vec<Player>,
    spectators: Vec<Player>,
    pub game_state: Option<GameState>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Room {
    fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            players: Vec::new(),
            spectators: Vec::new(),
            game_state: None,
            created_at: chrono::Utc::now(),
        }
    }

    /// Seated players, in join order (Black first).
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn spectators(&self) -> &[Player] {
        &self.spectators
    }

    /// A seated player by session id.
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Any occupant (player or spectator) by session id.
    pub fn occupant(&self, player_id: &str) -> Option<&Player> {
        self.player(player_id)
            .or_else(|| self.spectators.iter().find(|p| p.id == player_id))
    }

    pub fn is_spectator(&self, player_id: &str) -> bool {
        self.spectators.iter().any(|p| p.id == player_id)
    }

    pub fn color_of(&self, player_id: &str) -> Option<Color> {
        self.player(player_id).and_then(|p| p.color)
    }

    /// The seated player of the given color.
    pub fn player_of_color(&self, color: Color) -> Option<&Player> {
        self.players.iter().find(|p| p.color == Some(color))
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn spectator_count(&self) -> usize {
        self.spectators.len()
    }

    /// Empty of players and spectators alike.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.spectators.is_empty()
    }

    pub fn in_progress(&self) -> bool {
        self.game_state.is_some()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            player_count: self.players.len(),
            spectator_count: self.spectators.len(),
            in_progress: self.in_progress(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "players": self.players.iter().map(|p| p.to_json()).collect::<Vec<_>>(),
            "spectators": self.spectators.iter().map(|p| p.to_json()).collect::<Vec<_>>(),
            "gameState": self.game_state.as_ref().map(|g| g.to_json()),
            "createdAt": self.created_at.to_rfc3339(),
        })
    }
}

/// How a join resolved.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub room_id: String,
    /// Color bound to the joiner; `None` means spectator admission.
    pub color: Option<Color>,
    pub is_spectator: bool,
    /// Set when this join seated the second player and created the game.
    pub game_started: bool,
    /// Present when the joiner was silently migrated out of another room.
    pub left_previous: Option<LeaveOutcome>,
}

/// What `leave_room` removed.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    pub room_id: String,
    pub player: Player,
    pub was_player: bool,
    /// True when the room emptied out and was deleted.
    pub room_removed: bool,
}

/// Room registry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    RoomNotFound,
    NotEnoughPlayers,
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoomNotFound => write!(f, "Room not found"),
            Self::NotEnoughPlayers => write!(f, "Room needs two players"),
        }
    }
}

impl std::error::Error for RoomError {}

/// Room registry - owns the room directory and session bindings.
///
/// Constructed at process start and passed by handle to every transport
/// adapter; never an ambient singleton.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,

    /// Player session id to room id.
    player_index: HashMap<String, String>,

    /// Monotonic component of generated room ids.
    next_seq: u64,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty room. The creator does not join implicitly.
    ///
    /// Ids combine a timestamp, a monotonic counter and a random suffix:
    /// collision-resistant within one process, not cryptographic.
    pub fn create_room(&mut self, name: &str) -> &Room {
        self.next_seq += 1;
        let suffix: u16 = rand::thread_rng().gen();
        let id = format!(
            "room-{}-{}-{:04x}",
            chrono::Utc::now().timestamp_millis(),
            self.next_seq,
            suffix
        );
        info!(room_id = %id, name, "room created");
        let room = Room::new(id.clone(), name.to_string());
        self.rooms.insert(id.clone(), room);
        &self.rooms[id.as_str()]
    }

    pub fn get(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// Room containing the player, if any.
    pub fn room_of_player(&self, player_id: &str) -> Option<&Room> {
        self.player_index
            .get(player_id)
            .and_then(|id| self.rooms.get(id))
    }

    pub fn room_of_player_mut(&mut self, player_id: &str) -> Option<&mut Room> {
        let id = self.player_index.get(player_id)?.clone();
        self.rooms.get_mut(&id)
    }

    /// Seated color for a player, `None` for spectators and the unbound.
    pub fn color_of_player(&self, player_id: &str) -> Option<Color> {
        self.room_of_player(player_id)
            .and_then(|room| room.color_of(player_id))
    }

    /// Join a room as the next seated player, or as a spectator once two
    /// seats are taken. The only failure is an unknown room id.
    ///
    /// A player bound to a different room is migrated: an explicit leave
    /// runs first (surfaced via `left_previous`), keeping the "at most one
    /// room per player" invariant auditable. Re-joining the current room is
    /// a no-op that reports the existing binding.
    pub fn join_room(&mut self, room_id: &str, player: Player) -> Result<JoinOutcome, RoomError> {
        if !self.rooms.contains_key(room_id) {
            return Err(RoomError::RoomNotFound);
        }

        if let Some(current) = self.player_index.get(&player.id) {
            if current == room_id {
                let room = &self.rooms[room_id];
                let color = room.color_of(&player.id);
                return Ok(JoinOutcome {
                    room_id: room_id.to_string(),
                    color,
                    is_spectator: color.is_none(),
                    game_started: false,
                    left_previous: None,
                });
            }
        }
        let left_previous = self.leave_room(&player.id);

        let mut player = player;
        let player_id = player.id.clone();
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or(RoomError::RoomNotFound)?;

        let outcome = if room.players.len() < MAX_ROOM_PLAYERS {
            // Bind the free color: Black for the first seat, else whichever
            // of the two the current occupant does not hold.
            let color = if room.player_of_color(Color::Black).is_none() {
                Color::Black
            } else {
                Color::White
            };
            player.color = Some(color);
            player.is_spectator = false;
            room.players.push(player);

            let game_started = room.players.len() == MAX_ROOM_PLAYERS;
            if game_started {
                room.game_state = Some(GameState::initial());
                info!(room_id = %room.id, "game started");
            }

            JoinOutcome {
                room_id: room.id.clone(),
                color: Some(color),
                is_spectator: false,
                game_started,
                left_previous,
            }
        } else {
            player.color = None;
            player.is_spectator = true;
            room.spectators.push(player);

            JoinOutcome {
                room_id: room.id.clone(),
                color: None,
                is_spectator: true,
                game_started: false,
                left_previous,
            }
        };

        self.player_index.insert(player_id, room_id.to_string());

        Ok(outcome)
    }

    /// Remove a player from whatever room holds them.
    ///
    /// A seated player leaving discards the room's game outright; there is
    /// no grace period. A room left with no occupants at all is deleted.
    pub fn leave_room(&mut self, player_id: &str) -> Option<LeaveOutcome> {
        let room_id = self.player_index.remove(player_id)?;
        let room = self.rooms.get_mut(&room_id)?;

        let (player, was_player) =
            if let Some(idx) = room.players.iter().position(|p| p.id == player_id) {
                (room.players.remove(idx), true)
            } else {
                let idx = room
                    .spectators
                    .iter()
                    .position(|p| p.id == player_id)?;
                (room.spectators.remove(idx), false)
            };

        if was_player {
            // An in-progress game does not survive a player leaving.
            room.game_state = None;
        }

        let room_removed = room.is_empty();
        if room_removed {
            info!(room_id = %room_id, "room destroyed");
            self.rooms.remove(&room_id);
        }

        Some(LeaveOutcome {
            room_id,
            player,
            was_player,
            room_removed,
        })
    }

    /// Replace the game with a fresh initial state, keeping the original
    /// color assignment. Requires both seats taken.
    pub fn restart_game(&mut self, room_id: &str) -> Result<&GameState, RoomError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or(RoomError::RoomNotFound)?;
        if room.players.len() != MAX_ROOM_PLAYERS {
            return Err(RoomError::NotEnoughPlayers);
        }

        info!(room_id = %room.id, "game restarted");
        Ok(room.game_state.insert(GameState::initial()))
    }

    /// Atomic whole-snapshot replacement. The snapshot discipline in
    /// [`GameState`] plus this replacement is the room's entire consistency
    /// mechanism.
    pub fn update_game_state(&mut self, room_id: &str, state: GameState) -> Result<(), RoomError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or(RoomError::RoomNotFound)?;
        room.game_state = Some(state);
        Ok(())
    }

    /// Lobby summaries, oldest room first.
    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<&Room> = self.rooms.values().collect();
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        rooms.iter().map(|r| r.summary()).collect()
    }

    pub fn count(&self) -> usize {
        self.rooms.len()
    }
}
