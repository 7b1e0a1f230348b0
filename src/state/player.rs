//! Player lifecycle.
//!
//! A [`Player`] exists for exactly as long as its transport session: created
//! on connect, destroyed on disconnect. There is no reconnection grace and
//! no resume token; vacating a seat is immediate.

use std::collections::HashMap;

use super::board::Color;

/// A connected participant.
///
/// `id` is transport-session-scoped (a socket id, or a synthetic id for
/// automation clients). `user_id` is the persistent identity, present only
/// when the connection was authenticated; it is used solely for score
/// recording.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: String,
    pub username: String,
    pub color: Option<Color>,
    pub is_spectator: bool,
    pub user_id: Option<String>,
    pub connected_at: chrono::DateTime<chrono::Utc>,
}

impl Player {
    pub fn new(id: String, username: String, user_id: Option<String>) -> Self {
        Self {
            id,
            username,
            color: None,
            is_spectator: false,
            user_id,
            connected_at: chrono::Utc::now(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "username": self.username,
            "color": self.color.map(|c| c.as_str()),
            "isSpectator": self.is_spectator,
            "userId": self.user_id,
        })
    }
}

/// Player registry - tracks every live session.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<String, Player>,

    /// Counter for synthetic (non-socket) ids.
    synthetic_seq: u64,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session. Replaces any previous player under the same
    /// id (a transport id is never reused while live, so this only matters
    /// for tests).
    pub fn connect(&mut self, id: String, username: String, user_id: Option<String>) -> &Player {
        let player = Player::new(id.clone(), username, user_id);
        self.players.insert(id.clone(), player);
        &self.players[id.as_str()]
    }

    /// Remove a session entirely.
    pub fn disconnect(&mut self, id: &str) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.players.contains_key(id)
    }

    /// Update a player's display name. Returns false for unknown ids.
    pub fn set_username(&mut self, id: &str, username: String) -> bool {
        match self.players.get_mut(id) {
            Some(player) => {
                player.username = username;
                true
            }
            None => false,
        }
    }

    /// Mint an id for a non-socket caller (automation/bot adapters).
    pub fn synthetic_id(&mut self, prefix: &str) -> String {
        self.synthetic_seq += 1;
        format!("{}-{}", prefix, self.synthetic_seq)
    }

    /// Number of live sessions; feeds the lobby `onlineCount`.
    pub fn online_count(&self) -> usize {
        self.players.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.players.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_disconnect() {
        let mut registry = PlayerRegistry::new();

        registry.connect("sock-1".to_string(), "Alice".to_string(), None);
        assert!(registry.contains("sock-1"));
        assert_eq!(registry.online_count(), 1);

        let gone = registry.disconnect("sock-1").unwrap();
        assert_eq!(gone.username, "Alice");
        assert!(!registry.contains("sock-1"));
        assert_eq!(registry.online_count(), 0);
    }

    #[test]
    fn test_new_player_has_no_binding() {
        let mut registry = PlayerRegistry::new();
        let player = registry.connect(
            "sock-1".to_string(),
            "Alice".to_string(),
            Some("user-42".to_string()),
        );

        assert_eq!(player.color, None);
        assert!(!player.is_spectator);
        assert_eq!(player.user_id.as_deref(), Some("user-42"));
    }

    #[test]
    fn test_set_username() {
        let mut registry = PlayerRegistry::new();
        registry.connect("sock-1".to_string(), "Anonymous".to_string(), None);

        assert!(registry.set_username("sock-1", "Bob".to_string()));
        assert_eq!(registry.get("sock-1").unwrap().username, "Bob");

        assert!(!registry.set_username("sock-2", "Eve".to_string()));
    }

    #[test]
    fn test_synthetic_ids_are_unique() {
        let mut registry = PlayerRegistry::new();
        let a = registry.synthetic_id("bot");
        let b = registry.synthetic_id("bot");

        assert_eq!(a, "bot-1");
        assert_eq!(b, "bot-2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_player_json_shape() {
        let player = Player::new("sock-1".to_string(), "Alice".to_string(), None);
        let json = player.to_json();

        assert_eq!(json["id"], serde_json::json!("sock-1"));
        assert_eq!(json["color"], serde_json::Value::Null);
        assert_eq!(json["isSpectator"], serde_json::json!(false));
        assert_eq!(json["userId"], serde_json::Value::Null);
    }
}
