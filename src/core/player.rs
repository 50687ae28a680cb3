//! Player identification and per-player records.
//!
//! ## PlayerId
//!
//! Opaque identifier handed out by the session layer. A player is not an
//! entity: one player may control many objects, and objects may be held
//! by a player (an inventory) through [`Container::Player`].
//!
//! [`Container::Player`]: crate::containment::Container::Player

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Player identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// A connected player and its free-form properties.
///
/// ```
/// use grid_engine::core::{Player, PlayerId};
///
/// let player = Player::new(PlayerId::new(7))
///     .with_property("name", "ada")
///     .with_property("team", "red");
///
/// assert_eq!(player.property("name"), Some("ada"));
/// assert!(player.has_property("team"));
/// assert!(player.property("score").is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier.
    pub id: PlayerId,

    properties: FxHashMap<String, String>,
}

impl Player {
    /// Create a player with no properties.
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            properties: FxHashMap::default(),
        }
    }

    /// Set a property (builder pattern).
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Get a property value.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Check whether a property is set.
    #[must_use]
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Set a property value.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// All properties.
    #[must_use]
    pub fn properties(&self) -> &FxHashMap<String, String> {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);

        assert_eq!(p0.raw(), 0);
        assert_eq!(p1.raw(), 1);
        assert_eq!(format!("{}", p0), "Player 0");
    }

    #[test]
    fn test_player_properties() {
        let mut player = Player::new(PlayerId::new(3)).with_property("name", "bob");
        assert_eq!(player.property("name"), Some("bob"));

        player.set_property("name", "carol");
        assert_eq!(player.property("name"), Some("carol"));
        assert_eq!(player.properties().len(), 1);
    }

    #[test]
    fn test_player_serialization() {
        let player = Player::new(PlayerId::new(2)).with_property("team", "blue");
        let json = serde_json::to_string(&player).unwrap();
        let deserialized: Player = serde_json::from_str(&json).unwrap();
        assert_eq!(player, deserialized);
    }
}
