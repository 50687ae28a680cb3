//! Game configuration.
//!
//! Games configure the engine at startup by providing a `GameConfig`.
//! Boards are attached separately through
//! [`GameBuilder`](crate::game::GameBuilder) since they carry cell data
//! rather than settings.
//!
//! Configuration can be built in code or deserialized (for example from a
//! JSON section of a server config file):
//!
//! ```
//! use grid_engine::core::GameConfig;
//!
//! let config: GameConfig = serde_json::from_str(r#"{ "first_entity_id": 100 }"#).unwrap();
//! assert_eq!(config.first_entity_id, 100);
//! assert!(config.record_history);
//! ```

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Human-readable game name (for logs and event properties).
    pub name: String,

    /// First id handed out by the entity registry. Must be non-zero.
    pub first_entity_id: u32,

    /// Keep every published event so late subscribers can be replayed.
    pub record_history: bool,

    /// Game time when the clock starts.
    pub initial_time: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: "game".to_string(),
            first_entity_id: 1,
            record_history: true,
            initial_time: 0,
        }
    }
}

impl GameConfig {
    /// Create a configuration with defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the first entity id (builder pattern).
    #[must_use]
    pub fn with_first_entity_id(mut self, id: u32) -> Self {
        self.first_entity_id = id;
        self
    }

    /// Disable the event history.
    #[must_use]
    pub fn without_history(mut self) -> Self {
        self.record_history = false;
        self
    }

    /// Set the starting game time (builder pattern).
    #[must_use]
    pub fn with_initial_time(mut self, time: u64) -> Self {
        self.initial_time = time;
        self
    }

    /// Check the configuration for unusable values.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if `first_entity_id` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.first_entity_id == 0 {
            return Err(EngineError::InvalidConfig {
                reason: "first_entity_id must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.first_entity_id, 1);
        assert!(config.record_history);
        assert_eq!(config.initial_time, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = GameConfig::new("maze")
            .with_first_entity_id(50)
            .with_initial_time(7)
            .without_history();

        assert_eq!(config.name, "maze");
        assert_eq!(config.first_entity_id, 50);
        assert_eq!(config.initial_time, 7);
        assert!(!config.record_history);
    }

    #[test]
    fn test_zero_first_id_rejected() {
        let config = GameConfig::default().with_first_entity_id(0);
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_round_trip_json() {
        let config = GameConfig::new("arena").with_first_entity_id(9);
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
