//! Game construction.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::board::{Board, BoardId};
use crate::core::{GameConfig, Result};

use super::{Game, PersistenceHook};

/// Builder for a [`Game`].
///
/// ```
/// use grid_engine::board::{BoardBuilder, BoardId};
/// use grid_engine::core::GameConfig;
/// use grid_engine::game::GameBuilder;
///
/// let game = GameBuilder::new(GameConfig::new("dungeon"))
///     .with_board(BoardBuilder::new(BoardId::new(0), "level-1").fill(8, 8, "floor").build())
///     .build()
///     .unwrap();
///
/// assert!(game.cell(BoardId::new(0), 3, 4).is_some());
/// assert!(!game.is_running());
/// ```
#[derive(Default)]
pub struct GameBuilder {
    config: GameConfig,
    boards: FxHashMap<BoardId, Board>,
    hook: Option<Arc<dyn PersistenceHook>>,
}

impl GameBuilder {
    /// Start from a configuration.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            boards: FxHashMap::default(),
            hook: None,
        }
    }

    /// Attach a board. A board with the same id replaces the earlier one.
    #[must_use]
    pub fn with_board(mut self, board: Board) -> Self {
        self.boards.insert(board.id(), board);
        self
    }

    /// Attach a persistence hook.
    #[must_use]
    pub fn with_persistence(mut self, hook: Arc<dyn PersistenceHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Build the game. Ids already handed out by the persistence hook are
    /// never allocated again.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`](crate::core::EngineError::InvalidConfig)
    /// if the configuration does not validate.
    pub fn build(self) -> Result<Game> {
        self.config.validate()?;
        Ok(Game::from_parts(self.config, self.boards, self.hook))
    }
}
