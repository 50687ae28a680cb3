//! The game facade: the public surface of the engine.
//!
//! ## Key Types
//!
//! - [`Game`]: owns boards, objects, players, events and timed actions
//! - [`GameBuilder`]: configuration, boards and persistence at startup
//! - [`PersistenceHook`]: storage callbacks for permanent objects
//! - [`CommandRequest`]: a decoded client command
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use grid_engine::board::{BoardBuilder, BoardId, CellRef, Location};
//! use grid_engine::containment::Container;
//! use grid_engine::core::{GameConfig, GameObject};
//! use grid_engine::game::GameBuilder;
//!
//! #[derive(Debug)]
//! struct Robot;
//!
//! impl GameObject for Robot {
//!     fn kind(&self) -> &str {
//!         "robot"
//!     }
//! }
//!
//! let game = GameBuilder::new(GameConfig::default())
//!     .with_board(BoardBuilder::new(BoardId::new(0), "arena").fill(10, 10, "floor").build())
//!     .build()
//!     .unwrap();
//!
//! let robot = game.add_object(Arc::new(Robot)).unwrap();
//! let cell = CellRef::new(BoardId::new(0), Location::new(3, 4));
//! game.move_object(robot, Container::Cell(cell)).unwrap();
//!
//! assert_eq!(game.location_of(robot).unwrap(), Some(cell));
//! assert!(game.cell_contains_kind(cell, "robot"));
//! ```

mod builder;
mod command;
mod facade;
mod hooks;
mod schedule;

pub use builder::GameBuilder;
pub use command::{parse_command_json, CommandRequest};
pub use facade::Game;
pub use hooks::PersistenceHook;
pub use schedule::TimedAction;
