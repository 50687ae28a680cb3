//! Core engine types: entity ids, players, game objects, clock, configuration
//! and errors.
//!
//! These are the building blocks shared by every other module. Nothing here
//! knows about boards, containment, or events beyond naming their ids in
//! error values.

pub mod entity;
pub mod player;
pub mod object;
pub mod clock;
pub mod config;
pub mod error;

pub use entity::EntityId;
pub use player::{Player, PlayerId};
pub use object::{GameObject, ObjectRef};
pub use clock::GameClock;
pub use config::GameConfig;
pub use error::{EngineError, ListenerDeliveryError, Result};
