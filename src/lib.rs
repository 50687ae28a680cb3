//! # grid-engine
//!
//! Runtime state core for grid-based multiplayer games.
//!
//! The engine tracks which game objects exist, which container holds each
//! one, and delivers change notifications to observers while many threads
//! (network sessions, timers, in-game effects) mutate state at once.
//!
//! ## Design Principles
//!
//! 1. **One container per object**: every registered object is held by
//!    exactly one container (the game root, a board cell, a player, or
//!    another object). Both directions of the relation change together.
//!
//! 2. **Re-entrant, ordered events**: listeners may publish, subscribe and
//!    unsubscribe while handling an event. Delivery stays strictly FIFO with
//!    constant stack depth.
//!
//! 3. **Copy-on-read queries**: contents, registries and history are
//!    returned as `im` snapshots, so callers can iterate while the game
//!    keeps changing.
//!
//! ## Modules
//!
//! - `core`: ids, players, game objects, clock, configuration, errors
//! - `board`: boards, cells, locations and directions
//! - `registry`: entity id allocation and lookup
//! - `containment`: the object-to-container relation
//! - `events`: events, listeners and the dispatcher
//! - `game`: the facade composing everything above

pub mod core;
pub mod board;
pub mod registry;
pub mod containment;
pub mod events;
pub mod game;

// Re-export commonly used types
pub use crate::core::{
    EngineError, EntityId, GameClock, GameConfig, GameObject, ListenerDeliveryError, ObjectRef,
    Player, PlayerId, Result,
};

pub use crate::board::{Board, BoardBuilder, BoardId, Cell, CellRef, Direction, Location};

pub use crate::registry::EntityRegistry;

pub use crate::containment::{ContainmentIndex, Container, ContentsSnapshot};

pub use crate::events::{
    DeliveryReport, Event, EventBuilder, EventDispatcher, EventId, EventKind, EventLog,
    EventSource, EventTypeId, Listener, ListenerId, Recipients,
};

pub use crate::game::{CommandRequest, Game, GameBuilder, PersistenceHook, TimedAction};
