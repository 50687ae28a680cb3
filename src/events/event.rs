//! Game event types.
//!
//! Events are immutable records of something that happened. Each carries a
//! unique increasing id, the game time it was created at, a kind, and a
//! read-only string property map fixed at construction. Built-in kinds
//! fill in the properties session layers forward to clients (entity id,
//! board, row, column, ...); callers may add more.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::CellRef;
use crate::containment::Container;
use crate::core::{EntityId, GameClock, PlayerId};

/// Unique event identifier. Increases in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl EventId {
    /// Create a new event ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event({})", self.0)
    }
}

/// Event type identifier for game-defined events.
///
/// The engine doesn't interpret these - they're opaque identifiers.
/// Games assign meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventTypeId(pub u32);

impl EventTypeId {
    /// Create a new event type ID.
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

impl std::fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EventType({})", self.0)
    }
}

/// What happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// The game was started.
    GameStarted,
    /// The game was stopped.
    GameEnded,
    /// An object was registered and placed in the root container.
    EntityCreated {
        /// The new object.
        entity: EntityId,
        /// Its kind name.
        kind: String,
    },
    /// An object changed container.
    EntityMoved {
        /// The object that moved.
        entity: EntityId,
        /// Where it was.
        previous: Container,
        /// Where it is now.
        next: Container,
    },
    /// An object was removed from the game.
    EntityDeleted {
        /// The removed object.
        entity: EntityId,
    },
    /// A cell property changed. Not issued for objects entering or leaving.
    CellStateUpdated {
        /// The cell.
        cell: CellRef,
        /// The property that changed.
        key: String,
    },
    /// A player joined.
    PlayerJoined {
        /// The player.
        player: PlayerId,
    },
    /// A player left.
    PlayerLeft {
        /// The player.
        player: PlayerId,
    },
    /// A player issued a command.
    Command {
        /// Who sent it.
        player: PlayerId,
        /// Command name.
        command: String,
        /// Raw parameter.
        parameter: String,
    },
    /// A timed action ran.
    Timer,
    /// Game-defined event.
    Custom(EventTypeId),
}

impl EventKind {
    /// Short type name, used in logs and serialized output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::GameStarted => "GameStarted",
            EventKind::GameEnded => "GameEnded",
            EventKind::EntityCreated { .. } => "EntityCreated",
            EventKind::EntityMoved { .. } => "EntityMoved",
            EventKind::EntityDeleted { .. } => "EntityDeleted",
            EventKind::CellStateUpdated { .. } => "CellStateUpdated",
            EventKind::PlayerJoined { .. } => "PlayerJoined",
            EventKind::PlayerLeft { .. } => "PlayerLeft",
            EventKind::Command { .. } => "Command",
            EventKind::Timer => "Timer",
            EventKind::Custom(_) => "Custom",
        }
    }

    /// The object this event is about, if any.
    #[must_use]
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            EventKind::EntityCreated { entity, .. }
            | EventKind::EntityMoved { entity, .. }
            | EventKind::EntityDeleted { entity } => Some(*entity),
            _ => None,
        }
    }

    fn base_properties(&self) -> FxHashMap<String, String> {
        let mut props = FxHashMap::default();
        match self {
            EventKind::EntityCreated { entity, kind } => {
                props.insert("entity".to_string(), entity.raw().to_string());
                props.insert("kind".to_string(), kind.clone());
            }
            EventKind::EntityMoved { entity, previous, next } => {
                props.insert("entity".to_string(), entity.raw().to_string());
                insert_container(&mut props, "previous", *previous);
                insert_container(&mut props, "next", *next);
            }
            EventKind::EntityDeleted { entity } => {
                props.insert("entity".to_string(), entity.raw().to_string());
            }
            EventKind::CellStateUpdated { cell, key } => {
                insert_cell(&mut props, "", *cell);
                props.insert("key".to_string(), key.clone());
            }
            EventKind::PlayerJoined { player } | EventKind::PlayerLeft { player } => {
                props.insert("player".to_string(), player.raw().to_string());
            }
            EventKind::Command { player, command, parameter } => {
                props.insert("player".to_string(), player.raw().to_string());
                props.insert("command".to_string(), command.clone());
                props.insert("parameter".to_string(), parameter.clone());
            }
            EventKind::Custom(type_id) => {
                props.insert("type".to_string(), type_id.raw().to_string());
            }
            EventKind::GameStarted | EventKind::GameEnded | EventKind::Timer => {}
        }
        props
    }
}

fn insert_cell(props: &mut FxHashMap<String, String>, prefix: &str, cell: CellRef) {
    props.insert(format!("{prefix}board"), cell.board.raw().to_string());
    props.insert(format!("{prefix}column"), cell.location.column.to_string());
    props.insert(format!("{prefix}row"), cell.location.row.to_string());
}

fn insert_container(props: &mut FxHashMap<String, String>, role: &str, container: Container) {
    match container {
        Container::Root => {
            props.insert(format!("{role}_container"), "root".to_string());
        }
        Container::Cell(cell) => {
            props.insert(format!("{role}_container"), "cell".to_string());
            insert_cell(props, &format!("{role}_"), cell);
        }
        Container::Player(player) => {
            props.insert(format!("{role}_container"), "player".to_string());
            props.insert(format!("{role}_player"), player.raw().to_string());
        }
        Container::Object(holder) => {
            props.insert(format!("{role}_container"), "object".to_string());
            props.insert(format!("{role}_holder"), holder.raw().to_string());
        }
    }
}

/// An immutable game event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    time: u64,
    kind: EventKind,
    properties: FxHashMap<String, String>,
}

impl Event {
    /// Unique id.
    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Game time at creation.
    #[must_use]
    pub fn time(&self) -> u64 {
        self.time
    }

    /// What happened.
    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.kind
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

    /// All properties (read-only).
    #[must_use]
    pub fn properties(&self) -> &FxHashMap<String, String> {
        &self.properties
    }

    /// JSON view for clients: id, time, type name, and properties.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id.raw(),
            "time": self.time,
            "type": self.kind.name(),
            "properties": self.properties,
        })
    }
}

/// Allocates event ids and stamps events with the game time.
#[derive(Debug)]
pub struct EventSource {
    next_id: AtomicU64,
    clock: Arc<GameClock>,
}

impl EventSource {
    /// Create a source reading time from `clock`. The first id is 1.
    #[must_use]
    pub fn new(clock: Arc<GameClock>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            clock,
        }
    }

    /// Start building an event of the given kind.
    pub fn event(&self, kind: EventKind) -> EventBuilder<'_> {
        EventBuilder {
            source: self,
            properties: kind.base_properties(),
            kind,
        }
    }

    /// Build an event with only the built-in properties.
    pub fn emit(&self, kind: EventKind) -> Event {
        self.event(kind).build()
    }

    /// The clock events are stamped from.
    #[must_use]
    pub fn clock(&self) -> &Arc<GameClock> {
        &self.clock
    }

    /// Make sure future ids are greater than `id`.
    pub fn resume_after(&self, id: EventId) {
        self.next_id.fetch_max(id.raw().saturating_add(1), Ordering::Relaxed);
    }

    fn allocate(&self) -> EventId {
        EventId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Builder for a single event. The id and timestamp are taken at
/// [`build`](Self::build).
///
/// ```
/// use std::sync::Arc;
/// use grid_engine::core::GameClock;
/// use grid_engine::events::{EventKind, EventSource, EventTypeId};
///
/// let source = EventSource::new(Arc::new(GameClock::new(12)));
/// let event = source
///     .event(EventKind::Custom(EventTypeId::new(3)))
///     .with_property("damage", "5")
///     .build();
///
/// assert_eq!(event.time(), 12);
/// assert_eq!(event.property("damage"), Some("5"));
/// assert_eq!(event.property("type"), Some("3"));
/// ```
#[derive(Debug)]
pub struct EventBuilder<'a> {
    source: &'a EventSource,
    kind: EventKind,
    properties: FxHashMap<String, String>,
}

impl EventBuilder<'_> {
    /// Add a property (builder pattern). Overrides built-in properties of
    /// the same name.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Finish the event.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: self.source.allocate(),
            time: self.source.clock.now(),
            kind: self.kind,
            properties: self.properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardId, Location};

    fn source() -> EventSource {
        EventSource::new(Arc::new(GameClock::new(0)))
    }

    #[test]
    fn test_ids_increase() {
        let source = source();
        let a = source.emit(EventKind::Timer);
        let b = source.emit(EventKind::Timer);
        assert_eq!(a.id(), EventId(1));
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_time_from_clock() {
        let source = source();
        source.clock().advance(30);
        assert_eq!(source.emit(EventKind::GameStarted).time(), 30);
    }

    #[test]
    fn test_move_properties() {
        let cell = CellRef::new(BoardId::new(2), Location::new(3, 4));
        let event = source().emit(EventKind::EntityMoved {
            entity: EntityId(7),
            previous: Container::Root,
            next: Container::Cell(cell),
        });

        assert_eq!(event.property("entity"), Some("7"));
        assert_eq!(event.property("previous_container"), Some("root"));
        assert_eq!(event.property("next_container"), Some("cell"));
        assert_eq!(event.property("next_board"), Some("2"));
        assert_eq!(event.property("next_column"), Some("3"));
        assert_eq!(event.property("next_row"), Some("4"));
        assert_eq!(event.kind().entity(), Some(EntityId(7)));
    }

    #[test]
    fn test_cell_update_properties() {
        let cell = CellRef::new(BoardId::new(0), Location::new(1, 2));
        let event = source().emit(EventKind::CellStateUpdated {
            cell,
            key: "lit".to_string(),
        });

        assert_eq!(event.property("board"), Some("0"));
        assert_eq!(event.property("column"), Some("1"));
        assert_eq!(event.property("row"), Some("2"));
        assert_eq!(event.property("key"), Some("lit"));
        assert_eq!(event.kind().entity(), None);
    }

    #[test]
    fn test_custom_properties_override() {
        let event = source()
            .event(EventKind::EntityDeleted { entity: EntityId(1) })
            .with_property("entity", "override")
            .with_property("reason", "expired")
            .build();

        assert_eq!(event.property("entity"), Some("override"));
        assert!(event.has_property("reason"));
    }

    #[test]
    fn test_to_json() {
        let event = source().emit(EventKind::Command {
            player: PlayerId::new(4),
            command: "move".to_string(),
            parameter: "n".to_string(),
        });

        let json = event.to_json();
        assert_eq!(json["type"], "Command");
        assert_eq!(json["id"], 1);
        assert_eq!(json["properties"]["command"], "move");
    }

    #[test]
    fn test_event_serialization() {
        let event = source().emit(EventKind::EntityCreated {
            entity: EntityId(3),
            kind: "robot".to_string(),
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
