//! The container role.

use serde::{Deserialize, Serialize};

use crate::board::CellRef;
use crate::core::{EntityId, PlayerId};

/// Anything that can hold game objects.
///
/// A closed set of variants held by value, so "where is X" is a single map
/// entry and containment operations dispatch with `match`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Container {
    /// The game itself. New objects start here and removed objects pass
    /// through it on their way out.
    #[default]
    Root,
    /// A board cell.
    Cell(CellRef),
    /// A player's inventory.
    Player(PlayerId),
    /// Another object acting as a holder (a chest, a vehicle).
    Object(EntityId),
}

impl Container {
    /// Check whether this is the root container.
    #[must_use]
    pub const fn is_root(self) -> bool {
        matches!(self, Container::Root)
    }

    /// The cell, if this container is one.
    #[must_use]
    pub const fn as_cell(self) -> Option<CellRef> {
        match self {
            Container::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    /// The holding object, if this container is one.
    #[must_use]
    pub const fn as_object(self) -> Option<EntityId> {
        match self {
            Container::Object(id) => Some(id),
            _ => None,
        }
    }

    /// The player, if this container is one.
    #[must_use]
    pub const fn as_player(self) -> Option<PlayerId> {
        match self {
            Container::Player(id) => Some(id),
            _ => None,
        }
    }
}

impl From<CellRef> for Container {
    fn from(cell: CellRef) -> Self {
        Container::Cell(cell)
    }
}

impl From<PlayerId> for Container {
    fn from(player: PlayerId) -> Self {
        Container::Player(player)
    }
}

impl From<EntityId> for Container {
    fn from(id: EntityId) -> Self {
        Container::Object(id)
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Container::Root => f.write_str("Root"),
            Container::Cell(cell) => write!(f, "Cell({})", cell),
            Container::Player(player) => write!(f, "Player({})", player.raw()),
            Container::Object(id) => write!(f, "Object({})", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardId, Location};

    #[test]
    fn test_accessors() {
        let cell = CellRef::new(BoardId::new(0), Location::new(3, 4));

        assert!(Container::Root.is_root());
        assert_eq!(Container::from(cell).as_cell(), Some(cell));
        assert_eq!(Container::from(EntityId(2)).as_object(), Some(EntityId(2)));
        assert_eq!(Container::from(PlayerId::new(1)).as_player(), Some(PlayerId::new(1)));
        assert_eq!(Container::Root.as_cell(), None);
        assert_eq!(Container::default(), Container::Root);
    }

    #[test]
    fn test_display() {
        let cell = CellRef::new(BoardId::new(0), Location::new(3, 4));
        assert_eq!(Container::Root.to_string(), "Root");
        assert_eq!(Container::Cell(cell).to_string(), "Cell(Board(0)(3,4))");
        assert_eq!(Container::Player(PlayerId::new(7)).to_string(), "Player(7)");
        assert_eq!(Container::Object(EntityId(9)).to_string(), "Object(Entity(9))");
    }

    #[test]
    fn test_serialization() {
        let container = Container::Cell(CellRef::new(BoardId::new(2), Location::new(1, 1)));
        let json = serde_json::to_string(&container).unwrap();
        let back: Container = serde_json::from_str(&json).unwrap();
        assert_eq!(container, back);
    }
}
