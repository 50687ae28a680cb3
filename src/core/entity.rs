//! Entity identification.
//!
//! Every game object tracked by the engine has a unique `EntityId`.
//!
//! ## Allocation
//!
//! IDs are handed out by the [`EntityRegistry`](crate::registry::EntityRegistry)
//! in strictly increasing order and are never recycled within a game run,
//! even after the object is removed. External stores may therefore keep ids
//! around and hand them back later through the persistence hook.
//!
//! ```
//! use grid_engine::core::EntityId;
//!
//! let first = EntityId::FIRST;
//! assert_eq!(first.raw(), 1);
//! assert_eq!(first.checked_next(), Some(EntityId(2)));
//! assert_eq!(EntityId(u32::MAX).checked_next(), None);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a game object.
///
/// Ordered so that snapshots of container contents iterate in allocation
/// order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// The id handed to the first registered object unless configured
    /// otherwise.
    pub const FIRST: EntityId = EntityId(1);

    /// Create an entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The id immediately after this one, or `None` at the end of the id
    /// space.
    #[must_use]
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
