//! Containment index: which container holds each object.
//!
//! The `ContainmentIndex` keeps two views of one relation:
//! - `locations`: object -> container, for "where is X"
//! - `contents`: container -> objects, for "what is in C"
//!
//! Both views live behind a single mutex and every mutation updates them
//! together, so no reader can see an object in zero or two containers.
//! Contents are persistent `im` sets; a query hands out an O(1) clone that
//! stays valid while callers move things around.

use std::sync::{Mutex, MutexGuard, PoisonError};

use im::OrdSet;
use rustc_hash::FxHashMap;

use crate::core::error::{EngineError, Result};
use crate::core::EntityId;

use super::container::Container;

/// Point-in-time copy of a container's members, ordered by id.
pub type ContentsSnapshot = OrdSet<EntityId>;

#[derive(Debug, Default)]
struct IndexInner {
    locations: FxHashMap<EntityId, Container>,
    contents: FxHashMap<Container, OrdSet<EntityId>>,
}

impl IndexInner {
    fn attach(&mut self, entity: EntityId, container: Container) {
        self.locations.insert(entity, container);
        self.contents.entry(container).or_default().insert(entity);
    }

    fn detach(&mut self, entity: EntityId, container: Container) {
        if let Some(members) = self.contents.get_mut(&container) {
            members.remove(&entity);
            if members.is_empty() {
                self.contents.remove(&container);
            }
        }
    }

    /// Object containers must be tracked themselves; other variants are
    /// validated by the caller.
    fn check_target(&self, container: Container) -> Result<()> {
        match container {
            Container::Object(holder) if !self.locations.contains_key(&holder) => {
                Err(EngineError::InvalidContainer(container))
            }
            _ => Ok(()),
        }
    }
}

/// Tracks the single container of every registered object.
///
/// ## Usage
///
/// ```
/// use grid_engine::containment::{Container, ContainmentIndex};
/// use grid_engine::core::{EntityId, PlayerId};
///
/// let index = ContainmentIndex::new();
/// let sword = EntityId(1);
/// let alice = Container::Player(PlayerId::new(0));
///
/// index.insert(sword, Container::Root).unwrap();
/// let previous = index.place(sword, alice).unwrap();
///
/// assert_eq!(previous, Container::Root);
/// assert_eq!(index.container_of(sword).unwrap(), alice);
/// assert!(index.contents_of(Container::Root).is_empty());
/// assert!(index.contains(alice, sword));
/// ```
///
/// ## Lock order
///
/// [`insert_with`](Self::insert_with) and [`evict_with`](Self::evict_with)
/// run their callback while holding the index lock. Callbacks may take the
/// registry lock but must never call back into this index.
#[derive(Debug, Default)]
pub struct ContainmentIndex {
    inner: Mutex<IndexInner>,
}

impl ContainmentIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, IndexInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start tracking an object in `container`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateRegistration`] if the object is
    /// already tracked, or [`EngineError::InvalidContainer`] if `container`
    /// is an untracked object.
    pub fn insert(&self, entity: EntityId, container: Container) -> Result<()> {
        let mut inner = self.lock();
        if inner.locations.contains_key(&entity) {
            return Err(EngineError::DuplicateRegistration(entity));
        }
        inner.check_target(container)?;
        inner.attach(entity, container);
        Ok(())
    }

    /// Allocate an id with `register` and track it in `container`, as one
    /// step.
    ///
    /// Any reader that can see the id afterwards also sees its container.
    ///
    /// # Errors
    ///
    /// Propagates errors from `register` and fails like
    /// [`insert`](Self::insert). Nothing is tracked on failure.
    pub fn insert_with<F>(&self, container: Container, register: F) -> Result<EntityId>
    where
        F: FnOnce() -> Result<EntityId>,
    {
        let mut inner = self.lock();
        inner.check_target(container)?;
        let entity = register()?;
        if inner.locations.contains_key(&entity) {
            return Err(EngineError::DuplicateRegistration(entity));
        }
        inner.attach(entity, container);
        Ok(entity)
    }

    /// Move an object into `container`, returning its previous container.
    ///
    /// Detach and attach happen in one critical section. Placing an object
    /// where it already is changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRegistered`] if the object is not tracked,
    /// or [`EngineError::InvalidContainer`] if `container` is an untracked
    /// object.
    pub fn place(&self, entity: EntityId, container: Container) -> Result<Container> {
        let mut inner = self.lock();
        let previous = *inner
            .locations
            .get(&entity)
            .ok_or(EngineError::NotRegistered(entity))?;
        inner.check_target(container)?;

        if previous != container {
            inner.detach(entity, previous);
            inner.attach(entity, container);
        }
        Ok(previous)
    }

    /// Stop tracking an object, returning the container it was in.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRegistered`] if the object is not tracked.
    pub fn evict(&self, entity: EntityId) -> Result<Container> {
        self.evict_with(entity, || Ok(())).map(|(container, ())| container)
    }

    /// Run `unregister` and, if it succeeds, stop tracking the object, as
    /// one step.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRegistered`] if the object is not tracked
    /// and propagates errors from `unregister`. Nothing changes on failure.
    pub fn evict_with<F, T>(&self, entity: EntityId, unregister: F) -> Result<(Container, T)>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut inner = self.lock();
        let container = *inner
            .locations
            .get(&entity)
            .ok_or(EngineError::NotRegistered(entity))?;
        let value = unregister()?;

        inner.locations.remove(&entity);
        inner.detach(entity, container);
        Ok((container, value))
    }

    /// The container currently holding an object.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRegistered`] if the object is not tracked.
    pub fn container_of(&self, entity: EntityId) -> Result<Container> {
        self.lock()
            .locations
            .get(&entity)
            .copied()
            .ok_or(EngineError::NotRegistered(entity))
    }

    /// Snapshot of the objects directly inside `container`.
    #[must_use]
    pub fn contents_of(&self, container: Container) -> ContentsSnapshot {
        self.lock()
            .contents
            .get(&container)
            .cloned()
            .unwrap_or_default()
    }

    /// Check whether `container` directly holds `entity`.
    #[must_use]
    pub fn contains(&self, container: Container, entity: EntityId) -> bool {
        self.lock().locations.get(&entity) == Some(&container)
    }

    /// Check whether an object is tracked at all.
    #[must_use]
    pub fn is_tracked(&self, entity: EntityId) -> bool {
        self.lock().locations.contains_key(&entity)
    }

    /// Number of objects directly inside `container`.
    #[must_use]
    pub fn count_in(&self, container: Container) -> usize {
        self.lock().contents.get(&container).map_or(0, OrdSet::len)
    }

    /// Total number of tracked objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().locations.len()
    }

    /// Check if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().locations.is_empty()
    }

    /// Verify that both views describe the same relation.
    ///
    /// Every object appears in exactly the contents of its own container,
    /// and no container lists an object located elsewhere or an empty set.
    #[must_use]
    pub fn check_consistency(&self) -> bool {
        let inner = self.lock();

        let listed: usize = inner.contents.values().map(OrdSet::len).sum();
        if listed != inner.locations.len() {
            return false;
        }

        inner.contents.iter().all(|(container, members)| {
            !members.is_empty()
                && members
                    .iter()
                    .all(|entity| inner.locations.get(entity) == Some(container))
        })
    }
}
