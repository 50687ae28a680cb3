//! Entity registry for identity allocation and lookup.
//!
//! The `EntityRegistry` owns the authoritative `id -> object` and
//! `object -> id` maps. Ids are allocated under the registry lock, so two
//! concurrent registrations never receive the same id. The id map is a
//! persistent `im` map, which makes every read a cheap point-in-time
//! snapshot that later mutations cannot disturb.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use im::OrdMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::error::{EngineError, Result};
use crate::core::object::ObjectKey;
use crate::core::{EntityId, ObjectRef};

#[derive(Debug)]
struct RegistryInner {
    by_id: OrdMap<EntityId, ObjectRef>,
    by_object: FxHashMap<ObjectKey, EntityId>,
    /// Wider than an id so the counter can sit one past `u32::MAX`.
    next_id: u64,
}

impl RegistryInner {
    fn bump_past(&mut self, id: EntityId) {
        self.next_id = self.next_id.max(u64::from(id.raw()) + 1);
    }
}

/// Registry of live game objects.
///
/// Object identity is the `Arc` allocation: registering two clones of the
/// same handle is a duplicate, registering two equal but distinct objects
/// is not.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use grid_engine::core::{EntityId, GameObject, ObjectRef};
/// use grid_engine::registry::EntityRegistry;
///
/// #[derive(Debug)]
/// struct Key;
/// impl GameObject for Key {
///     fn kind(&self) -> &str { "key" }
/// }
///
/// let registry = EntityRegistry::new(EntityId::FIRST);
/// let key: ObjectRef = Arc::new(Key);
///
/// let id = registry.register(Arc::clone(&key)).unwrap();
/// assert_eq!(id, EntityId(1));
/// assert_eq!(registry.reverse_lookup(&key).unwrap(), id);
/// assert!(registry.register(key).is_err());
/// ```
#[derive(Debug)]
pub struct EntityRegistry {
    inner: Mutex<RegistryInner>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new(EntityId::FIRST)
    }
}

impl EntityRegistry {
    /// Create an empty registry whose first allocated id is `first`.
    #[must_use]
    pub fn new(first: EntityId) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                by_id: OrdMap::new(),
                by_object: FxHashMap::default(),
                next_id: u64::from(first.raw()),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        // Every critical section leaves the maps consistent, so a panic
        // elsewhere cannot have left them half-written.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an object under the next free id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateRegistration`] if this handle is
    /// already registered, or [`EngineError::IdSpaceExhausted`] once every
    /// id has been allocated.
    pub fn register(&self, object: ObjectRef) -> Result<EntityId> {
        let mut inner = self.lock();
        let key = ObjectKey::of(&object);
        if let Some(&existing) = inner.by_object.get(&key) {
            return Err(EngineError::DuplicateRegistration(existing));
        }

        // Explicit ids may have been placed ahead of the counter.
        let mut candidate = inner.next_id;
        let id = loop {
            let raw = u32::try_from(candidate).map_err(|_| EngineError::IdSpaceExhausted)?;
            let id = EntityId(raw);
            if !inner.by_id.contains_key(&id) {
                break id;
            }
            candidate += 1;
        };
        inner.bump_past(id);

        inner.by_id.insert(id, object);
        inner.by_object.insert(key, id);
        debug!(entity = %id, "registered object");
        Ok(id)
    }

    /// Register an object under a specific id (for example one restored
    /// from persistent storage).
    ///
    /// The allocator is moved past `id` so later fresh ids never collide.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateRegistration`] if this handle is
    /// already registered, or [`EngineError::IdInUse`] if `id` is live.
    pub fn register_with_id(&self, object: ObjectRef, id: EntityId) -> Result<EntityId> {
        let mut inner = self.lock();
        let key = ObjectKey::of(&object);
        if let Some(&existing) = inner.by_object.get(&key) {
            return Err(EngineError::DuplicateRegistration(existing));
        }
        if inner.by_id.contains_key(&id) {
            return Err(EngineError::IdInUse(id));
        }

        inner.bump_past(id);

        inner.by_id.insert(id, object);
        inner.by_object.insert(key, id);
        debug!(entity = %id, "registered object with restored id");
        Ok(id)
    }

    /// Make sure every id allocated from now on is greater than `id`.
    ///
    /// Reserving `u32::MAX` leaves no fresh ids; later plain registrations
    /// fail with [`EngineError::IdSpaceExhausted`].
    pub fn reserve_through(&self, id: EntityId) {
        self.lock().bump_past(id);
    }

    /// The id the next plain registration will receive (if still free), or
    /// `None` when the id space is used up.
    #[must_use]
    pub fn peek_next_id(&self) -> Option<EntityId> {
        u32::try_from(self.lock().next_id).ok().map(EntityId)
    }

    /// Get an object by id.
    #[must_use]
    pub fn lookup(&self, id: EntityId) -> Option<ObjectRef> {
        self.lock().by_id.get(&id).cloned()
    }

    /// Get the id of a registered object.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ObjectNotRegistered`] if the handle is not registered.
    pub fn reverse_lookup(&self, object: &ObjectRef) -> Result<EntityId> {
        self.lock()
            .by_object
            .get(&ObjectKey::of(object))
            .copied()
            .ok_or(EngineError::ObjectNotRegistered)
    }

    /// Check if an id is registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.lock().by_id.contains_key(&id)
    }

    /// Remove an id and its object.
    ///
    /// The id is not reused. Containment is untouched; the
    /// [`Game`](crate::game::Game) facade sequences both.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRegistered`] if the id is unknown.
    pub fn unregister(&self, id: EntityId) -> Result<ObjectRef> {
        let mut inner = self.lock();
        let object = inner.by_id.remove(&id).ok_or(EngineError::NotRegistered(id))?;
        inner.by_object.remove(&ObjectKey::of(&object));
        debug!(entity = %id, "unregistered object");
        Ok(object)
    }

    /// Number of registered objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    /// Check if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().by_id.is_empty()
    }

    /// Point-in-time copy of the id map, ordered by id.
    #[must_use]
    pub fn snapshot(&self) -> OrdMap<EntityId, ObjectRef> {
        self.lock().by_id.clone()
    }

    /// All registered ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.snapshot().keys().copied().collect()
    }

    /// All registered objects, ordered by id.
    #[must_use]
    pub fn objects(&self) -> Vec<ObjectRef> {
        self.snapshot().values().map(Arc::clone).collect()
    }
}
