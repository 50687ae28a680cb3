//! Persistence hook.
//!
//! Storage lives outside the engine. A hook lets it keep stable ids for
//! permanent objects across runs and archive them as they come and go.
//! The hook is only consulted for objects whose
//! [`is_permanent`](crate::core::GameObject::is_permanent) returns `true`.

use crate::core::{EntityId, ObjectRef};

/// Storage callbacks for permanent objects.
///
/// `on_created` and `on_removed` run after the in-memory change and before
/// the matching event is published. Their failures are logged; they do not
/// undo the change.
pub trait PersistenceHook: Send + Sync {
    /// A previously persisted id for this object, if it has one.
    ///
    /// # Errors
    ///
    /// A failure aborts [`Game::add_object`](super::Game::add_object)
    /// before anything is registered.
    fn assign_id(&self, object: &ObjectRef) -> anyhow::Result<Option<EntityId>> {
        let _ = object;
        Ok(None)
    }

    /// A permanent object was registered under `id`.
    fn on_created(&self, id: EntityId, object: &ObjectRef) -> anyhow::Result<()>;

    /// A permanent object was removed.
    fn on_removed(&self, id: EntityId, object: &ObjectRef) -> anyhow::Result<()>;

    /// Highest id the store has ever handed out. Fresh ids start above it.
    fn max_entity_id(&self) -> Option<EntityId> {
        None
    }
}
