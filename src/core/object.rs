//! Game objects as seen by the engine.
//!
//! The engine never interprets game objects. It only needs a stable
//! identity (the `Arc` allocation), a kind name for "is there a wall on this
//! cell" style queries, and whether the persistence layer should be
//! consulted when the object is created or removed.

use std::sync::Arc;

/// A trackable game object.
///
/// Games implement this for their own entity types. Behaviour (movement
/// rules, combat, ownership) stays in game code.
///
/// ```
/// use grid_engine::core::GameObject;
///
/// #[derive(Debug)]
/// struct Crate;
///
/// impl GameObject for Crate {
///     fn kind(&self) -> &str {
///         "crate"
///     }
/// }
///
/// assert!(!Crate.is_permanent());
/// ```
pub trait GameObject: std::fmt::Debug + Send + Sync {
    /// Type name of the object ("wall", "robot", "key", ...).
    fn kind(&self) -> &str;

    /// Whether the persistence hook manages this object's id and archive.
    fn is_permanent(&self) -> bool {
        false
    }
}

/// Shared handle to a game object.
pub type ObjectRef = Arc<dyn GameObject>;

/// Identity of an object handle, independent of its contents.
///
/// Two handles have the same key exactly when they point at the same
/// allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ObjectKey(usize);

impl ObjectKey {
    pub(crate) fn of(object: &ObjectRef) -> Self {
        Self(Arc::as_ptr(object).cast::<()>() as usize)
    }
}
