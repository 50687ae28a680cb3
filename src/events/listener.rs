//! Listener identity and the listener contract.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Event;

/// Unique listener identifier, assigned at subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

impl ListenerId {
    /// Create a new listener ID.
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

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

/// Receives events from an [`EventDispatcher`](super::EventDispatcher).
///
/// Listeners may call back into the game, including publishing further
/// events and subscribing or unsubscribing listeners. Those effects are
/// applied after the current event has reached every recipient.
///
/// A returned error (or a panic) is reported to the publisher and does not
/// stop delivery to the remaining listeners.
pub trait Listener: Send + Sync {
    /// Handle one event.
    fn on_event(&self, event: &Event) -> anyhow::Result<()>;
}

impl<F> Listener for F
where
    F: Fn(&Event) -> anyhow::Result<()> + Send + Sync,
{
    fn on_event(&self, event: &Event) -> anyhow::Result<()> {
        self(event)
    }
}

/// Which listeners a published event goes to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Recipients {
    /// Every subscribed listener.
    #[default]
    All,
    /// Only these listeners, still in subscription order.
    Only(SmallVec<[ListenerId; 4]>),
}

impl Recipients {
    /// Restrict delivery to the given listeners.
    pub fn only(ids: impl IntoIterator<Item = ListenerId>) -> Self {
        Recipients::Only(ids.into_iter().collect())
    }

    /// Check whether a listener is included.
    #[must_use]
    pub fn includes(&self, id: ListenerId) -> bool {
        match self {
            Recipients::All => true,
            Recipients::Only(ids) => ids.contains(&id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_id_display() {
        assert_eq!(ListenerId::new(3).to_string(), "Listener(3)");
        assert_eq!(ListenerId::new(3).raw(), 3);
    }

    #[test]
    fn test_recipients() {
        let only = Recipients::only([ListenerId(1), ListenerId(4)]);
        assert!(only.includes(ListenerId(4)));
        assert!(!only.includes(ListenerId(2)));
        assert!(Recipients::All.includes(ListenerId(2)));
        assert!(!Recipients::only([]).includes(ListenerId(1)));
    }
}
