//! Error types for the engine.
//!
//! All fallible operations return [`EngineError`] through the [`Result`]
//! alias. Registry and containment errors signal a caller bug and are
//! reported before any shared state is touched. Listener failures are
//! collected per listener and never abort a delivery pass.

use crate::board::CellRef;
use crate::containment::Container;
use crate::core::{EntityId, PlayerId};
use crate::events::{EventId, ListenerId};

/// Result alias used throughout the crate.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Errors raised by registry, containment, and facade operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The object is already registered under an id.
    #[error("object is already registered as {0}")]
    DuplicateRegistration(EntityId),

    /// The object or id is not known to the registry.
    #[error("{0} is not registered")]
    NotRegistered(EntityId),

    /// A reverse lookup was attempted for an object that was never registered.
    #[error("object is not registered")]
    ObjectNotRegistered,

    /// Every id has been handed out; fresh ids are never reused.
    #[error("entity id space is exhausted")]
    IdSpaceExhausted,

    /// The requested id is still held by a live object.
    #[error("{0} is already in use")]
    IdInUse(EntityId),

    /// The target container does not exist.
    #[error("invalid container: {0}")]
    InvalidContainer(Container),

    /// No board cell exists at the given reference.
    #[error("no cell at {0}")]
    UnknownCell(CellRef),

    /// A player with this id has already joined.
    #[error("{0} has already joined")]
    DuplicatePlayer(PlayerId),

    /// The player has not joined the game.
    #[error("{0} is not in the game")]
    UnknownPlayer(PlayerId),

    /// A client command could not be decoded.
    #[error("malformed command: {0}")]
    CommandParse(String),

    /// The configuration is unusable.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// The persistence hook refused to assign an id.
    #[error("persistence hook failed")]
    Persistence(#[source] anyhow::Error),

    /// The event log could not be encoded or decoded.
    #[error("event log codec failure")]
    EventLog(#[from] bincode::Error),

    /// One or more listeners failed while events were being delivered.
    #[error("{} listener(s) failed during delivery", .0.len())]
    ListenerDelivery(Vec<ListenerDeliveryError>),
}

/// A failure raised by listener code during one delivery.
#[derive(Debug, thiserror::Error)]
#[error("{listener} failed while handling {event}")]
pub struct ListenerDeliveryError {
    /// The listener that failed.
    pub listener: ListenerId,

    /// The event being delivered.
    pub event: EventId,

    /// What the listener reported, or the panic payload.
    #[source]
    pub source: anyhow::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::DuplicateRegistration(EntityId(4));
        assert_eq!(err.to_string(), "object is already registered as Entity(4)");

        let err = EngineError::InvalidContainer(Container::Object(EntityId(9)));
        assert_eq!(err.to_string(), "invalid container: Object(Entity(9))");
    }

    #[test]
    fn test_delivery_error_source() {
        use std::error::Error as _;

        let err = ListenerDeliveryError {
            listener: ListenerId::new(2),
            event: EventId::new(5),
            source: anyhow::anyhow!("boom"),
        };

        assert_eq!(err.to_string(), "Listener(2) failed while handling Event(5)");
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));

        let wrapped = EngineError::ListenerDelivery(vec![err]);
        assert_eq!(wrapped.to_string(), "1 listener(s) failed during delivery");
    }
}
