//! Portable event history.
//!
//! An [`EventLog`] is a plain copy of a dispatcher's recorded events that
//! can be written out with bincode and read back into a fresh game, so late
//! subscribers in the new process still see what happened before.

use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::Result;

use super::{Event, EventId};

/// Recorded events, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Copy a dispatcher history.
    #[must_use]
    pub fn from_history(history: &Vector<Arc<Event>>) -> Self {
        Self {
            events: history.iter().map(|event| Event::clone(event)).collect(),
        }
    }

    /// Encode with bincode.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EventLog`](crate::core::EngineError::EventLog)
    /// if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EventLog`](crate::core::EngineError::EventLog)
    /// if the bytes are not a valid log.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Highest event id in the log.
    #[must_use]
    pub fn last_id(&self) -> Option<EventId> {
        self.events.iter().map(Event::id).max()
    }

    /// Iterate events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn into_events(self) -> Vec<Event> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardId, CellRef, Location};
    use crate::containment::Container;
    use crate::core::{EntityId, GameClock};
    use crate::events::{EventKind, EventSource};

    #[test]
    fn test_bincode_log() {
        let source = EventSource::new(Arc::new(GameClock::new(5)));
        let mut history = Vector::new();
        history.push_back(Arc::new(source.emit(EventKind::GameStarted)));
        history.push_back(Arc::new(source.emit(EventKind::EntityMoved {
            entity: EntityId(1),
            previous: Container::Root,
            next: Container::Cell(CellRef::new(BoardId::new(0), Location::new(3, 4))),
        })));

        let log = EventLog::from_history(&history);
        let bytes = log.to_bytes().unwrap();
        let back = EventLog::from_bytes(&bytes).unwrap();

        assert_eq!(back, log);
        assert_eq!(back.len(), 2);
        assert_eq!(back.last_id(), Some(EventId(2)));
    }

    #[test]
    fn test_garbage_bytes() {
        let err = EventLog::from_bytes(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, crate::core::EngineError::EventLog(_)));
    }
}
