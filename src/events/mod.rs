//! Events and their delivery.
//!
//! ## Key Types
//!
//! - [`Event`]: immutable record of something that happened
//! - [`EventKind`]: built-in and game-defined event kinds
//! - [`EventSource`]: allocates event ids and stamps the game time
//! - [`EventDispatcher`]: FIFO, re-entrant delivery to [`Listener`]s
//! - [`EventLog`]: recorded history in a portable form
//!
//! ## Re-entrancy
//!
//! Listeners can publish, subscribe, and unsubscribe from inside
//! `on_event`. Nothing they do interrupts the event being delivered: new
//! events queue behind it and listener changes apply once it is done.

mod dispatcher;
mod event;
mod listener;
mod log;

pub use dispatcher::{DeliveryReport, EventDispatcher};
pub use event::{Event, EventBuilder, EventId, EventKind, EventSource, EventTypeId};
pub use listener::{Listener, ListenerId, Recipients};
pub use log::EventLog;
