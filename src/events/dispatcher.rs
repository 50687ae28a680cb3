//! Re-entrant event dispatcher.
//!
//! Delivery is a two-state machine. While `Idle`, the next publish starts a
//! delivery pass on the calling thread, which becomes the delivering thread.
//! While `Delivering`, publishes from listeners on that thread are queued
//! and their subscribe/unsubscribe requests are deferred. Between events the
//! delivering thread applies deferred listener changes in request order,
//! then takes the next queued event, and returns to `Idle` once both queues
//! are empty.
//!
//! Other threads wait until the dispatcher is idle and then run their own
//! pass, so each call drains only its own cascade and gets its own failures.
//! A listener must therefore not block on another thread that publishes to
//! the same dispatcher.
//!
//! The dispatcher lock is never held while listener code runs.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use im::Vector;
use tracing::{debug, trace, warn};

use crate::core::{EngineError, ListenerDeliveryError, Result};

use super::listener::{Listener, ListenerId, Recipients};
use super::{Event, EventId};

#[derive(Clone)]
struct Subscriber {
    id: ListenerId,
    listener: Arc<dyn Listener>,
}

enum ListenerOp {
    Subscribe { subscriber: Subscriber, replay: bool },
    Unsubscribe(ListenerId),
}

struct Pending {
    event: Arc<Event>,
    recipients: Recipients,
}

enum Work {
    Deliver(Pending),
    Apply(ListenerOp),
}

enum DispatchState {
    Idle,
    Delivering {
        owner: ThreadId,
        pending: VecDeque<Pending>,
        deferred: VecDeque<ListenerOp>,
    },
}

impl DispatchState {
    fn delivering() -> Self {
        DispatchState::Delivering {
            owner: thread::current().id(),
            pending: VecDeque::new(),
            deferred: VecDeque::new(),
        }
    }
}

struct DispatcherInner {
    state: DispatchState,
    /// Subscription order.
    listeners: Vec<Subscriber>,
    history: Vector<Arc<Event>>,
}

/// Outcome of a publish call.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// Events whose delivery pass ran on this call, in delivery order.
    /// Includes events queued by listeners during those passes.
    pub delivered: Vec<EventId>,

    /// Number of history events replayed to late subscribers on this call.
    pub replayed: usize,

    /// The event was published by a listener and queued behind the event
    /// being delivered. It is reported by the call that started the pass.
    pub queued: bool,

    /// Listener failures observed during this call.
    pub failures: Vec<ListenerDeliveryError>,
}

impl DeliveryReport {
    fn queued() -> Self {
        Self {
            queued: true,
            ..Self::default()
        }
    }

    /// Check whether every listener succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Convert into a `Result`, failing if any listener failed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ListenerDelivery`] carrying every failure.
    pub fn into_result(self) -> Result<Vec<EventId>> {
        if self.failures.is_empty() {
            Ok(self.delivered)
        } else {
            Err(EngineError::ListenerDelivery(self.failures))
        }
    }
}

/// Publishes events to subscribed listeners, in FIFO order, safely under
/// re-entrancy.
///
/// ## Ordering
///
/// - Events are delivered one at a time in the order they were accepted.
/// - Each event reaches its recipients in subscription order.
/// - An event published during delivery is delivered after the current
///   event has reached every recipient.
///
/// ## Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use grid_engine::core::GameClock;
/// use grid_engine::events::{Event, EventDispatcher, EventKind, EventSource};
///
/// let dispatcher = Arc::new(EventDispatcher::new());
/// let source = Arc::new(EventSource::new(Arc::new(GameClock::new(0))));
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let log = Arc::clone(&seen);
/// let (inner, src) = (Arc::clone(&dispatcher), Arc::clone(&source));
/// dispatcher.subscribe(move |event: &Event| {
///     log.lock().unwrap().push(event.kind().name());
///     if matches!(event.kind(), EventKind::GameStarted) {
///         inner.publish(src.emit(EventKind::Timer));
///     }
///     Ok(())
/// });
///
/// let report = dispatcher.publish(source.emit(EventKind::GameStarted));
/// assert_eq!(report.delivered.len(), 2);
/// assert_eq!(*seen.lock().unwrap(), vec!["GameStarted", "Timer"]);
/// ```
pub struct EventDispatcher {
    inner: Mutex<DispatcherInner>,
    idle: Condvar,
    next_listener: AtomicU32,
    record_history: bool,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("EventDispatcher")
            .field("listeners", &inner.listeners.len())
            .field("history", &inner.history.len())
            .field("delivering", &matches!(inner.state, DispatchState::Delivering { .. }))
            .finish()
    }
}

impl EventDispatcher {
    /// Create a dispatcher that records delivered events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_history(true)
    }

    /// Create a dispatcher, choosing whether delivered events are kept for
    /// replay.
    #[must_use]
    pub fn with_history(record_history: bool) -> Self {
        Self {
            inner: Mutex::new(DispatcherInner {
                state: DispatchState::Idle,
                listeners: Vec::new(),
                history: Vector::new(),
            }),
            idle: Condvar::new(),
            next_listener: AtomicU32::new(1),
            record_history,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DispatcherInner> {
        // Listener code never runs under this lock.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the dispatcher once this thread may act on it: when idle, or
    /// when this thread is the one delivering. Other threads wait.
    fn lock_turn(&self) -> MutexGuard<'_, DispatcherInner> {
        let me = thread::current().id();
        let mut inner = self.lock();
        while matches!(inner.state, DispatchState::Delivering { owner, .. } if owner != me) {
            inner = self.idle.wait(inner).unwrap_or_else(PoisonError::into_inner);
        }
        inner
    }

    fn set_idle(&self, inner: &mut DispatcherInner) {
        inner.state = DispatchState::Idle;
        self.idle.notify_all();
    }

    fn allocate_id(&self) -> ListenerId {
        ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed))
    }

    /// Subscribe a listener. Takes effect immediately when idle, or after
    /// the current event when called by a listener during delivery.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe_arc(Arc::new(listener))
    }

    /// Subscribe a shared listener.
    pub fn subscribe_arc(&self, listener: Arc<dyn Listener>) -> ListenerId {
        let subscriber = Subscriber {
            id: self.allocate_id(),
            listener,
        };
        let id = subscriber.id;

        let mut inner = self.lock_turn();
        if let DispatchState::Delivering { deferred, .. } = &mut inner.state {
            trace!(listener = %id, "deferred subscription");
            deferred.push_back(ListenerOp::Subscribe {
                subscriber,
                replay: false,
            });
        } else {
            inner.listeners.push(subscriber);
            debug!(listener = %id, "subscribed listener");
        }
        id
    }

    /// Subscribe a listener and replay every recorded event to it, oldest
    /// first, before it receives anything new.
    ///
    /// When called by a listener during delivery, the replay and subscription
    /// happen after the current event, and the returned report is empty.
    pub fn subscribe_with_replay<F>(&self, listener: F) -> (ListenerId, DeliveryReport)
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let subscriber = Subscriber {
            id: self.allocate_id(),
            listener: Arc::new(listener),
        };
        let id = subscriber.id;
        let op = ListenerOp::Subscribe {
            subscriber,
            replay: true,
        };

        {
            let mut inner = self.lock_turn();
            if let DispatchState::Delivering { deferred, .. } = &mut inner.state {
                trace!(listener = %id, "deferred replaying subscription");
                deferred.push_back(op);
                return (id, DeliveryReport::default());
            }
            inner.state = DispatchState::delivering();
        }

        let mut report = DeliveryReport::default();
        self.run(Work::Apply(op), &mut report);
        (id, report)
    }

    /// Unsubscribe a listener. Takes effect immediately when idle, or after
    /// the current event when called by a listener during delivery; a
    /// listener removed that way still receives the current event if it has
    /// not yet.
    pub fn unsubscribe(&self, id: ListenerId) {
        let mut inner = self.lock_turn();
        if let DispatchState::Delivering { deferred, .. } = &mut inner.state {
            trace!(listener = %id, "deferred unsubscription");
            deferred.push_back(ListenerOp::Unsubscribe(id));
        } else {
            inner.listeners.retain(|s| s.id != id);
            debug!(listener = %id, "unsubscribed listener");
        }
    }

    /// Publish an event to every listener.
    pub fn publish(&self, event: Event) -> DeliveryReport {
        self.publish_to(event, Recipients::All)
    }

    /// Publish an event to a subset of listeners.
    ///
    /// Delivery happens on this thread before returning, along with
    /// anything listeners publish meanwhile. If another thread is
    /// delivering, this call waits for it to finish first. A call made by a
    /// listener during delivery queues the event and returns a report
    /// marked `queued`.
    pub fn publish_to(&self, event: Event, recipients: Recipients) -> DeliveryReport {
        let pending = Pending {
            event: Arc::new(event),
            recipients,
        };

        {
            let mut inner = self.lock_turn();
            if let DispatchState::Delivering { pending: queue, .. } = &mut inner.state {
                trace!(event = %pending.event.id(), queued = queue.len() + 1, "queued event");
                queue.push_back(pending);
                return DeliveryReport::queued();
            }
            inner.state = DispatchState::delivering();
        }

        let mut report = DeliveryReport::default();
        self.run(Work::Deliver(pending), &mut report);
        report
    }

    /// Drive the machine until both queues are empty. The caller must have
    /// moved the state to `Delivering`.
    fn run(&self, first: Work, report: &mut DeliveryReport) {
        let guard = ResetOnUnwind(self);
        let mut work = Some(first);
        while let Some(item) = work {
            match item {
                Work::Deliver(pending) => self.deliver(pending, report),
                Work::Apply(op) => self.apply(op, report),
            }
            work = self.next_work();
        }
        std::mem::forget(guard);
    }

    fn next_work(&self) -> Option<Work> {
        let mut inner = self.lock();
        let DispatchState::Delivering { pending, deferred, .. } = &mut inner.state else {
            return None;
        };
        if let Some(op) = deferred.pop_front() {
            return Some(Work::Apply(op));
        }
        if let Some(next) = pending.pop_front() {
            return Some(Work::Deliver(next));
        }
        self.set_idle(&mut inner);
        None
    }

    fn deliver(&self, pending: Pending, report: &mut DeliveryReport) {
        let recipients: Vec<Subscriber> = {
            let mut inner = self.lock();
            if self.record_history {
                inner.history.push_back(Arc::clone(&pending.event));
            }
            inner
                .listeners
                .iter()
                .filter(|s| pending.recipients.includes(s.id))
                .cloned()
                .collect()
        };

        trace!(
            event = %pending.event.id(),
            kind = pending.event.kind().name(),
            recipients = recipients.len(),
            "delivering event"
        );
        for subscriber in &recipients {
            if let Some(failure) = invoke(subscriber, &pending.event) {
                report.failures.push(failure);
            }
        }
        report.delivered.push(pending.event.id());
    }

    fn apply(&self, op: ListenerOp, report: &mut DeliveryReport) {
        match op {
            ListenerOp::Unsubscribe(id) => {
                self.lock().listeners.retain(|s| s.id != id);
                debug!(listener = %id, "unsubscribed listener");
            }
            ListenerOp::Subscribe { subscriber, replay } => {
                if replay {
                    let history = self.lock().history.clone();
                    for event in &history {
                        if let Some(failure) = invoke(&subscriber, event) {
                            report.failures.push(failure);
                        }
                    }
                    report.replayed += history.len();
                    debug!(listener = %subscriber.id, replayed = history.len(), "replayed history");
                }
                let id = subscriber.id;
                self.lock().listeners.push(subscriber);
                debug!(listener = %id, "subscribed listener");
            }
        }
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn history(&self) -> Vector<Arc<Event>> {
        self.lock().history.clone()
    }

    /// Drop all recorded events.
    pub fn clear_history(&self) {
        self.lock().history.clear();
    }

    /// Append events to the history without delivering them.
    pub(crate) fn restore_history(&self, events: impl IntoIterator<Item = Event>) {
        let mut inner = self.lock();
        inner.history.extend(events.into_iter().map(Arc::new));
    }

    /// Number of active listeners. Deferred subscriptions are not counted.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Check whether a delivery pass is in progress on some thread.
    #[must_use]
    pub fn is_delivering(&self) -> bool {
        matches!(self.lock().state, DispatchState::Delivering { .. })
    }

    /// Number of events waiting behind the current delivery.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        match &self.lock().state {
            DispatchState::Idle => 0,
            DispatchState::Delivering { pending, .. } => pending.len(),
        }
    }
}

/// Returns the dispatcher to `Idle` if a delivery pass unwinds, so later
/// publishes are not stuck behind a pass that will never finish.
struct ResetOnUnwind<'a>(&'a EventDispatcher);

impl Drop for ResetOnUnwind<'_> {
    fn drop(&mut self) {
        let mut inner = self.0.lock();
        if let DispatchState::Delivering { pending, .. } = &inner.state {
            warn!(dropped = pending.len(), "delivery pass unwound; dropping queued events");
        }
        self.0.set_idle(&mut inner);
    }
}

fn invoke(subscriber: &Subscriber, event: &Event) -> Option<ListenerDeliveryError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| subscriber.listener.on_event(event)));
    let source = match outcome {
        Ok(Ok(())) => return None,
        Ok(Err(err)) => err,
        Err(payload) => anyhow::anyhow!("listener panicked: {}", panic_message(payload.as_ref())),
    };
    warn!(
        listener = %subscriber.id,
        event = %event.id(),
        error = %source,
        "listener failed"
    );
    Some(ListenerDeliveryError {
        listener: subscriber.id,
        event: event.id(),
        source,
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
