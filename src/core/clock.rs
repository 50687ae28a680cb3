//! Shared game clock.
//!
//! The clock is the single source of truth for game time. Event timestamps
//! and timed-action scheduling both read it. Time is a tick counter rather
//! than wall-clock time, so replays and tests stay deterministic.
//!
//! The counter is an atomic so that handlers on any thread can stamp events
//! without taking a lock. Time never moves backwards.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic game clock measured in ticks.
#[derive(Debug, Default)]
pub struct GameClock {
    ticks: AtomicU64,
}

impl GameClock {
    /// Create a clock starting at `start`.
    #[must_use]
    pub fn new(start: u64) -> Self {
        Self {
            ticks: AtomicU64::new(start),
        }
    }

    /// Current game time.
    pub fn now(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Advance by `ticks`, saturating at `u64::MAX`. Returns the new time.
    pub fn advance(&self, ticks: u64) -> u64 {
        let mut current = self.ticks.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(ticks);
            match self.ticks.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    /// Move the clock forward to `time`. Earlier times are ignored.
    ///
    /// Returns the resulting time.
    pub fn advance_to(&self, time: u64) -> u64 {
        self.ticks.fetch_max(time, Ordering::AcqRel).max(time)
    }
}
