//! Timed actions.
//!
//! Actions are kept in a min-heap keyed on `(time, sequence)`, so actions
//! due at the same time run in the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::Game;

/// Deferred work run against the game when its time comes.
pub type TimedAction = Box<dyn FnOnce(&Game) + Send + 'static>;

pub(crate) struct Scheduled {
    pub(crate) time: u64,
    seq: u64,
    pub(crate) action: TimedAction,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed: BinaryHeap is a max-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.time, other.seq).cmp(&(self.time, self.seq))
    }
}

#[derive(Default)]
pub(crate) struct Schedule {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl Schedule {
    pub(crate) fn push(&mut self, time: u64, action: TimedAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { time, seq, action });
    }

    /// Pop the earliest action, if it is due at or before `limit`.
    pub(crate) fn pop_due(&mut self, limit: u64) -> Option<Scheduled> {
        if self.heap.peek()?.time > limit {
            return None;
        }
        self.heap.pop()
    }

    pub(crate) fn next_time(&self) -> Option<u64> {
        self.heap.peek().map(|s| s.time)
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> TimedAction {
        Box::new(|_: &Game| {})
    }

    #[test]
    fn test_earliest_first_then_fifo() {
        let mut schedule = Schedule::default();
        schedule.push(10, noop());
        schedule.push(5, noop());
        schedule.push(10, noop());

        let first = schedule.pop_due(u64::MAX).unwrap();
        assert_eq!((first.time, first.seq), (5, 1));
        let second = schedule.pop_due(u64::MAX).unwrap();
        assert_eq!((second.time, second.seq), (10, 0));
        let third = schedule.pop_due(u64::MAX).unwrap();
        assert_eq!((third.time, third.seq), (10, 2));
        assert!(schedule.pop_due(u64::MAX).is_none());
    }

    #[test]
    fn test_pop_due_respects_limit() {
        let mut schedule = Schedule::default();
        schedule.push(20, noop());
        assert!(schedule.pop_due(19).is_none());
        assert_eq!(schedule.next_time(), Some(20));
        assert_eq!(schedule.len(), 1);
        assert!(schedule.pop_due(20).is_some());
    }
}
