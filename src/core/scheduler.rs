//! Deferred Action Queue
//!
//! Timed actions keyed on a logical clock. Each entry carries the
//! generation that was current when it was scheduled, so the owner can
//! discard entries that a later transition has superseded.
//!
//! Entries due at the same instant pop in scheduling order.

use std::collections::BTreeMap;
use std::time::Duration;

/// Monotonic counter identifying the current session/round.
pub type Generation = u64;

/// A scheduled action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled<A> {
    /// Logical time at which the action fires.
    pub due: Duration,
    /// Generation at schedule time.
    pub generation: Generation,
    /// The action itself.
    pub action: A,
}

/// Ordered queue of deferred actions.
#[derive(Debug)]
pub struct DeferredQueue<A> {
    entries: BTreeMap<(Duration, u64), Scheduled<A>>,
    next_seq: u64,
}

impl<A> DeferredQueue<A> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `action` to fire at `due`.
    pub fn schedule(&mut self, due: Duration, generation: Generation, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((due, seq), Scheduled { due, generation, action });
    }

    /// Earliest pending deadline.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest entry if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<Scheduled<A>> {
        let key = *self.entries.keys().next()?;
        if key.0 > now {
            return None;
        }
        self.entries.remove(&key)
    }

    /// Drop every pending entry. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}
