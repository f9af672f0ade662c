//! `EventList` — the pending-event set, ordered by time then priority.
//!
//! # Why a `BTreeMap`
//!
//! Cancellation must be able to remove an arbitrary pending event by handle.
//! Keying a `BTreeMap` on the full `(time, priority, seq)` triple gives
//! O(log N) insert, O(log N) pop-first and O(log N) removal by key without a
//! tombstone scheme.  The handle *is* the key, so `cancel` never has to search.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::Simulator;

/// A scheduled callback.  Consumed when dispatched.
pub type Action = Box<dyn FnOnce(&mut Simulator)>;

// ── Priority ──────────────────────────────────────────────────────────────────

/// Secondary sort key among events scheduled at the same time.  Lower runs
/// first.
///
/// Value 0 is reserved for period transitions ([`Priority::PERIOD_CHANGE`]).
/// [`Priority::new`] never produces it, so no ordinary event can be ordered
/// ahead of a period change at the same instant.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Priority(u32);

impl Priority {
    /// Reserved band for period-change transitions.
    pub const PERIOD_CHANGE: Priority = Priority(0);
    /// Priority of ordinary model events.
    pub const DEFAULT: Priority = Priority(1_000);

    /// A user priority.  Values inside the reserved band are moved to 1.
    pub const fn new(value: u32) -> Self {
        if value == 0 { Priority(1) } else { Priority(value) }
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn is_reserved(self) -> bool {
        self.0 == Self::PERIOD_CHANGE.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ── EventKey / EventHandle ────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct EventKey {
    time:     f64,
    priority: Priority,
    seq:      u64,
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.priority.cmp(&other.priority))
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EventKey {}

/// Opaque reference to a scheduled event, used to cancel it.
///
/// A handle stays valid after its event fired or was cancelled; cancelling
/// it again simply returns `false`.  Sequence numbers are never reused, so a
/// handle can never alias a newer event.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct EventHandle(EventKey);

impl EventHandle {
    /// Time at which the event is (or was) scheduled to fire.
    pub fn time(&self) -> f64 {
        self.0.time
    }

    pub fn priority(&self) -> Priority {
        self.0.priority
    }
}

impl fmt::Display for EventHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}[p{}]", self.0.seq, self.0.time, self.0.priority.0)
    }
}

// ── EventList ─────────────────────────────────────────────────────────────────

/// Pending events ordered by `(time, priority, seq)`.
#[derive(Default)]
pub struct EventList {
    inner:    BTreeMap<EventKey, Action>,
    next_seq: u64,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `action` at absolute `time`.
    pub fn push(&mut self, time: f64, priority: Priority, action: Action) -> EventHandle {
        let key = EventKey { time, priority, seq: self.next_seq };
        self.next_seq += 1;
        self.inner.insert(key, action);
        EventHandle(key)
    }

    /// Remove the event behind `handle`.  Returns `true` if it was pending.
    pub fn remove(&mut self, handle: EventHandle) -> bool {
        self.inner.remove(&handle.0).is_some()
    }

    pub fn contains(&self, handle: EventHandle) -> bool {
        self.inner.contains_key(&handle.0)
    }

    /// Remove and return the earliest event.
    pub fn pop_first(&mut self) -> Option<(EventHandle, Action)> {
        self.inner.pop_first().map(|(key, action)| (EventHandle(key), action))
    }

    /// Time of the earliest pending event, or `None` if empty.
    pub fn next_time(&self) -> Option<f64> {
        self.inner.keys().next().map(|k| k.time)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop every pending event.  Sequence numbers keep increasing so that
    /// handles from before the clear can never match a new event.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
