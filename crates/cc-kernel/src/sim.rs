//! The `Simulator` struct and its dispatch loop.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::{EventHandle, EventList, KernelError, KernelResult, Priority};

/// An object whose `actions` run when it is dispatched.
///
/// Implemented by anything scheduled more than once or shared between the
/// model and the kernel.  One-shot callbacks can use
/// [`Simulator::schedule`] with a closure instead.
pub trait Event {
    fn actions(&self, sim: &mut Simulator);
}

// ── Simulator ─────────────────────────────────────────────────────────────────

/// Virtual clock plus pending-event list.
///
/// Single-threaded and cooperative: a callback runs to completion, may
/// schedule or cancel further events through the `&mut Simulator` it
/// receives, and returns control to the loop.  Nothing blocks.
#[derive(Default)]
pub struct Simulator {
    now:        f64,
    events:     EventList,
    stopped:    bool,
    dispatched: u64,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the clock to 0 and drop all pending events.
    pub fn init(&mut self) {
        debug!(dropped = self.events.len(), "simulator init");
        self.events.clear();
        self.now = 0.0;
        self.stopped = false;
        self.dispatched = 0;
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    // ── Scheduling ────────────────────────────────────────────────────────

    /// Schedule `action` to run `delay` time units from now.
    pub fn schedule<F>(&mut self, delay: f64, priority: Priority, action: F) -> KernelResult<EventHandle>
    where
        F: FnOnce(&mut Simulator) + 'static,
    {
        if !delay.is_finite() || delay < 0.0 {
            return Err(KernelError::InvalidDelay(delay));
        }
        Ok(self.events.push(self.now + delay, priority, Box::new(action)))
    }

    /// Schedule `action` at absolute time `time` (must not be in the past).
    pub fn schedule_at<F>(&mut self, time: f64, priority: Priority, action: F) -> KernelResult<EventHandle>
    where
        F: FnOnce(&mut Simulator) + 'static,
    {
        if !time.is_finite() || time < self.now {
            return Err(KernelError::InPast { time, now: self.now });
        }
        Ok(self.events.push(time, priority, Box::new(action)))
    }

    /// Schedule a shared [`Event`] `delay` time units from now.
    pub fn schedule_event(
        &mut self,
        delay:    f64,
        priority: Priority,
        event:    Rc<dyn Event>,
    ) -> KernelResult<EventHandle> {
        self.schedule(delay, priority, move |sim| event.actions(sim))
    }

    /// Remove a pending event.  Returns `true` if it was still scheduled.
    pub fn cancel(&mut self, handle: EventHandle) -> bool {
        let removed = self.events.remove(handle);
        if removed {
            trace!(%handle, "cancelled");
        }
        removed
    }

    pub fn is_pending(&self, handle: EventHandle) -> bool {
        self.events.contains(handle)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Dispatch the earliest pending event.  Returns `false` if none remain.
    pub fn step(&mut self) -> bool {
        let Some((handle, action)) = self.events.pop_first() else {
            return false;
        };
        self.now = handle.time();
        trace!(%handle, "dispatch");
        action(self);
        self.dispatched += 1;
        true
    }

    /// Dispatch events until the list is empty or [`stop`][Self::stop] is
    /// called from a callback.
    pub fn run(&mut self) {
        self.stopped = false;
        while !self.stopped && self.step() {}
        debug!(now = self.now, dispatched = self.dispatched, "run finished");
    }

    /// Dispatch every event scheduled at or before `until`, then advance the
    /// clock to `until` (unless stopped early).
    pub fn run_until(&mut self, until: f64) {
        self.stopped = false;
        while !self.stopped {
            match self.events.next_time() {
                Some(t) if t <= until => {
                    self.step();
                }
                _ => break,
            }
        }
        if !self.stopped && until > self.now {
            self.now = until;
        }
    }

    /// Ask the running loop to return after the current callback.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    // ── Introspection ─────────────────────────────────────────────────────

    /// Number of pending events.
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn next_time(&self) -> Option<f64> {
        self.events.next_time()
    }

    /// Events dispatched since the last [`init`][Self::init].
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}
