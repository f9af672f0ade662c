//! Start/stop state machines and the events that flip them.
//!
//! Arrival processes, agent groups and dialers are typically *on* during
//! the opening hours of the center and *off* otherwise.  They implement
//! [`ToggleElement`]; the model then schedules a [`ToggleEvent`] for a single
//! flip or a [`SwitchEvent`] for a whole on/off interval.

use std::rc::Rc;

use tracing::warn;

use crate::{Event, EventHandle, KernelError, KernelResult, Priority, Simulator};

// ── Trait ─────────────────────────────────────────────────────────────────────

/// An element with a started / stopped state.
///
/// Methods take `&self`: elements are shared (`Rc`) between the model and
/// the events that toggle them, so implementations keep their state in
/// `Cell`/`RefCell`.
///
/// # Contract
///
/// - `start` on a started element and `stop` on a stopped one are no-ops.
/// - Both may schedule or cancel events through `sim`.
pub trait ToggleElement {
    fn start(&self, sim: &mut Simulator);
    fn stop(&self, sim: &mut Simulator);
    fn is_started(&self) -> bool;
}

// ── ToggleEvent ───────────────────────────────────────────────────────────────

/// Starts or stops one element when dispatched.
pub struct ToggleEvent {
    element: Rc<dyn ToggleElement>,
    start:   bool,
}

impl ToggleEvent {
    /// `start == true` builds a "turn on" event, `false` a "turn off" event.
    pub fn new(element: Rc<dyn ToggleElement>, start: bool) -> Rc<Self> {
        Rc::new(Self { element, start })
    }

    pub fn is_start(&self) -> bool {
        self.start
    }
}

impl Event for ToggleEvent {
    fn actions(&self, sim: &mut Simulator) {
        if self.start {
            self.element.start(sim);
        } else {
            self.element.stop(sim);
        }
    }
}

// ── SwitchEvent ───────────────────────────────────────────────────────────────

/// Turns an element on at `starting_time` and off at `stopping_time`.
///
/// The stop is only scheduled once the start has fired, so cancelling the
/// start handle cancels the whole interval.
pub struct SwitchEvent {
    element:       Rc<dyn ToggleElement>,
    starting_time: f64,
    stopping_time: f64,
}

impl SwitchEvent {
    pub fn new(
        element:       Rc<dyn ToggleElement>,
        starting_time: f64,
        stopping_time: f64,
    ) -> KernelResult<Self> {
        if !(starting_time.is_finite() && stopping_time.is_finite()) || stopping_time < starting_time {
            return Err(KernelError::InvalidInterval {
                start: starting_time,
                stop:  stopping_time,
            });
        }
        Ok(Self { element, starting_time, stopping_time })
    }

    pub fn starting_time(&self) -> f64 {
        self.starting_time
    }

    pub fn stopping_time(&self) -> f64 {
        self.stopping_time
    }

    /// Schedule the start (at `max(now, starting_time)`); the start callback
    /// schedules the stop.  Returns the handle of the start event.
    pub fn schedule(&self, sim: &mut Simulator) -> KernelResult<EventHandle> {
        let element = Rc::clone(&self.element);
        let stopping_time = self.stopping_time;
        let at = self.starting_time.max(sim.now());
        sim.schedule_at(at, Priority::DEFAULT, move |sim| {
            element.start(sim);
            let off = Rc::clone(&element);
            if let Err(e) = sim.schedule_at(stopping_time, Priority::DEFAULT, move |sim| off.stop(sim)) {
                // The start ran late (after the stop time): stop right away.
                warn!(error = %e, "switch stop time already passed");
                element.stop(sim);
            }
        })
    }
}
