//! The `PeriodChangeEvent` clock.
//!
//! # Period layout
//!
//! ```text
//!   period:   0 (preliminary) |   1   |   2   | … |   P   | P+1 (wrap-up)
//!   time:   0 ─────────────── t_0 ───── t_1 ─── … ─ t_P ─────────── stop
//! ```
//!
//! `P + 1` boundaries `t_0 ≤ t_1 ≤ … ≤ t_P` split time into `P + 2`
//! periods.  A time exactly on a boundary belongs to the period *starting*
//! there.  The wrap-up period has no scheduled end: it closes when the model
//! calls [`PeriodChangeEvent::stop`].
//!
//! # Transitions and stale callbacks
//!
//! [`start`][PeriodChangeEvent::start] schedules one callback per remaining
//! boundary at [`Priority::PERIOD_CHANGE`], so that listeners see the new
//! period before any ordinary event at the same instant.  Every callback
//! captures the generation counter (`mod_count`) current at scheduling time;
//! every cancellation bumps it.  A callback whose captured generation no
//! longer matches is a no-op, whether or not the kernel still held it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use cc_kernel::{EventHandle, Priority, Simulator};
use tracing::{debug, trace, warn};

use crate::{PeriodChangeListener, PeriodError, PeriodResult};

/// Partitions simulation time into preliminary, main and wrap-up periods and
/// announces transitions to registered listeners.
///
/// Always handled through `Rc<PeriodChangeEvent>`: the constructors return
/// one, generators and listeners keep clones, and scheduled transitions
/// hold a `Weak` back-reference.
pub struct PeriodChangeEvent {
    /// `t_0..=t_P`.  Fixed at construction, like the period count.
    ending_times:   Vec<f64>,
    /// `Some(d)` when every main period lasts `d`; enables O(1) lookup.
    fixed_duration: Option<f64>,

    current_period: Cell<usize>,
    locked:         Cell<bool>,
    started:        Cell<bool>,
    /// −1 until `stop` is called.
    stop_time:      Cell<f64>,
    mod_count:      Cell<u64>,
    pending:        RefCell<Vec<EventHandle>>,

    listeners:      RefCell<Vec<Rc<dyn PeriodChangeListener>>>,
    /// Depth of in-flight notifications (listeners may force a period from
    /// inside a callback, which nests).
    notify_depth:   Cell<u32>,

    this:           Weak<PeriodChangeEvent>,
}

impl PeriodChangeEvent {
    // ── Construction ──────────────────────────────────────────────────────

    /// `num_periods` periods (preliminary and wrap-up included), every main
    /// period lasting `period_duration`, the first main period starting at
    /// `starting_time`.
    ///
    /// Boundaries are `t_i = starting_time + i · period_duration` for
    /// `i = 0..=num_periods − 2`.
    pub fn with_fixed_duration(
        period_duration: f64,
        num_periods:     usize,
        starting_time:   f64,
    ) -> PeriodResult<Rc<Self>> {
        if num_periods < 2 {
            return Err(PeriodError::InvalidPeriodCount(num_periods));
        }
        if !(period_duration.is_finite() && period_duration > 0.0) {
            return Err(PeriodError::InvalidDuration(period_duration));
        }
        if !(starting_time.is_finite() && starting_time >= 0.0) {
            return Err(PeriodError::InvalidStartingTime(starting_time));
        }
        let ending_times = (0..num_periods - 1)
            .map(|i| starting_time + i as f64 * period_duration)
            .collect();
        Ok(Self::build(ending_times, Some(period_duration)))
    }

    /// Periods delimited by explicit boundaries `t_0..=t_P`, giving
    /// `ending_times.len() + 1` periods.
    pub fn with_ending_times(ending_times: Vec<f64>) -> PeriodResult<Rc<Self>> {
        let Some(&first) = ending_times.first() else {
            return Err(PeriodError::InvalidPeriodCount(1));
        };
        if !(first.is_finite() && first >= 0.0) {
            return Err(PeriodError::InvalidStartingTime(first));
        }
        for (i, pair) in ending_times.windows(2).enumerate() {
            if !pair[1].is_finite() || pair[1] < pair[0] {
                return Err(PeriodError::NonMonotonicBoundaries {
                    index:    i + 1,
                    previous: pair[0],
                    next:     pair[1],
                });
            }
        }
        Ok(Self::build(ending_times, None))
    }

    fn build(ending_times: Vec<f64>, fixed_duration: Option<f64>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            ending_times,
            fixed_duration,
            current_period: Cell::new(0),
            locked:         Cell::new(false),
            started:        Cell::new(false),
            stop_time:      Cell::new(-1.0),
            mod_count:      Cell::new(0),
            pending:        RefCell::new(Vec::new()),
            listeners:      RefCell::new(Vec::new()),
            notify_depth:   Cell::new(0),
            this:           this.clone(),
        })
    }

    // ── Shape ─────────────────────────────────────────────────────────────

    /// `P + 2`.
    #[inline]
    pub fn num_periods(&self) -> usize {
        self.ending_times.len() + 1
    }

    /// `P`.
    #[inline]
    pub fn num_main_periods(&self) -> usize {
        self.ending_times.len() - 1
    }

    /// Index of the wrap-up period, `P + 1`.
    #[inline]
    pub fn wrap_up_period(&self) -> usize {
        self.ending_times.len()
    }

    /// The boundaries `t_0..=t_P`.
    pub fn ending_times(&self) -> &[f64] {
        &self.ending_times
    }

    /// Main-period duration when all main periods have the same length.
    pub fn fixed_duration(&self) -> Option<f64> {
        self.fixed_duration
    }

    // ── Time ↔ period mapping ─────────────────────────────────────────────

    /// Period containing `time`.
    ///
    /// Times `≤ 0` or before `t_0` map to the preliminary period, times at or
    /// after `t_P` to the wrap-up period.  A boundary time belongs to the
    /// period that starts there.
    pub fn period(&self, time: f64) -> usize {
        let et = &self.ending_times;
        let last = et.len() - 1;
        if time.is_nan() || time <= 0.0 || time < et[0] {
            return 0;
        }
        if time >= et[last] {
            return last + 1;
        }
        match self.fixed_duration {
            Some(d) => {
                let mut p = (((time - et[0]) / d).floor() as usize + 1).clamp(1, last);
                // Division can land one period off right at a boundary; the
                // stored boundaries are authoritative.
                while p > 1 && time < et[p - 1] {
                    p -= 1;
                }
                while p < last && time >= et[p] {
                    p += 1;
                }
                p
            }
            None => et.partition_point(|&t| t <= time),
        }
    }

    /// Main-period index (`0..P`) used for reporting `period`.
    ///
    /// The preliminary period maps to the first main period and the wrap-up
    /// period to the last one.
    pub fn main_period(&self, period: usize) -> usize {
        let num_main = self.num_main_periods();
        if period == 0 || num_main == 0 {
            0
        } else if period > num_main {
            num_main - 1
        } else {
            period - 1
        }
    }

    /// `true` if `time` is exactly one of the boundaries.
    pub fn is_period_starting_time(&self, time: f64) -> bool {
        self.ending_times
            .binary_search_by(|t| t.total_cmp(&time))
            .is_ok()
    }

    /// Starting time of `period`: 0 for the preliminary period, `t_{p−1}`
    /// otherwise.
    ///
    /// # Panics
    /// Panics if `period >= num_periods()`.
    pub fn period_starting_time(&self, period: usize) -> f64 {
        self.check_index(period);
        if period == 0 {
            0.0
        } else {
            self.ending_times[period - 1]
        }
    }

    /// Ending time of `period`: `t_p` for `p ≤ P`.  For the wrap-up period,
    /// the stop time once [`stop`][Self::stop] was called and NaN before.
    ///
    /// # Panics
    /// Panics if `period >= num_periods()`.
    pub fn period_ending_time(&self, period: usize) -> f64 {
        self.check_index(period);
        if period < self.ending_times.len() {
            return self.ending_times[period];
        }
        let stop = self.stop_time.get();
        if stop < 0.0 {
            f64::NAN
        } else {
            stop.max(self.ending_times[period - 1])
        }
    }

    /// Duration of `period`; NaN for the wrap-up period of a run not yet
    /// stopped.
    ///
    /// # Panics
    /// Panics if `period >= num_periods()`.
    pub fn period_duration(&self, period: usize) -> f64 {
        self.period_ending_time(period) - self.period_starting_time(period)
    }

    /// Starting time of main period `mp` (`0..P`).
    pub fn main_period_starting_time(&self, mp: usize) -> f64 {
        self.period_starting_time(mp + 1)
    }

    /// Ending time of main period `mp` (`0..P`).
    pub fn main_period_ending_time(&self, mp: usize) -> f64 {
        self.period_ending_time(mp + 1)
    }

    /// Duration of main period `mp` (`0..P`).
    pub fn main_period_duration(&self, mp: usize) -> f64 {
        self.period_duration(mp + 1)
    }

    fn check_index(&self, period: usize) {
        assert!(
            period < self.num_periods(),
            "period {period} out of range for {} periods",
            self.num_periods()
        );
    }

    // ── Current state ─────────────────────────────────────────────────────

    #[inline]
    pub fn current_period(&self) -> usize {
        self.current_period.get()
    }

    /// `main_period(current_period())`.
    pub fn current_main_period(&self) -> usize {
        self.main_period(self.current_period())
    }

    pub fn is_preliminary_period(&self) -> bool {
        self.current_period() == 0
    }

    pub fn is_wrap_up_period(&self) -> bool {
        self.current_period() == self.wrap_up_period()
    }

    /// `true` after [`set_current_period`][Self::set_current_period] forced
    /// the period, until the next [`init`][Self::init].
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    /// Time at which [`stop`][Self::stop] was called, or `None`.
    pub fn stop_time(&self) -> Option<f64> {
        let t = self.stop_time.get();
        (t >= 0.0).then_some(t)
    }

    /// Generation counter; bumped on every cancellation.
    pub fn mod_count(&self) -> u64 {
        self.mod_count.get()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Reset for a new run at the simulator's current time.
    pub fn init(&self, sim: &mut Simulator) {
        self.init_at(sim, sim.now());
    }

    /// Reset for a new run, taking `time` as the current time.
    ///
    /// Cancels pending transitions, sets the current period to
    /// `period(time)` and clears the lock, stop time and started flag.
    /// Listeners are not notified.
    pub fn init_at(&self, sim: &mut Simulator, time: f64) {
        self.cancel_pending(sim);
        self.current_period.set(self.period(time));
        self.stop_time.set(-1.0);
        self.started.set(false);
        self.locked.set(false);
        debug!(time, period = self.current_period(), "period-change event initialised");
    }

    /// Schedule a transition for every boundary not yet passed.
    ///
    /// # Errors
    /// [`PeriodError::IllegalState`] if the period is locked, if the event
    /// was stopped and not re-initialised, or if it is already started.
    pub fn start(&self, sim: &mut Simulator) -> PeriodResult<()> {
        if self.locked.get() {
            return Err(PeriodError::IllegalState(
                "cannot start a locked period-change event; call init first",
            ));
        }
        if self.stop_time.get() >= 0.0 {
            return Err(PeriodError::IllegalState(
                "period-change event was stopped; call init before start",
            ));
        }
        if self.started.get() {
            return Err(PeriodError::IllegalState("period-change event already started"));
        }

        let now = sim.now();
        let stamp = self.mod_count.get();
        let mut pending = self.pending.borrow_mut();
        pending.clear();
        for &t in &self.ending_times[self.current_period.get().min(self.ending_times.len())..] {
            let delay = if t >= now {
                t - now
            } else {
                warn!(boundary = t, now, "period boundary already passed at start; firing immediately");
                0.0
            };
            let this = self.this.clone();
            let handle = sim.schedule(delay, Priority::PERIOD_CHANGE, move |_sim| {
                if let Some(pce) = this.upgrade() {
                    pce.fire(stamp);
                }
            })?;
            pending.push(handle);
        }
        drop(pending);

        self.started.set(true);
        debug!(now, period = self.current_period(), "period-change event started");
        Ok(())
    }

    /// Transition callback: advance to the next period and notify listeners.
    ///
    /// No-op while the period is locked.
    pub fn actions(&self) {
        if self.locked.get() {
            return;
        }
        let next = (self.current_period.get() + 1).min(self.wrap_up_period());
        self.current_period.set(next);
        trace!(period = next, "period change");
        self.notify_change();
    }

    fn fire(&self, stamp: u64) {
        if stamp != self.mod_count.get() {
            trace!(stamp, current = self.mod_count.get(), "stale period transition ignored");
            return;
        }
        self.actions();
    }

    /// End the run: cancel pending transitions, record the stop time and
    /// notify every listener's [`stop`][PeriodChangeListener::stop].
    ///
    /// Must be called by the model; the end of the wrap-up period is not an
    /// event.  A second call before the next [`init`][Self::init] does
    /// nothing.
    pub fn stop(&self, sim: &mut Simulator) {
        if self.stop_time.get() >= 0.0 {
            trace!(time = sim.now(), "period-change event already stopped");
            return;
        }
        self.cancel_pending(sim);
        self.stop_time.set(sim.now());
        self.started.set(false);
        debug!(time = sim.now(), period = self.current_period(), "period-change event stopped");

        let snapshot = self.listeners();
        self.notify_depth.set(self.notify_depth.get() + 1);
        for listener in &snapshot {
            listener.stop(self);
        }
        self.notify_depth.set(self.notify_depth.get() - 1);
    }

    /// Force the current period and lock the clock until the next
    /// [`init`][Self::init].
    ///
    /// If `period` differs from the current one, pending transitions are
    /// cancelled and listeners are notified exactly as for a scheduled
    /// transition (with `is_locked() == true`).
    pub fn set_current_period(&self, sim: &mut Simulator, period: usize) -> PeriodResult<()> {
        if period >= self.num_periods() {
            return Err(PeriodError::InvalidPeriod {
                period,
                num_periods: self.num_periods(),
            });
        }
        if period == self.current_period.get() {
            return Ok(());
        }
        self.cancel_pending(sim);
        self.locked.set(true);
        self.started.set(true);
        self.current_period.set(period);
        debug!(period, "period forced");
        self.notify_change();
        Ok(())
    }

    fn cancel_pending(&self, sim: &mut Simulator) {
        for handle in self.pending.borrow_mut().drain(..) {
            sim.cancel(handle);
        }
        self.mod_count.set(self.mod_count.get() + 1);
    }

    fn notify_change(&self) {
        let snapshot = self.listeners();
        self.notify_depth.set(self.notify_depth.get() + 1);
        for listener in &snapshot {
            listener.change_period(self);
        }
        self.notify_depth.set(self.notify_depth.get() - 1);
    }

    // ── Listeners ─────────────────────────────────────────────────────────

    /// Register `listener`.  Returns `false` (and changes nothing) if the
    /// same `Rc` is already registered.
    pub fn add_listener(&self, listener: Rc<dyn PeriodChangeListener>) -> bool {
        self.assert_not_notifying();
        if self.has_listener(&listener) {
            return false;
        }
        self.listeners.borrow_mut().push(listener);
        true
    }

    /// Unregister `listener`.  Returns `true` if it was registered.
    pub fn remove_listener<L>(&self, listener: &Rc<L>) -> bool
    where
        L: PeriodChangeListener + ?Sized,
    {
        self.assert_not_notifying();
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|l| same_rc(l, listener)) {
            Some(i) => {
                listeners.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn has_listener<L>(&self, listener: &Rc<L>) -> bool
    where
        L: PeriodChangeListener + ?Sized,
    {
        self.listeners.borrow().iter().any(|l| same_rc(l, listener))
    }

    pub fn clear_listeners(&self) {
        self.assert_not_notifying();
        self.listeners.borrow_mut().clear();
    }

    pub fn num_listeners(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Snapshot of the registered listeners, in notification order.
    pub fn listeners(&self) -> Vec<Rc<dyn PeriodChangeListener>> {
        self.listeners.borrow().clone()
    }

    fn assert_not_notifying(&self) {
        debug_assert!(
            self.notify_depth.get() == 0,
            "period-change listeners must not be added or removed during notification"
        );
    }
}

/// Identity comparison on the data pointer, ignoring vtables.
fn same_rc<A: ?Sized, B: ?Sized>(a: &Rc<A>, b: &Rc<B>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

impl fmt::Debug for PeriodChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodChangeEvent")
            .field("ending_times", &self.ending_times)
            .field("fixed_duration", &self.fixed_duration)
            .field("current_period", &self.current_period.get())
            .field("locked", &self.locked.get())
            .field("started", &self.started.get())
            .field("stop_time", &self.stop_time.get())
            .field("listeners", &self.num_listeners())
            .finish()
    }
}
