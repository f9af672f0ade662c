//! Listener trait for period transitions.

use crate::PeriodChangeEvent;

/// Callbacks invoked by a [`PeriodChangeEvent`] when the current period
/// changes and when the simulation is stopped.
///
/// Listeners are registered as `Rc<dyn PeriodChangeListener>` and called in
/// registration order, synchronously, before the kernel dispatches any other
/// event at the same instant.  Methods take `&self`, so per-period state
/// lives in `Cell`/`RefCell`.
///
/// Listeners must not add or remove listeners on the event that is notifying
/// them.
///
/// # Example — period logger
///
/// ```rust,ignore
/// struct PeriodLog(RefCell<Vec<usize>>);
///
/// impl PeriodChangeListener for PeriodLog {
///     fn change_period(&self, pce: &PeriodChangeEvent) {
///         self.0.borrow_mut().push(pce.current_period());
///     }
/// }
/// ```
pub trait PeriodChangeListener {
    /// Called after `pce.current_period()` changed, either by a scheduled
    /// transition or by [`PeriodChangeEvent::set_current_period`].  Check
    /// `pce.is_locked()` to tell the two apart.
    fn change_period(&self, pce: &PeriodChangeEvent);

    /// Called by [`PeriodChangeEvent::stop`] at the end of a run.
    fn stop(&self, _pce: &PeriodChangeEvent) {}
}
