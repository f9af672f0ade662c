//! `NonStationaryMeasureMatrix` — one record per period, rotated by the
//! period-change clock.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use cc_period::{PeriodChangeEvent, PeriodChangeListener};
use tracing::trace;

use crate::{IntegralMeasureMatrix, MeasureMatrix, RecordMatrix};

/// Exposes a cumulative single-period matrix as a `P + 2`-period matrix.
///
/// Registered as a listener of the clock it was built for.  Every period
/// change and the final stop close the current record, unless the clock is
/// locked: a forced period must not disturb the per-period values.
#[derive(Debug)]
pub struct NonStationaryMeasureMatrix<M> {
    matrix: RefCell<IntegralMeasureMatrix<M>>,
}

impl<M: MeasureMatrix + 'static> NonStationaryMeasureMatrix<M> {
    /// Wrap `inner` with one record per period of `pce` and register the
    /// result as a listener.
    pub fn new(pce: &Rc<PeriodChangeEvent>, inner: M) -> Rc<Self> {
        let this = Rc::new(Self {
            matrix: RefCell::new(IntegralMeasureMatrix::new(inner, pce.num_periods())),
        });
        pce.add_listener(this.clone());
        this
    }

    /// Unregister from `pce`.
    pub fn detach(self: &Rc<Self>, pce: &PeriodChangeEvent) -> bool {
        pce.remove_listener(self)
    }

    /// The per-period view.
    pub fn matrix(&self) -> Ref<'_, IntegralMeasureMatrix<M>> {
        self.matrix.borrow()
    }

    /// The cumulative matrix the model adds observations to.
    pub fn inner_mut(&self) -> RefMut<'_, M> {
        RefMut::map(self.matrix.borrow_mut(), IntegralMeasureMatrix::inner_mut)
    }

    fn rotate(&self, pce: &PeriodChangeEvent) {
        if pce.is_locked() {
            trace!(period = pce.current_period(), "locked period, record kept");
            return;
        }
        self.matrix.borrow_mut().new_record();
    }
}

impl<M: MeasureMatrix + 'static> PeriodChangeListener for NonStationaryMeasureMatrix<M> {
    fn change_period(&self, pce: &PeriodChangeEvent) {
        self.rotate(pce);
    }

    fn stop(&self, pce: &PeriodChangeEvent) {
        self.rotate(pce);
    }
}

impl<M: MeasureMatrix> MeasureMatrix for Rc<NonStationaryMeasureMatrix<M>> {
    fn init(&mut self) {
        self.matrix.borrow_mut().init()
    }

    fn num_measures(&self) -> usize {
        self.matrix.borrow().num_measures()
    }

    fn num_periods(&self) -> usize {
        self.matrix.borrow().num_periods()
    }

    fn set_num_periods(&mut self, num_periods: usize) {
        self.matrix.borrow_mut().set_num_periods(num_periods)
    }

    fn measure(&self, measure: usize, period: usize) -> f64 {
        self.matrix.borrow().measure(measure, period)
    }

    fn regroup_periods(&mut self, x: usize) {
        self.matrix.borrow_mut().regroup_periods(x)
    }
}

impl<M: MeasureMatrix> RecordMatrix for Rc<NonStationaryMeasureMatrix<M>> {
    fn new_record(&mut self) {
        self.matrix.borrow_mut().new_record()
    }
}
