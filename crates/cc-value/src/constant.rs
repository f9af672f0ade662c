//! `ConstantValueGenerator` — a `[period][type]` table of fixed values.

use std::rc::Rc;

use cc_period::PeriodChangeEvent;
use tracing::debug;

use crate::generator::{check_table, current_period, expected_rows};
use crate::{Contact, ValueGenerator, ValueResult};

/// Returns `vals[current period][contact type]`.
///
/// The table has one row per period of the clock, or a single row when no
/// clock is given.  Values can be replaced between runs; the row count
/// cannot.
#[derive(Clone, Debug)]
pub struct ConstantValueGenerator {
    pce:       Option<Rc<PeriodChangeEvent>>,
    vals:      Vec<Vec<f64>>,
    num_types: usize,
}

impl ConstantValueGenerator {
    /// Full `[period][type]` table.
    pub fn new(pce: Option<Rc<PeriodChangeEvent>>, vals: Vec<Vec<f64>>) -> ValueResult<Self> {
        let num_types = check_table(&vals, expected_rows(pce.as_ref()))?;
        Ok(Self { pce, vals, num_types })
    }

    /// The same value for every type and period.
    pub fn scalar(
        pce:       Option<Rc<PeriodChangeEvent>>,
        num_types: usize,
        value:     f64,
    ) -> ValueResult<Self> {
        let rows = expected_rows(pce.as_ref());
        Self::new(pce, vec![vec![value; num_types]; rows])
    }

    /// One value per type, repeated for every period.
    pub fn per_type(pce: Option<Rc<PeriodChangeEvent>>, vals: Vec<f64>) -> ValueResult<Self> {
        let rows = expected_rows(pce.as_ref());
        Self::new(pce, vec![vals; rows])
    }

    pub fn period_change_event(&self) -> Option<&Rc<PeriodChangeEvent>> {
        self.pce.as_ref()
    }

    pub fn num_periods(&self) -> usize {
        self.vals.len()
    }

    pub fn num_types(&self) -> usize {
        self.num_types
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.vals
    }

    pub fn value(&self, period: usize, contact_type: usize) -> f64 {
        self.vals[period][contact_type]
    }

    /// Replace the whole table.  The period count must stay the same; the
    /// number of types may change.
    pub fn set_values(&mut self, vals: Vec<Vec<f64>>) -> ValueResult<()> {
        self.num_types = check_table(&vals, self.vals.len())?;
        self.vals = vals;
        debug!(periods = self.vals.len(), types = self.num_types, "constant values replaced");
        Ok(())
    }

    /// # Panics
    /// Panics if `period` or `contact_type` is out of range.
    pub fn set_value(&mut self, period: usize, contact_type: usize, value: f64) {
        self.vals[period][contact_type] = value;
    }
}

impl ValueGenerator for ConstantValueGenerator {
    #[inline]
    fn next_double(&mut self, contact: &dyn Contact) -> f64 {
        let p = current_period(self.pce.as_ref());
        self.vals[p][contact.contact_type().index()]
    }

    fn init(&mut self) {}
}
