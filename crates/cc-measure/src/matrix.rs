//! The measure-matrix capability and a plain accumulator.
//!
//! A measure matrix has one row per measure (served contacts, abandonments,
//! busy time, …) and one column per period or batch.

use std::cell::RefCell;
use std::rc::Rc;

/// A `measures × periods` matrix of collected values.
pub trait MeasureMatrix {
    /// Zero every value, keeping the dimensions.
    fn init(&mut self);

    fn num_measures(&self) -> usize;

    fn num_periods(&self) -> usize;

    /// Resize the period dimension.  Existing columns are kept; new ones
    /// start at zero.
    fn set_num_periods(&mut self, num_periods: usize);

    fn measure(&self, measure: usize, period: usize) -> f64;

    /// Merge every `x` consecutive periods into one by summing them.  The
    /// period count becomes `ceil(num_periods / x)`.
    ///
    /// # Panics
    /// Panics if `x == 0`.
    fn regroup_periods(&mut self, x: usize);
}

/// A matrix that accumulates into a current column and can close it.
pub trait RecordMatrix: MeasureMatrix {
    /// Close the current record and open the next one.
    fn new_record(&mut self);
}

// ── Shared matrices ───────────────────────────────────────────────────────────

impl<M: MeasureMatrix + ?Sized> MeasureMatrix for Rc<RefCell<M>> {
    fn init(&mut self) {
        self.borrow_mut().init()
    }

    fn num_measures(&self) -> usize {
        self.borrow().num_measures()
    }

    fn num_periods(&self) -> usize {
        self.borrow().num_periods()
    }

    fn set_num_periods(&mut self, num_periods: usize) {
        self.borrow_mut().set_num_periods(num_periods)
    }

    fn measure(&self, measure: usize, period: usize) -> f64 {
        self.borrow().measure(measure, period)
    }

    fn regroup_periods(&mut self, x: usize) {
        self.borrow_mut().regroup_periods(x)
    }
}

impl<M: RecordMatrix + ?Sized> RecordMatrix for Rc<RefCell<M>> {
    fn new_record(&mut self) {
        self.borrow_mut().new_record()
    }
}

// ── SumMatrix ─────────────────────────────────────────────────────────────────

/// Dense row-major accumulator.
#[derive(Clone, Debug, PartialEq)]
pub struct SumMatrix {
    values:       Vec<f64>,
    num_measures: usize,
    num_periods:  usize,
}

impl SumMatrix {
    pub fn new(num_measures: usize, num_periods: usize) -> Self {
        Self {
            values: vec![0.0; num_measures * num_periods],
            num_measures,
            num_periods,
        }
    }

    /// Build from rows of equal length.
    ///
    /// # Panics
    /// Panics if the rows differ in length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let num_periods = rows.first().map_or(0, Vec::len);
        assert!(rows.iter().all(|r| r.len() == num_periods), "ragged rows");
        Self {
            values: rows.concat(),
            num_measures: rows.len(),
            num_periods,
        }
    }

    #[inline]
    pub fn add(&mut self, measure: usize, period: usize, x: f64) {
        let k = self.offset(measure, period);
        self.values[k] += x;
    }

    #[inline]
    pub fn set(&mut self, measure: usize, period: usize, x: f64) {
        let k = self.offset(measure, period);
        self.values[k] = x;
    }

    pub fn row(&self, measure: usize) -> &[f64] {
        let start = measure * self.num_periods;
        &self.values[start..start + self.num_periods]
    }

    #[inline]
    fn offset(&self, measure: usize, period: usize) -> usize {
        assert!(
            measure < self.num_measures && period < self.num_periods,
            "({measure}, {period}) outside a {}×{} matrix",
            self.num_measures,
            self.num_periods
        );
        measure * self.num_periods + period
    }

    fn rebuild(&mut self, num_periods: usize, mut column: impl FnMut(&[f64], usize) -> f64) {
        let mut values = Vec::with_capacity(self.num_measures * num_periods);
        for i in 0..self.num_measures {
            let row = self.row(i);
            values.extend((0..num_periods).map(|p| column(row, p)));
        }
        self.values = values;
        self.num_periods = num_periods;
    }
}

impl MeasureMatrix for SumMatrix {
    fn init(&mut self) {
        self.values.fill(0.0);
    }

    fn num_measures(&self) -> usize {
        self.num_measures
    }

    fn num_periods(&self) -> usize {
        self.num_periods
    }

    fn set_num_periods(&mut self, num_periods: usize) {
        if num_periods != self.num_periods {
            self.rebuild(num_periods, |row, p| row.get(p).copied().unwrap_or(0.0));
        }
    }

    #[inline]
    fn measure(&self, measure: usize, period: usize) -> f64 {
        self.values[self.offset(measure, period)]
    }

    fn regroup_periods(&mut self, x: usize) {
        assert!(x > 0, "regroup factor must be positive");
        if x == 1 {
            return;
        }
        let n = self.num_periods.div_ceil(x);
        self.rebuild(n, |row, p| row[p * x..((p + 1) * x).min(row.len())].iter().sum());
    }
}
