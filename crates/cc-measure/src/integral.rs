//! `IntegralMeasureMatrix` — per-period records obtained by differencing a
//! cumulative single-period matrix.

use tracing::trace;

use crate::{MeasureMatrix, RecordMatrix};

/// Turns a cumulative matrix into a `measures × records` matrix.
///
/// The wrapped matrix keeps counting in its column 0.  Each
/// [`new_record`][RecordMatrix::new_record] adds what it gained since the
/// previous call to the current record and moves to the next one.  Once the
/// last record is reached it keeps accumulating there.
#[derive(Clone, Debug)]
pub struct IntegralMeasureMatrix<M> {
    inner:       M,
    /// Row-major `num_measures × num_records`.
    records:     Vec<f64>,
    /// Inner values at the last `new_record`.
    last:        Vec<f64>,
    num_records: usize,
    current:     usize,
}

impl<M: MeasureMatrix> IntegralMeasureMatrix<M> {
    /// # Panics
    /// Panics if `num_records == 0`.
    pub fn new(inner: M, num_records: usize) -> Self {
        assert!(num_records > 0, "an integral matrix needs at least one record");
        let m = inner.num_measures();
        let last = (0..m).map(|i| inner.measure(i, 0)).collect();
        Self {
            inner,
            records: vec![0.0; m * num_records],
            last,
            num_records,
            current: 0,
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// The cumulative matrix, for the model to add observations to.
    pub fn inner_mut(&mut self) -> &mut M {
        &mut self.inner
    }

    /// Index of the record currently accumulating.
    pub fn current_record(&self) -> usize {
        self.current
    }

    #[inline]
    fn pending(&self, measure: usize) -> f64 {
        self.inner.measure(measure, 0) - self.last[measure]
    }
}

impl<M: MeasureMatrix> MeasureMatrix for IntegralMeasureMatrix<M> {
    fn init(&mut self) {
        self.inner.init();
        self.records.fill(0.0);
        for (i, l) in self.last.iter_mut().enumerate() {
            *l = self.inner.measure(i, 0);
        }
        self.current = 0;
    }

    fn num_measures(&self) -> usize {
        self.last.len()
    }

    fn num_periods(&self) -> usize {
        self.num_records
    }

    fn set_num_periods(&mut self, num_periods: usize) {
        assert!(num_periods > 0, "an integral matrix needs at least one record");
        if num_periods == self.num_records {
            return;
        }
        let old = self.num_records;
        let mut records = vec![0.0; self.num_measures() * num_periods];
        for i in 0..self.num_measures() {
            let keep = old.min(num_periods);
            records[i * num_periods..i * num_periods + keep]
                .copy_from_slice(&self.records[i * old..i * old + keep]);
        }
        self.records = records;
        self.num_records = num_periods;
        self.current = self.current.min(num_periods - 1);
    }

    fn measure(&self, measure: usize, period: usize) -> f64 {
        let v = self.records[measure * self.num_records + period];
        if period == self.current { v + self.pending(measure) } else { v }
    }

    fn regroup_periods(&mut self, x: usize) {
        assert!(x > 0, "regroup factor must be positive");
        if x == 1 {
            return;
        }
        let old = self.num_records;
        let n = old.div_ceil(x);
        let mut records = vec![0.0; self.num_measures() * n];
        for i in 0..self.num_measures() {
            for p in 0..old {
                records[i * n + p / x] += self.records[i * old + p];
            }
        }
        self.records = records;
        self.num_records = n;
        self.current /= x;
    }
}

impl<M: MeasureMatrix> RecordMatrix for IntegralMeasureMatrix<M> {
    fn new_record(&mut self) {
        let n = self.num_records;
        for i in 0..self.num_measures() {
            let v = self.inner.measure(i, 0);
            self.records[i * n + self.current] += v - self.last[i];
            self.last[i] = v;
        }
        if self.current + 1 < n {
            self.current += 1;
        }
        trace!(record = self.current, "record opened");
    }
}
