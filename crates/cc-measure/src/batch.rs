//! Batch-means aggregation over a set of record matrices.
//!
//! # Real and effective batches
//!
//! With aggregation on, column `k` of every registered matrix holds real
//! batch `k`; matrices grow by doubling and are never reset during a run.
//! [`BatchMeansMatrices::regroup`] merges consecutive real batches in place
//! when the analysis wants coarser batches.  With aggregation off, matrices
//! hold one column that is reset at every batch start.
//!
//! Values are raw sums.  Dividing by elapsed time is a separate call to
//! [`time_normalize`] because cost-weighted aggregates need the raw counts.

use tracing::debug;

use crate::{MeasureError, MeasureResult, RecordMatrix};

/// Batch-means settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BatchConfig {
    /// Keep one column per real batch.
    pub aggregation:      bool,
    /// Columns allocated at the start of a run.
    pub initial_capacity: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            aggregation:      true,
            initial_capacity: 16,
        }
    }
}

/// The registered matrices of a batch-means experiment and its batch
/// boundaries.
pub struct BatchMeansMatrices {
    config:     BatchConfig,
    matrices:   Vec<Box<dyn RecordMatrix>>,
    capacity:   usize,
    /// Number of real batches closed so far.
    num_real:   usize,
    start_time: f64,
    /// Ending time of every closed real batch.
    batch_ends: Vec<f64>,
}

impl BatchMeansMatrices {
    pub fn new(config: BatchConfig) -> MeasureResult<Self> {
        if config.initial_capacity == 0 {
            return Err(MeasureError::ZeroLength("initial batch capacity"));
        }
        Ok(Self {
            capacity: config.initial_capacity,
            config,
            matrices: Vec::new(),
            num_real: 0,
            start_time: 0.0,
            batch_ends: Vec::new(),
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Add a matrix; returns its index.
    pub fn register(&mut self, matrix: Box<dyn RecordMatrix>) -> usize {
        self.matrices.push(matrix);
        self.matrices.len() - 1
    }

    pub fn num_matrices(&self) -> usize {
        self.matrices.len()
    }

    pub fn matrix(&self, m: usize) -> MeasureResult<&dyn RecordMatrix> {
        self.matrices.get(m).map(|b| &**b).ok_or(MeasureError::UnknownMatrix(m))
    }

    /// Columns currently allocated in every matrix.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_real_batches(&self) -> usize {
        self.num_real
    }

    pub fn batch_ends(&self) -> &[f64] {
        &self.batch_ends
    }

    /// Reset for a new run whose first batch starts at `start_time`.
    pub fn init_matrices(&mut self, start_time: f64) {
        self.capacity = self.config.initial_capacity;
        let periods = if self.config.aggregation { self.capacity } else { 1 };
        for m in &mut self.matrices {
            m.set_num_periods(periods);
            m.init();
        }
        self.num_real = 0;
        self.start_time = start_time;
        self.batch_ends.clear();
        debug!(periods, matrices = self.matrices.len(), "batch matrices initialised");
    }

    /// Start of a real batch.  Without aggregation the single column is
    /// cleared.
    pub fn begin_batch(&mut self) {
        if !self.config.aggregation {
            for m in &mut self.matrices {
                m.init();
            }
        }
    }

    /// End of a real batch at `time`: close the current record of every
    /// matrix.
    pub fn end_batch(&mut self, time: f64) {
        self.num_real += 1;
        self.batch_ends.push(time);
        if self.config.aggregation && self.num_real >= self.capacity {
            self.capacity *= 2;
            for m in &mut self.matrices {
                m.set_num_periods(self.capacity);
            }
            debug!(capacity = self.capacity, "batch capacity doubled");
        }
        for m in &mut self.matrices {
            m.new_record();
        }
    }

    /// Merge every `x` consecutive real batches into one.
    ///
    /// Batches left over when `x` does not divide the count are merged into
    /// the batch still accumulating.
    pub fn regroup(&mut self, x: usize) -> MeasureResult<()> {
        if x == 0 {
            return Err(MeasureError::ZeroLength("regroup factor"));
        }
        if x == 1 {
            return Ok(());
        }
        for m in &mut self.matrices {
            m.regroup_periods(x);
        }
        self.num_real /= x;
        self.batch_ends = self.batch_ends.chunks_exact(x).map(|c| c[x - 1]).collect();
        if self.config.aggregation {
            self.capacity = self.capacity.div_ceil(x);
        }
        debug!(x, batches = self.num_real, "batches regrouped");
        Ok(())
    }

    fn check_range(&self, start: usize, len: usize) -> MeasureResult<()> {
        if len == 0 {
            return Err(MeasureError::ZeroLength("batch count"));
        }
        let first = if self.config.aggregation { 0 } else { self.num_real.saturating_sub(1) };
        let available = first..self.num_real;
        if start < available.start || start + len > available.end {
            return Err(MeasureError::BatchRange {
                start,
                end: start + len,
                available: self.num_real,
            });
        }
        Ok(())
    }

    /// Sum of each measure of matrix `m` over batches `start..start + len`.
    ///
    /// Without aggregation only the last closed batch can be read.
    pub fn batch_values(&self, m: usize, start: usize, len: usize) -> MeasureResult<Vec<f64>> {
        let mut out = vec![0.0; self.matrix(m)?.num_measures()];
        self.batch_values_into(m, start, len, &mut out)?;
        Ok(out)
    }

    /// Like [`batch_values`][Self::batch_values], writing into `out`.
    pub fn batch_values_into(
        &self,
        m:     usize,
        start: usize,
        len:   usize,
        out:   &mut [f64],
    ) -> MeasureResult<()> {
        let mat = self.matrix(m)?;
        self.check_range(start, len)?;
        // Without aggregation only the last batch is kept, in column 0.
        let start = if self.config.aggregation { start } else { 0 };
        if out.len() != mat.num_measures() {
            return Err(MeasureError::DimensionMismatch {
                what:     "output length",
                expected: mat.num_measures(),
                got:      out.len(),
            });
        }
        for (i, o) in out.iter_mut().enumerate() {
            *o = (start..start + len).map(|p| mat.measure(i, p)).sum();
        }
        Ok(())
    }

    /// Simulated time covered by batches `start..start + len`.
    pub fn batch_duration(&self, start: usize, len: usize) -> MeasureResult<f64> {
        self.check_range(start, len)?;
        let from = if start == 0 { self.start_time } else { self.batch_ends[start - 1] };
        Ok(self.batch_ends[start + len - 1] - from)
    }
}

/// Divide every value by `duration`.
pub fn time_normalize(values: &mut [f64], duration: f64) -> MeasureResult<()> {
    if values.is_empty() {
        return Err(MeasureError::ZeroLength("values"));
    }
    for v in values {
        *v /= duration;
    }
    Ok(())
}
