//! Per-replication extraction of period values.
//!
//! # Output layout
//!
//! ```text
//!            main 0   main 1  …  main P−1 | aggregate (optional)
//! measure 0
//! measure 1
//! ```
//!
//! Column `j < P` is main period `j` (period index `j + 1`).  The aggregate
//! column sums the periods selected by [`ReplicationLayout`].

use cc_period::PeriodChangeEvent;
use ndarray::Array2;
use tracing::debug;

use crate::{MeasureError, MeasureMatrix, MeasureResult};

/// Which periods enter the aggregate column.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReplicationLayout {
    pub include_preliminary: bool,
    pub include_wrap_up:     bool,
    /// One flag per main period; `None` selects all of them.
    pub main_period_mask:    Option<Vec<bool>>,
    /// Append the aggregate column.
    pub aggregate_column:    bool,
}

impl Default for ReplicationLayout {
    fn default() -> Self {
        Self {
            include_preliminary: false,
            include_wrap_up:     false,
            main_period_mask:    None,
            aggregate_column:    true,
        }
    }
}

impl ReplicationLayout {
    /// Columns of the output for `num_main` main periods.
    pub fn num_columns(&self, num_main: usize) -> usize {
        num_main + usize::from(self.aggregate_column)
    }

    /// Period indices summed into the aggregate column.
    pub fn aggregated_periods(&self, pce: &PeriodChangeEvent) -> Vec<usize> {
        let num_main = pce.num_main_periods();
        let mut periods = Vec::with_capacity(num_main + 2);
        if self.include_preliminary {
            periods.push(0);
        }
        periods.extend((0..num_main).filter(|&j| self.selects(j)).map(|j| j + 1));
        if self.include_wrap_up {
            periods.push(pce.wrap_up_period());
        }
        periods
    }

    #[inline]
    fn selects(&self, main_period: usize) -> bool {
        self.main_period_mask.as_ref().is_none_or(|m| m[main_period])
    }

    fn check(&self, pce: &PeriodChangeEvent) -> MeasureResult<()> {
        let num_main = pce.num_main_periods();
        if num_main == 0 {
            return Err(MeasureError::ZeroLength("main periods"));
        }
        if let Some(mask) = &self.main_period_mask {
            if mask.len() != num_main {
                return Err(MeasureError::DimensionMismatch {
                    what:     "main-period mask length",
                    expected: num_main,
                    got:      mask.len(),
                });
            }
        }
        Ok(())
    }
}

/// The matrices reset at every replication.
#[derive(Default)]
pub struct ReplicationMatrices {
    matrices: Vec<Box<dyn MeasureMatrix>>,
}

impl ReplicationMatrices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a matrix; returns its index.
    pub fn register(&mut self, matrix: Box<dyn MeasureMatrix>) -> usize {
        self.matrices.push(matrix);
        self.matrices.len() - 1
    }

    pub fn num_matrices(&self) -> usize {
        self.matrices.len()
    }

    pub fn matrix(&self, m: usize) -> MeasureResult<&dyn MeasureMatrix> {
        self.matrices.get(m).map(|b| &**b).ok_or(MeasureError::UnknownMatrix(m))
    }

    /// Zero every registered matrix.
    pub fn init_replication(&mut self) {
        for m in &mut self.matrices {
            m.init();
        }
        debug!(matrices = self.matrices.len(), "replication matrices initialised");
    }

    /// [`replication_values`] of matrix `m`.
    pub fn values(
        &self,
        pce:    &PeriodChangeEvent,
        m:      usize,
        layout: &ReplicationLayout,
    ) -> MeasureResult<Array2<f64>> {
        replication_values(pce, self.matrix(m)?, layout)
    }
}

/// Extract the `measures × (P [+ 1])` values of one replication.
///
/// # Errors
/// [`MeasureError::DimensionMismatch`] if `matrix` does not have one period
/// per period of `pce` or the mask has the wrong length;
/// [`MeasureError::ZeroLength`] if there are no measures or no main periods.
pub fn replication_values(
    pce:    &PeriodChangeEvent,
    matrix: &dyn MeasureMatrix,
    layout: &ReplicationLayout,
) -> MeasureResult<Array2<f64>> {
    let mut out = Array2::zeros((
        matrix.num_measures(),
        layout.num_columns(pce.num_main_periods()),
    ));
    replication_values_into(pce, matrix, layout, &mut out)?;
    Ok(out)
}

/// Like [`replication_values`], writing into an existing matrix.  Nothing is
/// written unless every dimension matches.
pub fn replication_values_into(
    pce:    &PeriodChangeEvent,
    matrix: &dyn MeasureMatrix,
    layout: &ReplicationLayout,
    out:    &mut Array2<f64>,
) -> MeasureResult<()> {
    layout.check(pce)?;
    if matrix.num_measures() == 0 {
        return Err(MeasureError::ZeroLength("measures"));
    }
    if matrix.num_periods() != pce.num_periods() {
        return Err(MeasureError::DimensionMismatch {
            what:     "matrix periods",
            expected: pce.num_periods(),
            got:      matrix.num_periods(),
        });
    }
    check_shape(out, matrix.num_measures(), layout.num_columns(pce.num_main_periods()))?;

    let num_main = pce.num_main_periods();
    let aggregated = layout.aggregated_periods(pce);
    for (i, mut row) in out.rows_mut().into_iter().enumerate() {
        for j in 0..num_main {
            row[j] = matrix.measure(i, j + 1);
        }
        if layout.aggregate_column {
            row[num_main] = aggregated.iter().map(|&p| matrix.measure(i, p)).sum();
        }
    }
    Ok(())
}

/// Turn sums into rates: main column `j` is divided by the duration of main
/// period `j`, the aggregate column by `total_time` or, when `None`, by the
/// summed duration of the aggregated periods.
///
/// A wrap-up period that was never closed has a NaN duration, which
/// propagates into the aggregate.
pub fn time_normalize(
    pce:        &PeriodChangeEvent,
    values:     &mut Array2<f64>,
    layout:     &ReplicationLayout,
    total_time: Option<f64>,
) -> MeasureResult<()> {
    layout.check(pce)?;
    let num_main = pce.num_main_periods();
    if values.nrows() == 0 {
        return Err(MeasureError::ZeroLength("measures"));
    }
    check_shape(values, values.nrows(), layout.num_columns(num_main))?;

    for j in 0..num_main {
        let d = pce.main_period_duration(j);
        values.column_mut(j).mapv_inplace(|v| v / d);
    }
    if layout.aggregate_column {
        let total = total_time.unwrap_or_else(|| {
            layout
                .aggregated_periods(pce)
                .into_iter()
                .map(|p| pce.period_duration(p))
                .sum()
        });
        values.column_mut(num_main).mapv_inplace(|v| v / total);
    }
    Ok(())
}

fn check_shape(values: &Array2<f64>, rows: usize, cols: usize) -> MeasureResult<()> {
    if values.nrows() != rows {
        return Err(MeasureError::DimensionMismatch {
            what:     "output rows",
            expected: rows,
            got:      values.nrows(),
        });
    }
    if values.ncols() != cols {
        return Err(MeasureError::DimensionMismatch {
            what:     "output columns",
            expected: cols,
            got:      values.ncols(),
        });
    }
    Ok(())
}
