//! The `ValueGenerator` capability and the contacts it is queried for.

use std::rc::Rc;

use cc_core::ContactTypeId;
use cc_period::PeriodChangeEvent;

use crate::{ValueError, ValueResult};

/// Anything a generator can be asked a value for.
pub trait Contact {
    fn contact_type(&self) -> ContactTypeId;
}

impl Contact for ContactTypeId {
    #[inline]
    fn contact_type(&self) -> ContactTypeId {
        *self
    }
}

/// Produces a (possibly random) value for a contact, typically a patience
/// time, service time or transfer probability.
///
/// Implementations select the row of their table from the current period of
/// their `PeriodChangeEvent`, or row 0 when they have none.
pub trait ValueGenerator {
    fn next_double(&mut self, contact: &dyn Contact) -> f64;

    /// Reset at the start of a run.
    fn init(&mut self);

    /// Rewind every random stream to its first substream.
    fn reset_start_stream(&mut self) {}

    /// Rewind every random stream to the start of its current substream.
    fn reset_start_substream(&mut self) {}

    /// Move every random stream to its next substream, typically between
    /// two replications.  Two generators built from the same seeds then
    /// draw the same values in replication `r`, whatever they drew before.
    fn reset_next_substream(&mut self) {}
}

/// Row of a period-indexed table: the current period, or 0 without a clock.
#[inline]
pub(crate) fn current_period(pce: Option<&Rc<PeriodChangeEvent>>) -> usize {
    pce.map_or(0, |p| p.current_period())
}

/// Check that `table` is a non-empty rectangle with `expected_rows` rows and
/// return its column count.
pub(crate) fn check_table<T>(table: &[Vec<T>], expected_rows: usize) -> ValueResult<usize> {
    let Some(first) = table.first() else {
        return Err(ValueError::EmptyTable);
    };
    if table.len() != expected_rows {
        return Err(ValueError::PeriodCountMismatch {
            expected: expected_rows,
            got:      table.len(),
        });
    }
    let num_types = first.len();
    if num_types == 0 {
        return Err(ValueError::EmptyTable);
    }
    for (row, r) in table.iter().enumerate() {
        if r.len() != num_types {
            return Err(ValueError::RaggedTable { row, expected: num_types, got: r.len() });
        }
    }
    Ok(num_types)
}

/// Rows a table needs for `pce`: one per period, or a single row.
#[inline]
pub(crate) fn expected_rows(pce: Option<&Rc<PeriodChangeEvent>>) -> usize {
    pce.map_or(1, |p| p.num_periods())
}
