//! CSV export of aggregated values.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;
use ndarray::Array2;

use crate::{MeasureError, MeasureResult};

/// Write `values` with one row per measure, prefixed by its name, under a
/// header of `"measure"` followed by `column_names`.
pub fn write_matrix_csv<W: Write>(
    out:          W,
    row_names:    &[&str],
    column_names: &[&str],
    values:       &Array2<f64>,
) -> MeasureResult<()> {
    if row_names.len() != values.nrows() {
        return Err(MeasureError::DimensionMismatch {
            what:     "row names",
            expected: values.nrows(),
            got:      row_names.len(),
        });
    }
    if column_names.len() != values.ncols() {
        return Err(MeasureError::DimensionMismatch {
            what:     "column names",
            expected: values.ncols(),
            got:      column_names.len(),
        });
    }
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(std::iter::once("measure").chain(column_names.iter().copied()))?;
    for (name, row) in row_names.iter().zip(values.rows()) {
        wtr.write_record(
            std::iter::once(name.to_string()).chain(row.iter().map(|v| v.to_string())),
        )?;
    }
    wtr.flush()?;
    Ok(())
}

/// [`write_matrix_csv`] to a new file at `path`.
pub fn write_matrix_csv_file(
    path:         &Path,
    row_names:    &[&str],
    column_names: &[&str],
    values:       &Array2<f64>,
) -> MeasureResult<()> {
    write_matrix_csv(File::create(path)?, row_names, column_names, values)
}

/// Column names for a replication layout: `"main0"`, `"main1"`, … and
/// `"all"` for the aggregate column.
pub fn replication_column_names(num_main: usize, aggregate_column: bool) -> Vec<String> {
    let mut names: Vec<String> = (0..num_main).map(|j| format!("main{j}")).collect();
    if aggregate_column {
        names.push("all".to_string());
    }
    names
}
