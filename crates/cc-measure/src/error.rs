//! Error types for cc-measure.

use thiserror::Error;

/// Aggregation failures.  Every check runs before any value is written.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("{what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what:     &'static str,
        expected: usize,
        got:      usize,
    },

    #[error("{0} must not be empty or zero")]
    ZeroLength(&'static str),

    #[error("batches {start}..{end} out of range ({available} available)")]
    BatchRange {
        start:     usize,
        end:       usize,
        available: usize,
    },

    #[error("no matrix at index {0}")]
    UnknownMatrix(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Alias for `Result<T, MeasureError>`.
pub type MeasureResult<T> = Result<T, MeasureError>;
