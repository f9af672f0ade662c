//! Error types for cc-value.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValueError {
    /// A table or generator list does not have one row per period.
    #[error("expected {expected} periods, got {got}")]
    PeriodCountMismatch { expected: usize, got: usize },

    /// Rows of a `[period][type]` table differ in length.
    #[error("row {row} has {got} entries, expected {expected}")]
    RaggedTable { row: usize, expected: usize, got: usize },

    /// A distribution rejected its parameters.
    #[error("invalid distribution parameters: {0}")]
    Distribution(String),

    #[error("caching is disabled on this generator")]
    CachingDisabled,

    #[error("cache index {index} past the {len} stored values")]
    CacheIndexOutOfRange { index: usize, len: usize },

    #[error("value table must have at least one period and one contact type")]
    EmptyTable,
}

/// Alias for `Result<T, ValueError>`.
pub type ValueResult<T> = Result<T, ValueError>;
