//! Framework error type.
//!
//! Sub-crates define their own error enums (`PeriodError`, `ValueError`,
//! `MeasureError`, …).  `CcError` covers what lives in this crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CcError {
    #[error("unknown time unit {0:?}")]
    UnknownTimeUnit(String),
}

/// Shorthand result type for `cc-core`.
pub type CcResult<T> = Result<T, CcError>;
