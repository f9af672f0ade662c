use cc_kernel::KernelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeriodError {
    #[error("at least two periods are needed, got {0}")]
    InvalidPeriodCount(usize),

    #[error("period duration must be finite and positive, got {0}")]
    InvalidDuration(f64),

    #[error("starting time must be finite and non-negative, got {0}")]
    InvalidStartingTime(f64),

    #[error("period boundary {index} ({next}) precedes the previous boundary ({previous})")]
    NonMonotonicBoundaries {
        index:    usize,
        previous: f64,
        next:     f64,
    },

    #[error("period {period} out of range for {num_periods} periods")]
    InvalidPeriod {
        period:      usize,
        num_periods: usize,
    },

    #[error("illegal state: {0}")]
    IllegalState(&'static str),

    #[error("scheduling failed: {0}")]
    Kernel(#[from] KernelError),
}

pub type PeriodResult<T> = Result<T, PeriodError>;
