use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("invalid delay {0}: must be finite and non-negative")]
    InvalidDelay(f64),

    #[error("cannot schedule at time {time}: the clock is already at {now}")]
    InPast { time: f64, now: f64 },

    #[error("switch interval [{start}, {stop}] is empty or not finite")]
    InvalidInterval { start: f64, stop: f64 },
}

pub type KernelResult<T> = Result<T, KernelError>;
