//! Declarative period layouts.
//!
//! Typically loaded from a JSON/TOML scenario file by the application and
//! turned into a clock with [`PeriodConfig::build`].

use std::rc::Rc;

use crate::{PeriodChangeEvent, PeriodError, PeriodResult};

/// How simulation time is split into periods.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum PeriodConfig {
    /// `num_periods` periods (preliminary and wrap-up included); every main
    /// period lasts `period_duration`; the first starts at `starting_time`.
    Fixed {
        period_duration: f64,
        num_periods:     usize,
        #[cfg_attr(feature = "serde", serde(default))]
        starting_time:   f64,
    },

    /// Explicit boundaries `t_0..=t_P`.
    Explicit { ending_times: Vec<f64> },

    /// Main periods of varying length laid end to end from `starting_time`.
    Durations {
        #[cfg_attr(feature = "serde", serde(default))]
        starting_time:  f64,
        main_durations: Vec<f64>,
    },
}

impl PeriodConfig {
    /// Total number of periods the built clock will have (`P + 2`).
    pub fn num_periods(&self) -> usize {
        match self {
            PeriodConfig::Fixed { num_periods, .. }        => *num_periods,
            PeriodConfig::Explicit { ending_times }        => ending_times.len() + 1,
            PeriodConfig::Durations { main_durations, .. } => main_durations.len() + 2,
        }
    }

    /// Validate and build the clock.
    pub fn build(&self) -> PeriodResult<Rc<PeriodChangeEvent>> {
        match self {
            PeriodConfig::Fixed { period_duration, num_periods, starting_time } => {
                PeriodChangeEvent::with_fixed_duration(*period_duration, *num_periods, *starting_time)
            }
            PeriodConfig::Explicit { ending_times } => {
                PeriodChangeEvent::with_ending_times(ending_times.clone())
            }
            PeriodConfig::Durations { starting_time, main_durations } => {
                let mut ending_times = Vec::with_capacity(main_durations.len() + 1);
                let mut t = *starting_time;
                ending_times.push(t);
                for &d in main_durations {
                    if !(d.is_finite() && d >= 0.0) {
                        return Err(PeriodError::InvalidDuration(d));
                    }
                    t += d;
                    ending_times.push(t);
                }
                PeriodChangeEvent::with_ending_times(ending_times)
            }
        }
    }
}

impl PeriodChangeEvent {
    /// Build a clock from a [`PeriodConfig`].
    pub fn from_config(config: &PeriodConfig) -> PeriodResult<Rc<Self>> {
        config.build()
    }
}
