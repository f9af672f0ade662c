//! Declarative generator parameters.
//!
//! ```json
//! {
//!   "default": { "dist": "exponential", "rate": 0.5 },
//!   "periods": [
//!     { "dist": "exponential", "rate": 1.0 },
//!     { "dist": "gamma", "shape": 2.0, "rate": 4.0, "shift": 0.1 }
//!   ],
//!   "source_unit": "minute",
//!   "target_unit": "second"
//! }
//! ```

use std::rc::Rc;

use cc_core::{RandomStream, TimeUnit};
use cc_period::PeriodChangeEvent;
use statrs::distribution::{Exp, Gamma, LogNormal, Normal, Uniform};
use statrs::statistics::Distribution as Moments;

use crate::{ConstantGen, DistGen, MultiPeriodGen, ShiftedGen, ValueError, ValueResult, VariateGen};

/// A distribution family and its parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "dist", rename_all = "snake_case"))]
pub enum DistParams {
    Constant { value: f64 },
    Exponential { rate: f64 },
    Gamma { shape: f64, rate: f64 },
    LogNormal { location: f64, scale: f64 },
    Normal { mean: f64, std_dev: f64 },
    Uniform { min: f64, max: f64 },
}

/// A distribution plus an additive shift.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenParams {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub dist:  DistParams,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shift: f64,
}

fn dist_err(e: impl std::fmt::Display) -> ValueError {
    ValueError::Distribution(e.to_string())
}

fn moments<D: Moments<f64>>(d: &D) -> (f64, f64) {
    (d.mean().unwrap_or(f64::NAN), d.variance().unwrap_or(f64::NAN))
}

impl GenParams {
    pub fn new(dist: DistParams) -> Self {
        Self { dist, shift: 0.0 }
    }

    pub fn shifted(dist: DistParams, shift: f64) -> Self {
        Self { dist, shift }
    }

    /// `(mean, variance)` of the shifted distribution.
    ///
    /// # Errors
    /// [`ValueError::Distribution`] if the parameters are invalid.
    pub fn moments(&self) -> ValueResult<(f64, f64)> {
        let (mean, var) = match self.dist {
            DistParams::Constant { value } => (value, 0.0),
            DistParams::Exponential { rate } => moments(&Exp::new(rate).map_err(dist_err)?),
            DistParams::Gamma { shape, rate } => {
                moments(&Gamma::new(shape, rate).map_err(dist_err)?)
            }
            DistParams::LogNormal { location, scale } => {
                moments(&LogNormal::new(location, scale).map_err(dist_err)?)
            }
            DistParams::Normal { mean, std_dev } => {
                moments(&Normal::new(mean, std_dev).map_err(dist_err)?)
            }
            DistParams::Uniform { min, max } => moments(&Uniform::new(min, max).map_err(dist_err)?),
        };
        Ok((mean + self.shift, var))
    }

    pub fn mean(&self) -> ValueResult<f64> {
        self.moments().map(|(m, _)| m)
    }

    pub fn variance(&self) -> ValueResult<f64> {
        self.moments().map(|(_, v)| v)
    }

    /// Build a generator drawing with `stream`.
    pub fn build(&self, stream: RandomStream) -> ValueResult<Box<dyn VariateGen>> {
        let base: Box<dyn VariateGen> = match self.dist {
            DistParams::Constant { value } => Box::new(ConstantGen(value)),
            DistParams::Exponential { rate } => {
                Box::new(DistGen::new(Exp::new(rate).map_err(dist_err)?, stream))
            }
            DistParams::Gamma { shape, rate } => {
                Box::new(DistGen::new(Gamma::new(shape, rate).map_err(dist_err)?, stream))
            }
            DistParams::LogNormal { location, scale } => {
                Box::new(DistGen::new(LogNormal::new(location, scale).map_err(dist_err)?, stream))
            }
            DistParams::Normal { mean, std_dev } => {
                Box::new(DistGen::new(Normal::new(mean, std_dev).map_err(dist_err)?, stream))
            }
            DistParams::Uniform { min, max } => {
                Box::new(DistGen::new(Uniform::new(min, max).map_err(dist_err)?, stream))
            }
        };
        Ok(if self.shift == 0.0 { base } else { Box::new(ShiftedGen::new(base, self.shift)) })
    }
}

#[cfg(feature = "serde")]
fn one() -> f64 {
    1.0
}

/// Parameters of a [`MultiPeriodGen`].
///
/// `periods[j]` describes main period `j` (period index `j + 1`).  The
/// preliminary period, the wrap-up period and main periods beyond the end of
/// `periods` use `default`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiPeriodGenParams {
    pub default:     GenParams,
    #[cfg_attr(feature = "serde", serde(default))]
    pub periods:     Vec<GenParams>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_unit: Option<TimeUnit>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_unit: Option<TimeUnit>,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub mult:        f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub caching:     bool,
}

impl MultiPeriodGenParams {
    pub fn new(default: GenParams, periods: Vec<GenParams>) -> Self {
        Self {
            default,
            periods,
            source_unit: None,
            target_unit: None,
            mult: 1.0,
            caching: false,
        }
    }

    /// Parameters governing period `period`.
    pub fn params_for_period(&self, period: usize) -> &GenParams {
        period
            .checked_sub(1)
            .and_then(|j| self.periods.get(j))
            .unwrap_or(&self.default)
    }

    fn scale(&self) -> f64 {
        TimeUnit::factor_opt(self.source_unit, self.target_unit) * self.mult
    }

    /// Mean of the values a built generator draws in `period`.
    ///
    /// # Note
    /// Periods without an entry in `periods` (preliminary, wrap-up, and main
    /// periods past the end of the list) fall back to `default`, exactly as
    /// [`variance_for_period`][Self::variance_for_period] and
    /// [`build`][Self::build] do.  Older parameter readers used different
    /// fallback lookups for the mean and the variance, so moments of
    /// unlisted periods can differ from what they reported.
    pub fn mean_for_period(&self, period: usize) -> ValueResult<f64> {
        Ok(self.params_for_period(period).mean()? * self.scale())
    }

    /// Variance of the values a built generator draws in `period`.
    ///
    /// # Note
    /// Same `default` fallback as [`mean_for_period`][Self::mean_for_period];
    /// see there.
    pub fn variance_for_period(&self, period: usize) -> ValueResult<f64> {
        let f = self.scale();
        Ok(self.params_for_period(period).variance()? * f * f)
    }

    /// Build a generator for `pce`, giving period `p` the child stream
    /// `stream.child(p)`.
    pub fn build(
        &self,
        pce:    Rc<PeriodChangeEvent>,
        stream: &mut RandomStream,
    ) -> ValueResult<MultiPeriodGen> {
        let gens = (0..pce.num_periods())
            .map(|p| self.params_for_period(p).build(stream.child(p as u64)))
            .collect::<ValueResult<Vec<_>>>()?;
        let mut mpg = MultiPeriodGen::new(pce, gens)?;
        mpg.set_units(self.source_unit, self.target_unit);
        mpg.set_mult(self.mult);
        mpg.set_caching(self.caching);
        Ok(mpg)
    }
}
