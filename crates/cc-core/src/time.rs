//! Simulation time units.
//!
//! Simulation time is a plain `f64` measured in whatever unit the model was
//! written in.  Distributions are often parameterized in a different unit
//! (mean talk time in minutes, clock in seconds), so generators carry an
//! optional `source → target` conversion applied to every draw.

use std::fmt;
use std::str::FromStr;

use crate::CcError;

/// A unit of simulated time.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TimeUnit {
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
}

impl TimeUnit {
    /// Length of one unit, in seconds.
    pub const fn seconds(self) -> f64 {
        match self {
            TimeUnit::Nanosecond  => 1e-9,
            TimeUnit::Microsecond => 1e-6,
            TimeUnit::Millisecond => 1e-3,
            TimeUnit::Second      => 1.0,
            TimeUnit::Minute      => 60.0,
            TimeUnit::Hour        => 3_600.0,
            TimeUnit::Day         => 86_400.0,
            TimeUnit::Week        => 604_800.0,
        }
    }

    /// Multiplicative factor turning a value in `from` into a value in `to`.
    #[inline]
    pub fn factor(from: TimeUnit, to: TimeUnit) -> f64 {
        if from == to {
            1.0
        } else {
            from.seconds() / to.seconds()
        }
    }

    /// [`factor`][Self::factor] when both units are known, 1 otherwise.
    #[inline]
    pub fn factor_opt(from: Option<TimeUnit>, to: Option<TimeUnit>) -> f64 {
        match (from, to) {
            (Some(from), Some(to)) => Self::factor(from, to),
            _ => 1.0,
        }
    }

    /// Convert `value` expressed in `from` into `to`.
    #[inline]
    pub fn convert(value: f64, from: TimeUnit, to: TimeUnit) -> f64 {
        if from == to {
            value
        } else {
            value * Self::factor(from, to)
        }
    }

    /// Short symbol used in reports (`"s"`, `"min"`, …).
    pub const fn symbol(self) -> &'static str {
        match self {
            TimeUnit::Nanosecond  => "ns",
            TimeUnit::Microsecond => "us",
            TimeUnit::Millisecond => "ms",
            TimeUnit::Second      => "s",
            TimeUnit::Minute      => "min",
            TimeUnit::Hour        => "h",
            TimeUnit::Day         => "d",
            TimeUnit::Week        => "wk",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for TimeUnit {
    type Err = CcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = match s.trim().to_ascii_lowercase().as_str() {
            "ns" | "nanosecond" | "nanoseconds"   => TimeUnit::Nanosecond,
            "us" | "microsecond" | "microseconds" => TimeUnit::Microsecond,
            "ms" | "millisecond" | "milliseconds" => TimeUnit::Millisecond,
            "s" | "sec" | "second" | "seconds"    => TimeUnit::Second,
            "min" | "minute" | "minutes"          => TimeUnit::Minute,
            "h" | "hr" | "hour" | "hours"         => TimeUnit::Hour,
            "d" | "day" | "days"                  => TimeUnit::Day,
            "wk" | "week" | "weeks"               => TimeUnit::Week,
            _ => return Err(CcError::UnknownTimeUnit(s.to_string())),
        };
        Ok(unit)
    }
}
