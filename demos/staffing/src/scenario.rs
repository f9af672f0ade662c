//! Scenario file format.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use cc_measure::ReplicationLayout;
use cc_period::PeriodConfig;
use cc_value::{GenParams, MultiPeriodGenParams};

/// Embedded default: a two-period morning (08:00–10:00 and 10:00–12:00,
/// minutes since 07:00) with two contact types.
pub const DEFAULT_SCENARIO: &str = r#"{
  "seed": 42,
  "replications": 5,
  "periods": { "kind": "fixed", "period_duration": 120.0, "num_periods": 4, "starting_time": 60.0 },
  "interarrival": {
    "default": { "dist": "exponential", "rate": 1.0 },
    "periods": [
      { "dist": "exponential", "rate": 2.0 },
      { "dist": "exponential", "rate": 3.0 }
    ]
  },
  "patience": [[4.0, 8.0], [4.0, 8.0], [2.0, 6.0], [2.0, 6.0]],
  "service": [
    { "dist": "exponential", "rate": 0.25 },
    { "dist": "gamma", "shape": 2.0, "rate": 0.5, "shift": 0.5 }
  ],
  "layout": { "include_preliminary": false, "include_wrap_up": false }
}"#;

/// Everything one run of the demo needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub seed:         u64,
    pub replications: usize,
    pub periods:      PeriodConfig,
    /// Time between arrivals, per period.
    pub interarrival: MultiPeriodGenParams,
    /// `[period][type]` patience times.
    pub patience:     Vec<Vec<f64>>,
    /// Service-time distribution per contact type, identical in every
    /// period.
    pub service:      Vec<GenParams>,
    #[serde(default)]
    pub layout:       ReplicationLayout,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(text).context("parsing scenario")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn num_types(&self) -> usize {
        self.service.len()
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.replications > 0, "at least one replication is required");
        ensure!(!self.service.is_empty(), "at least one contact type is required");
        ensure!(
            self.patience.iter().all(|row| row.len() == self.num_types()),
            "every patience row needs {} entries",
            self.num_types()
        );
        Ok(())
    }
}
