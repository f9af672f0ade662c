//! staffing — smallest end-to-end example for the rust_cc framework.
//!
//! One preliminary period, two main periods and a wrap-up period.  Contacts
//! arrive during the main periods at a period-dependent rate; each one is
//! served or abandons depending on its service time and the patience of its
//! type in the current period.  Counts are collected per period by a
//! `NonStationaryMeasureMatrix` and extracted after every replication.
//!
//! Usage: `staffing [scenario.json]`.  Set `RUST_LOG=debug` (or `trace`)
//! to follow the period clock.

mod arrivals;
mod scenario;


use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result, ensure};
use ndarray::Array2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cc_core::RandomStream;
use cc_kernel::{Simulator, SwitchEvent};
use cc_measure::replication::time_normalize;
use cc_measure::{
    NonStationaryMeasureMatrix, ReplicationMatrices, SumMatrix, replication_column_names,
    write_matrix_csv,
};
use cc_value::{ConstantValueGenerator, RandomValueGenerator};

use arrivals::{ArrivalProcess, MEASURES};
use scenario::{DEFAULT_SCENARIO, Scenario};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Child-stream offsets; the interarrival generator uses `0..P + 2`.
const SERVICE_STREAM_OFFSET: u64 = 1_000;
const TYPE_STREAM_OFFSET:    u64 = 2_000;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    init_logging();

    // 1. Scenario.
    let scenario = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Scenario::from_path(&path)?,
        None => Scenario::from_json(DEFAULT_SCENARIO)?,
    };
    println!("=== staffing — rust_cc contact-center core ===");
    println!(
        "Types: {}  |  Replications: {}  |  Seed: {}",
        scenario.num_types(),
        scenario.replications,
        scenario.seed
    );

    // 2. Period clock.
    let pce = scenario.periods.build().context("building the period clock")?;
    let num_main = pce.num_main_periods();
    ensure!(num_main > 0, "the scenario needs at least one main period");
    println!(
        "Periods: {} main, open {} → {}",
        num_main,
        pce.main_period_starting_time(0),
        pce.main_period_ending_time(num_main - 1)
    );
    println!();

    // 3. Generators.
    let mut root = RandomStream::new(scenario.seed);
    let interarrival = scenario.interarrival.build(Rc::clone(&pce), &mut root)?;
    let service = RandomValueGenerator::from_fn(Some(Rc::clone(&pce)), scenario.num_types(), |_, k| {
        scenario.service[k].build(root.child(SERVICE_STREAM_OFFSET + k as u64))
    })?;
    let patience = ConstantValueGenerator::new(Some(Rc::clone(&pce)), scenario.patience.clone())?;

    // 4. Per-period counts.
    let counts = NonStationaryMeasureMatrix::new(&pce, SumMatrix::new(MEASURES.len(), 1));
    let mut reps = ReplicationMatrices::new();
    let counts_idx = reps.register(Box::new(Rc::clone(&counts)));

    let arrivals = ArrivalProcess::new(interarrival, service, patience, root.child(TYPE_STREAM_OFFSET), counts);
    let opening = SwitchEvent::new(
        arrivals.clone(),
        pce.main_period_starting_time(0),
        pce.main_period_ending_time(num_main - 1),
    )?;

    // 5. Replications.
    let mut sim = Simulator::new();
    let mut results = Vec::with_capacity(scenario.replications);
    let t0 = Instant::now();
    for r in 0..scenario.replications {
        sim.init();
        pce.init(&mut sim);
        reps.init_replication();
        arrivals.init();
        if r > 0 {
            arrivals.next_substream();
        }

        pce.start(&mut sim)?;
        opening.schedule(&mut sim)?;
        sim.run();
        pce.stop(&mut sim);

        let mut values = reps.values(&pce, counts_idx, &scenario.layout)?;
        let arrived: f64 = values.row(0).iter().take(num_main).sum();
        info!(replication = r, arrived, "replication done");
        time_normalize(&pce, &mut values, &scenario.layout, None)?;
        results.push(values);
    }
    println!("Simulation complete in {:.3} s", t0.elapsed().as_secs_f64());
    println!();

    // 6. Report: per-minute rates averaged over replications.
    let mean = mean_of(&results).context("no replication results")?;
    for (name, row) in MEASURES.iter().zip(mean.rows()) {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:>9.4}")).collect();
        println!("  {name:<13}{}", cells.join(" "));
    }
    println!();
    let columns = replication_column_names(num_main, scenario.layout.aggregate_column);
    let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
    write_matrix_csv(std::io::stdout().lock(), &MEASURES, &columns, &mean)?;

    Ok(())
}

/// Element-wise mean of equally shaped matrices.
fn mean_of(values: &[Array2<f64>]) -> Option<Array2<f64>> {
    let (first, rest) = values.split_first()?;
    let mut sum = first.clone();
    for v in rest {
        sum += v;
    }
    Some(sum / values.len() as f64)
}
