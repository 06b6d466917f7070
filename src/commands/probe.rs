//! Probe command: adaptive max-stable-rate search against a broker

use std::fs;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::config::{ProbeArgs, ProbeConfig};
use crate::report::files::{
    summary_path, timeseries_path, timestamp_slug, write_summary_csv, write_timeseries_csv,
};
use crate::runner::ProcessTrialRunner;
use crate::search::{AdaptiveSearchEngine, SearchOutcome};

pub fn run(args: &ProbeArgs, quiet: bool) -> Result<()> {
    let config =
        ProbeConfig::from_cli(args, quiet).map_err(|e| anyhow!("Configuration error: {e}"))?;

    fs::create_dir_all(&config.out_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.out_dir.display()
        )
    })?;
    let stamp = timestamp_slug();
    let ts_path = timeseries_path(&config.out_dir, &config.component_name, &stamp);
    let sum_path = summary_path(&config.out_dir, &config.component_name, &stamp);

    let engine = AdaptiveSearchEngine::new(config.search.clone())?;
    let mut runner = ProcessTrialRunner::new(config.command.clone(), config.thresholds);

    info!(
        start_rate = config.search.start_rate,
        max_rate = config.search.max_rate,
        growth = config.search.growth,
        "starting adaptive search"
    );
    let report = engine.run(&mut runner)?;

    write_timeseries_csv(&ts_path, &report.trials)?;
    write_summary_csv(&sum_path, &report.trials)?;

    if !quiet {
        println!("\nTrial history:");
        print!("{}", report.history());
    }

    match report.outcome {
        SearchOutcome::Converged { max_stable_rate } => {
            println!(
                "Estimated max stable throughput: {max_stable_rate} msg/s \
                 (criteria: received/sent >= {}, p95 <= {} ms)",
                config.thresholds.success_ratio, config.thresholds.p95_limit_ms
            );
        }
        SearchOutcome::CappedAtMax { last_ok } => {
            println!(
                "Max stable throughput >= {last_ok} msg/s (reached cap {} without a failure)",
                config.search.max_rate
            );
        }
        SearchOutcome::NoStableRate => {
            eprintln!("No successful rate found; check the broker, parameters, or network.");
        }
    }
    println!("Wrote: {}\n       {}", sum_path.display(), ts_path.display());
    Ok(())
}
