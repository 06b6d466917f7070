//! Sweep command: transactional benchmark across client counts

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{SweepArgs, SweepConfig};
use crate::report::files::{append_sweep_row, ensure_sweep_header, timestamp_slug};
use crate::runner::SweepRunner;

pub fn run(args: &SweepArgs, quiet: bool) -> Result<()> {
    let default_out = PathBuf::from(format!("sweep_results_{}.csv", timestamp_slug()));
    let config = SweepConfig::from_cli(args, default_out)
        .map_err(|e| anyhow!("Configuration error: {e}"))?;

    ensure_sweep_header(&config.out)?;

    let total = config.clients.len() as u64 * config.repeats as u64;
    let pb = if quiet || config.echo_output {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} runs {msg}")
                .expect("progress template is valid")
                .progress_chars("=>-"),
        );
        pb
    };

    let runner = SweepRunner::new(
        config.command.clone(),
        config.jobs,
        config.duration_s,
        config.repeats,
        config.cooldown,
        config.echo_output,
    );
    let records = runner.run(&config.clients, |record| {
        append_sweep_row(&config.out, record)?;
        pb.set_message(format!("c={}", record.clients));
        pb.inc(1);
        Ok(())
    })?;
    pb.finish_and_clear();

    let failed = records.iter().filter(|r| r.return_code != 0).count();
    println!(
        "Wrote {} run(s) to {} ({failed} failed)",
        records.len(),
        config.out.display()
    );
    Ok(())
}
