//! Extrapolate command: SLO inversion over normalized metrics

use std::fs;

use anyhow::{anyhow, Context, Result};
use tracing::warn;

use crate::config::ExtrapolateArgs;
use crate::extrapolate::{extrapolate, CapacityRecommendation, SloTarget};
use crate::report::console::print_recommendation;
use crate::report::files::{
    read_normalized_db_csv, read_normalized_mq_csv, timestamp_slug, write_recommendation_csv,
};

pub fn run(args: &ExtrapolateArgs) -> Result<()> {
    let targets = resolve_targets(args)?;

    let db_records = match args.db_normalized_csv {
        Some(ref path) => read_normalized_db_csv(path)
            .with_context(|| format!("failed to load normalized DB metrics {}", path.display()))?,
        None => Vec::new(),
    };
    let mq_records = match args.mq_normalized_csv {
        Some(ref path) => read_normalized_mq_csv(path)
            .with_context(|| format!("failed to load normalized MQ metrics {}", path.display()))?,
        None => Vec::new(),
    };

    fs::create_dir_all(&args.out_dir).with_context(|| {
        format!("failed to create output directory {}", args.out_dir.display())
    })?;
    let stamp = timestamp_slug();

    for target in &targets {
        match target {
            SloTarget::Db { .. } if db_records.is_empty() => {
                warn!("no normalized DB records loaded; pass --db-normalized-csv");
            }
            SloTarget::Mq { .. } if mq_records.is_empty() => {
                warn!("no normalized MQ records loaded; pass --mq-normalized-csv");
            }
            _ => {}
        }

        match extrapolate(&db_records, &mq_records, target) {
            Some(rec) => {
                let suffix = match rec {
                    CapacityRecommendation::Db(_) => "db",
                    CapacityRecommendation::Mq(_) => "mq",
                };
                let path = args
                    .out_dir
                    .join(format!("capacity_recommendation_{suffix}_{stamp}.csv"));
                write_recommendation_csv(&path, &rec)?;
                print_recommendation(&rec);
                println!("Saved: {}", path.display());
            }
            None => println!("No baseline satisfies the SLO: {}", describe(target)),
        }
    }
    Ok(())
}

/// Resolve SLO targets: a JSON file wins, otherwise per-metric flags.
/// Both a DB and an MQ target may be given in one invocation.
fn resolve_targets(args: &ExtrapolateArgs) -> Result<Vec<SloTarget>> {
    if let Some(ref path) = args.slo_json {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read SLO config {}", path.display()))?;
        return Ok(vec![SloTarget::from_json(&text)?]);
    }

    let mut targets = Vec::new();
    if let Some(target_tps) = args.target_tps {
        targets.push(SloTarget::Db {
            target_tps,
            max_latency_ms: args.max_latency_ms,
        });
    }
    if let Some(target_msg_per_sec) = args.target_msg_per_sec {
        targets.push(SloTarget::Mq {
            target_msg_per_sec,
            max_p95_ms: args.max_p95_ms,
        });
    }
    if targets.is_empty() {
        return Err(anyhow!(
            "no SLO target given; pass --slo-json, --target-tps, or --target-msg-per-sec"
        ));
    }
    Ok(targets)
}

fn describe(target: &SloTarget) -> String {
    match *target {
        SloTarget::Db {
            target_tps,
            max_latency_ms,
        } => format!("DB target {target_tps} tps, latency <= {max_latency_ms} ms"),
        SloTarget::Mq {
            target_msg_per_sec,
            max_p95_ms,
        } => format!("MQ target {target_msg_per_sec} msg/s, p95 <= {max_p95_ms} ms"),
    }
}
