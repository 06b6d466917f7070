//! Normalize command: raw benchmark results to resource-normalized metrics

use std::fs;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::config::NormalizeArgs;
use crate::normalize::{MetricsNormalizer, NormalizedRecord, TestEnvironment};
use crate::report::console::{print_db_summary, print_mq_summary};
use crate::report::files::{
    read_db_raw_csv, read_trial_summaries, timestamp_slug, write_normalized_db_csv,
    write_normalized_mq_csv,
};

pub fn run(args: &NormalizeArgs) -> Result<()> {
    if args.cpu_cores == 0 {
        return Err(anyhow!("Configuration error: cpu cores must be at least 1"));
    }
    if args.memory_gb <= 0.0 {
        return Err(anyhow!("Configuration error: memory must be positive"));
    }
    let normalizer = MetricsNormalizer::new(TestEnvironment {
        cpu_cores: args.cpu_cores,
        memory_gb: args.memory_gb,
    });

    fs::create_dir_all(&args.out_dir).with_context(|| {
        format!("failed to create output directory {}", args.out_dir.display())
    })?;
    let stamp = timestamp_slug();
    let mut combined: Vec<NormalizedRecord> = Vec::new();

    if let Some(ref path) = args.db_csv {
        let raw = read_db_raw_csv(path)
            .with_context(|| format!("failed to load transactional results {}", path.display()))?;
        let result = normalizer.normalize_db(&raw, &args.db_component);
        info!(
            accepted = result.accepted.len(),
            dropped = result.dropped,
            "normalized transactional rows"
        );

        if result.accepted.is_empty() {
            println!("No valid transactional rows in {}", path.display());
        } else {
            let out = args
                .out_dir
                .join(format!("normalized_db_{}_{stamp}.csv", args.db_component));
            write_normalized_db_csv(&out, &result.accepted)?;
            println!(
                "Saved {} normalized DB record(s): {}",
                result.accepted.len(),
                out.display()
            );
            print_db_summary(&result.accepted);
            combined.extend(result.accepted.into_iter().map(NormalizedRecord::Db));
        }
    }

    if let Some(ref path) = args.mq_summary_csv {
        let summaries = read_trial_summaries(path)
            .with_context(|| format!("failed to load trial summaries {}", path.display()))?;
        let result = normalizer.normalize_mq(&summaries, &args.mq_component);
        info!(
            accepted = result.accepted.len(),
            dropped = result.dropped,
            "normalized messaging trials"
        );

        if result.accepted.is_empty() {
            println!("No valid messaging trials in {}", path.display());
        } else {
            let out = args
                .out_dir
                .join(format!("normalized_mq_{}_{stamp}.csv", args.mq_component));
            write_normalized_mq_csv(&out, &result.accepted)?;
            println!(
                "Saved {} normalized MQ record(s): {}",
                result.accepted.len(),
                out.display()
            );
            print_mq_summary(&result.accepted);
            combined.extend(result.accepted.into_iter().map(NormalizedRecord::Mq));
        }
    }

    if combined.is_empty() {
        println!("No valid test data found; nothing normalized.");
        return Ok(());
    }

    let combined_path = args.out_dir.join(format!("normalized_all_{stamp}.json"));
    let json = serde_json::to_string_pretty(&combined)
        .context("failed to encode combined normalized metrics")?;
    fs::write(&combined_path, json + "\n")?;
    println!("Combined normalized metrics: {}", combined_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DbRawRecord;
    use crate::report::files::{append_sweep_row, ensure_sweep_header};
    use tempfile::tempdir;

    #[test]
    fn test_normalize_sweep_results_end_to_end() {
        let dir = tempdir().unwrap();
        let raw_path = dir.path().join("results.csv");
        ensure_sweep_header(&raw_path).unwrap();
        append_sweep_row(
            &raw_path,
            &DbRawRecord {
                timestamp: "2025-09-01T10:00:00".to_string(),
                clients: 8,
                jobs: 4,
                duration_s: 60,
                tps_including: Some(990.0),
                tps_excluding: Some(1000.0),
                latency_ms_avg: Some(10.0),
                tx_processed: Some(60_000),
                return_code: 0,
                error: None,
            },
        )
        .unwrap();
        // A failed row: filtered during normalization, not an error.
        append_sweep_row(
            &raw_path,
            &DbRawRecord {
                timestamp: "2025-09-01T10:02:00".to_string(),
                clients: 16,
                jobs: 4,
                duration_s: 60,
                return_code: 1,
                error: Some("boom".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let out_dir = dir.path().join("out");
        let args = NormalizeArgs {
            db_csv: Some(raw_path),
            mq_summary_csv: None,
            cpu_cores: 4,
            memory_gb: 4.0,
            out_dir: out_dir.clone(),
            db_component: "KingbaseES".to_string(),
            mq_component: "RabbitMQ".to_string(),
        };
        run(&args).unwrap();

        let outputs: Vec<_> = std::fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert!(outputs.iter().any(|n| n.starts_with("normalized_db_KingbaseES_")));
        assert!(outputs.iter().any(|n| n.starts_with("normalized_all_")));
    }
}
