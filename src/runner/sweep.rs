//! Transactional benchmark sweep runner
//!
//! Runs a caller-supplied benchmark command once per client count (and
//! repeat), parsing the summary scalars out of its combined output. A
//! failed run is recorded with its return code and truncated output; it
//! never aborts the sweep.

use std::process::Command;
use std::thread;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, warn};

use crate::normalize::DbRawRecord;
use crate::parser::SummaryScalarParser;
use crate::utils::Result;

/// Longest error text kept on a failed run record.
const ERROR_CAPTURE_LIMIT: usize = 5000;

/// Command template for the transactional benchmark.
///
/// Every occurrence of `{clients}` in the arguments is replaced with
/// the run's client count.
#[derive(Debug, Clone)]
pub struct SweepCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SweepCommand {
    fn build(&self, clients: u32) -> Command {
        let mut cmd = Command::new(&self.program);
        for arg in &self.args {
            cmd.arg(arg.replace("{clients}", &clients.to_string()));
        }
        cmd
    }
}

/// Sequential sweep over client counts with a settle delay between runs.
pub struct SweepRunner {
    command: SweepCommand,
    parser: SummaryScalarParser,
    pub jobs: u32,
    pub duration_s: u64,
    pub repeats: u32,
    /// Best-effort settle time between runs, not a correctness
    /// requirement.
    pub cooldown: Duration,
    pub echo_output: bool,
}

impl SweepRunner {
    pub fn new(
        command: SweepCommand,
        jobs: u32,
        duration_s: u64,
        repeats: u32,
        cooldown: Duration,
        echo_output: bool,
    ) -> Self {
        Self {
            command,
            parser: SummaryScalarParser::new(),
            jobs,
            duration_s,
            repeats,
            cooldown,
            echo_output,
        }
    }

    /// Run the sweep, invoking `on_record` after every run so partial
    /// results can be persisted as they arrive.
    pub fn run(
        &self,
        clients: &[u32],
        mut on_record: impl FnMut(&DbRawRecord) -> Result<()>,
    ) -> Result<Vec<DbRawRecord>> {
        let mut records = Vec::new();

        for (index, &count) in clients.iter().enumerate() {
            for round in 1..=self.repeats {
                let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
                let (return_code, output) = self.run_once(count);

                if self.echo_output {
                    println!("\n=== RUN @ {timestamp} c={count} (round {round}/{})", self.repeats);
                    println!("{output}");
                    println!("=== END RUN ===\n");
                }
                if return_code != 0 {
                    warn!(clients = count, return_code, "benchmark run failed");
                }

                let metrics = self.parser.parse(&output);
                let record = DbRawRecord {
                    timestamp,
                    clients: count,
                    jobs: self.jobs,
                    duration_s: self.duration_s,
                    tps_including: metrics.tps_including,
                    tps_excluding: metrics.tps_excluding,
                    latency_ms_avg: metrics.latency_ms_avg,
                    tx_processed: metrics.tx_processed,
                    return_code,
                    error: if return_code == 0 {
                        None
                    } else {
                        Some(truncate(&output))
                    },
                };
                on_record(&record)?;
                records.push(record);

                let last = index == clients.len() - 1 && round == self.repeats;
                if !last && !self.cooldown.is_zero() {
                    thread::sleep(self.cooldown);
                }
            }
        }
        Ok(records)
    }

    /// One run: combined stdout + stderr and the exit code. A spawn
    /// failure is folded into a failed record, mirroring a non-zero
    /// exit.
    fn run_once(&self, clients: u32) -> (i32, String) {
        let mut cmd = self.command.build(clients);
        debug!(?cmd, "running benchmark");
        match cmd.output() {
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                (output.status.code().unwrap_or(1), text)
            }
            Err(e) => (1, format!("failed to run '{}': {e}", self.command.program)),
        }
    }
}

fn truncate(output: &str) -> String {
    if output.is_empty() {
        return "unknown error".to_string();
    }
    output.chars().take(ERROR_CAPTURE_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(program: &str, args: Vec<String>) -> SweepRunner {
        SweepRunner::new(
            SweepCommand {
                program: program.to_string(),
                args,
            },
            4,
            60,
            1,
            Duration::ZERO,
            false,
        )
    }

    #[test]
    fn test_successful_run_parses_metrics() {
        let output = "number of transactions actually processed: 48231\n\
                      latency average = 9.945 ms\n\
                      tps = 804.52 (including connections establishing)\n\
                      tps = 805.19 (excluding connections establishing)";
        let runner = runner("printf", vec!["%s".to_string(), output.to_string()]);

        let records = runner.run(&[8], |_| Ok(())).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.clients, 8);
        assert_eq!(r.return_code, 0);
        assert_eq!(r.tps_excluding, Some(805.19));
        assert_eq!(r.tx_processed, Some(48231));
        assert_eq!(r.error, None);
    }

    #[test]
    fn test_clients_placeholder_substitution() {
        let runner = runner(
            "printf",
            vec![
                "tps = {clients}.0 (excluding connections establishing)".to_string(),
            ],
        );
        let records = runner.run(&[4, 16], |_| Ok(())).unwrap();
        assert_eq!(records[0].tps_excluding, Some(4.0));
        assert_eq!(records[1].tps_excluding, Some(16.0));
    }

    #[test]
    fn test_failed_run_is_recorded_not_fatal() {
        let runner = runner("false", vec![]);
        let records = runner.run(&[8, 16], |_| Ok(())).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].return_code, 1);
        assert!(records[0].error.is_some());
        assert_eq!(records[0].tps_excluding, None);
    }

    #[test]
    fn test_spawn_failure_is_recorded_not_fatal() {
        let runner = runner("/nonexistent/kbbench", vec![]);
        let records = runner.run(&[8], |_| Ok(())).unwrap();
        assert_eq!(records[0].return_code, 1);
        assert!(records[0].error.as_deref().unwrap().contains("failed to run"));
    }

    #[test]
    fn test_repeats_and_callback_order() {
        let runner = SweepRunner::new(
            SweepCommand {
                program: "true".to_string(),
                args: vec![],
            },
            4,
            60,
            2,
            Duration::ZERO,
            false,
        );
        let mut seen = Vec::new();
        let records = runner
            .run(&[4, 8], |r| {
                seen.push(r.clients);
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![4, 4, 8, 8]);
        assert_eq!(records.len(), 4);
        // `true` produces no summary scalars: empty but successful rows.
        assert!(records.iter().all(|r| r.return_code == 0));
        assert!(records.iter().all(|r| r.tps_excluding.is_none()));
    }

    #[test]
    fn test_truncate_caps_error_text() {
        let long = "x".repeat(10_000);
        assert_eq!(truncate(&long).len(), ERROR_CAPTURE_LIMIT);
        assert_eq!(truncate(""), "unknown error");
    }
}
