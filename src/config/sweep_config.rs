//! Sweep configuration derived from CLI arguments

use std::path::PathBuf;
use std::time::Duration;

use super::cli::SweepArgs;
use crate::runner::SweepCommand;

/// Resolved configuration for a sweep run
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub command: SweepCommand,
    /// Client counts to probe, in order.
    pub clients: Vec<u32>,
    pub jobs: u32,
    pub duration_s: u64,
    pub repeats: u32,
    pub cooldown: Duration,
    pub echo_output: bool,
    pub out: PathBuf,
}

impl SweepConfig {
    pub fn from_cli(args: &SweepArgs, default_out: PathBuf) -> Result<Self, String> {
        let clients = expand_clients(args)?;

        if args.repeats == 0 {
            return Err("repeats must be at least 1".to_string());
        }
        if args.cooldown < 0.0 {
            return Err("cooldown must not be negative".to_string());
        }

        Ok(Self {
            command: SweepCommand {
                program: args.program.clone(),
                args: args.args.clone(),
            },
            clients,
            jobs: args.jobs,
            duration_s: args.duration,
            repeats: args.repeats,
            cooldown: Duration::from_secs_f64(args.cooldown),
            echo_output: args.print_output,
            out: args.out.clone().unwrap_or(default_out),
        })
    }
}

/// Resolve the client list: an explicit sequence wins, then a range,
/// then the single-run count.
fn expand_clients(args: &SweepArgs) -> Result<Vec<u32>, String> {
    if let Some(ref seq) = args.clients_seq {
        if seq.is_empty() {
            return Err("client sequence must not be empty".to_string());
        }
        return Ok(seq.clone());
    }
    if let (Some(start), Some(end)) = (args.clients_start, args.clients_end) {
        let step = args.clients_step.unwrap_or(1);
        if step == 0 {
            return Err("client step must be a positive integer".to_string());
        }
        if end < start {
            return Err(format!("client range end {end} is below start {start}"));
        }
        return Ok((start..=end).step_by(step as usize).collect());
    }
    Ok(vec![args.clients])
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::config::cli::{Cli, CliCommand};

    fn sweep_args(extra: &[&str]) -> SweepArgs {
        let mut argv = vec!["capacity-bench", "sweep"];
        argv.extend_from_slice(extra);
        let cli = Cli::parse_from(argv);
        match cli.command {
            CliCommand::Sweep(args) => args,
            _ => unreachable!(),
        }
    }

    fn config(extra: &[&str]) -> Result<SweepConfig, String> {
        SweepConfig::from_cli(&sweep_args(extra), PathBuf::from("results.csv"))
    }

    #[test]
    fn test_single_run_fallback() {
        let config = config(&["--clients", "12"]).unwrap();
        assert_eq!(config.clients, vec![12]);
        assert_eq!(config.out, PathBuf::from("results.csv"));
    }

    #[test]
    fn test_sequence_wins_over_range() {
        let config = config(&[
            "--clients-seq",
            "4,8",
            "--clients-start",
            "1",
            "--clients-end",
            "100",
        ])
        .unwrap();
        assert_eq!(config.clients, vec![4, 8]);
    }

    #[test]
    fn test_range_expansion() {
        let config = config(&[
            "--clients-start",
            "4",
            "--clients-end",
            "16",
            "--clients-step",
            "4",
        ])
        .unwrap();
        assert_eq!(config.clients, vec![4, 8, 12, 16]);
    }

    #[test]
    fn test_zero_step_rejected() {
        let err = config(&[
            "--clients-start",
            "4",
            "--clients-end",
            "16",
            "--clients-step",
            "0",
        ])
        .unwrap_err();
        assert!(err.contains("step"));
    }

    #[test]
    fn test_zero_repeats_rejected() {
        assert!(config(&["--repeats", "0"]).is_err());
    }
}
