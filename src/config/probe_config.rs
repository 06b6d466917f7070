//! Probe configuration derived from CLI arguments

use super::cli::ProbeArgs;
use crate::runner::PerfTestCommand;
use crate::search::{SearchSettings, StabilityThresholds, WorkloadShape};
use std::path::PathBuf;

/// Resolved configuration for a probe run
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub search: SearchSettings,
    pub thresholds: StabilityThresholds,
    pub command: PerfTestCommand,
    pub out_dir: PathBuf,
    pub component_name: String,
}

impl ProbeConfig {
    /// Build and validate the configuration. Search preconditions are
    /// checked here so a bad growth factor never reaches the engine.
    pub fn from_cli(args: &ProbeArgs, quiet: bool) -> Result<Self, String> {
        let search = SearchSettings {
            start_rate: args.start_rate,
            max_rate: args.max_rate,
            growth: args.growth,
            id_prefix: args.id_prefix.clone(),
            warmup_rate: args.warmup_rate,
        };
        search.validate()?;

        if !(args.success_ratio > 0.0 && args.success_ratio <= 1.0) {
            return Err(format!(
                "success ratio must be in (0, 1], got {}",
                args.success_ratio
            ));
        }
        if args.p95_limit_ms < 0 {
            return Err(format!("p95 limit must be >= 0, got {}", args.p95_limit_ms));
        }
        if args.duration == 0 {
            return Err("trial duration must be at least 1 second".to_string());
        }

        let command = PerfTestCommand {
            program: "java".to_string(),
            jvm_opts: args
                .java_opts
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            jar: args.jar.clone(),
            uri: args.uri.clone(),
            duration_s: args.duration,
            shape: WorkloadShape {
                producers: args.producers,
                consumers: args.consumers,
                size_bytes: args.size,
                queue: args.queue.clone(),
            },
            echo_output: !quiet,
        };

        Ok(Self {
            search,
            thresholds: StabilityThresholds {
                success_ratio: args.success_ratio,
                p95_limit_ms: args.p95_limit_ms,
            },
            command,
            out_dir: args.out_dir.clone(),
            component_name: args.component_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::config::cli::{Cli, CliCommand};

    fn probe_args(extra: &[&str]) -> ProbeArgs {
        let mut argv = vec!["capacity-bench", "probe"];
        argv.extend_from_slice(extra);
        let cli = Cli::parse_from(argv);
        match cli.command {
            CliCommand::Probe(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_valid_defaults() {
        let config = ProbeConfig::from_cli(&probe_args(&[]), false).unwrap();
        assert_eq!(config.search.start_rate, 1000);
        assert_eq!(config.thresholds.success_ratio, 0.95);
        assert_eq!(config.command.program, "java");
        assert_eq!(config.command.jvm_opts, vec!["-Xms512m", "-Xmx1g"]);
        assert!(config.command.echo_output);
    }

    #[test]
    fn test_growth_of_one_rejected() {
        let err = ProbeConfig::from_cli(&probe_args(&["--growth", "1.0"]), false).unwrap_err();
        assert!(err.contains("growth factor"));
    }

    #[test]
    fn test_bad_success_ratio_rejected() {
        assert!(ProbeConfig::from_cli(&probe_args(&["--success-ratio", "0"]), false).is_err());
        assert!(ProbeConfig::from_cli(&probe_args(&["--success-ratio", "1.2"]), false).is_err());
        assert!(ProbeConfig::from_cli(&probe_args(&["--success-ratio", "1.0"]), false).is_ok());
    }

    #[test]
    fn test_max_rate_below_start_rejected() {
        let err = ProbeConfig::from_cli(
            &probe_args(&["--start-rate", "5000", "--max-rate", "1000"]),
            false,
        )
        .unwrap_err();
        assert!(err.contains("below start rate"));
    }

    #[test]
    fn test_quiet_disables_echo() {
        let config = ProbeConfig::from_cli(&probe_args(&[]), true).unwrap();
        assert!(!config.command.echo_output);
    }
}
