//! capacity-bench - capacity modeling benchmark harness
//!
//! Probes the maximum stable throughput of a system under test, then
//! normalizes and extrapolates the results for capacity planning.

use anyhow::Result;
use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use capacity_bench::commands;
use capacity_bench::config::{Cli, CliCommand};

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match &cli.command {
        CliCommand::Probe(args) => commands::probe::run(args, cli.quiet),
        CliCommand::Sweep(args) => commands::sweep::run(args, cli.quiet),
        CliCommand::Normalize(args) => commands::normalize::run(args),
        CliCommand::Extrapolate(args) => commands::extrapolate::run(args),
    }
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
