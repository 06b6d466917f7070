//! Configuration module

pub mod cli;
pub mod probe_config;
pub mod sweep_config;

pub use cli::{Cli, CliCommand, ExtrapolateArgs, NormalizeArgs, ProbeArgs, SweepArgs};
pub use probe_config::ProbeConfig;
pub use sweep_config::SweepConfig;
