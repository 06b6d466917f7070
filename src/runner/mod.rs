//! Benchmark process collaborators

pub mod perftest;
pub mod sweep;

pub use perftest::{PerfTestCommand, ProcessTrialRunner};
pub use sweep::{SweepCommand, SweepRunner};
