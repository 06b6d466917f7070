//! Error types for capacity-bench

use std::io;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum CapacityError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Trial error: {0}")]
    Trial(#[from] TrialError),

    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    #[error("SLO config error: {0}")]
    Slo(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Trial-runner errors
///
/// These are hard failures of the benchmark collaborator itself and abort
/// the enclosing search run. A trial that ran but failed its stability
/// classification is a normal negative result, not an error.
#[derive(Error, Debug)]
pub enum TrialError {
    #[error("Failed to spawn benchmark command '{program}': {source}")]
    SpawnFailed { program: String, source: io::Error },

    #[error("Failed to read benchmark output: {0}")]
    OutputRead(io::Error),

    #[error("Failed to wait for benchmark process: {0}")]
    Wait(io::Error),

    #[error("Benchmark exited with {status} and produced no parsable output:\n{tail}")]
    NoParsableOutput { status: String, tail: String },
}

/// Tabular ingestion errors
#[derive(Error, Debug)]
pub enum CsvError {
    #[error("Failed to read {path}: {source}")]
    ReadFailed { path: String, source: io::Error },

    #[error("Empty CSV file: {0}")]
    Empty(String),

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { column: String, path: String },

    #[error("Row {row}: invalid value '{value}' for column '{column}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, CapacityError>;
