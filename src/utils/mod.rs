//! Shared utilities

pub mod error;

pub use error::{CapacityError, CsvError, Result, TrialError};
