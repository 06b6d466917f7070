//! Resource-normalized capacity metrics

pub mod normalizer;
pub mod record;

pub use normalizer::{MetricsNormalizer, Normalized, TestEnvironment};
pub use record::{DbRawRecord, NormalizedDbRecord, NormalizedMqRecord, NormalizedRecord};
