//! Adaptive throughput search: trials, stability classification, and the
//! coarse/refine search engine.

pub mod engine;
pub mod stability;
pub mod trial;

pub use engine::{AdaptiveSearchEngine, SearchOutcome, SearchReport, SearchSettings, TrialRunner};
pub use stability::{StabilityThresholds, StabilityVerdict, TrialStats};
pub use trial::{TimeSeriesSample, Trial, TrialSummary, WorkloadShape, LATENCY_UNKNOWN_MS};
