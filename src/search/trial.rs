//! Trial data model
//!
//! A trial is one probe of the system under test at a fixed target rate.
//! Trials are immutable after construction; the stability verdict is
//! derived from the samples, never set independently.

use super::stability::{StabilityThresholds, TrialStats};

/// Sentinel for "no valid latency observation".
pub const LATENCY_UNKNOWN_MS: i64 = -1;

/// One per-second sample parsed from benchmark output
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesSample {
    pub time_s: f64,
    pub sent_rate: f64,
    pub received_rate: f64,
    pub p50_ms: i64,
    pub p95_ms: i64,
    pub p99_ms: i64,
}

/// Workload parameters a trial ran with
#[derive(Debug, Clone)]
pub struct WorkloadShape {
    pub producers: u32,
    pub consumers: u32,
    pub size_bytes: u64,
    pub queue: String,
}

/// One completed probe at a fixed target rate
#[derive(Debug, Clone)]
pub struct Trial {
    pub run_id: String,
    pub target_rate: u64,
    pub samples: Vec<TimeSeriesSample>,
    pub avg_sent: f64,
    pub avg_received: f64,
    pub worst_p95: i64,
    pub success: bool,
    pub reason_codes: Vec<String>,
    pub duration_s: u64,
    pub producers: u32,
    pub consumers: u32,
    pub size_bytes: u64,
    pub queue: String,
}

impl Trial {
    /// Build a trial from parsed samples, deriving the aggregates and the
    /// stability verdict. `success` is true exactly when `reason_codes`
    /// is empty.
    pub fn from_samples(
        run_id: String,
        target_rate: u64,
        samples: Vec<TimeSeriesSample>,
        duration_s: u64,
        shape: WorkloadShape,
        thresholds: &StabilityThresholds,
    ) -> Self {
        let stats = TrialStats::from_samples(&samples);
        let verdict = thresholds.classify(&stats);

        Self {
            run_id,
            target_rate,
            samples,
            avg_sent: stats.avg_sent,
            avg_received: stats.avg_received,
            worst_p95: stats.worst_p95,
            success: verdict.stable,
            reason_codes: verdict.reasons,
            duration_s,
            producers: shape.producers,
            consumers: shape.consumers,
            size_bytes: shape.size_bytes,
            queue: shape.queue,
        }
    }

    /// Semicolon-joined reason codes, empty for a stable trial.
    pub fn note(&self) -> String {
        self.reason_codes.join(";")
    }

    /// Summary row for CSV emission and normalization.
    pub fn summary(&self) -> TrialSummary {
        TrialSummary {
            run_id: self.run_id.clone(),
            target_rate_msg_s: self.target_rate,
            avg_sent_msg_s: self.avg_sent,
            avg_received_msg_s: self.avg_received,
            worst_p95_ms: self.worst_p95,
            success: self.success,
            note: self.note(),
            duration_s: self.duration_s,
            producers: self.producers,
            consumers: self.consumers,
            size_bytes: self.size_bytes,
            queue: self.queue.clone(),
        }
    }
}

/// Per-trial summary record, the unit the normalizer consumes
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSummary {
    pub run_id: String,
    pub target_rate_msg_s: u64,
    pub avg_sent_msg_s: f64,
    pub avg_received_msg_s: f64,
    pub worst_p95_ms: i64,
    pub success: bool,
    pub note: String,
    pub duration_s: u64,
    pub producers: u32,
    pub consumers: u32,
    pub size_bytes: u64,
    pub queue: String,
}
