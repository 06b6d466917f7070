//! Resource normalization
//!
//! Converts raw per-trial measurements into resource-unit-independent
//! metrics against a declared test environment. The fixed constants
//! below are documented heuristics for order-of-magnitude estimates,
//! not calibrated physical models.

use super::record::{DbRawRecord, NormalizedDbRecord, NormalizedMqRecord};
use crate::search::TrialSummary;

/// Fraction of declared memory modeled as throughput-proportional
/// working set.
const MEMORY_WORKING_SET_FRACTION: f64 = 0.3;
/// Amortization window for the per-transaction working-set estimate.
const WORKING_SET_WINDOW_SECS: f64 = 60.0;
/// Assumed peak transactional throughput of one core.
const DB_PEAK_TPS_PER_CORE: f64 = 500.0;
/// Assumed peak message throughput of one core.
const MQ_PEAK_MSG_PER_SEC_PER_CORE: f64 = 10_000.0;
/// Per-message framing/queue overhead on top of the payload size.
const MESSAGE_OVERHEAD_FACTOR: f64 = 1.5;

/// Declared resources of the environment the benchmark ran on
#[derive(Debug, Clone, Copy)]
pub struct TestEnvironment {
    pub cpu_cores: u32,
    pub memory_gb: f64,
}

impl TestEnvironment {
    pub fn memory_bytes(&self) -> f64 {
        self.memory_gb * 1024.0 * 1024.0 * 1024.0
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self {
            cpu_cores: 4,
            memory_gb: 4.0,
        }
    }
}

/// Result of a validate-then-filter normalization pass
#[derive(Debug)]
pub struct Normalized<T> {
    pub accepted: Vec<T>,
    /// Rows excluded for failed runs or missing/non-positive throughput.
    pub dropped: usize,
}

/// Maps raw records to normalized metrics. Pure per-row functions of
/// the input and the environment descriptor.
#[derive(Debug, Clone)]
pub struct MetricsNormalizer {
    env: TestEnvironment,
}

impl MetricsNormalizer {
    pub fn new(env: TestEnvironment) -> Self {
        Self { env }
    }

    pub fn environment(&self) -> &TestEnvironment {
        &self.env
    }

    /// Normalize transactional rows. Rows with a non-zero return code,
    /// a missing excluding-checkpoint TPS, or non-positive throughput
    /// are dropped, not zeroed.
    pub fn normalize_db(
        &self,
        rows: &[DbRawRecord],
        component: &str,
    ) -> Normalized<NormalizedDbRecord> {
        let mut accepted = Vec::new();
        let mut dropped = 0;
        for row in rows {
            match self.normalize_db_row(row, component) {
                Some(record) => accepted.push(record),
                None => dropped += 1,
            }
        }
        Normalized { accepted, dropped }
    }

    fn normalize_db_row(&self, row: &DbRawRecord, component: &str) -> Option<NormalizedDbRecord> {
        if row.return_code != 0 {
            return None;
        }
        let tps = row.tps_excluding?;
        if tps <= 0.0 {
            return None;
        }

        let cores = self.env.cpu_cores as f64;
        let latency_ms = row.latency_ms_avg.unwrap_or(0.0);

        let memory_per_tx_bytes =
            (self.env.memory_bytes() * MEMORY_WORKING_SET_FRACTION) / (tps * WORKING_SET_WINDOW_SECS);
        let cpu_utilization_pct = (100.0 * tps / (cores * DB_PEAK_TPS_PER_CORE)).min(100.0);

        Some(NormalizedDbRecord {
            component: component.to_string(),
            timestamp: row.timestamp.clone(),
            clients: row.clients,
            jobs: row.jobs,
            duration_s: row.duration_s,
            tps,
            latency_ms,
            tx_processed: row.tx_processed.unwrap_or(0),
            tps_per_core: tps / cores,
            // Kept alongside the per-core throughput even though average
            // latency does not scale with cores.
            latency_ms_per_core: latency_ms,
            tps_per_client: per_unit(tps, row.clients as f64),
            tps_per_job: per_unit(tps, row.jobs as f64),
            tps_per_gb_memory: tps / self.env.memory_gb,
            latency_per_tx_ms: latency_ms,
            memory_per_tx_bytes,
            cpu_utilization_pct,
            test_cpu_cores: self.env.cpu_cores,
            test_memory_gb: self.env.memory_gb,
        })
    }

    /// Normalize messaging trial summaries. Unstable trials and rows
    /// with non-positive received throughput are dropped.
    pub fn normalize_mq(
        &self,
        rows: &[TrialSummary],
        component: &str,
    ) -> Normalized<NormalizedMqRecord> {
        let mut accepted = Vec::new();
        let mut dropped = 0;
        for row in rows {
            match self.normalize_mq_row(row, component) {
                Some(record) => accepted.push(record),
                None => dropped += 1,
            }
        }
        Normalized { accepted, dropped }
    }

    fn normalize_mq_row(&self, row: &TrialSummary, component: &str) -> Option<NormalizedMqRecord> {
        if !row.success || row.avg_received_msg_s <= 0.0 {
            return None;
        }

        let cores = self.env.cpu_cores as f64;
        let received = row.avg_received_msg_s;
        let size_bytes = row.size_bytes as f64;

        let loss_ratio = if row.avg_sent_msg_s > 0.0 {
            1.0 - received / row.avg_sent_msg_s
        } else {
            0.0
        };
        let cpu_utilization_pct =
            (100.0 * received / (cores * MQ_PEAK_MSG_PER_SEC_PER_CORE)).min(100.0);

        Some(NormalizedMqRecord {
            component: component.to_string(),
            run_id: row.run_id.clone(),
            target_rate_msg_s: row.target_rate_msg_s,
            duration_s: row.duration_s,
            avg_sent_msg_s: row.avg_sent_msg_s,
            avg_received_msg_s: received,
            worst_p95_ms: row.worst_p95_ms,
            producers: row.producers,
            consumers: row.consumers,
            size_bytes: row.size_bytes,
            msg_per_sec_per_core: received / cores,
            msg_per_sec_per_producer: per_unit(received, row.producers as f64),
            msg_per_sec_per_consumer: per_unit(received, row.consumers as f64),
            msg_per_sec_per_gb_memory: received / self.env.memory_gb,
            msg_per_sec_per_kb: per_unit(received, size_bytes / 1024.0),
            latency_per_msg_ms: row.worst_p95_ms as f64,
            memory_per_msg_bytes: size_bytes * MESSAGE_OVERHEAD_FACTOR,
            throughput_mbps: received * size_bytes / (1024.0 * 1024.0),
            cpu_utilization_pct,
            loss_ratio,
            test_cpu_cores: self.env.cpu_cores,
            test_memory_gb: self.env.memory_gb,
        })
    }
}

/// Per-unit ratio with a zero denominator reported as 0.
fn per_unit(value: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        value / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_row(tps: f64) -> DbRawRecord {
        DbRawRecord {
            timestamp: "2025-09-01T10:00:00".to_string(),
            clients: 8,
            jobs: 4,
            duration_s: 60,
            tps_including: Some(tps * 0.99),
            tps_excluding: Some(tps),
            latency_ms_avg: Some(9.9),
            tx_processed: Some(60_000),
            return_code: 0,
            error: None,
        }
    }

    fn mq_row(sent: f64, received: f64) -> TrialSummary {
        TrialSummary {
            run_id: "auto-r1000".to_string(),
            target_rate_msg_s: 1000,
            avg_sent_msg_s: sent,
            avg_received_msg_s: received,
            worst_p95_ms: 120,
            success: true,
            note: String::new(),
            duration_s: 15,
            producers: 4,
            consumers: 2,
            size_bytes: 1024,
            queue: "perf_queue".to_string(),
        }
    }

    #[test]
    fn test_db_per_core_and_per_gb() {
        let normalizer = MetricsNormalizer::new(TestEnvironment {
            cpu_cores: 4,
            memory_gb: 4.0,
        });
        let result = normalizer.normalize_db(&[db_row(1000.0)], "KingbaseES");
        assert_eq!(result.dropped, 0);
        let record = &result.accepted[0];
        assert_eq!(record.tps_per_core, 250.0);
        assert_eq!(record.tps_per_gb_memory, 250.0);
        assert_eq!(record.tps_per_client, 125.0);
        assert_eq!(record.tps_per_job, 250.0);
        // 4 GB * 0.3 working set over 1000 tps * 60 s.
        let expected_mem = 4.0 * 1024.0 * 1024.0 * 1024.0 * 0.3 / 60_000.0;
        assert!((record.memory_per_tx_bytes - expected_mem).abs() < 1e-9);
        // 1000 tps against a 2000 tps heuristic peak.
        assert_eq!(record.cpu_utilization_pct, 50.0);
    }

    #[test]
    fn test_db_zero_denominators() {
        let normalizer = MetricsNormalizer::new(TestEnvironment::default());
        let mut row = db_row(1000.0);
        row.clients = 0;
        row.jobs = 0;
        let result = normalizer.normalize_db(&[row], "KingbaseES");
        let record = &result.accepted[0];
        assert_eq!(record.tps_per_client, 0.0);
        assert_eq!(record.tps_per_job, 0.0);
    }

    #[test]
    fn test_db_filters_failed_and_empty_rows() {
        let normalizer = MetricsNormalizer::new(TestEnvironment::default());

        let mut failed = db_row(1000.0);
        failed.return_code = 1;
        let mut missing = db_row(1000.0);
        missing.tps_excluding = None;
        let mut zero = db_row(1000.0);
        zero.tps_excluding = Some(0.0);

        let result = normalizer.normalize_db(&[failed, missing, zero, db_row(500.0)], "X");
        assert_eq!(result.accepted.len(), 1);
        assert_eq!(result.dropped, 3);
        assert_eq!(result.accepted[0].tps, 500.0);
    }

    #[test]
    fn test_db_cpu_utilization_is_capped() {
        let normalizer = MetricsNormalizer::new(TestEnvironment {
            cpu_cores: 1,
            memory_gb: 1.0,
        });
        let result = normalizer.normalize_db(&[db_row(10_000.0)], "X");
        assert_eq!(result.accepted[0].cpu_utilization_pct, 100.0);
    }

    #[test]
    fn test_mq_loss_ratio() {
        let normalizer = MetricsNormalizer::new(TestEnvironment::default());
        let result = normalizer.normalize_mq(&[mq_row(1000.0, 950.0)], "RabbitMQ");
        let record = &result.accepted[0];
        assert!((record.loss_ratio - 0.05).abs() < 1e-12);
        assert_eq!(record.msg_per_sec_per_core, 237.5);
        assert_eq!(record.msg_per_sec_per_producer, 237.5);
        assert_eq!(record.msg_per_sec_per_consumer, 475.0);
        assert_eq!(record.msg_per_sec_per_kb, 950.0);
        assert_eq!(record.memory_per_msg_bytes, 1536.0);
        assert!((record.throughput_mbps - 950.0 * 1024.0 / (1024.0 * 1024.0)).abs() < 1e-12);
    }

    #[test]
    fn test_mq_filters_unstable_and_zero_rows() {
        let normalizer = MetricsNormalizer::new(TestEnvironment::default());

        let mut unstable = mq_row(1000.0, 900.0);
        unstable.success = false;
        unstable.note = "ratio_below_0.95".to_string();
        let zero = mq_row(1000.0, 0.0);

        let result = normalizer.normalize_mq(&[unstable, zero, mq_row(1000.0, 990.0)], "RabbitMQ");
        assert_eq!(result.accepted.len(), 1);
        assert_eq!(result.dropped, 2);
    }

    #[test]
    fn test_mq_zero_size_message() {
        let normalizer = MetricsNormalizer::new(TestEnvironment::default());
        let mut row = mq_row(1000.0, 1000.0);
        row.size_bytes = 0;
        let result = normalizer.normalize_mq(&[row], "RabbitMQ");
        let record = &result.accepted[0];
        assert_eq!(record.msg_per_sec_per_kb, 0.0);
        assert_eq!(record.memory_per_msg_bytes, 0.0);
        assert_eq!(record.throughput_mbps, 0.0);
    }
}
