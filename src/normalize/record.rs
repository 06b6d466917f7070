//! Raw and normalized metric records

use serde::Serialize;

/// One raw row of transactional benchmark output
#[derive(Debug, Clone, Default)]
pub struct DbRawRecord {
    pub timestamp: String,
    pub clients: u32,
    pub jobs: u32,
    pub duration_s: u64,
    pub tps_including: Option<f64>,
    pub tps_excluding: Option<f64>,
    pub latency_ms_avg: Option<f64>,
    pub tx_processed: Option<u64>,
    pub return_code: i32,
    pub error: Option<String>,
}

/// Resource-normalized transactional metrics
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedDbRecord {
    pub component: String,
    pub timestamp: String,
    pub clients: u32,
    pub jobs: u32,
    pub duration_s: u64,

    // Raw figures the normalization started from.
    pub tps: f64,
    pub latency_ms: f64,
    pub tx_processed: u64,

    // Per-core and per-resource metrics.
    pub tps_per_core: f64,
    pub latency_ms_per_core: f64,
    pub tps_per_client: f64,
    pub tps_per_job: f64,
    pub tps_per_gb_memory: f64,

    // Per-transaction overheads.
    pub latency_per_tx_ms: f64,
    pub memory_per_tx_bytes: f64,

    pub cpu_utilization_pct: f64,

    // Declared test environment.
    pub test_cpu_cores: u32,
    pub test_memory_gb: f64,
}

/// Resource-normalized messaging metrics
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedMqRecord {
    pub component: String,
    pub run_id: String,
    pub target_rate_msg_s: u64,
    pub duration_s: u64,

    pub avg_sent_msg_s: f64,
    pub avg_received_msg_s: f64,
    pub worst_p95_ms: i64,
    pub producers: u32,
    pub consumers: u32,
    pub size_bytes: u64,

    pub msg_per_sec_per_core: f64,
    pub msg_per_sec_per_producer: f64,
    pub msg_per_sec_per_consumer: f64,
    pub msg_per_sec_per_gb_memory: f64,
    pub msg_per_sec_per_kb: f64,

    pub latency_per_msg_ms: f64,
    pub memory_per_msg_bytes: f64,
    pub throughput_mbps: f64,

    pub cpu_utilization_pct: f64,
    /// 1 - received/sent. An all-zero row reports zero loss, not
    /// undefined; that is intentional.
    pub loss_ratio: f64,

    pub test_cpu_cores: u32,
    pub test_memory_gb: f64,
}

/// A normalized record tagged by component type, for combined export.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "component_type")]
pub enum NormalizedRecord {
    #[serde(rename = "DB")]
    Db(NormalizedDbRecord),
    #[serde(rename = "MQ")]
    Mq(NormalizedMqRecord),
}
