//! SLO-driven capacity extrapolation
//!
//! Inverts normalized metrics against a target service-level objective
//! to recommend resource sizing. The latency projection is a linear
//! scaling assumption, an explicit approximation rather than a queueing
//! model.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::normalize::{NormalizedDbRecord, NormalizedMqRecord};
use crate::utils::{CapacityError, Result};

/// Target service-level objective, tagged by component type.
///
/// Deserializes from the boundary JSON shape, e.g.
/// `{"component_type": "DB", "target_tps": 10000, "max_latency_ms": 50}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "component_type")]
pub enum SloTarget {
    #[serde(rename = "DB")]
    Db { target_tps: f64, max_latency_ms: f64 },
    #[serde(rename = "MQ")]
    Mq {
        target_msg_per_sec: f64,
        max_p95_ms: i64,
    },
}

impl SloTarget {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| CapacityError::Slo(e.to_string()))
    }
}

/// Sizing recommendation for a transactional target
#[derive(Debug, Clone, PartialEq)]
pub struct DbRecommendation {
    pub component: String,
    pub target_tps: f64,
    pub max_latency_ms: f64,
    pub required_cpu_cores: u32,
    pub required_memory_gb: u32,
    pub estimated_latency_ms: f64,
    pub baseline_tps_per_core: f64,
    pub baseline_tps_per_gb: f64,
    pub baseline_test_tps: f64,
    pub baseline_test_latency_ms: f64,
}

/// Sizing recommendation for a messaging target
#[derive(Debug, Clone, PartialEq)]
pub struct MqRecommendation {
    pub component: String,
    pub target_msg_per_sec: f64,
    pub max_p95_ms: i64,
    pub required_cpu_cores: u32,
    pub required_memory_gb: u32,
    pub estimated_p95_ms: f64,
    pub baseline_msg_per_sec_per_core: f64,
    pub baseline_msg_per_sec_per_gb: f64,
    pub baseline_test_msg_per_sec: f64,
    pub baseline_test_p95_ms: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CapacityRecommendation {
    Db(DbRecommendation),
    Mq(MqRecommendation),
}

/// Project the resources needed to hit `target_tps` under the latency
/// constraint. Returns `None` when no baseline satisfies the SLO; that
/// is a reportable outcome, not an error.
pub fn extrapolate_db(
    records: &[NormalizedDbRecord],
    target_tps: f64,
    max_latency_ms: f64,
) -> Option<DbRecommendation> {
    let best = records
        .iter()
        .filter(|r| r.latency_ms <= max_latency_ms)
        .max_by(|a, b| cmp_f64(a.tps_per_core, b.tps_per_core))?;

    Some(DbRecommendation {
        component: best.component.clone(),
        target_tps,
        max_latency_ms,
        required_cpu_cores: ceil_units(target_tps, best.tps_per_core),
        required_memory_gb: ceil_units(target_tps, best.tps_per_gb_memory),
        estimated_latency_ms: best.latency_ms * (target_tps / best.tps),
        baseline_tps_per_core: best.tps_per_core,
        baseline_tps_per_gb: best.tps_per_gb_memory,
        baseline_test_tps: best.tps,
        baseline_test_latency_ms: best.latency_ms,
    })
}

/// Messaging analog of [`extrapolate_db`], constrained on worst p95.
pub fn extrapolate_mq(
    records: &[NormalizedMqRecord],
    target_msg_per_sec: f64,
    max_p95_ms: i64,
) -> Option<MqRecommendation> {
    let best = records
        .iter()
        .filter(|r| r.worst_p95_ms <= max_p95_ms)
        .max_by(|a, b| cmp_f64(a.msg_per_sec_per_core, b.msg_per_sec_per_core))?;

    Some(MqRecommendation {
        component: best.component.clone(),
        target_msg_per_sec,
        max_p95_ms,
        required_cpu_cores: ceil_units(target_msg_per_sec, best.msg_per_sec_per_core),
        required_memory_gb: ceil_units(target_msg_per_sec, best.msg_per_sec_per_gb_memory),
        estimated_p95_ms: best.worst_p95_ms as f64
            * (target_msg_per_sec / best.avg_received_msg_s),
        baseline_msg_per_sec_per_core: best.msg_per_sec_per_core,
        baseline_msg_per_sec_per_gb: best.msg_per_sec_per_gb_memory,
        baseline_test_msg_per_sec: best.avg_received_msg_s,
        baseline_test_p95_ms: best.worst_p95_ms,
    })
}

/// Dispatch on the target's component type.
pub fn extrapolate(
    db_records: &[NormalizedDbRecord],
    mq_records: &[NormalizedMqRecord],
    target: &SloTarget,
) -> Option<CapacityRecommendation> {
    match *target {
        SloTarget::Db {
            target_tps,
            max_latency_ms,
        } => extrapolate_db(db_records, target_tps, max_latency_ms).map(CapacityRecommendation::Db),
        SloTarget::Mq {
            target_msg_per_sec,
            max_p95_ms,
        } => {
            extrapolate_mq(mq_records, target_msg_per_sec, max_p95_ms)
                .map(CapacityRecommendation::Mq)
        }
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn ceil_units(target: f64, per_unit: f64) -> u32 {
    (target / per_unit).ceil() as u32
}
