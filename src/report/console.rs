//! Console summaries for normalized metrics

use crate::extrapolate::{CapacityRecommendation, DbRecommendation, MqRecommendation};
use crate::normalize::{NormalizedDbRecord, NormalizedMqRecord};

/// Print the statistics block for normalized transactional records.
pub fn print_db_summary(records: &[NormalizedDbRecord]) {
    if records.is_empty() {
        return;
    }
    let component = &records[0].component;
    println!("\n=== {component} (DB) normalized metrics ===");

    print_stat_line("TPS per core", &collect(records, |r| r.tps_per_core), "");
    print_stat_line(
        "TPS per GB memory",
        &collect(records, |r| r.tps_per_gb_memory),
        "",
    );
    print_stat_line(
        "Latency per tx",
        &collect(records, |r| r.latency_per_tx_ms),
        " ms",
    );
    print_stat_line(
        "CPU utilization",
        &collect(records, |r| r.cpu_utilization_pct),
        " %",
    );

    if let Some(best) = records
        .iter()
        .max_by(|a, b| a.tps_per_core.total_cmp(&b.tps_per_core))
    {
        println!(
            "Best baseline: {:.2} tps/core (tps={:.2}, clients={})",
            best.tps_per_core, best.tps, best.clients
        );
    }
}

/// Print the statistics block for normalized messaging records.
pub fn print_mq_summary(records: &[NormalizedMqRecord]) {
    if records.is_empty() {
        return;
    }
    let component = &records[0].component;
    println!("\n=== {component} (MQ) normalized metrics ===");

    print_stat_line(
        "msg/s per core",
        &collect(records, |r| r.msg_per_sec_per_core),
        "",
    );
    print_stat_line(
        "msg/s per GB memory",
        &collect(records, |r| r.msg_per_sec_per_gb_memory),
        "",
    );
    print_stat_line(
        "Worst p95",
        &collect(records, |r| r.worst_p95_ms as f64),
        " ms",
    );
    print_stat_line(
        "Throughput",
        &collect(records, |r| r.throughput_mbps),
        " MB/s",
    );
    println!(
        "Loss ratio: avg {:.4}",
        mean(&collect(records, |r| r.loss_ratio))
    );

    if let Some(best) = records
        .iter()
        .max_by(|a, b| a.msg_per_sec_per_core.total_cmp(&b.msg_per_sec_per_core))
    {
        println!(
            "Best baseline: {:.2} msg/s/core (msg/s={:.2})",
            best.msg_per_sec_per_core, best.avg_received_msg_s
        );
    }
}

/// Print one capacity recommendation.
pub fn print_recommendation(rec: &CapacityRecommendation) {
    match rec {
        CapacityRecommendation::Db(r) => print_db_recommendation(r),
        CapacityRecommendation::Mq(r) => print_mq_recommendation(r),
    }
}

fn print_db_recommendation(r: &DbRecommendation) {
    println!("\n=== Capacity recommendation: {} ===", r.component);
    println!(
        "Target: {} tps, latency <= {} ms",
        r.target_tps, r.max_latency_ms
    );
    println!("Required CPU cores: {}", r.required_cpu_cores);
    println!("Required memory:    {} GB", r.required_memory_gb);
    println!("Estimated latency:  {:.2} ms (linear scaling)", r.estimated_latency_ms);
    println!(
        "Baseline: {:.2} tps/core, {:.2} tps/GB (test tps={}, latency={} ms)",
        r.baseline_tps_per_core,
        r.baseline_tps_per_gb,
        r.baseline_test_tps,
        r.baseline_test_latency_ms
    );
}

fn print_mq_recommendation(r: &MqRecommendation) {
    println!("\n=== Capacity recommendation: {} ===", r.component);
    println!(
        "Target: {} msg/s, p95 <= {} ms",
        r.target_msg_per_sec, r.max_p95_ms
    );
    println!("Required CPU cores: {}", r.required_cpu_cores);
    println!("Required memory:    {} GB", r.required_memory_gb);
    println!("Estimated p95:      {:.2} ms (linear scaling)", r.estimated_p95_ms);
    println!(
        "Baseline: {:.2} msg/s/core, {:.2} msg/s/GB (test msg/s={}, p95={} ms)",
        r.baseline_msg_per_sec_per_core,
        r.baseline_msg_per_sec_per_gb,
        r.baseline_test_msg_per_sec,
        r.baseline_test_p95_ms
    );
}

fn collect<T>(records: &[T], f: impl Fn(&T) -> f64) -> Vec<f64> {
    records.iter().map(f).collect()
}

fn print_stat_line(label: &str, values: &[f64], unit: &str) {
    println!(
        "{label}: avg {:.2}{unit}  max {:.2}{unit}  min {:.2}{unit}  median {:.2}{unit}",
        mean(values),
        fold_max(values),
        fold_min(values),
        median(values),
    );
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn fold_max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn fold_min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}
