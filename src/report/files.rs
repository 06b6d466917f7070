//! Tabular file schemas and output naming
//!
//! One writer/reader pair per boundary schema. Derived normalized
//! fields are rounded at write time (two decimals, four for the loss
//! ratio); in-memory records keep full precision.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use super::csv::{format_row, CsvTable};
use crate::extrapolate::{CapacityRecommendation, DbRecommendation, MqRecommendation};
use crate::normalize::{DbRawRecord, NormalizedDbRecord, NormalizedMqRecord};
use crate::search::{Trial, TrialSummary};
use crate::utils::{CsvError, Result};

/// Timestamp slug used in output filenames.
pub fn timestamp_slug() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// `{component}_perftest_timeseries_{stamp}.csv` under `out_dir`.
pub fn timeseries_path(out_dir: &Path, component: &str, stamp: &str) -> PathBuf {
    out_dir.join(format!("{component}_perftest_timeseries_{stamp}.csv"))
}

/// `{component}_perftest_summary_{stamp}.csv` under `out_dir`.
pub fn summary_path(out_dir: &Path, component: &str, stamp: &str) -> PathBuf {
    out_dir.join(format!("{component}_perftest_summary_{stamp}.csv"))
}

// ---- time-series records ----

pub fn write_timeseries_csv(path: &Path, trials: &[Trial]) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "run_id,target_rate_msg_s,time_s,sent_msg_s,received_msg_s,p50_ms,p95_ms,p99_ms"
    )?;
    for trial in trials {
        for s in &trial.samples {
            writeln!(
                file,
                "{}",
                format_row(&[
                    trial.run_id.clone(),
                    trial.target_rate.to_string(),
                    s.time_s.to_string(),
                    format!("{:.0}", s.sent_rate),
                    format!("{:.0}", s.received_rate),
                    s.p50_ms.to_string(),
                    s.p95_ms.to_string(),
                    s.p99_ms.to_string(),
                ])
            )?;
        }
    }
    Ok(())
}

// ---- trial summary records ----

pub fn write_summary_csv(path: &Path, trials: &[Trial]) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "run_id,target_rate_msg_s,avg_sent_msg_s,avg_received_msg_s,worst_p95_ms,success,note,duration_s,producers,consumers,size_bytes,queue"
    )?;
    for trial in trials {
        let s = trial.summary();
        writeln!(
            file,
            "{}",
            format_row(&[
                s.run_id,
                s.target_rate_msg_s.to_string(),
                format!("{:.0}", s.avg_sent_msg_s),
                format!("{:.0}", s.avg_received_msg_s),
                s.worst_p95_ms.to_string(),
                s.success.to_string(),
                s.note,
                s.duration_s.to_string(),
                s.producers.to_string(),
                s.consumers.to_string(),
                s.size_bytes.to_string(),
                s.queue,
            ])
        )?;
    }
    Ok(())
}

pub fn read_trial_summaries(path: &Path) -> Result<Vec<TrialSummary>> {
    let table = CsvTable::read_path(path)?;
    let run_id = table.column("run_id")?;
    let target = table.column("target_rate_msg_s")?;
    let sent = table.column("avg_sent_msg_s")?;
    let received = table.column("avg_received_msg_s")?;
    let p95 = table.column("worst_p95_ms")?;
    let success = table.column("success")?;
    let note = table.column("note")?;
    let duration = table.column("duration_s")?;
    let producers = table.column("producers")?;
    let consumers = table.column("consumers")?;
    let size = table.column("size_bytes")?;
    let queue = table.column("queue")?;

    let mut rows = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        rows.push(TrialSummary {
            run_id: table.get(i, run_id).to_string(),
            target_rate_msg_s: parse_or_default(&table, i, target, "target_rate_msg_s")?,
            avg_sent_msg_s: parse_or_default(&table, i, sent, "avg_sent_msg_s")?,
            avg_received_msg_s: parse_or_default(&table, i, received, "avg_received_msg_s")?,
            worst_p95_ms: parse_or_default(&table, i, p95, "worst_p95_ms")?,
            success: parse_bool(&table, i, success)?,
            note: table.get(i, note).to_string(),
            duration_s: parse_or_default(&table, i, duration, "duration_s")?,
            producers: parse_or_default(&table, i, producers, "producers")?,
            consumers: parse_or_default(&table, i, consumers, "consumers")?,
            size_bytes: parse_or_default(&table, i, size, "size_bytes")?,
            queue: table.get(i, queue).to_string(),
        });
    }
    Ok(rows)
}

// ---- raw sweep records ----

const SWEEP_HEADER: &str = "timestamp,clients,jobs,duration_s,tps_including,tps_excluding,latency_ms_avg,tx_processed,return_code,error";

/// Write the sweep results header if the file is missing or empty.
pub fn ensure_sweep_header(path: &Path) -> Result<()> {
    let needs_header = match std::fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(_) => true,
    };
    if needs_header {
        let mut file = File::create(path)?;
        writeln!(file, "{SWEEP_HEADER}")?;
    }
    Ok(())
}

/// Append one run record; the sweep survives partial completion.
pub fn append_sweep_row(path: &Path, record: &DbRawRecord) -> Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    writeln!(
        file,
        "{}",
        format_row(&[
            record.timestamp.clone(),
            record.clients.to_string(),
            record.jobs.to_string(),
            record.duration_s.to_string(),
            opt_to_string(record.tps_including),
            opt_to_string(record.tps_excluding),
            opt_to_string(record.latency_ms_avg),
            record.tx_processed.map(|v| v.to_string()).unwrap_or_default(),
            record.return_code.to_string(),
            record.error.clone().unwrap_or_default(),
        ])
    )?;
    Ok(())
}

pub fn read_db_raw_csv(path: &Path) -> Result<Vec<DbRawRecord>> {
    let table = CsvTable::read_path(path)?;
    let timestamp = table.column("timestamp")?;
    let clients = table.column("clients")?;
    let jobs = table.column("jobs")?;
    let duration = table.column("duration_s")?;
    let tps_inc = table.column("tps_including")?;
    let tps_exc = table.column("tps_excluding")?;
    let latency = table.column("latency_ms_avg")?;
    let tx = table.column("tx_processed")?;
    let rc = table.column("return_code")?;
    let error = table.column("error")?;

    let mut rows = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        let error_text = table.get(i, error);
        rows.push(DbRawRecord {
            timestamp: table.get(i, timestamp).to_string(),
            clients: parse_or_default(&table, i, clients, "clients")?,
            jobs: parse_or_default(&table, i, jobs, "jobs")?,
            duration_s: parse_or_default(&table, i, duration, "duration_s")?,
            tps_including: parse_optional(&table, i, tps_inc, "tps_including")?,
            tps_excluding: parse_optional(&table, i, tps_exc, "tps_excluding")?,
            latency_ms_avg: parse_optional(&table, i, latency, "latency_ms_avg")?,
            tx_processed: parse_optional(&table, i, tx, "tx_processed")?,
            return_code: parse_or_default(&table, i, rc, "return_code")?,
            error: if error_text.is_empty() {
                None
            } else {
                Some(error_text.to_string())
            },
        });
    }
    Ok(rows)
}

// ---- normalized records ----

pub fn write_normalized_db_csv(path: &Path, records: &[NormalizedDbRecord]) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "component,component_type,timestamp,clients,jobs,duration_s,tps,latency_ms,tx_processed,tps_per_core,latency_ms_per_core,tps_per_client,tps_per_job,tps_per_gb_memory,latency_per_tx_ms,memory_per_tx_bytes,cpu_utilization_pct,test_cpu_cores,test_memory_gb"
    )?;
    for r in records {
        writeln!(
            file,
            "{}",
            format_row(&[
                r.component.clone(),
                "DB".to_string(),
                r.timestamp.clone(),
                r.clients.to_string(),
                r.jobs.to_string(),
                r.duration_s.to_string(),
                r.tps.to_string(),
                r.latency_ms.to_string(),
                r.tx_processed.to_string(),
                format!("{:.2}", r.tps_per_core),
                format!("{:.2}", r.latency_ms_per_core),
                format!("{:.2}", r.tps_per_client),
                format!("{:.2}", r.tps_per_job),
                format!("{:.2}", r.tps_per_gb_memory),
                format!("{:.2}", r.latency_per_tx_ms),
                format!("{:.2}", r.memory_per_tx_bytes),
                format!("{:.2}", r.cpu_utilization_pct),
                r.test_cpu_cores.to_string(),
                r.test_memory_gb.to_string(),
            ])
        )?;
    }
    Ok(())
}

pub fn read_normalized_db_csv(path: &Path) -> Result<Vec<NormalizedDbRecord>> {
    let table = CsvTable::read_path(path)?;
    let col = |name: &str| table.column(name);

    let component = col("component")?;
    let timestamp = col("timestamp")?;
    let clients = col("clients")?;
    let jobs = col("jobs")?;
    let duration = col("duration_s")?;
    let tps = col("tps")?;
    let latency = col("latency_ms")?;
    let tx = col("tx_processed")?;
    let per_core = col("tps_per_core")?;
    let latency_per_core = col("latency_ms_per_core")?;
    let per_client = col("tps_per_client")?;
    let per_job = col("tps_per_job")?;
    let per_gb = col("tps_per_gb_memory")?;
    let latency_per_tx = col("latency_per_tx_ms")?;
    let mem_per_tx = col("memory_per_tx_bytes")?;
    let cpu_pct = col("cpu_utilization_pct")?;
    let cores = col("test_cpu_cores")?;
    let memory = col("test_memory_gb")?;

    let mut rows = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        rows.push(NormalizedDbRecord {
            component: table.get(i, component).to_string(),
            timestamp: table.get(i, timestamp).to_string(),
            clients: parse_or_default(&table, i, clients, "clients")?,
            jobs: parse_or_default(&table, i, jobs, "jobs")?,
            duration_s: parse_or_default(&table, i, duration, "duration_s")?,
            tps: parse_or_default(&table, i, tps, "tps")?,
            latency_ms: parse_or_default(&table, i, latency, "latency_ms")?,
            tx_processed: parse_or_default(&table, i, tx, "tx_processed")?,
            tps_per_core: parse_or_default(&table, i, per_core, "tps_per_core")?,
            latency_ms_per_core: parse_or_default(&table, i, latency_per_core, "latency_ms_per_core")?,
            tps_per_client: parse_or_default(&table, i, per_client, "tps_per_client")?,
            tps_per_job: parse_or_default(&table, i, per_job, "tps_per_job")?,
            tps_per_gb_memory: parse_or_default(&table, i, per_gb, "tps_per_gb_memory")?,
            latency_per_tx_ms: parse_or_default(&table, i, latency_per_tx, "latency_per_tx_ms")?,
            memory_per_tx_bytes: parse_or_default(&table, i, mem_per_tx, "memory_per_tx_bytes")?,
            cpu_utilization_pct: parse_or_default(&table, i, cpu_pct, "cpu_utilization_pct")?,
            test_cpu_cores: parse_or_default(&table, i, cores, "test_cpu_cores")?,
            test_memory_gb: parse_or_default(&table, i, memory, "test_memory_gb")?,
        });
    }
    Ok(rows)
}

pub fn write_normalized_mq_csv(path: &Path, records: &[NormalizedMqRecord]) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "component,component_type,run_id,target_rate_msg_s,duration_s,avg_sent_msg_s,avg_received_msg_s,worst_p95_ms,producers,consumers,size_bytes,msg_per_sec_per_core,msg_per_sec_per_producer,msg_per_sec_per_consumer,msg_per_sec_per_gb_memory,msg_per_sec_per_kb,latency_per_msg_ms,memory_per_msg_bytes,throughput_mbps,cpu_utilization_pct,loss_ratio,test_cpu_cores,test_memory_gb"
    )?;
    for r in records {
        writeln!(
            file,
            "{}",
            format_row(&[
                r.component.clone(),
                "MQ".to_string(),
                r.run_id.clone(),
                r.target_rate_msg_s.to_string(),
                r.duration_s.to_string(),
                r.avg_sent_msg_s.to_string(),
                r.avg_received_msg_s.to_string(),
                r.worst_p95_ms.to_string(),
                r.producers.to_string(),
                r.consumers.to_string(),
                r.size_bytes.to_string(),
                format!("{:.2}", r.msg_per_sec_per_core),
                format!("{:.2}", r.msg_per_sec_per_producer),
                format!("{:.2}", r.msg_per_sec_per_consumer),
                format!("{:.2}", r.msg_per_sec_per_gb_memory),
                format!("{:.2}", r.msg_per_sec_per_kb),
                format!("{:.2}", r.latency_per_msg_ms),
                format!("{:.2}", r.memory_per_msg_bytes),
                format!("{:.2}", r.throughput_mbps),
                format!("{:.2}", r.cpu_utilization_pct),
                format!("{:.4}", r.loss_ratio),
                r.test_cpu_cores.to_string(),
                r.test_memory_gb.to_string(),
            ])
        )?;
    }
    Ok(())
}

pub fn read_normalized_mq_csv(path: &Path) -> Result<Vec<NormalizedMqRecord>> {
    let table = CsvTable::read_path(path)?;
    let col = |name: &str| table.column(name);

    let component = col("component")?;
    let run_id = col("run_id")?;
    let target = col("target_rate_msg_s")?;
    let duration = col("duration_s")?;
    let sent = col("avg_sent_msg_s")?;
    let received = col("avg_received_msg_s")?;
    let p95 = col("worst_p95_ms")?;
    let producers = col("producers")?;
    let consumers = col("consumers")?;
    let size = col("size_bytes")?;
    let per_core = col("msg_per_sec_per_core")?;
    let per_producer = col("msg_per_sec_per_producer")?;
    let per_consumer = col("msg_per_sec_per_consumer")?;
    let per_gb = col("msg_per_sec_per_gb_memory")?;
    let per_kb = col("msg_per_sec_per_kb")?;
    let latency_per_msg = col("latency_per_msg_ms")?;
    let mem_per_msg = col("memory_per_msg_bytes")?;
    let mbps = col("throughput_mbps")?;
    let cpu_pct = col("cpu_utilization_pct")?;
    let loss = col("loss_ratio")?;
    let cores = col("test_cpu_cores")?;
    let memory = col("test_memory_gb")?;

    let mut rows = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        rows.push(NormalizedMqRecord {
            component: table.get(i, component).to_string(),
            run_id: table.get(i, run_id).to_string(),
            target_rate_msg_s: parse_or_default(&table, i, target, "target_rate_msg_s")?,
            duration_s: parse_or_default(&table, i, duration, "duration_s")?,
            avg_sent_msg_s: parse_or_default(&table, i, sent, "avg_sent_msg_s")?,
            avg_received_msg_s: parse_or_default(&table, i, received, "avg_received_msg_s")?,
            worst_p95_ms: parse_or_default(&table, i, p95, "worst_p95_ms")?,
            producers: parse_or_default(&table, i, producers, "producers")?,
            consumers: parse_or_default(&table, i, consumers, "consumers")?,
            size_bytes: parse_or_default(&table, i, size, "size_bytes")?,
            msg_per_sec_per_core: parse_or_default(&table, i, per_core, "msg_per_sec_per_core")?,
            msg_per_sec_per_producer: parse_or_default(&table, i, per_producer, "msg_per_sec_per_producer")?,
            msg_per_sec_per_consumer: parse_or_default(&table, i, per_consumer, "msg_per_sec_per_consumer")?,
            msg_per_sec_per_gb_memory: parse_or_default(&table, i, per_gb, "msg_per_sec_per_gb_memory")?,
            msg_per_sec_per_kb: parse_or_default(&table, i, per_kb, "msg_per_sec_per_kb")?,
            latency_per_msg_ms: parse_or_default(&table, i, latency_per_msg, "latency_per_msg_ms")?,
            memory_per_msg_bytes: parse_or_default(&table, i, mem_per_msg, "memory_per_msg_bytes")?,
            throughput_mbps: parse_or_default(&table, i, mbps, "throughput_mbps")?,
            cpu_utilization_pct: parse_or_default(&table, i, cpu_pct, "cpu_utilization_pct")?,
            loss_ratio: parse_or_default(&table, i, loss, "loss_ratio")?,
            test_cpu_cores: parse_or_default(&table, i, cores, "test_cpu_cores")?,
            test_memory_gb: parse_or_default(&table, i, memory, "test_memory_gb")?,
        });
    }
    Ok(rows)
}

// ---- capacity recommendations ----

pub fn write_recommendation_csv(path: &Path, rec: &CapacityRecommendation) -> Result<()> {
    let mut file = File::create(path)?;
    match rec {
        CapacityRecommendation::Db(r) => write_db_recommendation(&mut file, r)?,
        CapacityRecommendation::Mq(r) => write_mq_recommendation(&mut file, r)?,
    }
    Ok(())
}

fn write_db_recommendation(file: &mut File, r: &DbRecommendation) -> Result<()> {
    writeln!(
        file,
        "component,target_tps,max_latency_ms,required_cpu_cores,required_memory_gb,estimated_latency_ms,baseline_tps_per_core,baseline_tps_per_gb,baseline_test_tps,baseline_test_latency_ms"
    )?;
    writeln!(
        file,
        "{}",
        format_row(&[
            r.component.clone(),
            r.target_tps.to_string(),
            r.max_latency_ms.to_string(),
            r.required_cpu_cores.to_string(),
            r.required_memory_gb.to_string(),
            format!("{:.2}", r.estimated_latency_ms),
            format!("{:.2}", r.baseline_tps_per_core),
            format!("{:.2}", r.baseline_tps_per_gb),
            r.baseline_test_tps.to_string(),
            r.baseline_test_latency_ms.to_string(),
        ])
    )?;
    Ok(())
}

fn write_mq_recommendation(file: &mut File, r: &MqRecommendation) -> Result<()> {
    writeln!(
        file,
        "component,target_msg_per_sec,max_p95_ms,required_cpu_cores,required_memory_gb,estimated_p95_ms,baseline_msg_per_sec_per_core,baseline_msg_per_sec_per_gb,baseline_test_msg_per_sec,baseline_test_p95_ms"
    )?;
    writeln!(
        file,
        "{}",
        format_row(&[
            r.component.clone(),
            r.target_msg_per_sec.to_string(),
            r.max_p95_ms.to_string(),
            r.required_cpu_cores.to_string(),
            r.required_memory_gb.to_string(),
            format!("{:.2}", r.estimated_p95_ms),
            format!("{:.2}", r.baseline_msg_per_sec_per_core),
            format!("{:.2}", r.baseline_msg_per_sec_per_gb),
            r.baseline_test_msg_per_sec.to_string(),
            r.baseline_test_p95_ms.to_string(),
        ])
    )?;
    Ok(())
}

// ---- field parsing ----

fn opt_to_string(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Parse a field, treating an empty cell as the type's default.
fn parse_or_default<T>(table: &CsvTable, row: usize, col: usize, name: &str) -> Result<T>
where
    T: std::str::FromStr + Default,
{
    let raw = table.get(row, col).trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse().map_err(|_| {
        CsvError::InvalidValue {
            row: row + 1,
            column: name.to_string(),
            value: raw.to_string(),
        }
        .into()
    })
}

/// Parse an optional numeric field; empty means absent.
fn parse_optional<T>(table: &CsvTable, row: usize, col: usize, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
{
    let raw = table.get(row, col).trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| {
        CsvError::InvalidValue {
            row: row + 1,
            column: name.to_string(),
            value: raw.to_string(),
        }
        .into()
    })
}

fn parse_bool(table: &CsvTable, row: usize, col: usize) -> Result<bool> {
    let raw = table.get(row, col).trim();
    match raw {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" | "" => Ok(false),
        other => Err(CsvError::InvalidValue {
            row: row + 1,
            column: "success".to_string(),
            value: other.to_string(),
        }
        .into()),
    }
}
