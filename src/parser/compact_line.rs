//! Periodic rate/latency line parser
//!
//! Matches the compact per-second output of the messaging benchmark, e.g.
//! `1.000s 173,920 msg/s 84,405 msg/s 1/25/189/312/331 ms`

use regex::Regex;

use crate::search::trial::{TimeSeriesSample, LATENCY_UNKNOWN_MS};

/// Matcher for the compact periodic output line.
///
/// The pattern is compiled once at construction; parsing a line that does
/// not match is not an error, it is simply not data.
#[derive(Debug)]
pub struct CompactLineParser {
    line: Regex,
}

impl CompactLineParser {
    pub fn new() -> Self {
        Self {
            line: Regex::new(
                r"^\s*(?P<tsec>\d+(?:\.\d+)?)s\s+(?P<sent>[\d,]+)\s+msg/s\s+(?P<recv>[\d,]+)\s+msg/s\s+(?P<lat>[\d/]+)\s+(?P<unit>µs|μs|us|ms)\s*$",
            )
            .expect("compact line pattern is valid"),
        }
    }

    /// Parse one line of benchmark output into a sample.
    ///
    /// The latency list is expected to carry five values
    /// (min/p50/p75/p95/p99); anything else leaves the latency fields at
    /// the unknown sentinel. Thousands separators in the rate counts are
    /// stripped before conversion.
    pub fn parse(&self, line: &str) -> Option<TimeSeriesSample> {
        let caps = self.line.captures(line)?;

        let time_s: f64 = caps["tsec"].parse().ok()?;
        let sent_rate = caps["sent"].replace(',', "").parse::<u64>().ok()? as f64;
        let received_rate = caps["recv"].replace(',', "").parse::<u64>().ok()? as f64;

        // Microsecond variants convert to milliseconds.
        let factor = match &caps["unit"] {
            "ms" => 1.0,
            _ => 0.001,
        };

        let latencies: Vec<i64> = caps["lat"]
            .split('/')
            .filter_map(|v| v.parse().ok())
            .collect();
        let (p50_ms, p95_ms, p99_ms) = if latencies.len() == 5 {
            (
                to_ms(latencies[1], factor),
                to_ms(latencies[3], factor),
                to_ms(latencies[4], factor),
            )
        } else {
            (LATENCY_UNKNOWN_MS, LATENCY_UNKNOWN_MS, LATENCY_UNKNOWN_MS)
        };

        Some(TimeSeriesSample {
            time_s,
            sent_rate,
            received_rate,
            p50_ms,
            p95_ms,
            p99_ms,
        })
    }
}

impl Default for CompactLineParser {
    fn default() -> Self {
        Self::new()
    }
}

fn to_ms(value: i64, factor: f64) -> i64 {
    (value as f64 * factor).round() as i64
}
