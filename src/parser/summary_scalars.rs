//! Transactional benchmark summary parsing
//!
//! Extracts the labeled scalar lines a transactional benchmark prints at
//! the end of a run. Each scalar is independently optional; a partial
//! result is valid.

use regex::Regex;

/// Scalars extracted from transactional benchmark output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbSummaryMetrics {
    pub tps_including: Option<f64>,
    pub tps_excluding: Option<f64>,
    pub latency_ms_avg: Option<f64>,
    pub tx_processed: Option<u64>,
}

/// Matcher for the transactional summary scalars.
#[derive(Debug)]
pub struct SummaryScalarParser {
    tps_including: Regex,
    tps_excluding: Regex,
    latency_avg: Regex,
    tx_processed: Regex,
}

impl SummaryScalarParser {
    pub fn new() -> Self {
        Self {
            tps_including: Regex::new(r"(?i)tps\s*=\s*([0-9.]+)\s*\(including")
                .expect("tps-including pattern is valid"),
            tps_excluding: Regex::new(r"(?i)tps\s*=\s*([0-9.]+)\s*\(excluding")
                .expect("tps-excluding pattern is valid"),
            latency_avg: Regex::new(r"(?i)latency\s+average\s*=\s*([0-9.]+)\s*ms")
                .expect("latency-average pattern is valid"),
            tx_processed: Regex::new(
                r"(?i)number\s+of\s+transactions\s+actually\s+processed:\s*([0-9]+)",
            )
            .expect("tx-processed pattern is valid"),
        }
    }

    /// Extract whichever summary scalars appear in `output`.
    pub fn parse(&self, output: &str) -> DbSummaryMetrics {
        DbSummaryMetrics {
            tps_including: capture_f64(&self.tps_including, output),
            tps_excluding: capture_f64(&self.tps_excluding, output),
            latency_ms_avg: capture_f64(&self.latency_avg, output),
            tx_processed: capture_u64(&self.tx_processed, output),
        }
    }
}

impl Default for SummaryScalarParser {
    fn default() -> Self {
        Self::new()
    }
}

fn capture_f64(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn capture_u64(re: &Regex, text: &str) -> Option<u64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_OUTPUT: &str = "\
transaction type: <builtin: TPC-B (sort of)>\n\
number of transactions actually processed: 48231\n\
latency average = 9.945 ms\n\
tps = 804.520301 (including connections establishing)\n\
tps = 805.187213 (excluding connections establishing)\n";

    #[test]
    fn test_parse_full_output() {
        let parser = SummaryScalarParser::new();
        let metrics = parser.parse(FULL_OUTPUT);
        assert_eq!(metrics.tps_including, Some(804.520301));
        assert_eq!(metrics.tps_excluding, Some(805.187213));
        assert_eq!(metrics.latency_ms_avg, Some(9.945));
        assert_eq!(metrics.tx_processed, Some(48231));
    }

    #[test]
    fn test_partial_output_is_valid() {
        let parser = SummaryScalarParser::new();
        let metrics = parser.parse("tps = 120.5 (excluding connections establishing)\n");
        assert_eq!(metrics.tps_excluding, Some(120.5));
        assert_eq!(metrics.tps_including, None);
        assert_eq!(metrics.latency_ms_avg, None);
        assert_eq!(metrics.tx_processed, None);
    }

    #[test]
    fn test_no_match_yields_empty() {
        let parser = SummaryScalarParser::new();
        assert_eq!(
            parser.parse("connection to server failed"),
            DbSummaryMetrics::default()
        );
    }

    #[test]
    fn test_case_insensitive_labels() {
        let parser = SummaryScalarParser::new();
        let metrics = parser.parse("Latency Average = 12.5 MS\nTPS = 42.0 (Including x)");
        assert_eq!(metrics.latency_ms_avg, Some(12.5));
        assert_eq!(metrics.tps_including, Some(42.0));
    }
}
