//! Stability classification
//!
//! Decides whether a trial counts as sustainable and assigns reason codes
//! on failure.

use super::trial::{TimeSeriesSample, LATENCY_UNKNOWN_MS};

/// Thresholds for the stable/unstable decision
#[derive(Debug, Clone, Copy)]
pub struct StabilityThresholds {
    /// Minimum acceptable avg_received / avg_sent, in (0, 1].
    pub success_ratio: f64,
    /// Worst acceptable p95 latency in milliseconds.
    pub p95_limit_ms: i64,
}

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self {
            success_ratio: 0.95,
            p95_limit_ms: 2000,
        }
    }
}

/// Aggregated statistics of one trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialStats {
    pub avg_sent: f64,
    pub avg_received: f64,
    /// Worst valid p95 across the trial, or -1 if none was observed.
    pub worst_p95: i64,
}

impl TrialStats {
    /// Aggregate per-second samples: mean sent/received rates and the
    /// worst p95 among samples that carried a valid latency.
    pub fn from_samples(samples: &[TimeSeriesSample]) -> Self {
        if samples.is_empty() {
            return Self {
                avg_sent: 0.0,
                avg_received: 0.0,
                worst_p95: 0,
            };
        }

        let n = samples.len() as f64;
        let avg_sent = samples.iter().map(|s| s.sent_rate).sum::<f64>() / n;
        let avg_received = samples.iter().map(|s| s.received_rate).sum::<f64>() / n;
        let worst_p95 = samples
            .iter()
            .map(|s| s.p95_ms)
            .filter(|&p| p >= 0)
            .max()
            .unwrap_or(LATENCY_UNKNOWN_MS);

        Self {
            avg_sent,
            avg_received,
            worst_p95,
        }
    }
}

/// Outcome of classifying one trial
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityVerdict {
    pub stable: bool,
    pub reasons: Vec<String>,
}

impl StabilityThresholds {
    /// Classify aggregated trial statistics.
    ///
    /// A trial with no data fails with `no_data`. Otherwise the delivery
    /// ratio and the worst p95 are checked independently and both reasons
    /// accumulate. A worst_p95 of -1 (no valid observation) never trips
    /// the latency check.
    pub fn classify(&self, stats: &TrialStats) -> StabilityVerdict {
        let mut reasons = Vec::new();

        if stats.avg_sent <= 0.0 {
            reasons.push("no_data".to_string());
        } else {
            let ratio = stats.avg_received / stats.avg_sent;
            if ratio < self.success_ratio {
                reasons.push(format!("ratio_below_{}", self.success_ratio));
            }
            if stats.worst_p95 >= 0 && stats.worst_p95 > self.p95_limit_ms {
                reasons.push(format!("p95_over_{}ms", self.p95_limit_ms));
            }
        }

        StabilityVerdict {
            stable: reasons.is_empty(),
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(avg_sent: f64, avg_received: f64, worst_p95: i64) -> TrialStats {
        TrialStats {
            avg_sent,
            avg_received,
            worst_p95,
        }
    }

    #[test]
    fn test_no_data() {
        let verdict = StabilityThresholds::default().classify(&stats(0.0, 0.0, 0));
        assert!(!verdict.stable);
        assert_eq!(verdict.reasons, vec!["no_data"]);
    }

    #[test]
    fn test_stable_trial() {
        let verdict = StabilityThresholds::default().classify(&stats(1000.0, 990.0, 100));
        assert!(verdict.stable);
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn test_ratio_and_latency_reasons_accumulate() {
        let thresholds = StabilityThresholds {
            success_ratio: 0.95,
            p95_limit_ms: 2000,
        };
        let verdict = thresholds.classify(&stats(1000.0, 500.0, 3000));
        assert!(!verdict.stable);
        assert_eq!(verdict.reasons, vec!["ratio_below_0.95", "p95_over_2000ms"]);
    }

    #[test]
    fn test_unknown_p95_never_fails_latency() {
        let verdict =
            StabilityThresholds::default().classify(&stats(1000.0, 1000.0, LATENCY_UNKNOWN_MS));
        assert!(verdict.stable);
    }

    #[test]
    fn test_p95_at_limit_is_stable() {
        let thresholds = StabilityThresholds {
            success_ratio: 0.95,
            p95_limit_ms: 2000,
        };
        assert!(thresholds.classify(&stats(1000.0, 1000.0, 2000)).stable);
        assert!(!thresholds.classify(&stats(1000.0, 1000.0, 2001)).stable);
    }

    #[test]
    fn test_monotone_in_received() {
        // Holding avg_sent fixed, raising avg_received never turns a
        // success into a failure.
        let thresholds = StabilityThresholds::default();
        let mut prev_stable = false;
        for received in [900.0, 940.0, 950.0, 980.0, 1000.0] {
            let stable = thresholds.classify(&stats(1000.0, received, 10)).stable;
            assert!(stable || !prev_stable);
            prev_stable = stable;
        }
    }

    #[test]
    fn test_monotone_in_latency() {
        // Holding the ratio fixed, crossing the p95 limit always fails.
        let thresholds = StabilityThresholds {
            success_ratio: 0.9,
            p95_limit_ms: 100,
        };
        assert!(thresholds.classify(&stats(1000.0, 1000.0, 100)).stable);
        for p95 in [101, 500, 10_000] {
            assert!(!thresholds.classify(&stats(1000.0, 1000.0, p95)).stable);
        }
    }

    #[test]
    fn test_stats_from_samples_worst_p95_skips_sentinel() {
        let samples = vec![
            TimeSeriesSample {
                time_s: 1.0,
                sent_rate: 100.0,
                received_rate: 100.0,
                p50_ms: 1,
                p95_ms: LATENCY_UNKNOWN_MS,
                p99_ms: LATENCY_UNKNOWN_MS,
            },
            TimeSeriesSample {
                time_s: 2.0,
                sent_rate: 200.0,
                received_rate: 100.0,
                p50_ms: 1,
                p95_ms: 40,
                p99_ms: 45,
            },
        ];
        let stats = TrialStats::from_samples(&samples);
        assert_eq!(stats.avg_sent, 150.0);
        assert_eq!(stats.avg_received, 100.0);
        assert_eq!(stats.worst_p95, 40);
    }

    #[test]
    fn test_stats_all_sentinel_p95() {
        let samples = vec![TimeSeriesSample {
            time_s: 1.0,
            sent_rate: 100.0,
            received_rate: 100.0,
            p50_ms: LATENCY_UNKNOWN_MS,
            p95_ms: LATENCY_UNKNOWN_MS,
            p99_ms: LATENCY_UNKNOWN_MS,
        }];
        assert_eq!(TrialStats::from_samples(&samples).worst_p95, LATENCY_UNKNOWN_MS);
    }
}
