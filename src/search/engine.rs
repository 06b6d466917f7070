//! Adaptive maximum-stable-rate search
//!
//! Coarse phase grows the probe rate exponentially until the first
//! unstable trial, then a binary search narrows the bracket
//! `[last stable, first unstable)`. Assumes the system under test is
//! monotone: once the rate is high enough to destabilize it, higher
//! rates stay unstable.

use tracing::info;

use super::trial::Trial;
use crate::utils::{CapacityError, Result};

/// Collaborator that executes one trial at a fixed target rate.
///
/// An `Err` means the benchmark tool itself could not run or produced
/// nothing parsable; it aborts the search. An unstable-but-measured
/// trial is an `Ok` trial with a failing verdict.
pub trait TrialRunner {
    fn run_trial(&mut self, rate: u64, run_id: &str) -> Result<Trial>;
}

/// Search parameters
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Initial target rate for the coarse phase.
    pub start_rate: u64,
    /// Hard cap; the search never probes above this rate.
    pub max_rate: u64,
    /// Coarse-phase growth factor, strictly greater than 1.
    pub growth: f64,
    /// Prefix for per-trial run ids.
    pub id_prefix: String,
    /// Optional warmup rate probed before the search; 0 skips warmup.
    pub warmup_rate: u64,
}

impl SearchSettings {
    /// Check preconditions. A growth factor <= 1 cannot terminate the
    /// coarse phase and is rejected here, before any trial runs.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.start_rate == 0 {
            return Err("start rate must be positive".to_string());
        }
        if self.max_rate < self.start_rate {
            return Err(format!(
                "max rate {} is below start rate {}",
                self.max_rate, self.start_rate
            ));
        }
        if self.growth <= 1.0 {
            return Err(format!(
                "growth factor must be > 1, got {}",
                self.growth
            ));
        }
        Ok(())
    }
}

/// Terminal outcome of a search run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Bracketed and refined down to the convergence width.
    Converged { max_stable_rate: u64 },
    /// Never failed below the cap; the true ceiling is at or above
    /// `last_ok` and the engine does not know it.
    CappedAtMax { last_ok: u64 },
    /// The very first probe failed; no stable rate exists within range.
    NoStableRate,
}

/// Search result with full trial provenance
#[derive(Debug)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    /// Every trial run, in execution order, warmup included.
    pub trials: Vec<Trial>,
}

impl SearchReport {
    /// Human-readable trial history.
    pub fn history(&self) -> String {
        let mut s = String::new();
        for t in &self.trials {
            s.push_str(&format!(
                "  {:>10} msg/s  sent={:>10.0}  recv={:>10.0}  p95={:>6}ms  {}\n",
                t.target_rate,
                t.avg_sent,
                t.avg_received,
                t.worst_p95,
                if t.success {
                    "[OK]".to_string()
                } else {
                    format!("[FAIL {}]", t.note())
                }
            ));
        }
        s
    }
}

/// Adaptive search over an injected trial runner.
///
/// Strictly sequential: one trial at a time, blocking on the runner.
#[derive(Debug)]
pub struct AdaptiveSearchEngine {
    settings: SearchSettings,
}

impl AdaptiveSearchEngine {
    pub fn new(settings: SearchSettings) -> Result<Self> {
        settings.validate().map_err(CapacityError::Config)?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Run the search to completion against `runner`.
    pub fn run(&self, runner: &mut dyn TrialRunner) -> Result<SearchReport> {
        let mut trials = Vec::new();

        if self.settings.warmup_rate > 0 {
            let run_id = format!("{}-warmup-{}", self.settings.id_prefix, self.settings.warmup_rate);
            info!(rate = self.settings.warmup_rate, "warmup trial");
            trials.push(runner.run_trial(self.settings.warmup_rate, &run_id)?);
        }

        // Coarse phase: exponential growth until the first unstable trial.
        let mut rate = self.settings.start_rate;
        let mut last_ok = 0u64;
        let mut hi: Option<u64> = None;
        while rate <= self.settings.max_rate {
            if self.probe(runner, rate, &mut trials)? {
                last_ok = rate;
                // The +1 floor keeps low rates moving when growth rounds
                // back down to the current rate.
                rate = (rate + 1).max((rate as f64 * self.settings.growth).round() as u64);
            } else {
                hi = Some(rate);
                break;
            }
        }

        // Refinement needs a stable lower bound and an unstable upper
        // bound; anything else is a terminal outcome.
        if last_ok == 0 {
            return Ok(SearchReport {
                outcome: SearchOutcome::NoStableRate,
                trials,
            });
        }
        let Some(mut hi) = hi else {
            return Ok(SearchReport {
                outcome: SearchOutcome::CappedAtMax { last_ok },
                trials,
            });
        };

        // Binary search on [lo, hi).
        let mut lo = last_ok;
        while hi - lo > convergence_width(lo) {
            let mid = (lo + hi) / 2;
            if self.probe(runner, mid, &mut trials)? {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        Ok(SearchReport {
            outcome: SearchOutcome::Converged {
                max_stable_rate: lo,
            },
            trials,
        })
    }

    fn probe(
        &self,
        runner: &mut dyn TrialRunner,
        rate: u64,
        trials: &mut Vec<Trial>,
    ) -> Result<bool> {
        let run_id = format!("{}-r{}", self.settings.id_prefix, rate);
        let trial = runner.run_trial(rate, &run_id)?;
        info!(
            rate,
            success = trial.success,
            note = %trial.note(),
            "trial complete"
        );
        let ok = trial.success;
        trials.push(trial);
        Ok(ok)
    }
}

/// Refinement stop width: 100 units absolute or 2% of the current lower
/// bound, whichever is larger.
fn convergence_width(lo: u64) -> u64 {
    100.max((0.02 * lo.max(1) as f64) as u64)
}
