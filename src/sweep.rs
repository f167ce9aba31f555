//! Ascending sweep over sequence lengths.
//!
//! The sweep asks a [`Prover`] about `start, start + 1, ..., end` and stops at
//! the first length that is proven. A timeout is recorded as inconclusive and
//! also ends the sweep: a larger length is never tried without an answer for
//! the smaller one.
//!
//! Each finished attempt is handed to a callback as soon as it is known. If
//! the prover fails, the attempts completed so far travel with the error.

use std::fmt;
use std::time::Duration;

use log::info;
use thiserror::Error;

use crate::cegar::CegarDriver;
use crate::model::{TEAM_SIZE, VALUE_BOUND};
use crate::oracle::SolverOracle;
use crate::proof::{DriverOptions, ProofError, ProofResult, Prover};
use crate::static_model::StaticDriver;
use crate::subsets::sequence_space;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Strategy {
    /// Counter-example guided refinement.
    #[default]
    Cegar,
    /// All disjoint pairs blocked up front.
    Static,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Cegar => write!(f, "cegar"),
            Strategy::Static => write!(f, "static"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SweepConfig {
    /// Wall-clock budget for each length.
    pub time_limit: Duration,
    /// Search workers passed to the oracle.
    pub threads: usize,
    pub start: usize,
    pub end: usize,
    pub strategy: Strategy,
    pub team_size: usize,
    pub value_bound: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(600),
            threads: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            start: 14,
            end: 17,
            strategy: Strategy::default(),
            team_size: TEAM_SIZE,
            value_bound: VALUE_BOUND,
        }
    }
}

impl SweepConfig {
    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            team_size: self.team_size,
            value_bound: self.value_bound,
            workers: self.threads,
        }
    }
}

/// Result for one length.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Attempt {
    pub n: usize,
    pub result: ProofResult,
    pub elapsed: Duration,
    pub oracle_calls: usize,
    pub refinements: usize,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SweepReport {
    pub attempts: Vec<Attempt>,
}

impl SweepReport {
    /// The first proven length, if any.
    pub fn threshold(&self) -> Option<usize> {
        self.attempts
            .iter()
            .find(|a| a.result == ProofResult::Proven)
            .map(|a| a.n)
    }

    /// Whether the sweep was cut short by a timeout.
    pub fn is_inconclusive(&self) -> bool {
        self.attempts.iter().any(|a| a.result == ProofResult::Inconclusive)
    }
}

/// A sweep stopped by a prover error.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("sweep stopped after {} completed attempt(s): {source}", .partial.attempts.len())]
pub struct SweepError {
    /// Attempts finished before the error.
    pub partial: SweepReport,
    #[source]
    pub source: ProofError,
}

/// Runs the sweep with the strategy chosen in `config`.
pub fn run_sweep<O: SolverOracle>(
    config: &SweepConfig,
    oracle: O,
    on_attempt: impl FnMut(&Attempt),
) -> Result<SweepReport, SweepError> {
    let options = config.driver_options();
    match config.strategy {
        Strategy::Cegar => sweep_with(config, &mut CegarDriver::new(oracle, options), on_attempt),
        Strategy::Static => sweep_with(config, &mut StaticDriver::new(oracle, options), on_attempt),
    }
}

/// Runs the sweep with an explicit prover, calling `on_attempt` after each
/// length.
///
/// Timeouts end the sweep with an inconclusive entry. Any other error ends it
/// with a [`SweepError`] holding the attempts made so far.
pub fn sweep_with(
    config: &SweepConfig,
    prover: &mut dyn Prover,
    mut on_attempt: impl FnMut(&Attempt),
) -> Result<SweepReport, SweepError> {
    let mut report = SweepReport::default();

    for n in config.start..=config.end {
        info!(
            "N={}: {} sorted sequences over [1, {}]",
            n,
            sequence_space(n, config.value_bound),
            config.value_bound
        );
        let result = match prover.prove(n, config.time_limit) {
            Ok(verdict) => ProofResult::from(verdict),
            Err(ProofError::Timeout { n, budget, elapsed }) => {
                info!("N={}: time limit {:?} exceeded after {:?}", n, budget, elapsed);
                ProofResult::Inconclusive
            }
            Err(source) => {
                return Err(SweepError {
                    partial: report,
                    source,
                })
            }
        };

        let stats = prover.stats();
        let keep_going = matches!(result, ProofResult::Disproven(_));
        let attempt = Attempt {
            n,
            result,
            elapsed: stats.elapsed,
            oracle_calls: stats.oracle_calls,
            refinements: stats.refinements,
        };
        on_attempt(&attempt);
        report.attempts.push(attempt);
        if !keep_going {
            break;
        }
    }

    Ok(report)
}
