//! Outcomes and failures of a proof attempt for one sequence length.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::oracle::OracleFault;
use crate::types::ValueSequence;

/// Definitive answer for one sequence length.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Verdict {
    /// Every admissible sequence of this length has two disjoint equal teams.
    Proven,
    /// A sequence of this length without two disjoint equal teams.
    Disproven(ValueSequence),
}

impl Verdict {
    pub fn is_proven(&self) -> bool {
        matches!(self, Verdict::Proven)
    }

    pub fn counterexample(&self) -> Option<&ValueSequence> {
        match self {
            Verdict::Proven => None,
            Verdict::Disproven(values) => Some(values),
        }
    }
}

/// Per-length result as reported by a sweep.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ProofResult {
    Proven,
    Disproven(ValueSequence),
    /// The time budget ran out first.
    Inconclusive,
}

impl From<Verdict> for ProofResult {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Proven => ProofResult::Proven,
            Verdict::Disproven(values) => ProofResult::Disproven(values),
        }
    }
}

impl fmt::Display for ProofResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofResult::Proven => write!(f, "PROVEN"),
            ProofResult::Disproven(values) => write!(f, "DISPROVEN by {}", values),
            ProofResult::Inconclusive => write!(f, "INCONCLUSIVE"),
        }
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ProofError {
    /// The oracle ran out of time, or there was no time left to call it.
    #[error("time limit {budget:?} exceeded for N={n} (elapsed {elapsed:?})")]
    Timeout { n: usize, budget: Duration, elapsed: Duration },
    #[error("solver fault for N={n}: {fault}")]
    Oracle { n: usize, fault: OracleFault },
}

impl ProofError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProofError::Timeout { .. })
    }
}

/// Counters of one proof attempt.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct AttemptStats {
    /// Oracle calls made.
    pub oracle_calls: usize,
    /// Blocking constraints added.
    pub refinements: usize,
    /// Constraints in the last problem handed to the oracle.
    pub constraints: usize,
    pub elapsed: Duration,
}

/// Parameters shared by both drivers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DriverOptions {
    pub team_size: usize,
    pub value_bound: usize,
    /// Passed through to the oracle.
    pub workers: usize,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            team_size: crate::model::TEAM_SIZE,
            value_bound: crate::model::VALUE_BOUND,
            workers: 1,
        }
    }
}

/// A strategy that settles one sequence length within a time budget.
pub trait Prover {
    fn prove(&mut self, n: usize, budget: Duration) -> Result<Verdict, ProofError>;

    /// Counters of the most recent attempt.
    fn stats(&self) -> AttemptStats;
}
