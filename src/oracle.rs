//! The solver boundary.
//!
//! A [`SolverOracle`] takes a [`ConstraintProblem`] and [`SolveLimits`] and
//! answers with exactly one [`OracleStatus`]. Anything else it might want to
//! say is an [`OracleFault`], which the drivers never try to interpret.

use std::time::Duration;

use thiserror::Error;

use crate::problem::{Assignment, ConstraintProblem};

/// Per-call resource limits.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SolveLimits {
    /// Wall-clock budget for this call.
    pub time_budget: Duration,
    /// Number of parallel search workers the oracle may use.
    pub workers: usize,
}

impl SolveLimits {
    pub fn new(time_budget: Duration, workers: usize) -> Self {
        Self { time_budget, workers }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum OracleStatus {
    /// The problem has no solution.
    Unsat,
    /// A solution, with a value for every variable of the problem.
    Sat(Assignment),
    /// The budget ran out before a determination.
    TimeLimitExceeded,
}

/// Oracle behaviour outside the modeled outcomes.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum OracleFault {
    #[error("assignment violates the problem it solves ({0})")]
    InvalidAssignment(String),
    #[error("unexpected solver outcome: {0}")]
    Unexpected(String),
}

/// A constraint solver seen as a black box.
pub trait SolverOracle {
    fn solve(&mut self, problem: &ConstraintProblem, limits: &SolveLimits) -> Result<OracleStatus, OracleFault>;
}

impl<O: SolverOracle + ?Sized> SolverOracle for &mut O {
    fn solve(&mut self, problem: &ConstraintProblem, limits: &SolveLimits) -> Result<OracleStatus, OracleFault> {
        (**self).solve(problem, limits)
    }
}

/// Checks a `Sat` answer against the problem it claims to solve.
///
/// Other statuses pass through unchanged.
pub fn validate(problem: &ConstraintProblem, status: OracleStatus) -> Result<OracleStatus, OracleFault> {
    if let OracleStatus::Sat(assignment) = &status {
        match problem.check(assignment) {
            Ok(()) => {}
            Err(Some(i)) => {
                return Err(OracleFault::InvalidAssignment(format!(
                    "constraint #{} = {:?}",
                    i,
                    problem.constraints()[i]
                )))
            }
            Err(None) => {
                return Err(OracleFault::InvalidAssignment(
                    "wrong length or value outside its domain".to_string(),
                ))
            }
        }
    }
    Ok(status)
}
