//! Counter-example guided refinement for one sequence length.
//!
//! ```text
//!         +--------------------------------------------+
//!         v                                            |
//! build(base + blocking) --> oracle --SAT--> finder --pair--> block it
//!                              |                |
//!                            UNSAT            none
//!                              v                v
//!                           Proven         Disproven
//! ```
//!
//! The oracle searches for sequences *without* two disjoint equal teams. A
//! SAT answer that still contains such a pair means the model is too loose, so
//! the pair is blocked and the oracle asked again. Blocking constraints only
//! accumulate, and each disjoint pair can be blocked at most once, which
//! bounds the number of rounds.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::finder::find_disjoint_equal_sum_pair;
use crate::model::ModelBuilder;
use crate::oracle::{validate, OracleFault, OracleStatus, SolveLimits, SolverOracle};
use crate::proof::{AttemptStats, DriverOptions, ProofError, Prover, Verdict};
use crate::subsets::{disjoint_pair_bound, SubsetCache};
use crate::types::{BlockingConstraint, ValueSequence};

pub struct CegarDriver<O> {
    oracle: O,
    options: DriverOptions,
    cache: SubsetCache,
    blocking: Vec<BlockingConstraint>,
    seen: HashSet<BlockingConstraint>,
    stats: AttemptStats,
}

impl<O: SolverOracle> CegarDriver<O> {
    pub fn new(oracle: O, options: DriverOptions) -> Self {
        Self {
            oracle,
            options,
            cache: SubsetCache::new(),
            blocking: Vec::new(),
            seen: HashSet::new(),
            stats: AttemptStats::default(),
        }
    }

    /// Blocking constraints of the most recent attempt, in insertion order.
    pub fn blocking(&self) -> &[BlockingConstraint] {
        &self.blocking
    }

    pub fn cache(&self) -> &SubsetCache {
        &self.cache
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Decides whether every admissible sequence of length `n` contains two
    /// disjoint equal teams, spending at most `budget` of wall-clock time.
    ///
    /// # Panics
    ///
    /// Panics if `n` is smaller than the team size or larger than
    /// [`MAX_LEN`][crate::types::MAX_LEN].
    pub fn prove_with_cegar(&mut self, n: usize, budget: Duration) -> Result<Verdict, ProofError> {
        let start = Instant::now();
        let result = self.refine(n, budget, start);
        self.stats.elapsed = start.elapsed();
        result
    }

    fn refine(&mut self, n: usize, budget: Duration, start: Instant) -> Result<Verdict, ProofError> {
        let k = self.options.team_size;
        let builder = ModelBuilder::new(n, k, self.options.value_bound);
        self.blocking.clear();
        self.seen.clear();
        self.stats = AttemptStats::default();

        info!(
            "N={}: refining over at most {} disjoint pairs",
            n,
            disjoint_pair_bound(n, k)
        );

        loop {
            let problem = builder.build_with_blocking(&self.blocking);
            self.stats.constraints = problem.constraints().len();

            let elapsed = start.elapsed();
            let remaining = budget.saturating_sub(elapsed);
            if remaining.is_zero() {
                return Err(ProofError::Timeout { n, budget, elapsed });
            }

            self.stats.oracle_calls += 1;
            let limits = SolveLimits::new(remaining, self.options.workers);
            let status = self
                .oracle
                .solve(&problem, &limits)
                .and_then(|status| validate(&problem, status))
                .map_err(|fault| ProofError::Oracle { n, fault })?;

            match status {
                OracleStatus::Unsat => {
                    info!("N={}: UNSAT after {} refinements", n, self.blocking.len());
                    return Ok(Verdict::Proven);
                }
                OracleStatus::TimeLimitExceeded => {
                    return Err(ProofError::Timeout {
                        n,
                        budget,
                        elapsed: start.elapsed(),
                    });
                }
                OracleStatus::Sat(assignment) => {
                    let values = problem.score_values(&assignment);
                    let Some(pair) = find_disjoint_equal_sum_pair(&values, k, &mut self.cache) else {
                        info!("N={}: counter-example {:?}", n, values);
                        return Ok(Verdict::Disproven(ValueSequence::new(values)));
                    };

                    let constraint = BlockingConstraint::new(pair.earlier, pair.later);
                    if !self.seen.insert(constraint) {
                        let fault = OracleFault::Unexpected(format!("already blocked {} returned again", constraint));
                        return Err(ProofError::Oracle { n, fault });
                    }
                    debug!(
                        "N={}: refinement #{}: {} (sum {}) in {:?}",
                        n,
                        self.blocking.len() + 1,
                        constraint,
                        pair.sum,
                        values
                    );
                    self.blocking.push(constraint);
                    self.stats.refinements += 1;
                }
            }
        }
    }
}

impl<O: SolverOracle> Prover for CegarDriver<O> {
    fn prove(&mut self, n: usize, budget: Duration) -> Result<Verdict, ProofError> {
        self.prove_with_cegar(n, budget)
    }

    fn stats(&self) -> AttemptStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::finder::has_disjoint_equal_sum_pair_naive;
    use crate::smt::Z3Oracle;

    fn driver(value_bound: usize) -> CegarDriver<Z3Oracle> {
        let options = DriverOptions {
            team_size: 5,
            value_bound,
            workers: 1,
        };
        CegarDriver::new(Z3Oracle::new(), options)
    }

    #[test]
    fn test_base_model_unsat() {
        // Eleven values from {1, 2} always have at least 5 duplicate pairs
        let mut d = driver(2);
        let verdict = d.prove_with_cegar(11, Duration::from_secs(60)).unwrap();
        assert_eq!(verdict, Verdict::Proven);
        assert_eq!(d.stats().oracle_calls, 1);
        assert!(d.blocking().is_empty());
    }

    #[test]
    fn test_disproven_below_threshold() {
        let mut d = driver(6);
        let verdict = d.prove_with_cegar(10, Duration::from_secs(60)).unwrap();
        let values = verdict.counterexample().expect("a counter-example").values().to_vec();
        let builder = ModelBuilder::new(10, 5, 6);
        assert!(builder.admits(&values));
        assert!(!has_disjoint_equal_sum_pair_naive(&values, 5));
        assert_eq!(d.stats().oracle_calls, d.stats().refinements + 1);
    }

    #[test]
    fn test_blocking_grows_without_duplicates() {
        let mut d = driver(4);
        let _ = d.prove_with_cegar(11, Duration::from_secs(60)).unwrap();
        let blocking = d.blocking().to_vec();
        let unique: HashSet<_> = blocking.iter().copied().collect();
        assert_eq!(unique.len(), blocking.len());
        assert_eq!(d.stats().refinements, blocking.len());
        for c in &blocking {
            assert!(c.left.is_disjoint(c.right));
            assert_eq!(c.left.len(), 5);
            assert_eq!(c.right.len(), 5);
        }
    }

    #[test]
    fn test_zero_budget_times_out() {
        let mut d = driver(100);
        let err = d.prove_with_cegar(14, Duration::ZERO).unwrap_err();
        assert!(matches!(err, ProofError::Timeout { n: 14, .. }));
        assert_eq!(d.stats().oracle_calls, 0);
        assert_eq!(d.oracle().calls(), 0);
    }

    #[test]
    fn test_attempts_are_independent() {
        let mut d = driver(4);
        let _ = d.prove_with_cegar(11, Duration::from_secs(60)).unwrap();
        let _ = d.prove_with_cegar(10, Duration::from_secs(60)).unwrap();
        // Blocking pairs from N=11 must not leak into N=10
        assert!(d.blocking().iter().all(|c| (c.left.mask() | c.right.mask()) < (1 << 10)));
        assert_eq!(d.stats().refinements, d.blocking().len());
        assert_eq!(d.cache().misses(), 2);
    }
}
