//! Non-incremental strategy: block every disjoint pair up front, ask once.
//!
//! The model has `C(n, k) * C(n - k, k) / 2` extra constraints, far more than
//! refinement usually needs, but it makes a single oracle call and serves as
//! an independent cross-check of [`CegarDriver`][crate::cegar::CegarDriver].

use std::time::{Duration, Instant};

use log::info;

use crate::finder::find_disjoint_equal_sum_pair;
use crate::model::ModelBuilder;
use crate::oracle::{validate, OracleFault, OracleStatus, SolveLimits, SolverOracle};
use crate::problem::ConstraintProblem;
use crate::proof::{AttemptStats, DriverOptions, ProofError, Prover, Verdict};
use crate::subsets::SubsetCache;
use crate::types::{BlockingConstraint, ValueSequence};

pub struct StaticDriver<O> {
    oracle: O,
    options: DriverOptions,
    cache: SubsetCache,
    stats: AttemptStats,
}

impl<O: SolverOracle> StaticDriver<O> {
    pub fn new(oracle: O, options: DriverOptions) -> Self {
        Self {
            oracle,
            options,
            cache: SubsetCache::new(),
            stats: AttemptStats::default(),
        }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Base problem plus `sum(T_i) != sum(T_j)` for every disjoint pair
    /// `i < j` in enumeration order.
    pub fn build_static_problem(&mut self, n: usize) -> ConstraintProblem {
        let k = self.options.team_size;
        let builder = ModelBuilder::new(n, k, self.options.value_bound);
        let mut problem = builder.build_base_problem();
        let teams = self.cache.subsets(n, k);
        for (i, &t) in teams.iter().enumerate() {
            for &u in &teams[i + 1..] {
                if t.is_disjoint(u) {
                    builder.add_blocking(&mut problem, &BlockingConstraint::new(t, u));
                }
            }
        }
        problem
    }

    /// # Panics
    ///
    /// Panics if `n` is smaller than the team size or larger than
    /// [`MAX_LEN`][crate::types::MAX_LEN].
    pub fn solve_static(&mut self, n: usize, budget: Duration) -> Result<Verdict, ProofError> {
        let start = Instant::now();
        self.stats = AttemptStats::default();
        let result = self.solve_once(n, budget, start);
        self.stats.elapsed = start.elapsed();
        result
    }

    fn solve_once(&mut self, n: usize, budget: Duration, start: Instant) -> Result<Verdict, ProofError> {
        let problem = self.build_static_problem(n);
        self.stats.constraints = problem.constraints().len();
        info!("N={}: static model with {}", n, problem.stats());

        if budget.is_zero() {
            return Err(ProofError::Timeout {
                n,
                budget,
                elapsed: start.elapsed(),
            });
        }

        self.stats.oracle_calls = 1;
        let limits = SolveLimits::new(budget, self.options.workers);
        let status = self
            .oracle
            .solve(&problem, &limits)
            .and_then(|status| validate(&problem, status))
            .map_err(|fault| ProofError::Oracle { n, fault })?;

        match status {
            OracleStatus::Unsat => {
                info!("N={}: UNSAT (static model)", n);
                Ok(Verdict::Proven)
            }
            OracleStatus::Sat(assignment) => {
                let values = problem.score_values(&assignment);
                // Every disjoint pair is blocked, so the finder must come up empty
                if let Some(pair) = find_disjoint_equal_sum_pair(&values, self.options.team_size, &mut self.cache) {
                    let fault = OracleFault::Unexpected(format!("solution {:?} contains blocked pair {}", values, pair));
                    return Err(ProofError::Oracle { n, fault });
                }
                info!("N={}: counter-example {:?}", n, values);
                Ok(Verdict::Disproven(ValueSequence::new(values)))
            }
            OracleStatus::TimeLimitExceeded => Err(ProofError::Timeout {
                n,
                budget,
                elapsed: start.elapsed(),
            }),
        }
    }
}

impl<O: SolverOracle> Prover for StaticDriver<O> {
    fn prove(&mut self, n: usize, budget: Duration) -> Result<Verdict, ProofError> {
        self.solve_static(n, budget)
    }

    fn stats(&self) -> AttemptStats {
        self.stats
    }
}
