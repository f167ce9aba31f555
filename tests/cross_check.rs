//! Cross-checks of the two proof strategies against each other and against
//! brute-force enumeration on small score ranges.

use std::time::Duration;

use equal_teams::cegar::CegarDriver;
use equal_teams::finder::{find_disjoint_equal_sum_pair, has_disjoint_equal_sum_pair_naive};
use equal_teams::model::ModelBuilder;
use equal_teams::oracle::{OracleFault, OracleStatus, SolveLimits, SolverOracle};
use equal_teams::problem::{Assignment, ConstraintProblem};
use equal_teams::proof::{DriverOptions, ProofError, ProofResult, Prover, Verdict};
use equal_teams::smt::Z3Oracle;
use equal_teams::static_model::StaticDriver;
use equal_teams::subsets::SubsetCache;
use equal_teams::sweep::{run_sweep, Strategy, SweepConfig};

const BUDGET: Duration = Duration::from_secs(120);

fn options(value_bound: usize, workers: usize) -> DriverOptions {
    DriverOptions {
        team_size: 5,
        value_bound,
        workers,
    }
}

/// All sorted sequences of length `n` over `[1, bound]` starting with 1.
fn sorted_sequences(n: usize, bound: i64) -> Vec<Vec<i64>> {
    fn go(prefix: &mut Vec<i64>, n: usize, bound: i64, out: &mut Vec<Vec<i64>>) {
        if prefix.len() == n {
            out.push(prefix.clone());
            return;
        }
        let last = *prefix.last().unwrap();
        for v in last..=bound {
            prefix.push(v);
            go(prefix, n, bound, out);
            prefix.pop();
        }
    }
    let mut out = Vec::new();
    go(&mut vec![1], n, bound, &mut out);
    out
}

/// Ground truth: is every admitted sequence forced to contain a pair?
fn brute_force_proven(n: usize, bound: usize) -> bool {
    let builder = ModelBuilder::new(n, 5, bound);
    let mut cache = SubsetCache::new();
    sorted_sequences(n, bound as i64)
        .iter()
        .filter(|s| builder.admits(s))
        .all(|s| find_disjoint_equal_sum_pair(s, 5, &mut cache).is_some())
}

const GRID: [(usize, usize); 6] = [(10, 3), (10, 4), (10, 6), (11, 3), (11, 4), (11, 5)];

#[test]
fn cegar_and_static_agree_with_brute_force() {
    for (n, bound) in GRID {
        let expected = brute_force_proven(n, bound);

        let mut cegar = CegarDriver::new(Z3Oracle::new(), options(bound, 1));
        let mut fixed = StaticDriver::new(Z3Oracle::new(), options(bound, 1));
        let a = cegar.prove_with_cegar(n, BUDGET).unwrap();
        let b = fixed.solve_static(n, BUDGET).unwrap();

        assert_eq!(a.is_proven(), expected, "cegar, n={} bound={}", n, bound);
        assert_eq!(b.is_proven(), expected, "static, n={} bound={}", n, bound);

        for verdict in [&a, &b] {
            if let Some(values) = verdict.counterexample() {
                assert!(ModelBuilder::new(n, 5, bound).admits(values.values()));
                assert!(!has_disjoint_equal_sum_pair_naive(values.values(), 5));
            }
        }
    }
}

#[test]
fn full_score_range_length_fourteen_has_counterexample() {
    let mut driver = CegarDriver::new(Z3Oracle::new(), options(100, 1));
    let verdict = driver.prove_with_cegar(14, BUDGET).unwrap();
    let values = verdict.counterexample().expect("length 14 is below the threshold");
    assert_eq!(values.len(), 14);
    assert_eq!(values.values()[0], 1);
    assert!(values.values().windows(2).all(|w| w[0] <= w[1]));
    assert!(values.values().iter().all(|&v| (1..=100).contains(&v)));
    assert!(!has_disjoint_equal_sum_pair_naive(values.values(), 5));
    assert_eq!(driver.stats().oracle_calls, driver.stats().refinements + 1);
}

/// Delegates to Z3 until it sees a larger problem than the first one.
struct FailsOnGrowth {
    inner: Z3Oracle,
    first_size: Option<usize>,
}

impl SolverOracle for FailsOnGrowth {
    fn solve(&mut self, problem: &ConstraintProblem, limits: &SolveLimits) -> Result<OracleStatus, OracleFault> {
        let size = problem.vars().len();
        if *self.first_size.get_or_insert(size) < size {
            return Err(OracleFault::Unexpected("solver crashed".to_string()));
        }
        self.inner.solve(problem, limits)
    }
}

#[test]
fn sweep_fault_keeps_earlier_results() {
    let config = SweepConfig {
        time_limit: BUDGET,
        threads: 1,
        start: 10,
        end: 13,
        strategy: Strategy::Cegar,
        team_size: 5,
        value_bound: 3,
    };
    let oracle = FailsOnGrowth {
        inner: Z3Oracle::new(),
        first_size: None,
    };
    let mut printed = Vec::new();
    let err = run_sweep(&config, oracle, |a| printed.push(a.n)).unwrap_err();
    assert_eq!(printed, vec![10]);
    assert_eq!(err.partial.attempts.len(), 1);
    assert!(matches!(err.partial.attempts[0].result, ProofResult::Disproven(_)));
    assert!(matches!(err.source, ProofError::Oracle { n: 11, .. }));
}

/// Wraps an oracle and records how many `!=` constraints each problem had.
struct Recording<O> {
    inner: O,
    not_equal: Vec<usize>,
}

impl<O: SolverOracle> SolverOracle for Recording<O> {
    fn solve(&mut self, problem: &ConstraintProblem, limits: &SolveLimits) -> Result<OracleStatus, OracleFault> {
        self.not_equal.push(problem.stats().not_equal);
        self.inner.solve(problem, limits)
    }
}

#[test]
fn blocking_constraints_grow_by_one_per_round() {
    let oracle = Recording {
        inner: Z3Oracle::new(),
        not_equal: Vec::new(),
    };
    let mut driver = CegarDriver::new(oracle, options(5, 1));
    driver.prove_with_cegar(11, BUDGET).unwrap();

    let refinements = driver.stats().refinements;
    let counts = driver.into_oracle().not_equal;
    assert_eq!(counts.len(), refinements + 1);
    for w in counts.windows(2) {
        assert_eq!(w[1], w[0] + 1);
    }
}

/// Replays a fixed list of answers.
struct Scripted {
    answers: Vec<OracleStatus>,
    calls: usize,
}

impl SolverOracle for Scripted {
    fn solve(&mut self, _: &ConstraintProblem, _: &SolveLimits) -> Result<OracleStatus, OracleFault> {
        let answer = self.answers[self.calls].clone();
        self.calls += 1;
        Ok(answer)
    }
}

#[test]
fn oracle_time_limit_is_a_timeout() {
    let oracle = Scripted {
        answers: vec![OracleStatus::TimeLimitExceeded],
        calls: 0,
    };
    let mut driver = CegarDriver::new(oracle, options(100, 1));
    let err = driver.prove_with_cegar(12, BUDGET).unwrap_err();
    assert!(matches!(err, ProofError::Timeout { n: 12, .. }));
    assert_eq!(driver.oracle().calls, 1);
}

#[test]
fn bogus_assignment_is_a_fault() {
    let oracle = Scripted {
        answers: vec![OracleStatus::Sat(Assignment::new(vec![1, 2, 3]))],
        calls: 0,
    };
    let mut driver = CegarDriver::new(oracle, options(100, 1));
    let err = driver.prove_with_cegar(12, BUDGET).unwrap_err();
    assert!(matches!(
        err,
        ProofError::Oracle {
            n: 12,
            fault: OracleFault::InvalidAssignment(_)
        }
    ));
}

#[test]
fn static_and_cegar_share_the_prover_interface() {
    let provers: Vec<Box<dyn Prover>> = vec![
        Box::new(CegarDriver::new(Z3Oracle::new(), options(2, 1))),
        Box::new(StaticDriver::new(Z3Oracle::new(), options(2, 1))),
    ];
    for mut prover in provers {
        assert_eq!(prover.prove(11, BUDGET), Ok(Verdict::Proven));
        assert_eq!(prover.stats().oracle_calls, 1);
    }
}
