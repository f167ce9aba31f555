//! The base model: "a score sequence of length N without two disjoint teams of
//! equal sum", plus symmetry breaking and cheap necessary conditions.
//!
//! Every call to [`ModelBuilder::build_base_problem`] creates an independent
//! problem. The builder holds only the parameters, never solver state, so
//! refinement iterations cannot leak constraints into each other.

use log::debug;

use crate::problem::{ConstraintProblem, LinOp, VarId};
use crate::types::{BlockingConstraint, MAX_LEN};

/// Default team size.
pub const TEAM_SIZE: usize = 5;
/// Default upper bound on scores.
pub const VALUE_BOUND: usize = 100;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ModelBuilder {
    n: usize,
    team_size: usize,
    value_bound: usize,
}

impl ModelBuilder {
    /// # Panics
    ///
    /// Panics unless `1 <= team_size <= n <= MAX_LEN` and `value_bound >= 1`.
    pub fn new(n: usize, team_size: usize, value_bound: usize) -> Self {
        assert!(team_size >= 1, "Team size must be >= 1");
        assert!(team_size <= n, "Sequence length {} is smaller than team size {}", n, team_size);
        assert!(n <= MAX_LEN, "Sequence length {} exceeds {}", n, MAX_LEN);
        assert!(value_bound >= 1, "Value bound must be >= 1");
        Self {
            n,
            team_size,
            value_bound,
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn team_size(&self) -> usize {
        self.team_size
    }

    pub fn value_bound(&self) -> usize {
        self.value_bound
    }

    /// Distance between two positions that must differ.
    ///
    /// In a sorted sequence, `score[i] == score[i + 2k - 1]` means 2k equal
    /// values, which split into two equal teams.
    pub fn run_offset(&self) -> usize {
        2 * self.team_size - 1
    }

    /// Largest allowed total of `floor(count_v / 2)` over all values `v`.
    ///
    /// With k duplicate pairs, one copy of each forms a team and the other
    /// copies form an equal one.
    pub fn max_duplicate_pairs(&self) -> usize {
        self.team_size - 1
    }

    /// Builds the base problem: scores in `[1, value_bound]`, `score[0] = 1`,
    /// non-decreasing, no long runs, bounded duplicate pairs.
    pub fn build_base_problem(&self) -> ConstraintProblem {
        let n = self.n;
        let bound = self.value_bound as i64;
        let mut problem = ConstraintProblem::new();

        let score: Vec<VarId> = (0..n).map(|i| problem.new_int_var(format!("score[{}]", i), 1, bound)).collect();

        // Symmetry breaking: minimum is 1, sequence is sorted
        problem.add_eq_const(score[0], 1);
        for i in 0..n - 1 {
            problem.add_le(score[i], score[i + 1]);
        }

        let offset = self.run_offset();
        for i in 0..n.saturating_sub(offset) {
            problem.add_ne(score[i], score[i + offset]);
        }

        // pairs[v] = floor(count_v / 2), encoded as 2*pairs[v] <= count_v <= 2*pairs[v] + 1
        let mut pairs = Vec::with_capacity(self.value_bound);
        for v in 1..=bound {
            let eq: Vec<VarId> = (0..n)
                .map(|i| {
                    let b = problem.new_bool_var(format!("eq[{}][{}]", v, i));
                    problem.add_reified_eq(b, score[i], v);
                    b
                })
                .collect();
            let p = problem.new_int_var(format!("pairs[{}]", v), 0, (n / 2) as i64);

            problem.add_linear(
                std::iter::once((2, p)).chain(eq.iter().map(|&b| (-1, b))),
                LinOp::LessEq,
                0,
            );
            problem.add_linear(
                std::iter::once((-2, p)).chain(eq.iter().map(|&b| (1, b))),
                LinOp::LessEq,
                1,
            );
            pairs.push(p);
        }
        problem.add_linear(
            pairs.iter().map(|&p| (1, p)),
            LinOp::LessEq,
            self.max_duplicate_pairs() as i64,
        );

        problem.set_scores(score);
        debug!("Base problem for n={}: {}", n, problem.stats());
        problem
    }

    /// Adds `sum(left) != sum(right)` over the score variables.
    pub fn add_blocking(&self, problem: &mut ConstraintProblem, constraint: &BlockingConstraint) {
        let score = problem.scores().to_vec();
        let terms = constraint
            .left
            .indices()
            .map(|i| (1, score[i]))
            .chain(constraint.right.indices().map(|i| (-1, score[i])));
        problem.add_linear(terms, LinOp::NotEqual, 0);
    }

    /// Base problem plus all given blocking constraints.
    pub fn build_with_blocking(&self, blocking: &[BlockingConstraint]) -> ConstraintProblem {
        let mut problem = self.build_base_problem();
        for constraint in blocking {
            self.add_blocking(&mut problem, constraint);
        }
        problem
    }

    /// Returns `true` if the concrete sequence satisfies every base-model
    /// constraint.
    pub fn admits(&self, values: &[i64]) -> bool {
        let bound = self.value_bound as i64;
        if values.len() != self.n || values[0] != 1 {
            return false;
        }
        if values.iter().any(|&v| v < 1 || v > bound) {
            return false;
        }
        if values.windows(2).any(|w| w[0] > w[1]) {
            return false;
        }
        let offset = self.run_offset();
        if (0..self.n.saturating_sub(offset)).any(|i| values[i] == values[i + offset]) {
            return false;
        }
        let mut counts = vec![0usize; self.value_bound + 1];
        for &v in values {
            counts[v as usize] += 1;
        }
        let pairs: usize = counts.iter().map(|c| c / 2).sum();
        pairs <= self.max_duplicate_pairs()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::problem::Assignment;
    use crate::types::Subset;

    /// Extends a score sequence to a full assignment of the base problem.
    fn complete(builder: &ModelBuilder, problem: &ConstraintProblem, values: &[i64]) -> Assignment {
        let mut full = vec![0; problem.num_vars()];
        let n = builder.n();
        full[..n].copy_from_slice(values);
        // Layout per value v: n indicators followed by the pair counter
        for v in 1..=builder.value_bound() {
            let base = n + (v - 1) * (n + 1);
            let mut count = 0;
            for i in 0..n {
                let hit = values[i] == v as i64;
                full[base + i] = hit as i64;
                count += hit as i64;
            }
            full[base + n] = count / 2;
        }
        Assignment::new(full)
    }

    #[test]
    fn test_problem_shape() {
        let builder = ModelBuilder::new(17, 5, 100);
        let problem = builder.build_base_problem();
        let stats = problem.stats();
        assert_eq!(stats.vars, 17 + 100 * 18);
        assert_eq!(stats.equal, 1);
        assert_eq!(stats.less_eq, 16 + 2 * 100 + 1);
        assert_eq!(stats.not_equal, 8);
        assert_eq!(stats.reified, 1700);
        assert_eq!(problem.scores().len(), 17);
    }

    #[test]
    fn test_admits_agrees_with_problem() {
        let builder = ModelBuilder::new(10, 5, 6);
        let problem = builder.build_base_problem();
        let cases: [[i64; 10]; 6] = [
            [1, 1, 2, 2, 3, 3, 4, 4, 5, 6],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 1, 2, 2, 3, 3, 4, 4, 5, 5],
            [1, 2, 3, 4, 5, 6, 7, 7, 7, 7],
            [2, 2, 3, 3, 4, 4, 5, 5, 6, 6],
            [1, 3, 2, 4, 5, 6, 6, 5, 4, 3],
        ];
        let expected = [true, false, false, false, false, false];
        for (values, &ok) in cases.iter().zip(&expected) {
            assert_eq!(builder.admits(values), ok, "values = {:?}", values);
            if values.windows(2).all(|w| w[0] <= w[1]) {
                let full = complete(&builder, &problem, values);
                assert_eq!(problem.check(&full).is_ok(), ok, "values = {:?}", values);
            }
        }
    }

    #[test]
    fn test_blocking() {
        let builder = ModelBuilder::new(10, 5, 6);
        let blocking = BlockingConstraint::new(
            Subset::from_indices([0, 1, 2, 3, 4]),
            Subset::from_indices([5, 6, 7, 8, 9]),
        );
        let problem = builder.build_with_blocking(&[blocking]);
        assert_eq!(problem.stats().not_equal, builder.build_base_problem().stats().not_equal + 1);

        // 1+1+2+2+3 = 9, 3+4+4+5+6 = 22
        let values = [1, 1, 2, 2, 3, 3, 4, 4, 5, 6];
        assert!(problem.check(&complete(&builder, &problem, &values)).is_ok());
        assert!(!blocking.is_violated_by(&values));
    }

    #[test]
    #[should_panic(expected = "smaller than team size")]
    fn test_too_short_panics() {
        ModelBuilder::new(4, 5, 100);
    }

    #[test]
    fn test_derived_constants() {
        let builder = ModelBuilder::new(17, TEAM_SIZE, VALUE_BOUND);
        assert_eq!(builder.run_offset(), 9);
        assert_eq!(builder.max_duplicate_pairs(), 4);
    }
}
