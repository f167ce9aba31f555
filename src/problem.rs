//! Declarative constraint problems handed to a solver oracle.
//!
//! A [`ConstraintProblem`] is plain data: integer variables with interval
//! domains, linear constraints over them, and reified equalities. It knows
//! nothing about how it will be solved; see [`crate::oracle`] for that
//! boundary and [`crate::search`] for the bundled engine.

use std::fmt;

/// Handle of a variable inside one [`ConstraintProblem`] (0-indexed).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(u32);

impl VarId {
    pub fn new(index: usize) -> Self {
        VarId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Closed integer interval `[lo, hi]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Domain {
    pub lo: i64,
    pub hi: i64,
}

impl Domain {
    pub fn new(lo: i64, hi: i64) -> Self {
        Domain { lo, hi }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.lo <= value && value <= self.hi
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub domain: Domain,
}

/// Comparison between a linear sum and its right-hand side.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LinOp {
    /// Sum is less than or equal to the constant
    LessEq,
    /// Sum is equal to the constant
    Equal,
    /// Sum is not equal to the constant
    NotEqual,
}

impl fmt::Display for LinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinOp::LessEq => write!(f, "<="),
            LinOp::Equal => write!(f, "=="),
            LinOp::NotEqual => write!(f, "!="),
        }
    }
}

/// `sum(coef * var) <op> rhs`
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Linear {
    pub terms: Vec<(i64, VarId)>,
    pub op: LinOp,
    pub rhs: i64,
}

impl Linear {
    /// Evaluates the left-hand side under `values`.
    ///
    /// Products are exact in `i128`; `None` if the sum leaves that range.
    pub fn lhs(&self, values: &[i64]) -> Option<i128> {
        self.terms.iter().try_fold(0i128, |acc, &(a, x)| {
            acc.checked_add(i128::from(a) * i128::from(values[x.index()]))
        })
    }

    /// An assignment whose left-hand side cannot be evaluated never satisfies
    /// the constraint.
    pub fn holds(&self, values: &[i64]) -> bool {
        let Some(lhs) = self.lhs(values) else {
            return false;
        };
        let rhs = i128::from(self.rhs);
        match self.op {
            LinOp::LessEq => lhs <= rhs,
            LinOp::Equal => lhs == rhs,
            LinOp::NotEqual => lhs != rhs,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Constraint {
    Linear(Linear),
    /// `flag <-> (var == value)`, where `flag` is a 0/1 variable.
    ReifiedEq { flag: VarId, var: VarId, value: i64 },
}

impl Constraint {
    pub fn holds(&self, values: &[i64]) -> bool {
        match self {
            Constraint::Linear(lin) => lin.holds(values),
            Constraint::ReifiedEq { flag, var, value } => {
                let f = values[flag.index()];
                (f == 0 || f == 1) && (f == 1) == (values[var.index()] == *value)
            }
        }
    }

    /// Variables mentioned by the constraint, possibly with repeats.
    pub fn vars(&self) -> Vec<VarId> {
        match self {
            Constraint::Linear(lin) => lin.terms.iter().map(|&(_, x)| x).collect(),
            Constraint::ReifiedEq { flag, var, .. } => vec![*flag, *var],
        }
    }
}

/// Values for every variable of a problem, indexed by [`VarId`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Assignment(Vec<i64>);

impl Assignment {
    pub fn new(values: Vec<i64>) -> Self {
        Assignment(values)
    }

    pub fn value(&self, var: VarId) -> i64 {
        self.0[var.index()]
    }

    pub fn values(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Constraint counts, for logging.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ProblemStats {
    pub vars: usize,
    pub less_eq: usize,
    pub equal: usize,
    pub not_equal: usize,
    pub reified: usize,
}

impl fmt::Display for ProblemStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vars, {} <=, {} ==, {} !=, {} reified",
            self.vars, self.less_eq, self.equal, self.not_equal, self.reified
        )
    }
}

/// A satisfaction problem over bounded integer variables.
///
/// The problem also remembers which variables hold the scores, so that a
/// solver assignment can be read back as a value sequence.
#[derive(Debug, Clone, Default)]
pub struct ConstraintProblem {
    vars: Vec<VarDecl>,
    constraints: Vec<Constraint>,
    scores: Vec<VarId>,
}

impl ConstraintProblem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_int_var(&mut self, name: impl Into<String>, lo: i64, hi: i64) -> VarId {
        let id = VarId::new(self.vars.len());
        self.vars.push(VarDecl {
            name: name.into(),
            domain: Domain::new(lo, hi),
        });
        id
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.new_int_var(name, 0, 1)
    }

    /// Adds `sum(coef * var) <op> rhs`.
    ///
    /// Repeated variables are merged and zero coefficients dropped.
    pub fn add_linear(&mut self, terms: impl IntoIterator<Item = (i64, VarId)>, op: LinOp, rhs: i64) {
        let mut terms: Vec<(i64, VarId)> = terms.into_iter().collect();
        terms.sort_by_key(|&(_, x)| x);
        let mut merged: Vec<(i64, VarId)> = Vec::with_capacity(terms.len());
        for (a, x) in terms {
            match merged.last_mut() {
                Some((b, y)) if *y == x => *b += a,
                _ => merged.push((a, x)),
            }
        }
        merged.retain(|&(a, _)| a != 0);
        self.constraints.push(Constraint::Linear(Linear { terms: merged, op, rhs }));
    }

    /// Adds `x <= y`.
    pub fn add_le(&mut self, x: VarId, y: VarId) {
        self.add_linear([(1, x), (-1, y)], LinOp::LessEq, 0);
    }

    /// Adds `x == value`.
    pub fn add_eq_const(&mut self, x: VarId, value: i64) {
        self.add_linear([(1, x)], LinOp::Equal, value);
    }

    /// Adds `x != y`.
    pub fn add_ne(&mut self, x: VarId, y: VarId) {
        self.add_linear([(1, x), (-1, y)], LinOp::NotEqual, 0);
    }

    /// Adds `flag <-> (var == value)`.
    pub fn add_reified_eq(&mut self, flag: VarId, var: VarId, value: i64) {
        self.constraints.push(Constraint::ReifiedEq { flag, var, value });
    }

    pub fn set_scores(&mut self, scores: Vec<VarId>) {
        self.scores = scores;
    }

    /// Variables holding the score sequence, in order.
    pub fn scores(&self) -> &[VarId] {
        &self.scores
    }

    pub fn vars(&self) -> &[VarDecl] {
        &self.vars
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Reads the score sequence out of an assignment.
    pub fn score_values(&self, assignment: &Assignment) -> Vec<i64> {
        self.scores.iter().map(|&x| assignment.value(x)).collect()
    }

    /// Checks `assignment` against every domain and constraint.
    ///
    /// `Err(Some(i))` names the first violated constraint. `Err(None)` means
    /// the assignment has the wrong length or leaves some domain.
    pub fn check(&self, assignment: &Assignment) -> Result<(), Option<usize>> {
        if assignment.len() != self.vars.len() {
            return Err(None);
        }
        let values = assignment.values();
        if self.vars.iter().zip(values).any(|(decl, &v)| !decl.domain.contains(v)) {
            return Err(None);
        }
        match self.constraints.iter().position(|c| !c.holds(values)) {
            Some(i) => Err(Some(i)),
            None => Ok(()),
        }
    }

    pub fn stats(&self) -> ProblemStats {
        let mut stats = ProblemStats {
            vars: self.vars.len(),
            ..Default::default()
        };
        for c in &self.constraints {
            match c {
                Constraint::Linear(lin) => match lin.op {
                    LinOp::LessEq => stats.less_eq += 1,
                    LinOp::Equal => stats.equal += 1,
                    LinOp::NotEqual => stats.not_equal += 1,
                },
                Constraint::ReifiedEq { .. } => stats.reified += 1,
            }
        }
        stats
    }
}
