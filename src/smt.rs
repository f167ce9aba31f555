//! [`SolverOracle`] backed by the Z3 SMT solver.
//!
//! Every variable of a [`ConstraintProblem`] becomes a Z3 integer constant
//! bounded by its domain, and every constraint becomes one assertion. A fresh
//! solver is created per call, so nothing carries over between refinement
//! rounds. The time budget is passed to Z3 as its `timeout` parameter; an
//! `unknown` answer is reported as [`OracleStatus::TimeLimitExceeded`].

use std::sync::Once;
use std::time::Instant;

use log::debug;
use z3::ast::{Bool, Int};
use z3::{Model, Params, SatResult, Solver};

use crate::oracle::{OracleFault, OracleStatus, SolveLimits, SolverOracle};
use crate::problem::{Assignment, Constraint, ConstraintProblem, LinOp, VarId};

static PARALLEL: Once = Once::new();

#[derive(Debug, Default)]
pub struct Z3Oracle {
    calls: u64,
}

impl Z3Oracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `solve` calls so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

/// `sum(coef * var)` as a Z3 term.
fn linear_sum(terms: &[(i64, VarId)], vars: &[Int]) -> Int {
    terms.iter().fold(Int::from_i64(0), |acc, &(a, x)| {
        let v = &vars[x.index()];
        match a {
            1 => &acc + v,
            -1 => &acc - v,
            _ => &acc + &(&Int::from_i64(a) * v),
        }
    })
}

fn encode(constraint: &Constraint, vars: &[Int]) -> Bool {
    match constraint {
        Constraint::Linear(lin) => {
            let lhs = linear_sum(&lin.terms, vars);
            let rhs = Int::from_i64(lin.rhs);
            match lin.op {
                LinOp::LessEq => lhs.le(&rhs),
                LinOp::Equal => lhs.eq(&rhs),
                LinOp::NotEqual => lhs.eq(&rhs).not(),
            }
        }
        Constraint::ReifiedEq { flag, var, value } => {
            let on = vars[flag.index()].eq(&Int::from_i64(1));
            let hit = vars[var.index()].eq(&Int::from_i64(*value));
            on.eq(&hit)
        }
    }
}

fn read_assignment(model: &Model, vars: &[Int]) -> Result<Assignment, OracleFault> {
    let values = vars
        .iter()
        .map(|x| {
            model
                .eval(x, true)
                .and_then(|v| v.as_i64())
                .ok_or_else(|| OracleFault::Unexpected(format!("no integer value for {} in the model", x)))
        })
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(Assignment::new(values))
}

impl SolverOracle for Z3Oracle {
    fn solve(&mut self, problem: &ConstraintProblem, limits: &SolveLimits) -> Result<OracleStatus, OracleFault> {
        self.calls += 1;
        if limits.time_budget.is_zero() {
            return Ok(OracleStatus::TimeLimitExceeded);
        }
        if limits.workers > 1 {
            // Global to the process, so it is set once
            let workers = limits.workers.to_string();
            PARALLEL.call_once(|| {
                z3::set_global_param("parallel.enable", "true");
                z3::set_global_param("parallel.threads.max", &workers);
            });
        }

        let start = Instant::now();
        let solver = Solver::new();
        let mut params = Params::new();
        let timeout_ms = u32::try_from(limits.time_budget.as_millis()).unwrap_or(u32::MAX).max(1);
        params.set_u32("timeout", timeout_ms);
        solver.set_params(&params);

        let vars: Vec<Int> = problem.vars().iter().map(|d| Int::fresh_const(&d.name)).collect();
        for (x, decl) in vars.iter().zip(problem.vars()) {
            solver.assert(&x.ge(&Int::from_i64(decl.domain.lo)));
            solver.assert(&x.le(&Int::from_i64(decl.domain.hi)));
        }
        for c in problem.constraints() {
            solver.assert(&encode(c, &vars));
        }

        let result = solver.check();
        debug!(
            "z3: {} on {} in {:.3} s (timeout {} ms)",
            match result {
                SatResult::Sat => "sat",
                SatResult::Unsat => "unsat",
                SatResult::Unknown => "unknown",
            },
            problem.stats(),
            start.elapsed().as_secs_f64(),
            timeout_ms
        );

        match result {
            SatResult::Unsat => Ok(OracleStatus::Unsat),
            SatResult::Unknown => Ok(OracleStatus::TimeLimitExceeded),
            SatResult::Sat => {
                let model = solver
                    .get_model()
                    .ok_or_else(|| OracleFault::Unexpected("SAT but no model available".to_string()))?;
                Ok(OracleStatus::Sat(read_assignment(&model, &vars)?))
            }
        }
    }
}
