//! Adapter for rustsat-compatible solver backends.
//!
//! Used for plain satisfiability checks, where no resolution trace is
//! needed. The adapter owns this crate's signed-integer clause surface
//! and keeps the backend at arm's length: clauses are buffered and
//! loaded in one batch when [`SatSolver::solve`] runs, an empty clause
//! short-circuits the solve without touching the backend at all, and a
//! satisfying assignment is read back once and cached for the model
//! queries that follow. Any backend implementing
//! `rustsat::solvers::Solve` fits; the default is batsat.

use rustsat::solvers::{Solve, SolverResult};
use rustsat::types::{Assignment, Clause, Lit, TernaryVal, Var};
use rustsat_batsat::BasicSolver;

use super::SatSolver;

/// A [`SatSolver`] backed by a rustsat solver.
pub struct BatsatSolver<S = BasicSolver> {
    solver: S,
    pending: Vec<Clause>,
    num_vars: u32,
    num_clauses: u32,
    empty_clause: bool,
    model: Option<Assignment>,
}

impl Default for BatsatSolver<BasicSolver> {
    fn default() -> Self {
        Self::new(BasicSolver::default())
    }
}

impl<S> BatsatSolver<S> {
    /// Wraps the given rustsat backend.
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            pending: Vec::new(),
            num_vars: 0,
            num_clauses: 0,
            empty_clause: false,
            model: None,
        }
    }

    /// Converts one signed literal, widening the variable range when a
    /// clause mentions a variable past the declared count.
    fn literal(&mut self, lit: i32) -> Lit {
        debug_assert_ne!(lit, 0, "0 is not a literal");
        let index = lit.unsigned_abs() - 1;
        if index >= self.num_vars {
            self.num_vars = index + 1;
        }
        let var = Var::new(index);
        if lit < 0 {
            var.neg_lit()
        } else {
            var.pos_lit()
        }
    }
}

impl<S: Solve> SatSolver for BatsatSolver<S> {
    fn add_variables(&mut self, n: u32) {
        self.num_vars += n;
    }

    fn add_clause(&mut self, literals: &[i32]) -> bool {
        self.num_clauses += 1;
        if literals.is_empty() {
            self.empty_clause = true;
            return false;
        }
        let lits: Vec<Lit> = literals.iter().map(|&l| self.literal(l)).collect();
        self.pending.push(Clause::from(&lits[..]));
        true
    }

    fn solve(&mut self) -> bool {
        self.model = None;
        if self.empty_clause {
            self.pending.clear();
            return false;
        }
        for clause in self.pending.drain(..) {
            if self.solver.add_clause(clause).is_err() {
                return false;
            }
        }
        if !matches!(self.solver.solve(), Ok(SolverResult::Sat)) {
            return false;
        }
        if self.num_vars > 0 {
            self.model = self.solver.solution(Var::new(self.num_vars - 1)).ok();
        }
        true
    }

    fn value_of(&self, var: u32) -> bool {
        if var == 0 || var > self.num_vars {
            return false;
        }
        match &self.model {
            Some(model) => matches!(model.var_value(Var::new(var - 1)), TernaryVal::True),
            None => false,
        }
    }

    fn num_variables(&self) -> u32 {
        self.num_vars
    }

    fn num_clauses(&self) -> u32 {
        self.num_clauses
    }
}
