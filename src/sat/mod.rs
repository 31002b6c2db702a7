//! SAT backends: the solver traits, the batsat adapter, and the in-crate
//! proof-logging prover.
//!
//! Variables are 1-indexed and literals are signed integers, matching the
//! circuit labels emitted by [`crate::cnf`]. Plain satisfiability checks
//! go through any [`SatSolver`]; unsat-core extraction additionally needs
//! a [`SatProver`], which can report a [`ResolutionTrace`] and re-run
//! resolution under a [`ReductionStrategy`].

pub mod batsat;
pub mod prover;
mod trace;

pub use batsat::BatsatSolver;
pub use prover::CdclProver;
pub use trace::{ResolutionTrace, TraceClause};

/// A SAT solver backend.
pub trait SatSolver {
    /// Grows the variable set by `n` fresh variables.
    fn add_variables(&mut self, n: u32);

    /// Adds a clause of signed literals. Returns false if the clause made
    /// the problem trivially unsatisfiable.
    fn add_clause(&mut self, literals: &[i32]) -> bool;

    /// Solves the accumulated clauses. True means satisfiable.
    fn solve(&mut self) -> bool;

    /// Solves under any configured resource budget. `None` means the
    /// budget ran out before an answer was reached; backends without a
    /// budget never return it.
    fn solve_limited(&mut self) -> Option<bool> {
        Some(self.solve())
    }

    /// The model value of `var`. Meaningful only after [`SatSolver::solve`]
    /// returned true.
    fn value_of(&self, var: u32) -> bool;

    /// Number of variables.
    fn num_variables(&self) -> u32;

    /// Number of clauses added.
    fn num_clauses(&self) -> u32;
}

/// A solver that logs resolution and supports core refinement.
pub trait SatProver: SatSolver {
    /// The resolution trace of the last unsatisfiable [`SatSolver::solve`]
    /// or [`SatProver::reduce`] round.
    ///
    /// # Panics
    /// Panics if no unsatisfiable solve has completed.
    fn proof(&self) -> &ResolutionTrace;

    /// Iteratively re-runs resolution, letting `strategy` name original
    /// clauses to drop. A round that still refutes replaces the trace; a
    /// round that becomes satisfiable is rolled back, so the last known
    /// refutation is never lost.
    fn reduce(&mut self, strategy: &mut dyn ReductionStrategy);
}

/// Chooses which clauses to drop during core refinement.
pub trait ReductionStrategy {
    /// The indices of the original trace clauses to remove next; empty
    /// when minimization is finished. The trace passed in always reflects
    /// the most recent successful refutation, which is how a strategy
    /// learns whether its previous reduction held.
    fn next_reduction(&mut self, trace: &ResolutionTrace) -> Vec<usize>;
}
