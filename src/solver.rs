//! The solver facade: translation, CNF, SAT, and outcome decoding.
//!
//! [`Solver::solve`] runs the whole pipeline on the caller's thread:
//! skolemize outer existentials, translate to a circuit, conjoin the
//! symmetry-breaking predicate, clausify, and hand the clauses to a SAT
//! backend. Satisfiable problems decode into an [`Instance`]; with
//! translation logging on, unsatisfiable ones carry a [`Proof`] whose
//! high-level core can be minimized.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::ast::Formula;
use crate::bool::{IntEncoding, Options as CircuitOptions};
use crate::cnf;
use crate::error::{RelicError, Result};
use crate::fol2bool::{self, AnnotatedNode, Translation};
use crate::instance::{Bounds, Instance};
use crate::proof::Proof;
use crate::sat::{BatsatSolver, CdclProver, SatSolver};
use crate::skolem;
use crate::symmetry;

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum length of the symmetry-breaking predicate; 0 disables the
    /// pre-pass (default: 20).
    pub symmetry_breaking: usize,
    /// Integer circuit encoding (default: two's complement).
    pub int_encoding: IntEncoding,
    /// Bit width for two's-complement integers (default: 8).
    pub bitwidth: usize,
    /// Record the translation log; required for proofs and cores
    /// (default: false).
    pub log_translation: bool,
    /// Bounded flattening depth for circuit equality, at least 1
    /// (default: 3).
    pub comparison_depth: usize,
    /// Maximum universal-quantifier nesting under which existentials are
    /// skolemized: at depth 0 only existentials outside every universal
    /// get a constant witness relation, and each extra level admits
    /// function skolems over one more enclosing universal. `None`
    /// disables skolemization (default: depth 0).
    pub skolem_depth: Option<usize>,
    /// Share structurally equal gates (default: true).
    pub sharing: bool,
    /// Wall-clock budget for the SAT search; exhausting it yields
    /// [`Solution::Unknown`] (default: none).
    pub timeout: Option<Duration>,
    /// Cooperative cancel flag, polled at quantifier boundaries during
    /// translation (default: none).
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            symmetry_breaking: 20,
            int_encoding: IntEncoding::TwosComplement,
            bitwidth: 8,
            log_translation: false,
            comparison_depth: 3,
            skolem_depth: Some(0),
            sharing: true,
            timeout: None,
            cancel: None,
        }
    }
}

impl Options {
    fn circuit_options(&self) -> CircuitOptions {
        CircuitOptions {
            sharing: self.sharing,
            comparison_depth: self.comparison_depth,
            int_encoding: self.int_encoding,
            bitwidth: self.bitwidth,
        }
    }
}

/// Outcome of a solve.
pub enum Solution {
    /// Satisfiable; the SAT solver found a model.
    Sat {
        /// A satisfying instance.
        instance: Instance,
        /// Solve statistics.
        stats: Statistics,
    },
    /// Satisfiable without search: the root circuit reduced to TRUE, so
    /// the lower bounds already satisfy the formula.
    TriviallySat {
        /// The lower-bound instance.
        instance: Instance,
        /// Solve statistics.
        stats: Statistics,
    },
    /// Unsatisfiable; carries a proof when translation logging was on.
    Unsat {
        /// The refutation, if logging was enabled.
        proof: Option<Proof>,
        /// Solve statistics.
        stats: Statistics,
    },
    /// Unsatisfiable without search: the root circuit reduced to FALSE.
    TriviallyUnsat {
        /// A trivial proof, if logging was enabled.
        proof: Option<Proof>,
        /// Solve statistics.
        stats: Statistics,
    },
    /// The solver's budget ran out before an answer was reached.
    Unknown {
        /// Solve statistics.
        stats: Statistics,
    },
}

impl Solution {
    /// True for [`Solution::Sat`] and [`Solution::TriviallySat`].
    pub fn is_sat(&self) -> bool {
        matches!(self, Solution::Sat { .. } | Solution::TriviallySat { .. })
    }

    /// True for [`Solution::Unsat`] and [`Solution::TriviallyUnsat`].
    pub fn is_unsat(&self) -> bool {
        matches!(
            self,
            Solution::Unsat { .. } | Solution::TriviallyUnsat { .. }
        )
    }

    /// True if no SAT search ran.
    pub fn is_trivial(&self) -> bool {
        matches!(
            self,
            Solution::TriviallySat { .. } | Solution::TriviallyUnsat { .. }
        )
    }

    /// The satisfying instance, for satisfiable outcomes.
    pub fn instance(&self) -> Option<&Instance> {
        match self {
            Solution::Sat { instance, .. } | Solution::TriviallySat { instance, .. } => {
                Some(instance)
            }
            _ => None,
        }
    }

    /// The proof of unsatisfiability, when one was produced.
    pub fn proof(&self) -> Option<&Proof> {
        match self {
            Solution::Unsat { proof, .. } | Solution::TriviallyUnsat { proof, .. } => {
                proof.as_ref()
            }
            _ => None,
        }
    }

    /// The proof, consuming this solution. Needed for minimization, which
    /// mutates the proof's prover.
    pub fn into_proof(self) -> Option<Proof> {
        match self {
            Solution::Unsat { proof, .. } | Solution::TriviallyUnsat { proof, .. } => proof,
            _ => None,
        }
    }

    /// The statistics of this solve.
    pub fn statistics(&self) -> &Statistics {
        match self {
            Solution::Sat { stats, .. }
            | Solution::TriviallySat { stats, .. }
            | Solution::Unsat { stats, .. }
            | Solution::TriviallyUnsat { stats, .. }
            | Solution::Unknown { stats } => stats,
        }
    }
}

impl std::fmt::Debug for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Solution::Sat { .. } => "Sat",
            Solution::TriviallySat { .. } => "TriviallySat",
            Solution::Unsat { .. } => "Unsat",
            Solution::TriviallyUnsat { .. } => "TriviallyUnsat",
            Solution::Unknown { .. } => "Unknown",
        };
        write!(f, "Solution::{name}")
    }
}

/// Statistics collected during a solve.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    translation_time: Duration,
    solving_time: Duration,
    primary_variables: u32,
    num_variables: u32,
    num_clauses: u32,
}

impl Statistics {
    /// Time spent preparing the SAT problem: skolemization, translation,
    /// and symmetry breaking.
    pub fn translation_time(&self) -> Duration {
        self.translation_time
    }

    /// Time spent in the SAT backend.
    pub fn solving_time(&self) -> Duration {
        self.solving_time
    }

    /// Number of primary (relation) variables.
    pub fn primary_variables(&self) -> u32 {
        self.primary_variables
    }

    /// Total CNF variables.
    pub fn num_variables(&self) -> u32 {
        self.num_variables
    }

    /// Total CNF clauses.
    pub fn num_clauses(&self) -> u32 {
        self.num_clauses
    }
}

/// The model finder.
pub struct Solver {
    options: Options,
}

impl Solver {
    /// Creates a solver with the given options.
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// The solver's options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Decides the satisfiability of `formula` within `bounds`.
    ///
    /// # Errors
    /// Construction-level problems surface as errors: unbound leaves,
    /// higher-order declarations, capacity overflows, or cancellation.
    /// Unsatisfiability is an outcome, never an error.
    pub fn solve(&self, formula: &Formula, bounds: &Bounds) -> Result<Solution> {
        let start = Instant::now();

        let annotated = AnnotatedNode::new(formula);
        if annotated.uses_ints() && self.options.bitwidth < 2 {
            return Err(RelicError::InvalidArgument(
                "bitwidth must be at least 2 for integer constructs".to_string(),
            ));
        }

        // skolemize outer existentials, extending a private copy of the
        // bounds with the witness relations
        let mut final_bounds = bounds.clone();
        let final_formula = match self.options.skolem_depth {
            Some(depth) => skolem::skolemize(formula, &mut final_bounds, depth)?,
            None => formula.clone(),
        };

        let cancel = self.options.cancel.clone();
        let mut translation = fol2bool::translate(
            &final_formula,
            &final_bounds,
            &self.options.circuit_options(),
            self.options.log_translation,
            cancel.as_deref(),
        )?;

        if self.options.symmetry_breaking > 0 {
            let predicates = annotated.top_predicates();
            let sbp = symmetry::breaking_predicate(
                &final_bounds,
                &predicates,
                translation.interpreter(),
                translation.factory(),
                self.options.symmetry_breaking,
            );
            translation.conjoin(sbp);
        }

        let translation_time = start.elapsed();

        // a constant root never reaches the SAT solver
        match translation.root().constant_value() {
            Some(true) => {
                let instance = lower_bound_instance(&final_bounds)?;
                return Ok(Solution::TriviallySat {
                    instance,
                    stats: Statistics {
                        translation_time,
                        primary_variables: translation.num_primary_variables(),
                        ..Statistics::default()
                    },
                });
            }
            Some(false) => {
                let proof = translation.take_log().map(Proof::trivial);
                return Ok(Solution::TriviallyUnsat {
                    proof,
                    stats: Statistics {
                        translation_time,
                        primary_variables: translation.num_primary_variables(),
                        ..Statistics::default()
                    },
                });
            }
            None => {}
        }

        let cnf = cnf::emit(translation.factory(), translation.root());
        let stats = Statistics {
            translation_time,
            solving_time: Duration::default(),
            primary_variables: translation.num_primary_variables(),
            num_variables: cnf.num_variables,
            num_clauses: cnf.num_clauses() as u32,
        };

        let solving_start = Instant::now();
        if self.options.log_translation {
            let mut prover = CdclProver::new();
            prover.set_timeout(self.options.timeout);
            prover.add_variables(cnf.num_variables);
            for clause in &cnf.clauses {
                prover.add_clause(clause);
            }
            match prover.solve_limited() {
                None => Ok(Solution::Unknown {
                    stats: stats.with_solving(solving_start.elapsed()),
                }),
                Some(true) => {
                    let instance = decode_instance(&prover, &translation, &final_bounds)?;
                    Ok(Solution::Sat {
                        instance,
                        stats: stats.with_solving(solving_start.elapsed()),
                    })
                }
                Some(false) => {
                    let log = translation.take_log().expect("logging was enabled");
                    Ok(Solution::Unsat {
                        proof: Some(Proof::resolution(Box::new(prover), log)),
                        stats: stats.with_solving(solving_start.elapsed()),
                    })
                }
            }
        } else {
            let mut solver = BatsatSolver::default();
            solver.add_variables(cnf.num_variables);
            for clause in &cnf.clauses {
                solver.add_clause(clause);
            }
            if solver.solve() {
                let instance = decode_instance(&solver, &translation, &final_bounds)?;
                Ok(Solution::Sat {
                    instance,
                    stats: stats.with_solving(solving_start.elapsed()),
                })
            } else {
                Ok(Solution::Unsat {
                    proof: None,
                    stats: stats.with_solving(solving_start.elapsed()),
                })
            }
        }
    }
}

impl Statistics {
    fn with_solving(mut self, solving: Duration) -> Self {
        self.solving_time = solving;
        self
    }
}

/// Reads each relation's extension out of a SAT model: the lower bound
/// plus every upper-minus-lower tuple whose variable came up true.
fn decode_instance(
    solver: &impl SatSolver,
    translation: &Translation,
    bounds: &Bounds,
) -> Result<Instance> {
    let mut instance = Instance::new(bounds.universe().clone());
    let factory = bounds.universe().factory();
    for relation in bounds.relations() {
        let lower = bounds.lower_bound(relation).expect("relation is bounded");
        let upper = bounds.upper_bound(relation).expect("relation is bounded");
        let mut tuples = lower.clone();
        if let Some(range) = translation.interpreter().variable_range(relation) {
            let mut var = range.start;
            for index in upper.index_view().iter() {
                if lower.contains_index(index) {
                    continue;
                }
                if solver.value_of(var) {
                    tuples.add(factory.tuple_from_index(relation.arity(), index)?)?;
                }
                var += 1;
            }
        }
        instance.add(relation.clone(), tuples)?;
    }
    Ok(instance)
}

/// The instance assigning every relation its lower bound.
fn lower_bound_instance(bounds: &Bounds) -> Result<Instance> {
    let mut instance = Instance::new(bounds.universe().clone());
    for relation in bounds.relations() {
        let lower = bounds.lower_bound(relation).expect("relation is bounded");
        instance.add(relation.clone(), lower.clone())?;
    }
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, Relation};
    use crate::instance::Universe;

    #[test]
    fn basic_sat() {
        let universe = Universe::new(&["A", "B", "C"]).unwrap();
        let factory = universe.factory();
        let person = Relation::unary("Person");
        let mut bounds = Bounds::new(universe);
        bounds
            .bound(&person, factory.none(1), factory.all(1))
            .unwrap();

        let formula = Expression::from(&person).some();
        let solution = Solver::new(Options::default())
            .solve(&formula, &bounds)
            .unwrap();
        assert!(solution.is_sat());
        let instance = solution.instance().unwrap();
        assert!(!instance.tuples(&person).unwrap().is_empty());
    }

    #[test]
    fn basic_unsat() {
        let universe = Universe::new(&["A"]).unwrap();
        let factory = universe.factory();
        let r = Relation::unary("r");
        let mut bounds = Bounds::new(universe);
        bounds.bound_exactly(&r, factory.none(1)).unwrap();

        // r is empty but must have an element
        let formula = Expression::from(&r).some();
        let solution = Solver::new(Options::default())
            .solve(&formula, &bounds)
            .unwrap();
        assert!(solution.is_unsat());
        // exactly bound relations translate to constants: no search ran
        assert!(solution.is_trivial());
    }

    #[test]
    fn trivially_sat_uses_lower_bounds() {
        let universe = Universe::new(&["A", "B"]).unwrap();
        let factory = universe.factory();
        let r = Relation::unary("r");
        let mut bounds = Bounds::new(universe);
        bounds
            .bound_exactly(&r, factory.tuple_set(&[&["A"]]).unwrap())
            .unwrap();

        let formula = Expression::from(&r).some();
        let solution = Solver::new(Options::default())
            .solve(&formula, &bounds)
            .unwrap();
        assert!(matches!(solution, Solution::TriviallySat { .. }));
        let instance = solution.instance().unwrap();
        assert_eq!(instance.tuples(&r).unwrap().size(), 1);
    }

    #[test]
    fn model_respects_constraints() {
        let universe = Universe::new(&["A", "B", "C"]).unwrap();
        let factory = universe.factory();
        let r = Relation::unary("r");
        let s = Relation::unary("s");
        let mut bounds = Bounds::new(universe);
        bounds.bound(&r, factory.none(1), factory.all(1)).unwrap();
        bounds.bound(&s, factory.none(1), factory.all(1)).unwrap();

        // r and s partition nothing: r in s && some r
        let formula = Expression::from(&r)
            .in_set(Expression::from(&s))
            .and(Expression::from(&r).some());
        let solution = Solver::new(Options::default())
            .solve(&formula, &bounds)
            .unwrap();
        assert!(solution.is_sat());
        let instance = solution.instance().unwrap();
        let r_tuples = instance.tuples(&r).unwrap();
        let s_tuples = instance.tuples(&s).unwrap();
        assert!(!r_tuples.is_empty());
        assert!(s_tuples.contains_all(r_tuples));
    }

    #[test]
    fn unsat_with_logging_has_proof() {
        let universe = Universe::new(&["A", "B"]).unwrap();
        let factory = universe.factory();
        let r = Relation::unary("r");
        let mut bounds = Bounds::new(universe);
        bounds.bound(&r, factory.none(1), factory.all(1)).unwrap();

        let formula = Expression::from(&r)
            .some()
            .and(Expression::from(&r).no());
        let mut options = Options::default();
        options.log_translation = true;
        let solution = Solver::new(options).solve(&formula, &bounds).unwrap();
        assert!(solution.is_unsat());
        let proof = solution.proof().expect("logging produces a proof");
        assert_eq!(proof.high_level_core().len(), 2);
    }

    #[test]
    fn no_proof_without_logging() {
        let universe = Universe::new(&["A"]).unwrap();
        let factory = universe.factory();
        let r = Relation::unary("r");
        let mut bounds = Bounds::new(universe);
        bounds.bound(&r, factory.none(1), factory.all(1)).unwrap();

        let formula = Expression::from(&r)
            .some()
            .and(Expression::from(&r).no());
        let solution = Solver::new(Options::default())
            .solve(&formula, &bounds)
            .unwrap();
        assert!(solution.is_unsat());
        assert!(solution.proof().is_none());
    }

    #[test]
    fn statistics_populated() {
        let universe = Universe::new(&["A", "B"]).unwrap();
        let factory = universe.factory();
        let r = Relation::binary("r");
        let mut bounds = Bounds::new(universe);
        bounds.bound(&r, factory.none(2), factory.all(2)).unwrap();

        let formula = Expression::from(&r).some();
        let solution = Solver::new(Options::default())
            .solve(&formula, &bounds)
            .unwrap();
        let stats = solution.statistics();
        assert_eq!(stats.primary_variables(), 4);
        assert!(stats.num_variables() > 0);
        assert!(stats.num_clauses() > 0);
    }
}
