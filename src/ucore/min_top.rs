//! Minimization of the high-level core over top-level conjuncts.
//!
//! The strategy attempts to remove one top-level conjunct per round by
//! dropping the unit clause that asserts the conjunct's literal. A round
//! whose reduced clause set still refutes permanently removes the
//! conjunct; a round that becomes satisfiable marks it necessary. Each
//! conjunct is attempted at most once, against a clause set no larger
//! than any later one, so when the strategy is exhausted the surviving
//! set is locally minimal: dropping any single remaining conjunct admits
//! a model.

use rustc_hash::FxHashSet;

use crate::fol2bool::TranslationLog;
use crate::sat::{ReductionStrategy, ResolutionTrace};

use super::strategy_utils::{core_vars, root_literals_and_vars};

/// Removes top-level conjuncts, largest relevant-variable set first.
pub struct MinTopStrategy {
    /// Per conjunct: the asserting literal (None for conjuncts that
    /// translated to a constant) and the variables of its subtree.
    conjuncts: Vec<(Option<i32>, FxHashSet<u32>)>,
    attempted: FxHashSet<usize>,
}

impl MinTopStrategy {
    /// Builds the strategy from the translation log of the refuted
    /// problem.
    pub fn new(log: &TranslationLog) -> Self {
        Self {
            conjuncts: root_literals_and_vars(log),
            attempted: FxHashSet::default(),
        }
    }
}

impl ReductionStrategy for MinTopStrategy {
    fn next_reduction(&mut self, trace: &ResolutionTrace) -> Vec<usize> {
        let core = core_vars(trace);

        // candidates: conjuncts still asserted in the trace and not yet
        // attempted, ranked by how many core variables they touch
        let mut best: Option<(usize, usize, usize)> = None; // (relevant, position, unit index)
        for (position, (literal, vars)) in self.conjuncts.iter().enumerate() {
            if self.attempted.contains(&position) {
                continue;
            }
            let Some(literal) = literal else {
                continue;
            };
            let Some(unit) = trace.find_unit(*literal) else {
                continue;
            };
            let relevant = vars.iter().filter(|v| core.contains(v)).count();
            let better = match best {
                None => true,
                Some((best_relevant, best_position, _)) => {
                    relevant > best_relevant
                        || (relevant == best_relevant && position < best_position)
                }
            };
            if better {
                best = Some((relevant, position, unit));
            }
        }

        match best {
            Some((_, position, unit)) => {
                self.attempted.insert(position);
                vec![unit]
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::visitor::Node;
    use crate::ast::{Expression, Relation};
    use crate::sat::{CdclProver, SatProver, SatSolver, TraceClause};

    fn original(index: usize, literals: Vec<i32>) -> TraceClause {
        TraceClause {
            index,
            learned: false,
            literals,
            antecedents: Vec::new(),
        }
    }

    /// Builds a log with two roots asserted by literals 1 and 2.
    fn two_root_log() -> TranslationLog {
        let r = Relation::unary("r");
        let f1 = Expression::from(&r).some();
        let f2 = Expression::from(&r).no();
        let mut log = TranslationLog::new();
        log.record(Node::Formula(f1.clone()), 1, Vec::new());
        log.record(Node::Formula(f2.clone()), 2, Vec::new());
        log.set_roots(vec![f1, f2]);
        log
    }

    #[test]
    fn proposes_each_conjunct_once() {
        let log = two_root_log();
        let mut strategy = MinTopStrategy::new(&log);
        let trace = ResolutionTrace::new(
            vec![
                original(0, vec![1]),
                original(1, vec![2]),
                original(2, vec![-1, -2]),
                TraceClause {
                    index: 3,
                    learned: true,
                    literals: vec![],
                    antecedents: vec![0, 1, 2],
                },
            ],
            3,
        );
        let first = strategy.next_reduction(&trace);
        assert_eq!(first.len(), 1);
        let second = strategy.next_reduction(&trace);
        assert_eq!(second.len(), 1);
        assert_ne!(first, second);
        assert!(strategy.next_reduction(&trace).is_empty());
    }

    #[test]
    fn minimizes_through_a_prover() {
        // units 1 and 2 with (-1 -2): either unit alone with the binary
        // clause is satisfiable, so both are necessary; but an extra
        // redundant unit 3 can be dropped
        let r = Relation::unary("r");
        let f1 = Expression::from(&r).some();
        let f2 = Expression::from(&r).one();
        let f3 = Expression::from(&r).lone();
        let mut log = TranslationLog::new();
        log.record(Node::Formula(f1.clone()), 1, Vec::new());
        log.record(Node::Formula(f2.clone()), 2, Vec::new());
        log.record(Node::Formula(f3.clone()), 3, Vec::new());
        log.set_roots(vec![f1, f2, f3]);

        let mut prover = CdclProver::new();
        prover.add_variables(3);
        prover.add_clause(&[1]);
        prover.add_clause(&[2]);
        prover.add_clause(&[3]);
        prover.add_clause(&[-1, -2]);
        assert!(!prover.solve());

        let mut strategy = MinTopStrategy::new(&log);
        prover.reduce(&mut strategy);
        let trace = prover.proof();
        // the refutation needs units 1 and 2; unit 3 is gone
        assert!(trace.find_unit(1).is_some());
        assert!(trace.find_unit(2).is_some());
        assert!(trace.find_unit(3).is_none());
    }
}
