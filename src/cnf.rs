//! Tseitin clausification of a circuit into CNF.
//!
//! Every circuit label doubles as a solver variable, so the clause set is
//! a direct image of the circuit: deterministic for a deterministic
//! translation. When the root is an AND gate, its conjuncts are asserted
//! as unit clauses instead of routing through an auxiliary gate variable;
//! the units are what lets core extraction attribute original clauses to
//! individual top-level conjuncts.

use rustc_hash::FxHashSet;

use crate::bool::{BoolValue, BooleanFactory, GateView};

/// A CNF formula: clauses of signed literals over `1..=num_variables`.
#[derive(Debug, Clone, Default)]
pub struct Cnf {
    /// Number of solver variables.
    pub num_variables: u32,
    /// The clauses, in emission order.
    pub clauses: Vec<Vec<i32>>,
}

impl Cnf {
    /// Number of clauses.
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }
}

/// Clausifies `root` against the factory that built it.
pub fn emit(factory: &BooleanFactory, root: BoolValue) -> Cnf {
    let mut emitter = Emitter {
        factory,
        cnf: Cnf {
            num_variables: factory.max_label().max(0) as u32,
            clauses: Vec::new(),
        },
        visited: FxHashSet::default(),
    };

    match root.constant_value() {
        Some(true) => {}
        Some(false) => emitter.cnf.clauses.push(Vec::new()),
        None => {
            let top_conjuncts = match factory.gate(root.label()) {
                Some(GateView::And(inputs)) => Some(inputs),
                _ => None,
            };
            match top_conjuncts {
                Some(inputs) => {
                    for input in inputs {
                        emitter.define(input);
                        emitter.cnf.clauses.push(vec![input.label()]);
                    }
                }
                None => {
                    emitter.define(root);
                    emitter.cnf.clauses.push(vec![root.label()]);
                }
            }
        }
    }
    emitter.cnf
}

struct Emitter<'a> {
    factory: &'a BooleanFactory,
    cnf: Cnf,
    visited: FxHashSet<i32>,
}

impl Emitter<'_> {
    /// Emits the defining clauses for the gate under `value` (and its
    /// descendants), if any. Variables need no definition.
    fn define(&mut self, value: BoolValue) {
        debug_assert!(!value.is_constant(), "constants cannot reach the emitter");
        let label = value.label().abs();
        if !self.visited.insert(label) {
            return;
        }
        let Some(view) = self.factory.gate(label) else {
            return;
        };
        match view {
            GateView::And(inputs) => {
                for &input in &inputs {
                    self.define(input);
                }
                // g => each input
                for &input in &inputs {
                    self.cnf.clauses.push(vec![-label, input.label()]);
                }
                // all inputs => g
                let mut clause: Vec<i32> = inputs.iter().map(|v| -v.label()).collect();
                clause.push(label);
                self.cnf.clauses.push(clause);
            }
            GateView::Or(inputs) => {
                for &input in &inputs {
                    self.define(input);
                }
                // each input => g
                for &input in &inputs {
                    self.cnf.clauses.push(vec![-input.label(), label]);
                }
                // g => some input
                let mut clause: Vec<i32> = inputs.iter().map(|v| v.label()).collect();
                clause.insert(0, -label);
                self.cnf.clauses.push(clause);
            }
            GateView::Ite(c, t, e) => {
                self.define(c);
                self.define(t);
                self.define(e);
                let (c, t, e) = (c.label(), t.label(), e.label());
                self.cnf.clauses.push(vec![-label, -c, t]);
                self.cnf.clauses.push(vec![-label, c, e]);
                self.cnf.clauses.push(vec![label, -c, -t]);
                self.cnf.clauses.push(vec![label, c, -e]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bool::{Options, FALSE, TRUE};

    fn factory() -> BooleanFactory {
        BooleanFactory::new(4, Options::default())
    }

    #[test]
    fn constant_roots() {
        let f = factory();
        let sat = emit(&f, TRUE);
        assert_eq!(sat.num_clauses(), 0);

        let unsat = emit(&f, FALSE);
        assert_eq!(unsat.num_clauses(), 1);
        assert!(unsat.clauses[0].is_empty());
    }

    #[test]
    fn variable_root_is_a_unit() {
        let f = factory();
        let cnf = emit(&f, f.variable(2));
        assert_eq!(cnf.clauses, vec![vec![2]]);
    }

    #[test]
    fn top_level_and_becomes_units() {
        let f = factory();
        let a = f.variable(1);
        let b = f.variable(2);
        let c = f.variable(3);
        let root = f.and(f.and(a, b), c);
        let cnf = emit(&f, root);
        // each top conjunct of the root AND is asserted as a unit
        let units: Vec<&Vec<i32>> = cnf.clauses.iter().filter(|c| c.len() == 1).collect();
        assert!(!units.is_empty());
        assert!(cnf.num_variables >= 3);
    }

    #[test]
    fn or_gate_clauses() {
        let f = factory();
        let a = f.variable(1);
        let b = f.variable(2);
        let root = f.or(a, b);
        let cnf = emit(&f, root);
        let g = root.label();
        assert!(cnf.clauses.contains(&vec![-1, g]));
        assert!(cnf.clauses.contains(&vec![-2, g]));
        assert!(cnf.clauses.contains(&vec![-g, 1, 2]));
        assert!(cnf.clauses.contains(&vec![g]));
    }

    #[test]
    fn ite_gate_clauses() {
        let f = factory();
        let root = f.ite(f.variable(1), f.variable(2), f.variable(3));
        let cnf = emit(&f, root);
        let g = root.label();
        assert!(cnf.clauses.contains(&vec![-g, -1, 2]));
        assert!(cnf.clauses.contains(&vec![-g, 1, 3]));
        assert!(cnf.clauses.contains(&vec![g, -1, -2]));
        assert!(cnf.clauses.contains(&vec![g, 1, -3]));
    }

    #[test]
    fn shared_gates_are_defined_once() {
        let f = factory();
        let a = f.variable(1);
        let b = f.variable(2);
        let ab = f.and(a, b);
        let root = f.or(f.not(ab), f.and(ab, f.variable(3)));
        let cnf = emit(&f, root);
        // the shared AND gate's implication g => a appears exactly once
        let count = cnf
            .clauses
            .iter()
            .filter(|c| **c == vec![-ab.label(), 1])
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn emission_is_deterministic() {
        let build = || {
            let f = factory();
            let a = f.variable(1);
            let b = f.variable(2);
            let root = f.or(f.and(a, b), f.variable(3));
            emit(&f, root).clauses
        };
        assert_eq!(build(), build());
    }
}
