//! Variable bindings during translation.

use crate::ast::Variable;
use crate::bool::BooleanMatrix;

/// A binding snapshot: each in-scope variable paired with the linear index
/// of the tuple it is currently ground to. Snapshots key the translation
/// cache and annotate translation-log records.
pub type EnvSnapshot = Vec<(Variable, usize)>;

/// Stack of quantified-variable bindings.
///
/// Each frame binds one variable to the indicator matrix of its current
/// ground value. Lookup searches innermost-first, so an inner declaration
/// shadows an outer one with the same variable.
pub struct Environment {
    bindings: Vec<(Variable, BooleanMatrix, usize)>,
}

impl Environment {
    /// An empty environment.
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Pushes a binding of `var` to the indicator matrix of the tuple with
    /// linear index `ground`.
    pub fn extend(&mut self, var: Variable, matrix: BooleanMatrix, ground: usize) {
        self.bindings.push((var, matrix, ground));
    }

    /// Pops the most recent binding.
    pub fn pop(&mut self) {
        self.bindings.pop();
    }

    /// The current value of `var`, innermost binding first.
    pub fn lookup(&self, var: &Variable) -> Option<&BooleanMatrix> {
        self.bindings
            .iter()
            .rev()
            .find(|(v, _, _)| v == var)
            .map(|(_, m, _)| m)
    }

    /// Number of bindings in scope.
    pub fn depth(&self) -> usize {
        self.bindings.len()
    }

    /// Snapshot of every binding in scope, outermost first. Shadowed
    /// bindings are retained; consumers match on the innermost occurrence.
    pub fn snapshot(&self) -> EnvSnapshot {
        self.bindings
            .iter()
            .map(|(v, _, g)| (v.clone(), *g))
            .collect()
    }

    /// Snapshot restricted to the given variables, resolving each to its
    /// innermost binding. Variables without a binding are omitted.
    pub fn snapshot_of(&self, vars: &[Variable]) -> EnvSnapshot {
        vars.iter()
            .filter_map(|v| {
                self.bindings
                    .iter()
                    .rev()
                    .find(|(bound, _, _)| bound == v)
                    .map(|(_, _, g)| (v.clone(), *g))
            })
            .collect()
    }
}
