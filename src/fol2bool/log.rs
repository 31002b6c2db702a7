//! Translation log: the bridge from CNF literals back to AST nodes.
//!
//! While translating with logging enabled, the translator appends one
//! record per formula node that produced a non-constant circuit value, and
//! one record per populated cell of each freshly translated expression.
//! Each record carries the binding environment in force at that point, so
//! a literal can be traced to "this subformula, with these quantified
//! variables ground to these tuples". Formulas that collapsed to a
//! constant are kept in side lists, letting the proof layer tell a
//! trivially true conjunct from one the refutation exercised.

use crate::ast::visitor::Node;
use crate::ast::Formula;
use crate::instance::Bounds;

use super::environment::EnvSnapshot;

/// One translation event.
#[derive(Clone, Debug)]
pub struct TranslationRecord {
    /// The AST node that produced the literal.
    pub node: Node,
    /// The literal: a signed circuit label.
    pub literal: i32,
    /// Bindings of the enclosing quantified variables when the literal was
    /// produced.
    pub env: EnvSnapshot,
}

/// Append-only log of translation events, in visitation order.
#[derive(Clone, Debug, Default)]
pub struct TranslationLog {
    records: Vec<TranslationRecord>,
    roots: Vec<Formula>,
    bounds: Option<Bounds>,
    true_formulas: Vec<Formula>,
    false_formulas: Vec<Formula>,
}

impl TranslationLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn record(&mut self, node: Node, literal: i32, env: EnvSnapshot) {
        self.records.push(TranslationRecord { node, literal, env });
    }

    /// Notes a formula whose translation reduced to a constant.
    pub fn record_constant(&mut self, formula: Formula, value: bool) {
        if value {
            self.true_formulas.push(formula);
        } else {
            self.false_formulas.push(formula);
        }
    }

    /// Sets the top-level conjuncts of the translated formula.
    pub fn set_roots(&mut self, roots: Vec<Formula>) {
        self.roots = roots;
    }

    /// Sets the bounds the translation ran against.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    /// The top-level conjuncts.
    pub fn roots(&self) -> &[Formula] {
        &self.roots
    }

    /// The bounds, when recorded.
    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Formulas whose translation was constant TRUE.
    pub fn true_formulas(&self) -> &[Formula] {
        &self.true_formulas
    }

    /// Formulas whose translation was constant FALSE.
    pub fn false_formulas(&self) -> &[Formula] {
        &self.false_formulas
    }

    /// Replays the records in visitation order.
    pub fn replay(&self) -> impl Iterator<Item = &TranslationRecord> {
        self.records.iter()
    }

    /// Replays only the records whose literal's variable satisfies the
    /// given filter.
    pub fn replay_filtered<'a, F>(&'a self, mut filter: F) -> impl Iterator<Item = &'a TranslationRecord>
    where
        F: FnMut(&TranslationRecord) -> bool + 'a,
    {
        self.records.iter().filter(move |r| filter(r))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
