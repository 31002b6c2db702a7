//! Pre-translation annotation of a formula DAG.
//!
//! One traversal computes everything later stages ask about structure:
//! which nodes have more than one incoming edge (reference-identity
//! counting), the free variables of each shared node, whether any
//! descendant depends on integer bounds, and the relation predicates that
//! sit on the top-level conjunction paths.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::visitor::{Node, NodeId};
use crate::ast::{
    BinaryFormulaOp, Decls, ExprKind, Formula, FormulaInner, IntExprInner, RelationPredicate,
    Variable,
};

/// A formula annotated with sharing and scoping facts.
pub struct AnnotatedNode {
    formula: Formula,
    shared: FxHashSet<NodeId>,
    free_vars: FxHashMap<NodeId, Vec<Variable>>,
    uses_ints: bool,
}

impl AnnotatedNode {
    /// Annotates `formula`.
    pub fn new(formula: &Formula) -> Self {
        let mut counter = SharingCounter::default();
        counter.visit(&Node::Formula(formula.clone()));
        let shared: FxHashSet<NodeId> = counter
            .visits
            .iter()
            .filter(|(_, &count)| count > 1)
            .map(|(&id, _)| id)
            .collect();

        let mut scoper = FreeVarScoper {
            shared: &shared,
            free_vars: FxHashMap::default(),
            scope: Vec::new(),
            uses_ints: false,
        };
        scoper.visit(&Node::Formula(formula.clone()));
        let free_vars = scoper.free_vars;
        let uses_ints = scoper.uses_ints;

        Self {
            formula: formula.clone(),
            shared,
            free_vars,
            uses_ints,
        }
    }

    /// The annotated formula.
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// True if `node` has more than one parent in the DAG.
    pub fn is_shared(&self, node: &Node) -> bool {
        self.shared.contains(&node.id())
    }

    /// The free variables of a shared node, in first-occurrence order.
    /// Returns `None` for nodes that are not shared (they are translated
    /// once, so nothing needs their scoping).
    pub fn free_variables(&self, node: &Node) -> Option<&[Variable]> {
        self.free_vars.get(&node.id()).map(|v| v.as_slice())
    }

    /// True if any descendant's meaning depends on integer bounds.
    pub fn uses_ints(&self) -> bool {
        self.uses_ints
    }

    /// The relation predicates on the top-level conjunction paths of the
    /// formula, with negation tracked so a negated predicate does not
    /// count.
    pub fn top_predicates(&self) -> Vec<RelationPredicate> {
        let mut out = Vec::new();
        collect_predicates(&self.formula, false, &mut out);
        out
    }
}

fn collect_predicates(f: &Formula, negated: bool, out: &mut Vec<RelationPredicate>) {
    if let Some(inner) = f.inner() {
        match inner {
            FormulaInner::Binary { left, op, right } => match (op, negated) {
                (BinaryFormulaOp::And, false) | (BinaryFormulaOp::Or, true) => {
                    collect_predicates(left, negated, out);
                    collect_predicates(right, negated, out);
                }
                (BinaryFormulaOp::Implies, true) => {
                    // !(a => b) keeps a and !b on the conjunction path
                    collect_predicates(left, false, out);
                    collect_predicates(right, true, out);
                }
                _ => {}
            },
            FormulaInner::Not(inner) => collect_predicates(inner, !negated, out),
            FormulaInner::Predicate(pred) if !negated => out.push(pred.clone()),
            _ => {}
        }
    }
}

/// Counts how many parents each non-leaf node has. A node seen more than
/// once is shared; its subtree is not revisited.
#[derive(Default)]
struct SharingCounter {
    visits: FxHashMap<NodeId, u32>,
}

impl SharingCounter {
    fn visit(&mut self, node: &Node) {
        if node.is_leaf() {
            return;
        }
        let count = self.visits.entry(node.id()).or_insert(0);
        *count += 1;
        if *count > 1 {
            return;
        }
        for child in node.children() {
            self.visit(&child);
        }
    }
}

/// Computes free variables for shared nodes and detects integer-bounded
/// constructs. The scope stack mirrors quantifier nesting.
struct FreeVarScoper<'a> {
    shared: &'a FxHashSet<NodeId>,
    free_vars: FxHashMap<NodeId, Vec<Variable>>,
    scope: Vec<Variable>,
    uses_ints: bool,
}

impl FreeVarScoper<'_> {
    /// Returns the free variables of `node` under the current scope.
    fn visit(&mut self, node: &Node) -> Vec<Variable> {
        let free = match node {
            Node::Formula(f) => match f.inner() {
                None => Vec::new(),
                Some(inner) => match inner {
                    FormulaInner::Quantified { decls, body, .. } => {
                        self.visit_binder(decls, &Node::Formula(body.clone()))
                    }
                    _ => self.visit_children(node),
                },
            },
            Node::Expression(e) => match e.kind() {
                // a variable is free here whether or not some enclosing
                // declaration binds it; binders subtract their own below
                ExprKind::Variable(v) => vec![v.clone()],
                ExprKind::Comprehension { decls, formula } => {
                    self.visit_binder(decls, &Node::Formula(formula.clone()))
                }
                ExprKind::IntCast(_) => {
                    self.uses_ints = true;
                    self.visit_children(node)
                }
                _ => self.visit_children(node),
            },
            Node::IntExpr(i) => match i.inner() {
                IntExprInner::Sum { decls, body } => {
                    self.uses_ints = true;
                    self.visit_binder(decls, &Node::IntExpr(body.clone()))
                }
                IntExprInner::Cardinality(_) | IntExprInner::Constant(_) => {
                    self.uses_ints = true;
                    self.visit_children(node)
                }
                _ => {
                    self.uses_ints = true;
                    self.visit_children(node)
                }
            },
        };
        if self.shared.contains(&node.id()) {
            self.free_vars.entry(node.id()).or_insert_with(|| free.clone());
        }
        free
    }

    fn visit_children(&mut self, node: &Node) -> Vec<Variable> {
        let mut free = Vec::new();
        for child in node.children() {
            for v in self.visit(&child) {
                if !free.contains(&v) {
                    free.push(v);
                }
            }
        }
        free
    }

    fn visit_binder(&mut self, decls: &Decls, body: &Node) -> Vec<Variable> {
        let mut free = Vec::new();
        let mut pushed = 0;
        for decl in decls.iter() {
            for v in self.visit(&Node::Expression(decl.expression().clone())) {
                if !free.contains(&v) {
                    free.push(v);
                }
            }
            self.scope.push(decl.variable().clone());
            pushed += 1;
        }
        let body_free = self.visit(body);
        for _ in 0..pushed {
            self.scope.pop();
        }
        let bound: Vec<&Variable> = decls.iter().map(|d| d.variable()).collect();
        for v in body_free {
            if !bound.contains(&&v) && !free.contains(&v) {
                free.push(v);
            }
        }
        free
    }
}
