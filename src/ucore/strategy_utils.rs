//! Shared helpers for core-minimization strategies.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::visitor::{Node, NodeId};
use crate::ast::Formula;
use crate::fol2bool::TranslationLog;
use crate::sat::ResolutionTrace;

/// The variables of the low-level core: every variable occurring in an
/// original clause reachable from the conflict through the antecedent DAG.
pub fn core_vars(trace: &ResolutionTrace) -> FxHashSet<u32> {
    let mut vars = FxHashSet::default();
    for index in trace.core() {
        let clause = trace.clause(index).expect("core index is in the trace");
        for &lit in &clause.literals {
            vars.insert(lit.unsigned_abs());
        }
    }
    vars
}

/// The set of node identities in `root`'s subtree, following the AST child
/// relation through shared nodes once.
pub fn subtree_ids(root: &Formula) -> FxHashSet<NodeId> {
    let mut seen = FxHashSet::default();
    let mut stack = vec![Node::Formula(root.clone())];
    while let Some(node) = stack.pop() {
        if seen.insert(node.id()) {
            stack.extend(node.children());
        }
    }
    seen
}

/// For each top-level conjunct in the log's roots: the literal asserting
/// it (if its translation was non-constant) and the set of variables its
/// subtree contributed to the CNF.
pub fn root_literals_and_vars(log: &TranslationLog) -> Vec<(Option<i32>, FxHashSet<u32>)> {
    let roots = log.roots();
    let subtrees: Vec<FxHashSet<NodeId>> = roots.iter().map(subtree_ids).collect();

    // literal of each root: the record for the root node itself, under an
    // empty environment
    let mut literals: Vec<Option<i32>> = vec![None; roots.len()];
    let root_ids: FxHashMap<NodeId, usize> = roots
        .iter()
        .enumerate()
        .map(|(i, r)| (Node::Formula(r.clone()).id(), i))
        .collect();

    let mut vars: Vec<FxHashSet<u32>> = vec![FxHashSet::default(); roots.len()];
    for record in log.replay() {
        let id = record.node.id();
        if record.env.is_empty() {
            if let Some(&i) = root_ids.get(&id) {
                literals[i] = Some(record.literal);
            }
        }
        for (i, subtree) in subtrees.iter().enumerate() {
            if subtree.contains(&id) {
                vars[i].insert(record.literal.unsigned_abs());
            }
        }
    }

    literals.into_iter().zip(vars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, Relation};
    use crate::sat::TraceClause;

    #[test]
    fn core_vars_from_trace() {
        let trace = ResolutionTrace::new(
            vec![
                TraceClause {
                    index: 0,
                    learned: false,
                    literals: vec![1, -2],
                    antecedents: vec![],
                },
                TraceClause {
                    index: 1,
                    learned: false,
                    literals: vec![2],
                    antecedents: vec![],
                },
                TraceClause {
                    index: 2,
                    learned: false,
                    literals: vec![-1],
                    antecedents: vec![],
                },
                TraceClause {
                    index: 3,
                    learned: false,
                    literals: vec![9],
                    antecedents: vec![],
                },
                TraceClause {
                    index: 4,
                    learned: true,
                    literals: vec![],
                    antecedents: vec![0, 1, 2],
                },
            ],
            4,
        );
        let vars = core_vars(&trace);
        assert!(vars.contains(&1) && vars.contains(&2));
        assert!(!vars.contains(&9));
    }

    #[test]
    fn subtree_covers_shared_nodes() {
        let r = Relation::unary("r");
        let shared = Expression::from(&r).some();
        let root = shared.clone().and(shared.clone());
        let ids = subtree_ids(&root);
        assert!(ids.contains(&Node::Formula(shared).id()));
        assert!(ids.contains(&Node::Formula(root).id()));
    }
}
