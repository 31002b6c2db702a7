//! Symmetry detection over bounds and lex-leader predicate generation.
//!
//! Two atoms are interchangeable when transposing them maps every bound
//! of every relation onto itself. The interchangeable classes form a
//! partition of the universe; within each class, a model can be permuted
//! freely, so the search space carries one orbit per canonical model. The
//! generated symmetry-breaking predicate keeps only (approximately)
//! lexicographically minimal models: for each consecutive atom pair in a
//! class, the pair's relation columns must not strictly decrease.
//!
//! The predicate is sound for any formula over the bounds: a permutation
//! that fixes all bounds maps models to models, so ruling out non-minimal
//! orbit members preserves satisfiability.

use rustc_hash::FxHashSet;

use crate::ast::{RelationPredicate, RelationPredicateName};
use crate::bool::{BoolValue, BooleanFactory, BooleanMatrix, TRUE};
use crate::fol2bool::LeafInterpreter;
use crate::instance::{Bounds, TupleSet};

/// Computes the interchangeable-atom classes of `bounds`, each in
/// ascending atom order. Singleton classes are omitted.
pub fn symmetry_classes(bounds: &Bounds) -> Vec<Vec<usize>> {
    let n = bounds.universe().size();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut Vec<usize>, mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    for a in 0..n {
        for b in a + 1..n {
            if find(&mut parent, a) == find(&mut parent, b) {
                continue;
            }
            if transposition_fixes_bounds(bounds, a, b) {
                let ra = find(&mut parent, a);
                let rb = find(&mut parent, b);
                parent[rb] = ra;
            }
        }
    }

    let mut classes: Vec<Vec<usize>> = vec![Vec::new(); n];
    for atom in 0..n {
        let root = find(&mut parent, atom);
        classes[root].push(atom);
    }
    classes.retain(|c| c.len() > 1);
    classes
}

/// True if swapping atoms `a` and `b` maps every bound onto itself.
fn transposition_fixes_bounds(bounds: &Bounds, a: usize, b: usize) -> bool {
    let n = bounds.universe().size();
    for relation in bounds.relations() {
        for set in [
            bounds.lower_bound(relation).expect("bounded"),
            bounds.upper_bound(relation).expect("bounded"),
        ] {
            if !transposition_fixes_set(set, n, a, b) {
                return false;
            }
        }
    }
    true
}

fn transposition_fixes_set(set: &TupleSet, n: usize, a: usize, b: usize) -> bool {
    set.index_view()
        .iter()
        .all(|index| set.contains_index(transpose_index(index, set.arity(), n, a, b)))
}

/// The linear index of a tuple with atoms `a` and `b` swapped.
fn transpose_index(index: usize, arity: usize, n: usize, a: usize, b: usize) -> usize {
    let mut digits = vec![0usize; arity];
    let mut rest = index;
    for d in (0..arity).rev() {
        digits[d] = rest % n;
        rest /= n;
    }
    let mut out = 0usize;
    for d in digits {
        let mapped = if d == a {
            b
        } else if d == b {
            a
        } else {
            d
        };
        out = out * n + mapped;
    }
    out
}

/// Generates the symmetry-breaking predicate over the relation matrices
/// interpreted so far, as a single circuit value to conjoin onto the root.
///
/// Classes whose atoms are covered by a top-level total-ordering predicate
/// are skipped: the ordering already pins those atoms down. Each lex
/// constraint is truncated to `max_length` cell pairs.
pub fn breaking_predicate(
    bounds: &Bounds,
    predicates: &[RelationPredicate],
    interpreter: &LeafInterpreter,
    factory: &BooleanFactory,
    max_length: usize,
) -> BoolValue {
    let mut classes = symmetry_classes(bounds);

    // atoms ordered by a total-ordering predicate are already asymmetric
    let mut ordered_atoms: FxHashSet<usize> = FxHashSet::default();
    for pred in predicates {
        if pred.name() != RelationPredicateName::TotalOrdering {
            continue;
        }
        if let RelationPredicate::TotalOrdering { ordered, .. } = pred {
            if let Some(upper) = bounds.upper_bound(ordered) {
                ordered_atoms.extend(upper.index_view().iter());
            }
        }
    }
    classes.retain(|class| class.iter().all(|atom| !ordered_atoms.contains(atom)));

    let n = bounds.universe().size();
    // deterministic matrix order: bounds order, restricted to relations
    // the formula actually mentions
    let matrices: Vec<&BooleanMatrix> = bounds
        .relations()
        .filter_map(|r| {
            interpreter
                .interpreted()
                .find(|(rel, _)| *rel == r)
                .map(|(_, m)| m)
        })
        .collect();

    let mut sbp = TRUE;
    for class in &classes {
        for pair in class.windows(2) {
            let (prev, cur) = (pair[0], pair[1]);
            let mut xs = Vec::new();
            let mut ys = Vec::new();
            for matrix in &matrices {
                let arity = matrix.dimensions().num_dimensions();
                for (index, value) in matrix.cells() {
                    if xs.len() >= max_length {
                        break;
                    }
                    let swapped = transpose_index(index, arity, n, prev, cur);
                    if swapped == index {
                        continue;
                    }
                    xs.push(value);
                    ys.push(matrix.get(swapped));
                }
            }
            sbp = factory.and(sbp, lex_leq(factory, &xs, &ys));
        }
    }
    sbp
}

/// The constraint `x <=lex y` over parallel bit vectors.
fn lex_leq(factory: &BooleanFactory, xs: &[BoolValue], ys: &[BoolValue]) -> BoolValue {
    let mut constraint = TRUE;
    let mut prefix_equal = TRUE;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let here = factory.implies(prefix_equal, factory.implies(x, y));
        constraint = factory.and(constraint, here);
        let same = factory.iff(x, y);
        prefix_equal = factory.and(prefix_equal, same);
        if constraint.is_false() {
            break;
        }
    }
    constraint
}
