//! Leaf interpretation: relations and constant expressions as matrices.
//!
//! Variable allocation is decided up front, one contiguous label range per
//! bounded relation in bounds order, so the same problem always produces
//! the same CNF. A relation's matrix holds TRUE at its lower-bound tuples,
//! a fresh variable at each upper-minus-lower tuple, and implicit FALSE
//! everywhere else. The recorded ranges are also how a SAT model is decoded
//! back into tuple sets.

use std::ops::Range;

use rustc_hash::FxHashMap;

use crate::ast::{ConstantExpr, Relation};
use crate::bool::{BooleanFactory, BooleanMatrix, Dimensions, TRUE};
use crate::error::{RelicError, Result};
use crate::instance::Bounds;

/// Interprets relational leaves over a set of bounds.
pub struct LeafInterpreter {
    bounds: Bounds,
    var_ranges: FxHashMap<Relation, Range<u32>>,
    matrices: FxHashMap<Relation, BooleanMatrix>,
    num_primary: u32,
}

impl LeafInterpreter {
    /// Plans variable allocation for every bounded relation.
    pub fn new(bounds: Bounds) -> Self {
        let mut var_ranges = FxHashMap::default();
        let mut next: u32 = 1;
        for relation in bounds.relations() {
            let lower = bounds.lower_bound(relation).expect("relation is bounded");
            let upper = bounds.upper_bound(relation).expect("relation is bounded");
            let fresh = (upper.size() - lower.size()) as u32;
            var_ranges.insert(relation.clone(), next..next + fresh);
            next += fresh;
        }
        Self {
            bounds,
            var_ranges,
            matrices: FxHashMap::default(),
            num_primary: next - 1,
        }
    }

    /// The bounds this interpreter allocates over.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Total number of primary (relation) variables.
    pub fn num_primary_variables(&self) -> u32 {
        self.num_primary
    }

    /// The label range allocated to `relation`, if it is bounded.
    pub fn variable_range(&self, relation: &Relation) -> Option<&Range<u32>> {
        self.var_ranges.get(relation)
    }

    /// The matrix encoding of `relation`. Repeated calls return the same
    /// matrix.
    ///
    /// # Errors
    /// Returns [`RelicError::UnboundLeaf`] for a relation absent from the
    /// bounds.
    pub fn interpret(
        &mut self,
        relation: &Relation,
        factory: &BooleanFactory,
    ) -> Result<BooleanMatrix> {
        if let Some(matrix) = self.matrices.get(relation) {
            return Ok(matrix.clone());
        }
        let range = self
            .var_ranges
            .get(relation)
            .ok_or_else(|| RelicError::UnboundLeaf(relation.name().to_string()))?
            .clone();
        let lower = self.bounds.lower_bound(relation).expect("range implies bound");
        let upper = self.bounds.upper_bound(relation).expect("range implies bound");

        let n = self.bounds.universe().size();
        let mut matrix = BooleanMatrix::new(Dimensions::square(relation.arity(), n));
        let mut next = range.start;
        for index in upper.index_view().iter() {
            if lower.contains_index(index) {
                matrix.set(index, TRUE);
            } else {
                matrix.set(index, factory.variable(next as i32));
                next += 1;
            }
        }
        debug_assert_eq!(next, range.end);

        self.matrices.insert(relation.clone(), matrix.clone());
        Ok(matrix)
    }

    /// True if `relation` has already been interpreted.
    pub fn is_interpreted(&self, relation: &Relation) -> bool {
        self.matrices.contains_key(relation)
    }

    /// The matrices interpreted so far, for symmetry-breaking passes.
    pub fn interpreted(&self) -> impl Iterator<Item = (&Relation, &BooleanMatrix)> {
        self.matrices.iter()
    }

    /// The matrix of a constant expression over this universe.
    pub fn interpret_constant(&self, constant: ConstantExpr) -> BooleanMatrix {
        let n = self.bounds.universe().size();
        match constant {
            ConstantExpr::Univ => {
                let mut m = BooleanMatrix::new(Dimensions::square(1, n));
                for i in 0..n {
                    m.set(i, TRUE);
                }
                m
            }
            ConstantExpr::Iden => BooleanMatrix::identity(n),
            ConstantExpr::None => BooleanMatrix::new(Dimensions::square(1, n)),
        }
    }
}
