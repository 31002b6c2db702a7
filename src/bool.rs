//! Boolean circuit representation.
//!
//! The circuit layer is the intermediate form between relational AST and
//! CNF. A circuit is a DAG of AND/OR/ITE gates over propositional
//! variables, built through a [`BooleanFactory`] that hash-conses gates and
//! applies local simplifications during construction.
//!
//! Values are label handles: variables carry labels `1..=n`, gates carry
//! labels `> n` assigned densely in creation order, and negation is the
//! arithmetic sign of the label -- a view of the underlying node, never a
//! node of its own. The constants TRUE and FALSE are `i32::MAX` and
//! `-i32::MAX`, so negation is uniformly `-label`.

mod accumulator;
mod factory;
mod int;
mod matrix;

pub use accumulator::BooleanAccumulator;
pub use factory::{BooleanFactory, GateView, Options};
pub use int::{Int, IntEncoding};
pub use matrix::{BooleanMatrix, Dimensions};

/// Label of the constant TRUE.
pub const TRUE_LABEL: i32 = i32::MAX;

/// Label of the constant FALSE.
pub const FALSE_LABEL: i32 = -i32::MAX;

/// A handle to a boolean value owned by some [`BooleanFactory`].
///
/// The handle is just the value's label; all structure lives in the
/// factory. Handles from different factories must not be mixed -- doing so
/// is a programmer error that debug builds catch with assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolValue(i32);

/// The constant TRUE.
pub const TRUE: BoolValue = BoolValue(TRUE_LABEL);

/// The constant FALSE.
pub const FALSE: BoolValue = BoolValue(FALSE_LABEL);

impl BoolValue {
    /// Wraps a raw label.
    pub(crate) fn new(label: i32) -> Self {
        debug_assert!(label != 0, "labels are nonzero");
        BoolValue(label)
    }

    /// The signed label of this value. Negative labels denote the negation
    /// of the node with the absolute label.
    pub fn label(self) -> i32 {
        self.0
    }

    /// The negation of this value.
    pub fn negate(self) -> BoolValue {
        BoolValue(-self.0)
    }

    /// True if this is TRUE or FALSE.
    pub fn is_constant(self) -> bool {
        self.0 == TRUE_LABEL || self.0 == FALSE_LABEL
    }

    /// True if this is the constant TRUE.
    pub fn is_true(self) -> bool {
        self.0 == TRUE_LABEL
    }

    /// True if this is the constant FALSE.
    pub fn is_false(self) -> bool {
        self.0 == FALSE_LABEL
    }

    /// The truth value, if this is a constant.
    pub fn constant_value(self) -> Option<bool> {
        match self.0 {
            TRUE_LABEL => Some(true),
            FALSE_LABEL => Some(false),
            _ => None,
        }
    }

    /// The constant with the given truth value.
    pub fn constant(value: bool) -> BoolValue {
        if value {
            TRUE
        } else {
            FALSE
        }
    }
}

/// Gate operators for AND/OR gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateOp {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
}

impl GateOp {
    /// The identity element: TRUE for AND, FALSE for OR.
    pub fn identity(self) -> BoolValue {
        match self {
            GateOp::And => TRUE,
            GateOp::Or => FALSE,
        }
    }

    /// The short-circuiting element: FALSE for AND, TRUE for OR.
    pub fn short_circuit(self) -> BoolValue {
        match self {
            GateOp::And => FALSE,
            GateOp::Or => TRUE,
        }
    }

    /// The dual operator.
    pub fn complement(self) -> GateOp {
        match self {
            GateOp::And => GateOp::Or,
            GateOp::Or => GateOp::And,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_labels() {
        assert!(TRUE.is_true());
        assert!(FALSE.is_false());
        assert_eq!(TRUE.negate(), FALSE);
        assert_eq!(FALSE.negate(), TRUE);
        assert_eq!(TRUE.constant_value(), Some(true));
    }

    #[test]
    fn negation_is_an_involution() {
        let v = BoolValue::new(5);
        assert_eq!(v.negate().negate(), v);
        assert_eq!(v.negate().label(), -5);
        assert!(!v.is_constant());
    }

    #[test]
    fn gate_op_duality() {
        assert_eq!(GateOp::And.identity(), TRUE);
        assert_eq!(GateOp::And.short_circuit(), FALSE);
        assert_eq!(GateOp::Or.identity(), FALSE);
        assert_eq!(GateOp::Or.short_circuit(), TRUE);
        assert_eq!(GateOp::And.complement(), GateOp::Or);
    }
}
