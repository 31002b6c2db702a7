//! Integer expression nodes.

use std::fmt;
use std::rc::Rc;

use super::{Decls, Expression, Formula};

/// Binary integer operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntOp {
    /// Addition.
    Plus,
    /// Subtraction.
    Minus,
}

/// Integer comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntCompareOp {
    /// Equality.
    Eq,
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Strictly greater than.
    Gt,
    /// Greater than or equal.
    Gte,
}

/// A bounded integer expression.
///
/// Reference-counted with identity equality, like [`Expression`] and
/// [`Formula`](super::Formula).
#[derive(Clone)]
pub struct IntExpression {
    inner: Rc<IntExprInner>,
}

/// Integer expression node kinds.
#[derive(Debug)]
pub enum IntExprInner {
    /// A constant value.
    Constant(i32),
    /// The cardinality `#expr` of an expression.
    Cardinality(Expression),
    /// A binary operation.
    Binary {
        /// Left operand.
        left: IntExpression,
        /// Operator.
        op: IntOp,
        /// Right operand.
        right: IntExpression,
    },
    /// `if condition then then_expr else else_expr`.
    If {
        /// Branch condition.
        condition: Formula,
        /// Value when the condition holds.
        then_expr: IntExpression,
        /// Value otherwise.
        else_expr: IntExpression,
    },
    /// Sum of the body over all bindings of the declared variables.
    Sum {
        /// Bound variables.
        decls: Decls,
        /// Summed body.
        body: IntExpression,
    },
}

impl IntExpression {
    fn make(inner: IntExprInner) -> Self {
        Self {
            inner: Rc::new(inner),
        }
    }

    /// The constant integer `value`.
    pub fn constant(value: i32) -> Self {
        Self::make(IntExprInner::Constant(value))
    }

    /// The cardinality `#expr`.
    pub fn cardinality(expr: Expression) -> Self {
        Self::make(IntExprInner::Cardinality(expr))
    }

    /// Addition `self + other`.
    pub fn plus(self, other: IntExpression) -> IntExpression {
        Self::make(IntExprInner::Binary {
            left: self,
            op: IntOp::Plus,
            right: other,
        })
    }

    /// Subtraction `self - other`.
    pub fn minus(self, other: IntExpression) -> IntExpression {
        Self::make(IntExprInner::Binary {
            left: self,
            op: IntOp::Minus,
            right: other,
        })
    }

    /// Conditional integer expression.
    pub fn if_then_else(
        condition: Formula,
        then_expr: IntExpression,
        else_expr: IntExpression,
    ) -> IntExpression {
        Self::make(IntExprInner::If {
            condition,
            then_expr,
            else_expr,
        })
    }

    /// Sum of `body` over all bindings of `decls`.
    pub fn sum(decls: Decls, body: IntExpression) -> IntExpression {
        Self::make(IntExprInner::Sum { decls, body })
    }

    /// Comparison `self = other`.
    pub fn eq(self, other: IntExpression) -> Formula {
        Formula::int_comparison(self, IntCompareOp::Eq, other)
    }

    /// Comparison `self < other`.
    pub fn lt(self, other: IntExpression) -> Formula {
        Formula::int_comparison(self, IntCompareOp::Lt, other)
    }

    /// Comparison `self <= other`.
    pub fn lte(self, other: IntExpression) -> Formula {
        Formula::int_comparison(self, IntCompareOp::Lte, other)
    }

    /// Comparison `self > other`.
    pub fn gt(self, other: IntExpression) -> Formula {
        Formula::int_comparison(self, IntCompareOp::Gt, other)
    }

    /// Comparison `self >= other`.
    pub fn gte(self, other: IntExpression) -> Formula {
        Formula::int_comparison(self, IntCompareOp::Gte, other)
    }

    /// The singleton-set view of this integer expression.
    pub fn to_expression(self) -> Expression {
        Expression::from(self)
    }

    /// The node payload.
    pub fn inner(&self) -> &IntExprInner {
        &self.inner
    }
}

impl PartialEq for IntExpression {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for IntExpression {}

impl std::hash::Hash for IntExpression {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for IntExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner() {
            IntExprInner::Constant(v) => write!(f, "{v}"),
            IntExprInner::Cardinality(e) => write!(f, "#({e:?})"),
            IntExprInner::Binary { left, op, right } => {
                write!(f, "({left:?} {op:?} {right:?})")
            }
            IntExprInner::If { condition, .. } => write!(f, "if({condition:?})"),
            IntExprInner::Sum { body, .. } => write!(f, "sum(... | {body:?})"),
        }
    }
}
