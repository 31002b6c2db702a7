//! AST types for relational logic.
//!
//! Nodes are immutable value objects with identity by reference: builder
//! methods never deduplicate, and a subtree is shared only when the caller
//! shares the reference. The annotation pass counts those shared references
//! to decide what to cache during translation.

mod formula;
mod int_expr;
pub mod visitor;

pub use formula::{
    BinaryFormulaOp, CompareOp, Decl, Decls, Formula, FormulaInner, Multiplicity, Quantifier,
    RelationPredicate, RelationPredicateName,
};
pub use int_expr::{IntCompareOp, IntExprInner, IntExpression, IntOp};

use std::fmt;
use std::rc::Rc;

/// A named relation with a fixed arity.
///
/// Relations are leaves of the expression language. Two relations are equal
/// iff they are the same object; names exist for display only.
#[derive(Clone)]
pub struct Relation {
    inner: Rc<RelationInner>,
}

struct RelationInner {
    name: String,
    arity: usize,
}

impl Relation {
    /// Creates a relation of the given arity.
    ///
    /// # Panics
    /// Panics if `arity` is 0.
    pub fn nary(name: impl Into<String>, arity: usize) -> Self {
        assert!(arity >= 1, "arity must be at least 1, got {arity}");
        Self {
            inner: Rc::new(RelationInner {
                name: name.into(),
                arity,
            }),
        }
    }

    /// Creates a unary relation.
    pub fn unary(name: impl Into<String>) -> Self {
        Self::nary(name, 1)
    }

    /// Creates a binary relation.
    pub fn binary(name: impl Into<String>) -> Self {
        Self::nary(name, 2)
    }

    /// Creates a ternary relation.
    pub fn ternary(name: impl Into<String>) -> Self {
        Self::nary(name, 3)
    }

    /// The display name of this relation.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The arity of this relation.
    pub fn arity(&self) -> usize {
        self.inner.arity
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Relation {}

impl std::hash::Hash for Relation {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Relation({}/{})", self.name(), self.arity())
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A quantified variable. Identity semantics match [`Relation`]: two
/// variables are equal iff they are the same object.
#[derive(Clone)]
pub struct Variable {
    inner: Rc<RelationInner>,
}

impl Variable {
    /// Creates a variable of the given arity.
    ///
    /// # Panics
    /// Panics if `arity` is 0.
    pub fn nary(name: impl Into<String>, arity: usize) -> Self {
        assert!(arity >= 1, "arity must be at least 1, got {arity}");
        Self {
            inner: Rc::new(RelationInner {
                name: name.into(),
                arity,
            }),
        }
    }

    /// Creates a unary variable.
    pub fn unary(name: impl Into<String>) -> Self {
        Self::nary(name, 1)
    }

    /// The display name of this variable.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The arity of this variable.
    pub fn arity(&self) -> usize {
        self.inner.arity
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Variable {}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Variable({}/{})", self.name(), self.arity())
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The constant expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantExpr {
    /// All atoms of the universe (arity 1).
    Univ,
    /// The identity relation over the universe (arity 2).
    Iden,
    /// The empty unary relation.
    None,
}

/// Binary expression operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryExprOp {
    /// Set union.
    Union,
    /// Set intersection.
    Intersection,
    /// Set difference.
    Difference,
    /// Relational join (dot product).
    Join,
    /// Cross product.
    Product,
    /// Relational override.
    Override,
}

/// Unary expression operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryExprOp {
    /// Transpose of a binary relation.
    Transpose,
    /// Transitive closure of a binary relation.
    Closure,
    /// Reflexive transitive closure of a binary relation.
    ReflexiveClosure,
}

/// A relational expression.
///
/// Expressions are reference-counted; [`Clone`] shares the node, and
/// equality is identity.
#[derive(Clone)]
pub struct Expression {
    inner: Rc<ExprInner>,
}

/// Payload of an [`Expression`] node.
#[derive(Debug)]
pub struct ExprInner {
    kind: ExprKind,
    arity: usize,
}

impl ExprInner {
    /// The node kind.
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }
}

/// The expression node kinds.
#[derive(Debug)]
pub enum ExprKind {
    /// A relation leaf.
    Relation(Relation),
    /// A quantified-variable leaf.
    Variable(Variable),
    /// UNIV, IDEN, or NONE.
    Constant(ConstantExpr),
    /// A binary combinator.
    Binary {
        /// Left operand.
        left: Expression,
        /// Operator.
        op: BinaryExprOp,
        /// Right operand.
        right: Expression,
    },
    /// A unary combinator.
    Unary {
        /// Operator.
        op: UnaryExprOp,
        /// Operand.
        expr: Expression,
    },
    /// Set comprehension `{ decls | formula }`.
    Comprehension {
        /// Bound variables.
        decls: Decls,
        /// Membership condition.
        formula: Formula,
    },
    /// `if condition then then_expr else else_expr`.
    If {
        /// Branch condition.
        condition: Formula,
        /// Value when the condition holds.
        then_expr: Expression,
        /// Value otherwise.
        else_expr: Expression,
    },
    /// Projection of an expression onto the given column positions.
    Project {
        /// Projected expression.
        expr: Expression,
        /// Zero-based columns, each `< expr.arity()`.
        columns: Vec<usize>,
    },
    /// An integer expression viewed as a singleton set over the atom whose
    /// index equals the integer value.
    IntCast(IntExpression),
}

impl Expression {
    fn make(kind: ExprKind, arity: usize) -> Self {
        Self {
            inner: Rc::new(ExprInner { kind, arity }),
        }
    }

    /// The UNIV constant: all atoms.
    pub fn univ() -> Self {
        Self::make(ExprKind::Constant(ConstantExpr::Univ), 1)
    }

    /// The IDEN constant: the identity relation.
    pub fn iden() -> Self {
        Self::make(ExprKind::Constant(ConstantExpr::Iden), 2)
    }

    /// The NONE constant: the empty unary relation.
    pub fn none() -> Self {
        Self::make(ExprKind::Constant(ConstantExpr::None), 1)
    }

    /// The arity of this expression.
    pub fn arity(&self) -> usize {
        self.inner.arity
    }

    /// The node payload.
    pub fn inner(&self) -> &ExprInner {
        &self.inner
    }

    /// The node kind.
    pub fn kind(&self) -> &ExprKind {
        &self.inner.kind
    }

    fn binary(self, op: BinaryExprOp, other: Expression) -> Expression {
        let arity = match op {
            BinaryExprOp::Union
            | BinaryExprOp::Intersection
            | BinaryExprOp::Difference
            | BinaryExprOp::Override => {
                assert_eq!(
                    self.arity(),
                    other.arity(),
                    "arity mismatch: {:?} and {:?}",
                    self,
                    other
                );
                self.arity()
            }
            BinaryExprOp::Join => {
                let arity = self.arity() + other.arity();
                assert!(arity >= 3, "cannot join two unary expressions");
                arity - 2
            }
            BinaryExprOp::Product => self.arity() + other.arity(),
        };
        Expression::make(
            ExprKind::Binary {
                left: self,
                op,
                right: other,
            },
            arity,
        )
    }

    /// Set union `self + other`.
    ///
    /// # Panics
    /// Panics on an arity mismatch.
    pub fn union(self, other: Expression) -> Expression {
        self.binary(BinaryExprOp::Union, other)
    }

    /// Set intersection `self & other`.
    ///
    /// # Panics
    /// Panics on an arity mismatch.
    pub fn intersection(self, other: Expression) -> Expression {
        self.binary(BinaryExprOp::Intersection, other)
    }

    /// Set difference `self - other`.
    ///
    /// # Panics
    /// Panics on an arity mismatch.
    pub fn difference(self, other: Expression) -> Expression {
        self.binary(BinaryExprOp::Difference, other)
    }

    /// Relational join `self . other`.
    ///
    /// # Panics
    /// Panics if both operands are unary.
    pub fn join(self, other: Expression) -> Expression {
        self.binary(BinaryExprOp::Join, other)
    }

    /// Cross product `self -> other`.
    pub fn product(self, other: Expression) -> Expression {
        self.binary(BinaryExprOp::Product, other)
    }

    /// Relational override `self ++ other`.
    ///
    /// # Panics
    /// Panics on an arity mismatch.
    pub fn override_with(self, other: Expression) -> Expression {
        self.binary(BinaryExprOp::Override, other)
    }

    fn unary(self, op: UnaryExprOp) -> Expression {
        assert_eq!(self.arity(), 2, "{op:?} requires a binary expression");
        Expression::make(ExprKind::Unary { op, expr: self }, 2)
    }

    /// Transpose `~self`.
    ///
    /// # Panics
    /// Panics unless `self` is binary.
    pub fn transpose(self) -> Expression {
        self.unary(UnaryExprOp::Transpose)
    }

    /// Transitive closure `^self`.
    ///
    /// # Panics
    /// Panics unless `self` is binary.
    pub fn closure(self) -> Expression {
        self.unary(UnaryExprOp::Closure)
    }

    /// Reflexive transitive closure `*self`.
    ///
    /// # Panics
    /// Panics unless `self` is binary.
    pub fn reflexive_closure(self) -> Expression {
        self.unary(UnaryExprOp::ReflexiveClosure)
    }

    /// Set comprehension `{ decls | formula }`. The arity is the sum of the
    /// declared variables' arities.
    pub fn comprehension(decls: Decls, formula: Formula) -> Expression {
        let arity = decls.iter().map(|d| d.variable().arity()).sum();
        Expression::make(ExprKind::Comprehension { decls, formula }, arity)
    }

    /// Conditional expression.
    ///
    /// # Panics
    /// Panics if the branch arities differ.
    pub fn if_then_else(
        condition: Formula,
        then_expr: Expression,
        else_expr: Expression,
    ) -> Expression {
        assert_eq!(
            then_expr.arity(),
            else_expr.arity(),
            "arity mismatch between conditional branches"
        );
        let arity = then_expr.arity();
        Expression::make(
            ExprKind::If {
                condition,
                then_expr,
                else_expr,
            },
            arity,
        )
    }

    /// Projection of this expression onto the given columns.
    ///
    /// # Panics
    /// Panics if `columns` is empty or names a column out of range.
    pub fn project(self, columns: &[usize]) -> Expression {
        assert!(!columns.is_empty(), "projection needs at least one column");
        for &c in columns {
            assert!(c < self.arity(), "column {} out of range for {:?}", c, self);
        }
        let arity = columns.len();
        Expression::make(
            ExprKind::Project {
                expr: self,
                columns: columns.to_vec(),
            },
            arity,
        )
    }

    /// The cardinality `#self` of this expression.
    pub fn count(self) -> IntExpression {
        IntExpression::cardinality(self)
    }
}

impl From<Relation> for Expression {
    fn from(r: Relation) -> Self {
        let arity = r.arity();
        Expression::make(ExprKind::Relation(r), arity)
    }
}

impl From<&Relation> for Expression {
    fn from(r: &Relation) -> Self {
        Expression::from(r.clone())
    }
}

impl From<Variable> for Expression {
    fn from(v: Variable) -> Self {
        let arity = v.arity();
        Expression::make(ExprKind::Variable(v), arity)
    }
}

impl From<&Variable> for Expression {
    fn from(v: &Variable) -> Self {
        Expression::from(v.clone())
    }
}

impl From<IntExpression> for Expression {
    fn from(i: IntExpression) -> Self {
        Expression::make(ExprKind::IntCast(i), 1)
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Expression {}

impl std::hash::Hash for Expression {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Relation(r) => write!(f, "{}", r.name()),
            ExprKind::Variable(v) => write!(f, "{}", v.name()),
            ExprKind::Constant(c) => write!(f, "{c:?}"),
            ExprKind::Binary { left, op, right } => write!(f, "({left:?} {op:?} {right:?})"),
            ExprKind::Unary { op, expr } => write!(f, "{op:?}({expr:?})"),
            ExprKind::Comprehension { formula, .. } => write!(f, "{{decls | {formula:?}}}"),
            ExprKind::If { condition, .. } => write!(f, "if({condition:?})"),
            ExprKind::Project { expr, columns } => write!(f, "project({expr:?}, {columns:?})"),
            ExprKind::IntCast(i) => write!(f, "Int[{i:?}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_relations() {
        let r1 = Relation::unary("Person");
        assert_eq!(r1.name(), "Person");
        assert_eq!(r1.arity(), 1);

        let r2 = Relation::binary("knows");
        assert_eq!(r2.arity(), 2);

        let r3 = Relation::nary("custom", 5);
        assert_eq!(r3.arity(), 5);
    }

    #[test]
    fn relation_identity() {
        let r1 = Relation::unary("Person");
        let r2 = Relation::unary("Person");
        let r3 = r1.clone();

        assert_eq!(r1, r3);
        // same name, different object
        assert_ne!(r1, r2);
    }

    #[test]
    #[should_panic(expected = "arity must be at least 1")]
    fn zero_arity_panics() {
        Relation::nary("invalid", 0);
    }

    #[test]
    fn expression_arities() {
        let a = Relation::unary("a");
        let r = Relation::binary("r");

        assert_eq!(Expression::from(&a).product(Expression::from(&r)).arity(), 3);
        assert_eq!(Expression::from(&a).join(Expression::from(&r)).arity(), 1);
        assert_eq!(Expression::from(&r).transpose().arity(), 2);
        assert_eq!(Expression::univ().arity(), 1);
        assert_eq!(Expression::iden().arity(), 2);
    }

    #[test]
    #[should_panic(expected = "arity mismatch")]
    fn union_arity_mismatch_panics() {
        let a = Relation::unary("a");
        let r = Relation::binary("r");
        let _ = Expression::from(&a).union(Expression::from(&r));
    }

    #[test]
    #[should_panic(expected = "requires a binary expression")]
    fn closure_of_unary_panics() {
        let a = Relation::unary("a");
        let _ = Expression::from(&a).closure();
    }

    #[test]
    #[should_panic(expected = "cannot join two unary")]
    fn join_of_unaries_panics() {
        let a = Relation::unary("a");
        let b = Relation::unary("b");
        let _ = Expression::from(&a).join(Expression::from(&b));
    }

    #[test]
    fn projection() {
        let t = Relation::ternary("t");
        let p = Expression::from(&t).project(&[2, 0]);
        assert_eq!(p.arity(), 2);
    }

    #[test]
    fn expression_identity() {
        let r = Relation::unary("r");
        let e1 = Expression::from(&r);
        let e2 = Expression::from(&r);
        // distinct nodes over the same relation
        assert_ne!(e1, e2);
        assert_eq!(e1, e1.clone());
    }
}
