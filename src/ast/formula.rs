//! Formula nodes, declarations, and relation predicates.

use std::fmt;
use std::rc::Rc;

use super::int_expr::{IntCompareOp, IntExpression};
use super::{Expression, Relation, Variable};

/// Relation predicate names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationPredicateName {
    /// The relation has no cycles.
    Acyclic,
    /// The relation totally orders a set.
    TotalOrdering,
    /// The relation is a total function.
    Function,
}

/// Built-in constraints on binary relations. Each predicate can be inlined
/// into ordinary formulas through [`RelationPredicate::to_constraints`].
#[derive(Debug, Clone)]
pub enum RelationPredicate {
    /// `no (^relation & iden)`.
    Acyclic {
        /// The binary relation that must be acyclic.
        relation: Relation,
    },
    /// `relation` orders `ordered` from `first` to `last`.
    TotalOrdering {
        /// The ordering relation.
        relation: Relation,
        /// The unary set being ordered.
        ordered: Relation,
        /// First element of the ordering.
        first: Relation,
        /// Last element of the ordering.
        last: Relation,
    },
    /// `relation` is a total function from `domain` to `range`.
    Function {
        /// The binary relation that must be a function.
        relation: Relation,
        /// Function domain (unary).
        domain: Expression,
        /// Function range (unary).
        range: Expression,
    },
}

impl RelationPredicate {
    /// Creates an acyclicity predicate.
    ///
    /// # Panics
    /// Panics unless `relation` is binary.
    pub fn acyclic(relation: Relation) -> Self {
        assert_eq!(relation.arity(), 2, "acyclic requires a binary relation");
        RelationPredicate::Acyclic { relation }
    }

    /// Creates a total-ordering predicate.
    ///
    /// # Panics
    /// Panics if `relation` is not binary or the other relations not unary.
    pub fn total_ordering(
        relation: Relation,
        ordered: Relation,
        first: Relation,
        last: Relation,
    ) -> Self {
        assert_eq!(relation.arity(), 2, "total ordering requires a binary relation");
        assert_eq!(ordered.arity(), 1, "ordered must be unary");
        assert_eq!(first.arity(), 1, "first must be unary");
        assert_eq!(last.arity(), 1, "last must be unary");
        RelationPredicate::TotalOrdering {
            relation,
            ordered,
            first,
            last,
        }
    }

    /// Creates a function predicate.
    ///
    /// # Panics
    /// Panics if `relation` is not binary or domain/range not unary.
    pub fn function(relation: Relation, domain: Expression, range: Expression) -> Self {
        assert_eq!(relation.arity(), 2, "function requires a binary relation");
        assert_eq!(domain.arity(), 1, "domain must be unary");
        assert_eq!(range.arity(), 1, "range must be unary");
        RelationPredicate::Function {
            relation,
            domain,
            range,
        }
    }

    /// The name of this predicate.
    pub fn name(&self) -> RelationPredicateName {
        match self {
            RelationPredicate::Acyclic { .. } => RelationPredicateName::Acyclic,
            RelationPredicate::TotalOrdering { .. } => RelationPredicateName::TotalOrdering,
            RelationPredicate::Function { .. } => RelationPredicateName::Function,
        }
    }

    /// The primary relation constrained by this predicate.
    pub fn relation(&self) -> &Relation {
        match self {
            RelationPredicate::Acyclic { relation } => relation,
            RelationPredicate::TotalOrdering { relation, .. } => relation,
            RelationPredicate::Function { relation, .. } => relation,
        }
    }

    /// Expands this predicate into the equivalent ordinary formula.
    pub fn to_constraints(&self) -> Formula {
        match self {
            RelationPredicate::Acyclic { relation } => {
                // no (^relation & iden)
                Expression::from(relation)
                    .closure()
                    .intersection(Expression::iden())
                    .no()
            }
            RelationPredicate::TotalOrdering {
                relation,
                ordered,
                first,
                last,
            } => {
                let f0 = Expression::from(first)
                    .one()
                    .and(Expression::from(last).one())
                    .and(Expression::from(last).in_set(Expression::from(ordered)));

                // ordered = first.*relation
                let f1 = Expression::from(ordered).equals(
                    Expression::from(first).join(Expression::from(relation).reflexive_closure()),
                );

                // nothing precedes first, nothing follows last
                let f2 = Expression::from(relation)
                    .join(Expression::from(first))
                    .no()
                    .and(Expression::from(last).join(Expression::from(relation)).no());

                // all e: ordered - last | one e.relation
                let e = Variable::unary(format!("ord_{}", relation.name()));
                let f3 = Formula::forall(
                    Decls::from(Decl::one_of(
                        e.clone(),
                        Expression::from(ordered).difference(Expression::from(last)),
                    )),
                    Expression::from(e).join(Expression::from(relation)).one(),
                );

                f0.and(f1).and(f2).and(f3)
            }
            RelationPredicate::Function {
                relation,
                domain,
                range,
            } => {
                // relation in domain->range && all x: domain | one x.relation
                let f0 = Expression::from(relation)
                    .in_set(domain.clone().product(range.clone()));

                let x = Variable::unary(format!("fun_{}", relation.name()));
                let f1 = Formula::forall(
                    Decls::from(Decl::one_of(x.clone(), domain.clone())),
                    Expression::from(x).join(Expression::from(relation)).one(),
                );

                f0.and(f1)
            }
        }
    }
}

/// Binary formula operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryFormulaOp {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
    /// Implication.
    Implies,
    /// Biconditional.
    Iff,
}

/// Expression comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// Set equality.
    Equals,
    /// Subset.
    Subset,
}

/// Multiplicity operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    /// At least one tuple.
    Some,
    /// Exactly one tuple.
    One,
    /// At most one tuple.
    Lone,
    /// No tuples.
    No,
    /// Unconstrained (declarations only).
    Set,
}

/// Quantifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// Universal.
    All,
    /// Existential.
    Some,
}

/// A first-order formula.
///
/// The TRUE/FALSE constants are inline variants; all compound formulas are
/// reference-counted, with equality by identity.
#[derive(Clone)]
pub enum Formula {
    /// Constant TRUE.
    True,
    /// Constant FALSE.
    False,
    /// A compound formula.
    Ref(Rc<FormulaInner>),
}

/// Compound formula node kinds.
#[derive(Debug)]
pub enum FormulaInner {
    /// Binary connective.
    Binary {
        /// Left operand.
        left: Formula,
        /// Operator.
        op: BinaryFormulaOp,
        /// Right operand.
        right: Formula,
    },
    /// Negation.
    Not(Formula),
    /// Expression comparison.
    Comparison {
        /// Left expression.
        left: Expression,
        /// Operator.
        op: CompareOp,
        /// Right expression.
        right: Expression,
    },
    /// Multiplicity constraint on an expression.
    Multiplicity {
        /// The multiplicity.
        mult: Multiplicity,
        /// The constrained expression.
        expr: Expression,
    },
    /// Quantified formula.
    Quantified {
        /// The quantifier.
        quantifier: Quantifier,
        /// Bound variables.
        decls: Decls,
        /// Quantified body.
        body: Formula,
    },
    /// Integer comparison.
    IntComparison {
        /// Left integer expression.
        left: IntExpression,
        /// Operator.
        op: IntCompareOp,
        /// Right integer expression.
        right: IntExpression,
    },
    /// A relation predicate.
    Predicate(RelationPredicate),
}

impl Formula {
    /// Constant TRUE.
    pub const TRUE: Formula = Formula::True;

    /// Constant FALSE.
    pub const FALSE: Formula = Formula::False;

    /// The constant formula with the given truth value.
    pub fn constant(value: bool) -> Formula {
        if value {
            Formula::TRUE
        } else {
            Formula::FALSE
        }
    }

    fn make(inner: FormulaInner) -> Formula {
        Formula::Ref(Rc::new(inner))
    }

    /// Conjunction `self && other`.
    pub fn and(self, other: Formula) -> Formula {
        Formula::make(FormulaInner::Binary {
            left: self,
            op: BinaryFormulaOp::And,
            right: other,
        })
    }

    /// Disjunction `self || other`.
    pub fn or(self, other: Formula) -> Formula {
        Formula::make(FormulaInner::Binary {
            left: self,
            op: BinaryFormulaOp::Or,
            right: other,
        })
    }

    /// Implication `self => other`.
    pub fn implies(self, other: Formula) -> Formula {
        Formula::make(FormulaInner::Binary {
            left: self,
            op: BinaryFormulaOp::Implies,
            right: other,
        })
    }

    /// Biconditional `self <=> other`.
    pub fn iff(self, other: Formula) -> Formula {
        Formula::make(FormulaInner::Binary {
            left: self,
            op: BinaryFormulaOp::Iff,
            right: other,
        })
    }

    /// Negation `!self`.
    pub fn not(self) -> Formula {
        Formula::make(FormulaInner::Not(self))
    }

    /// Right-folded conjunction of `formulas`; TRUE when empty.
    pub fn and_all(formulas: Vec<Formula>) -> Formula {
        let mut iter = formulas.into_iter().rev();
        let Some(last) = iter.next() else {
            return Formula::TRUE;
        };
        iter.fold(last, |acc, f| f.and(acc))
    }

    /// Right-folded disjunction of `formulas`; FALSE when empty.
    pub fn or_all(formulas: Vec<Formula>) -> Formula {
        let mut iter = formulas.into_iter().rev();
        let Some(last) = iter.next() else {
            return Formula::FALSE;
        };
        iter.fold(last, |acc, f| f.or(acc))
    }

    /// Universal quantification `all decls | body`.
    pub fn forall(decls: Decls, body: Formula) -> Formula {
        Formula::make(FormulaInner::Quantified {
            quantifier: Quantifier::All,
            decls,
            body,
        })
    }

    /// Existential quantification `some decls | body`.
    pub fn exists(decls: Decls, body: Formula) -> Formula {
        Formula::make(FormulaInner::Quantified {
            quantifier: Quantifier::Some,
            decls,
            body,
        })
    }

    /// Integer comparison.
    pub fn int_comparison(left: IntExpression, op: IntCompareOp, right: IntExpression) -> Formula {
        Formula::make(FormulaInner::IntComparison { left, op, right })
    }

    /// Wraps a relation predicate as a formula.
    pub fn predicate(pred: RelationPredicate) -> Formula {
        Formula::make(FormulaInner::Predicate(pred))
    }

    /// Set comprehension `{ decls | self }`.
    pub fn comprehension(self, decls: Decls) -> Expression {
        Expression::comprehension(decls, self)
    }

    /// Conditional expression `self => then_expr else else_expr`.
    ///
    /// # Panics
    /// Panics if the branch arities differ.
    pub fn then_else(self, then_expr: Expression, else_expr: Expression) -> Expression {
        Expression::if_then_else(self, then_expr, else_expr)
    }

    /// Conditional integer expression.
    pub fn then_else_int(self, then_expr: IntExpression, else_expr: IntExpression) -> IntExpression {
        IntExpression::if_then_else(self, then_expr, else_expr)
    }

    /// The compound payload, or `None` for the constants.
    pub fn inner(&self) -> Option<&FormulaInner> {
        match self {
            Formula::Ref(rc) => Some(rc),
            _ => None,
        }
    }

    /// The constant truth value, if this formula is TRUE or FALSE.
    pub fn constant_value(&self) -> Option<bool> {
        match self {
            Formula::True => Some(true),
            Formula::False => Some(false),
            Formula::Ref(_) => None,
        }
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Formula::True, Formula::True) => true,
            (Formula::False, Formula::False) => true,
            (Formula::Ref(a), Formula::Ref(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Formula {}

impl std::hash::Hash for Formula {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Formula::True => 0usize.hash(state),
            Formula::False => 1usize.hash(state),
            Formula::Ref(rc) => Rc::as_ptr(rc).hash(state),
        }
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => write!(f, "TRUE"),
            Formula::False => write!(f, "FALSE"),
            Formula::Ref(rc) => match rc.as_ref() {
                FormulaInner::Binary { left, op, right } => {
                    write!(f, "({left:?} {op:?} {right:?})")
                }
                FormulaInner::Not(inner) => write!(f, "!({inner:?})"),
                FormulaInner::Comparison { left, op, right } => {
                    write!(f, "({left:?} {op:?} {right:?})")
                }
                FormulaInner::Multiplicity { mult, expr } => write!(f, "{mult:?}({expr:?})"),
                FormulaInner::Quantified {
                    quantifier, body, ..
                } => write!(f, "{quantifier:?}(... | {body:?})"),
                FormulaInner::IntComparison { left, op, right } => {
                    write!(f, "({left:?} {op:?} {right:?})")
                }
                FormulaInner::Predicate(p) => write!(f, "{:?}({})", p.name(), p.relation()),
            },
        }
    }
}

impl Expression {
    /// Equality comparison `self = other`.
    pub fn equals(self, other: Expression) -> Formula {
        Formula::make(FormulaInner::Comparison {
            left: self,
            op: CompareOp::Equals,
            right: other,
        })
    }

    /// Subset comparison `self in other`.
    pub fn in_set(self, other: Expression) -> Formula {
        Formula::make(FormulaInner::Comparison {
            left: self,
            op: CompareOp::Subset,
            right: other,
        })
    }

    /// `some self`.
    pub fn some(self) -> Formula {
        Formula::make(FormulaInner::Multiplicity {
            mult: Multiplicity::Some,
            expr: self,
        })
    }

    /// `one self`.
    pub fn one(self) -> Formula {
        Formula::make(FormulaInner::Multiplicity {
            mult: Multiplicity::One,
            expr: self,
        })
    }

    /// `lone self`.
    pub fn lone(self) -> Formula {
        Formula::make(FormulaInner::Multiplicity {
            mult: Multiplicity::Lone,
            expr: self,
        })
    }

    /// `no self`.
    pub fn no(self) -> Formula {
        Formula::make(FormulaInner::Multiplicity {
            mult: Multiplicity::No,
            expr: self,
        })
    }
}

/// A single variable declaration `variable: mult expression`.
#[derive(Clone, Debug)]
pub struct Decl {
    variable: Variable,
    multiplicity: Multiplicity,
    expression: Expression,
}

impl Decl {
    /// Creates a declaration with the given multiplicity.
    ///
    /// # Panics
    /// Panics if the variable's arity differs from the expression's.
    pub fn new(variable: Variable, multiplicity: Multiplicity, expression: Expression) -> Self {
        assert_eq!(
            variable.arity(),
            expression.arity(),
            "declared variable and expression arities differ"
        );
        Self {
            variable,
            multiplicity,
            expression,
        }
    }

    /// `variable: one expression` -- the default for quantifiers.
    pub fn one_of(variable: Variable, expression: Expression) -> Self {
        Self::new(variable, Multiplicity::One, expression)
    }

    /// `variable: lone expression`.
    pub fn lone_of(variable: Variable, expression: Expression) -> Self {
        Self::new(variable, Multiplicity::Lone, expression)
    }

    /// `variable: some expression`.
    pub fn some_of(variable: Variable, expression: Expression) -> Self {
        Self::new(variable, Multiplicity::Some, expression)
    }

    /// `variable: set expression`.
    pub fn set_of(variable: Variable, expression: Expression) -> Self {
        Self::new(variable, Multiplicity::Set, expression)
    }

    /// The declared variable.
    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// The declaration's multiplicity.
    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    /// The bounding expression.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

/// An ordered, non-empty sequence of declarations.
#[derive(Clone, Debug)]
pub struct Decls {
    declarations: Vec<Decl>,
}

impl Decls {
    /// A single-declaration sequence.
    pub fn from(decl: Decl) -> Self {
        Self {
            declarations: vec![decl],
        }
    }

    /// A sequence from a vector of declarations.
    ///
    /// # Panics
    /// Panics if `declarations` is empty.
    pub fn from_vec(declarations: Vec<Decl>) -> Self {
        assert!(!declarations.is_empty(), "cannot create empty Decls");
        Self { declarations }
    }

    /// Number of declarations.
    pub fn size(&self) -> usize {
        self.declarations.len()
    }

    /// Iterates the declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Decl> {
        self.declarations.iter()
    }

    /// Appends a declaration.
    pub fn and(mut self, decl: Decl) -> Self {
        self.declarations.push(decl);
        self
    }
}
