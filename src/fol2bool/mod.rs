//! Translation of relational formulas to boolean circuits.
//!
//! The translator folds an annotated AST over a [`BooleanFactory`] and a
//! [`LeafInterpreter`]: expressions become sparse [`BooleanMatrix`]es,
//! formulas become circuit values, and integer expressions become
//! [`Int`] bit vectors. Quantifiers, comprehensions, and sums enumerate
//! ground values of their declarations -- every populated cell of a
//! declaration's matrix -- binding each declared variable to an indicator
//! matrix while its body is translated.

pub mod allocator;
pub mod annotated;
pub mod cache;
pub mod environment;
pub mod log;

pub use allocator::LeafInterpreter;
pub use annotated::AnnotatedNode;
pub use environment::Environment;
pub use log::{TranslationLog, TranslationRecord};

use std::sync::atomic::{AtomicBool, Ordering};

use crate::ast::visitor::{top_conjuncts, Node};
use crate::ast::{
    BinaryExprOp, BinaryFormulaOp, CompareOp, Decl, Decls, ExprKind, Expression, Formula,
    FormulaInner, IntCompareOp, IntExprInner, IntExpression, IntOp, Multiplicity, Quantifier,
    UnaryExprOp,
};
use crate::bool::{
    BoolValue, BooleanAccumulator, BooleanFactory, BooleanMatrix, Dimensions, GateOp, Int,
    Options, FALSE, TRUE,
};
use crate::error::{RelicError, Result};
use crate::instance::Bounds;

use cache::{Cached, TranslationCache};

/// The product of translating a formula: the root circuit value plus the
/// factory, allocation, and (optionally) the translation log behind it.
pub struct Translation {
    root: BoolValue,
    factory: BooleanFactory,
    interpreter: LeafInterpreter,
    log: Option<TranslationLog>,
}

impl Translation {
    /// The root circuit value.
    pub fn root(&self) -> BoolValue {
        self.root
    }

    /// The circuit factory the translation allocated into.
    pub fn factory(&self) -> &BooleanFactory {
        &self.factory
    }

    /// The leaf interpreter with the relation allocation.
    pub fn interpreter(&self) -> &LeafInterpreter {
        &self.interpreter
    }

    /// The translation log, when logging was enabled.
    pub fn log(&self) -> Option<&TranslationLog> {
        self.log.as_ref()
    }

    /// Takes the translation log out of this translation.
    pub fn take_log(&mut self) -> Option<TranslationLog> {
        self.log.take()
    }

    /// Number of primary (relation) variables.
    pub fn num_primary_variables(&self) -> u32 {
        self.interpreter.num_primary_variables()
    }

    /// Conjoins an extra circuit value onto the root, keeping the root a
    /// flat conjunction so every top conjunct stays unit-assertable. Used
    /// by the symmetry-breaking pre-pass.
    pub fn conjoin(&mut self, value: BoolValue) {
        let mut acc = BooleanAccumulator::new(GateOp::And);
        match self.factory.gate(self.root.label()) {
            Some(crate::bool::GateView::And(inputs)) if self.root.label() > 0 => {
                for input in inputs {
                    acc.add(input);
                }
            }
            _ => {
                acc.add(self.root);
            }
        }
        acc.add(value);
        self.root = self.factory.accumulate(acc);
    }
}

/// Translates `formula` under `bounds` into a circuit.
///
/// With `log_translation` set, the returned translation carries a
/// [`TranslationLog`] whose roots are the top-level conjuncts of
/// `formula`. The optional `cancel` flag is polled at quantifier
/// boundaries; setting it aborts the translation with
/// [`RelicError::Aborted`].
pub fn translate(
    formula: &Formula,
    bounds: &Bounds,
    options: &Options,
    log_translation: bool,
    cancel: Option<&AtomicBool>,
) -> Result<Translation> {
    let annotated = AnnotatedNode::new(formula);
    let mut interpreter = LeafInterpreter::new(bounds.clone());
    let factory = BooleanFactory::new(interpreter.num_primary_variables(), options.clone());

    let log = log_translation.then(|| {
        let mut log = TranslationLog::new();
        log.set_roots(top_conjuncts(formula));
        log.set_bounds(bounds.clone());
        log
    });

    let mut translator = Fol2Bool {
        annotated: &annotated,
        factory: &factory,
        interpreter: &mut interpreter,
        env: Environment::empty(),
        cache: TranslationCache::new(),
        log,
        cancel,
    };

    // the top-level conjunction becomes a single n-ary AND over the
    // conjunct values, so CNF emission can assert one unit per conjunct
    let conjuncts = top_conjuncts(formula);
    let root = if conjuncts.len() > 1 {
        let mut acc = BooleanAccumulator::new(GateOp::And);
        for conjunct in &conjuncts {
            let value = translator.formula(conjunct)?;
            if !acc.add(value) {
                break;
            }
        }
        factory.accumulate(acc)
    } else {
        translator.formula(formula)?
    };
    let log = translator.log.take();

    Ok(Translation {
        root,
        factory,
        interpreter,
        log,
    })
}

/// The translating visitor.
struct Fol2Bool<'a> {
    annotated: &'a AnnotatedNode,
    factory: &'a BooleanFactory,
    interpreter: &'a mut LeafInterpreter,
    env: Environment,
    cache: TranslationCache,
    log: Option<TranslationLog>,
    cancel: Option<&'a AtomicBool>,
}

impl Fol2Bool<'_> {
    fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(RelicError::Aborted),
            _ => Ok(()),
        }
    }

    fn formula(&mut self, f: &Formula) -> Result<BoolValue> {
        let node = Node::Formula(f.clone());
        if let Some(Cached::Formula(v)) = self.cache.lookup(self.annotated, &node, &self.env) {
            return Ok(v);
        }

        let value = match f {
            Formula::True => TRUE,
            Formula::False => FALSE,
            Formula::Ref(rc) => match rc.as_ref() {
                FormulaInner::Binary { left, op, right } => {
                    let l = self.formula(left)?;
                    let r = self.formula(right)?;
                    match op {
                        BinaryFormulaOp::And => self.factory.and(l, r),
                        BinaryFormulaOp::Or => self.factory.or(l, r),
                        BinaryFormulaOp::Implies => self.factory.implies(l, r),
                        BinaryFormulaOp::Iff => self.factory.iff(l, r),
                    }
                }
                FormulaInner::Not(inner) => self.formula(inner)?.negate(),
                FormulaInner::Comparison { left, op, right } => {
                    let l = self.expression(left)?;
                    let r = self.expression(right)?;
                    match op {
                        CompareOp::Equals => l.eq(&r, self.factory),
                        CompareOp::Subset => l.subset(&r, self.factory),
                    }
                }
                FormulaInner::Multiplicity { mult, expr } => {
                    let m = self.expression(expr)?;
                    match mult {
                        Multiplicity::Some => m.some(self.factory),
                        Multiplicity::No => m.none(self.factory),
                        Multiplicity::One => m.one(self.factory),
                        Multiplicity::Lone => m.lone(self.factory),
                        Multiplicity::Set => {
                            return Err(RelicError::InvalidArgument(
                                "SET is not a multiplicity formula".to_string(),
                            ))
                        }
                    }
                }
                FormulaInner::Quantified {
                    quantifier,
                    decls,
                    body,
                } => self.quantified(*quantifier, decls, body)?,
                FormulaInner::IntComparison { left, op, right } => {
                    let l = self.int_expr(left)?;
                    let r = self.int_expr(right)?;
                    match op {
                        IntCompareOp::Eq => l.eq(&r, self.factory),
                        IntCompareOp::Lt => l.lt(&r, self.factory),
                        IntCompareOp::Lte => l.lte(&r, self.factory),
                        IntCompareOp::Gt => l.gt(&r, self.factory),
                        IntCompareOp::Gte => l.gte(&r, self.factory),
                    }
                }
                FormulaInner::Predicate(pred) => self.formula(&pred.to_constraints())?,
            },
        };

        if let Some(log) = &mut self.log {
            match value.constant_value() {
                Some(constant) => {
                    if f.constant_value().is_none() {
                        log.record_constant(f.clone(), constant);
                    }
                }
                None => log.record(node.clone(), value.label(), self.env.snapshot()),
            }
        }
        self.cache
            .record(self.annotated, &node, &self.env, Cached::Formula(value));
        Ok(value)
    }

    fn expression(&mut self, e: &Expression) -> Result<BooleanMatrix> {
        let node = Node::Expression(e.clone());
        if let Some(Cached::Expression(m)) = self.cache.lookup(self.annotated, &node, &self.env) {
            return Ok(m);
        }

        let mut log_cells = true;
        let matrix = match e.kind() {
            ExprKind::Relation(r) => {
                log_cells = !self.interpreter.is_interpreted(r);
                self.interpreter.interpret(r, self.factory)?
            }
            ExprKind::Variable(v) => {
                log_cells = false;
                self.env
                    .lookup(v)
                    .cloned()
                    .ok_or_else(|| RelicError::UnboundLeaf(v.name().to_string()))?
            }
            ExprKind::Constant(c) => {
                log_cells = false;
                self.interpreter.interpret_constant(*c)
            }
            ExprKind::Binary { left, op, right } => {
                let l = self.expression(left)?;
                let r = self.expression(right)?;
                match op {
                    BinaryExprOp::Union => l.or(&r, self.factory),
                    BinaryExprOp::Intersection => l.and(&r, self.factory),
                    BinaryExprOp::Difference => l.difference(&r, self.factory),
                    BinaryExprOp::Join => l.dot(&r, self.factory),
                    BinaryExprOp::Product => l.cross(&r, self.factory),
                    BinaryExprOp::Override => l.override_with(&r, self.factory),
                }
            }
            ExprKind::Unary { op, expr } => {
                let m = self.expression(expr)?;
                match op {
                    UnaryExprOp::Transpose => m.transpose(),
                    UnaryExprOp::Closure => m.closure(self.factory),
                    UnaryExprOp::ReflexiveClosure => m.reflexive_closure(self.factory),
                }
            }
            ExprKind::Comprehension { decls, formula } => self.comprehension(decls, formula)?,
            ExprKind::If {
                condition,
                then_expr,
                else_expr,
            } => {
                let cond = self.formula(condition)?;
                let t = self.expression(then_expr)?;
                let e = self.expression(else_expr)?;
                t.choice(cond, &e, self.factory)
            }
            ExprKind::Project { expr, columns } => {
                let m = self.expression(expr)?;
                m.project(columns, self.factory)
            }
            ExprKind::IntCast(int) => {
                let value = self.int_expr(int)?;
                let n = self.interpreter.bounds().universe().size();
                let mut m = BooleanMatrix::new(Dimensions::square(1, n));
                for i in 0..n {
                    let here = value.eq(&self.factory.integer(i as i32), self.factory);
                    m.set(i, here);
                }
                m
            }
        };

        if log_cells {
            if let Some(log) = &mut self.log {
                let snapshot = self.env.snapshot();
                for (_, v) in matrix.cells() {
                    if !v.is_constant() {
                        log.record(node.clone(), v.label(), snapshot.clone());
                    }
                }
            }
        }
        self.cache.record(
            self.annotated,
            &node,
            &self.env,
            Cached::Expression(matrix.clone()),
        );
        Ok(matrix)
    }

    fn int_expr(&mut self, i: &IntExpression) -> Result<Int> {
        let node = Node::IntExpr(i.clone());
        if let Some(Cached::Int(v)) = self.cache.lookup(self.annotated, &node, &self.env) {
            return Ok(v);
        }

        let value = match i.inner() {
            IntExprInner::Constant(v) => self.factory.integer(*v),
            IntExprInner::Cardinality(e) => {
                let m = self.expression(e)?;
                m.cardinality(self.factory)
            }
            IntExprInner::Binary { left, op, right } => {
                let l = self.int_expr(left)?;
                let r = self.int_expr(right)?;
                match op {
                    IntOp::Plus => l.plus(&r, self.factory),
                    IntOp::Minus => l.minus(&r, self.factory),
                }
            }
            IntExprInner::If {
                condition,
                then_expr,
                else_expr,
            } => {
                let cond = self.formula(condition)?;
                let t = self.int_expr(then_expr)?;
                let e = self.int_expr(else_expr)?;
                t.choice(cond, &e, self.factory)
            }
            IntExprInner::Sum { decls, body } => self.sum(decls, body)?,
        };

        self.cache
            .record(self.annotated, &node, &self.env, Cached::Int(value.clone()));
        Ok(value)
    }

    /// Translates the declarations of a binding construct: each becomes
    /// the populated cells of its matrix, paired with the dimensions an
    /// indicator value must take.
    fn ground_values(&mut self, decls: &Decls) -> Result<Vec<GroundDecl>> {
        let mut out = Vec::with_capacity(decls.size());
        for decl in decls.iter() {
            if decl.multiplicity() != Multiplicity::One {
                return Err(RelicError::HigherOrderDecl(format!(
                    "{}: {:?} {:?}",
                    decl.variable(),
                    decl.multiplicity(),
                    decl.expression()
                )));
            }
            let matrix = self.expression(decl.expression())?;
            out.push(GroundDecl {
                decl: decl.clone(),
                dims: matrix.dimensions().clone(),
                cells: matrix.cells().collect(),
            });
        }
        Ok(out)
    }

    fn indicator(&self, dims: Dimensions, at: usize) -> BooleanMatrix {
        let mut m = BooleanMatrix::new(dims);
        m.set(at, TRUE);
        m
    }

    fn quantified(
        &mut self,
        quantifier: Quantifier,
        decls: &Decls,
        body: &Formula,
    ) -> Result<BoolValue> {
        self.check_cancelled()?;
        let ground = self.ground_values(decls)?;
        let op = match quantifier {
            Quantifier::All => GateOp::And,
            Quantifier::Some => GateOp::Or,
        };
        let mut acc = BooleanAccumulator::new(op);
        let mut guards = Vec::with_capacity(ground.len());
        self.quantified_recurse(quantifier, &ground, 0, &mut guards, &mut acc, body)?;
        Ok(self.factory.accumulate(acc))
    }

    fn quantified_recurse(
        &mut self,
        quantifier: Quantifier,
        ground: &[GroundDecl],
        level: usize,
        guards: &mut Vec<BoolValue>,
        acc: &mut BooleanAccumulator,
        body: &Formula,
    ) -> Result<()> {
        if acc.is_short_circuited() {
            return Ok(());
        }
        if level == ground.len() {
            let body_value = self.formula(body)?;
            let combined = match quantifier {
                // guard => body, i.e. !g1 | ... | !gk | body
                Quantifier::All => {
                    let mut dis = BooleanAccumulator::new(GateOp::Or);
                    for &g in guards.iter() {
                        dis.add(g.negate());
                    }
                    dis.add(body_value);
                    self.factory.accumulate(dis)
                }
                // guard && body
                Quantifier::Some => {
                    let mut con = BooleanAccumulator::new(GateOp::And);
                    for &g in guards.iter() {
                        con.add(g);
                    }
                    con.add(body_value);
                    self.factory.accumulate(con)
                }
            };
            acc.add(combined);
            return Ok(());
        }

        let cells = ground[level].cells.clone();
        for (index, guard) in cells {
            let indicator = self.indicator(ground[level].dims.clone(), index);
            self.env
                .extend(ground[level].decl.variable().clone(), indicator, index);
            guards.push(guard);
            let result = self.quantified_recurse(quantifier, ground, level + 1, guards, acc, body);
            guards.pop();
            self.env.pop();
            result?;
            if acc.is_short_circuited() {
                break;
            }
        }
        Ok(())
    }

    fn comprehension(&mut self, decls: &Decls, body: &Formula) -> Result<BooleanMatrix> {
        self.check_cancelled()?;
        let ground = self.ground_values(decls)?;
        let dims = ground
            .iter()
            .skip(1)
            .fold(ground[0].dims.clone(), |acc, g| acc.cross(&g.dims));
        let mut matrix = BooleanMatrix::new(dims);
        let mut guards = Vec::with_capacity(ground.len());
        let mut indices = Vec::with_capacity(ground.len());
        self.comprehension_recurse(&ground, 0, &mut guards, &mut indices, body, &mut matrix)?;
        Ok(matrix)
    }

    fn comprehension_recurse(
        &mut self,
        ground: &[GroundDecl],
        level: usize,
        guards: &mut Vec<BoolValue>,
        indices: &mut Vec<usize>,
        body: &Formula,
        matrix: &mut BooleanMatrix,
    ) -> Result<()> {
        if level == ground.len() {
            let body_value = self.formula(body)?;
            let mut con = BooleanAccumulator::new(GateOp::And);
            for &g in guards.iter() {
                con.add(g);
            }
            con.add(body_value);
            let cell = self.factory.accumulate(con);
            let mut flat = 0usize;
            for (g, &i) in ground.iter().zip(indices.iter()) {
                flat = flat * g.dims.capacity() + i;
            }
            matrix.set(flat, cell);
            return Ok(());
        }
        let cells = ground[level].cells.clone();
        for (index, guard) in cells {
            let indicator = self.indicator(ground[level].dims.clone(), index);
            self.env
                .extend(ground[level].decl.variable().clone(), indicator, index);
            guards.push(guard);
            indices.push(index);
            let result =
                self.comprehension_recurse(ground, level + 1, guards, indices, body, matrix);
            indices.pop();
            guards.pop();
            self.env.pop();
            result?;
        }
        Ok(())
    }

    fn sum(&mut self, decls: &Decls, body: &IntExpression) -> Result<Int> {
        self.check_cancelled()?;
        let ground = self.ground_values(decls)?;
        let mut total = self.factory.integer(0);
        let mut guards = Vec::with_capacity(ground.len());
        self.sum_recurse(&ground, 0, &mut guards, body, &mut total)?;
        Ok(total)
    }

    fn sum_recurse(
        &mut self,
        ground: &[GroundDecl],
        level: usize,
        guards: &mut Vec<BoolValue>,
        body: &IntExpression,
        total: &mut Int,
    ) -> Result<()> {
        if level == ground.len() {
            let value = self.int_expr(body)?;
            let mut con = BooleanAccumulator::new(GateOp::And);
            for &g in guards.iter() {
                con.add(g);
            }
            let guard = self.factory.accumulate(con);
            let zero = self.factory.integer(0);
            let guarded = value.choice(guard, &zero, self.factory);
            *total = total.plus(&guarded, self.factory);
            return Ok(());
        }
        let cells = ground[level].cells.clone();
        for (index, guard) in cells {
            let indicator = self.indicator(ground[level].dims.clone(), index);
            self.env
                .extend(ground[level].decl.variable().clone(), indicator, index);
            guards.push(guard);
            let result = self.sum_recurse(ground, level + 1, guards, body, total);
            guards.pop();
            self.env.pop();
            result?;
        }
        Ok(())
    }
}

/// A declaration prepared for ground-value enumeration.
struct GroundDecl {
    decl: Decl,
    dims: Dimensions,
    cells: Vec<(usize, BoolValue)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Decl, Relation, Variable};
    use crate::instance::Universe;

    fn setup() -> (Universe, Bounds) {
        let u = Universe::new(&["A", "B", "C"]).unwrap();
        (u.clone(), Bounds::new(u))
    }

    fn run(formula: &Formula, bounds: &Bounds) -> Translation {
        translate(formula, bounds, &Options::default(), false, None).unwrap()
    }

    #[test]
    fn constants_translate_to_constants() {
        let (_, bounds) = setup();
        assert!(run(&Formula::TRUE, &bounds).root().is_true());
        assert!(run(&Formula::FALSE, &bounds).root().is_false());
    }

    #[test]
    fn exactly_bound_relation_folds_to_constant() {
        let (u, mut bounds) = setup();
        let f = u.factory();
        let r = Relation::unary("r");
        bounds
            .bound_exactly(&r, f.tuple_set(&[&["A"]]).unwrap())
            .unwrap();

        // some r is TRUE under an exact non-empty bound
        let some = Expression::from(&r).some();
        assert!(run(&some, &bounds).root().is_true());

        // no r is FALSE
        let no = Expression::from(&r).no();
        assert!(run(&no, &bounds).root().is_false());
    }

    #[test]
    fn free_relation_translates_to_variables() {
        let (u, mut bounds) = setup();
        let f = u.factory();
        let r = Relation::unary("r");
        bounds.bound(&r, f.none(1), f.all(1)).unwrap();

        let some = Expression::from(&r).some();
        let t = run(&some, &bounds);
        assert!(!t.root().is_constant());
        assert_eq!(t.num_primary_variables(), 3);
    }

    #[test]
    fn universal_quantifier_over_exact_bound() {
        let (u, mut bounds) = setup();
        let f = u.factory();
        let a = Relation::unary("A");
        bounds
            .bound_exactly(&a, f.tuple_set(&[&["A"], &["B"]]).unwrap())
            .unwrap();

        // all x: A | x in A -- trivially true
        let x = Variable::unary("x");
        let formula = Formula::forall(
            Decls::from(Decl::one_of(x.clone(), Expression::from(&a))),
            Expression::from(&x).in_set(Expression::from(&a)),
        );
        assert!(run(&formula, &bounds).root().is_true());
    }

    #[test]
    fn existential_finds_witness() {
        let (u, mut bounds) = setup();
        let f = u.factory();
        let a = Relation::unary("A");
        let b = Relation::unary("B");
        bounds
            .bound_exactly(&a, f.tuple_set(&[&["A"], &["B"]]).unwrap())
            .unwrap();
        bounds
            .bound_exactly(&b, f.tuple_set(&[&["B"]]).unwrap())
            .unwrap();

        // some x: A | x in B -- witnessed by B
        let x = Variable::unary("x");
        let formula = Formula::exists(
            Decls::from(Decl::one_of(x.clone(), Expression::from(&a))),
            Expression::from(&x).in_set(Expression::from(&b)),
        );
        assert!(run(&formula, &bounds).root().is_true());
    }

    #[test]
    fn quantifier_shadowing_resolves_inner() {
        let (u, mut bounds) = setup();
        let f = u.factory();
        let a = Relation::unary("A");
        let b = Relation::unary("B");
        bounds
            .bound_exactly(&a, f.tuple_set(&[&["A"]]).unwrap())
            .unwrap();
        bounds.bound(&b, f.none(1), f.all(1)).unwrap();

        // all x: A | some x: B | x in x  -- the inner x shadows the outer,
        // so this is equivalent to some B
        let x = Variable::unary("x");
        let inner = Formula::exists(
            Decls::from(Decl::one_of(x.clone(), Expression::from(&b))),
            Expression::from(&x).in_set(Expression::from(&x)),
        );
        let outer = Formula::forall(
            Decls::from(Decl::one_of(x.clone(), Expression::from(&a))),
            inner,
        );
        let some_b = Expression::from(&b).some();

        // both factories allocate identically, so the roots share a label
        let t1 = run(&outer, &bounds);
        let t2 = run(&some_b, &bounds);
        assert_eq!(t1.root(), t2.root());
    }

    #[test]
    fn comprehension_builds_matrix() {
        let (u, mut bounds) = setup();
        let f = u.factory();
        let a = Relation::unary("A");
        bounds
            .bound_exactly(&a, f.tuple_set(&[&["A"], &["C"]]).unwrap())
            .unwrap();

        // { x: A | x in A } = A
        let x = Variable::unary("x");
        let comp = Expression::comprehension(
            Decls::from(Decl::one_of(x.clone(), Expression::from(&a))),
            Expression::from(&x).in_set(Expression::from(&a)),
        );
        let formula = comp.equals(Expression::from(&a));
        assert!(run(&formula, &bounds).root().is_true());
    }

    #[test]
    fn unbound_variable_is_an_error() {
        let (_, bounds) = setup();
        let x = Variable::unary("x");
        let formula = Expression::from(&x).some();
        let err = translate(&formula, &bounds, &Options::default(), false, None);
        assert!(matches!(err, Err(RelicError::UnboundLeaf(_))));
    }

    #[test]
    fn higher_order_decl_is_an_error() {
        let (u, mut bounds) = setup();
        let f = u.factory();
        let a = Relation::unary("A");
        bounds.bound_exactly(&a, f.all(1)).unwrap();
        let x = Variable::unary("x");
        let formula = Formula::forall(
            Decls::from(Decl::set_of(x.clone(), Expression::from(&a))),
            Expression::from(&x).some(),
        );
        let err = translate(&formula, &bounds, &Options::default(), false, None);
        assert!(matches!(err, Err(RelicError::HigherOrderDecl(_))));
    }

    #[test]
    fn cardinality_comparison() {
        let (u, mut bounds) = setup();
        let f = u.factory();
        let r = Relation::unary("r");
        bounds
            .bound_exactly(&r, f.tuple_set(&[&["A"], &["B"], &["C"]]).unwrap())
            .unwrap();

        let three = Expression::from(&r).count().eq(IntExpression::constant(3));
        assert!(run(&three, &bounds).root().is_true());

        let less = Expression::from(&r).count().lt(IntExpression::constant(3));
        assert!(run(&less, &bounds).root().is_false());
    }

    #[test]
    fn log_records_roots_and_literals() {
        let (u, mut bounds) = setup();
        let f = u.factory();
        let r = Relation::unary("r");
        bounds.bound(&r, f.none(1), f.all(1)).unwrap();

        let some = Expression::from(&r).some();
        let no = Expression::from(&r).no();
        let formula = some.clone().and(no.clone());
        let t = translate(&formula, &bounds, &Options::default(), true, None).unwrap();
        let log = t.log().expect("logging enabled");
        assert_eq!(log.roots(), &[some, no]);
        assert!(!log.is_empty());
        // the relation's three variables appear among the records
        let mut vars: Vec<i32> = log
            .replay()
            .filter(|r| matches!(r.node, Node::Expression(_)))
            .map(|r| r.literal)
            .collect();
        vars.sort_unstable();
        vars.dedup();
        assert_eq!(vars, vec![1, 2, 3]);
    }

    #[test]
    fn cancellation_aborts() {
        let (u, mut bounds) = setup();
        let f = u.factory();
        let a = Relation::unary("A");
        bounds.bound_exactly(&a, f.all(1)).unwrap();
        let x = Variable::unary("x");
        let formula = Formula::forall(
            Decls::from(Decl::one_of(x.clone(), Expression::from(&a))),
            Expression::from(&x).some(),
        );
        let cancel = AtomicBool::new(true);
        let err = translate(&formula, &bounds, &Options::default(), false, Some(&cancel));
        assert!(matches!(err, Err(RelicError::Aborted)));
    }
}
