/*
 * Kodkod -- Copyright (c) 2005-present, Emina Torlak
 * Rust port -- Copyright (c) 2024
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
 * THE SOFTWARE.
 */

//! Ground evaluation of formulas under a concrete instance.
//!
//! Where the translator produces circuits over unknowns, the evaluator
//! computes plain tuple sets and truth values: every relation's extension
//! comes from the instance. Used to check solver output and to decide
//! formulas over fully known instances.

use crate::ast::{
    BinaryExprOp, BinaryFormulaOp, CompareOp, ConstantExpr, Decls, ExprKind, Expression, Formula,
    FormulaInner, IntCompareOp, IntExprInner, IntExpression, IntOp, Multiplicity, Quantifier,
    UnaryExprOp, Variable,
};
use crate::error::{RelicError, Result};
use crate::instance::{Instance, TupleSet};

/// Evaluates AST nodes against an [`Instance`].
pub struct Evaluator {
    instance: Instance,
}

impl Evaluator {
    /// Creates an evaluator over the given instance.
    pub fn new(instance: Instance) -> Self {
        Self { instance }
    }

    /// The instance being evaluated against.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Evaluates a formula to a truth value.
    pub fn evaluate(&self, formula: &Formula) -> Result<bool> {
        let mut env = Vec::new();
        self.formula(formula, &mut env)
    }

    /// Evaluates an expression to its tuple set.
    pub fn evaluate_expression(&self, expr: &Expression) -> Result<TupleSet> {
        let mut env = Vec::new();
        self.expression(expr, &mut env)
    }

    /// Evaluates an integer expression to its value.
    pub fn evaluate_int(&self, expr: &IntExpression) -> Result<i32> {
        let mut env = Vec::new();
        self.int_expr(expr, &mut env)
    }

    fn universe_size(&self) -> usize {
        self.instance.universe().size()
    }

    fn empty(&self, arity: usize) -> Result<TupleSet> {
        TupleSet::empty(self.instance.universe().clone(), arity)
    }

    fn formula(&self, f: &Formula, env: &mut Vec<(Variable, TupleSet)>) -> Result<bool> {
        let Some(inner) = f.inner() else {
            return Ok(f.constant_value().expect("constant formula"));
        };
        Ok(match inner {
            FormulaInner::Binary { left, op, right } => {
                let l = self.formula(left, env)?;
                let r = self.formula(right, env)?;
                match op {
                    BinaryFormulaOp::And => l && r,
                    BinaryFormulaOp::Or => l || r,
                    BinaryFormulaOp::Implies => !l || r,
                    BinaryFormulaOp::Iff => l == r,
                }
            }
            FormulaInner::Not(g) => !self.formula(g, env)?,
            FormulaInner::Comparison { left, op, right } => {
                let l = self.expression(left, env)?;
                let r = self.expression(right, env)?;
                match op {
                    CompareOp::Equals => l == r,
                    CompareOp::Subset => r.contains_all(&l),
                }
            }
            FormulaInner::Multiplicity { mult, expr } => {
                let size = self.expression(expr, env)?.size();
                match mult {
                    Multiplicity::Some => size >= 1,
                    Multiplicity::One => size == 1,
                    Multiplicity::Lone => size <= 1,
                    Multiplicity::No => size == 0,
                    Multiplicity::Set => true,
                }
            }
            FormulaInner::Quantified {
                quantifier,
                decls,
                body,
            } => self.quantified(*quantifier, decls, body, env)?,
            FormulaInner::IntComparison { left, op, right } => {
                let l = self.int_expr(left, env)?;
                let r = self.int_expr(right, env)?;
                match op {
                    IntCompareOp::Eq => l == r,
                    IntCompareOp::Lt => l < r,
                    IntCompareOp::Lte => l <= r,
                    IntCompareOp::Gt => l > r,
                    IntCompareOp::Gte => l >= r,
                }
            }
            FormulaInner::Predicate(pred) => self.formula(&pred.to_constraints(), env)?,
        })
    }

    fn quantified(
        &self,
        quantifier: Quantifier,
        decls: &Decls,
        body: &Formula,
        env: &mut Vec<(Variable, TupleSet)>,
    ) -> Result<bool> {
        self.quantified_level(quantifier, decls, 0, body, env)
    }

    fn quantified_level(
        &self,
        quantifier: Quantifier,
        decls: &Decls,
        level: usize,
        body: &Formula,
        env: &mut Vec<(Variable, TupleSet)>,
    ) -> Result<bool> {
        if level == decls.size() {
            return self.formula(body, env);
        }
        let decl = decls.iter().nth(level).expect("level within decls");
        if decl.multiplicity() != Multiplicity::One {
            return Err(RelicError::HigherOrderDecl(decl.variable().to_string()));
        }
        let domain = self.expression(decl.expression(), env)?;
        for tuple in domain.iter() {
            let mut singleton = self.empty(tuple.arity())?;
            singleton.add(tuple)?;
            env.push((decl.variable().clone(), singleton));
            let held = self.quantified_level(quantifier, decls, level + 1, body, env)?;
            env.pop();
            match quantifier {
                Quantifier::All if !held => return Ok(false),
                Quantifier::Some if held => return Ok(true),
                _ => {}
            }
        }
        Ok(matches!(quantifier, Quantifier::All))
    }

    fn expression(
        &self,
        e: &Expression,
        env: &mut Vec<(Variable, TupleSet)>,
    ) -> Result<TupleSet> {
        let n = self.universe_size();
        Ok(match e.kind() {
            ExprKind::Relation(r) => self
                .instance
                .tuples(r)
                .cloned()
                .ok_or_else(|| RelicError::UnboundLeaf(r.name().to_string()))?,
            ExprKind::Variable(v) => env
                .iter()
                .rev()
                .find(|(bound, _)| bound == v)
                .map(|(_, set)| set.clone())
                .ok_or_else(|| RelicError::UnboundLeaf(v.name().to_string()))?,
            ExprKind::Constant(c) => {
                let factory = self.instance.universe().factory();
                match c {
                    ConstantExpr::Univ => factory.all(1),
                    ConstantExpr::None => factory.none(1),
                    ConstantExpr::Iden => {
                        let mut iden = factory.none(2);
                        for i in 0..n {
                            iden.add(factory.tuple_from_index(2, i * n + i)?)?;
                        }
                        iden
                    }
                }
            }
            ExprKind::Binary { left, op, right } => {
                let l = self.expression(left, env)?;
                let r = self.expression(right, env)?;
                match op {
                    BinaryExprOp::Union => {
                        let mut out = l;
                        out.add_all(&r)?;
                        out
                    }
                    BinaryExprOp::Intersection => {
                        let mut out = self.empty(e.arity())?;
                        for t in l.iter() {
                            if r.contains(&t) {
                                out.add(t)?;
                            }
                        }
                        out
                    }
                    BinaryExprOp::Difference => {
                        let mut out = self.empty(e.arity())?;
                        for t in l.iter() {
                            if !r.contains(&t) {
                                out.add(t)?;
                            }
                        }
                        out
                    }
                    BinaryExprOp::Join => self.join(&l, &r, e.arity())?,
                    BinaryExprOp::Product => {
                        self.instance.universe().factory().area(&l, &r)?
                    }
                    BinaryExprOp::Override => {
                        let row = n.pow((e.arity() - 1) as u32);
                        let mut out = self.empty(e.arity())?;
                        let overridden: std::collections::BTreeSet<usize> =
                            r.index_view().iter().map(|i| i / row).collect();
                        for i in l.index_view().iter() {
                            if !overridden.contains(&(i / row)) {
                                out.add(
                                    self.instance
                                        .universe()
                                        .factory()
                                        .tuple_from_index(e.arity(), i)?,
                                )?;
                            }
                        }
                        for i in r.index_view().iter() {
                            out.add(
                                self.instance
                                    .universe()
                                    .factory()
                                    .tuple_from_index(e.arity(), i)?,
                            )?;
                        }
                        out
                    }
                }
            }
            ExprKind::Unary { op, expr } => {
                let c = self.expression(expr, env)?;
                match op {
                    UnaryExprOp::Transpose => self.transpose(&c)?,
                    UnaryExprOp::Closure => self.closure(&c)?,
                    UnaryExprOp::ReflexiveClosure => {
                        let mut out = self.closure(&c)?;
                        let factory = self.instance.universe().factory();
                        for i in 0..n {
                            out.add(factory.tuple_from_index(2, i * n + i)?)?;
                        }
                        out
                    }
                }
            }
            ExprKind::Comprehension { decls, formula } => {
                let mut out = self.empty(e.arity())?;
                self.comprehend(decls, 0, formula, env, &mut Vec::new(), &mut out)?;
                out
            }
            ExprKind::If {
                condition,
                then_expr,
                else_expr,
            } => {
                if self.formula(condition, env)? {
                    self.expression(then_expr, env)?
                } else {
                    self.expression(else_expr, env)?
                }
            }
            ExprKind::Project { expr, columns } => {
                let src = self.expression(expr, env)?;
                let factory = self.instance.universe().factory();
                let mut out = self.empty(columns.len())?;
                for t in src.iter() {
                    let mut index = 0usize;
                    for &c in columns {
                        index = index * n + t.atom_index(c);
                    }
                    out.add(factory.tuple_from_index(columns.len(), index)?)?;
                }
                out
            }
            ExprKind::IntCast(int) => {
                let value = self.int_expr(int, env)?;
                let factory = self.instance.universe().factory();
                let mut out = factory.none(1);
                if value >= 0 && (value as usize) < n {
                    out.add(factory.tuple_from_index(1, value as usize)?)?;
                }
                out
            }
        })
    }

    fn join(&self, l: &TupleSet, r: &TupleSet, arity: usize) -> Result<TupleSet> {
        let n = self.universe_size();
        let factory = self.instance.universe().factory();
        let suffix = n.pow((r.arity() - 1) as u32);
        let mut out = self.empty(arity)?;
        for i in l.index_view().iter() {
            for j in r.index_view().iter() {
                if i % n == j / suffix {
                    out.add(factory.tuple_from_index(arity, (i / n) * suffix + j % suffix)?)?;
                }
            }
        }
        Ok(out)
    }

    fn transpose(&self, set: &TupleSet) -> Result<TupleSet> {
        let n = self.universe_size();
        let factory = self.instance.universe().factory();
        let mut out = self.empty(2)?;
        for i in set.index_view().iter() {
            out.add(factory.tuple_from_index(2, (i % n) * n + i / n)?)?;
        }
        Ok(out)
    }

    fn closure(&self, set: &TupleSet) -> Result<TupleSet> {
        let n = self.universe_size();
        let factory = self.instance.universe().factory();
        let mut reach = vec![vec![false; n]; n];
        for i in set.index_view().iter() {
            reach[i / n][i % n] = true;
        }
        for k in 0..n {
            for i in 0..n {
                if reach[i][k] {
                    for j in 0..n {
                        if reach[k][j] {
                            reach[i][j] = true;
                        }
                    }
                }
            }
        }
        let mut out = self.empty(2)?;
        for (i, row) in reach.iter().enumerate() {
            for (j, &r) in row.iter().enumerate() {
                if r {
                    out.add(factory.tuple_from_index(2, i * n + j)?)?;
                }
            }
        }
        Ok(out)
    }

    fn comprehend(
        &self,
        decls: &Decls,
        level: usize,
        body: &Formula,
        env: &mut Vec<(Variable, TupleSet)>,
        picked: &mut Vec<usize>,
        out: &mut TupleSet,
    ) -> Result<()> {
        let n = self.universe_size();
        if level == decls.size() {
            if self.formula(body, env)? {
                let mut index = 0usize;
                let mut arity = 0usize;
                for (decl, &i) in decls.iter().zip(picked.iter()) {
                    let k = decl.variable().arity();
                    index = index * n.pow(k as u32) + i;
                    arity += k;
                }
                out.add(
                    self.instance
                        .universe()
                        .factory()
                        .tuple_from_index(arity, index)?,
                )?;
            }
            return Ok(());
        }
        let decl = decls.iter().nth(level).expect("level within decls");
        let domain = self.expression(decl.expression(), env)?;
        for tuple in domain.iter() {
            let mut singleton = self.empty(tuple.arity())?;
            singleton.add(tuple.clone())?;
            env.push((decl.variable().clone(), singleton));
            picked.push(tuple.index());
            self.comprehend(decls, level + 1, body, env, picked, out)?;
            picked.pop();
            env.pop();
        }
        Ok(())
    }

    fn int_expr(&self, e: &IntExpression, env: &mut Vec<(Variable, TupleSet)>) -> Result<i32> {
        Ok(match e.inner() {
            IntExprInner::Constant(v) => *v,
            IntExprInner::Cardinality(expr) => self.expression(expr, env)?.size() as i32,
            IntExprInner::Binary { left, op, right } => {
                let l = self.int_expr(left, env)?;
                let r = self.int_expr(right, env)?;
                match op {
                    IntOp::Plus => l + r,
                    IntOp::Minus => l - r,
                }
            }
            IntExprInner::If {
                condition,
                then_expr,
                else_expr,
            } => {
                if self.formula(condition, env)? {
                    self.int_expr(then_expr, env)?
                } else {
                    self.int_expr(else_expr, env)?
                }
            }
            IntExprInner::Sum { decls, body } => {
                let mut total = 0i32;
                self.sum(decls, 0, body, env, &mut total)?;
                total
            }
        })
    }

    fn sum(
        &self,
        decls: &Decls,
        level: usize,
        body: &IntExpression,
        env: &mut Vec<(Variable, TupleSet)>,
        total: &mut i32,
    ) -> Result<()> {
        if level == decls.size() {
            *total += self.int_expr(body, env)?;
            return Ok(());
        }
        let decl = decls.iter().nth(level).expect("level within decls");
        let domain = self.expression(decl.expression(), env)?;
        for tuple in domain.iter() {
            let mut singleton = self.empty(tuple.arity())?;
            singleton.add(tuple)?;
            env.push((decl.variable().clone(), singleton));
            self.sum(decls, level + 1, body, env, total)?;
            env.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Decl, Relation};
    use crate::instance::Universe;

    fn chain_instance() -> (Instance, Relation) {
        let u = Universe::new(&["0", "1", "2", "3"]).unwrap();
        let f = u.factory();
        let r = Relation::binary("r");
        let mut instance = Instance::new(u);
        instance
            .add(
                r.clone(),
                f.tuple_set(&[&["0", "1"], &["1", "2"], &["2", "3"]]).unwrap(),
            )
            .unwrap();
        (instance, r)
    }

    #[test]
    fn closure_fixpoint() {
        let (instance, r) = chain_instance();
        let f = instance.universe().factory();
        let evaluator = Evaluator::new(instance.clone());
        let closed = evaluator
            .evaluate_expression(&Expression::from(&r).closure())
            .unwrap();
        let expected = f
            .tuple_set(&[
                &["0", "1"],
                &["0", "2"],
                &["0", "3"],
                &["1", "2"],
                &["1", "3"],
                &["2", "3"],
            ])
            .unwrap();
        assert_eq!(closed, expected);
    }

    #[test]
    fn transpose_round_trip() {
        let (instance, r) = chain_instance();
        let evaluator = Evaluator::new(instance);
        let original = evaluator
            .evaluate_expression(&Expression::from(&r))
            .unwrap();
        let double = evaluator
            .evaluate_expression(&Expression::from(&r).transpose().transpose())
            .unwrap();
        assert_eq!(original, double);
    }

    #[test]
    fn join_composes() {
        let (instance, r) = chain_instance();
        let f = instance.universe().factory();
        let evaluator = Evaluator::new(instance);
        let squared = evaluator
            .evaluate_expression(&Expression::from(&r).join(Expression::from(&r)))
            .unwrap();
        let expected = f.tuple_set(&[&["0", "2"], &["1", "3"]]).unwrap();
        assert_eq!(squared, expected);
    }

    #[test]
    fn quantifier_and_cardinality() {
        let (instance, r) = chain_instance();
        let evaluator = Evaluator::new(instance);

        // all x: univ.r | some r.x -- every atom with a predecessor has
        // one (vacuously checks the chain structure)
        let x = Variable::unary("x");
        let domain = Expression::univ().join(Expression::from(&r));
        let body = Expression::from(&r)
            .join(Expression::from(&x))
            .some();
        let formula = Formula::forall(Decls::from(Decl::one_of(x, domain)), body);
        assert!(evaluator.evaluate(&formula).unwrap());

        // #r = 3
        let card = Expression::from(&r).count().eq(IntExpression::constant(3));
        assert!(evaluator.evaluate(&card).unwrap());
    }

    #[test]
    fn comprehension_collects() {
        let (instance, r) = chain_instance();
        let f = instance.universe().factory();
        let evaluator = Evaluator::new(instance);

        // { x: univ | some x.r } = atoms with a successor = {0, 1, 2}
        let x = Variable::unary("x");
        let comp = Expression::comprehension(
            Decls::from(Decl::one_of(x.clone(), Expression::univ())),
            Expression::from(&x).join(Expression::from(&r)).some(),
        );
        let result = evaluator.evaluate_expression(&comp).unwrap();
        assert_eq!(result, f.tuple_set(&[&["0"], &["1"], &["2"]]).unwrap());
    }
}
