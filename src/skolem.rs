//! Skolemization of existential quantifiers.
//!
//! An existential declaration `some y: E | F` on a top-level conjunction
//! path is replaced by a fresh relation `$y` bounded above by a sound
//! approximation of `E`, together with the constraints `one $y`,
//! `$y in E`, and `F[y := $y]`. Under enclosing universal quantifiers --
//! up to the configured nesting depth -- the skolem relation encodes a
//! function graph instead: its columns are the universal variables'
//! followed by the witness's, the universals are joined back off to
//! obtain the witness for the current binding, and the one/containment
//! constraints sit inside the universals' scope. Either way the SAT
//! solver picks witnesses directly instead of the translator enumerating
//! ground values for them.

use crate::ast::{
    Decl, Decls, ExprKind, Expression, Formula, FormulaInner, Multiplicity, Quantifier, Relation,
    Variable,
};
use crate::error::Result;
use crate::instance::{Bounds, TupleSet};

/// Skolemizes `formula`, extending `bounds` with one relation per
/// skolemized declaration. `depth` is the maximum number of universal
/// quantifiers that may enclose a rewritten existential. Returns the
/// rewritten formula.
pub fn skolemize(formula: &Formula, bounds: &mut Bounds, depth: usize) -> Result<Formula> {
    let mut skolemizer = Skolemizer {
        bounds,
        depth,
        enclosing: Vec::new(),
    };
    skolemizer.formula(formula, true, 0)
}

struct Skolemizer<'a> {
    bounds: &'a mut Bounds,
    depth: usize,
    /// The universal declarations in scope, outermost first; skolem
    /// relations range over their domains.
    enclosing: Vec<Decl>,
}

impl Skolemizer<'_> {
    /// Rewrites `f` at the given polarity, `nesting` universal
    /// quantifiers deep. Only conjunction paths are followed; other
    /// connectives end the skolemizable region.
    fn formula(&mut self, f: &Formula, positive: bool, nesting: usize) -> Result<Formula> {
        let Some(inner) = f.inner() else {
            return Ok(f.clone());
        };
        match inner {
            FormulaInner::Binary { left, op, right } => match (op, positive) {
                (crate::ast::BinaryFormulaOp::And, true)
                | (crate::ast::BinaryFormulaOp::Or, false) => {
                    let l = self.formula(left, positive, nesting)?;
                    let r = self.formula(right, positive, nesting)?;
                    Ok(match op {
                        crate::ast::BinaryFormulaOp::And => l.and(r),
                        _ => l.or(r),
                    })
                }
                _ => Ok(f.clone()),
            },
            FormulaInner::Not(inner) => {
                let rewritten = self.formula(inner, !positive, nesting)?;
                Ok(rewritten.not())
            }
            FormulaInner::Quantified {
                quantifier,
                decls,
                body,
            } => match (quantifier, positive) {
                (Quantifier::Some, true) => self.skolemize_decls(decls, body, nesting),
                // descend under universals while the nesting budget
                // lasts; existentials found below become function skolems
                // over the pushed declarations
                (Quantifier::All, true)
                    if nesting < self.depth
                        && decls.iter().all(|d| d.multiplicity() == Multiplicity::One) =>
                {
                    for decl in decls.iter() {
                        self.enclosing.push(decl.clone());
                    }
                    let body = self.formula(body, true, nesting + 1)?;
                    for _ in 0..decls.size() {
                        self.enclosing.pop();
                    }
                    Ok(Formula::forall(decls.clone(), body))
                }
                _ => Ok(f.clone()),
            },
            _ => Ok(f.clone()),
        }
    }

    /// Replaces each ONE-declaration with a fresh relation: a singleton
    /// outside universals, a function graph over the enclosing universal
    /// domains inside them.
    fn skolemize_decls(&mut self, decls: &Decls, body: &Formula, nesting: usize) -> Result<Formula> {
        // only one-declarations are skolemizable
        if decls
            .iter()
            .any(|d| d.multiplicity() != Multiplicity::One)
        {
            return Ok(Formula::exists(
                decls.clone(),
                self.formula(body, true, nesting)?,
            ));
        }

        let factory = self.bounds.universe().factory();
        let mut constraints: Vec<Formula> = Vec::new();
        let mut substitutions: Vec<(Variable, Expression)> = Vec::new();
        for decl in decls.iter() {
            let var = decl.variable();
            // a later declaration may mention earlier variables
            let mut bound_expr = decl.expression().clone();
            for (v, e) in &substitutions {
                bound_expr = replace_var_in_expr(&bound_expr, v, e);
            }

            // skolem columns: the enclosing universal variables', then
            // the witness's
            let arity = self
                .enclosing
                .iter()
                .map(|d| d.variable().arity())
                .sum::<usize>()
                + var.arity();
            let skolem = Relation::nary(format!("${}", var.name()), arity);
            let mut upper = upper_approx(&bound_expr, self.bounds)?;
            for outer in self.enclosing.iter().rev() {
                let domain = upper_approx(outer.expression(), self.bounds)?;
                upper = factory.area(&domain, &upper)?;
            }
            let lower = TupleSet::empty(self.bounds.universe().clone(), arity)?;
            self.bounds.bound(&skolem, lower, upper)?;

            // joining the universals back off the skolem columns leaves
            // the witness for the current binding
            let mut witness = Expression::from(&skolem);
            for outer in self.enclosing.iter() {
                witness = Expression::from(outer.variable()).join(witness);
            }
            constraints.push(witness.clone().one());
            constraints.push(witness.clone().in_set(bound_expr));
            substitutions.push((var.clone(), witness));
        }
        let mut rewritten = self.formula(body, true, nesting)?;
        for (v, e) in &substitutions {
            rewritten = replace_var(&rewritten, v, e);
        }
        constraints.push(rewritten);
        Ok(Formula::and_all(constraints))
    }
}

/// A sound upper bound for the tuples `expr` can take, from the upper
/// bounds of the relations it mentions. Non-monotone or higher-order
/// constructs fall back to the full tuple space of their arity.
fn upper_approx(expr: &Expression, bounds: &Bounds) -> Result<TupleSet> {
    let factory = bounds.universe().factory();
    let set = match expr.kind() {
        ExprKind::Relation(r) => bounds
            .upper_bound(r)
            .cloned()
            .unwrap_or_else(|| factory.none(r.arity())),
        ExprKind::Constant(c) => match c {
            crate::ast::ConstantExpr::Univ => factory.all(1),
            crate::ast::ConstantExpr::None => factory.none(1),
            crate::ast::ConstantExpr::Iden => {
                let n = bounds.universe().size();
                let mut iden = factory.none(2);
                for i in 0..n {
                    iden.add(factory.tuple_from_index(2, i * n + i)?)?;
                }
                iden
            }
        },
        ExprKind::Binary { left, op, right } => {
            let l = upper_approx(left, bounds)?;
            let r = upper_approx(right, bounds)?;
            match op {
                crate::ast::BinaryExprOp::Union | crate::ast::BinaryExprOp::Override => {
                    let mut u = l;
                    u.add_all(&r)?;
                    u
                }
                crate::ast::BinaryExprOp::Intersection => {
                    let mut out = factory.none(expr.arity());
                    for t in l.iter() {
                        if r.contains(&t) {
                            out.add(t)?;
                        }
                    }
                    out
                }
                // the subtrahend cannot grow the result
                crate::ast::BinaryExprOp::Difference => l,
                crate::ast::BinaryExprOp::Product => factory.area(&l, &r)?,
                crate::ast::BinaryExprOp::Join => {
                    let n = bounds.universe().size();
                    let suffix = n.pow((right.arity() - 1) as u32);
                    let mut out = factory.none(expr.arity());
                    for t1 in l.index_view().iter() {
                        for t2 in r.index_view().iter() {
                            if t1 % n == t2 / suffix {
                                out.add(factory.tuple_from_index(
                                    expr.arity(),
                                    (t1 / n) * suffix + t2 % suffix,
                                )?)?;
                            }
                        }
                    }
                    out
                }
            }
        }
        ExprKind::Unary { op, expr: child } => {
            let c = upper_approx(child, bounds)?;
            let n = bounds.universe().size();
            match op {
                crate::ast::UnaryExprOp::Transpose => {
                    let mut out = factory.none(2);
                    for t in c.index_view().iter() {
                        out.add(factory.tuple_from_index(2, (t % n) * n + t / n)?)?;
                    }
                    out
                }
                // closures can only connect what the child mentions, but
                // the full square is a simpler sound bound
                crate::ast::UnaryExprOp::Closure
                | crate::ast::UnaryExprOp::ReflexiveClosure => factory.all(2),
            }
        }
        _ => factory.all(expr.arity()),
    };
    Ok(set)
}

/// Substitutes `replacement` for free occurrences of `var` in `f`,
/// stopping at declarations that rebind the variable.
fn replace_var(f: &Formula, var: &Variable, replacement: &Expression) -> Formula {
    let Some(inner) = f.inner() else {
        return f.clone();
    };
    match inner {
        FormulaInner::Binary { left, op, right } => {
            let l = replace_var(left, var, replacement);
            let r = replace_var(right, var, replacement);
            match op {
                crate::ast::BinaryFormulaOp::And => l.and(r),
                crate::ast::BinaryFormulaOp::Or => l.or(r),
                crate::ast::BinaryFormulaOp::Implies => l.implies(r),
                crate::ast::BinaryFormulaOp::Iff => l.iff(r),
            }
        }
        FormulaInner::Not(g) => replace_var(g, var, replacement).not(),
        FormulaInner::Comparison { left, op, right } => {
            let l = replace_var_in_expr(left, var, replacement);
            let r = replace_var_in_expr(right, var, replacement);
            match op {
                crate::ast::CompareOp::Equals => l.equals(r),
                crate::ast::CompareOp::Subset => l.in_set(r),
            }
        }
        FormulaInner::Multiplicity { mult, expr } => {
            let e = replace_var_in_expr(expr, var, replacement);
            match mult {
                Multiplicity::Some => e.some(),
                Multiplicity::One => e.one(),
                Multiplicity::Lone => e.lone(),
                Multiplicity::No => e.no(),
                Multiplicity::Set => e.some(),
            }
        }
        FormulaInner::Quantified {
            quantifier,
            decls,
            body,
        } => {
            let new_decls = replace_var_in_decls(decls, var, replacement);
            let body = if decls.iter().any(|d| d.variable() == var) {
                body.clone()
            } else {
                replace_var(body, var, replacement)
            };
            match quantifier {
                Quantifier::All => Formula::forall(new_decls, body),
                Quantifier::Some => Formula::exists(new_decls, body),
            }
        }
        // integer comparisons and predicates cannot mention quantified
        // variables through relations, only through expressions, which a
        // skolemizable region does not nest them under
        FormulaInner::IntComparison { .. } | FormulaInner::Predicate(_) => f.clone(),
    }
}

fn replace_var_in_decls(decls: &Decls, var: &Variable, replacement: &Expression) -> Decls {
    let rewritten: Vec<Decl> = decls
        .iter()
        .map(|d| {
            Decl::new(
                d.variable().clone(),
                d.multiplicity(),
                replace_var_in_expr(d.expression(), var, replacement),
            )
        })
        .collect();
    Decls::from_vec(rewritten)
}

fn replace_var_in_expr(e: &Expression, var: &Variable, replacement: &Expression) -> Expression {
    match e.kind() {
        ExprKind::Variable(v) if v == var => replacement.clone(),
        ExprKind::Variable(_) | ExprKind::Relation(_) | ExprKind::Constant(_) => e.clone(),
        ExprKind::Binary { left, op, right } => {
            let l = replace_var_in_expr(left, var, replacement);
            let r = replace_var_in_expr(right, var, replacement);
            match op {
                crate::ast::BinaryExprOp::Union => l.union(r),
                crate::ast::BinaryExprOp::Intersection => l.intersection(r),
                crate::ast::BinaryExprOp::Difference => l.difference(r),
                crate::ast::BinaryExprOp::Join => l.join(r),
                crate::ast::BinaryExprOp::Product => l.product(r),
                crate::ast::BinaryExprOp::Override => l.override_with(r),
            }
        }
        ExprKind::Unary { op, expr } => {
            let c = replace_var_in_expr(expr, var, replacement);
            match op {
                crate::ast::UnaryExprOp::Transpose => c.transpose(),
                crate::ast::UnaryExprOp::Closure => c.closure(),
                crate::ast::UnaryExprOp::ReflexiveClosure => c.reflexive_closure(),
            }
        }
        ExprKind::If {
            condition,
            then_expr,
            else_expr,
        } => Expression::if_then_else(
            replace_var(condition, var, replacement),
            replace_var_in_expr(then_expr, var, replacement),
            replace_var_in_expr(else_expr, var, replacement),
        ),
        ExprKind::Project { expr, columns } => {
            replace_var_in_expr(expr, var, replacement).project(columns)
        }
        // comprehensions and integer casts are left alone unless the
        // variable is sure to be free in them; a rebinding makes the
        // substitution a no-op anyway
        ExprKind::Comprehension { decls, formula } => {
            if decls.iter().any(|d| d.variable() == var) {
                e.clone()
            } else {
                Expression::comprehension(
                    replace_var_in_decls(decls, var, replacement),
                    replace_var(formula, var, replacement),
                )
            }
        }
        ExprKind::IntCast(_) => e.clone(),
    }
}
