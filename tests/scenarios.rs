//! End-to-end scenarios across the solver and the evaluator.

use relic::ast::{Decl, Decls, Expression, Formula, IntExpression, Relation, Variable};
use relic::evaluator::Evaluator;
use relic::instance::{Bounds, Instance, Universe};
use relic::solver::{Options, Solver};

#[test]
fn identity_equals_its_transpose() {
    // IDEN = ~IDEN holds over any universe, with room for a free relation
    let universe = Universe::new(&["A", "B", "C"]).unwrap();
    let factory = universe.factory();
    let r = Relation::binary("r");
    let mut bounds = Bounds::new(universe);
    bounds.bound(&r, factory.none(2), factory.all(2)).unwrap();

    let formula = Expression::iden()
        .equals(Expression::iden().transpose())
        .and(Expression::from(&r).in_set(Expression::from(&r)));
    let solution = Solver::new(Options::default())
        .solve(&formula, &bounds)
        .unwrap();
    assert!(solution.is_sat());
}

#[test]
fn closure_fixpoint_of_a_chain() {
    // r = {(0,1), (1,2), (2,3)} exactly; ^r is the strict order
    let universe = Universe::new(&["0", "1", "2", "3"]).unwrap();
    let factory = universe.factory();
    let r = Relation::binary("r");
    let mut bounds = Bounds::new(universe.clone());
    bounds
        .bound_exactly(
            &r,
            factory
                .tuple_set(&[&["0", "1"], &["1", "2"], &["2", "3"]])
                .unwrap(),
        )
        .unwrap();

    let expected = factory
        .tuple_set(&[
            &["0", "1"],
            &["0", "2"],
            &["0", "3"],
            &["1", "2"],
            &["1", "3"],
            &["2", "3"],
        ])
        .unwrap();

    // the solver agrees that ^r is exactly that set
    let witness = Relation::binary("expected");
    bounds.bound_exactly(&witness, expected.clone()).unwrap();
    let closure_formula = Expression::from(&r)
        .closure()
        .equals(Expression::from(&witness));
    let solution = Solver::new(Options::default())
        .solve(&closure_formula, &bounds)
        .unwrap();
    assert!(solution.is_sat());

    // and the evaluator computes it directly
    let mut instance = Instance::new(universe);
    instance
        .add(
            r.clone(),
            factory
                .tuple_set(&[&["0", "1"], &["1", "2"], &["2", "3"]])
                .unwrap(),
        )
        .unwrap();
    let evaluator = Evaluator::new(instance);
    let closed = evaluator
        .evaluate_expression(&Expression::from(&r).closure())
        .unwrap();
    assert_eq!(closed, expected);
}

#[test]
fn cardinality_of_an_exact_relation() {
    // #r = 3 is TRUE and #r < 3 is FALSE for a relation bound to 3 tuples
    let universe = Universe::new(&["A", "B", "C", "D"]).unwrap();
    let factory = universe.factory();
    let r = Relation::unary("r");
    let mut bounds = Bounds::new(universe);
    bounds
        .bound_exactly(&r, factory.tuple_set(&[&["A"], &["B"], &["C"]]).unwrap())
        .unwrap();

    let solver = Solver::new(Options::default());

    let exactly_three = Expression::from(&r).count().eq(IntExpression::constant(3));
    assert!(solver.solve(&exactly_three, &bounds).unwrap().is_sat());

    let fewer = Expression::from(&r).count().lt(IntExpression::constant(3));
    assert!(solver.solve(&fewer, &bounds).unwrap().is_unsat());
}

#[test]
fn quantifier_shadowing() {
    // all x: A | some x: B | x in x  is well-formed: the inner x shadows
    // the outer, and the formula is equivalent to some B
    let universe = Universe::new(&["A0", "B0", "B1"]).unwrap();
    let factory = universe.factory();
    let a = Relation::unary("A");
    let b = Relation::unary("B");
    let mut bounds = Bounds::new(universe);
    bounds
        .bound_exactly(&a, factory.tuple_set(&[&["A0"]]).unwrap())
        .unwrap();
    bounds.bound(&b, factory.none(1), factory.all(1)).unwrap();

    let x = Variable::unary("x");
    let shadowed = Formula::forall(
        Decls::from(Decl::one_of(x.clone(), Expression::from(&a))),
        Formula::exists(
            Decls::from(Decl::one_of(x.clone(), Expression::from(&b))),
            Expression::from(&x).in_set(Expression::from(&x)),
        ),
    );

    let solver = Solver::new(Options::default());

    // satisfiable, and any model makes B non-empty
    let solution = solver.solve(&shadowed, &bounds).unwrap();
    assert!(solution.is_sat());
    let instance = solution.instance().unwrap();
    assert!(!instance.tuples(&b).unwrap().is_empty());

    // conjoined with "no B" it flips to unsat, exactly as some B would
    let contradiction = shadowed.and(Expression::from(&b).no());
    assert!(solver.solve(&contradiction, &bounds).unwrap().is_unsat());
}

#[test]
fn sum_expression_totals_guarded_bodies() {
    // sum m: Man | 2  counts two per man
    let universe = Universe::new(&["M0", "M1", "M2"]).unwrap();
    let factory = universe.factory();
    let man = Relation::unary("Man");
    let mut bounds = Bounds::new(universe);
    bounds.bound_exactly(&man, factory.all(1)).unwrap();

    let m = Variable::unary("m");
    let total = IntExpression::sum(
        Decls::from(Decl::one_of(m, Expression::from(&man))),
        IntExpression::constant(2),
    );
    let formula = total.eq(IntExpression::constant(6));
    let solution = Solver::new(Options::default())
        .solve(&formula, &bounds)
        .unwrap();
    assert!(solution.is_sat());
}

#[test]
fn override_prefers_the_right_operand() {
    let universe = Universe::new(&["A", "B"]).unwrap();
    let factory = universe.factory();
    let base = Relation::binary("base");
    let patch = Relation::binary("patch");
    let mut bounds = Bounds::new(universe.clone());
    bounds
        .bound_exactly(
            &base,
            factory.tuple_set(&[&["A", "A"], &["B", "B"]]).unwrap(),
        )
        .unwrap();
    bounds
        .bound_exactly(&patch, factory.tuple_set(&[&["A", "B"]]).unwrap())
        .unwrap();

    let mut instance = Instance::new(universe);
    instance
        .add(
            base.clone(),
            factory.tuple_set(&[&["A", "A"], &["B", "B"]]).unwrap(),
        )
        .unwrap();
    instance
        .add(patch.clone(), factory.tuple_set(&[&["A", "B"]]).unwrap())
        .unwrap();

    let overridden = Expression::from(&base).override_with(Expression::from(&patch));
    let expected = factory.tuple_set(&[&["A", "B"], &["B", "B"]]).unwrap();

    // evaluator and solver agree
    let evaluator = Evaluator::new(instance);
    assert_eq!(evaluator.evaluate_expression(&overridden).unwrap(), expected);

    let witness = Relation::binary("expected");
    bounds.bound_exactly(&witness, expected).unwrap();
    let formula = overridden.equals(Expression::from(&witness));
    assert!(Solver::new(Options::default())
        .solve(&formula, &bounds)
        .unwrap()
        .is_sat());
}

#[test]
fn acyclic_predicate_constrains_models() {
    let universe = Universe::new(&["A", "B"]).unwrap();
    let factory = universe.factory();
    let r = Relation::binary("r");
    let mut bounds = Bounds::new(universe);
    bounds.bound(&r, factory.none(2), factory.all(2)).unwrap();

    let acyclic = Formula::predicate(relic::ast::RelationPredicate::acyclic(r.clone()));

    // an acyclic r with a self-loop demanded is unsat
    let loop_demanded = Expression::from(&r)
        .intersection(Expression::iden())
        .some();
    let solution = Solver::new(Options::default())
        .solve(&acyclic.clone().and(loop_demanded), &bounds)
        .unwrap();
    assert!(solution.is_unsat());

    // acyclic alone is fine
    assert!(Solver::new(Options::default())
        .solve(&acyclic, &bounds)
        .unwrap()
        .is_sat());
}
