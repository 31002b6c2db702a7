//! Core extraction over a small catalog of unsatisfiable problems.

mod common;

use relic::ast::{Expression, Formula, Relation};
use relic::instance::{Bounds, Universe};
use relic::solver::{Options, Solver};
use relic::ucore::MinTopStrategy;

/// some r && r in s && no s, plus two conjuncts that play no part.
fn subset_chain() -> (Vec<Formula>, Vec<Formula>, Bounds) {
    let universe = Universe::new(&["A", "B", "C"]).unwrap();
    let factory = universe.factory();
    let r = Relation::unary("r");
    let s = Relation::unary("s");
    let u = Relation::unary("u");
    let mut bounds = Bounds::new(universe);
    bounds.bound(&r, factory.none(1), factory.all(1)).unwrap();
    bounds.bound(&s, factory.none(1), factory.all(1)).unwrap();
    bounds.bound(&u, factory.none(1), factory.all(1)).unwrap();

    let needed = vec![
        Expression::from(&r).some(),
        Expression::from(&r).in_set(Expression::from(&s)),
        Expression::from(&s).no(),
    ];
    let irrelevant = vec![
        Expression::from(&u).in_set(Expression::from(&u)),
        Expression::from(&u).lone(),
    ];
    (needed, irrelevant, bounds)
}

#[test]
fn unminimized_core_is_correct() {
    let (needed, irrelevant, bounds) = subset_chain();
    let formula = Formula::and_all(
        needed.iter().chain(irrelevant.iter()).cloned().collect(),
    );

    let mut options = Options::default();
    options.log_translation = true;
    let solution = Solver::new(options).solve(&formula, &bounds).unwrap();
    assert!(solution.is_unsat());

    let proof = solution.into_proof().expect("proof present");
    let core = proof.high_level_core();
    assert!(!core.is_empty());

    // the unminimized core is already unsatisfiable
    let solver = Solver::new(Options::default());
    let conjunction = Formula::and_all(core.clone());
    assert!(solver.solve(&conjunction, &bounds).unwrap().is_unsat());
}

#[test]
fn minimization_drops_irrelevant_conjuncts() {
    let (needed, irrelevant, bounds) = subset_chain();
    let formula = Formula::and_all(
        needed.iter().chain(irrelevant.iter()).cloned().collect(),
    );

    let mut options = Options::default();
    options.log_translation = true;
    let solution = Solver::new(options).solve(&formula, &bounds).unwrap();
    let mut proof = solution.into_proof().expect("proof present");

    let mut strategy = MinTopStrategy::new(proof.log());
    proof.minimize(&mut strategy);

    let core = proof.high_level_core();
    assert_eq!(core.len(), needed.len());
    for f in &needed {
        assert!(core.contains(f), "necessary conjunct missing from core");
    }
    for f in &irrelevant {
        assert!(!core.contains(f), "irrelevant conjunct kept in core");
    }

    common::verify_minimal_core(&core, &bounds);
}

#[test]
fn trivially_unsat_core_names_the_false_conjunct() {
    let universe = Universe::new(&["A"]).unwrap();
    let factory = universe.factory();
    let r = Relation::unary("r");
    let empty = Relation::unary("empty");
    let mut bounds = Bounds::new(universe);
    bounds.bound(&r, factory.none(1), factory.all(1)).unwrap();
    bounds.bound_exactly(&empty, factory.none(1)).unwrap();

    // `some empty` folds to FALSE during translation
    let fine = Expression::from(&r).lone();
    let impossible = Expression::from(&empty).some();
    let formula = fine.clone().and(impossible.clone());

    let mut options = Options::default();
    options.log_translation = true;
    let solution = Solver::new(options).solve(&formula, &bounds).unwrap();
    assert!(solution.is_trivial());
    assert!(solution.is_unsat());

    let proof = solution.into_proof().expect("trivial proof present");
    assert_eq!(proof.high_level_core(), vec![impossible]);
}
