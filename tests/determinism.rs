//! The same AST, bounds, and options must produce byte-identical CNF.

use relic::ast::{Decl, Decls, Expression, Formula, Relation, Variable};
use relic::bool::Options;
use relic::cnf;
use relic::fol2bool;
use relic::instance::{Bounds, Universe};

fn problem() -> (Formula, Bounds) {
    let universe = Universe::new(&["A", "B", "C"]).unwrap();
    let factory = universe.factory();
    let node = Relation::unary("Node");
    let edge = Relation::binary("edge");
    let mut bounds = Bounds::new(universe);
    bounds.bound(&node, factory.none(1), factory.all(1)).unwrap();
    bounds.bound(&edge, factory.none(2), factory.all(2)).unwrap();

    let n = Variable::unary("n");
    let connected = Formula::forall(
        Decls::from(Decl::one_of(n.clone(), Expression::from(&node))),
        Expression::from(&n).join(Expression::from(&edge)).some(),
    );
    let formula = connected
        .and(Expression::from(&edge).in_set(Expression::from(&node).product(Expression::from(&node))))
        .and(Expression::from(&node).some());
    (formula, bounds)
}

fn emit_once() -> Vec<Vec<i32>> {
    let (formula, bounds) = problem();
    let translation =
        fol2bool::translate(&formula, &bounds, &Options::default(), false, None).unwrap();
    cnf::emit(translation.factory(), translation.root()).clauses
}

#[test]
fn translation_is_deterministic() {
    let first = emit_once();
    let second = emit_once();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn logging_does_not_change_the_cnf() {
    let (formula, bounds) = problem();
    let plain =
        fol2bool::translate(&formula, &bounds, &Options::default(), false, None).unwrap();
    let logged =
        fol2bool::translate(&formula, &bounds, &Options::default(), true, None).unwrap();
    assert_eq!(
        cnf::emit(plain.factory(), plain.root()).clauses,
        cnf::emit(logged.factory(), logged.root()).clauses
    );
}
