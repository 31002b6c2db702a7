//! Shared checks for unsat-core tests.

use relic::ast::Formula;
use relic::instance::Bounds;
use relic::solver::{Options, Solver};

/// Checks that a claimed core is correct and locally minimal:
/// the conjunction of `core` is unsatisfiable under `bounds`, and
/// removing any single formula makes it satisfiable.
pub fn verify_minimal_core(core: &[Formula], bounds: &Bounds) {
    let solver = Solver::new(Options::default());

    let conjunction = Formula::and_all(core.to_vec());
    let solution = solver
        .solve(&conjunction, bounds)
        .expect("core conjunction solves");
    assert!(solution.is_unsat(), "claimed core is satisfiable");

    for i in 0..core.len() {
        let without: Vec<Formula> = core
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, f)| f.clone())
            .collect();
        if without.is_empty() {
            continue;
        }
        let solution = solver
            .solve(&Formula::and_all(without), bounds)
            .expect("reduced core solves");
        assert!(
            solution.is_sat(),
            "core is not minimal: formula {i} is redundant"
        );
    }
}
