//! # relic
//!
//! A finite-model finder for first-order relational logic with transitive
//! closure and bounded integers.
//!
//! A problem is a [`Formula`](ast::Formula) over named
//! [`Relation`](ast::Relation)s, together with [`Bounds`](instance::Bounds)
//! that constrain each relation's extension between a lower and an upper
//! tuple set over a finite [`Universe`](instance::Universe). The
//! [`Solver`](solver::Solver) translates the formula to a boolean circuit,
//! clausifies it, and hands it to a SAT backend. A satisfiable problem
//! yields a concrete [`Instance`](instance::Instance); an unsatisfiable one
//! (solved with translation logging on) yields a [`Proof`](proof::Proof)
//! from which a locally minimal subset of the top-level conjuncts -- the
//! high-level unsatisfiable core -- can be extracted and minimized.
//!
//! ## Example
//!
//! ```
//! use relic::ast::{Expression, Relation};
//! use relic::instance::{Bounds, Universe};
//! use relic::solver::{Options, Solver};
//!
//! let universe = Universe::new(&["A", "B", "C"]).unwrap();
//! let factory = universe.factory();
//!
//! let person = Relation::unary("Person");
//! let mut bounds = Bounds::new(universe);
//! bounds
//!     .bound(&person, factory.none(1), factory.all(1))
//!     .unwrap();
//!
//! // some Person
//! let formula = Expression::from(person).some();
//!
//! let solver = Solver::new(Options::default());
//! let solution = solver.solve(&formula, &bounds).unwrap();
//! assert!(solution.is_sat());
//! ```

#![warn(missing_docs)]

pub mod ast;

pub mod instance;

pub mod bool;

pub mod fol2bool;

pub mod cnf;

pub mod sat;

pub mod proof;

pub mod ucore;

pub mod skolem;

pub mod symmetry;

pub mod evaluator;

pub mod solver;

/// Utility collections
pub mod util {
    //! Integer collections and helpers shared across the engine.
    pub mod ints;
}

/// Error types
pub mod error {
    //! Error types for relic

    use thiserror::Error;

    /// Errors that can occur while building a problem or solving it
    #[derive(Error, Debug)]
    pub enum RelicError {
        /// An expression refers to a variable not bound by an enclosing Decl,
        /// or to a relation absent from the bounds
        #[error("unbound leaf: {0}")]
        UnboundLeaf(String),

        /// A quantified or comprehension declaration has a multiplicity
        /// other than ONE, so it cannot be ground-enumerated
        #[error("higher-order declaration: {0}")]
        HigherOrderDecl(String),

        /// Solving was cancelled through the cooperative cancel flag
        #[error("solving aborted")]
        Aborted,

        /// A capacity limit was exceeded (universe too large for the
        /// requested arity, or variable count overflow)
        #[error("capacity exceeded: {0}")]
        CapacityExceeded(String),

        /// Invalid argument (empty universe, duplicate atom, bound from a
        /// foreign universe, arity mismatch between a relation and its bound)
        #[error("invalid argument: {0}")]
        InvalidArgument(String),
    }

    /// Result type for relic operations
    pub type Result<T> = std::result::Result<T, RelicError>;
}

pub use error::{RelicError, Result};
