//! Unsatisfiable-core minimization strategies.

pub mod min_top;
pub mod strategy_utils;

pub use min_top::MinTopStrategy;
