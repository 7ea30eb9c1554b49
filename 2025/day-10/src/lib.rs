//! Day 10: button wiring for indicator lights (part 1) and joltage counters
//! (part 2).
//!
//! Part 2 is an integer linear system `A x = b, x >= 0` minimising `sum(x)`.
//! It is solved by exact Gauss-Jordan elimination over `i64` followed by an
//! enumeration of the free variables, with a depth-first search kept as a
//! reference engine.

pub mod config;
pub mod elimination;
pub mod enumerate;
pub mod error;
pub mod matrix;
pub mod parser;
pub mod part1;
pub mod part2;
pub mod schema;
pub mod search;
pub mod solver;
