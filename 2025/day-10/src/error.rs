use miette::Diagnostic;
use thiserror::Error;

/// Failures raised by the joltage solvers.
///
/// An unsolvable machine is not an error: solvers report it as `Ok(None)`.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("integer overflow while {context}")]
    #[diagnostic(
        code(day10::overflow),
        help("coefficients grew past 64 bits; the machine is too large for exact integer elimination")
    )]
    Overflow { context: &'static str },

    #[error("no basic column found for row {row} while reordering columns")]
    #[diagnostic(code(day10::no_basic_column))]
    NoBasicColumn { row: usize },

    #[error("search budget exhausted after {steps} steps")]
    #[diagnostic(
        code(day10::budget_exhausted),
        help("raise DAY10_MAX_STEPS / DAY10_TIMEOUT_MS or switch engines")
    )]
    BudgetExhausted { steps: u64 },

    #[error("engines disagree: elimination found {elimination:?}, brute force found {brute_force:?}")]
    #[diagnostic(code(day10::engine_mismatch))]
    EngineMismatch {
        elimination: Option<u64>,
        brute_force: Option<u64>,
    },
}

impl SolveError {
    pub(crate) fn overflow(context: &'static str) -> Self {
        Self::Overflow { context }
    }
}

/// A line of puzzle input that could not be read as a machine.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
#[diagnostic(code(day10::parse))]
pub struct ParseFailure {
    /// 1-based line number in the input.
    pub line: usize,
    pub message: String,
}
