//! Error types shared by the puzzle model, the parser and the solver.

use crate::engine::Move;
use thiserror::Error;

/// Errors raised by operations on a [`Puzzle`](crate::engine::Puzzle).
///
/// Whenever one of these is returned the puzzle is left exactly as it was
/// before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// The move breaks the stacking rule (empty source, full destination or
    /// mismatched top tokens).
    #[error("move {mv} is not allowed: the stacks are not compatible")]
    IncompatibleMove { mv: Move },
    #[error("stack {index} does not exist (the puzzle has {num_stacks} stacks)")]
    StackOutOfRange { index: usize, num_stacks: usize },
    #[error("cannot move stack {index} onto itself")]
    SameStack { index: usize },
    #[error("stack {index} is empty")]
    EmptySource { index: usize },
    #[error("stack {index} is full")]
    StackFull { index: usize },
    /// A construction-time invariant does not hold.
    #[error("malformed puzzle: {msg}")]
    MalformedPuzzle { msg: String },
}

impl PuzzleError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        PuzzleError::MalformedPuzzle { msg: msg.into() }
    }
}

/// Reasons a call to [`Solver::solve`](crate::solver::Solver::solve) returns
/// without a solution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveFailure {
    /// The search gave up. This does not mean the puzzle is unsolvable.
    #[error("no solution found within {iterations} iterations")]
    ExhaustedBudget { iterations: usize },
    #[error("search cancelled after {iterations} iterations")]
    Cancelled { iterations: usize },
    /// The filters let an illegal move through. This is a bug in the engine.
    #[error("internal contract violation: {0}")]
    ContractViolation(#[source] PuzzleError),
}

/// Errors raised while reading a puzzle from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsePuzzleError {
    #[error("unrecognized token \"{token}\" in stack {stack}")]
    UnrecognizedToken { token: String, stack: usize },
    #[error("cannot infer the stack capacity of a puzzle without tokens")]
    EmptyPuzzle,
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
}
