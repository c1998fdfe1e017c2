//! # Hoop Stack Solver Library
//!
//! This library models the Hoop Stack sorting puzzle and provides a
//! backtracking solver for it. Each stack holds up to a fixed number of
//! colored hoops; a move takes the top hoop of one stack and puts it on
//! another stack that is empty or has a hoop of the same color on top. The
//! puzzle is solved when every stack is empty or full of a single color.
//!
//! It is used by three binaries:
//! - `hoop_solver`: Solves a built-in level or a puzzle file and prints the moves.
//! - `human_player`: Allows interactive play via the command line, with undo and hints.
//! - `solver_evaluator`: Runs the solver over many random puzzles and reports statistics.
//!
//! ## Modules
//! - `engine`: Tokens, stacks, moves, the `Puzzle` with its move rule, and the `Game` session.
//! - `heuristics`: Candidate move generation, the move filters and the fill-efficiently tie-break.
//! - `solver`: The backtracking search (`Solver`, `SolverConfig`, `Solution`).
//! - `compress`: Shortens a solved move trace without changing its effect.
//! - `levels`: Hand-authored levels.
//! - `utils`: Parsing puzzles from text and formatting moves.
//! - `error`: Error types.

pub mod compress;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod levels;
pub mod solver;
pub mod utils;
