use crate::compress::compress_moves;
use crate::engine::{Move, Puzzle, Stack, StateKey};
use crate::error::{PuzzleError, SolveFailure};
use crate::heuristics::{fill_efficiently, filtered_moves, remove_opposite_of_last};
use log::{debug, error, info, trace, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Number of iterations the search runs before giving up.
pub const DEFAULT_ITERATION_BUDGET: usize = 10_000;

/// Tuning knobs for [`Solver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Maximum number of search iterations. Advancing and backtracking steps
    /// both count.
    pub iteration_budget: usize,
    /// Whether to run the solution compressor over the raw trace.
    pub compress: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            iteration_budget: DEFAULT_ITERATION_BUDGET,
            compress: true,
        }
    }
}

/// Represents a solution found by the solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// The moves to play, after compression if it was enabled.
    pub moves: Vec<Move>,
    /// The moves as the search accepted them, before compression.
    pub raw_moves: Vec<Move>,
    /// Number of search iterations used.
    pub iterations: usize,
    /// Number of times the search restored an earlier state.
    pub backtracks: usize,
}

impl Solution {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Plays the solution's moves on a copy of `puzzle`, with full checks.
    ///
    /// # Returns
    /// The final puzzle state, or the first error raised by a move.
    pub fn replay(&self, puzzle: &Puzzle) -> Result<Puzzle, PuzzleError> {
        let mut puzzle = puzzle.clone();
        for &mv in &self.moves {
            puzzle.move_pieces(mv, false)?;
        }
        Ok(puzzle)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Advancing,
    Backtracking,
}

/// A state the search moved away from, and the move it took.
struct BacktrackRecord {
    key: StateKey,
    snapshot: Vec<Stack>,
    mv: Move,
}

enum Step {
    Continue,
    RootExhausted,
}

/// Mutable bookkeeping of one search run.
struct SearchState {
    mode: Mode,
    /// Untried candidate moves per visited state. Entries shrink as moves are
    /// taken and are never refilled.
    move_cache: HashMap<StateKey, Vec<Move>>,
    backtrack: Vec<BacktrackRecord>,
    trace: Vec<Move>,
    backtracks: usize,
}

impl SearchState {
    fn new() -> Self {
        SearchState {
            mode: Mode::Advancing,
            move_cache: HashMap::new(),
            backtrack: Vec::new(),
            trace: Vec::new(),
            backtracks: 0,
        }
    }

    fn step(&mut self, puzzle: &mut Puzzle) -> Result<Step, PuzzleError> {
        match self.mode {
            Mode::Backtracking => Ok(self.backtrack_once(puzzle)),
            Mode::Advancing => self.advance(puzzle),
        }
    }

    /// Restores the state before the most recent accepted move and drops that
    /// move from the state's candidates. Nothing left to restore means the
    /// starting position has run out of candidates.
    fn backtrack_once(&mut self, puzzle: &mut Puzzle) -> Step {
        let Some(record) = self.backtrack.pop() else {
            return Step::RootExhausted;
        };
        if let Some(candidates) = self.move_cache.get_mut(&record.key) {
            if let Some(pos) = candidates.iter().position(|&mv| mv == record.mv) {
                candidates.remove(pos);
            }
        }
        debug!("backtracking over {} to {}", record.mv, record.key);
        puzzle.restore(record.snapshot);
        self.backtracks += 1;
        self.mode = Mode::Advancing;
        Step::Continue
    }

    fn advance(&mut self, puzzle: &mut Puzzle) -> Result<Step, PuzzleError> {
        let key = puzzle.state_key();
        let candidates = self
            .move_cache
            .entry(key.clone())
            .or_insert_with(|| filtered_moves(puzzle));

        let available = remove_opposite_of_last(candidates.clone(), self.trace.last().copied());
        let Some(mv) = available.last().copied() else {
            debug!("dead end at {}", key);
            self.trace.pop();
            self.mode = Mode::Backtracking;
            return Ok(Step::Continue);
        };
        if let Some(pos) = candidates.iter().rposition(|&c| c == mv) {
            candidates.remove(pos);
        }

        let mv = fill_efficiently(puzzle, mv);
        self.backtrack.push(BacktrackRecord {
            key,
            snapshot: puzzle.stacks().to_vec(),
            mv,
        });
        puzzle.move_pieces(mv, false)?;
        trace!("advance {}", mv);
        self.trace.push(mv);
        Ok(Step::Continue)
    }
}

/// Backtracking search for a sequence of moves that solves a [`Puzzle`].
///
/// The search is depth-first over filtered candidate moves, always taking the
/// last remaining candidate of the current state. Each state's candidate list
/// is computed once and consumed as moves are tried, which keeps the search
/// from looping. Finding no solution within the budget does not prove the
/// puzzle unsolvable.
///
/// # Examples
/// ```
/// use hoop_stack_solver::engine::{Move, Puzzle, Token};
/// use hoop_stack_solver::solver::Solver;
/// let puzzle = Puzzle::new(3, vec![vec![Token::Red], vec![Token::Red, Token::Red]]).unwrap();
/// let solution = Solver::default().solve(&puzzle).unwrap();
/// assert_eq!(solution.moves, vec![Move::new(0, 1)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Solver {
    config: SolverConfig,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver {
            config,
            cancel_flag: None,
        }
    }

    /// Makes the search stop with [`SolveFailure::Cancelled`] once `flag` is set.
    ///
    /// The flag is checked once per iteration.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Searches for a solution of `puzzle`.
    ///
    /// The puzzle itself is not modified; the search runs on a private copy.
    ///
    /// # Arguments
    /// * `puzzle`: The starting configuration.
    ///
    /// # Returns
    /// * `Ok(Solution)` with the moves that solve the puzzle. An already solved
    ///   puzzle yields an empty solution.
    /// * `Err(SolveFailure::ExhaustedBudget)` if the budget ran out or the
    ///   search ran out of moves to try.
    /// * `Err(SolveFailure::Cancelled)` if the cancel flag was raised.
    /// * `Err(SolveFailure::ContractViolation)` if the engine rejected a move
    ///   that passed the filters.
    pub fn solve(&self, puzzle: &Puzzle) -> Result<Solution, SolveFailure> {
        let mut current = puzzle.clone();
        let mut state = SearchState::new();
        let mut iterations = 0;

        info!(
            "solving {} ({} stacks, capacity {}, budget {})",
            puzzle.name().unwrap_or("puzzle"),
            puzzle.num_stacks(),
            puzzle.max_size(),
            self.config.iteration_budget
        );

        while !current.is_solved() {
            if iterations >= self.config.iteration_budget {
                warn!("iteration budget of {} exhausted", self.config.iteration_budget);
                return Err(SolveFailure::ExhaustedBudget { iterations });
            }
            if self.is_cancelled() {
                info!("search cancelled after {} iterations", iterations);
                return Err(SolveFailure::Cancelled { iterations });
            }
            iterations += 1;

            match state.step(&mut current) {
                Ok(Step::Continue) => {}
                Ok(Step::RootExhausted) => {
                    warn!(
                        "gave up after {} iterations: every candidate from the starting position failed, the budget was not reached",
                        iterations
                    );
                    return Err(SolveFailure::ExhaustedBudget { iterations });
                }
                Err(err) => {
                    error!("filtered move rejected by the engine: {}", err);
                    return Err(SolveFailure::ContractViolation(err));
                }
            }
        }

        let raw_moves = state.trace;
        let moves = if self.config.compress {
            compress_moves(&raw_moves)
        } else {
            raw_moves.clone()
        };
        info!(
            "solved in {} iterations with {} backtracks: {} moves ({} before compression)",
            iterations,
            state.backtracks,
            moves.len(),
            raw_moves.len()
        );
        Ok(Solution {
            moves,
            raw_moves,
            iterations,
            backtracks: state.backtracks,
        })
    }
}

/// Solves `puzzle` with the given iteration budget and compression enabled.
pub fn solve(puzzle: &Puzzle, iteration_budget: usize) -> Result<Solution, SolveFailure> {
    Solver::new(SolverConfig {
        iteration_budget,
        ..SolverConfig::default()
    })
    .solve(puzzle)
}
