//! Core model for the Hoop Stack puzzle.
//!
//! This module defines the puzzle's fundamental components:
//! - `Token`: one colored hoop.
//! - `Stack`: a bounded pile of tokens. Tokens are stored bottom-first, so the
//!   last element is the top and the only place a move acts on.
//! - `Move`: an ordered `(source, dest)` pair of stack indices.
//! - `Puzzle`: the full set of stacks sharing one capacity, with the move rule
//!   and the solved-state predicate.
//! - `Game`: an interactive session over a `Puzzle` with a move history for undo.
use crate::error::PuzzleError;
use log::warn;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use std::fmt;

/// Represents the color of a hoop.
///
/// Tokens carry no structure beyond their identity; the engine only ever
/// compares them for equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Cyan,
    Pink,
    Orange,
    White,
    Brown,
}

impl Token {
    /// Every token color, in declaration order.
    pub const ALL: [Token; 10] = [
        Token::Red,
        Token::Green,
        Token::Blue,
        Token::Yellow,
        Token::Purple,
        Token::Cyan,
        Token::Pink,
        Token::Orange,
        Token::White,
        Token::Brown,
    ];

    /// Converts the token to its single-character code.
    ///
    /// # Examples
    ///
    /// ```
    /// use hoop_stack_solver::engine::Token;
    /// assert_eq!(Token::Red.to_char(), 'R');
    /// assert_eq!(Token::Pink.to_char(), 'K');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            Token::Red => 'R',
            Token::Green => 'G',
            Token::Blue => 'B',
            Token::Yellow => 'Y',
            Token::Purple => 'P',
            Token::Cyan => 'C',
            Token::Pink => 'K',
            Token::Orange => 'O',
            Token::White => 'W',
            Token::Brown => 'N',
        }
    }

    /// Parses a single-character code, ignoring case.
    ///
    /// Returns `None` for characters that are not a token code.
    pub fn from_char(c: char) -> Option<Token> {
        Token::ALL
            .iter()
            .copied()
            .find(|token| token.to_char() == c.to_ascii_uppercase())
    }

    /// Returns the lower-case color name.
    pub fn name(&self) -> &'static str {
        match self {
            Token::Red => "red",
            Token::Green => "green",
            Token::Blue => "blue",
            Token::Yellow => "yellow",
            Token::Purple => "purple",
            Token::Cyan => "cyan",
            Token::Pink => "pink",
            Token::Orange => "orange",
            Token::White => "white",
            Token::Brown => "brown",
        }
    }

    /// Parses a color name, ignoring case.
    ///
    /// Besides the full names returned by [`Token::name`], the short forms used
    /// when writing levels by hand (`pi`, `pu`, `gren`, `purp`, ...) are accepted.
    pub fn from_name(name: &str) -> Option<Token> {
        let lowered = name.trim().to_ascii_lowercase();
        let token = match lowered.as_str() {
            "red" | "r" => Token::Red,
            "green" | "gren" | "g" => Token::Green,
            "blue" | "b" => Token::Blue,
            "yellow" | "y" => Token::Yellow,
            "purple" | "purp" | "pu" | "p" => Token::Purple,
            "cyan" | "c" => Token::Cyan,
            "pink" | "pi" | "k" => Token::Pink,
            "orange" | "o" => Token::Orange,
            "white" | "w" => Token::White,
            "brown" | "n" => Token::Brown,
            _ => return None,
        };
        Some(token)
    }

    /// Returns the ANSI background color code string for terminal output.
    fn to_ansi_color_code(&self) -> &'static str {
        match self {
            Token::Red => "41",
            Token::Green => "42",
            Token::Yellow => "43",
            Token::Blue => "44",
            Token::Purple => "45",
            Token::Cyan => "46",
            Token::White => "47",
            Token::Orange => "101",
            Token::Pink => "105",
            Token::Brown => "100",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A bounded, ordered pile of tokens.
///
/// Tokens are kept bottom-first: `tokens()[0]` is the bottom of the stack and
/// the last element is the top. The capacity is owned by the [`Puzzle`], which
/// shares one `max_size` across all of its stacks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Stack {
    tokens: Vec<Token>,
}

impl Stack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Stack { tokens: Vec::new() }
    }

    /// Creates a stack from tokens listed bottom-first (the last one is the top).
    pub fn from_bottom_first(tokens: Vec<Token>) -> Self {
        Stack { tokens }
    }

    /// Creates a stack from tokens listed top-first (the first one is the top).
    pub fn from_top_first(mut tokens: Vec<Token>) -> Self {
        tokens.reverse();
        Stack { tokens }
    }

    /// Returns the tokens bottom-first.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the top token, or `None` for an empty stack.
    pub fn top(&self) -> Option<Token> {
        self.tokens.last().copied()
    }

    /// Returns `true` if the stack holds `max_size` tokens or more.
    pub fn is_full(&self, max_size: usize) -> bool {
        self.tokens.len() >= max_size
    }

    /// Returns `true` if the stack is non-empty and all of its tokens are equal.
    ///
    /// An empty stack is *not* homogeneous.
    pub fn is_homogeneous(&self) -> bool {
        match self.tokens.split_first() {
            Some((first, rest)) => rest.iter().all(|token| token == first),
            None => false,
        }
    }

    /// Returns `true` if the stack is empty, or homogeneous and at full capacity.
    ///
    /// A homogeneous stack that is not yet full is *not* solved.
    pub fn is_solved_or_empty(&self, max_size: usize) -> bool {
        self.is_empty() || (self.is_homogeneous() && self.len() == max_size)
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn pop(&mut self) -> Option<Token> {
        self.tokens.pop()
    }
}

/// Returns whether the top token of `source` may be placed on `dest`.
///
/// The checks run in a fixed order:
/// 1. an empty `source` or a full `dest` is never compatible;
/// 2. an empty `dest` accepts anything;
/// 3. otherwise the two top tokens must be equal.
///
/// # Examples
/// ```
/// use hoop_stack_solver::engine::{compatible, Stack, Token};
/// let source = Stack::from_bottom_first(vec![Token::Blue, Token::Red]);
/// let dest = Stack::from_bottom_first(vec![Token::Red]);
/// assert!(compatible(&source, &dest, 3));
/// assert!(compatible(&source, &Stack::new(), 3));
/// assert!(!compatible(&Stack::new(), &dest, 3));
/// ```
pub fn compatible(source: &Stack, dest: &Stack, max_size: usize) -> bool {
    // Cannot move from an empty stack or onto a full one
    if source.is_empty() || dest.is_full(max_size) {
        return false;
    }

    match dest.top() {
        None => true,
        Some(top) => source.top() == Some(top),
    }
}

/// A move of the top token of stack `source` onto stack `dest`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub source: usize,
    pub dest: usize,
}

impl Move {
    pub fn new(source: usize, dest: usize) -> Self {
        Move { source, dest }
    }

    /// Returns the move that undoes this one, `(dest, source)`.
    pub fn reverse(&self) -> Move {
        Move {
            source: self.dest,
            dest: self.source,
        }
    }

    /// Returns `true` if `index` is either end of the move.
    pub fn involves(&self, index: usize) -> bool {
        self.source == index || self.dest == index
    }
}

impl From<(usize, usize)> for Move {
    fn from((source, dest): (usize, usize)) -> Self {
        Move { source, dest }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.dest)
    }
}

/// Canonical, collision-free serialization of a puzzle's stack contents.
///
/// Each stack is written bottom-first as token codes and stacks are separated
/// by `|`, in index order. The key is a plain value: it does not borrow the
/// puzzle it was computed from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(String);

impl StateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The full set of stacks of one level, sharing a single capacity.
///
/// The puzzle exclusively owns its stacks. They change only through
/// [`Puzzle::move_pieces`], which pops from one stack and pushes onto another.
///
/// # Examples
/// ```
/// use hoop_stack_solver::engine::{Move, Puzzle, Token};
/// // Stacks are listed bottom-first.
/// let mut puzzle = Puzzle::new(3, vec![vec![Token::Cyan], vec![Token::Cyan, Token::Cyan]]).unwrap();
/// assert!(!puzzle.is_solved());
/// puzzle.move_pieces(Move::new(0, 1), false).unwrap();
/// assert!(puzzle.is_solved());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Puzzle {
    name: Option<String>,
    max_size: usize,
    stacks: Vec<Stack>,
}

impl Puzzle {
    /// Creates a puzzle from stacks whose tokens are listed bottom-first.
    ///
    /// # Arguments
    /// * `max_size`: The capacity shared by every stack. Must be at least 1.
    /// * `stacks`: The initial contents, one `Vec` per stack, bottom token first.
    ///
    /// # Returns
    /// * `Ok(Puzzle)` if every stack fits within `max_size`.
    /// * `Err(PuzzleError::MalformedPuzzle)` if `max_size` is zero or a stack
    ///   holds more than `max_size` tokens.
    pub fn new(max_size: usize, stacks: Vec<Vec<Token>>) -> Result<Self, PuzzleError> {
        let mut puzzle = Puzzle::empty(max_size)?;
        for tokens in stacks {
            puzzle.add_stack(tokens)?;
        }
        Ok(puzzle)
    }

    /// Creates a puzzle from stacks whose tokens are listed top-first.
    ///
    /// This is the order in which a level is read off the screen, and the order
    /// used by the text format in [`crate::utils`].
    pub fn from_top_first(max_size: usize, stacks: Vec<Vec<Token>>) -> Result<Self, PuzzleError> {
        let bottom_first = stacks
            .into_iter()
            .map(|mut tokens| {
                tokens.reverse();
                tokens
            })
            .collect();
        Puzzle::new(max_size, bottom_first)
    }

    /// Creates a puzzle with no stacks.
    pub fn empty(max_size: usize) -> Result<Self, PuzzleError> {
        if max_size == 0 {
            return Err(PuzzleError::malformed("stack capacity must be at least 1"));
        }
        Ok(Puzzle {
            name: None,
            max_size,
            stacks: Vec::new(),
        })
    }

    /// Creates a puzzle with randomly dealt tokens using a provided seed.
    ///
    /// `num_colors * max_size` tokens (exactly `max_size` of each of the first
    /// `num_colors` colors) are shuffled and dealt into `num_colors` full
    /// stacks, followed by `num_empty` empty stacks. The same arguments always
    /// produce the same puzzle.
    ///
    /// # Returns
    /// * `Err(PuzzleError::MalformedPuzzle)` if `num_colors` is zero or larger
    ///   than the number of token colors, or if `max_size` is zero.
    pub fn new_random_with_seed(
        num_colors: usize,
        max_size: usize,
        num_empty: usize,
        seed: u64,
    ) -> Result<Self, PuzzleError> {
        if num_colors == 0 || num_colors > Token::ALL.len() {
            return Err(PuzzleError::malformed(format!(
                "number of colors must be between 1 and {}, found {}",
                Token::ALL.len(),
                num_colors
            )));
        }
        let mut puzzle = Puzzle::empty(max_size)?;

        let mut tokens: Vec<Token> = Token::ALL[..num_colors]
            .iter()
            .flat_map(|&token| std::iter::repeat(token).take(max_size))
            .collect();
        let mut rng = SmallRng::seed_from_u64(seed);
        tokens.shuffle(&mut rng);

        for chunk in tokens.chunks(max_size) {
            puzzle.add_stack(chunk.to_vec())?;
        }
        for _ in 0..num_empty {
            puzzle.add_stack(Vec::new())?;
        }
        Ok(puzzle.with_name(format!("Random {}", seed)))
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Appends a stack whose tokens are listed bottom-first.
    ///
    /// # Returns
    /// `Err(PuzzleError::MalformedPuzzle)` if the stack holds more than
    /// `max_size` tokens; the puzzle is left unchanged.
    pub fn add_stack(&mut self, tokens: Vec<Token>) -> Result<(), PuzzleError> {
        if tokens.len() > self.max_size {
            return Err(PuzzleError::malformed(format!(
                "stack {} holds {} tokens but the capacity is {}",
                self.stacks.len(),
                tokens.len(),
                self.max_size
            )));
        }
        self.stacks.push(Stack::from_bottom_first(tokens));
        Ok(())
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Returns the stack at `index`, or `None` if it does not exist.
    pub fn stack(&self, index: usize) -> Option<&Stack> {
        self.stacks.get(index)
    }

    pub fn num_stacks(&self) -> usize {
        self.stacks.len()
    }

    /// Returns `true` if every stack is empty, or full of a single color.
    pub fn is_solved(&self) -> bool {
        self.stacks
            .iter()
            .all(|stack| stack.is_solved_or_empty(self.max_size))
    }

    /// Checks [`compatible`] for the two stacks named by `mv`.
    ///
    /// Returns `false` when either index is out of range or both are equal.
    pub fn is_pair_compatible(&self, mv: Move) -> bool {
        if mv.source == mv.dest {
            return false;
        }
        match (self.stacks.get(mv.source), self.stacks.get(mv.dest)) {
            (Some(source), Some(dest)) => compatible(source, dest, self.max_size),
            _ => false,
        }
    }

    /// Moves the top token of `mv.source` onto `mv.dest`.
    ///
    /// The structural invariants are always enforced: both indices must exist
    /// and differ, the source must be non-empty and the destination below
    /// capacity. Unless `bypass_checks` is set, the color rule of
    /// [`compatible`] must hold as well. `bypass_checks` exists for replaying
    /// known traces (undo); forward search never uses it.
    ///
    /// # Arguments
    /// * `mv`: The move to perform.
    /// * `bypass_checks`: Skip the top-token color check.
    ///
    /// # Returns
    /// * `Ok(())` if exactly one token was moved.
    /// * `Err(PuzzleError)` otherwise, with the puzzle left unchanged.
    pub fn move_pieces(&mut self, mv: Move, bypass_checks: bool) -> Result<(), PuzzleError> {
        let num_stacks = self.stacks.len();
        for index in [mv.source, mv.dest] {
            if index >= num_stacks {
                return Err(PuzzleError::StackOutOfRange { index, num_stacks });
            }
        }
        if mv.source == mv.dest {
            return Err(PuzzleError::SameStack { index: mv.source });
        }
        if !bypass_checks && !self.is_pair_compatible(mv) {
            return Err(PuzzleError::IncompatibleMove { mv });
        }
        if self.stacks[mv.source].is_empty() {
            return Err(PuzzleError::EmptySource { index: mv.source });
        }
        if self.stacks[mv.dest].is_full(self.max_size) {
            return Err(PuzzleError::StackFull { index: mv.dest });
        }

        if let Some(token) = self.stacks[mv.source].pop() {
            self.stacks[mv.dest].push(token);
        }
        Ok(())
    }

    /// Computes the canonical key of the current stack contents.
    pub fn state_key(&self) -> StateKey {
        let num_tokens: usize = self.stacks.iter().map(Stack::len).sum();
        let mut key = String::with_capacity(num_tokens + self.stacks.len());
        for (i, stack) in self.stacks.iter().enumerate() {
            if i > 0 {
                key.push('|');
            }
            key.extend(stack.tokens().iter().map(Token::to_char));
        }
        StateKey(key)
    }

    /// Counts the tokens of each color across all stacks.
    pub fn color_counts(&self) -> HashMap<Token, usize> {
        let mut counts = HashMap::new();
        for stack in &self.stacks {
            for &token in stack.tokens() {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Checks that no color occurs more often than one stack can hold.
    ///
    /// A color with more than `max_size` tokens can never end up in a single
    /// full stack, which the search relies on. Colors with fewer tokens make
    /// the puzzle unsolvable too, but are only logged.
    pub fn validate_color_counts(&self) -> Result<(), PuzzleError> {
        let mut counts: Vec<(Token, usize)> = self.color_counts().into_iter().collect();
        counts.sort_unstable();
        for (token, count) in counts {
            if count > self.max_size {
                return Err(PuzzleError::malformed(format!(
                    "{} appears {} times but a stack holds {}",
                    token, count, self.max_size
                )));
            }
            if count < self.max_size {
                warn!(
                    "{} appears {} times, fewer than the capacity {}; the puzzle cannot be solved",
                    token, count, self.max_size
                );
            }
        }
        Ok(())
    }

    /// Replaces the stack contents with a previously saved snapshot.
    pub(crate) fn restore(&mut self, stacks: Vec<Stack>) {
        self.stacks = stacks;
    }

    /// Renders the puzzle with an optional highlighted stack.
    ///
    /// Stacks are drawn as columns, top row first, with their indices
    /// underneath. Tokens use ANSI background colors. If `selected` is
    /// `Some(index)`, a `^` marks that stack.
    pub fn to_string_with_highlight(&self, selected: Option<usize>) -> String {
        let mut output = String::new();
        if let Some(name) = &self.name {
            output.push_str(name);
            output.push('\n');
        }

        // No stack can be taller than the token count, whatever the capacity
        let num_tokens: usize = self.stacks.iter().map(Stack::len).sum();
        for level in (0..self.max_size.min(num_tokens)).rev() {
            for stack in &self.stacks {
                match stack.tokens().get(level) {
                    Some(token) => output.push_str(&format!(
                        "\x1b[1;{};m {} \x1b[m",
                        token.to_ansi_color_code(),
                        token.to_char()
                    )),
                    None => output.push_str(" . "),
                }
                output.push(' ');
            }
            output.push('\n');
        }

        for index in 0..self.stacks.len() {
            output.push_str(&format!("{:^3} ", index));
        }
        if let Some(selected) = selected.filter(|&s| s < self.stacks.len()) {
            output.push('\n');
            output.push_str(&" ".repeat(selected * 4));
            output.push_str(" ^");
        }
        output
    }
}

impl fmt::Display for Puzzle {
    /// Formats the puzzle using `to_string_with_highlight(None)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}

/// An interactive play session over a [`Puzzle`].
///
/// Every accepted move is recorded so that it can be undone. Undo replays the
/// inverse move with the color check bypassed, which is always structurally
/// valid right after the move it reverses.
///
/// # Examples
/// ```
/// use hoop_stack_solver::engine::{Game, Move, Puzzle, Token};
/// let puzzle = Puzzle::new(3, vec![vec![Token::Red], vec![Token::Red, Token::Red]]).unwrap();
/// let mut game = Game::new(puzzle);
/// game.process_move(Move::new(0, 1)).unwrap();
/// assert!(game.is_solved());
/// assert!(game.undo_last_move());
/// assert_eq!(game.steps(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct Game {
    initial: Puzzle,
    puzzle: Puzzle,
    history: Vec<Move>,
}

impl Game {
    pub fn new(puzzle: Puzzle) -> Self {
        Game {
            initial: puzzle.clone(),
            puzzle,
            history: Vec::new(),
        }
    }

    /// Returns the current state of the puzzle.
    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    /// Returns the puzzle as it was when the game started.
    pub fn initial(&self) -> &Puzzle {
        &self.initial
    }

    /// Returns the moves played so far, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn steps(&self) -> usize {
        self.history.len()
    }

    pub fn is_solved(&self) -> bool {
        self.puzzle.is_solved()
    }

    /// Plays a checked move and records it.
    pub fn process_move(&mut self, mv: Move) -> Result<(), PuzzleError> {
        self.puzzle.move_pieces(mv, false)?;
        self.history.push(mv);
        Ok(())
    }

    /// Undoes the last move.
    ///
    /// # Returns
    /// `false` if there is nothing to undo.
    pub fn undo_last_move(&mut self) -> bool {
        let Some(last) = self.history.pop() else {
            return false;
        };
        match self.puzzle.move_pieces(last.reverse(), true) {
            Ok(()) => true,
            Err(err) => {
                warn!("could not undo {}: {}", last, err);
                self.history.push(last);
                false
            }
        }
    }

    /// Returns to the starting configuration and clears the history.
    pub fn reset(&mut self) {
        self.puzzle = self.initial.clone();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;

    fn stack(tokens: &[Token]) -> Stack {
        Stack::from_bottom_first(tokens.to_vec())
    }

    #[test]
    fn test_token_char_round_trip() {
        for token in Token::ALL {
            assert_eq!(Token::from_char(token.to_char()), Some(token));
            assert_eq!(Token::from_char(token.to_char().to_ascii_lowercase()), Some(token));
            assert_eq!(Token::from_name(token.name()), Some(token));
        }
        assert_eq!(Token::from_char('X'), None);
        assert_eq!(Token::from_name("pi"), Some(Pink));
        assert_eq!(Token::from_name("PU"), Some(Purple));
        assert_eq!(Token::from_name("magenta"), None);
    }

    #[test]
    fn test_stack_top_first_is_reversed() {
        let s = Stack::from_top_first(vec![Red, Green, Blue]);
        assert_eq!(s.tokens(), &[Blue, Green, Red]);
        assert_eq!(s.top(), Some(Red));
        assert_eq!(Stack::new().top(), None);
    }

    #[test]
    fn test_compatible_empty_source_is_never_compatible() {
        for max_size in 1..4 {
            assert!(!compatible(&Stack::new(), &Stack::new(), max_size));
            assert!(!compatible(&Stack::new(), &stack(&[Red]), max_size));
        }
    }

    #[test]
    fn test_compatible_empty_destination_accepts_anything() {
        for max_size in 1..4 {
            assert!(compatible(&stack(&[Red]), &Stack::new(), max_size));
            assert!(compatible(&stack(&[Red, Blue]), &Stack::new(), max_size));
        }
    }

    #[test]
    fn test_compatible_full_destination_short_circuits() {
        // Same top token, but the destination is already full
        assert!(!compatible(&stack(&[Red]), &stack(&[Red, Red]), 2));
        assert!(compatible(&stack(&[Red]), &stack(&[Red, Red]), 3));
    }

    #[test]
    fn test_compatible_requires_equal_tops() {
        assert!(compatible(&stack(&[Blue, Red]), &stack(&[Green, Red]), 3));
        assert!(!compatible(&stack(&[Red, Blue]), &stack(&[Red]), 3));
    }

    #[test]
    fn test_is_homogeneous() {
        assert!(!Stack::new().is_homogeneous());
        assert!(stack(&[Red]).is_homogeneous());
        assert!(stack(&[Red, Red, Red]).is_homogeneous());
        assert!(!stack(&[Red, Blue, Red]).is_homogeneous());
    }

    #[test]
    fn test_is_solved_or_empty() {
        for max_size in 0..5 {
            assert!(Stack::new().is_solved_or_empty(max_size));
        }
        assert!(stack(&[Red, Red, Red]).is_solved_or_empty(3));
        // Homogeneous but short of capacity
        assert!(!stack(&[Red, Red]).is_solved_or_empty(3));
        assert!(!stack(&[Red, Blue, Red]).is_solved_or_empty(3));
    }

    #[test]
    fn test_puzzle_rejects_bad_capacity() {
        assert!(matches!(
            Puzzle::new(0, vec![vec![]]),
            Err(PuzzleError::MalformedPuzzle { .. })
        ));
        assert!(matches!(
            Puzzle::new(2, vec![vec![Red, Red, Red]]),
            Err(PuzzleError::MalformedPuzzle { .. })
        ));
    }

    #[test]
    fn test_puzzle_from_top_first() {
        let puzzle = Puzzle::from_top_first(3, vec![vec![Pink, Cyan, Cyan], vec![]]).unwrap();
        assert_eq!(puzzle.stacks()[0].tokens(), &[Cyan, Cyan, Pink]);
        assert_eq!(puzzle.stacks()[0].top(), Some(Pink));
        assert!(puzzle.stacks()[1].is_empty());
    }

    #[test]
    fn test_is_solved() {
        let solved = Puzzle::new(2, vec![vec![Red, Red], vec![], vec![Blue, Blue]]).unwrap();
        assert!(solved.is_solved());
        let unsolved = Puzzle::new(2, vec![vec![Red], vec![Red], vec![Blue, Blue]]).unwrap();
        assert!(!unsolved.is_solved());
    }

    #[test]
    fn test_move_pieces_valid() {
        let mut puzzle = Puzzle::new(3, vec![vec![Red], vec![Red, Red]]).unwrap();
        puzzle.move_pieces(Move::new(0, 1), false).unwrap();
        assert!(puzzle.stacks()[0].is_empty());
        assert_eq!(puzzle.stacks()[1].tokens(), &[Red, Red, Red]);
    }

    #[test]
    fn test_move_pieces_incompatible_leaves_puzzle_unchanged() {
        let mut puzzle = Puzzle::new(3, vec![vec![Red], vec![Blue]]).unwrap();
        let before = puzzle.clone();
        let err = puzzle.move_pieces(Move::new(0, 1), false).unwrap_err();
        assert_eq!(err, PuzzleError::IncompatibleMove { mv: Move::new(0, 1) });
        assert_eq!(puzzle, before);
    }

    #[test]
    fn test_move_pieces_structural_errors() {
        let mut puzzle = Puzzle::new(1, vec![vec![Red], vec![], vec![Blue]]).unwrap();
        let before = puzzle.clone();
        assert_eq!(
            puzzle.move_pieces(Move::new(0, 5), true),
            Err(PuzzleError::StackOutOfRange { index: 5, num_stacks: 3 })
        );
        assert_eq!(
            puzzle.move_pieces(Move::new(0, 0), true),
            Err(PuzzleError::SameStack { index: 0 })
        );
        assert_eq!(
            puzzle.move_pieces(Move::new(1, 0), true),
            Err(PuzzleError::EmptySource { index: 1 })
        );
        assert_eq!(
            puzzle.move_pieces(Move::new(0, 2), true),
            Err(PuzzleError::StackFull { index: 2 })
        );
        assert_eq!(puzzle, before);
    }

    #[test]
    fn test_move_pieces_bypass_skips_color_rule() {
        let mut puzzle = Puzzle::new(3, vec![vec![Red], vec![Blue]]).unwrap();
        puzzle.move_pieces(Move::new(0, 1), true).unwrap();
        assert_eq!(puzzle.stacks()[1].tokens(), &[Blue, Red]);
    }

    #[test]
    fn test_huge_capacity_key_and_display() {
        let puzzle = Puzzle::new(usize::MAX, vec![vec![Red], vec![Red, Blue]]).unwrap();
        assert_eq!(puzzle.state_key().as_str(), "R|RB");
        let display = puzzle.to_string();
        // One row per token at most
        assert_eq!(display.lines().count(), 3 + 1);
    }

    #[test]
    fn test_state_key_is_canonical() {
        let a = Puzzle::new(3, vec![vec![Red, Blue], vec![], vec![Cyan]]).unwrap();
        let b = Puzzle::new(3, vec![vec![Red], vec![Blue], vec![Cyan]]).unwrap();
        assert_eq!(a.state_key().as_str(), "RB||C");
        assert_eq!(b.state_key().as_str(), "R|B|C");
        assert_ne!(a.state_key(), b.state_key());
        assert_eq!(a.state_key(), a.clone().state_key());
    }

    #[test]
    fn test_validate_color_counts() {
        let ok = Puzzle::new(2, vec![vec![Red, Blue], vec![Blue, Red]]).unwrap();
        assert!(ok.validate_color_counts().is_ok());
        let too_many = Puzzle::new(2, vec![vec![Red, Red], vec![Red]]).unwrap();
        assert!(matches!(
            too_many.validate_color_counts(),
            Err(PuzzleError::MalformedPuzzle { .. })
        ));
    }

    #[test]
    fn test_new_random_with_seed_determinism() {
        let a = Puzzle::new_random_with_seed(4, 4, 2, 123).unwrap();
        let b = Puzzle::new_random_with_seed(4, 4, 2, 123).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.num_stacks(), 6);
        assert!(a.stacks()[4].is_empty() && a.stacks()[5].is_empty());
        let counts = a.color_counts();
        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|&count| count == 4));
        assert!(a.validate_color_counts().is_ok());
    }

    #[test]
    fn test_new_random_with_seed_rejects_bad_color_count() {
        assert!(Puzzle::new_random_with_seed(0, 3, 1, 0).is_err());
        assert!(Puzzle::new_random_with_seed(Token::ALL.len() + 1, 3, 1, 0).is_err());
        assert!(Puzzle::new_random_with_seed(2, 0, 1, 0).is_err());
    }

    #[test]
    fn test_display_lists_every_stack() {
        let puzzle = Puzzle::new(2, vec![vec![Red], vec![Blue, Blue]])
            .unwrap()
            .with_name("Tiny");
        let display = format!("{}", puzzle);
        println!("---Puzzle Display Test:\n{}\n---", display);
        assert!(display.starts_with("Tiny\n"));
        assert!(display.contains('R'));
        assert!(display.contains(" . "));
        let highlighted = puzzle.to_string_with_highlight(Some(1));
        assert!(highlighted.ends_with('^'));
    }

    #[test]
    fn test_game_process_and_undo() {
        let puzzle = Puzzle::new(3, vec![vec![Red, Blue], vec![Blue], vec![]]).unwrap();
        let mut game = Game::new(puzzle.clone());
        assert!(!game.undo_last_move());

        game.process_move(Move::new(0, 1)).unwrap();
        game.process_move(Move::new(0, 2)).unwrap();
        assert_eq!(game.steps(), 2);
        assert_eq!(game.history(), &[Move::new(0, 1), Move::new(0, 2)]);

        assert!(game.process_move(Move::new(2, 1)).is_err());
        assert_eq!(game.steps(), 2);

        assert!(game.undo_last_move());
        assert!(game.undo_last_move());
        assert_eq!(game.puzzle(), &puzzle);

        game.process_move(Move::new(0, 2)).unwrap();
        game.reset();
        assert_eq!(game.puzzle(), game.initial());
        assert_eq!(game.steps(), 0);
    }
}
