use crate::engine::{Move, Puzzle, Token};
use crate::error::ParsePuzzleError;
use itertools::Itertools;
use std::collections::HashMap;

/// Parses one token, written either as its single-character code or as a
/// color name.
pub fn parse_token(s: &str) -> Option<Token> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Token::from_char(c),
        _ => Token::from_name(s),
    }
}

/// Parses one stack, listed top-first, into its tokens in the same order.
///
/// A row is either a run of single-character codes (`"KCC"`) or a list of
/// color names separated by whitespace or commas (`"pink, cyan, cyan"`).
/// `""`, `"."` and `"-"` denote an empty stack. A row without separators
/// that is not a run of codes is read as a single color name (`"red"`).
///
/// # Arguments
/// * `row`: The text of the row.
/// * `stack`: The index of the stack, used in error messages.
pub fn parse_stack_row(row: &str, stack: usize) -> Result<Vec<Token>, ParsePuzzleError> {
    let row = row.trim();
    if row.is_empty() || row == "." || row == "-" {
        return Ok(Vec::new());
    }

    let unrecognized = |token: &str| ParsePuzzleError::UnrecognizedToken {
        token: token.to_string(),
        stack,
    };

    if row.contains(|c: char| c.is_whitespace() || c == ',') {
        return row
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|word| !word.is_empty())
            .map(|word| parse_token(word).ok_or_else(|| unrecognized(word)))
            .collect();
    }

    let codes: Option<Vec<Token>> = row.chars().map(Token::from_char).collect();
    match codes {
        Some(tokens) => Ok(tokens),
        None => Token::from_name(row)
            .map(|token| vec![token])
            .ok_or_else(|| unrecognized(row)),
    }
}

/// Returns the largest number of tokens of any one color, or `None` if there
/// are no tokens at all.
pub fn infer_max_size(stacks: &[Vec<Token>]) -> Option<usize> {
    let mut counts: HashMap<Token, usize> = HashMap::new();
    for &token in stacks.iter().flatten() {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts.into_values().max()
}

/// Parses an array of string slices into a `Puzzle`.
///
/// Each string slice is one stack, listed top-first, in the format accepted
/// by [`parse_stack_row`].
///
/// # Arguments
/// * `max_size`: The stack capacity. When `None`, it is inferred as the
///   largest number of tokens of a single color.
/// * `rows`: One string slice per stack, in stack index order.
///
/// # Returns
/// * `Ok(Puzzle)` if every row parses, every stack fits and no color occurs
///   more often than `max_size`.
/// * `Err(ParsePuzzleError)` otherwise.
///
/// # Examples
/// ```
/// use hoop_stack_solver::utils::puzzle_from_str_array;
/// use hoop_stack_solver::engine::Token;
///
/// let puzzle = puzzle_from_str_array(None, &["KCC", "KKC", ""]).unwrap();
/// assert_eq!(puzzle.max_size(), 3);
/// assert_eq!(puzzle.num_stacks(), 3);
/// // Rows are read top-first
/// assert_eq!(puzzle.stacks()[0].top(), Some(Token::Pink));
/// assert!(puzzle.stacks()[2].is_empty());
///
/// assert!(puzzle_from_str_array(None, &["KXC"]).is_err());
/// ```
pub fn puzzle_from_str_array(
    max_size: Option<usize>,
    rows: &[&str],
) -> Result<Puzzle, ParsePuzzleError> {
    let stacks = rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_stack_row(row, i))
        .collect::<Result<Vec<_>, _>>()?;

    let max_size = match max_size {
        Some(max_size) => max_size,
        None => infer_max_size(&stacks).ok_or(ParsePuzzleError::EmptyPuzzle)?,
    };

    let puzzle = Puzzle::from_top_first(max_size, stacks)?;
    puzzle.validate_color_counts()?;
    Ok(puzzle)
}

/// Parses the contents of a puzzle file.
///
/// Every non-blank line is one stack in the format of [`parse_stack_row`].
/// Lines starting with `#` are comments. Since blank lines are skipped, empty
/// stacks must be written as `.` or `-`.
pub fn puzzle_from_text(max_size: Option<usize>, text: &str) -> Result<Puzzle, ParsePuzzleError> {
    let rows: Vec<&str> = text
        .lines()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && !s.starts_with('#'))
        .collect();
    puzzle_from_str_array(max_size, &rows)
}

/// Formats a list of moves as `"0->1, 1->2"`.
pub fn format_moves(moves: &[Move]) -> String {
    moves.iter().join(", ")
}
