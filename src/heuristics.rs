use crate::engine::{Move, Puzzle};
use itertools::Itertools;

/// Generates every ordered pair of distinct stack indices.
///
/// The pairs come out in lexicographic order, `(0,1), (0,2), ..., (1,0), ...`,
/// which fixes the order in which the search later tries them.
///
/// # Arguments
/// * `puzzle`: The puzzle whose stacks are paired up.
///
/// # Returns
/// `n * (n - 1)` moves for a puzzle with `n` stacks.
pub fn all_candidate_moves(puzzle: &Puzzle) -> Vec<Move> {
    (0..puzzle.num_stacks())
        .permutations(2)
        .map(|pair| Move::new(pair[0], pair[1]))
        .collect()
}

/// Drops moves whose source stack is empty or already solved.
///
/// Moving a token out of a finished stack never helps, and an empty stack
/// has nothing to give. Moves naming a stack that does not exist are dropped
/// as well.
pub fn remove_empty_or_solved_sources(moves: Vec<Move>, puzzle: &Puzzle) -> Vec<Move> {
    moves
        .into_iter()
        .filter(|mv| match puzzle.stack(mv.source) {
            Some(source) => !source.is_solved_or_empty(puzzle.max_size()),
            None => false,
        })
        .collect()
}

/// Drops moves that break the stacking rule.
pub fn remove_incompatible(moves: Vec<Move>, puzzle: &Puzzle) -> Vec<Move> {
    moves
        .into_iter()
        .filter(|&mv| puzzle.is_pair_compatible(mv))
        .collect()
}

/// Drops moves from a homogeneous stack onto a stack that is not homogeneous.
///
/// Empty destinations count as not homogeneous, so a single-color pile is
/// never split back onto an empty stack either. The filter may leave no
/// moves at all; there is no fallback.
pub fn remove_same_to_different(moves: Vec<Move>, puzzle: &Puzzle) -> Vec<Move> {
    moves
        .into_iter()
        .filter(|mv| match (puzzle.stack(mv.source), puzzle.stack(mv.dest)) {
            (Some(source), Some(dest)) => !(source.is_homogeneous() && !dest.is_homogeneous()),
            _ => false,
        })
        .collect()
}

/// Drops the exact reverse of `last`, the move that led to the current state.
///
/// This only discourages immediate two-step cycles. It is applied by the
/// search loop, not by [`filtered_moves`].
pub fn remove_opposite_of_last(moves: Vec<Move>, last: Option<Move>) -> Vec<Move> {
    match last {
        Some(last) => {
            let opposite = last.reverse();
            moves.into_iter().filter(|&mv| mv != opposite).collect()
        }
        None => moves,
    }
}

/// Runs the standard filter pipeline over all candidate moves.
///
/// The result depends only on the stack contents and the capacity, so it can
/// be cached per [`StateKey`](crate::engine::StateKey).
pub fn filtered_moves(puzzle: &Puzzle) -> Vec<Move> {
    let moves = all_candidate_moves(puzzle);
    let moves = remove_empty_or_solved_sources(moves, puzzle);
    let moves = remove_incompatible(moves, puzzle);
    remove_same_to_different(moves, puzzle)
}

/// Points a move between two homogeneous stacks at the larger one.
///
/// If both stacks of `mv` are homogeneous and the source is strictly taller
/// than the destination, the reversed move is returned, so the smaller pile
/// is consolidated into the larger. Otherwise `mv` is returned unchanged.
pub fn fill_efficiently(puzzle: &Puzzle, mv: Move) -> Move {
    match (puzzle.stack(mv.source), puzzle.stack(mv.dest)) {
        (Some(source), Some(dest))
            if source.is_homogeneous() && dest.is_homogeneous() && source.len() > dest.len() =>
        {
            mv.reverse()
        }
        _ => mv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Token::*;

    fn moves(pairs: &[(usize, usize)]) -> Vec<Move> {
        pairs.iter().copied().map(Move::from).collect()
    }

    #[test]
    fn test_all_candidate_moves_order() {
        let puzzle = Puzzle::new(3, vec![vec![], vec![], vec![]]).unwrap();
        assert_eq!(
            all_candidate_moves(&puzzle),
            moves(&[(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)])
        );
        let single = Puzzle::new(3, vec![vec![Red]]).unwrap();
        assert!(all_candidate_moves(&single).is_empty());
    }

    #[test]
    fn test_remove_empty_or_solved_sources() {
        let puzzle = Puzzle::new(2, vec![vec![Red, Red], vec![], vec![Red, Blue]]).unwrap();
        let kept = remove_empty_or_solved_sources(all_candidate_moves(&puzzle), &puzzle);
        assert_eq!(kept, moves(&[(2, 0), (2, 1)]));
    }

    #[test]
    fn test_filters_drop_out_of_range_moves() {
        let puzzle = Puzzle::new(2, vec![vec![Red], vec![]]).unwrap();
        let bogus = moves(&[(0, 7), (7, 0)]);
        assert!(remove_empty_or_solved_sources(bogus.clone(), &puzzle)
            .iter()
            .all(|mv| mv.source < 2));
        assert!(remove_incompatible(bogus.clone(), &puzzle).is_empty());
        assert!(remove_same_to_different(bogus, &puzzle).is_empty());
    }

    #[test]
    fn test_filtered_moves_homogeneous_source_stays_put() {
        let puzzle = Puzzle::new(3, vec![vec![Red, Green], vec![Green], vec![]]).unwrap();
        assert_eq!(filtered_moves(&puzzle), moves(&[(0, 1), (0, 2)]));
    }

    #[test]
    fn test_filtered_moves_skips_solved_stack() {
        let puzzle = Puzzle::new(
            3,
            vec![vec![Red, Red], vec![Green, Red], vec![], vec![Blue, Blue, Blue]],
        )
        .unwrap();
        assert_eq!(filtered_moves(&puzzle), moves(&[(1, 0), (1, 2)]));
    }

    #[test]
    fn test_filtered_moves_can_be_empty() {
        let puzzle = Puzzle::new(2, vec![vec![Red, Green], vec![Green, Red]]).unwrap();
        assert!(filtered_moves(&puzzle).is_empty());
    }

    #[test]
    fn test_filtered_moves_is_deterministic() {
        let puzzle = Puzzle::new_random_with_seed(4, 3, 2, 7).unwrap();
        assert_eq!(filtered_moves(&puzzle), filtered_moves(&puzzle.clone()));
    }

    #[test]
    fn test_remove_opposite_of_last() {
        let candidates = moves(&[(0, 1), (1, 0), (1, 2)]);
        assert_eq!(
            remove_opposite_of_last(candidates.clone(), Some(Move::new(0, 1))),
            moves(&[(0, 1), (1, 2)])
        );
        assert_eq!(remove_opposite_of_last(candidates.clone(), None), candidates);
    }

    #[test]
    fn test_fill_efficiently_flips_towards_larger_pile() {
        let puzzle = Puzzle::new(4, vec![vec![Red, Red, Red], vec![Red], vec![Red, Blue]]).unwrap();
        assert_eq!(fill_efficiently(&puzzle, Move::new(0, 1)), Move::new(1, 0));
        assert_eq!(fill_efficiently(&puzzle, Move::new(1, 0)), Move::new(1, 0));
        // Mixed source keeps its direction
        assert_eq!(fill_efficiently(&puzzle, Move::new(2, 1)), Move::new(2, 1));
    }

    #[test]
    fn test_fill_efficiently_equal_heights_unchanged() {
        let puzzle = Puzzle::new(4, vec![vec![Red, Red], vec![Red, Red]]).unwrap();
        assert_eq!(fill_efficiently(&puzzle, Move::new(0, 1)), Move::new(0, 1));
    }
}
