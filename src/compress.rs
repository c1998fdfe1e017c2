//! Rewrites a solved move trace into an equivalent, shorter one.
//!
//! The rewriting is purely algebraic: moves are never replayed against a
//! puzzle here. Both passes assume the input trace was legal move by move.
use crate::engine::Move;
use log::debug;

/// Finds the first pair `(i, j)` where move `j` undoes move `i` and nothing in
/// between touches exactly one of the two stacks.
fn find_cancel_pair(moves: &[Move]) -> Option<(usize, usize)> {
    for (i, mv) in moves.iter().enumerate() {
        let opposite = mv.reverse();
        for (offset, later) in moves[i + 1..].iter().enumerate() {
            if *later == opposite {
                return Some((i, i + 1 + offset));
            }
            if later.involves(mv.source) != later.involves(mv.dest) {
                break;
            }
        }
    }
    None
}

/// Removes move pairs that undo each other, until none are left.
///
/// # Examples
/// ```
/// use hoop_stack_solver::compress::cancel_opposites;
/// use hoop_stack_solver::engine::Move;
/// let trace = vec![Move::new(0, 1), Move::new(0, 1), Move::new(1, 0)];
/// assert_eq!(cancel_opposites(&trace), vec![Move::new(0, 1)]);
/// ```
pub fn cancel_opposites(moves: &[Move]) -> Vec<Move> {
    let mut moves = moves.to_vec();
    while let Some((i, j)) = find_cancel_pair(&moves) {
        moves.remove(j);
        moves.remove(i);
    }
    moves
}

/// Merges `(a, b)` immediately followed by `(b, c)` into `(a, c)`, for `a != c`.
///
/// The token only passes through `b`. Chains collapse in a single left-to-right
/// pass: `(0,1), (1,2), (2,3)` becomes `(0,3)`.
pub fn collapse_pass_through(moves: &[Move]) -> Vec<Move> {
    let mut out: Vec<Move> = Vec::with_capacity(moves.len());
    for &mv in moves {
        match out.last_mut() {
            Some(prev) if prev.dest == mv.source && prev.source != mv.dest => {
                prev.dest = mv.dest;
            }
            _ => out.push(mv),
        }
    }
    out
}

/// Applies both rewriting passes until the trace stops changing.
///
/// The result is never longer than the input.
pub fn compress_moves(moves: &[Move]) -> Vec<Move> {
    let mut current = moves.to_vec();
    loop {
        let next = collapse_pass_through(&cancel_opposites(&current));
        if next == current {
            break;
        }
        current = next;
    }
    debug!("compressed {} moves into {}", moves.len(), current.len());
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(pairs: &[(usize, usize)]) -> Vec<Move> {
        pairs.iter().copied().map(Move::from).collect()
    }

    #[test]
    fn test_cancel_adjacent_pair() {
        assert!(cancel_opposites(&moves(&[(0, 1), (1, 0)])).is_empty());
    }

    #[test]
    fn test_cancel_blocked_by_intervening_move() {
        let trace = moves(&[(0, 1), (0, 2), (1, 0)]);
        assert_eq!(cancel_opposites(&trace), trace);
        assert_eq!(compress_moves(&trace), trace);
    }

    #[test]
    fn test_cancel_skips_unrelated_moves() {
        let trace = moves(&[(0, 1), (2, 3), (1, 0)]);
        assert_eq!(cancel_opposites(&trace), moves(&[(2, 3)]));
    }

    #[test]
    fn test_cancel_reaches_fixed_point() {
        // Removing the inner pair exposes the outer one
        let trace = moves(&[(0, 1), (2, 0), (0, 2), (1, 0)]);
        assert!(cancel_opposites(&trace).is_empty());
    }

    #[test]
    fn test_collapse_pass_through() {
        assert_eq!(collapse_pass_through(&moves(&[(0, 1), (1, 2)])), moves(&[(0, 2)]));
        assert_eq!(
            collapse_pass_through(&moves(&[(0, 1), (1, 2), (2, 3)])),
            moves(&[(0, 3)])
        );
        // A round trip is not a pass-through
        assert_eq!(
            collapse_pass_through(&moves(&[(0, 1), (1, 0)])),
            moves(&[(0, 1), (1, 0)])
        );
    }

    #[test]
    fn test_compress_cycle_vanishes() {
        assert!(compress_moves(&moves(&[(0, 1), (1, 2), (2, 0)])).is_empty());
    }

    #[test]
    fn test_compress_is_idempotent() {
        let trace = moves(&[(0, 2), (0, 2), (1, 0), (1, 2), (1, 0), (3, 1), (1, 4)]);
        let once = compress_moves(&trace);
        assert!(once.len() <= trace.len());
        assert_eq!(compress_moves(&once), once);
    }

    #[test]
    fn test_compress_empty_trace() {
        assert!(compress_moves(&[]).is_empty());
    }
}
