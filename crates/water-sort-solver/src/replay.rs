//! Move replay and solution verification.
//!
//! Replaying applies the same pour the search applies, but checks every
//! move first, so it is safe to call on move lists from untrusted input.

use crate::error::{Error, Result};
use crate::moves::is_legal;
use crate::puzzle::{is_solved, Move, Tube};

/// Apply one move in place.
///
/// `index` is the position of the move in its sequence and is only used
/// for error reporting.
pub fn apply_move(tubes: &mut [Tube], index: usize, mv: Move) -> Result<()> {
    if mv.source == mv.destination || mv.source >= tubes.len() || mv.destination >= tubes.len() {
        return Err(Error::InvalidMove {
            index,
            mv,
            tubes: tubes.len(),
        });
    }
    if !is_legal(tubes, mv) {
        return Err(Error::IllegalMove { index, mv });
    }
    let run = tubes[mv.source].pop_top_run();
    tubes[mv.destination].insert_run(&run)
}

/// Replay a move sequence from `initial`, returning the final state
pub fn replay(initial: &[Tube], moves: &[Move]) -> Result<Vec<Tube>> {
    let mut tubes = initial.to_vec();
    for (index, &mv) in moves.iter().enumerate() {
        apply_move(&mut tubes, index, mv)?;
    }
    Ok(tubes)
}

/// Does the move sequence solve the puzzle?
pub fn verify_solution(initial: &[Tube], moves: &[Move]) -> Result<bool> {
    Ok(is_solved(&replay(initial, moves)?))
}

/// Parse a compact move list such as `"0>2, 1>0"`.
///
/// Both `>` and `-` are accepted between the two indices.
pub fn parse_moves(text: &str) -> Result<Vec<Move>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| -> Result<Move> {
            let syntax_error = || Error::MoveSyntax {
                token: token.to_string(),
            };
            let (from, to) = token.split_once(['>', '-']).ok_or_else(syntax_error)?;
            let from = from.trim().parse().map_err(|_| syntax_error())?;
            let to = to.trim().parse().map_err(|_| syntax_error())?;
            Ok(Move::new(from, to))
        })
        .collect()
}
