//! Legal move generation with search space pruning.
//!
//! A pour is legal when the destination accepts the source's whole top run.
//! On top of that, the generator drops pours that can never be useful so
//! the depth-first search stays tractable:
//!
//! 1. empty and solved tubes are never poured from;
//! 2. a tube never pours into itself;
//! 3. a color that already sits in a unicolor standard tube (the source
//!    included) is never poured into an empty tube;
//! 4. a unicolor tube is never poured into an empty tube that is no larger
//!    than itself;
//! 5. a given color is poured into at most one empty tube of each capacity
//!    per source, since empty tubes of the same capacity are interchangeable.
//!
//! An extra tube holding a single unit does not count for rule 3, so that
//! unit can still move into an empty standard tube when its color has no
//! standard home yet.
//!
//! Rules 3 and 4 also make the search terminate. Every remaining move either
//! removes a color boundary, empties a tube, or moves a unit out of an extra
//! tube without doing either.

use log::trace;

use crate::puzzle::{Color, Move, Tube};

/// Set of palette colors, indexed by color code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ColorSet([bool; Color::COUNT]);

impl ColorSet {
    fn contains(&self, color: Color) -> bool {
        self.0[color.code() as usize]
    }

    fn insert(&mut self, color: Color) {
        self.0[color.code() as usize] = true;
    }
}

/// Colors held by unicolor standard tubes anywhere in the state
fn unicolor_colors(tubes: &[Tube]) -> ColorSet {
    let mut colors = ColorSet::default();
    for tube in tubes
        .iter()
        .filter(|t| t.is_unicolor() && t.capacity() == Tube::STANDARD_CAPACITY)
    {
        if let Some(color) = tube.top() {
            colors.insert(color);
        }
    }
    colors
}

/// Check if a tube can never be a useful source
fn is_dead_source(tube: &Tube) -> bool {
    tube.is_empty() || tube.is_solved()
}

/// Check if `mv` pours between two distinct tubes that accept the pour.
///
/// This is the legality test alone, without any of the pruning rules.
pub fn is_legal(tubes: &[Tube], mv: Move) -> bool {
    if mv.source == mv.destination {
        return false;
    }
    match (tubes.get(mv.source), tubes.get(mv.destination)) {
        (Some(source), Some(destination)) => destination.can_accept(&source.peek_run()),
        _ => false,
    }
}

/// Generate the moves worth trying from `tubes`.
///
/// Moves are ordered by source index, then destination index, so the
/// output is deterministic for a given state.
pub fn legal_moves(tubes: &[Tube]) -> Vec<Move> {
    let in_unicolor_tubes = unicolor_colors(tubes);
    let mut moves = Vec::new();

    for (i, source) in tubes.iter().enumerate() {
        if is_dead_source(source) {
            continue;
        }
        let run = source.peek_run();
        let color = run[0];
        // One set for standard empty tubes, one for extra ones
        let mut poured_into_empty = [ColorSet::default(); 2];

        for (j, destination) in tubes.iter().enumerate() {
            if i == j || !destination.can_accept(&run) {
                continue;
            }
            if destination.is_empty() {
                if in_unicolor_tubes.contains(color) {
                    trace!("pruned {} -> {}: {} already has a unicolor tube", i, j, color);
                    continue;
                }
                if source.is_unicolor() && destination.capacity() <= source.capacity() {
                    trace!("pruned {} -> {}: would only relocate a unicolor tube", i, j);
                    continue;
                }
                let slot = usize::from(destination.capacity() == Tube::EXTRA_CAPACITY);
                let seen = &mut poured_into_empty[slot];
                if seen.contains(color) {
                    continue;
                }
                seen.insert(color);
            }
            moves.push(Move::new(i, j));
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Color::{Blue, Red, Yellow};

    fn state(tubes: &[&[Color]]) -> Vec<Tube> {
        tubes.iter().map(|t| Tube::standard(t).unwrap()).collect()
    }

    fn moves_from(moves: &[Move], source: usize) -> Vec<usize> {
        moves
            .iter()
            .filter(|m| m.source == source)
            .map(|m| m.destination)
            .collect()
    }

    #[test]
    fn test_skips_empty_and_solved_sources() {
        let tubes = state(&[&[Red; 4], &[], &[Blue, Red]]);
        let moves = legal_moves(&tubes);
        assert!(moves_from(&moves, 0).is_empty());
        assert!(moves_from(&moves, 1).is_empty());
        assert_eq!(moves_from(&moves, 2), vec![1]);
    }

    #[test]
    fn test_one_empty_destination_per_color() {
        let tubes = state(&[&[Red, Blue], &[Blue, Red], &[], &[]]);
        let moves = legal_moves(&tubes);
        assert_eq!(moves_from(&moves, 0), vec![2]);
        assert_eq!(moves_from(&moves, 1), vec![2]);
    }

    #[test]
    fn test_unicolor_color_never_poured_into_empty() {
        // Both red tubes can only merge with each other
        let tubes = state(&[&[Red, Red], &[Red, Red], &[], &[]]);
        let moves = legal_moves(&tubes);
        assert_eq!(moves, vec![Move::new(0, 1), Move::new(1, 0)]);

        // A mixed tube topped with a color that has a unicolor home
        let tubes = state(&[&[Yellow, Blue], &[Yellow], &[]]);
        assert_eq!(legal_moves(&tubes), vec![Move::new(0, 1), Move::new(1, 0)]);
    }

    #[test]
    fn test_capacity_and_color_checks() {
        let tubes = state(&[&[Red, Red, Red], &[Red, Blue], &[Blue, Red]]);
        let moves = legal_moves(&tubes);
        // Three reds do not fit above two units
        assert!(moves_from(&moves, 0).is_empty());
        assert_eq!(moves_from(&moves, 1), vec![0]);
        assert!(moves_from(&moves, 2).is_empty());
    }

    #[test]
    fn test_extra_tube_destination() {
        let mut tubes = state(&[&[Red, Blue, Blue, Blue], &[Blue, Red, Red, Red]]);
        tubes.push(Tube::extra(&[]).unwrap());
        let moves = legal_moves(&tubes);
        assert_eq!(moves, vec![Move::new(0, 2), Move::new(1, 2)]);

        // Empty tubes of different capacities are not interchangeable
        let mut tubes = state(&[&[Red, Blue, Blue, Blue], &[], &[]]);
        tubes.push(Tube::extra(&[]).unwrap());
        assert_eq!(legal_moves(&tubes), vec![Move::new(0, 1), Move::new(0, 3)]);
    }

    #[test]
    fn test_extra_tube_unit_moves_to_empty_standard() {
        // The red in the extra tube has no standard home, so it may start one
        let mut tubes = state(&[&[Red, Red, Red, Blue], &[Blue, Blue, Blue], &[]]);
        tubes.push(Tube::extra(&[Red]).unwrap());
        assert_eq!(legal_moves(&tubes), vec![Move::new(0, 2), Move::new(3, 2)]);

        // Once red has a standard home the extra unit may only join it
        let mut tubes = state(&[&[Blue, Blue, Blue], &[Red, Red, Red], &[]]);
        tubes.push(Tube::extra(&[Red]).unwrap());
        assert_eq!(legal_moves(&tubes), vec![Move::new(3, 1)]);
    }

    #[test]
    fn test_extra_tube_unit_never_moves_between_extras() {
        let mut tubes = state(&[&[Blue, Red, Red, Red]]);
        tubes.push(Tube::extra(&[Yellow]).unwrap());
        tubes.push(Tube::extra(&[]).unwrap());
        assert_eq!(legal_moves(&tubes), vec![Move::new(0, 2)]);
    }

    #[test]
    fn test_ordering_is_ascending() {
        let tubes = state(&[&[Blue, Red], &[Blue], &[Blue, Yellow], &[Red]]);
        let moves = legal_moves(&tubes);
        let mut sorted = moves.clone();
        sorted.sort_by_key(|m| (m.source, m.destination));
        assert_eq!(moves, sorted);
        assert_eq!(
            moves,
            vec![
                Move::new(0, 1),
                Move::new(0, 2),
                Move::new(1, 0),
                Move::new(1, 2),
                Move::new(2, 0),
                Move::new(2, 1)
            ]
        );
    }

    #[test]
    fn test_is_legal() {
        let tubes = state(&[&[Red, Blue], &[Red], &[]]);
        assert!(is_legal(&tubes, Move::new(0, 1)));
        assert!(is_legal(&tubes, Move::new(0, 2)));
        assert!(!is_legal(&tubes, Move::new(0, 0)));
        assert!(!is_legal(&tubes, Move::new(2, 0)));
        assert!(!is_legal(&tubes, Move::new(0, 7)));
    }
}
