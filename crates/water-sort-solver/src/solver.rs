//! Depth-first backtracking search for a solving move sequence.
//!
//! The search keeps an explicit stack of frames instead of recursing. Each
//! frame owns its own copy of the puzzle state plus the moves still to try
//! from it, so sibling branches never see each other's pours. The first
//! solved state reached is returned; the solution is not necessarily the
//! shortest one.

use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::moves::legal_moves;
use crate::puzzle::{is_solved, Move, Tube};
use crate::replay::apply_move;

/// Optional bounds on the search.
///
/// The search itself always terminates, but can take a long time on large
/// levels. Exceeding a bound stops it with [`Outcome::Aborted`].
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Maximum number of states to visit
    pub max_nodes: Option<usize>,
    /// Maximum time to search
    pub timeout: Option<Duration>,
}

impl SolverConfig {
    /// No bounds at all
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// How the search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A move sequence that solves the puzzle
    Solved(Vec<Move>),
    /// The whole search space was explored without reaching a solved state
    NoSolution,
    /// A bound from [`SolverConfig`] was hit first
    Aborted,
}

/// Result of the solver search
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub outcome: Outcome,
    /// Number of states visited, the initial one included
    pub nodes_explored: usize,
    /// Time elapsed in milliseconds
    pub time_elapsed_ms: u64,
    /// Whether an extra tube had to be appended to find the solution
    pub used_extra_tube: bool,
}

impl Outcome {
    pub fn describe(&self) -> &'static str {
        match self {
            Outcome::Solved(_) => "solved",
            Outcome::NoSolution => "no solution",
            Outcome::Aborted => "aborted",
        }
    }
}

impl SolverResult {
    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, Outcome::Solved(_))
    }

    /// The solving moves, if any
    pub fn moves(&self) -> Option<&[Move]> {
        match &self.outcome {
            Outcome::Solved(moves) => Some(moves),
            _ => None,
        }
    }
}

/// A state on the search stack with the moves left to try from it
#[derive(Debug)]
struct SearchFrame {
    tubes: Vec<Tube>,
    moves: Vec<Move>,
    next: usize,
}

impl SearchFrame {
    fn new(tubes: Vec<Tube>) -> Self {
        let moves = legal_moves(&tubes);
        Self {
            tubes,
            moves,
            next: 0,
        }
    }
}

/// Find a solving move sequence with no bounds on the search
pub fn solve(tubes: &[Tube]) -> SolverResult {
    solve_with(tubes, &SolverConfig::unbounded())
}

/// Find a solving move sequence, giving up once a bound in `config` is hit.
pub fn solve_with(tubes: &[Tube], config: &SolverConfig) -> SolverResult {
    let start_time = Instant::now();
    let deadline = config.timeout.map(|timeout| start_time + timeout);
    debug!("searching {} tubes", tubes.len());

    let finish = |outcome: Outcome, nodes_explored: usize| {
        let result = SolverResult {
            outcome,
            nodes_explored,
            time_elapsed_ms: start_time.elapsed().as_millis() as u64,
            used_extra_tube: false,
        };
        debug!(
            "search finished: {} after {} nodes in {}ms",
            result.outcome.describe(),
            result.nodes_explored,
            result.time_elapsed_ms
        );
        result
    };

    let mut nodes_explored: usize = 1;
    if is_solved(tubes) {
        return finish(Outcome::Solved(Vec::new()), nodes_explored);
    }

    let mut path: Vec<Move> = Vec::new();
    let mut stack = vec![SearchFrame::new(tubes.to_vec())];

    while let Some(frame) = stack.last_mut() {
        // Backtrack once every move from this state has failed
        let Some(&mv) = frame.moves.get(frame.next) else {
            stack.pop();
            path.pop();
            continue;
        };
        frame.next += 1;

        if config.max_nodes.is_some_and(|max| nodes_explored >= max)
            || deadline.is_some_and(|deadline| Instant::now() > deadline)
        {
            debug!("search aborted at depth {}", path.len());
            return finish(Outcome::Aborted, nodes_explored);
        }

        let mut next_tubes = frame.tubes.clone();
        let applied = apply_move(&mut next_tubes, path.len(), mv);
        debug_assert!(applied.is_ok(), "generated move {} is unplayable: {:?}", mv, applied);
        if applied.is_err() {
            continue;
        }
        path.push(mv);
        nodes_explored += 1;

        if is_solved(&next_tubes) {
            return finish(Outcome::Solved(path), nodes_explored);
        }

        let child = SearchFrame::new(next_tubes);
        trace!(
            "depth {}: {} -> {} leaves {} moves",
            path.len(),
            mv.source,
            mv.destination,
            child.moves.len()
        );
        stack.push(child);
    }

    finish(Outcome::NoSolution, nodes_explored)
}

/// Solve, and if the level turns out to be unsolvable, try again with one
/// empty extra tube appended.
///
/// No tube is appended when the last tube already is an extra tube. The
/// extra tube, when used, has index `tubes.len()`. The retry only gets the
/// part of the timeout the first search left over.
pub fn solve_with_extra_tube_fallback(tubes: &[Tube], config: &SolverConfig) -> SolverResult {
    let start_time = Instant::now();
    let first = solve_with(tubes, config);
    let has_extra_tube = tubes
        .last()
        .is_some_and(|tube| tube.capacity() == Tube::EXTRA_CAPACITY);
    if first.outcome != Outcome::NoSolution || has_extra_tube {
        return first;
    }

    debug!("no solution without an extra tube, retrying with one");
    let mut extended = tubes.to_vec();
    extended.push(Tube::empty_extra());
    let retry_config = SolverConfig {
        max_nodes: config
            .max_nodes
            .map(|max| max.saturating_sub(first.nodes_explored)),
        timeout: config
            .timeout
            .map(|timeout| timeout.saturating_sub(start_time.elapsed())),
    };

    let retry = solve_with(&extended, &retry_config);
    SolverResult {
        used_extra_tube: retry.is_solved(),
        nodes_explored: first.nodes_explored + retry.nodes_explored,
        time_elapsed_ms: start_time.elapsed().as_millis() as u64,
        outcome: retry.outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Color::{self, Blue, Red};
    use crate::replay::verify_solution;

    fn state(tubes: &[&[Color]]) -> Vec<Tube> {
        tubes.iter().map(|t| Tube::standard(t).unwrap()).collect()
    }

    #[test]
    fn test_already_solved() {
        let tubes = state(&[&[Red; 4], &[Blue; 4]]);
        let result = solve(&tubes);
        assert_eq!(result.outcome, Outcome::Solved(vec![]));
        assert_eq!(result.nodes_explored, 1);
        assert!(!result.used_extra_tube);
    }

    #[test]
    fn test_solves_two_color_level() {
        let tubes = state(&[&[Red, Blue, Red, Blue], &[Blue, Red, Blue, Red], &[], &[]]);
        let result = solve(&tubes);
        let moves = result.moves().expect("level is solvable");
        assert!(!moves.is_empty());
        assert!(verify_solution(&tubes, moves).unwrap());
    }

    #[test]
    fn test_first_solution_follows_move_order() {
        // Only one useful pour exists, and it comes first
        let tubes = state(&[&[Red, Blue, Blue, Blue], &[Red, Red, Red], &[Blue]]);
        let result = solve(&tubes);
        assert_eq!(
            result.outcome,
            Outcome::Solved(vec![Move::new(0, 1), Move::new(0, 2)])
        );
    }

    #[test]
    fn test_solves_through_filled_extra_tube() {
        // The red in the extra tube has to start the red stack
        let mut tubes = state(&[&[Red, Red, Red, Blue], &[Blue, Blue, Blue], &[]]);
        tubes.push(Tube::extra(&[Red]).unwrap());
        let result = solve(&tubes);
        assert_eq!(
            result.outcome,
            Outcome::Solved(vec![Move::new(0, 2), Move::new(0, 1), Move::new(3, 2)])
        );
        assert!(verify_solution(&tubes, result.moves().unwrap()).unwrap());
    }

    #[test]
    fn test_no_free_space_is_unsolvable() {
        let tubes = state(&[&[Red, Blue, Red, Blue], &[Blue, Red, Blue, Red]]);
        let result = solve(&tubes);
        assert_eq!(result.outcome, Outcome::NoSolution);
        assert!(result.moves().is_none());
    }

    #[test]
    fn test_half_filled_tubes_never_solve() {
        // Two units of a color can never fill a tube
        let tubes = state(&[&[Red, Blue], &[Blue, Red], &[], &[]]);
        let result = solve(&tubes);
        assert_eq!(result.outcome, Outcome::NoSolution);
        assert!(result.nodes_explored > 1);
    }

    #[test]
    fn test_node_limit_aborts() {
        let tubes = state(&[&[Red, Blue, Red, Blue], &[Blue, Red, Blue, Red], &[], &[]]);
        let config = SolverConfig {
            max_nodes: Some(1),
            timeout: None,
        };
        let result = solve_with(&tubes, &config);
        assert_eq!(result.outcome, Outcome::Aborted);
        assert_eq!(result.nodes_explored, 1);
    }

    #[test]
    fn test_extra_tube_fallback() {
        // Without a spare slot the reds and blues are stuck
        let tubes = state(&[&[Red, Blue, Blue, Blue], &[Blue, Red, Red, Red]]);
        assert_eq!(solve(&tubes).outcome, Outcome::NoSolution);

        let result = solve_with_extra_tube_fallback(&tubes, &SolverConfig::default());
        assert!(result.used_extra_tube);
        let moves = result.moves().expect("solvable with an extra tube");
        assert!(moves.iter().any(|m| m.destination == 2));

        let mut extended = tubes.clone();
        extended.push(Tube::empty_extra());
        assert!(verify_solution(&extended, moves).unwrap());
    }

    #[test]
    fn test_fallback_not_used_when_solvable() {
        let tubes = state(&[&[Red, Blue, Blue, Blue], &[Red, Red, Red], &[Blue]]);
        let result = solve_with_extra_tube_fallback(&tubes, &SolverConfig::default());
        assert!(result.is_solved());
        assert!(!result.used_extra_tube);
    }
}
