//! Water Sort puzzle solver library.
//!
//! A level is a row of tubes holding stacks of colored liquid. This crate
//! models the tubes, generates the pours worth trying from any state, and
//! runs a depth-first backtracking search for a move sequence that leaves
//! every tube either empty or full of a single color.

pub mod error;
pub mod moves;
pub mod puzzle;
pub mod replay;
pub mod solver;

// Re-export main types
pub use error::{Error, Result};
pub use moves::{is_legal, legal_moves};
pub use puzzle::{is_solved, Color, Move, PuzzleDefinition, Run, Tube};
pub use replay::{apply_move, parse_moves, replay, verify_solution};
pub use solver::{
    solve, solve_with, solve_with_extra_tube_fallback, Outcome, SolverConfig, SolverResult,
};
