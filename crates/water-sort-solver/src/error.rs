//! Error types for the Water Sort solver.

use thiserror::Error;

use crate::puzzle::{Move, Run};

/// Main error type for the solver crate.
///
/// Variants fall into two groups: invalid arguments (bad puzzle input,
/// rejected at construction time) and invalid operations (a caller broke
/// the `can_accept` / `pop_run` contract of a [`Tube`](crate::Tube)).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("cannot create tube with capacity {capacity} (expected 1 or 4)")]
    InvalidCapacity { capacity: usize },

    #[error("cannot create tube with {count} colors > capacity {capacity}")]
    TooManyColors { count: usize, capacity: usize },

    #[error("invalid color code {code} (palette holds 12 colors, 0-11)")]
    InvalidColor { code: u8 },

    #[error("invalid tube at index {index}: {source}")]
    InvalidTube {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("move {index} ({mv}) does not name two distinct tubes out of {tubes}")]
    InvalidMove { index: usize, mv: Move, tubes: usize },

    #[error("expected SOURCE>DESTINATION tube indices, got '{token}'")]
    MoveSyntax { token: String },

    #[error("{run:?} cannot be added onto tube {tube}")]
    CannotInsert { run: Run, tube: String },

    #[error("cannot pop {requested} colors from a tube holding {available}")]
    CannotPop { requested: usize, available: usize },

    #[error("move {index} ({mv}) is not legal in the current state")]
    IllegalMove { index: usize, mv: Move },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error reports bad input rather than a broken call contract.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::InvalidCapacity { .. }
                | Error::TooManyColors { .. }
                | Error::InvalidColor { .. }
                | Error::InvalidTube { .. }
                | Error::InvalidMove { .. }
                | Error::MoveSyntax { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert!(Error::InvalidCapacity { capacity: 3 }.is_invalid_argument());
        assert!(Error::InvalidColor { code: 12 }.is_invalid_argument());
        assert!(Error::MoveSyntax {
            token: "0>".to_string()
        }
        .is_invalid_argument());
        assert!(!Error::CannotPop {
            requested: 3,
            available: 1
        }
        .is_invalid_argument());
    }

    #[test]
    fn test_nested_tube_error_message() {
        let err = Error::InvalidTube {
            index: 2,
            source: Box::new(Error::InvalidColor { code: 40 }),
        };
        assert_eq!(
            err.to_string(),
            "invalid tube at index 2: invalid color code 40 (palette holds 12 colors, 0-11)"
        );
    }
}
