//! Puzzle state model: colors, tubes, runs and moves.
//!
//! Tube contents are always described top-first in the public API: index 0
//! is the unit that pours out first. Internally a tube keeps its units
//! bottom-first so pouring only touches the end of the vector.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Liquid color - one of the 12 colors of the game palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Orange,
    Yellow,
    Gray,
    Teal,
    Blue,
    Pink,
    Brown,
    Purple,
    Lime,
    Emerald,
    Olive,
}

impl Color {
    /// Number of colors in the palette
    pub const COUNT: usize = 12;

    /// All palette colors, ordered by their integer code
    pub const ALL: [Color; Color::COUNT] = [
        Color::Red,
        Color::Orange,
        Color::Yellow,
        Color::Gray,
        Color::Teal,
        Color::Blue,
        Color::Pink,
        Color::Brown,
        Color::Purple,
        Color::Lime,
        Color::Emerald,
        Color::Olive,
    ];

    /// Integer code used by puzzle definitions
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Orange => "orange",
            Color::Yellow => "yellow",
            Color::Gray => "gray",
            Color::Teal => "teal",
            Color::Blue => "blue",
            Color::Pink => "pink",
            Color::Brown => "brown",
            Color::Purple => "purple",
            Color::Lime => "lime",
            Color::Emerald => "emerald",
            Color::Olive => "olive",
        }
    }
}

impl TryFrom<u8> for Color {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Color::ALL
            .get(code as usize)
            .copied()
            .ok_or(Error::InvalidColor { code })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A run of colors poured in one move, ordered top-first
pub type Run = SmallVec<[Color; 4]>;

/// A capacity-bounded stack of colored units
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tube {
    /// Units ordered bottom-first; the top of the tube is the last element
    units: SmallVec<[Color; 4]>,
    capacity: usize,
}

impl Tube {
    /// Capacity of a regular tube, and the fill level of a solved one
    pub const STANDARD_CAPACITY: usize = 4;
    /// Capacity of the scarce extra tube
    pub const EXTRA_CAPACITY: usize = 1;

    /// Create a tube from its colors listed top-first.
    ///
    /// Fails if the capacity is neither 1 nor 4, or if there are more
    /// colors than the capacity allows.
    pub fn new(colors: &[Color], capacity: usize) -> Result<Self> {
        if capacity != Self::STANDARD_CAPACITY && capacity != Self::EXTRA_CAPACITY {
            return Err(Error::InvalidCapacity { capacity });
        }
        if colors.len() > capacity {
            return Err(Error::TooManyColors {
                count: colors.len(),
                capacity,
            });
        }
        Ok(Self {
            units: colors.iter().rev().copied().collect(),
            capacity,
        })
    }

    /// Create a regular tube of capacity 4
    pub fn standard(colors: &[Color]) -> Result<Self> {
        Self::new(colors, Self::STANDARD_CAPACITY)
    }

    /// Create an extra tube of capacity 1
    pub fn extra(colors: &[Color]) -> Result<Self> {
        Self::new(colors, Self::EXTRA_CAPACITY)
    }

    /// An empty extra tube, as added when a level cannot be solved without one
    pub fn empty_extra() -> Self {
        Self {
            units: SmallVec::new(),
            capacity: Self::EXTRA_CAPACITY,
        }
    }

    /// Create a tube from integer color codes listed top-first
    pub fn from_codes(codes: &[u8], capacity: usize) -> Result<Self> {
        let colors = codes
            .iter()
            .map(|&code| Color::try_from(code))
            .collect::<Result<Vec<_>>>()?;
        Self::new(&colors, capacity)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn free_space(&self) -> usize {
        self.capacity - self.units.len()
    }

    /// The color that would pour out first
    pub fn top(&self) -> Option<Color> {
        self.units.last().copied()
    }

    /// Iterate over the colors top-first
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.units.iter().rev().copied()
    }

    /// Number of identical colors at the top of the tube (0 if empty)
    pub fn top_run_length(&self) -> usize {
        let Some(top) = self.top() else {
            return 0;
        };
        self.colors().take_while(|&c| c == top).count()
    }

    /// The top run, without modifying the tube
    pub fn peek_run(&self) -> Run {
        self.colors().take(self.top_run_length()).collect()
    }

    /// Remove and return the top `count` colors, top-first.
    ///
    /// `count` may span several runs; it only has to fit in the tube.
    pub fn pop_run(&mut self, count: usize) -> Result<Run> {
        if count > self.units.len() {
            return Err(Error::CannotPop {
                requested: count,
                available: self.units.len(),
            });
        }
        Ok(self.split_top(count))
    }

    /// Remove and return the whole top run
    pub fn pop_top_run(&mut self) -> Run {
        self.split_top(self.top_run_length())
    }

    fn split_top(&mut self, count: usize) -> Run {
        let split = self.units.len() - count;
        let run = self.units[split..].iter().rev().copied().collect();
        self.units.truncate(split);
        run
    }

    /// Whether `run` can be poured onto this tube.
    ///
    /// The run must be non-empty and single-colored, match the top color
    /// unless the tube is empty, and fit in the remaining space.
    pub fn can_accept(&self, run: &[Color]) -> bool {
        let Some((&color, rest)) = run.split_first() else {
            return false;
        };
        if rest.iter().any(|&c| c != color) {
            return false;
        }
        if self.top().is_some_and(|top| top != color) {
            return false;
        }
        run.len() <= self.free_space()
    }

    /// Pour `run` onto the top of the tube.
    ///
    /// Callers must check [`Tube::can_accept`] first; an unacceptable run
    /// is a contract violation and is rejected without touching the tube.
    pub fn insert_run(&mut self, run: &[Color]) -> Result<()> {
        if !self.can_accept(run) {
            return Err(Error::CannotInsert {
                run: run.iter().copied().collect(),
                tube: self.to_string(),
            });
        }
        self.units.extend(run.iter().rev().copied());
        Ok(())
    }

    /// Empty, or filled to the standard capacity with a single color
    pub fn is_solved(&self) -> bool {
        self.is_empty() || (self.len() == Self::STANDARD_CAPACITY && self.is_unicolor())
    }

    /// Non-empty and holding a single color
    pub fn is_unicolor(&self) -> bool {
        !self.is_empty() && self.top_run_length() == self.len()
    }
}

impl fmt::Display for Tube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, color) in self.colors().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", color)?;
        }
        write!(f, "] ({}/{})", self.len(), self.capacity)
    }
}

/// Whether every tube in the state is solved
pub fn is_solved(tubes: &[Tube]) -> bool {
    tubes.iter().all(Tube::is_solved)
}

/// Pour the top run of tube `source` into tube `destination`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    #[serde(rename = "from")]
    pub source: usize,
    #[serde(rename = "to")]
    pub destination: usize,
}

impl Move {
    pub fn new(source: usize, destination: usize) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// A puzzle as loaded from JSON: tubes of integer color codes, top-first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDefinition {
    pub tubes: Vec<Vec<u8>>,
    /// Whether the last tube is a capacity-1 extra tube
    #[serde(default)]
    pub extra_tube: bool,
}

impl PuzzleDefinition {
    pub fn new(tubes: Vec<Vec<u8>>, extra_tube: bool) -> Self {
        Self { tubes, extra_tube }
    }

    /// Build the initial puzzle state.
    ///
    /// Every tube gets the standard capacity, except the last one when
    /// `extra_tube` is set. Errors name the offending tube.
    pub fn build(&self) -> Result<Vec<Tube>> {
        let last = self.tubes.len().saturating_sub(1);
        self.tubes
            .iter()
            .enumerate()
            .map(|(index, codes)| {
                let capacity = if self.extra_tube && index == last {
                    Tube::EXTRA_CAPACITY
                } else {
                    Tube::STANDARD_CAPACITY
                };
                Tube::from_codes(codes, capacity).map_err(|e| Error::InvalidTube {
                    index,
                    source: Box::new(e),
                })
            })
            .collect()
    }
}
