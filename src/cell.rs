//! Cells, moves and their text encoding.
//!
//! A cell is written as a column letter followed by a 1-based row number,
//! so `(row 2, col 0)` is `A3`. The swap pseudo-move is written `swap`.

use std::fmt;
use std::str::FromStr;

use crate::constants::MAX_SIZE;
use crate::error::HexError;

/// A board coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Mirror the cell across the long diagonal.
    pub const fn transposed(self) -> Self {
        Self {
            row: self.col,
            col: self.row,
        }
    }

    /// Apply a `(row, col)` offset, returning `None` if either coordinate
    /// would leave `[0, size)`.
    pub fn offset(self, (dr, dc): (isize, isize), size: usize) -> Option<Cell> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < size && col < size).then_some(Cell { row, col })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = (b'a' + self.col as u8) as char;
        write!(f, "{letter}{}", self.row + 1)
    }
}

impl FromStr for Cell {
    type Err = HexError;

    /// Parse `"c5"` or `"C5"`. Rows may have several digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || HexError::Parse(s.to_string());

        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(err)?.to_ascii_lowercase();
        if !letter.is_ascii_lowercase() {
            return Err(err());
        }
        let col = (letter as u8 - b'a') as usize;

        let row: usize = chars.as_str().parse().map_err(|_| err())?;
        if row == 0 || row > MAX_SIZE {
            return Err(err());
        }
        Ok(Cell::new(row - 1, col))
    }
}

/// A move: a stone placement or the pie-rule swap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Move {
    Cell(Cell),
    Swap,
}

impl Move {
    pub fn cell(self) -> Option<Cell> {
        match self {
            Move::Cell(c) => Some(c),
            Move::Swap => None,
        }
    }
}

impl From<Cell> for Move {
    fn from(cell: Cell) -> Self {
        Move::Cell(cell)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Cell(c) => write!(f, "{c}"),
            Move::Swap => f.write_str("swap"),
        }
    }
}

impl FromStr for Move {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("swap") {
            return Ok(Move::Swap);
        }
        s.parse().map(Move::Cell)
    }
}

/// Parse a whitespace or comma separated move list such as `"f6 e7 swap"`.
pub fn parse_moves(s: &str) -> Result<Vec<Move>, HexError> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::parse)
        .collect()
}
