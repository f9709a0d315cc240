//! Error types for the board model and move parsing.

use thiserror::Error;

use crate::cell::Move;

/// Errors raised by [`Board`](crate::board::Board) operations.
///
/// A failed operation never mutates the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    /// Move into an occupied or off-board cell, or a swap while ineligible.
    #[error("illegal move {mv}: {reason}")]
    IllegalMove { mv: Move, reason: &'static str },

    /// Explicit turn assignment to something other than the two players.
    #[error("invalid turn: only white or black can be set to play")]
    InvalidTurn,

    /// A move string could not be decoded.
    #[error("cannot parse move '{0}'")]
    Parse(String),
}

impl HexError {
    pub(crate) fn illegal(mv: Move, reason: &'static str) -> Self {
        HexError::IllegalMove { mv, reason }
    }
}
