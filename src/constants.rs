//! Board geometry and default search parameters.
//!
//! Offsets are expressed as `(row, col)` deltas on the rhombus. A cell at
//! `(r, c)` touches `(r - 1, c + 1)` and `(r + 1, c - 1)` but not the other
//! diagonal, which gives the six-neighbor hex adjacency on a square array.
//!
//! Search parameters here are only defaults; the engine reads them from a
//! [`SearchConfig`](crate::config::SearchConfig) fixed at construction.

// =============================================================================
// Board Geometry
// =============================================================================

/// Standard competition board size.
pub const DEFAULT_SIZE: usize = 11;

/// Largest supported board; move strings use one letter per column.
pub const MAX_SIZE: usize = 26;

/// Offsets to the six adjacent cells.
pub const NEIGHBOR_PATTERNS: [(isize, isize); 6] =
    [(-1, 0), (0, -1), (-1, 1), (0, 1), (1, 0), (1, -1)];

/// Offsets to the six cells reachable by a bridge (two cells sharing two
/// common empty neighbors).
pub const BRIDGE_PATTERNS: [(isize, isize); 6] =
    [(-1, -1), (1, -2), (2, -1), (1, 1), (-1, 2), (-2, 1)];

/// Bridge offsets paired with the offsets of their two carrier cells.
pub const BRIDGE_CARRIERS: [((isize, isize), [(isize, isize); 2]); 6] = [
    ((-1, -1), [(-1, 0), (0, -1)]),
    ((-2, 1), [(-1, 0), (-1, 1)]),
    ((-1, 2), [(-1, 1), (0, 1)]),
    ((1, 1), [(1, 0), (0, 1)]),
    ((2, -1), [(1, 0), (1, -1)]),
    ((1, -2), [(1, -1), (0, -1)]),
];

// =============================================================================
// MCTS Parameters
// =============================================================================

/// UCT exploration weight.
pub const EXPLORATION: f64 = 0.5;

/// RAVE equivalence constant: real visits after which AMAF stops counting.
pub const RAVE_CONST: f64 = 300.0;

/// Minimum AMAF sample size before GRAVE trusts a node's own statistics.
pub const GRAVE_REF: u32 = 50;
