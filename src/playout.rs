//! Monte Carlo playouts (random game simulation).
//!
//! A playout fills the board with random stones until one side connects, then
//! reports the winner together with every stone on the final board, which the
//! AMAF statistics are credited from. Hex cannot end in a draw, so every
//! playout terminates with a winner before the board is full.
//!
//! Playouts never play the swap pseudo-move; the swap is only explored as a
//! child in the search tree.

use std::fmt;
use std::str::FromStr;

use crate::board::{Board, Color};
use crate::bridges::BridgeBoard;
use crate::cell::{Cell, Move};
use crate::error::HexError;

/// Move selection during simulation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Rollout {
    /// Uniformly random empty cells.
    #[default]
    Uniform,
    /// Play an immediately winning cell when one exists, otherwise random.
    WinningMove,
    /// Random, but always answer an intrusion into a bridge on its partner
    /// carrier, and stop as soon as one side is connected through bridges.
    Bridges,
}

/// Outcome of one simulation.
#[derive(Clone, Debug)]
pub struct Playout {
    pub winner: Color,
    /// Stones on the final board, indexed by [`Color::index`].
    pub stones: [Vec<Cell>; 2],
}

impl Playout {
    fn from_board(board: &Board, winner: Color) -> Self {
        let mut stones: [Vec<Cell>; 2] = [Vec::new(), Vec::new()];
        for cell in board.cells() {
            if let Some(color) = board.get(cell) {
                stones[color.index()].push(cell);
            }
        }
        Self { winner, stones }
    }

    /// Cells `color` occupied at the end of the simulation.
    pub fn stones_of(&self, color: Color) -> &[Cell] {
        &self.stones[color.index()]
    }
}

impl Rollout {
    /// Simulate from `state` to a finished game.
    pub fn run(self, state: Board, rng: &mut fastrand::Rng) -> Result<Playout, HexError> {
        match self {
            Rollout::Uniform => uniform(state, rng),
            Rollout::WinningMove => winning_move(state, rng),
            Rollout::Bridges => bridges(state, rng),
        }
    }
}

/// Shuffled empty cells; popping from the end yields a uniform random order.
fn shuffled_cells(state: &Board, rng: &mut fastrand::Rng) -> Vec<Cell> {
    let mut cells = state.empty_cells();
    rng.shuffle(&mut cells);
    cells
}

fn finish(state: &Board, winner: Option<Color>) -> Playout {
    match winner {
        Some(w) => Playout::from_board(state, w),
        None => unreachable!("a full hex board always has a winner"),
    }
}

fn uniform(mut state: Board, rng: &mut fastrand::Rng) -> Result<Playout, HexError> {
    let mut moves = shuffled_cells(&state, rng);
    while state.winner().is_none() {
        let Some(cell) = moves.pop() else { break };
        state.play(Move::Cell(cell))?;
    }
    let winner = state.winner();
    Ok(finish(&state, winner))
}

fn winning_move(mut state: Board, rng: &mut fastrand::Rng) -> Result<Playout, HexError> {
    let mut moves = shuffled_cells(&state, rng);
    while state.winner().is_none() {
        let color = state.to_play();
        let cell = match moves.iter().position(|&c| state.would_win(c, color)) {
            Some(i) => moves.swap_remove(i),
            None => match moves.pop() {
                Some(c) => c,
                None => break,
            },
        };
        state.play(Move::Cell(cell))?;
    }
    let winner = state.winner();
    Ok(finish(&state, winner))
}

fn bridges(state: Board, rng: &mut fastrand::Rng) -> Result<Playout, HexError> {
    let mut moves = shuffled_cells(&state, rng);
    let mut bb = BridgeBoard::new(state, fastrand::Rng::with_seed(rng.u64(..)));

    while bb.bridge_winner().is_none() {
        let Some(cell) = moves.pop() else { break };
        let mover = bb.to_play();
        let mut reply = bb.bridge_partner(cell, mover.opponent());
        bb.play(Move::Cell(cell))?;

        // Answer intrusions until the chain of forced replies runs out.
        while let Some(r) = reply {
            if bb.bridge_winner().is_some() || bb.board().get(r).is_some() {
                break;
            }
            if let Some(i) = moves.iter().position(|&c| c == r) {
                moves.swap_remove(i);
            }
            let replier = bb.to_play();
            reply = bb.bridge_partner(r, replier.opponent());
            bb.play(Move::Cell(r))?;
        }
    }

    let winner = bb.bridge_winner();
    Ok(finish(bb.board(), winner))
}

impl fmt::Display for Rollout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rollout::Uniform => f.write_str("uniform"),
            Rollout::WinningMove => f.write_str("winning-move"),
            Rollout::Bridges => f.write_str("bridges"),
        }
    }
}

impl FromStr for Rollout {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" | "random" => Ok(Rollout::Uniform),
            "winning-move" | "decisive" => Ok(Rollout::WinningMove),
            "bridges" | "bridge" => Ok(Rollout::Bridges),
            _ => Err(HexError::Parse(s.to_string())),
        }
    }
}
