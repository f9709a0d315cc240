//! Bridge tracking on top of the board model.
//!
//! Two stones (or a stone and its edge) form a *bridge* when they share two
//! empty carrier cells: if the opponent takes one carrier, the owner takes the
//! other and the stones stay connected. [`BridgeBoard`] keeps a second,
//! *virtual* connectivity per color in which every bridge is already joined,
//! so a simulation can stop as soon as one side is virtually connected.
//!
//! The virtual connectivity stays valid as long as every intrusion into a
//! carrier is answered on the next move. When a player ignores an intrusion
//! into one of its own bridges, connectivity and bridges are rebuilt from the
//! stones on the board.

use std::collections::HashMap;

use tracing::trace;

use crate::board::{Board, Color};
use crate::cell::{Cell, Move};
use crate::constants::BRIDGE_CARRIERS;
use crate::error::HexError;
use crate::union_find::{Element, UnionFind};

#[derive(Clone, Debug)]
pub struct BridgeBoard {
    board: Board,
    /// Real connectivity plus one join per active bridge.
    virtual_groups: [UnionFind; 2],
    /// Carrier -> partner carrier, per color. Both directions are stored.
    pairs: [HashMap<Cell, Cell>; 2],
    last_move: Option<Cell>,
    rng: fastrand::Rng,
}

impl BridgeBoard {
    /// Wrap `board`, detecting every bridge already on it.
    pub fn new(board: Board, rng: fastrand::Rng) -> Self {
        let mut bb = Self {
            board,
            virtual_groups: [UnionFind::new(), UnionFind::new()],
            pairs: [HashMap::new(), HashMap::new()],
            last_move: None,
            rng,
        };
        bb.recompute();
        bb
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    #[inline]
    pub fn to_play(&self) -> Color {
        self.board.to_play()
    }

    /// The carrier that must answer a stone on `cell` to keep one of
    /// `color`'s bridges, if `cell` is such a carrier.
    pub fn bridge_partner(&self, cell: Cell, color: Color) -> Option<Cell> {
        self.pairs[color.index()].get(&cell).copied()
    }

    /// Number of active bridges for `color`.
    pub fn bridge_count(&self, color: Color) -> usize {
        self.pairs[color.index()].len() / 2
    }

    /// The color whose edges are joined, counting bridges as connections.
    pub fn bridge_winner(&self) -> Option<Color> {
        let (start, end) = (self.board.edge_start(), self.board.edge_end());
        Color::ALL
            .into_iter()
            .find(|c| self.virtual_groups[c.index()].same_set(start, end))
    }

    /// Play `mv` and keep the bridge bookkeeping consistent.
    ///
    /// If the previous move took a carrier of one of the mover's bridges,
    /// answering on the partner carrier keeps the virtual connection and
    /// retires the bridge; any other move rebuilds everything from scratch.
    pub fn play(&mut self, mv: Move) -> Result<(), HexError> {
        let color = self.board.to_play();
        self.board.play(mv)?;

        let cell = match mv {
            Move::Cell(cell) => cell,
            Move::Swap => {
                self.recompute();
                self.last_move = None;
                return Ok(());
            }
        };

        let ci = color.index();
        let threatened = self
            .last_move
            .and_then(|last| self.pairs[ci].get(&last).copied());

        match threatened {
            Some(reply) if reply == cell => {
                self.clear_bridge(cell, color);
                self.link_virtual(cell, color);
                self.update_bridges(cell);
            }
            Some(_) => {
                trace!(%cell, %color, "bridge intrusion ignored, recomputing");
                self.recompute();
            }
            None => {
                // Filling one's own carrier turns the bridge into a real link.
                self.clear_bridge(cell, color);
                self.link_virtual(cell, color);
                self.update_bridges(cell);
            }
        }

        self.last_move = Some(cell);
        Ok(())
    }

    fn link_virtual(&mut self, cell: Cell, color: Color) {
        let mut groups = std::mem::take(&mut self.virtual_groups[color.index()]);
        self.board.link_stone(&mut groups, cell, color);
        self.virtual_groups[color.index()] = groups;
    }

    /// Rebuild virtual connectivity and bridges from the board.
    pub fn recompute(&mut self) {
        let n = self.board.size();
        let mut groups = [UnionFind::new(), UnionFind::new()];
        for cell in self.board.cells() {
            if let Some(color) = self.board.get(cell) {
                self.board.link_stone(&mut groups[color.index()], cell, color);
            }
        }
        self.virtual_groups = groups;
        self.pairs = [HashMap::new(), HashMap::new()];

        let mut rows: Vec<usize> = (0..n).collect();
        let mut cols: Vec<usize> = (0..n).collect();
        self.rng.shuffle(&mut rows);
        self.rng.shuffle(&mut cols);
        for &r in &rows {
            for &c in &cols {
                let cell = Cell::new(r, c);
                if self.board.get(cell).is_some() {
                    self.update_bridges(cell);
                }
            }
        }
    }

    /// Register every new bridge formed by the stone on `cell`.
    fn update_bridges(&mut self, cell: Cell) {
        let Some(color) = self.board.get(cell) else {
            return;
        };
        let n = self.board.size();
        let ci = color.index();

        let mut patterns = BRIDGE_CARRIERS;
        self.rng.shuffle(&mut patterns);

        for (target, [d1, d2]) in patterns {
            let (Some(m1), Some(m2)) = (cell.offset(d1, n), cell.offset(d2, n)) else {
                continue;
            };
            let Some(other) = self.bridge_target(cell, target, color) else {
                continue;
            };
            if self.board.get(m1).is_some() || self.board.get(m2).is_some() {
                continue;
            }
            if self.pairs[ci].contains_key(&m1) || self.pairs[ci].contains_key(&m2) {
                continue;
            }
            // Redundant bridges between already connected groups are skipped.
            let idx = self.board.index(cell);
            if self.virtual_groups[ci].join(idx, other) {
                self.set_bridge(m1, m2, color);
            }
        }
    }

    /// Element a bridge from `cell` along `offset` would connect to: an owned
    /// stone, or the edge just beyond the board on `color`'s axis.
    fn bridge_target(&self, cell: Cell, offset: (isize, isize), color: Color) -> Option<Element> {
        let n = self.board.size();
        if let Some(c) = cell.offset(offset, n) {
            return (self.board.get(c) == Some(color)).then(|| self.board.index(c));
        }
        let along = match color {
            Color::White => cell.row as isize + offset.0,
            Color::Black => cell.col as isize + offset.1,
        };
        if along == -1 {
            Some(self.board.edge_start())
        } else if along == n as isize {
            Some(self.board.edge_end())
        } else {
            None
        }
    }

    fn set_bridge(&mut self, m1: Cell, m2: Cell, color: Color) {
        let pairs = &mut self.pairs[color.index()];
        pairs.insert(m1, m2);
        pairs.insert(m2, m1);
    }

    fn clear_bridge(&mut self, cell: Cell, color: Color) {
        let pairs = &mut self.pairs[color.index()];
        if let Some(other) = pairs.remove(&cell) {
            pairs.remove(&other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge_board(size: usize, moves: &[&str]) -> BridgeBoard {
        let mut bb = BridgeBoard::new(Board::new(size), fastrand::Rng::with_seed(7));
        for mv in moves {
            bb.play(mv.parse().unwrap()).unwrap();
        }
        bb
    }

    #[test]
    fn test_bridge_between_two_stones() {
        // White c3 = (2,2) and d4 = (3,3) share carriers (2,3) and (3,2).
        let bb = bridge_board(5, &["c3", "a1", "d4"]);
        assert_eq!(
            bb.bridge_partner(Cell::new(2, 3), Color::White),
            Some(Cell::new(3, 2))
        );
        assert_eq!(
            bb.bridge_partner(Cell::new(3, 2), Color::White),
            Some(Cell::new(2, 3))
        );
        // d4 also bridges to the bottom edge through (4,2) and (4,3).
        assert_eq!(
            bb.bridge_partner(Cell::new(4, 2), Color::White),
            Some(Cell::new(4, 3))
        );
        assert_eq!(bb.bridge_partner(Cell::new(2, 3), Color::Black), None);
    }

    #[test]
    fn test_center_stone_virtually_wins_small_board() {
        let bb = bridge_board(3, &["b2"]);
        assert_eq!(bb.board().winner(), None);
        assert_eq!(bb.bridge_winner(), Some(Color::White));
        assert_eq!(bb.bridge_count(Color::White), 2);
    }

    #[test]
    fn test_answered_intrusion_keeps_connection() {
        // Black takes the top carrier b1, White answers on c1.
        let bb = bridge_board(3, &["b2", "b1", "c1"]);
        assert_eq!(bb.bridge_partner(Cell::new(0, 1), Color::White), None);
        assert_eq!(bb.bridge_partner(Cell::new(0, 2), Color::White), None);
        assert_eq!(bb.bridge_winner(), Some(Color::White));
    }

    #[test]
    fn test_ignored_intrusion_recomputes() {
        // Black takes b1, White plays c3 instead of answering.
        let bb = bridge_board(3, &["b2", "b1", "c3"]);
        assert_eq!(bb.bridge_partner(Cell::new(0, 1), Color::White), None);
        assert_eq!(bb.bridge_partner(Cell::new(0, 2), Color::White), None);
        assert_eq!(bb.bridge_winner(), None);
        assert_eq!(bb.board().winner(), None);
    }

    #[test]
    fn test_carriers_belong_to_one_bridge() {
        let bb = bridge_board(7, &["c3", "a7", "d4", "b7", "e5", "g1"]);
        let pairs = &bb.pairs[Color::White.index()];
        for (a, b) in pairs {
            assert_eq!(pairs.get(b), Some(a));
            assert!(bb.board().get(*a).is_none());
        }
    }

    #[test]
    fn test_swap_rebuilds_bridges() {
        let mut bb = bridge_board(3, &["b2"]);
        bb.play(Move::Swap).unwrap();
        assert_eq!(bb.board().get(Cell::new(1, 1)), Some(Color::Black));
        assert_eq!(bb.bridge_winner(), Some(Color::Black));
        assert_eq!(bb.bridge_count(Color::White), 0);
    }
}
