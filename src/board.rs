//! Hex board model.
//!
//! The board is an `n x n` rhombus stored row-major. White moves first and
//! connects row 0 to row `n - 1`; Black connects column 0 to column `n - 1`.
//! Each color owns a [`UnionFind`] in which every stone is joined to its
//! same-colored neighbors and to the synthetic edge elements of the edges it
//! touches, so the winner is known as soon as both edge elements meet.

use std::fmt;

use crate::cell::{Cell, Move};
use crate::constants::{BRIDGE_PATTERNS, MAX_SIZE, NEIGHBOR_PATTERNS};
use crate::error::HexError;
use crate::union_find::{Element, UnionFind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// Coordinate measured along this color's connection axis.
    #[inline]
    pub fn axis(self, cell: Cell) -> usize {
        match self {
            Color::White => cell.row,
            Color::Black => cell.col,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Color>>,
    to_play: Color,
    /// Stones placed per color, indexed by [`Color::index`].
    played: [usize; 2],
    groups: [UnionFind; 2],
}

impl Board {
    /// Create an empty board with White to play.
    ///
    /// # Panics
    /// If `size` is zero or larger than [`MAX_SIZE`].
    pub fn new(size: usize) -> Self {
        assert!(
            (1..=MAX_SIZE).contains(&size),
            "board size must be between 1 and {MAX_SIZE}, got {size}"
        );
        let groups = std::array::from_fn(|_| Self::empty_groups(size));
        Self {
            size,
            cells: vec![None; size * size],
            to_play: Color::White,
            played: [0; 2],
            groups,
        }
    }

    fn empty_groups(size: usize) -> UnionFind {
        let mut uf = UnionFind::with_capacity(size * size + 2);
        uf.set_ignored_elements(&[size * size, size * size + 1]);
        uf
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn to_play(&self) -> Color {
        self.to_play
    }

    /// Force the side to move. `None` is rejected.
    pub fn set_turn(&mut self, turn: Option<Color>) -> Result<(), HexError> {
        self.to_play = turn.ok_or(HexError::InvalidTurn)?;
        Ok(())
    }

    /// Element standing for the first edge of either color.
    #[inline]
    pub fn edge_start(&self) -> Element {
        self.size * self.size
    }

    /// Element standing for the second edge of either color.
    #[inline]
    pub fn edge_end(&self) -> Element {
        self.size * self.size + 1
    }

    #[inline]
    pub fn index(&self, cell: Cell) -> Element {
        cell.row * self.size + cell.col
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.size && cell.col < self.size
    }

    /// Stone at `cell`; off-board cells read as empty.
    #[inline]
    pub fn get(&self, cell: Cell) -> Option<Color> {
        if !self.contains(cell) {
            return None;
        }
        self.cells[self.index(cell)]
    }

    /// Number of stones `color` has placed.
    pub fn stones(&self, color: Color) -> usize {
        self.played[color.index()]
    }

    /// Total number of stones on the board.
    pub fn num_played(&self) -> usize {
        self.played[0] + self.played[1]
    }

    /// Swap is available only as Black's reply to White's single opening stone.
    pub fn can_swap(&self) -> bool {
        self.played == [1, 0] && self.to_play == Color::Black
    }

    /// Play a move for the side to move.
    ///
    /// # Errors
    /// [`HexError::IllegalMove`] for an occupied or off-board cell and for a
    /// swap outside its window. The board is left untouched on error.
    pub fn play(&mut self, mv: Move) -> Result<(), HexError> {
        match mv {
            Move::Cell(cell) => {
                if !self.contains(cell) {
                    return Err(HexError::illegal(mv, "cell is off the board"));
                }
                if self.get(cell).is_some() {
                    return Err(HexError::illegal(mv, "cell is occupied"));
                }
                let color = self.to_play;
                let idx = self.index(cell);
                self.cells[idx] = Some(color);
                self.played[color.index()] += 1;

                let mut groups = std::mem::take(&mut self.groups[color.index()]);
                self.link_stone(&mut groups, cell, color);
                self.groups[color.index()] = groups;
            }
            Move::Swap => {
                if !self.can_swap() {
                    return Err(HexError::illegal(mv, "swap is only allowed as the second move"));
                }
                self.swap();
            }
        }
        self.to_play = self.to_play.opponent();
        Ok(())
    }

    /// Transpose every stone and hand it to the other color.
    fn swap(&mut self) {
        let n = self.size;
        let mut cells = vec![None; n * n];
        for (idx, stone) in self.cells.iter().enumerate() {
            if let Some(color) = stone {
                let cell = Cell::new(idx / n, idx % n).transposed();
                cells[self.index(cell)] = Some(color.opponent());
            }
        }
        self.cells = cells;
        self.played.swap(0, 1);
        self.recompute_connectivity();
    }

    /// Join a `color` stone at `cell` to its edges and same-colored
    /// neighbors in `groups`.
    pub(crate) fn link_stone(&self, groups: &mut UnionFind, cell: Cell, color: Color) {
        let idx = self.index(cell);
        groups.find(idx);
        let axis = color.axis(cell);
        if axis == 0 {
            groups.join(self.edge_start(), idx);
        }
        if axis == self.size - 1 {
            groups.join(self.edge_end(), idx);
        }
        for n in self.neighbors(cell) {
            if self.get(n) == Some(color) {
                groups.join(self.index(n), idx);
            }
        }
    }

    /// Rebuild both colors' connectivity from the stones on the board.
    pub fn recompute_connectivity(&mut self) {
        let mut groups: [UnionFind; 2] = std::array::from_fn(|_| Self::empty_groups(self.size));
        for cell in self.cells() {
            if let Some(color) = self.get(cell) {
                self.link_stone(&mut groups[color.index()], cell, color);
            }
        }
        self.groups = groups;
    }

    /// Whether `color` playing the empty `cell` would complete a winning chain.
    ///
    /// Read-only: no stone is placed and the connectivity is not touched.
    pub fn would_win(&self, cell: Cell, color: Color) -> bool {
        if !self.contains(cell) || self.get(cell).is_some() {
            return false;
        }
        let groups = &self.groups[color.index()];
        let axis = color.axis(cell);
        let mut touches_start = axis == 0;
        let mut touches_end = axis == self.size - 1;

        for n in self.neighbors(cell) {
            if self.get(n) != Some(color) {
                continue;
            }
            let idx = self.index(n);
            touches_start |= groups.same_set(idx, self.edge_start());
            touches_end |= groups.same_set(idx, self.edge_end());
        }
        touches_start && touches_end
    }

    /// The color that has joined its two edges, if any.
    pub fn winner(&self) -> Option<Color> {
        Color::ALL.into_iter().find(|c| {
            self.groups[c.index()].same_set(self.edge_start(), self.edge_end())
        })
    }

    /// Every cell of the board in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let n = self.size;
        (0..n * n).map(move |i| Cell::new(i / n, i % n))
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Cell> {
        self.cells().filter(|&c| self.get(c).is_none()).collect()
    }

    /// All legal moves: empty cells, then the swap when it is available.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves: Vec<Move> = self.empty_cells().into_iter().map(Move::Cell).collect();
        if self.can_swap() {
            moves.push(Move::Swap);
        }
        moves
    }

    /// Adjacent cells on the board.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + use<> {
        let size = self.size;
        NEIGHBOR_PATTERNS
            .into_iter()
            .filter_map(move |d| cell.offset(d, size))
    }

    /// Cells one bridge away on the board.
    pub fn bridge_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + use<> {
        let size = self.size;
        BRIDGE_PATTERNS
            .into_iter()
            .filter_map(move |d| cell.offset(d, size))
    }

    /// Connected groups of `color`'s stones, for diagnostics.
    pub fn groups(&self, color: Color) -> Vec<Vec<Cell>> {
        let n = self.size;
        let mut groups: Vec<Vec<Cell>> = self.groups[color.index()]
            .groups()
            .into_values()
            .filter(|g| !g.is_empty())
            .map(|g| g.into_iter().map(|i| Cell::new(i / n, i % n)).collect())
            .collect();
        for g in &mut groups {
            g.sort();
        }
        groups.sort();
        groups
    }
}

/// Whether the second player should swap after the opening `cell`.
///
/// Openings near the obtuse corners and anywhere away from the rim are
/// strong enough to take over; acute-corner and most edge openings are not.
pub fn should_swap(cell: Cell, size: usize) -> bool {
    let (r, c) = (cell.row, cell.col);
    if r >= size || c >= size || size < 3 {
        return false;
    }
    let from_bottom = size - 1 - r;
    let from_right = size - 1 - c;

    let inner_rows = r >= 3 && from_bottom >= 3;
    let third_row = (r == 2 || from_bottom == 2) && c >= 1 && from_right >= 1;
    let obtuse_top = r <= 1 && from_right <= r;
    let obtuse_bottom = from_bottom <= 1 && c <= from_bottom;

    inner_rows || third_row || obtuse_top || obtuse_bottom
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    ")?;
        for col in 0..self.size {
            write!(f, "{} ", (b'a' + col as u8) as char)?;
        }
        writeln!(f)?;
        for row in 0..self.size {
            write!(f, "{:>2} {}", row + 1, " ".repeat(row))?;
            for col in 0..self.size {
                let ch = match self.get(Cell::new(row, col)) {
                    Some(Color::White) => 'W',
                    Some(Color::Black) => 'B',
                    None => '.',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Move {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(5);
        assert_eq!(board.empty_cells().len(), 25);
        assert_eq!(board.to_play(), Color::White);
        assert_eq!(board.winner(), None);
        assert!(!board.can_swap());
    }

    #[test]
    fn test_play_alternates_and_counts() {
        let mut board = Board::new(5);
        board.play(cell("a1")).unwrap();
        board.play(cell("b2")).unwrap();
        board.play(cell("c3")).unwrap();
        assert_eq!(board.stones(Color::White), 2);
        assert_eq!(board.stones(Color::Black), 1);
        assert_eq!(board.to_play(), Color::Black);
        assert_eq!(board.get(Cell::new(1, 1)), Some(Color::Black));
    }

    #[test]
    fn test_occupied_cell_is_rejected_without_mutation() {
        let mut board = Board::new(5);
        board.play(cell("c3")).unwrap();
        let err = board.play(cell("c3")).unwrap_err();
        assert!(matches!(err, HexError::IllegalMove { .. }));
        assert_eq!(board.to_play(), Color::Black);
        assert_eq!(board.num_played(), 1);
    }

    #[test]
    fn test_off_board_cell_is_rejected() {
        let mut board = Board::new(5);
        assert!(board.play(cell("f1")).is_err());
        assert!(board.play(Move::Cell(Cell::new(5, 0))).is_err());
    }

    #[test]
    fn test_neighbors_clip_at_corners() {
        let board = Board::new(5);
        let acute: Vec<_> = board.neighbors(Cell::new(0, 0)).collect();
        assert_eq!(acute.len(), 2);
        let obtuse: Vec<_> = board.neighbors(Cell::new(0, 4)).collect();
        assert_eq!(obtuse.len(), 3);
        assert_eq!(board.neighbors(Cell::new(2, 2)).count(), 6);
        assert_eq!(board.bridge_neighbors(Cell::new(2, 2)).count(), 6);
        assert_eq!(board.bridge_neighbors(Cell::new(0, 0)).count(), 1);
    }

    #[test]
    fn test_white_wins_top_to_bottom() {
        let mut board = Board::new(3);
        // White fills column a, Black plays elsewhere.
        for (w, b) in [("a1", "c1"), ("a2", "c2")] {
            board.play(cell(w)).unwrap();
            board.play(cell(b)).unwrap();
        }
        assert_eq!(board.winner(), None);
        board.play(cell("a3")).unwrap();
        assert_eq!(board.winner(), Some(Color::White));
    }

    #[test]
    fn test_would_win_does_not_mutate() {
        let mut board = Board::new(3);
        board.play(cell("a1")).unwrap();
        board.play(cell("c1")).unwrap();
        board.play(cell("a2")).unwrap();
        board.play(cell("c2")).unwrap();
        let before = board.to_string();
        assert!(board.would_win(Cell::new(2, 0), Color::White));
        assert!(board.would_win(Cell::new(2, 0), Color::White));
        assert!(!board.would_win(Cell::new(2, 0), Color::Black));
        assert_eq!(board.to_string(), before);
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_swap_transposes_and_recolors() {
        let mut board = Board::new(5);
        board.play(cell("b1")).unwrap();
        assert!(board.can_swap());
        assert!(board.legal_moves().contains(&Move::Swap));
        board.play(Move::Swap).unwrap();
        assert_eq!(board.get(Cell::new(0, 1)), None);
        assert_eq!(board.get(Cell::new(1, 0)), Some(Color::Black));
        assert_eq!(board.stones(Color::White), 0);
        assert_eq!(board.stones(Color::Black), 1);
        assert_eq!(board.to_play(), Color::White);
        assert!(!board.can_swap());
        assert!(board.play(Move::Swap).is_err());
    }

    #[test]
    fn test_swap_not_allowed_on_empty_board() {
        let mut board = Board::new(5);
        let err = board.play(Move::Swap).unwrap_err();
        assert!(matches!(err, HexError::IllegalMove { mv: Move::Swap, .. }));
    }

    #[test]
    fn test_set_turn_rejects_none() {
        let mut board = Board::new(5);
        assert_eq!(board.set_turn(None), Err(HexError::InvalidTurn));
        board.set_turn(Some(Color::Black)).unwrap();
        assert_eq!(board.to_play(), Color::Black);
        // Black holding a single stone is not a swap window.
        assert!(!board.can_swap());
    }

    #[test]
    fn test_groups_enumerate_connected_stones() {
        let mut board = Board::new(5);
        board.play(cell("c3")).unwrap();
        assert_eq!(board.groups(Color::White), vec![vec![Cell::new(2, 2)]]);
        assert!(board.groups(Color::Black).is_empty());

        let mut board = Board::new(5);
        for mv in ["a1", "e5", "b1", "e4", "d3", "e3"] {
            board.play(cell(mv)).unwrap();
        }
        let white = board.groups(Color::White);
        assert_eq!(white.len(), 2);
        assert!(white.contains(&vec![Cell::new(0, 0), Cell::new(0, 1)]));
        let black = board.groups(Color::Black);
        assert_eq!(black, vec![vec![Cell::new(2, 4), Cell::new(3, 4), Cell::new(4, 4)]]);
    }

    #[test]
    fn test_should_swap_matches_competition_table() {
        // Rows of the 11x11 opening table, 1 = swap.
        let table = [
            "00000000001",
            "00000000011",
            "01111111110",
            "11111111111",
            "11111111111",
            "11111111111",
            "11111111111",
            "11111111111",
            "01111111110",
            "11000000000",
            "10000000000",
        ];
        for (r, line) in table.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                assert_eq!(
                    should_swap(Cell::new(r, c), 11),
                    ch == '1',
                    "mismatch at ({r}, {c})"
                );
            }
        }
    }

    #[test]
    fn test_display_marks_stones() {
        let mut board = Board::new(3);
        board.play(cell("a1")).unwrap();
        board.play(cell("c3")).unwrap();
        let s = board.to_string();
        assert!(s.contains('W'));
        assert!(s.contains('B'));
        assert_eq!(s.lines().count(), 4);
    }
}
