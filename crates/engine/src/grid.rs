//! The 5x5 scoring grid: write-once cells, no repeated color in any row or
//! column, adjacency scoring.

use serde::Serialize;

use crate::config::WallLayout;
use crate::error::{Result, RuleError};
use crate::tile::{Col, Color, Row, ALL_COLORS, BOARD_SIZE, TILE_COLORS};

/// Printed pattern: WALL_PATTERN[row][col] = color at that position.
/// Only consulted in [`WallLayout::Patterned`].
pub const WALL_PATTERN: [[Color; BOARD_SIZE]; BOARD_SIZE] = [
    [Color::Blue, Color::Yellow, Color::Red, Color::Black, Color::Teal],
    [Color::Teal, Color::Blue, Color::Yellow, Color::Red, Color::Black],
    [Color::Black, Color::Teal, Color::Blue, Color::Yellow, Color::Red],
    [Color::Red, Color::Black, Color::Teal, Color::Blue, Color::Yellow],
    [Color::Yellow, Color::Red, Color::Black, Color::Teal, Color::Blue],
];

/// Destination column lookup: WALL_DEST_COL[row][color_index] => col
pub const WALL_DEST_COL: [[u8; TILE_COLORS]; BOARD_SIZE] = [
    // row 0: Blue=0, Yellow=1, Red=2, Black=3, Teal=4
    [0, 1, 2, 3, 4],
    // row 1: Teal=0, Blue=1, Yellow=2, Red=3, Black=4
    [1, 2, 3, 4, 0],
    // row 2: Black=0, Teal=1, Blue=2, Yellow=3, Red=4
    [2, 3, 4, 0, 1],
    // row 3: Red=0, Black=1, Teal=2, Blue=3, Yellow=4
    [3, 4, 0, 1, 2],
    // row 4: Yellow=0, Red=1, Black=2, Teal=3, Blue=4
    [4, 0, 1, 2, 3],
];

/// Column of `color` in `row` on the printed pattern.
pub fn patterned_column(row: Row, color: Color) -> Col {
    WALL_DEST_COL[row][color.index()] as Col
}

pub type Cells = [[Option<Color>; BOARD_SIZE]; BOARD_SIZE];

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScoringGrid {
    cells: Cells,
}

impl ScoringGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    pub fn cell(&self, row: Row, col: Col) -> Option<Color> {
        self.cells.get(row)?.get(col).copied().flatten()
    }

    /// Out-of-range rows contain nothing.
    pub fn row_contains(&self, row: Row, color: Color) -> bool {
        self.cells
            .get(row)
            .is_some_and(|r| r.contains(&Some(color)))
    }

    pub fn column_contains(&self, col: Col, color: Color) -> bool {
        self.cells.iter().any(|r| r.get(col) == Some(&Some(color)))
    }

    /// Check a placement without performing it.
    pub fn check(&self, color: Color, row: Row, col: Col) -> Result<()> {
        for (what, index) in [("grid row", row), ("grid column", col)] {
            if index >= BOARD_SIZE {
                return Err(RuleError::InvalidIndex {
                    what,
                    index,
                    len: BOARD_SIZE,
                });
            }
        }
        if self.cells[row][col].is_some() {
            return Err(RuleError::CellOccupied { row, col });
        }
        if self.row_contains(row, color) || self.column_contains(col, color) {
            return Err(RuleError::DuplicateInRowOrColumn { color, row, col });
        }
        Ok(())
    }

    /// Occupy (row, col) with `color` and return the points it scores.
    pub fn place(&mut self, color: Color, row: Row, col: Col) -> Result<u32> {
        self.check(color, row, col)?;
        self.cells[row][col] = Some(color);
        Ok(self.score_at(row, col))
    }

    /// Columns of `row` that may legally receive `color` under `layout`.
    pub fn legal_columns(&self, color: Color, row: Row, layout: WallLayout) -> Vec<Col> {
        match layout {
            WallLayout::Free => (0..BOARD_SIZE)
                .filter(|&col| self.check(color, row, col).is_ok())
                .collect(),
            WallLayout::Patterned => {
                let col = patterned_column(row, color);
                if self.check(color, row, col).is_ok() {
                    vec![col]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Points a tile at (row, col) scores, counting the cell as occupied
    /// whether or not it is.
    ///
    /// Runs are measured along each axis through the anchor. With runs on
    /// both axes the anchor counts once per axis (`h + v`); otherwise the
    /// longer run is the score, so an isolated tile scores 1.
    pub fn score_at(&self, row: Row, col: Col) -> u32 {
        let horiz = 1 + self.run(row, col, 0, -1) + self.run(row, col, 0, 1);
        let vert = 1 + self.run(row, col, -1, 0) + self.run(row, col, 1, 0);

        if horiz > 1 && vert > 1 {
            horiz + vert
        } else {
            horiz.max(vert)
        }
    }

    /// Occupied cells stepping away from (row, col) until the first gap.
    fn run(&self, row: Row, col: Col, d_row: isize, d_col: isize) -> u32 {
        let mut count = 0;
        let (mut r, mut c) = (row as isize + d_row, col as isize + d_col);
        while (0..BOARD_SIZE as isize).contains(&r)
            && (0..BOARD_SIZE as isize).contains(&c)
            && self.cells[r as usize][c as usize].is_some()
        {
            count += 1;
            r += d_row;
            c += d_col;
        }
        count
    }

    /// False for out-of-range rows.
    pub fn row_is_complete(&self, row: Row) -> bool {
        self.cells
            .get(row)
            .is_some_and(|r| r.iter().all(Option::is_some))
    }

    pub fn column_is_complete(&self, col: Col) -> bool {
        col < BOARD_SIZE && self.cells.iter().all(|r| r[col].is_some())
    }

    /// Game-end trigger: some row has all five cells filled.
    pub fn has_complete_row(&self) -> bool {
        (0..BOARD_SIZE).any(|row| self.row_is_complete(row))
    }

    pub fn complete_rows(&self) -> usize {
        (0..BOARD_SIZE).filter(|&r| self.row_is_complete(r)).count()
    }

    pub fn complete_columns(&self) -> usize {
        (0..BOARD_SIZE).filter(|&c| self.column_is_complete(c)).count()
    }

    pub fn color_count(&self, color: Color) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == Some(color)).count()
    }

    /// Colors placed in all five rows.
    pub fn complete_colors(&self) -> usize {
        ALL_COLORS
            .iter()
            .filter(|&&color| self.color_count(color) == BOARD_SIZE)
            .count()
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(cells: &[(Row, Col, Color)]) -> ScoringGrid {
        let mut grid = ScoringGrid::new();
        for &(r, c, color) in cells {
            grid.cells[r][c] = Some(color);
        }
        grid
    }

    #[test]
    fn test_isolated_tile_scores_one() {
        let mut grid = ScoringGrid::new();
        assert_eq!(grid.place(Color::Blue, 2, 2).unwrap(), 1);
    }

    #[test]
    fn test_corner_isolated_tile_scores_one() {
        let mut grid = ScoringGrid::new();
        assert_eq!(grid.place(Color::Blue, 0, 0).unwrap(), 1);
    }

    #[test]
    fn test_horizontal_run_of_three() {
        let mut grid = grid_with(&[(2, 1, Color::Blue), (2, 3, Color::Red)]);
        assert_eq!(grid.place(Color::Yellow, 2, 2).unwrap(), 3);
    }

    #[test]
    fn test_vertical_run_of_three() {
        let mut grid = grid_with(&[(1, 2, Color::Blue), (3, 2, Color::Red)]);
        assert_eq!(grid.place(Color::Yellow, 2, 2).unwrap(), 3);
    }

    #[test]
    fn test_both_axes_count_anchor_twice() {
        // h = 3, v = 2 => 5, not 4
        let mut grid = grid_with(&[(2, 1, Color::Blue), (2, 3, Color::Red), (1, 2, Color::Black)]);
        assert_eq!(grid.place(Color::Yellow, 2, 2).unwrap(), 5);
    }

    #[test]
    fn test_cross_scores_six() {
        let mut grid = grid_with(&[
            (2, 1, Color::Blue),
            (2, 3, Color::Red),
            (1, 2, Color::Black),
            (3, 2, Color::Teal),
        ]);
        assert_eq!(grid.place(Color::Yellow, 2, 2).unwrap(), 6);
    }

    #[test]
    fn test_run_reaches_board_edge() {
        let mut grid = grid_with(&[(0, 0, Color::Blue), (0, 1, Color::Yellow), (0, 2, Color::Red)]);
        assert_eq!(grid.place(Color::Black, 0, 3).unwrap(), 4);
        assert_eq!(grid.place(Color::Teal, 0, 4).unwrap(), 5);
        assert!(grid.row_is_complete(0));
    }

    #[test]
    fn test_gap_breaks_run() {
        let mut grid = grid_with(&[(4, 0, Color::Blue), (4, 1, Color::Yellow)]);
        assert_eq!(grid.place(Color::Red, 4, 3).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_in_row_rejected() {
        let mut grid = grid_with(&[(1, 0, Color::Red)]);
        let err = grid.place(Color::Red, 1, 4).unwrap_err();
        assert_eq!(
            err,
            RuleError::DuplicateInRowOrColumn {
                color: Color::Red,
                row: 1,
                col: 4
            }
        );
        assert_eq!(grid.occupied(), 1);
    }

    #[test]
    fn test_duplicate_in_column_rejected() {
        let mut grid = grid_with(&[(3, 2, Color::Teal)]);
        assert!(matches!(
            grid.place(Color::Teal, 0, 2),
            Err(RuleError::DuplicateInRowOrColumn { .. })
        ));
    }

    #[test]
    fn test_cells_are_write_once() {
        let mut grid = grid_with(&[(0, 0, Color::Blue)]);
        assert_eq!(
            grid.place(Color::Red, 0, 0).unwrap_err(),
            RuleError::CellOccupied { row: 0, col: 0 }
        );
        assert_eq!(grid.cell(0, 0), Some(Color::Blue));
    }

    #[test]
    fn test_out_of_range_column() {
        let mut grid = ScoringGrid::new();
        assert!(matches!(
            grid.place(Color::Red, 0, 5),
            Err(RuleError::InvalidIndex { what: "grid column", .. })
        ));
    }

    #[test]
    fn test_queries_outside_the_grid_are_empty() {
        let mut grid = ScoringGrid::new();
        for col in 0..BOARD_SIZE {
            grid.place(WALL_PATTERN[0][col], 0, col).unwrap();
        }

        assert!(!grid.row_contains(BOARD_SIZE, Color::Blue));
        assert!(!grid.column_contains(BOARD_SIZE, Color::Blue));
        assert!(!grid.row_is_complete(BOARD_SIZE));
        assert!(!grid.column_is_complete(BOARD_SIZE));
        assert_eq!(grid.cell(BOARD_SIZE, 0), None);
        assert!(grid.row_is_complete(0));
    }

    #[test]
    fn test_legal_columns_free_layout() {
        let grid = grid_with(&[(0, 1, Color::Red), (2, 3, Color::Blue)]);
        assert_eq!(grid.legal_columns(Color::Blue, 0, WallLayout::Free), vec![0, 2, 4]);
        assert!(grid.legal_columns(Color::Red, 0, WallLayout::Free).is_empty());
    }

    #[test]
    fn test_legal_columns_patterned_layout() {
        let grid = ScoringGrid::new();
        for row in 0..BOARD_SIZE {
            for color in ALL_COLORS {
                let cols = grid.legal_columns(color, row, WallLayout::Patterned);
                assert_eq!(cols, vec![patterned_column(row, color)]);
                assert_eq!(WALL_PATTERN[row][cols[0]], color);
            }
        }
    }

    #[test]
    fn test_full_pattern_completes_everything() {
        let mut grid = ScoringGrid::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                grid.place(WALL_PATTERN[row][col], row, col).unwrap();
            }
        }
        assert_eq!(grid.complete_rows(), 5);
        assert_eq!(grid.complete_columns(), 5);
        assert_eq!(grid.complete_colors(), 5);
    }
}
