//! End-of-game bonus scoring

use crate::grid::ScoringGrid;

/// Points granted once per board when the game ends.
pub trait FinalScoring {
    fn bonus(&self, grid: &ScoringGrid) -> i32;
}

/// Running totals are final.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoBonus;

impl FinalScoring for NoBonus {
    fn bonus(&self, _grid: &ScoringGrid) -> i32 {
        0
    }
}

/// +2 per complete row, +7 per complete column, +10 per color placed in
/// all five rows.
#[derive(Copy, Clone, Debug)]
pub struct StandardBonus {
    pub per_row: i32,
    pub per_column: i32,
    pub per_color: i32,
}

impl Default for StandardBonus {
    fn default() -> Self {
        Self {
            per_row: 2,
            per_column: 7,
            per_color: 10,
        }
    }
}

impl FinalScoring for StandardBonus {
    fn bonus(&self, grid: &ScoringGrid) -> i32 {
        grid.complete_rows() as i32 * self.per_row
            + grid.complete_columns() as i32 * self.per_column
            + grid.complete_colors() as i32 * self.per_color
    }
}
