//! Staging rows: five single-color holding rows of capacity 1..=5

use serde::Serialize;

use crate::error::{Result, RuleError};
use crate::tile::{Color, Row, TileGroup, BOARD_SIZE};

/// Outcome of adding a group to a row
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Accepted {
    /// Tiles that went into the row
    pub accepted: u8,
    /// Tiles that did not fit; the caller routes them elsewhere
    pub leftover: u8,
}

/// A single staging row
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StagingRow {
    row: Row,
    color: Option<Color>, // None => empty
    count: u8,
}

impl StagingRow {
    pub fn new(row: Row) -> Self {
        debug_assert!(row < BOARD_SIZE);
        Self {
            row,
            color: None,
            count: 0,
        }
    }

    pub fn index(&self) -> Row {
        self.row
    }

    pub fn capacity(&self) -> u8 {
        self.row as u8 + 1
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn used_spaces(&self) -> u8 {
        self.count
    }

    pub fn free_spaces(&self) -> u8 {
        self.capacity() - self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.free_spaces() == 0
    }

    /// Check `color` against the row's held color without touching the row.
    pub fn check(&self, color: Color) -> Result<()> {
        match self.color {
            Some(held) if held != color => Err(RuleError::IncompatibleType {
                row: self.row,
                held,
                offered: color,
            }),
            _ => Ok(()),
        }
    }

    /// Accept as much of `group` as fits; report the rest as leftover.
    pub fn add(&mut self, group: TileGroup) -> Result<Accepted> {
        self.check(group.color)?;
        if group.is_empty() {
            return Ok(Accepted::default());
        }

        let accepted = group.count.min(self.free_spaces());
        if accepted > 0 {
            self.color = Some(group.color);
            self.count += accepted;
        }
        Ok(Accepted {
            accepted,
            leftover: group.count - accepted,
        })
    }

    /// Empty a full row. Returns its color and the surplus count
    /// (capacity - 1); the remaining tile goes to the grid.
    pub fn flush(&mut self) -> Result<(Color, u8)> {
        match self.color {
            Some(color) if self.is_full() => {
                let surplus = self.count - 1;
                self.color = None;
                self.count = 0;
                Ok((color, surplus))
            }
            _ => Err(RuleError::RowNotFull { row: self.row }),
        }
    }
}

/// All five staging rows of one board
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StagingArea {
    rows: [StagingRow; BOARD_SIZE],
}

impl Default for StagingArea {
    fn default() -> Self {
        Self {
            rows: std::array::from_fn(StagingRow::new),
        }
    }
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self, row: Row) -> Result<&StagingRow> {
        self.rows.get(row).ok_or(RuleError::InvalidIndex {
            what: "staging row",
            index: row,
            len: BOARD_SIZE,
        })
    }

    pub fn row_mut(&mut self, row: Row) -> Result<&mut StagingRow> {
        self.rows.get_mut(row).ok_or(RuleError::InvalidIndex {
            what: "staging row",
            index: row,
            len: BOARD_SIZE,
        })
    }

    pub fn add(&mut self, row: Row, group: TileGroup) -> Result<Accepted> {
        self.row_mut(row)?.add(group)
    }

    pub fn flush(&mut self, row: Row) -> Result<(Color, u8)> {
        self.row_mut(row)?.flush()
    }

    pub fn rows(&self) -> &[StagingRow; BOARD_SIZE] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &StagingRow> {
        self.rows.iter()
    }

    /// Tiles held per color across all rows.
    pub fn tiles(&self) -> impl Iterator<Item = TileGroup> + '_ {
        self.rows
            .iter()
            .filter_map(|r| r.color.map(|color| TileGroup::new(color, r.count)))
    }
}
