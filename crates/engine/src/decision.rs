//! Decision API: the one injected choice point per move.
//!
//! The engine never prompts. Whatever picks tiles, rows and columns
//! (console, UI or bot) implements [`Decider`]; the engine calls it
//! synchronously and calls again after a recoverable rejection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::board::{Destination, PlayerBoard};
use crate::config::WallLayout;
use crate::error::RuleError;
use crate::grid::ScoringGrid;
use crate::stock::{DrawSource, TileStock};
use crate::tile::{Col, Color, Row};

/// Returned by a decider to abort the game
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct DecisionError {
    reason: String,
}

impl DecisionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub type Decision<T> = Result<T, DecisionError>;

/// Anything that can make a player's choices: human prompt or bot policy.
pub trait Decider {
    /// Pick a pool and a color present in it.
    fn choose_draw_source(
        &mut self,
        stock: &TileStock,
        board: &PlayerBoard,
    ) -> Decision<(DrawSource, Color)>;

    /// Pick where `count` drafted tiles of `color` go.
    fn choose_destination_row(
        &mut self,
        color: Color,
        count: u8,
        board: &PlayerBoard,
    ) -> Decision<Destination>;

    /// Pick the grid column for a committed tile (free layout only).
    fn choose_destination_column(
        &mut self,
        color: Color,
        row: Row,
        grid: &ScoringGrid,
    ) -> Decision<Col>;

    /// The previous choice was illegal; the same question follows.
    fn rejected(&mut self, _error: &RuleError) {}
}

impl<D: Decider + ?Sized> Decider for Box<D> {
    fn choose_draw_source(
        &mut self,
        stock: &TileStock,
        board: &PlayerBoard,
    ) -> Decision<(DrawSource, Color)> {
        (**self).choose_draw_source(stock, board)
    }

    fn choose_destination_row(
        &mut self,
        color: Color,
        count: u8,
        board: &PlayerBoard,
    ) -> Decision<Destination> {
        (**self).choose_destination_row(color, count, board)
    }

    fn choose_destination_column(
        &mut self,
        color: Color,
        row: Row,
        grid: &ScoringGrid,
    ) -> Decision<Col> {
        (**self).choose_destination_column(color, row, grid)
    }

    fn rejected(&mut self, error: &RuleError) {
        (**self).rejected(error)
    }
}

/// Uniform among legal choices; prefers any staging row over the penalty
/// track so games keep progressing.
#[derive(Clone, Debug)]
pub struct RandomDecider {
    rng: StdRng,
}

impl RandomDecider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick<T: Copy>(&mut self, options: &[T], what: &str) -> Decision<T> {
        if options.is_empty() {
            return Err(DecisionError::new(format!("no legal {what}")));
        }
        let idx = self.rng.random_range(0..options.len());
        Ok(options[idx])
    }
}

impl Decider for RandomDecider {
    fn choose_draw_source(
        &mut self,
        stock: &TileStock,
        _board: &PlayerBoard,
    ) -> Decision<(DrawSource, Color)> {
        self.pick(&stock.legal_draws(), "draw")
    }

    fn choose_destination_row(
        &mut self,
        color: Color,
        _count: u8,
        board: &PlayerBoard,
    ) -> Decision<Destination> {
        let legal = board.legal_destinations(color);
        let rows: Vec<Destination> = legal
            .iter()
            .copied()
            .filter(|d| matches!(d, Destination::Row(_)))
            .collect();
        if rows.is_empty() {
            self.pick(&legal, "destination")
        } else {
            self.pick(&rows, "destination")
        }
    }

    fn choose_destination_column(
        &mut self,
        color: Color,
        row: Row,
        grid: &ScoringGrid,
    ) -> Decision<Col> {
        self.pick(&grid.legal_columns(color, row, WallLayout::Free), "column")
    }
}

/// One-ply heuristic: fill as many staging spaces as possible while
/// spilling as little as possible, and take the column with the best
/// immediate adjacency score.
#[derive(Clone, Debug, Default)]
pub struct GreedyDecider;

impl GreedyDecider {
    pub fn new() -> Self {
        Self
    }

    /// Best destination for `count` tiles of `color`, with its value.
    fn best_destination(color: Color, count: u8, board: &PlayerBoard) -> (Destination, i32) {
        let mut best = (Destination::Penalty, -(count as i32));
        for dest in board.legal_destinations(color) {
            let Destination::Row(row) = dest else {
                continue;
            };
            let Ok(staged) = board.staging().row(row) else {
                continue;
            };
            let fits = count.min(staged.free_spaces()) as i32;
            let spill = count as i32 - fits;
            let completes = fits > 0 && fits == staged.free_spaces() as i32;
            // completing a row is worth a little extra, spilling costs double
            let value = fits + completes as i32 - 2 * spill;
            if value > best.1 {
                best = (dest, value);
            }
        }
        best
    }
}

impl Decider for GreedyDecider {
    fn choose_draw_source(
        &mut self,
        stock: &TileStock,
        board: &PlayerBoard,
    ) -> Decision<(DrawSource, Color)> {
        let mut best: Option<((DrawSource, Color), i32)> = None;
        for (source, color) in stock.legal_draws() {
            let Ok(count) = stock.available(source, color) else {
                continue;
            };
            let mut value = Self::best_destination(color, count, board).1;
            if source == DrawSource::Overflow && stock.overflow().marker_available() {
                value -= 1;
            }
            match best {
                Some((_, v)) if value <= v => {}
                _ => best = Some(((source, color), value)),
            }
        }
        best.map(|(choice, _)| choice)
            .ok_or_else(|| DecisionError::new("no legal draw"))
    }

    fn choose_destination_row(
        &mut self,
        color: Color,
        count: u8,
        board: &PlayerBoard,
    ) -> Decision<Destination> {
        Ok(Self::best_destination(color, count, board).0)
    }

    fn choose_destination_column(
        &mut self,
        color: Color,
        row: Row,
        grid: &ScoringGrid,
    ) -> Decision<Col> {
        grid.legal_columns(color, row, WallLayout::Free)
            .into_iter()
            .max_by_key(|&col| (grid.score_at(row, col), std::cmp::Reverse(col)))
            .ok_or_else(|| DecisionError::new("no legal column"))
    }
}
