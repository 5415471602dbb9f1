//! Tile supply, per-round display pools and the shared overflow pool

use std::fmt;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, RuleError};
use crate::tile::{Color, PlayerIdx, TileCounts, TileGroup, ALL_COLORS, DISPLAY_CAPACITY};

/// Where a draft takes its tiles from
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum DrawSource {
    Display(usize),
    Overflow,
}

impl fmt::Display for DrawSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawSource::Display(i) => write!(f, "display {i}"),
            DrawSource::Overflow => f.write_str("the overflow pool"),
        }
    }
}

/// Tiles handed to a player by a single pick
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Draft {
    pub group: TileGroup,
    /// The pick also claimed the starting marker
    pub marker: bool,
}

/// A display pool: up to four tiles dealt at round start. Emptied for the
/// rest of the round by the first pick.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DisplayPool {
    tiles: TileCounts,
}

impl DisplayPool {
    pub fn from_colors(colors: impl IntoIterator<Item = Color>) -> Self {
        Self {
            tiles: TileCounts::from_colors(colors),
        }
    }

    pub fn tiles(&self) -> &TileCounts {
        &self.tiles
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Yields every tile of `color` plus the remainder, leaving the pool empty.
    fn take(&mut self, color: Color) -> (TileGroup, TileCounts) {
        let group = self.tiles.take_all(color);
        (group, std::mem::take(&mut self.tiles))
    }
}

/// The shared "middle": leftovers from display picks plus the one-shot
/// starting marker.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OverflowPool {
    tiles: TileCounts,
    claimed_by: Option<PlayerIdx>,
}

impl Default for OverflowPool {
    fn default() -> Self {
        Self {
            tiles: TileCounts::new(),
            claimed_by: None,
        }
    }
}

impl OverflowPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tiles(&self) -> &TileCounts {
        &self.tiles
    }

    /// Empty of tiles; the marker does not count.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// True until the first pick of the round.
    pub fn marker_available(&self) -> bool {
        self.claimed_by.is_none()
    }

    /// Seat that claimed the marker this round, if any.
    pub fn claimed_by(&self) -> Option<PlayerIdx> {
        self.claimed_by
    }

    fn take(&mut self, color: Color, seat: PlayerIdx) -> Draft {
        let group = self.tiles.take_all(color);
        let marker = self.marker_available();
        if marker {
            self.claimed_by = Some(seat);
        }
        Draft { group, marker }
    }
}

/// All tiles not on a player board: supply, discard reservoir and the
/// round's shared pools.
#[derive(Clone, Debug)]
pub struct TileStock {
    supply: TileCounts,
    discard: TileCounts,
    displays: Vec<DisplayPool>,
    overflow: OverflowPool,
}

impl TileStock {
    pub fn new(tiles_per_color: u8) -> Self {
        Self {
            supply: TileCounts::uniform(tiles_per_color),
            discard: TileCounts::new(),
            displays: Vec::new(),
            overflow: OverflowPool::new(),
        }
    }

    /// Build a stock from explicit supply and discard contents.
    pub fn with_contents(supply: TileCounts, discard: TileCounts) -> Self {
        Self {
            supply,
            discard,
            displays: Vec::new(),
            overflow: OverflowPool::new(),
        }
    }

    pub fn supply(&self) -> &TileCounts {
        &self.supply
    }

    pub fn discard(&self) -> &TileCounts {
        &self.discard
    }

    pub fn displays(&self) -> &[DisplayPool] {
        &self.displays
    }

    pub fn overflow(&self) -> &OverflowPool {
        &self.overflow
    }

    /// Draw `n` tiles at random without replacement.
    ///
    /// When the live supply is short the discard reservoir is poured back
    /// in first. Fails, without drawing anything, if supply and discard
    /// together still hold fewer than `n` tiles.
    pub fn try_draw(&mut self, n: usize, rng: &mut impl Rng) -> Result<Vec<Color>> {
        if (self.supply.total() as usize) < n {
            self.replenish();
        }
        let available = self.supply.total() as usize;
        if available < n {
            return Err(RuleError::InsufficientSupply {
                requested: n,
                available,
            });
        }
        Ok(self.draw_from_supply(n, rng))
    }

    /// Like [`TileStock::try_draw`] but degrades to a partial draw when the
    /// tiles run out.
    pub fn draw(&mut self, n: usize, rng: &mut impl Rng) -> Vec<Color> {
        match self.try_draw(n, rng) {
            Ok(tiles) => tiles,
            Err(err) => {
                warn!(event = "partial_draw", %err);
                let available = self.supply.total() as usize;
                self.draw_from_supply(available, rng)
            }
        }
    }

    fn replenish(&mut self) {
        if self.discard.is_empty() {
            return;
        }
        debug!(
            event = "replenish_supply",
            supply = self.supply.total(),
            discard = self.discard.total(),
        );
        let discard = std::mem::take(&mut self.discard);
        self.supply.merge(&discard);
    }

    fn draw_from_supply(&mut self, n: usize, rng: &mut impl Rng) -> Vec<Color> {
        let mut drawn = Vec::with_capacity(n);
        for _ in 0..n {
            let total = self.supply.total();
            if total == 0 {
                break;
            }
            let mut pick = rng.random_range(0..total);
            for color in ALL_COLORS {
                let count = self.supply.get(color) as u32;
                if pick < count {
                    self.supply.remove_one(color);
                    drawn.push(color);
                    break;
                }
                pick -= count;
            }
        }
        drawn
    }

    /// Deal `k` fresh display pools of up to four tiles each.
    pub fn refill_displays(&mut self, k: usize, rng: &mut impl Rng) {
        let mut displays = Vec::with_capacity(k);
        for _ in 0..k {
            displays.push(DisplayPool::from_colors(self.draw(DISPLAY_CAPACITY, rng)));
        }
        self.displays = displays;
    }

    /// Empty the overflow pool and put the marker back in play.
    pub fn reset_overflow(&mut self) {
        self.overflow = OverflowPool::new();
    }

    /// Set up the shared pools for a new round.
    pub fn start_round(&mut self, displays: usize, rng: &mut impl Rng) {
        self.reset_overflow();
        self.refill_displays(displays, rng);
    }

    /// Number of `color` tiles a pick from `source` would yield.
    pub fn available(&self, source: DrawSource, color: Color) -> Result<u8> {
        let tiles = match source {
            DrawSource::Display(i) => {
                self.displays
                    .get(i)
                    .ok_or(RuleError::InvalidIndex {
                        what: "display",
                        index: i,
                        len: self.displays.len(),
                    })?
                    .tiles()
            }
            DrawSource::Overflow => self.overflow.tiles(),
        };
        match tiles.get(color) {
            0 => Err(RuleError::TileNotAvailable {
                pool: source,
                color,
            }),
            n => Ok(n),
        }
    }

    /// Pick every `color` tile from `source` on behalf of `seat`.
    ///
    /// A display pick sends the rest of the display to the overflow pool.
    /// The first overflow pick of the round also claims the marker. On
    /// error nothing moves.
    pub fn take(&mut self, source: DrawSource, color: Color, seat: PlayerIdx) -> Result<Draft> {
        self.available(source, color)?;
        let draft = match source {
            DrawSource::Display(i) => {
                let (group, rest) = self.displays[i].take(color);
                self.overflow.tiles.merge(&rest);
                Draft {
                    group,
                    marker: false,
                }
            }
            DrawSource::Overflow => self.overflow.take(color, seat),
        };
        Ok(draft)
    }

    /// Every (source, color) pair a player may pick right now.
    pub fn legal_draws(&self) -> Vec<(DrawSource, Color)> {
        let displays = self.displays.iter().enumerate().flat_map(|(i, display)| {
            display
                .tiles()
                .colors()
                .map(move |color| (DrawSource::Display(i), color))
        });
        let overflow = self
            .overflow
            .tiles()
            .colors()
            .map(|color| (DrawSource::Overflow, color));
        displays.chain(overflow).collect()
    }

    /// True once all displays and the overflow pool are out of tiles.
    pub fn round_exhausted(&self) -> bool {
        self.displays.iter().all(DisplayPool::is_empty) && self.overflow.is_empty()
    }

    pub fn return_to_discard(&mut self, groups: &[TileGroup]) {
        for &group in groups {
            self.discard.add_group(group);
        }
    }

    /// Tiles held by the stock in every container, per color.
    pub fn census(&self) -> TileCounts {
        let mut total = self.supply;
        total.merge(&self.discard);
        for display in &self.displays {
            total.merge(display.tiles());
        }
        total.merge(self.overflow.tiles());
        total
    }
}
