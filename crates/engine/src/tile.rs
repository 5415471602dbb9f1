//! Tile colors, tokens, and the counted bundles that move between containers.

use std::fmt;

use serde::Serialize;

/// Seat index into the player list: 0..num_players-1
pub type PlayerIdx = usize;

/// Row index (0..=4); staging row `r` has capacity `r + 1`
pub type Row = usize;

/// Column index (0..=4)
pub type Col = usize;

pub const BOARD_SIZE: usize = 5;
pub const TILE_COLORS: usize = 5;
pub const DISPLAY_CAPACITY: usize = 4;
pub const DEFAULT_TILES_PER_COLOR: u8 = 20;
pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 4;

/// Tile colors (order fixed for serialization)
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Blue = 0,
    Yellow = 1,
    Red = 2,
    Black = 3,
    Teal = 4,
}

pub const ALL_COLORS: [Color; TILE_COLORS] = [
    Color::Blue,
    Color::Yellow,
    Color::Red,
    Color::Black,
    Color::Teal,
];

impl Color {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Red => "red",
            Color::Black => "black",
            Color::Teal => "teal",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A physical token: a colored tile or the starting-player marker.
///
/// The marker only ever lives on a penalty track; it is never drawn from
/// the supply and never placed on a grid.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(tag = "kind", content = "color", rename_all = "snake_case")]
pub enum Token {
    Tile(Color),
    StartMarker,
}

impl Token {
    pub fn color(self) -> Option<Color> {
        match self {
            Token::Tile(color) => Some(color),
            Token::StartMarker => None,
        }
    }

    pub fn is_marker(self) -> bool {
        matches!(self, Token::StartMarker)
    }
}

/// A bundle of same-colored tiles moved atomically between containers.
///
/// A group with `count == 0` is equivalent to no group at all.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct TileGroup {
    pub color: Color,
    pub count: u8,
}

impl TileGroup {
    pub fn new(color: Color, count: u8) -> Self {
        Self { color, count }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Per-color tile counts. Backs the supply, the discard reservoir and the
/// shared pools.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct TileCounts([u8; TILE_COLORS]);

impl TileCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every color present `n` times.
    pub fn uniform(n: u8) -> Self {
        Self([n; TILE_COLORS])
    }

    pub fn from_colors(colors: impl IntoIterator<Item = Color>) -> Self {
        let mut counts = Self::default();
        for color in colors {
            counts.add(color, 1);
        }
        counts
    }

    #[inline]
    pub fn get(&self, color: Color) -> u8 {
        self.0[color.index()]
    }

    #[inline]
    pub fn contains(&self, color: Color) -> bool {
        self.get(color) > 0
    }

    pub fn add(&mut self, color: Color, n: u8) {
        self.0[color.index()] += n;
    }

    pub fn add_group(&mut self, group: TileGroup) {
        self.add(group.color, group.count);
    }

    pub fn merge(&mut self, other: &TileCounts) {
        for (mine, theirs) in self.0.iter_mut().zip(other.0) {
            *mine += theirs;
        }
    }

    /// Remove and return every tile of `color`.
    pub fn take_all(&mut self, color: Color) -> TileGroup {
        let count = std::mem::take(&mut self.0[color.index()]);
        TileGroup::new(color, count)
    }

    /// Remove one tile of `color`. Returns false if none was present.
    pub fn remove_one(&mut self, color: Color) -> bool {
        let slot = &mut self.0[color.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn total(&self) -> u32 {
        self.0.iter().map(|&n| n as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&n| n == 0)
    }

    /// Colors with a non-zero count, in color order.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        ALL_COLORS.into_iter().filter(|&c| self.contains(c))
    }

    /// Non-empty groups, in color order.
    pub fn groups(&self) -> Vec<TileGroup> {
        self.colors()
            .map(|color| TileGroup::new(color, self.get(color)))
            .collect()
    }
}
