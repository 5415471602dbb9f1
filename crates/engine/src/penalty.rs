//! The penalty track and its saturating cost schedule

use serde::Serialize;

use crate::tile::{Color, TileCounts, TileGroup, Token};

/// Cumulative cost by number of tokens on the track; saturates at the last
/// entry.
pub const PENALTY_COST: [u8; 8] = [0, 1, 2, 4, 6, 8, 11, 14];

/// Points lost for `len` tokens on the track.
pub fn penalty_cost(len: usize) -> i32 {
    let last = PENALTY_COST.len() - 1;
    PENALTY_COST[len.min(last)] as i32
}

/// Result of settling a track at round end
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Settlement {
    /// Zero or negative
    pub points: i32,
    /// Tiles to return to the discard reservoir; the marker is not among
    /// them
    pub returned: Vec<TileGroup>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PenaltyTrack {
    tokens: Vec<Token>,
}

impl PenaltyTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, group: TileGroup) {
        self.tokens
            .extend(std::iter::repeat(Token::Tile(group.color)).take(group.count as usize));
    }

    pub fn add_marker(&mut self) {
        self.tokens.push(Token::StartMarker);
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn has_marker(&self) -> bool {
        self.tokens.iter().any(|t| t.is_marker())
    }

    /// Points the track would cost if settled now.
    pub fn pending_cost(&self) -> i32 {
        -penalty_cost(self.len())
    }

    /// Colored tiles currently on the track.
    pub fn tiles(&self) -> TileCounts {
        TileCounts::from_colors(self.tokens.iter().filter_map(|t| t.color()))
    }

    /// Score and clear the track. The marker is dropped; it comes back into
    /// play with the next round's overflow pool.
    pub fn settle_and_clear(&mut self) -> Settlement {
        let points = self.pending_cost();
        let returned = self.tiles().groups();
        self.tokens.clear();
        Settlement { points, returned }
    }

    /// Count of tiles of `color` currently held.
    pub fn count_of(&self, color: Color) -> usize {
        self.tokens
            .iter()
            .filter(|t| **t == Token::Tile(color))
            .count()
    }
}
