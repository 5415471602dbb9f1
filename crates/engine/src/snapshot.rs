//! Read-only, serializable views of engine state for renderers and
//! external persistence.

use serde::Serialize;

use crate::board::{BoardPhase, PlayerBoard};
use crate::config::WallLayout;
use crate::grid::ScoringGrid;
use crate::round::{Phase, RoundEngine};
use crate::staging::StagingRow;
use crate::stock::TileStock;
use crate::tile::{PlayerIdx, TileCounts, Token};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub round: u32,
    pub phase: Phase,
    pub layout: WallLayout,
    pub active_player: PlayerIdx,
    pub next_starter: PlayerIdx,
    pub seating: Vec<PlayerIdx>,
    pub stock: StockSnapshot,
    pub players: Vec<PlayerSnapshot>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StockSnapshot {
    pub supply: TileCounts,
    pub discard: TileCounts,
    pub displays: Vec<TileCounts>,
    pub overflow: TileCounts,
    pub marker_available: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub seat: PlayerIdx,
    pub score: i32,
    pub phase: BoardPhase,
    pub staging: Vec<StagingRow>,
    pub penalty: Vec<Token>,
    /// Points the penalty track would cost if settled now
    pub penalty_cost: i32,
    pub grid: ScoringGrid,
}

impl GameSnapshot {
    pub fn capture(engine: &RoundEngine) -> Self {
        Self {
            round: engine.round(),
            phase: engine.phase(),
            layout: engine.config().wall_layout,
            active_player: engine.active_player(),
            next_starter: engine.next_starter(),
            seating: (0..engine.num_players()).collect(),
            stock: StockSnapshot::capture(engine.stock()),
            players: engine.boards().iter().map(PlayerSnapshot::capture).collect(),
        }
    }
}

impl StockSnapshot {
    pub fn capture(stock: &TileStock) -> Self {
        Self {
            supply: *stock.supply(),
            discard: *stock.discard(),
            displays: stock.displays().iter().map(|d| *d.tiles()).collect(),
            overflow: *stock.overflow().tiles(),
            marker_available: stock.overflow().marker_available(),
        }
    }
}

impl PlayerSnapshot {
    pub fn capture(board: &PlayerBoard) -> Self {
        Self {
            seat: board.seat(),
            score: board.score(),
            phase: board.phase(),
            staging: board.staging().rows().to_vec(),
            penalty: board.penalty().tokens().to_vec(),
            penalty_cost: board.penalty().pending_cost(),
            grid: board.grid().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_snapshot_of_fresh_game() {
        let mut rng = StdRng::seed_from_u64(5);
        let engine = RoundEngine::new(GameConfig::new(3), 1, &mut rng).unwrap();
        let snap = engine.snapshot();

        assert_eq!(snap.round, 1);
        assert_eq!(snap.phase, Phase::RoundInProgress);
        assert_eq!(snap.active_player, 1);
        assert_eq!(snap.seating, vec![0, 1, 2]);
        assert_eq!(snap.stock.displays.len(), 7);
        assert!(snap.stock.displays.iter().all(|d| d.total() == 4));
        assert!(snap.stock.marker_available);
        assert_eq!(snap.stock.supply.total(), 100 - 28);
        assert_eq!(snap.players.len(), 3);
        assert!(snap.players.iter().all(|p| p.score == 0 && p.penalty.is_empty()));
    }
}
