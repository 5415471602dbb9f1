//! Tile-drafting rule engine
//!
//! Scoring and round progression for an Azul-style drafting game. Players
//! draft tiles from shared display pools and an overflow pool into
//! capacity-limited staging rows; at round end full rows commit into a
//! permanent 5x5 grid that scores by adjacency, and the penalty track is
//! settled.
//!
//! The engine performs no I/O. Every choice a player makes goes through a
//! [`Decider`], called synchronously and re-invoked after recoverable
//! rule errors.
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use tiledraft_engine::{GameConfig, GreedyDecider, RoundEngine};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut engine = RoundEngine::new(GameConfig::new(2), 0, &mut rng).unwrap();
//! let mut bots = vec![GreedyDecider::new(), GreedyDecider::new()];
//! let result = engine.play_game(&mut bots, &mut rng).unwrap();
//! assert_eq!(result.scores.len(), 2);
//! ```

pub mod board;
pub mod bonus;
pub mod config;
pub mod decision;
pub mod error;
pub mod grid;
pub mod penalty;
pub mod round;
pub mod snapshot;
pub mod staging;
pub mod stock;
pub mod tile;

pub use board::{BoardPhase, Destination, Placement, PlayerBoard, RoundCommit};
pub use bonus::{FinalScoring, NoBonus, StandardBonus};
pub use config::{GameConfig, WallLayout};
pub use decision::{Decider, Decision, DecisionError, GreedyDecider, RandomDecider};
pub use error::{ConfigError, Result, RuleError};
pub use grid::{ScoringGrid, WALL_PATTERN};
pub use penalty::{penalty_cost, PenaltyTrack, Settlement, PENALTY_COST};
pub use round::{GameResult, Move, Phase, RoundEngine, RoundReport, TurnOutcome};
pub use snapshot::{GameSnapshot, PlayerSnapshot, StockSnapshot};
pub use staging::{Accepted, StagingArea, StagingRow};
pub use stock::{DisplayPool, DrawSource, Draft, OverflowPool, TileStock};
pub use tile::{
    Col, Color, PlayerIdx, Row, TileCounts, TileGroup, Token, ALL_COLORS, BOARD_SIZE,
    DEFAULT_TILES_PER_COLOR, DISPLAY_CAPACITY, MAX_PLAYERS, MIN_PLAYERS, TILE_COLORS,
};
