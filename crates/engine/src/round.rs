//! Turn rotation, round-end transition and game termination

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::board::{Destination, PlayerBoard, RoundCommit};
use crate::bonus::{FinalScoring, NoBonus, StandardBonus};
use crate::config::GameConfig;
use crate::decision::Decider;
use crate::error::{ConfigError, Result, RuleError};
use crate::snapshot::GameSnapshot;
use crate::staging::Accepted;
use crate::stock::{DrawSource, TileStock};
use crate::tile::{Color, PlayerIdx, TileCounts, TileGroup};

/// Game phase / status
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Players drafting
    RoundInProgress,
    /// Pools are empty; boards wait for their commit
    RoundEnd,
    /// Terminal; no more actions
    GameOver,
}

/// A player action: draft tiles of a color from a source to a destination
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Move {
    pub source: DrawSource,
    pub color: Color,
    pub dest: Destination,
}

/// What a single move did
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TurnOutcome {
    pub seat: PlayerIdx,
    pub taken: TileGroup,
    pub marker: bool,
    /// Tiles that landed in a staging row
    pub staged: u8,
    /// Tiles that went to the penalty track (marker not included)
    pub penalized: u8,
    /// The move emptied the last pool
    pub round_over: bool,
}

/// Result of a round-end transition
#[derive(Clone, Debug)]
pub struct RoundReport {
    pub round: u32,
    /// One commit per seat, in seating order
    pub commits: Vec<RoundCommit>,
    pub game_over: bool,
    /// Seat that opens the next round
    pub next_starter: PlayerIdx,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameResult {
    pub scores: Vec<i32>,
    pub rounds: u32,
    /// Seats sharing the top score
    pub winners: Vec<PlayerIdx>,
}

/// Owns the shared tiles and every board; drives drafting and round ends.
#[derive(Clone, Debug)]
pub struct RoundEngine {
    config: GameConfig,
    stock: TileStock,
    boards: Vec<PlayerBoard>,
    /// Whose turn it is while drafting
    active: PlayerIdx,
    /// Who opens the next round; updated by marker claims
    starting_player: PlayerIdx,
    phase: Phase,
    /// Current round, starting at 1
    round: u32,
    finalized: bool,
}

impl RoundEngine {
    /// Set up boards, deal the first round's displays and hand the first
    /// turn to `starting_player`.
    pub fn new(
        config: GameConfig,
        starting_player: PlayerIdx,
        rng: &mut impl Rng,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let num_players = config.num_players as usize;
        if starting_player >= num_players {
            return Err(ConfigError::Invalid(format!(
                "starting player {starting_player} is not one of {num_players} seats"
            )));
        }

        let mut stock = TileStock::new(config.tiles_per_color);
        stock.start_round(config.display_count(), rng);
        let boards = (0..num_players)
            .map(|seat| PlayerBoard::new(seat, config.wall_layout))
            .collect();

        info!(
            event = "game_start",
            players = num_players,
            displays = config.display_count(),
            layout = ?config.wall_layout,
        );

        Ok(Self {
            config,
            stock,
            boards,
            active: starting_player,
            starting_player,
            phase: Phase::RoundInProgress,
            round: 1,
            finalized: false,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn stock(&self) -> &TileStock {
        &self.stock
    }

    pub fn boards(&self) -> &[PlayerBoard] {
        &self.boards
    }

    pub fn board(&self, seat: PlayerIdx) -> Option<&PlayerBoard> {
        self.boards.get(seat)
    }

    pub fn num_players(&self) -> usize {
        self.boards.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn active_player(&self) -> PlayerIdx {
        self.active
    }

    /// Seat that opens the next round as things stand: the marker holder
    /// this round, else the current opener.
    pub fn next_starter(&self) -> PlayerIdx {
        self.stock
            .overflow()
            .claimed_by()
            .unwrap_or(self.starting_player)
    }

    /// Running totals in seating order.
    pub fn scores(&self) -> Vec<i32> {
        self.boards.iter().map(PlayerBoard::score).collect()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase != expected {
            return Err(RuleError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn check_seats(&self, deciders: usize) -> Result<()> {
        if deciders != self.boards.len() {
            return Err(RuleError::SeatMismatch {
                expected: self.boards.len(),
                got: deciders,
            });
        }
        Ok(())
    }

    /// Enumerate all legal moves for the active player
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.phase != Phase::RoundInProgress {
            return Vec::new();
        }
        let board = &self.boards[self.active];
        self.stock
            .legal_draws()
            .into_iter()
            .flat_map(|(source, color)| {
                board
                    .legal_destinations(color)
                    .into_iter()
                    .map(move |dest| Move {
                        source,
                        color,
                        dest,
                    })
            })
            .collect()
    }

    /// Check a move for the active player without applying it.
    pub fn validate_move(&self, mv: Move) -> Result<()> {
        self.expect_phase(Phase::RoundInProgress)?;
        self.stock.available(mv.source, mv.color)?;
        self.boards[self.active].check_destination(mv.color, mv.dest)
    }

    /// Apply a move for the active player. Illegal moves change nothing.
    pub fn apply_move(&mut self, mv: Move) -> Result<TurnOutcome> {
        self.validate_move(mv)?;
        let seat = self.active;

        let draft = self.stock.take(mv.source, mv.color, seat)?;
        let board = &mut self.boards[seat];
        let placed = match mv.dest {
            Destination::Row(row) => board.add_to_staging(draft.group, row)?,
            Destination::Penalty => {
                board.add_to_penalty(draft.group);
                Accepted {
                    accepted: 0,
                    leftover: draft.group.count,
                }
            }
        };
        if draft.marker {
            board.take_marker();
        }

        let round_over = self.stock.round_exhausted();
        debug!(
            event = "move",
            round = self.round,
            seat,
            source = %mv.source,
            color = %mv.color,
            dest = ?mv.dest,
            count = draft.group.count,
            marker = draft.marker,
        );

        self.active = (seat + 1) % self.boards.len();
        if round_over {
            self.phase = Phase::RoundEnd;
        }

        Ok(TurnOutcome {
            seat,
            taken: draft.group,
            marker: draft.marker,
            staged: placed.accepted,
            penalized: placed.leftover,
            round_over,
        })
    }

    /// Ask `decider` for the active player's move, re-asking after each
    /// recoverable rejection, then apply it.
    pub fn play_turn(&mut self, decider: &mut dyn Decider) -> Result<TurnOutcome> {
        self.expect_phase(Phase::RoundInProgress)?;
        let seat = self.active;
        let limit = self.config.max_decision_retries;
        let mut attempts = 0;

        let (source, color, count) = loop {
            let (source, color) = decider
                .choose_draw_source(&self.stock, &self.boards[seat])
                .map_err(|e| RuleError::Aborted(e.to_string()))?;
            match self.stock.available(source, color) {
                Ok(count) => break (source, color, count),
                Err(err) => reject(decider, err, &mut attempts, limit)?,
            }
        };

        let dest = loop {
            let dest = decider
                .choose_destination_row(color, count, &self.boards[seat])
                .map_err(|e| RuleError::Aborted(e.to_string()))?;
            match self.boards[seat].check_destination(color, dest) {
                Ok(()) => break dest,
                Err(err) => reject(decider, err, &mut attempts, limit)?,
            }
        };

        self.apply_move(Move {
            source,
            color,
            dest,
        })
    }

    /// Round-end transition: commit every board, return leftovers to the
    /// discard reservoir, then either end the game or deal the next round.
    ///
    /// `deciders[seat]` answers column questions for that seat. If one
    /// aborts, the engine stays in [`Phase::RoundEnd`] and a later call
    /// picks up where it stopped.
    pub fn finish_round<D: Decider>(
        &mut self,
        deciders: &mut [D],
        rng: &mut impl Rng,
    ) -> Result<RoundReport> {
        self.expect_phase(Phase::RoundEnd)?;
        self.check_seats(deciders.len())?;

        let limit = self.config.max_decision_retries;
        let mut commits = Vec::with_capacity(self.boards.len());
        for (board, decider) in self.boards.iter_mut().zip(deciders.iter_mut()) {
            let commit = board.commit_round(decider, limit)?;
            self.stock.return_to_discard(&commit.discard);
            commits.push(commit);
        }

        self.starting_player = self.next_starter();
        let finished_round = self.round;
        let game_over = self.boards.iter().any(|b| b.grid().has_complete_row());

        if game_over {
            self.end_game();
        } else {
            self.stock.start_round(self.config.display_count(), rng);
            if self.stock.round_exhausted() {
                warn!(event = "supply_exhausted", round = finished_round);
                self.end_game();
            } else {
                self.round += 1;
                self.active = self.starting_player;
                self.phase = Phase::RoundInProgress;
            }
        }

        info!(
            event = "round_end",
            round = finished_round,
            game_over = self.phase == Phase::GameOver,
            next_starter = self.starting_player,
            scores = ?self.scores(),
        );

        Ok(RoundReport {
            round: finished_round,
            commits,
            game_over: self.phase == Phase::GameOver,
            next_starter: self.starting_player,
        })
    }

    fn end_game(&mut self) {
        self.phase = Phase::GameOver;
        for board in &mut self.boards {
            board.end_game();
        }
    }

    /// Apply `scoring` once and return the final scores. Later calls return
    /// the same scores without scoring again.
    pub fn finalize(&mut self, scoring: &dyn FinalScoring) -> Result<Vec<i32>> {
        self.expect_phase(Phase::GameOver)?;
        if !self.finalized {
            for board in &mut self.boards {
                let bonus = scoring.bonus(board.grid());
                board.add_bonus(bonus);
            }
            self.finalized = true;
            info!(event = "game_end", rounds = self.round, scores = ?self.scores());
        }
        Ok(self.scores())
    }

    /// Draft until the pools are empty, then run the round-end transition.
    pub fn play_round<D: Decider>(
        &mut self,
        deciders: &mut [D],
        rng: &mut impl Rng,
    ) -> Result<RoundReport> {
        self.check_seats(deciders.len())?;
        while self.phase == Phase::RoundInProgress {
            let seat = self.active;
            self.play_turn(&mut deciders[seat])?;
        }
        self.finish_round(deciders, rng)
    }

    /// Play to the end and apply the configured end-game scoring.
    pub fn play_game<D: Decider>(
        &mut self,
        deciders: &mut [D],
        rng: &mut impl Rng,
    ) -> Result<GameResult> {
        self.check_seats(deciders.len())?;
        while self.phase != Phase::GameOver {
            self.play_round(deciders, rng)?;
        }

        let scores = if self.config.end_game_bonus {
            self.finalize(&StandardBonus::default())?
        } else {
            self.finalize(&NoBonus)?
        };
        let best = scores.iter().copied().max().unwrap_or_default();
        let winners = scores
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == best)
            .map(|(seat, _)| seat)
            .collect();

        Ok(GameResult {
            scores,
            rounds: self.round,
            winners,
        })
    }

    /// Colored tiles per color across the stock and every board. Constant
    /// for the whole game.
    pub fn tile_census(&self) -> TileCounts {
        let mut total = self.stock.census();
        for board in &self.boards {
            total.merge(&board.census());
        }
        total
    }
}

fn reject(
    decider: &mut dyn Decider,
    err: RuleError,
    attempts: &mut u32,
    limit: u32,
) -> Result<()> {
    if !err.is_recoverable() {
        return Err(err);
    }
    *attempts += 1;
    if *attempts >= limit {
        return Err(RuleError::RetryLimit {
            attempts: *attempts,
        });
    }
    debug!(event = "decision_rejected", %err);
    decider.rejected(&err);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{GreedyDecider, RandomDecider};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn new_engine(players: u8, seed: u64) -> (RoundEngine, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let engine = RoundEngine::new(GameConfig::new(players), 0, &mut rng).unwrap();
        (engine, rng)
    }

    #[test]
    fn test_new_game_creates_valid_state() {
        let (engine, _) = new_engine(2, 42);

        assert_eq!(engine.num_players(), 2);
        assert_eq!(engine.stock().displays().len(), 5);
        assert_eq!(engine.active_player(), 0);
        assert_eq!(engine.phase(), Phase::RoundInProgress);
        assert_eq!(engine.round(), 1);
        assert!(engine.stock().overflow().marker_available());
        assert_eq!(engine.tile_census(), TileCounts::uniform(20));
    }

    #[test]
    fn test_new_game_rejects_bad_starting_player() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = RoundEngine::new(GameConfig::new(3), 3, &mut rng).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_turn_rotation_wraps() {
        let (mut engine, _) = new_engine(3, 42);
        for expected in [0, 1, 2, 0] {
            assert_eq!(engine.active_player(), expected);
            let mv = engine.legal_moves()[0];
            engine.apply_move(mv).unwrap();
        }
    }

    #[test]
    fn test_illegal_move_changes_nothing() {
        let (mut engine, _) = new_engine(2, 42);
        let before = engine.snapshot();

        let mv = Move {
            source: DrawSource::Display(99),
            color: Color::Blue,
            dest: Destination::Penalty,
        };
        assert!(matches!(
            engine.apply_move(mv),
            Err(RuleError::InvalidIndex { .. })
        ));

        let mv = Move {
            source: DrawSource::Overflow,
            color: Color::Blue,
            dest: Destination::Row(0),
        };
        assert!(matches!(
            engine.apply_move(mv),
            Err(RuleError::TileNotAvailable { .. })
        ));

        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_every_legal_move_applies() {
        let (engine, _) = new_engine(2, 3);
        for mv in engine.legal_moves() {
            let mut copy = engine.clone();
            assert!(copy.apply_move(mv).is_ok(), "{mv:?} should be legal");
            assert_eq!(copy.tile_census(), TileCounts::uniform(20));
        }
    }

    #[test]
    fn test_moves_rejected_outside_drafting() {
        let (mut engine, _) = new_engine(2, 42);
        engine.phase = Phase::RoundEnd;

        assert!(engine.legal_moves().is_empty());
        let mv = Move {
            source: DrawSource::Display(0),
            color: Color::Blue,
            dest: Destination::Penalty,
        };
        assert_eq!(
            engine.apply_move(mv).unwrap_err(),
            RuleError::WrongPhase {
                expected: Phase::RoundInProgress,
                actual: Phase::RoundEnd
            }
        );
    }

    #[test]
    fn test_round_ends_when_pools_empty() {
        let (mut engine, mut rng) = new_engine(2, 9);
        let mut deciders = vec![RandomDecider::new(1), RandomDecider::new(2)];

        while engine.phase() == Phase::RoundInProgress {
            let seat = engine.active_player();
            engine.play_turn(&mut deciders[seat]).unwrap();
        }
        assert_eq!(engine.phase(), Phase::RoundEnd);
        assert!(engine.stock().round_exhausted());
        assert_eq!(engine.tile_census(), TileCounts::uniform(20));

        let report = engine.finish_round(&mut deciders, &mut rng).unwrap();
        assert_eq!(report.round, 1);
        assert_eq!(report.commits.len(), 2);
        assert!(!report.game_over);
        assert_eq!(engine.round(), 2);
        assert_eq!(engine.active_player(), report.next_starter);
        assert_eq!(engine.tile_census(), TileCounts::uniform(20));
        assert!(engine.stock().overflow().marker_available());
    }

    #[test]
    fn test_finish_round_requires_round_end() {
        let (mut engine, mut rng) = new_engine(2, 9);
        let mut deciders = vec![GreedyDecider::new(), GreedyDecider::new()];
        assert!(matches!(
            engine.finish_round(&mut deciders, &mut rng),
            Err(RuleError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_decider_count_must_match_seats() {
        let (mut engine, mut rng) = new_engine(3, 9);
        let mut deciders = vec![GreedyDecider::new(), GreedyDecider::new()];
        assert_eq!(
            engine.play_game(&mut deciders, &mut rng).unwrap_err(),
            RuleError::SeatMismatch {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn test_full_game_simulation() {
        let (mut engine, mut rng) = new_engine(2, 12345);
        let mut deciders = vec![RandomDecider::new(1), RandomDecider::new(2)];

        let result = engine.play_game(&mut deciders, &mut rng).unwrap();

        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(result.scores, engine.scores());
        assert!(engine.boards().iter().any(|b| b.grid().has_complete_row()));
        assert!(!result.winners.is_empty());
        assert_eq!(engine.tile_census(), TileCounts::uniform(20));
    }

    #[test]
    fn test_game_ends_when_supply_runs_dry() {
        let mut config = GameConfig::new(2);
        config.tiles_per_color = 1;
        let mut rng = StdRng::seed_from_u64(5);
        let mut engine = RoundEngine::new(config, 0, &mut rng).unwrap();
        let mut deciders = vec![GreedyDecider::new(), GreedyDecider::new()];

        // every tile is placed or stuck in a staging row that can never
        // fill, so nothing is left to deal for round two
        let result = engine.play_game(&mut deciders, &mut rng).unwrap();

        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(result.rounds, 1);
        assert!(engine.stock().round_exhausted());
        assert!(!engine.boards().iter().any(|b| b.grid().has_complete_row()));
        assert_eq!(engine.tile_census(), TileCounts::uniform(1));
    }

    #[test]
    fn test_finalize_applies_bonus_once() {
        let (mut engine, mut rng) = new_engine(2, 77);
        let mut deciders = vec![GreedyDecider::new(), GreedyDecider::new()];
        engine.play_game(&mut deciders, &mut rng).unwrap();

        let before = engine.scores();
        let first = engine.finalize(&StandardBonus::default()).unwrap();
        let second = engine.finalize(&StandardBonus::default()).unwrap();

        // play_game already finalized
        assert_eq!(first, before);
        assert_eq!(second, before);
    }
}
