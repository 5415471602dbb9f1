//! Per-player board: staging rows, penalty track, scoring grid and the
//! running score. Owns the round-end commit.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::WallLayout;
use crate::decision::Decider;
use crate::error::{Result, RuleError};
use crate::grid::ScoringGrid;
use crate::penalty::PenaltyTrack;
use crate::staging::{Accepted, StagingArea};
use crate::tile::{Col, Color, PlayerIdx, Row, TileCounts, TileGroup, BOARD_SIZE};

/// Where drafted tiles go
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(tag = "kind", content = "row", rename_all = "snake_case")]
pub enum Destination {
    Row(Row),
    /// Straight to the penalty track
    Penalty,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardPhase {
    Drafting,
    Committing,
    GameOver,
}

/// One tile moved from a staging row into the grid
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Placement {
    pub color: Color,
    pub row: Row,
    pub col: Col,
    pub points: u32,
}

/// What a round-end commit did to one board
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RoundCommit {
    pub placements: Vec<Placement>,
    /// Full rows that found no legal column and went to the penalty track
    pub forfeited: Vec<TileGroup>,
    /// Zero or negative
    pub penalty: i32,
    /// Tiles for the shared discard reservoir
    pub discard: Vec<TileGroup>,
}

impl RoundCommit {
    /// Net change to the running score.
    pub fn score_delta(&self) -> i32 {
        self.placements.iter().map(|p| p.points as i32).sum::<i32>() + self.penalty
    }
}

#[derive(Clone, Debug)]
pub struct PlayerBoard {
    seat: PlayerIdx,
    layout: WallLayout,
    staging: StagingArea,
    penalty: PenaltyTrack,
    grid: ScoringGrid,
    score: i32, // may go negative; no floor
    phase: BoardPhase,
}

impl PlayerBoard {
    pub fn new(seat: PlayerIdx, layout: WallLayout) -> Self {
        Self {
            seat,
            layout,
            staging: StagingArea::new(),
            penalty: PenaltyTrack::new(),
            grid: ScoringGrid::new(),
            score: 0,
            phase: BoardPhase::Drafting,
        }
    }

    pub fn seat(&self) -> PlayerIdx {
        self.seat
    }

    pub fn layout(&self) -> WallLayout {
        self.layout
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn penalty(&self) -> &PenaltyTrack {
        &self.penalty
    }

    pub fn grid(&self) -> &ScoringGrid {
        &self.grid
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    /// Validate a destination for `color` without touching the board.
    pub fn check_destination(&self, color: Color, dest: Destination) -> Result<()> {
        if self.phase != BoardPhase::Drafting {
            return Err(RuleError::BoardClosed { seat: self.seat });
        }
        match dest {
            Destination::Penalty => Ok(()),
            Destination::Row(row) => {
                self.staging.row(row)?.check(color)?;
                if self.grid.legal_columns(color, row, self.layout).is_empty() {
                    return Err(RuleError::AlreadyInGridRow { row, color });
                }
                Ok(())
            }
        }
    }

    /// Every destination that accepts `color` right now. Always includes
    /// the penalty track.
    pub fn legal_destinations(&self, color: Color) -> Vec<Destination> {
        (0..BOARD_SIZE)
            .map(Destination::Row)
            .chain(std::iter::once(Destination::Penalty))
            .filter(|&dest| self.check_destination(color, dest).is_ok())
            .collect()
    }

    /// Put drafted tiles into a staging row; whatever does not fit goes to
    /// the penalty track.
    pub fn add_to_staging(&mut self, group: TileGroup, row: Row) -> Result<Accepted> {
        self.check_destination(group.color, Destination::Row(row))?;
        let placed = self.staging.add(row, group)?;
        if placed.leftover > 0 {
            self.penalty.add(TileGroup::new(group.color, placed.leftover));
        }
        debug!(
            event = "stage",
            seat = self.seat,
            row,
            color = %group.color,
            accepted = placed.accepted,
            overflow = placed.leftover,
        );
        Ok(placed)
    }

    pub fn add_to_penalty(&mut self, group: TileGroup) {
        self.penalty.add(group);
    }

    pub fn take_marker(&mut self) {
        self.penalty.add_marker();
    }

    /// Round-end transition.
    ///
    /// Every full staging row sends one tile into the same grid row and its
    /// surplus to the discard list; the penalty track is settled. Columns
    /// come from `decider` in [`WallLayout::Free`], re-asked after each
    /// rejected choice up to `max_retries` times. Rows already moved stay
    /// moved if a later decision aborts; calling again resumes.
    pub fn commit_round(
        &mut self,
        decider: &mut dyn Decider,
        max_retries: u32,
    ) -> Result<RoundCommit> {
        self.phase = BoardPhase::Committing;
        let mut commit = RoundCommit::default();

        for row in 0..BOARD_SIZE {
            let staged = self.staging.row(row)?;
            let Some(color) = staged.color().filter(|_| staged.is_full()) else {
                continue;
            };

            let Some(col) = self.resolve_column(color, row, decider, max_retries)? else {
                let (color, _) = self.staging.flush(row)?;
                let forfeited = TileGroup::new(color, row as u8 + 1);
                warn!(event = "no_legal_column", seat = self.seat, row, %color);
                self.penalty.add(forfeited);
                commit.forfeited.push(forfeited);
                continue;
            };

            let points = self.grid.place(color, row, col)?;
            let (_, surplus) = self.staging.flush(row)?;
            self.score += points as i32;
            if surplus > 0 {
                commit.discard.push(TileGroup::new(color, surplus));
            }
            commit.placements.push(Placement {
                color,
                row,
                col,
                points,
            });
        }

        let settlement = self.penalty.settle_and_clear();
        self.score += settlement.points;
        commit.penalty = settlement.points;
        commit.discard.extend(settlement.returned);

        self.phase = if self.grid.has_complete_row() {
            BoardPhase::GameOver
        } else {
            BoardPhase::Drafting
        };
        debug!(
            event = "commit",
            seat = self.seat,
            delta = commit.score_delta(),
            score = self.score,
        );
        Ok(commit)
    }

    fn resolve_column(
        &self,
        color: Color,
        row: Row,
        decider: &mut dyn Decider,
        max_retries: u32,
    ) -> Result<Option<Col>> {
        let legal = self.grid.legal_columns(color, row, self.layout);
        if legal.is_empty() {
            return Ok(None);
        }
        if self.layout == WallLayout::Patterned {
            return Ok(Some(legal[0]));
        }

        let mut attempts = 0;
        loop {
            let col = decider
                .choose_destination_column(color, row, &self.grid)
                .map_err(|e| RuleError::Aborted(e.to_string()))?;
            match self.grid.check(color, row, col) {
                Ok(()) => return Ok(Some(col)),
                Err(err) if err.is_recoverable() => {
                    attempts += 1;
                    if attempts >= max_retries {
                        return Err(RuleError::RetryLimit { attempts });
                    }
                    decider.rejected(&err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Add end-of-game bonus points.
    pub fn add_bonus(&mut self, points: i32) {
        self.score += points;
    }

    pub(crate) fn end_game(&mut self) {
        self.phase = BoardPhase::GameOver;
    }

    /// Colored tiles held anywhere on this board.
    pub fn census(&self) -> TileCounts {
        let mut total = self.penalty.tiles();
        for group in self.staging.tiles() {
            total.add_group(group);
        }
        for color in self.grid.cells().iter().flatten().flatten() {
            total.add(*color, 1);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{DecisionError, Decider};
    use crate::stock::{DrawSource, TileStock};
    use crate::tile::Token;

    /// Replays a fixed list of column answers.
    struct Columns(Vec<Col>);

    impl Decider for Columns {
        fn choose_draw_source(
            &mut self,
            _: &TileStock,
            _: &PlayerBoard,
        ) -> std::result::Result<(DrawSource, Color), DecisionError> {
            Err(DecisionError::new("not drafting"))
        }

        fn choose_destination_row(
            &mut self,
            _: Color,
            _: u8,
            _: &PlayerBoard,
        ) -> std::result::Result<Destination, DecisionError> {
            Err(DecisionError::new("not drafting"))
        }

        fn choose_destination_column(
            &mut self,
            _: Color,
            _: Row,
            _: &ScoringGrid,
        ) -> std::result::Result<Col, DecisionError> {
            if self.0.is_empty() {
                return Err(DecisionError::new("out of answers"));
            }
            Ok(self.0.remove(0))
        }
    }

    #[test]
    fn test_overflow_routes_to_penalty() {
        let mut board = PlayerBoard::new(0, WallLayout::Free);
        let placed = board.add_to_staging(TileGroup::new(Color::Red, 5), 2).unwrap();

        assert_eq!(placed.accepted, 3);
        assert_eq!(placed.leftover, 2);
        assert!(board.staging().row(2).unwrap().is_full());
        assert_eq!(board.penalty().count_of(Color::Red), 2);
    }

    #[test]
    fn test_incompatible_row_leaves_board_unchanged() {
        let mut board = PlayerBoard::new(0, WallLayout::Free);
        board.add_to_staging(TileGroup::new(Color::Blue, 1), 3).unwrap();

        let err = board.add_to_staging(TileGroup::new(Color::Red, 2), 3).unwrap_err();
        assert!(matches!(err, RuleError::IncompatibleType { .. }));
        assert_eq!(board.staging().row(3).unwrap().used_spaces(), 1);
        assert!(board.penalty().is_empty());
    }

    #[test]
    fn test_color_already_in_grid_row_rejected() {
        let mut board = PlayerBoard::new(0, WallLayout::Free);
        board.grid.place(Color::Teal, 1, 3).unwrap();

        let err = board.add_to_staging(TileGroup::new(Color::Teal, 1), 1).unwrap_err();
        assert_eq!(err, RuleError::AlreadyInGridRow { row: 1, color: Color::Teal });
        assert!(!board.legal_destinations(Color::Teal).contains(&Destination::Row(1)));
        assert!(board.legal_destinations(Color::Teal).contains(&Destination::Penalty));
    }

    #[test]
    fn test_commit_with_nothing_to_do() {
        let mut board = PlayerBoard::new(0, WallLayout::Free);
        let commit = board.commit_round(&mut Columns(vec![]), 8).unwrap();

        assert_eq!(board.score(), 0);
        assert!(commit.discard.is_empty());
        assert!(commit.placements.is_empty());
        assert_eq!(board.phase(), BoardPhase::Drafting);
    }

    #[test]
    fn test_commit_places_full_rows_and_settles_penalty() {
        let mut board = PlayerBoard::new(0, WallLayout::Free);
        board.add_to_staging(TileGroup::new(Color::Red, 5), 2).unwrap();
        board.add_to_staging(TileGroup::new(Color::Blue, 1), 1).unwrap();
        board.take_marker();

        let commit = board.commit_round(&mut Columns(vec![4]), 8).unwrap();

        assert_eq!(
            commit.placements,
            vec![Placement {
                color: Color::Red,
                row: 2,
                col: 4,
                points: 1
            }]
        );
        // two red overflow + marker
        assert_eq!(commit.penalty, -4);
        assert_eq!(board.score(), -3);
        assert_eq!(
            commit.discard,
            vec![TileGroup::new(Color::Red, 2), TileGroup::new(Color::Red, 2)]
        );
        // partial row 1 is kept for next round
        assert_eq!(board.staging().row(1).unwrap().used_spaces(), 1);
        assert!(board.penalty().is_empty());
        assert_eq!(board.grid().cell(2, 4), Some(Color::Red));
    }

    #[test]
    fn test_commit_reasks_after_duplicate_column() {
        let mut board = PlayerBoard::new(0, WallLayout::Free);
        board.grid.place(Color::Yellow, 3, 0).unwrap();
        board.add_to_staging(TileGroup::new(Color::Yellow, 1), 0).unwrap();

        let commit = board.commit_round(&mut Columns(vec![0, 1]), 8).unwrap();
        assert_eq!(commit.placements[0].col, 1);
        assert_eq!(board.grid().cell(0, 1), Some(Color::Yellow));
    }

    #[test]
    fn test_commit_retry_limit() {
        let mut board = PlayerBoard::new(0, WallLayout::Free);
        board.grid.place(Color::Yellow, 3, 0).unwrap();
        board.add_to_staging(TileGroup::new(Color::Yellow, 1), 0).unwrap();

        let err = board.commit_round(&mut Columns(vec![0, 0, 0]), 3).unwrap_err();
        assert_eq!(err, RuleError::RetryLimit { attempts: 3 });
        assert!(board.staging().row(0).unwrap().is_full());
    }

    #[test]
    fn test_full_row_without_legal_column_is_forfeited() {
        let mut board = PlayerBoard::new(0, WallLayout::Free);
        let colors = [Color::Blue, Color::Yellow, Color::Black, Color::Teal];
        for (i, color) in colors.into_iter().enumerate() {
            board.grid.place(color, 1, i + 1).unwrap();
        }
        board.add_to_staging(TileGroup::new(Color::Red, 1), 0).unwrap();
        board.add_to_staging(TileGroup::new(Color::Red, 2), 1).unwrap();

        // red in column 0 leaves row 1 nowhere to go
        let commit = board.commit_round(&mut Columns(vec![0]), 8).unwrap();

        assert_eq!(commit.placements.len(), 1);
        assert_eq!(board.grid().cell(0, 0), Some(Color::Red));
        assert_eq!(commit.forfeited, vec![TileGroup::new(Color::Red, 2)]);
        assert_eq!(commit.penalty, -2);
        assert_eq!(board.score(), -1);
        assert_eq!(board.staging().row(1).unwrap().used_spaces(), 0);
        assert!(board.penalty().is_empty());
        assert!(commit.discard.iter().all(|g| g.color == Color::Red));
        assert_eq!(commit.discard.iter().map(|g| g.count).sum::<u8>(), 2);
    }

    #[test]
    fn test_patterned_commit_needs_no_decision() {
        let mut board = PlayerBoard::new(0, WallLayout::Patterned);
        board.add_to_staging(TileGroup::new(Color::Black, 4), 3).unwrap();

        let commit = board.commit_round(&mut Columns(vec![]), 1).unwrap();
        assert_eq!(commit.placements[0].col, 1);
        assert_eq!(commit.discard, vec![TileGroup::new(Color::Black, 3)]);
    }

    #[test]
    fn test_completed_row_ends_game_for_board() {
        let mut board = PlayerBoard::new(0, WallLayout::Free);
        let colors = [Color::Blue, Color::Yellow, Color::Red, Color::Black];
        for (col, color) in colors.into_iter().enumerate() {
            board.grid.place(color, 0, col).unwrap();
        }
        board.add_to_staging(TileGroup::new(Color::Teal, 1), 0).unwrap();

        let commit = board.commit_round(&mut Columns(vec![4]), 8).unwrap();
        assert_eq!(commit.placements[0].points, 5);
        assert!(board.grid().row_is_complete(0));
        assert_eq!(board.phase(), BoardPhase::GameOver);

        let err = board.add_to_staging(TileGroup::new(Color::Red, 1), 1).unwrap_err();
        assert_eq!(err, RuleError::BoardClosed { seat: 0 });
    }

    #[test]
    fn test_score_may_go_negative() {
        let mut board = PlayerBoard::new(0, WallLayout::Free);
        board.add_to_penalty(TileGroup::new(Color::Red, 9));
        board.take_marker();

        board.commit_round(&mut Columns(vec![]), 1).unwrap();
        assert_eq!(board.score(), -14);
        assert!(!board.penalty().tokens().contains(&Token::StartMarker));
    }
}
