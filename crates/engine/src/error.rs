//! Error types for the rule engine

use thiserror::Error;

use crate::round::Phase;
use crate::stock::DrawSource;
use crate::tile::{Col, Color, PlayerIdx, Row};

/// Rule violations and engine failures.
///
/// Recoverable variants leave every structure untouched and ask for a new
/// decision; see [`RuleError::is_recoverable`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    /// The chosen color is not present in the chosen pool
    #[error("no {color} tiles available in {pool}")]
    TileNotAvailable { pool: DrawSource, color: Color },

    /// The staging row already holds a different color
    #[error("staging row {row} holds {held}, cannot add {offered}")]
    IncompatibleType { row: Row, held: Color, offered: Color },

    /// No empty cell of the matching grid row can take this color
    #[error("grid row {row} has no legal cell left for {color}")]
    AlreadyInGridRow { row: Row, color: Color },

    /// Flush attempted on a staging row that still has free space
    #[error("staging row {row} is not full")]
    RowNotFull { row: Row },

    /// Color already present in the target grid row or column
    #[error("{color} already appears in grid row {row} or column {col}")]
    DuplicateInRowOrColumn { color: Color, row: Row, col: Col },

    /// Grid cells are write-once
    #[error("grid cell ({row}, {col}) is already occupied")]
    CellOccupied { row: Row, col: Col },

    /// Supply plus discard hold fewer tiles than requested
    #[error("requested {requested} tiles but only {available} remain")]
    InsufficientSupply { requested: usize, available: usize },

    /// Index outside of the valid range for the addressed structure
    #[error("{what} index {index} out of range (len {len})")]
    InvalidIndex {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// The board stopped taking tiles (committing or game over)
    #[error("board {seat} is not accepting tiles")]
    BoardClosed { seat: PlayerIdx },

    /// Operation not permitted in the current phase
    #[error("operation requires phase {expected:?}, engine is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },

    /// One decider per seat is required
    #[error("expected {expected} deciders, got {got}")]
    SeatMismatch { expected: usize, got: usize },

    /// The decision function gave up
    #[error("decision aborted: {0}")]
    Aborted(String),

    /// The decision function kept supplying illegal choices
    #[error("gave up after {attempts} rejected decisions")]
    RetryLimit { attempts: u32 },
}

impl RuleError {
    /// True for errors that should be answered by re-prompting the decider.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RuleError::TileNotAvailable { .. }
                | RuleError::IncompatibleType { .. }
                | RuleError::AlreadyInGridRow { .. }
                | RuleError::DuplicateInRowOrColumn { .. }
                | RuleError::CellOccupied { .. }
                | RuleError::InvalidIndex { .. }
        )
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, RuleError>;

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
