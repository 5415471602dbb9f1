//! Game configuration.
//!
//! Loaded from TOML or built in code; every field has a default so a file
//! only needs to name what it changes:
//!
//! ```
//! use tiledraft_engine::{GameConfig, WallLayout};
//!
//! let config = GameConfig::from_toml_str(r#"
//!     num_players = 3
//!     wall_layout = "patterned"
//!     end_game_bonus = true
//! "#).unwrap();
//!
//! assert_eq!(config.num_players, 3);
//! assert_eq!(config.wall_layout, WallLayout::Patterned);
//! assert_eq!(config.display_count(), 7);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tile::{DEFAULT_TILES_PER_COLOR, MAX_PLAYERS, MIN_PLAYERS};

/// How the destination column of a committed tile is found.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallLayout {
    /// The owner chooses any column that keeps rows and columns free of
    /// duplicate colors.
    #[default]
    Free,
    /// Each color has one fixed cell per row, following the printed
    /// Latin-square pattern.
    Patterned,
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Number of seats (2..=4)
    pub num_players: u8,

    /// Tiles of each color in the supply at game start
    pub tiles_per_color: u8,

    /// Display pools per round; derived from the player count when unset
    pub display_count: Option<usize>,

    pub wall_layout: WallLayout,

    /// Apply row/column/color bonuses once the game ends
    pub end_game_bonus: bool,

    /// Rejected decisions tolerated per choice before giving up
    pub max_decision_retries: u32,

    /// Seed for the tile draws; callers pick one when unset
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 2,
            tiles_per_color: DEFAULT_TILES_PER_COLOR,
            display_count: None,
            wall_layout: WallLayout::Free,
            end_game_bonus: false,
            max_decision_retries: 64,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn new(num_players: u8) -> Self {
        Self {
            num_players,
            ..Self::default()
        }
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file can't be read, contains invalid TOML, or
    /// fails [`GameConfig::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.num_players) {
            return Err(ConfigError::Invalid(format!(
                "num_players must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {}",
                self.num_players
            )));
        }
        if self.tiles_per_color == 0 {
            return Err(ConfigError::Invalid(
                "tiles_per_color must be positive".to_string(),
            ));
        }
        if self.display_count == Some(0) {
            return Err(ConfigError::Invalid(
                "display_count must be positive".to_string(),
            ));
        }
        if self.max_decision_retries == 0 {
            return Err(ConfigError::Invalid(
                "max_decision_retries must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Display pools dealt at the start of each round.
    pub fn display_count(&self) -> usize {
        self.display_count
            .unwrap_or(match self.num_players {
                2 => 5,
                3 => 7,
                _ => 9,
            })
    }
}
