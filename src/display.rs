//! Shared display utilities for rendering game snapshots in the terminal
//!
//! Provides colorized, human-readable output for boards, pools and moves.
//! Everything works from a [`GameSnapshot`]; nothing here touches a live
//! engine.

use std::fmt;

use tiledraft_engine::{
    Color, Destination, DrawSource, GameSnapshot, Move, PlayerIdx, PlayerSnapshot, StockSnapshot,
    TileCounts, Token, WallLayout, ALL_COLORS, BOARD_SIZE, WALL_PATTERN,
};

// ANSI color codes for tile display
pub const BLUE: &str = "\x1b[94m";
pub const YELLOW: &str = "\x1b[93m";
pub const RED: &str = "\x1b[91m";
pub const BLACK: &str = "\x1b[90m";
pub const TEAL: &str = "\x1b[96m";
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub fn color_code(color: Color) -> &'static str {
    match color {
        Color::Blue => BLUE,
        Color::Yellow => YELLOW,
        Color::Red => RED,
        Color::Black => BLACK,
        Color::Teal => TEAL,
    }
}

pub fn color_char(color: Color) -> char {
    match color {
        Color::Blue => 'B',
        Color::Yellow => 'Y',
        Color::Red => 'R',
        Color::Black => 'K',
        Color::Teal => 'T',
    }
}

pub fn display_tile(color: Color) -> String {
    format!("{}{}{}", color_code(color), color_char(color), RESET)
}

pub fn display_token(token: Token) -> String {
    match token {
        Token::Tile(c) => display_tile(c),
        Token::StartMarker => format!("{BOLD}1{RESET}"),
    }
}

fn display_counts(counts: &TileCounts) -> String {
    let mut out = String::new();
    for color in ALL_COLORS {
        for _ in 0..counts.get(color) {
            out.push_str(&display_tile(color));
            out.push(' ');
        }
    }
    out
}

pub fn format_source(source: DrawSource) -> String {
    match source {
        DrawSource::Display(i) => format!("D{i}"),
        DrawSource::Overflow => "Overflow".to_string(),
    }
}

pub fn format_destination(dest: Destination) -> String {
    match dest {
        Destination::Row(r) => format!("Row {}", r + 1),
        Destination::Penalty => "Penalty".to_string(),
    }
}

/// Format a move for display
pub fn format_move(mv: &Move) -> String {
    format!(
        "{} {} -> {}",
        format_source(mv.source),
        display_tile(mv.color),
        format_destination(mv.dest)
    )
}

/// Full board view: pools, then every player's staging rows, grid and
/// penalty track. The highlighted seat is shown in bold, the rest dimmed.
pub struct BoardView<'a> {
    pub snapshot: &'a GameSnapshot,
    pub highlight: Option<PlayerIdx>,
}

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = self.snapshot;
        writeln!(f, "\n{BOLD}══════════════════════════════════════════════════════════════{RESET}")?;
        writeln!(
            f,
            "{BOLD}  Round {}{RESET}   |   Current Player: {}   |   {:?}",
            snap.round, snap.active_player, snap.phase
        )?;
        writeln!(f, "{BOLD}══════════════════════════════════════════════════════════════{RESET}\n")?;

        write_stock(f, &snap.stock)?;

        for player in &snap.players {
            let emphasis = if self.highlight == Some(player.seat) { BOLD } else { DIM };
            writeln!(
                f,
                "{emphasis}PLAYER {} (Score: {}){RESET}",
                player.seat, player.score
            )?;
            write_player(f, player, snap.layout)?;
        }
        Ok(())
    }
}

fn write_stock(f: &mut fmt::Formatter<'_>, stock: &StockSnapshot) -> fmt::Result {
    writeln!(f, "{BOLD}DISPLAYS:{RESET}")?;
    for (i, display) in stock.displays.iter().enumerate() {
        if display.is_empty() {
            writeln!(f, "  D{i}: {DIM}(empty){RESET}")?;
        } else {
            writeln!(f, "  D{i}: {}", display_counts(display))?;
        }
    }

    write!(f, "\n{BOLD}OVERFLOW:{RESET} ")?;
    if stock.marker_available {
        write!(f, "{} ", display_token(Token::StartMarker))?;
    }
    if stock.overflow.is_empty() {
        write!(f, "{DIM}(empty){RESET}")?;
    } else {
        write!(f, "{}", display_counts(&stock.overflow))?;
    }
    writeln!(
        f,
        "\n{DIM}supply {} / discard {}{RESET}\n",
        stock.supply.total(),
        stock.discard.total()
    )
}

fn write_player(f: &mut fmt::Formatter<'_>, player: &PlayerSnapshot, layout: WallLayout) -> fmt::Result {
    writeln!(f, "  Staging Rows           Grid")?;

    for (row, line) in player.staging.iter().enumerate() {
        // right-align staging rows against the grid
        write!(f, "  ")?;
        for _ in 0..(BOARD_SIZE - line.capacity() as usize) {
            write!(f, "  ")?;
        }
        for _ in 0..line.free_spaces() {
            write!(f, "{DIM}.{RESET} ")?;
        }
        if let Some(color) = line.color() {
            for _ in 0..line.used_spaces() {
                write!(f, "{} ", display_tile(color))?;
            }
        }

        write!(f, " -> ")?;

        for col in 0..BOARD_SIZE {
            match (player.grid.cell(row, col), layout) {
                (Some(color), _) => write!(f, "{} ", display_tile(color))?,
                (None, WallLayout::Patterned) => {
                    let expected = WALL_PATTERN[row][col];
                    write!(f, "{DIM}{}{RESET} ", color_char(expected))?
                }
                (None, WallLayout::Free) => write!(f, "{DIM}.{RESET} ")?,
            }
        }
        writeln!(f)?;
    }

    write!(f, "  Penalty: ")?;
    if player.penalty.is_empty() {
        write!(f, "{DIM}(empty){RESET}")?;
    } else {
        for &token in &player.penalty {
            write!(f, "{} ", display_token(token))?;
        }
        write!(f, " ({})", player.penalty_cost)?;
    }
    writeln!(f, "\n")
}

/// Render the full board as a string.
pub fn render_board(snapshot: &GameSnapshot, highlight: Option<PlayerIdx>) -> String {
    BoardView { snapshot, highlight }.to_string()
}

/// One line per seat, best score first.
pub fn render_scores(snapshot: &GameSnapshot) -> String {
    let mut players: Vec<&PlayerSnapshot> = snapshot.players.iter().collect();
    players.sort_by_key(|p| std::cmp::Reverse(p.score));
    players
        .iter()
        .map(|p| {
            format!(
                "Player {}: {:>4}  ({} rows, {} tiles placed)",
                p.seat,
                p.score,
                p.grid.complete_rows(),
                p.grid.occupied()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
