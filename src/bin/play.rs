//! Interactive CLI to play against the bundled bots
//!
//! Usage: cargo run --bin play [--players 3] [--seat 1] [--patterned]

use std::io::{self, BufRead, Write};

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use tiledraft::display::{
    display_tile, format_destination, format_source, render_board, render_scores, BOLD, DIM, RESET,
};
use tiledraft::{
    Col, Color, Decider, Decision, DecisionError, Destination, DrawSource, GameConfig,
    GreedyDecider, NoBonus, Phase, PlayerBoard, PlayerIdx, RandomDecider, RoundEngine, Row,
    RuleError, ScoringGrid, StandardBonus, TileStock, WallLayout,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Bot {
    Greedy,
    Random,
}

/// Play a tile-drafting game against bots
#[derive(Parser, Debug)]
#[command(name = "play")]
#[command(about = "Play a tile-drafting game against bots", long_about = None)]
struct Args {
    /// Number of players, you included (2-4)
    #[arg(long, default_value_t = 2)]
    players: u8,

    /// Your seat (0 opens the first round)
    #[arg(long, default_value_t = 0)]
    seat: PlayerIdx,

    /// Opponent policy
    #[arg(long, value_enum, default_value_t = Bot::Greedy)]
    bot: Bot,

    /// Use the printed color pattern instead of free column choice
    #[arg(long)]
    patterned: bool,

    /// Apply end-of-game bonuses
    #[arg(long)]
    bonus: bool,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Prompts on stdin for every choice.
struct ConsoleDecider;

impl ConsoleDecider {
    /// Ask for an index into a list of `len` options. `q` aborts.
    fn prompt(&self, label: &str, len: usize) -> Decision<usize> {
        let stdin = io::stdin();
        loop {
            print!("\n{BOLD}{label}:{RESET} ");
            io::stdout()
                .flush()
                .map_err(|e| DecisionError::new(e.to_string()))?;

            let mut input = String::new();
            let read = stdin
                .lock()
                .read_line(&mut input)
                .map_err(|e| DecisionError::new(e.to_string()))?;
            if read == 0 {
                return Err(DecisionError::new("end of input"));
            }

            let input = input.trim();
            if input == "q" || input == "quit" {
                return Err(DecisionError::new("player quit"));
            }
            match input.parse::<usize>() {
                Ok(idx) if idx < len => return Ok(idx),
                Ok(_) => println!("Invalid choice. Enter 0-{}", len.saturating_sub(1)),
                Err(_) => println!("Please enter a number (or 'q' to quit)"),
            }
        }
    }
}

impl Decider for ConsoleDecider {
    fn choose_draw_source(
        &mut self,
        stock: &TileStock,
        _board: &PlayerBoard,
    ) -> Decision<(DrawSource, Color)> {
        let draws = stock.legal_draws();
        println!("{BOLD}Take tiles from:{RESET}");
        for (i, &(source, color)) in draws.iter().enumerate() {
            let count = stock.available(source, color).unwrap_or_default();
            let marker = if source == DrawSource::Overflow && stock.overflow().marker_available() {
                format!(" {DIM}(+ start marker){RESET}")
            } else {
                String::new()
            };
            println!("  {i}: {} x{count} from {}{marker}", display_tile(color), format_source(source));
        }
        let idx = self.prompt("Pick tiles", draws.len())?;
        Ok(draws[idx])
    }

    fn choose_destination_row(
        &mut self,
        color: Color,
        count: u8,
        board: &PlayerBoard,
    ) -> Decision<Destination> {
        let dests = board.legal_destinations(color);
        println!("{BOLD}Place {count} x {}:{RESET}", display_tile(color));
        for (i, &dest) in dests.iter().enumerate() {
            let note = match dest {
                Destination::Row(row) => board
                    .staging()
                    .row(row)
                    .map(|r| format!(" {DIM}({} free){RESET}", r.free_spaces()))
                    .unwrap_or_default(),
                Destination::Penalty => String::new(),
            };
            println!("  {i}: {}{note}", format_destination(dest));
        }
        let idx = self.prompt("Pick destination", dests.len())?;
        Ok(dests[idx])
    }

    fn choose_destination_column(
        &mut self,
        color: Color,
        row: Row,
        grid: &ScoringGrid,
    ) -> Decision<Col> {
        let cols = grid.legal_columns(color, row, WallLayout::Free);
        println!(
            "{BOLD}Grid row {} gets {}:{RESET}",
            row + 1,
            display_tile(color)
        );
        for (i, &col) in cols.iter().enumerate() {
            println!("  {i}: column {} ({} points)", col + 1, grid.score_at(row, col));
        }
        let idx = self.prompt("Pick column", cols.len())?;
        Ok(cols[idx])
    }

    fn rejected(&mut self, error: &RuleError) {
        println!("{DIM}Not allowed: {error}{RESET}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = GameConfig::new(args.players);
    config.end_game_bonus = args.bonus;
    if args.patterned {
        config.wall_layout = WallLayout::Patterned;
    }
    config.validate()?;
    if args.seat >= args.players as usize {
        return Err(format!("seat {} is not one of {} seats", args.seat, args.players).into());
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut engine = RoundEngine::new(config.clone(), 0, &mut rng)?;
    let mut deciders: Vec<Box<dyn Decider>> = (0..engine.num_players())
        .map(|seat| -> Box<dyn Decider> {
            if seat == args.seat {
                Box::new(ConsoleDecider)
            } else {
                match args.bot {
                    Bot::Greedy => Box::new(GreedyDecider::new()),
                    Bot::Random => Box::new(RandomDecider::new(args.seed + seat as u64)),
                }
            }
        })
        .collect();

    println!("\n{BOLD}Welcome!{RESET}");
    println!("You are Player {} of {}.", args.seat, args.players);
    println!("Type 'q' to quit at any time.\n");

    loop {
        let step = match engine.phase() {
            Phase::RoundInProgress => {
                let seat = engine.active_player();
                if seat == args.seat {
                    print!("{}", render_board(&engine.snapshot(), Some(args.seat)));
                }
                engine.play_turn(&mut deciders[seat]).map(|outcome| {
                    if seat != args.seat {
                        let marker = if outcome.marker { " and the start marker" } else { "" };
                        println!(
                            "Player {seat} takes {} x{}{marker} ({} staged, {} to penalty)",
                            display_tile(outcome.taken.color),
                            outcome.taken.count,
                            outcome.staged,
                            outcome.penalized
                        );
                    }
                })
            }
            Phase::RoundEnd => engine.finish_round(&mut deciders, &mut rng).map(|report| {
                println!("\n{BOLD}Round {} complete{RESET}", report.round);
                for (seat, commit) in report.commits.iter().enumerate() {
                    println!("  Player {seat}: {:+}", commit.score_delta());
                }
            }),
            Phase::GameOver => break,
        };

        match step {
            Ok(()) => {}
            Err(RuleError::Aborted(reason)) => {
                println!("\nGoodbye! ({reason})");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
    }

    if config.end_game_bonus {
        engine.finalize(&StandardBonus::default())?;
    } else {
        engine.finalize(&NoBonus)?;
    }

    let snapshot = engine.snapshot();
    print!("{}", render_board(&snapshot, Some(args.seat)));
    println!("\n{BOLD}═══════════════════════════════════════{RESET}");
    println!("{BOLD}                GAME OVER{RESET}");
    println!("{BOLD}═══════════════════════════════════════{RESET}");
    println!("{}", render_scores(&snapshot));

    let scores = engine.scores();
    let best = scores.iter().copied().max().unwrap_or_default();
    if scores[args.seat] == best {
        println!("\n{BOLD}You win!{RESET}");
    } else {
        println!("\n{DIM}Better luck next time!{RESET}");
    }
    Ok(())
}
