//! Bot-vs-bot simulation CLI
//!
//! Plays many independent games in parallel with the bundled policies and
//! reports score and win statistics.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use tiledraft::{
    Decider, GameConfig, GameResult, GameSnapshot, GreedyDecider, RandomDecider, RoundEngine,
    RuleError, WallLayout,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Policy {
    /// Every seat plays uniformly random legal moves
    Random,
    /// Every seat plays the greedy heuristic
    Greedy,
    /// Seat 0 plays greedy, the rest play random
    Mixed,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Layout {
    Free,
    Patterned,
}

impl From<Layout> for WallLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Free => WallLayout::Free,
            Layout::Patterned => WallLayout::Patterned,
        }
    }
}

/// Simulate tile-drafting games between bots
#[derive(Parser, Debug)]
#[command(name = "tiledraft")]
#[command(about = "Simulate tile-drafting games between bot policies", long_about = None)]
struct Args {
    /// TOML game configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    games: usize,

    /// Number of players (2-4)
    #[arg(long)]
    players: Option<u8>,

    /// Bot policy
    #[arg(long, value_enum, default_value_t = Policy::Random)]
    policy: Policy,

    /// Grid layout
    #[arg(long, value_enum)]
    layout: Option<Layout>,

    /// Apply end-of-game row/column/color bonuses
    #[arg(long)]
    bonus: bool,

    /// Base random seed (per-game seeds derive from it)
    #[arg(long)]
    seed: Option<u64>,

    /// Print one JSON line per game with its final state
    #[arg(long)]
    json: bool,
}

struct GameOutcome {
    seed: u64,
    result: GameResult,
    snapshot: GameSnapshot,
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn deciders(policy: Policy, players: usize, seed: u64) -> Vec<Box<dyn Decider>> {
    (0..players)
        .map(|seat| -> Box<dyn Decider> {
            match (policy, seat) {
                (Policy::Greedy, _) | (Policy::Mixed, 0) => Box::new(GreedyDecider::new()),
                (Policy::Random, _) | (Policy::Mixed, _) => {
                    Box::new(RandomDecider::new(seed.wrapping_add(seat as u64 + 1)))
                }
            }
        })
        .collect()
}

fn run_game(config: &GameConfig, policy: Policy, seed: u64) -> Result<GameOutcome, RuleError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let players = config.num_players as usize;
    let starting_player = rng.random_range(0..players);
    let mut engine = RoundEngine::new(config.clone(), starting_player, &mut rng)
        .map_err(|e| RuleError::Aborted(e.to_string()))?;

    let mut bots = deciders(policy, players, seed);
    let result = engine.play_game(&mut bots, &mut rng)?;
    debug!(event = "game_done", seed, rounds = result.rounds, scores = ?result.scores);

    Ok(GameOutcome {
        seed,
        result,
        snapshot: engine.snapshot(),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(players) = args.players {
        config.num_players = players;
    }
    if let Some(layout) = args.layout {
        config.wall_layout = layout.into();
    }
    if args.bonus {
        config.end_game_bonus = true;
    }
    config.validate()?;

    let base_seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    info!(
        event = "simulation_start",
        games = args.games,
        players = config.num_players,
        policy = ?args.policy,
        seed = base_seed,
    );

    // Per-game seeds are drawn up front so results do not depend on
    // thread scheduling.
    let mut seeder = StdRng::seed_from_u64(base_seed);
    let seeds: Vec<u64> = (0..args.games).map(|_| seeder.next_u64()).collect();

    let outcomes: Vec<GameOutcome> = seeds
        .into_par_iter()
        .map(|seed| run_game(&config, args.policy, seed))
        .collect::<Result<_, _>>()?;

    if args.json {
        for outcome in &outcomes {
            let line = serde_json::json!({
                "seed": outcome.seed,
                "rounds": outcome.result.rounds,
                "scores": outcome.result.scores,
                "winners": outcome.result.winners,
                "final_state": outcome.snapshot,
            });
            println!("{line}");
        }
        return Ok(());
    }

    print_summary(&config, args.policy, base_seed, &outcomes);
    Ok(())
}

fn print_summary(config: &GameConfig, policy: Policy, seed: u64, outcomes: &[GameOutcome]) {
    let players = config.num_players as usize;
    let games = outcomes.len().max(1) as f64;

    let mut wins = vec![0usize; players];
    let mut score_sum = vec![0i64; players];
    let mut rounds_sum = 0u64;
    let mut best = i32::MIN;
    let mut worst = i32::MAX;
    for outcome in outcomes {
        rounds_sum += u64::from(outcome.result.rounds);
        for &seat in &outcome.result.winners {
            wins[seat] += 1;
        }
        for (seat, &score) in outcome.result.scores.iter().enumerate() {
            score_sum[seat] += i64::from(score);
            best = best.max(score);
            worst = worst.min(score);
        }
    }

    println!("Simulation Summary:");
    println!("  Games: {}", outcomes.len());
    println!("  Players: {players}");
    println!("  Policy: {policy:?}");
    println!("  Layout: {:?}", config.wall_layout);
    println!("  End-game bonus: {}", config.end_game_bonus);
    println!("  Seed: {seed}");
    println!("  Mean rounds: {:.2}", rounds_sum as f64 / games);
    if !outcomes.is_empty() {
        println!("  Score range: {worst}..={best}");
    }
    println!();
    println!("  Seat   Wins   Win%   Mean score");
    for seat in 0..players {
        println!(
            "  {:>4}  {:>5}  {:>5.1}  {:>10.2}",
            seat,
            wins[seat],
            100.0 * wins[seat] as f64 / games,
            score_sum[seat] as f64 / games
        );
    }
}
