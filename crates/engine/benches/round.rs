//! Benchmarks for whole games and single rounds
//!
//! Measures RoundEngine throughput with the bundled bot policies

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use tiledraft_engine::{GameConfig, GreedyDecider, RandomDecider, RoundEngine};

fn bench_full_game(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_game");

    for players in [2u8, 3, 4] {
        group.bench_with_input(
            BenchmarkId::new("random", players),
            &players,
            |b, &players| {
                let mut seed = 0u64;
                b.iter(|| {
                    seed += 1;
                    let mut rng = StdRng::seed_from_u64(seed);
                    let mut engine =
                        RoundEngine::new(GameConfig::new(players), 0, &mut rng).unwrap();
                    let mut bots: Vec<RandomDecider> = (0..players as u64)
                        .map(|i| RandomDecider::new(seed * 8 + i))
                        .collect();
                    black_box(engine.play_game(&mut bots, &mut rng).unwrap())
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("greedy", players),
            &players,
            |b, &players| {
                let mut seed = 0u64;
                b.iter(|| {
                    seed += 1;
                    let mut rng = StdRng::seed_from_u64(seed);
                    let mut engine =
                        RoundEngine::new(GameConfig::new(players), 0, &mut rng).unwrap();
                    let mut bots = vec![GreedyDecider::new(); players as usize];
                    black_box(engine.play_game(&mut bots, &mut rng).unwrap())
                })
            },
        );
    }

    group.finish();
}

fn bench_first_round(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let engine = RoundEngine::new(GameConfig::new(4), 0, &mut rng).unwrap();

    c.bench_function("first_round_greedy_4p", |b| {
        b.iter(|| {
            let mut engine = engine.clone();
            let mut rng = StdRng::seed_from_u64(7);
            let mut bots = vec![GreedyDecider::new(); 4];
            black_box(engine.play_round(&mut bots, &mut rng).unwrap())
        })
    });
}

fn bench_legal_moves(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let engine = RoundEngine::new(GameConfig::new(4), 0, &mut rng).unwrap();

    c.bench_function("legal_moves_4p", |b| {
        b.iter(|| black_box(engine.legal_moves()))
    });
}

criterion_group!(benches, bench_full_game, bench_first_round, bench_legal_moves);
criterion_main!(benches);
