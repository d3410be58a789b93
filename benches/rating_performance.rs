//! Performance benchmarks for rating calculations

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glicko_engine::config::GlickoConfig;
use glicko_engine::rating::{
    Glicko2RatingCalculator, InMemoryRatingStorage, Match, Rating, RatingEntry, RatingPeriod,
    RatingStorage, VolatilitySolver,
};

fn bench_rating_calculations(c: &mut Criterion) {
    let config = GlickoConfig::default();
    let player = Rating::from_display(1500.0, 200.0, 0.06, &config).unwrap();
    let opponents = [
        Rating::from_display(1400.0, 30.0, 0.06, &config).unwrap(),
        Rating::from_display(1550.0, 100.0, 0.06, &config).unwrap(),
        Rating::from_display(1700.0, 300.0, 0.06, &config).unwrap(),
    ];
    let matches = [
        Match::new(&opponents[0], 1.0),
        Match::new(&opponents[1], 0.0),
        Match::new(&opponents[2], 0.0),
    ];

    c.bench_function("glicko2_update_3_matches", |b| {
        b.iter(|| black_box(player.update(black_box(&matches), &config)))
    });

    c.bench_function("glicko2_update_single", |b| {
        b.iter(|| black_box(player.update_single(black_box(&matches[0]), &config)))
    });
}

fn bench_volatility_solver(c: &mut Criterion) {
    let solver = VolatilitySolver::from_config(&GlickoConfig::default());

    c.bench_function("volatility_solver", |b| {
        b.iter(|| {
            black_box(solver.new_volatility(
                black_box(-0.4839),
                black_box(1.7790),
                black_box(1.1513),
                black_box(0.06),
            ))
        })
    });
}

fn bench_rating_period(c: &mut Criterion) {
    let calculator = Glicko2RatingCalculator::default();

    c.bench_function("rating_period_64_players", |b| {
        b.iter(|| {
            let storage = InMemoryRatingStorage::new();
            for i in 0..64 {
                let rating = calculator
                    .rating_from_display(1200.0 + (i as f64 * 10.0), 120.0, 0.06)
                    .unwrap();
                storage
                    .store_rating(RatingEntry::new(format!("player_{}", i), rating))
                    .unwrap();
            }

            let mut period = RatingPeriod::new();
            for i in 0..64 {
                let opponent = (i * 7 + 3) % 64;
                if opponent != i {
                    let score = if i % 3 == 0 { 0.5 } else { (i % 2) as f64 };
                    period
                        .record(format!("player_{}", i), format!("player_{}", opponent), score)
                        .unwrap();
                }
            }

            black_box(period.process(&storage, &calculator))
        })
    });
}

criterion_group!(
    benches,
    bench_rating_calculations,
    bench_volatility_solver,
    bench_rating_period
);
criterion_main!(benches);
