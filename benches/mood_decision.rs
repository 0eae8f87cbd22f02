//! Benchmarks for mood classification and volatility

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mood_engine::history::PriceHistoryStore;
use mood_engine::mood::MoodDecisionEngine;
use rust_decimal::Decimal;

fn benchmark_decide(c: &mut Criterion) {
    let engine = MoodDecisionEngine::default();

    c.bench_function("mood_decide_bullish", |b| {
        b.iter(|| engine.decide(black_box(6.0), black_box(0.2), black_box(0.5), black_box(10.0)))
    });

    c.bench_function("mood_decide_fallthrough", |b| {
        b.iter(|| engine.decide(black_box(0.5), black_box(0.05), black_box(0.5), black_box(2.0)))
    });
}

fn benchmark_volatility(c: &mut Criterion) {
    let mut store = PriceHistoryStore::new(100);
    let now = Utc::now();
    for i in 0..100i64 {
        let price = Decimal::from(100 + (i % 7) * 3);
        store.record_sample("SOL", price, now - Duration::seconds(30 * (100 - i)));
    }

    c.bench_function("volatility_full_window", |b| {
        b.iter(|| store.compute_volatility_at(black_box("SOL"), black_box(60), now))
    });
}

criterion_group!(benches, benchmark_decide, benchmark_volatility);
criterion_main!(benches);
