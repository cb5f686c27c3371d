//! Benchmarks for the admission-gate hot paths
//!
//! This benchmark measures:
//! - Fingerprint generation over a typical chat payload
//! - Uncontended `try_acquire` throughput

use ai_gate::{CacheKeyGenerator, Message, RateLimiter, RateLimiterConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn chat_payload() -> Vec<Message> {
    vec![
        Message::system("You are a helpful assistant that answers concisely."),
        Message::user("Summarize the plot of Hamlet in two sentences."),
        Message::assistant("A prince feigns madness to avenge his father."),
        Message::user("Now do it in one."),
    ]
}

fn bench_fingerprint(c: &mut Criterion) {
    let generator = CacheKeyGenerator::new();
    let messages = chat_payload();

    c.bench_function("fingerprint_chat_payload", |b| {
        b.iter(|| {
            generator
                .generate(black_box(&messages), black_box("gpt-4o-mini"), 0.2)
                .unwrap()
        })
    });
}

fn bench_try_acquire(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let limiter = RateLimiter::new(
        RateLimiterConfig::new()
            .with_rate_per_second(1_000_000.0)
            .with_burst_capacity(1_000_000),
    )
    .unwrap();

    c.bench_function("try_acquire_uncontended", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(limiter.try_acquire("chat", 1).await) })
    });
}

criterion_group!(benches, bench_fingerprint, bench_try_acquire);
criterion_main!(benches);
