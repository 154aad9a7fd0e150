//! Performance benchmarks for tab-autoreload.
//!
//! Run with: cargo bench
//!
//! Badge text is recomputed for every active tab once per second in countdown
//! mode, so formatting has to stay cheap.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tab_autoreload::host::BadgeColor;
use tab_autoreload::{
    seconds_to_badge_text, BadgePalette, DisplayMode, MemoryHost, ReloadRegistry,
};
use tokio::sync::mpsc;

/// Benchmark badge text formatting across every rule.
fn bench_badge_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("badge_text");

    let samples = [
        ("seconds", 42),
        ("minutes", 65),
        ("hours", 3_660),
        ("fractional_days", 90_000),
        ("rounded_days", 863_100),
        ("many_days", 3_000_000),
    ];

    for (name, seconds) in samples {
        group.bench_with_input(BenchmarkId::from_parameter(name), &seconds, |b, &s| {
            b.iter(|| black_box(seconds_to_badge_text(black_box(s))))
        });
    }

    group.finish();
}

/// Benchmark set/clear churn and a full countdown refresh pass.
fn bench_registry(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("tokio runtime");
    let _guard = runtime.enter();

    let palette = BadgePalette {
        interval: BadgeColor([0, 0, 255, 255]),
        countdown: BadgeColor([255, 0, 0, 255]),
    };

    let mut group = c.benchmark_group("registry");

    group.bench_function("set_clear_100_tabs", |b| {
        let (tx, _rx) = mpsc::unbounded_channel();
        let host = Arc::new(MemoryHost::new());
        let mut registry = ReloadRegistry::new(host.clone(), DisplayMode::Interval, palette, tx);
        b.iter(|| {
            for tab_id in 0..100 {
                registry.set_reload(tab_id, 30 + tab_id as u64);
            }
            registry.clear_all_reloads();
            host.take_calls();
        })
    });

    group.bench_function("countdown_refresh_100_tabs", |b| {
        let (tx, _rx) = mpsc::unbounded_channel();
        let host = Arc::new(MemoryHost::new());
        let mut registry = ReloadRegistry::new(host.clone(), DisplayMode::Countdown, palette, tx);
        for tab_id in 0..100 {
            registry.set_reload(tab_id, 60 * (tab_id as u64 + 1));
        }
        b.iter(|| {
            registry.refresh_all_badges();
            host.take_calls();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_badge_text, bench_registry);

criterion_main!(benches);
