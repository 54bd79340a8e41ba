//! # Tween Scheduler Benchmark
//!
//! REQUIREMENTS:
//! - 1000 concurrent tweens: tick < 0.5ms
//! - Schedule + cancel: no per-frame cost after cancel
//!
//! Run with: `cargo bench --package toybrawl_tween`

// Benchmarks don't need strict docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::cell::RefCell;
use std::rc::Rc;

use toybrawl_core::ManualClock;
use toybrawl_tween::{AnimatedNode, Easing, Field, TweenOptions, TweenScheduler};

fn populated(count: usize) -> (ManualClock, TweenScheduler<ManualClock>) {
    let clock = ManualClock::new(0.0);
    let mut scheduler = TweenScheduler::new(clock.clone());
    for i in 0..count {
        let node = Rc::new(RefCell::new(AnimatedNode::default()));
        #[allow(clippy::cast_precision_loss)]
        let end = i as f32;
        scheduler.schedule(
            &node,
            TweenOptions::new(1.0e9)
                .to(Field::X, end)
                .to(Field::Opacity, 0.0)
                .easing(Easing::EaseOutCubic),
        );
    }
    (clock, scheduler)
}

/// Benchmark: one frame over N live tweens.
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_tick");
    for count in [100, 1000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let (clock, mut scheduler) = populated(count);
            b.iter(|| {
                clock.advance(16.0);
                black_box(scheduler.tick())
            });
        });
    }
    group.finish();
}

/// Benchmark: schedule then cancel.
fn bench_schedule_cancel(c: &mut Criterion) {
    let clock = ManualClock::new(0.0);
    let mut scheduler = TweenScheduler::new(clock);
    let node = Rc::new(RefCell::new(AnimatedNode::default()));
    c.bench_function("schedule_cancel", |b| {
        b.iter(|| {
            let handle = scheduler.schedule(&node, TweenOptions::new(300.0).to(Field::X, 1.0));
            black_box(scheduler.cancel(handle))
        });
    });
}

/// Benchmark: easing evaluation across the table.
fn bench_easing(c: &mut Criterion) {
    c.bench_function("easing_table", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for easing in Easing::ALL {
                sum += easing.apply(black_box(0.37));
            }
            sum
        });
    });
}

criterion_group!(benches, bench_tick, bench_schedule_cancel, bench_easing);
criterion_main!(benches);
