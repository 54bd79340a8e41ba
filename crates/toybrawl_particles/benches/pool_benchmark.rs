//! # Particle Pool Benchmark
//!
//! REQUIREMENTS:
//! - 5000 live particles: update < 0.5ms
//! - Full-capacity render (pack + upload): < 1ms
//!
//! Run with: `cargo bench --package toybrawl_particles`

// Benchmarks don't need strict docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use toybrawl_core::Vec3;
use toybrawl_particles::{
    CategoryConfig, DeviceProfile, HeadlessSurface, ParticleBurst, ParticlePool, PoolConfig,
};

fn filled(capacity: usize) -> ParticlePool<HeadlessSurface> {
    let mut pool = ParticlePool::new(
        HeadlessSurface::new(),
        &PoolConfig::default(),
        DeviceProfile::DESKTOP,
    );
    pool.create_category("bench", CategoryConfig::with_capacity(capacity));
    #[allow(clippy::cast_possible_truncation)]
    let count = capacity as u32;
    pool.emit(
        "bench",
        &ParticleBurst {
            count,
            spread: 30.0,
            life_ms: 1.0e12,
            gravity: -50.0,
            velocity: Vec3::new(0.0, 20.0, 0.0),
            ..ParticleBurst::default()
        },
    );
    pool
}

/// Benchmark: simulation step over a full category.
fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_update");
    for capacity in [500, 1000, 5000] {
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &capacity| {
            let mut pool = filled(capacity);
            b.iter(|| black_box(pool.update(16.0)));
        });
    }
    group.finish();
}

/// Benchmark: pack, upload and draw after every update.
fn bench_render(c: &mut Criterion) {
    let mut pool = filled(5000);
    c.bench_function("pool_update_render_5000", |b| {
        b.iter(|| {
            pool.update(16.0);
            black_box(pool.render());
            pool.surface_mut().take_draws();
        });
    });
}

/// Benchmark: first-fit emission into a half-full category.
fn bench_emit(c: &mut Criterion) {
    c.bench_function("emit_50_into_500", |b| {
        b.iter_batched(
            || {
                let mut pool = ParticlePool::new(
                    HeadlessSurface::new(),
                    &PoolConfig::default(),
                    DeviceProfile::DESKTOP,
                );
                pool.create_category("explosion", CategoryConfig::with_capacity(500));
                pool.emit("explosion", &ParticleBurst { count: 250, ..ParticleBurst::default() });
                pool
            },
            |mut pool| black_box(pool.create_explosion(Vec3::ZERO, None)),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_update, bench_render, bench_emit);
criterion_main!(benches);
