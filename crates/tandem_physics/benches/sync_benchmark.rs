//! # Sync Pass Benchmark
//!
//! Measures the two passes that run under the store lock every tick, plus
//! a world step, for a field of bodied entities.
//!
//! Run with: `cargo bench --package tandem_physics`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use tandem_core::{EntityStore, Position};
use tandem_physics::{
    circle_body, post_step_sync, pre_step_sync, BodyDef, BodyType, CollisionFilter, PhysicsWorld,
};

const RATIO: f32 = 50.0;

fn field(count: usize) -> (EntityStore, PhysicsWorld) {
    let mut store = EntityStore::new(count);
    let mut world = PhysicsWorld::default();
    for i in 0..count {
        // Spread out on a grid so few bodies touch
        let at = Vec2::new((i % 100) as f32 * 2.0, (i / 100) as f32 * 2.0);
        let entity = store.spawn_with(Position::new(at * RATIO, Vec2::new(10.0, 5.0)));
        let def = BodyDef::new(BodyType::Dynamic, at);
        if let Ok(body) = circle_body(&mut world, def, 20.0, 1.0, CollisionFilter::default(), RATIO) {
            store.insert(entity, body);
        }
    }
    (store, world)
}

fn bench_pre_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("pre_step_sync");
    for count in [100, 1_000, 5_000] {
        let (store, mut world) = field(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(pre_step_sync(&store, &mut world, RATIO)));
        });
    }
    group.finish();
}

fn bench_post_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("post_step_sync");
    for count in [100, 1_000, 5_000] {
        let (mut store, world) = field(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(post_step_sync(&mut store, &world, RATIO)));
        });
    }
    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let (_, mut world) = field(500);
    c.bench_function("world_step_500", |b| {
        b.iter(|| world.step(black_box(1.0 / 60.0), 8, 3));
    });
}

criterion_group!(benches, bench_pre_step, bench_post_step, bench_step);
criterion_main!(benches);
