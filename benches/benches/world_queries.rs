// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use isotile_query::{PathRequest, SearchConfig, Searcher, line_of_sight, raycast};
use isotile_world::{
    BoxSize, ChunkCoords, LocalCoords, ObjectProto, PassMode, Point, SearchCache, Wall, World,
    blocked_by_any,
};

/// 3×3 chunks with a maze of wall segments and scattered rocks.
fn build_world() -> World {
    let mut world = World::new();
    let wall = Wall::new(PassMode::Blocked, 8.0);
    for cy in -1..=1 {
        for cx in -1..=1 {
            let chunk = world.ensure_chunk(ChunkCoords::new(cx, cy, 0));
            for y in (2..16).step_by(4) {
                for x in 0..16 {
                    // Leave a gap in every run.
                    if x != (y * 3) % 16 {
                        chunk.set_wall_north(LocalCoords::new(x, y), Some(wall));
                    }
                }
            }
        }
    }
    let rock = ObjectProto::scenery(PassMode::Blocked, BoxSize::new(40, 40));
    for cy in -1..=1 {
        for cx in -1..=1 {
            for i in 0..12_u8 {
                let local = LocalCoords::new((i * 5 + 1) % 16, (i * 7 + 3) % 16);
                world.make_object(rock, Point::at_tile(ChunkCoords::new(cx, cy, 0), local));
            }
        }
    }
    for chunk in world.chunks() {
        chunk.ensure_passability();
    }
    world
}

fn probes() -> Vec<Point> {
    let origin = ChunkCoords::new(0, 0, 0);
    LocalCoords::all()
        .map(|local| Point::at_tile(origin, local).normalize(17, -9))
        .collect()
}

fn bench_passability(c: &mut Criterion) {
    let world = build_world();
    let points = probes();
    let mut group = c.benchmark_group("passability");
    group.throughput(Throughput::Elements(points.len() as u64));

    group.bench_function("world_is_passable_at", |b| {
        b.iter(|| {
            let free = points
                .iter()
                .filter(|p| world.is_passable_at(**p, BoxSize::new(32, 32), None, &blocked_by_any))
                .count();
            black_box(free);
        })
    });

    group.bench_function("search_cache_is_passable_at", |b| {
        b.iter(|| {
            let mut cache = SearchCache::new(&world);
            let free = points
                .iter()
                .filter(|p| cache.is_passable_at(**p, BoxSize::new(32, 32), None, &blocked_by_any))
                .count();
            black_box(free);
        })
    });

    group.bench_function("rebuild_chunk", |b| {
        let mut world = build_world();
        let coord = ChunkCoords::new(0, 0, 0);
        b.iter(|| {
            let Some(chunk) = world.chunk_at_mut(coord) else {
                return;
            };
            chunk.mark_passability_modified();
            chunk.ensure_passability();
            black_box(chunk.collision_index().len());
        })
    });
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let world = build_world();
    let from = Point::at_tile(ChunkCoords::new(-1, -1, 0), LocalCoords::new(8, 0));
    let to = Point::at_tile(ChunkCoords::new(1, 1, 0), LocalCoords::new(8, 15));
    let req = PathRequest::new(from, to);
    let mut group = c.benchmark_group("path_search");
    group.sample_size(20);

    let config = SearchConfig {
        max_cost: 12_000,
        ..SearchConfig::default()
    };
    let mut searcher = Searcher::new(config).unwrap();
    group.bench_function("astar_across_chunks", |b| {
        b.iter(|| {
            let path = searcher.astar(&world, &req, &blocked_by_any);
            black_box(path.cost());
            searcher.release(path);
        })
    });

    let short = PathRequest::new(
        Point::at_tile(ChunkCoords::new(0, 0, 0), LocalCoords::new(8, 0)),
        Point::at_tile(ChunkCoords::new(0, 0, 0), LocalCoords::new(8, 9)),
    );
    let config = SearchConfig {
        max_cost: 1_600,
        ..SearchConfig::default()
    };
    let mut searcher = Searcher::new(config).unwrap();
    group.bench_function("dijkstra_in_chunk", |b| {
        b.iter(|| {
            let path = searcher.dijkstra(&world, &short, &blocked_by_any);
            black_box(path.cost());
            searcher.release(path);
        })
    });
    group.finish();
}

fn bench_raycast(c: &mut Criterion) {
    let world = build_world();
    let from = Point::at_tile(ChunkCoords::new(0, 0, 0), LocalCoords::new(8, 8));
    let targets: Vec<_> = LocalCoords::all()
        .filter(|l| l.x() % 4 == 0 && l.y() % 4 == 0)
        .map(|l| Point::at_tile(ChunkCoords::new(1, 1, 0), l))
        .collect();
    let mut group = c.benchmark_group("raycast");
    group.throughput(Throughput::Elements(targets.len() as u64));

    group.bench_function("movement", |b| {
        b.iter(|| {
            let hits = targets
                .iter()
                .filter(|t| !raycast(&world, from, **t, None).success)
                .count();
            black_box(hits);
        })
    });

    group.bench_function("line_of_sight", |b| {
        b.iter(|| {
            let seen = targets
                .iter()
                .filter(|t| line_of_sight(&world, from, **t, None).success)
                .count();
            black_box(seen);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_passability, bench_search, bench_raycast);
criterion_main!(benches);
