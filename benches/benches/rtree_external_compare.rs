// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

//! A chunk's collision boxes in `isotile_index` against the same boxes in
//! `rstar`: rebuilding the tree, then asking whether mover-sized boxes are
//! blocked.

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use isotile_index::{Aabb2D, Index};
use isotile_world::bbox::{centered_box, overlaps, to_aabb};
use isotile_world::{
    BoxSize, ChunkCoords, CollisionTag, LocalCoords, ObjectProto, PassMode, Point, SearchContinue,
    Wall, World, blocked_by_any, is_passable_1,
};
use kurbo::Rect;

use rstar::RTree;
use rstar::primitives::{GeomWithData, Rectangle};

type RstarEntry = GeomWithData<Rectangle<[f64; 2]>, (CollisionTag, Rect)>;

const ORIGIN: ChunkCoords = ChunkCoords::new(0, 0, 0);

/// One chunk with scattered blocked ground, broken wall runs and rocks.
fn build_chunk() -> World {
    let mut world = World::new();
    let chunk = world.ensure_chunk(ORIGIN);
    for local in LocalCoords::all() {
        let (x, y) = (local.x(), local.y());
        if (x * 7 + y * 3) % 5 == 0 {
            chunk.set_ground(local, Some(PassMode::Blocked));
        }
        if y % 4 == 1 && x % 6 != 0 {
            chunk.set_wall_north(local, Some(Wall::new(PassMode::Blocked, 8.0)));
        }
        if x % 5 == 2 && y % 3 == 0 {
            chunk.set_wall_west(local, Some(Wall::new(PassMode::SeeThrough, 4.0)));
        }
    }
    let rock = ObjectProto::scenery(PassMode::Blocked, BoxSize::new(40, 40));
    let bush = ObjectProto::scenery(PassMode::ShootThrough, BoxSize::new(24, 24));
    for i in 0..48_usize {
        let local = LocalCoords::from_index((i * 37 + 5) % 256);
        let proto = if i % 3 == 0 { bush } else { rock };
        world.make_object(proto, Point::at_tile(ORIGIN, local));
    }
    if let Some(chunk) = world.chunk_at(ORIGIN) {
        chunk.ensure_passability();
    }
    world
}

struct Rng(u64);

impl Rng {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (x >> 32) as u32
    }
}

/// Mover boxes centered anywhere in the chunk frame.
fn gen_movers(count: usize) -> Vec<Rect> {
    let mut rng = Rng(0x5EED_0F_C0FFEE);
    (0..count)
        .map(|_| {
            let cx = (rng.next_u32() % 1024) as i32 - 32;
            let cy = (rng.next_u32() % 1024) as i32 - 32;
            centered_box(cx, cy, BoxSize::new(32, 32))
        })
        .collect()
}

fn to_rstar(entries: &[(Rect, CollisionTag)]) -> Vec<RstarEntry> {
    entries
        .iter()
        .map(|&(r, tag)| {
            GeomWithData::new(Rectangle::from_corners([r.x0, r.y0], [r.x1, r.y1]), (tag, r))
        })
        .collect()
}

/// The same test `is_passable_1` makes, over an `rstar` tree.
fn rstar_is_passable(tree: &RTree<RstarEntry>, rect: &Rect) -> bool {
    let envelope = rstar::AABB::from_corners([rect.x0, rect.y0], [rect.x1, rect.y1]);
    !tree
        .locate_in_envelope_intersecting(&envelope)
        .any(|e| {
            let (tag, r) = &e.data;
            tag.pass.is_blocking() && overlaps(r, rect) && blocked_by_any(tag) != SearchContinue::Pass
        })
}

fn bench_chunk_rebuild(c: &mut Criterion) {
    let world = build_chunk();
    let Some(chunk) = world.chunk_at(ORIGIN) else {
        return;
    };
    let entries = chunk.collision_index().entries();
    let mut group = c.benchmark_group("chunk_rebuild");
    group.throughput(Throughput::Elements(entries.len() as u64));

    group.bench_function("isotile_bulk", |b| {
        b.iter_batched(
            || {
                entries
                    .iter()
                    .map(|(r, tag)| (to_aabb(r), *tag))
                    .collect::<Vec<(Aabb2D<f64>, CollisionTag)>>()
            },
            |items| {
                let (idx, _) = Index::<f64, CollisionTag>::bulk(&items);
                black_box(idx.len());
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("rstar_bulk_load", |b| {
        b.iter_batched(
            || to_rstar(&entries),
            |items| {
                let tree = RTree::bulk_load(items);
                black_box(tree.size());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_blocking_queries(c: &mut Criterion) {
    let world = build_chunk();
    let Some(chunk) = world.chunk_at(ORIGIN) else {
        return;
    };
    let movers = gen_movers(1024);
    let tree = RTree::bulk_load(to_rstar(&chunk.collision_index().entries()));
    let mut group = c.benchmark_group("blocking_queries");
    group.throughput(Throughput::Elements(movers.len() as u64));

    group.bench_function("isotile_is_passable_1", |b| {
        b.iter(|| {
            let free = movers
                .iter()
                .filter(|r| is_passable_1(chunk, r, None, &blocked_by_any))
                .count();
            black_box(free);
        })
    });

    group.bench_function("rstar_locate_any", |b| {
        b.iter(|| {
            let free = movers.iter().filter(|r| rstar_is_passable(&tree, r)).count();
            black_box(free);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_chunk_rebuild, bench_blocking_queries);
criterion_main!(benches);
