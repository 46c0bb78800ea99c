// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use isotile_index::{Aabb2D, FlatIndex, Index};

/// One box per tile, like a chunk's ground layer.
fn gen_tile_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::<f64>::from_xywh(x0, y0, cell, cell));
        }
    }
    out
}

fn gen_tile_rects_i64(n: usize, cell: i64) -> Vec<Aabb2D<i64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as i64 * cell;
            let y0 = y as i64 * cell;
            out.push(Aabb2D::<i64>::from_xywh(x0, y0, cell, cell));
        }
    }
    out
}

/// Thin wall boxes along the north and west edge of every tile.
fn gen_wall_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(2 * n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::new(x0, y0 - 0.25, x0 + cell, y0 + 0.25));
            out.push(Aabb2D::new(x0 - 0.25, y0, x0 + 0.25, y0 + cell));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Object-sized boxes scattered over a chunk.
fn gen_object_rects(count: usize, extent: f64, size: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0x150_711E_F00D_BEEF);
    for _ in 0..count {
        let x0 = rng.next_f64() * (extent - size);
        let y0 = rng.next_f64() * (extent - size);
        out.push(Aabb2D::<f64>::from_xywh(x0, y0, size, size));
    }
    out
}

/// Mover-sized probes, the shape of a passability query.
fn gen_probes(count: usize, extent: f64) -> Vec<Aabb2D<f64>> {
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    (0..count)
        .map(|_| {
            let cx = rng.next_f64() * extent;
            let cy = rng.next_f64() * extent;
            Aabb2D::from_center_size(cx, cy, 32.0, 32.0)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_f64");
    for &n in &[16usize, 32] {
        let mut rects = gen_tile_rects(n, 64.0);
        rects.extend(gen_wall_rects(n, 64.0));
        group.throughput(Throughput::Elements(rects.len() as u64));

        group.bench_function(format!("flatvec_insert_n{n}"), |b| {
            b.iter_batched(
                FlatIndex::<f64, u32>::new,
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        let _ = idx.insert(r, i as u32);
                    }
                    black_box(idx.len());
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rtree_insert_n{n}"), |b| {
            b.iter_batched(
                Index::<f64, u32>::new,
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        let _ = idx.insert(r, i as u32);
                    }
                    black_box(idx.len());
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rtree_bulk_n{n}"), |b| {
            b.iter_batched(
                || {
                    rects
                        .iter()
                        .copied()
                        .enumerate()
                        .map(|(i, r)| (r, i as u32))
                        .collect::<Vec<_>>()
                },
                |entries| {
                    let (idx, keys) = Index::<f64, u32>::bulk(&entries);
                    black_box((idx.len(), keys.len()));
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_probe(c: &mut Criterion) {
    let mut group = c.benchmark_group("probe_f64");
    let mut rects = gen_tile_rects(16, 64.0);
    rects.extend(gen_wall_rects(16, 64.0));
    rects.extend(gen_object_rects(256, 1024.0, 32.0));
    let probes = gen_probes(1024, 1024.0);
    group.throughput(Throughput::Elements(probes.len() as u64));

    let mut flat = FlatIndex::<f64, u32>::new();
    let mut tree = Index::<f64, u32>::new();
    for (i, r) in rects.iter().copied().enumerate() {
        flat.insert(r, i as u32);
        tree.insert(r, i as u32);
    }

    group.bench_function("flatvec_first_hit", |b| {
        b.iter(|| {
            let mut blocked = 0_usize;
            for p in &probes {
                if !flat.search(p, |_, r, _| !r.overlaps(p)) {
                    blocked += 1;
                }
            }
            black_box(blocked);
        })
    });

    group.bench_function("rtree_first_hit", |b| {
        b.iter(|| {
            let mut blocked = 0_usize;
            for p in &probes {
                if !tree.search(p, |_, r, _| !r.overlaps(p)) {
                    blocked += 1;
                }
            }
            black_box(blocked);
        })
    });

    group.bench_function("rtree_collect_all", |b| {
        b.iter(|| {
            let hits: usize = probes.iter().map(|p| tree.query_rect(*p).count()).sum();
            black_box(hits);
        })
    });
    group.finish();
}

fn bench_update_heavy_rtree_i64(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_heavy_rtree_i64");
    let rects = gen_tile_rects_i64(32, 32);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("move_every_box", |b| {
        b.iter_batched(
            || {
                let mut idx = Index::<i64, u32>::new();
                let keys: Vec<_> = rects
                    .iter()
                    .copied()
                    .enumerate()
                    .map(|(i, r)| idx.insert(r, i as u32))
                    .collect();
                (idx, keys)
            },
            |(mut idx, keys)| {
                for (k, r) in keys.iter().zip(&rects) {
                    idx.update(*k, r.translate(3, -2));
                }
                let hits = idx.query_rect(Aabb2D::new(100, 100, 500, 500)).count();
                black_box(hits);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_probe,
    bench_update_heavy_rtree_i64,
);
criterion_main!(benches);
