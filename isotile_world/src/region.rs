// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Which parts of a chunk can be reached from its borders.

use core::fmt;

use crate::bbox::{BoxSize, centered_box};
use crate::coords::{CHUNK_SIZE, ChunkCoords, HALF_TILE, Point};
use crate::passability::blocked_by_any;
use crate::search_cache::SearchCache;
use crate::world::World;

/// Cells per chunk side.
pub const REGION_DIM: usize = 64;

/// Side of one cell in pixels.
pub const REGION_CELL: i32 = CHUNK_SIZE / REGION_DIM as i32;

const PROBE: BoxSize = BoxSize::new(REGION_CELL as u8, REGION_CELL as u8);

const STEPS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Cells of a chunk that a cell-sized mover can reach from outside the chunk.
#[derive(Clone, PartialEq, Eq)]
pub struct PassRegion {
    rows: [u64; REGION_DIM],
}

impl PassRegion {
    const fn empty() -> Self {
        Self {
            rows: [0; REGION_DIM],
        }
    }

    /// Whether cell `(x, y)` is reachable. Cells outside the grid never are.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < REGION_DIM && y < REGION_DIM && self.rows[y] & (1 << x) != 0
    }

    /// Whether the cell under `at` is reachable. `at` is read in its own chunk.
    pub fn contains_point(&self, at: Point) -> bool {
        let (x, y) = at.local_px();
        let cell = |v: i32| usize::try_from((v + HALF_TILE) / REGION_CELL).ok();
        match (cell(x), cell(y)) {
            (Some(x), Some(y)) => self.contains(x, y),
            _ => false,
        }
    }

    /// Number of reachable cells.
    pub fn count(&self) -> usize {
        self.rows.iter().map(|r| r.count_ones() as usize).sum()
    }

    /// Whether no cell is reachable.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|&r| r == 0)
    }

    fn insert(&mut self, x: i32, y: i32) -> bool {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return false;
        };
        if x >= REGION_DIM || y >= REGION_DIM || self.contains(x, y) {
            return false;
        }
        self.rows[y] |= 1 << x;
        true
    }
}

impl fmt::Debug for PassRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassRegion")
            .field("cells", &self.count())
            .finish_non_exhaustive()
    }
}

fn cell_center(x: i32, y: i32) -> (i32, i32) {
    let first = REGION_CELL / 2 - HALF_TILE;
    (first + x * REGION_CELL, first + y * REGION_CELL)
}

/// Flood fill from every border cell that can be entered from outside.
fn compute(cache: &mut SearchCache<'_>, coord: ChunkCoords) -> PassRegion {
    let mut step = |from: (i32, i32), to: (i32, i32)| {
        let (fx, fy) = cell_center(from.0, from.1);
        let (tx, ty) = cell_center(to.0, to.1);
        let rect = centered_box(fx, fy, PROBE).union(centered_box(tx, ty, PROBE));
        cache.is_passable(coord, &rect, None, &blocked_by_any)
    };

    let last = REGION_DIM as i32 - 1;
    let mut region = PassRegion::empty();
    let mut stack = Vec::new();
    for i in 0..=last {
        for (cell, outside) in [
            ((i, 0), (i, -1)),
            ((i, last), (i, last + 1)),
            ((0, i), (-1, i)),
            ((last, i), (last + 1, i)),
        ] {
            if step(outside, cell) && region.insert(cell.0, cell.1) {
                stack.push(cell);
            }
        }
    }
    while let Some((x, y)) = stack.pop() {
        for (dx, dy) in STEPS {
            let next = (x + dx, y + dy);
            if !(0..=last).contains(&next.0) || !(0..=last).contains(&next.1) {
                continue;
            }
            let (Ok(nx), Ok(ny)) = (usize::try_from(next.0), usize::try_from(next.1)) else {
                continue;
            };
            if region.contains(nx, ny) || !step((x, y), next) {
                continue;
            }
            region.insert(next.0, next.1);
            stack.push(next);
        }
    }
    region
}

impl World {
    /// Cells of chunk `coord` reachable from its borders, if it is loaded.
    ///
    /// The result is cached until the chunk or an object near it changes.
    /// Terrain edits in a neighbor do not invalidate it; call
    /// [`Chunk::mark_region_modified`](crate::Chunk::mark_region_modified)
    /// on the affected chunks after such edits.
    pub fn pass_region(&self, coord: ChunkCoords) -> Option<PassRegion> {
        let chunk = self.chunk_at(coord)?;
        if let Some(region) = chunk.cached_region() {
            return Some(region);
        }
        let region = compute(&mut SearchCache::new(self), coord);
        log::debug!(
            "computed pass region of chunk {coord:?}: {} cells",
            region.count()
        );
        chunk.store_region(region.clone());
        Some(region)
    }
}
