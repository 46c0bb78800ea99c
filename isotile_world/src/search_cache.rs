// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chunk lookups memoized for the duration of one query.

use core::fmt;
use std::collections::HashMap;

use kurbo::Rect;

use crate::bbox::{BoxSize, mover_box};
use crate::chunk::Chunk;
use crate::collision::{CollisionTag, ObjectId};
use crate::coords::{ChunkCoords, NEIGHBOR_OFFSETS, Point};
use crate::passability::{SearchContinue, is_passable_stitched, with_neighbors};
use crate::world::World;

/// Remembers which chunks exist around the coordinates a query touches.
///
/// Holding the cache borrows the world, so the world cannot change while
/// cached references are alive.
pub struct SearchCache<'w> {
    world: &'w World,
    chunks: HashMap<ChunkCoords, Option<&'w Chunk>>,
    neighbors: HashMap<ChunkCoords, [Option<&'w Chunk>; 8]>,
}

impl<'w> SearchCache<'w> {
    /// An empty cache over `world`.
    pub fn new(world: &'w World) -> Self {
        Self {
            world,
            chunks: HashMap::new(),
            neighbors: HashMap::new(),
        }
    }

    /// The world being queried.
    pub fn world(&self) -> &'w World {
        self.world
    }

    /// The chunk at `coord`, if loaded.
    pub fn chunk(&mut self, coord: ChunkCoords) -> Option<&'w Chunk> {
        let world = self.world;
        *self
            .chunks
            .entry(coord)
            .or_insert_with(|| world.chunk_at(coord))
    }

    /// The eight neighbors of `coord`, in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(&mut self, coord: ChunkCoords) -> [Option<&'w Chunk>; 8] {
        if let Some(n) = self.neighbors.get(&coord) {
            return *n;
        }
        let n = NEIGHBOR_OFFSETS.map(|(dx, dy)| {
            coord
                .checked_offset(dx, dy)
                .and_then(|c| self.chunk(c))
        });
        self.neighbors.insert(coord, n);
        n
    }

    /// [`World::is_passable`] through the cache.
    pub fn is_passable<P>(
        &mut self,
        coord: ChunkCoords,
        rect: &Rect,
        own: Option<ObjectId>,
        pred: &P,
    ) -> bool
    where
        P: Fn(&CollisionTag) -> SearchContinue + ?Sized,
    {
        let center = self.chunk(coord);
        let neighbors = self.neighbors(coord);
        is_passable_stitched(with_neighbors(center, neighbors), rect, own, pred)
    }

    /// [`World::is_passable_at`] through the cache.
    pub fn is_passable_at<P>(
        &mut self,
        at: Point,
        size: BoxSize,
        own: Option<ObjectId>,
        pred: &P,
    ) -> bool
    where
        P: Fn(&CollisionTag) -> SearchContinue + ?Sized,
    {
        self.is_passable(at.chunk(), &mover_box(at, size), own, pred)
    }

    /// Number of chunk coordinates looked up so far.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether nothing has been looked up yet.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl fmt::Debug for SearchCache<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCache")
            .field("chunks", &self.chunks.len())
            .field("neighbors", &self.neighbors.len())
            .finish_non_exhaustive()
    }
}
