// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whether a box is free of blocking collision boxes, across chunk borders.
//!
//! Boxes stored in a chunk can reach into neighboring chunks, so a query near
//! a border also visits the neighbors, with the query shifted into each
//! neighbor's pixel frame.

use kurbo::Rect;

use crate::bbox::{BoxSize, CHUNK_BOUNDS, chunk_shift, mover_box, overlaps};
use crate::chunk::Chunk;
use crate::collision::{CollisionTag, ObjectId};
use crate::coords::{ChunkCoords, NEIGHBOR_OFFSETS, Point};
use crate::pass_mode::Blocks;
use crate::world::World;

/// Verdict of a passability predicate on one overlapping box.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchContinue {
    /// The box does not block; keep looking.
    Pass,
    /// The box blocks; the query fails.
    Blocked,
}

/// Every overlapping box blocks.
pub fn blocked_by_any(_: &CollisionTag) -> SearchContinue {
    SearchContinue::Blocked
}

/// Nothing blocks.
pub fn pass_through_all(_: &CollisionTag) -> SearchContinue {
    SearchContinue::Pass
}

/// Boxes whose pass mode stops any of `traffic` block.
pub fn blocked_by(traffic: Blocks) -> impl Fn(&CollisionTag) -> SearchContinue + Copy {
    move |tag| {
        if tag.pass.blocks().intersects(traffic) {
            SearchContinue::Blocked
        } else {
            SearchContinue::Pass
        }
    }
}

/// Whether `rect`, in `chunk`'s frame, is free inside that one chunk.
///
/// Boxes owned by `own`, boxes that only touch `rect`, and boxes the
/// predicate lets through are ignored.
pub fn is_passable_1<P>(chunk: &Chunk, rect: &Rect, own: Option<ObjectId>, pred: &P) -> bool
where
    P: Fn(&CollisionTag) -> SearchContinue + ?Sized,
{
    if !overlaps(rect, &CHUNK_BOUNDS) {
        return true;
    }
    chunk.search(rect, |tag, r| {
        if tag.is_owned_by(own) || !tag.pass.is_blocking() || !overlaps(r, rect) {
            return true;
        }
        pred(tag) == SearchContinue::Pass
    })
}

/// Whether `rect` is free in every given chunk.
///
/// Each chunk comes with its offset, in chunks, from the chunk whose frame
/// `rect` is expressed in. The answer does not depend on the order.
pub fn is_passable_stitched<'a, I, P>(
    chunks: I,
    rect: &Rect,
    own: Option<ObjectId>,
    pred: &P,
) -> bool
where
    I: IntoIterator<Item = ((i32, i32), &'a Chunk)>,
    P: Fn(&CollisionTag) -> SearchContinue + ?Sized,
{
    chunks
        .into_iter()
        .all(|((dx, dy), chunk)| is_passable_1(chunk, &(*rect - chunk_shift(dx, dy)), own, pred))
}

/// A chunk and its loaded neighbors, with their offsets.
pub(crate) fn with_neighbors<'a>(
    center: Option<&'a Chunk>,
    neighbors: [Option<&'a Chunk>; 8],
) -> impl Iterator<Item = ((i32, i32), &'a Chunk)> {
    center
        .map(|c| ((0, 0), c))
        .into_iter()
        .chain(
            NEIGHBOR_OFFSETS
                .into_iter()
                .zip(neighbors)
                .filter_map(|(off, c)| c.map(|c| (off, c))),
        )
}

impl World {
    /// Whether `rect`, in the frame of chunk `coord`, is free.
    ///
    /// Missing chunks contribute nothing.
    pub fn is_passable<P>(
        &self,
        coord: ChunkCoords,
        rect: &Rect,
        own: Option<ObjectId>,
        pred: &P,
    ) -> bool
    where
        P: Fn(&CollisionTag) -> SearchContinue + ?Sized,
    {
        let chunks = with_neighbors(self.chunk_at(coord), self.neighbors(coord));
        is_passable_stitched(chunks, rect, own, pred)
    }

    /// Whether a mover of `size` centered on `at` is free.
    pub fn is_passable_at<P>(
        &self,
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
}
