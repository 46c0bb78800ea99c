// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision boxes of tiles, walls, objects, and movers.
//!
//! Every box is expressed in the pixel frame of the chunk that owns it.

use isotile_index::Aabb2D;
use kurbo::{Point as KPoint, Rect, Vec2};

use crate::coords::{CHUNK_SIZE, HALF_TILE, LocalCoords, PixelOffset, Point, TILE_SIZE};

/// Walls are grown by this much on every side so adjacent wall boxes overlap.
pub const WALL_EPSILON: f64 = 0.25;

/// Deepest wall a tile may carry, in pixels.
pub const MAX_WALL_DEPTH: f64 = TILE_SIZE as f64;

/// How far any stored box can reach past the tile grid: a full offset, a full
/// bbox offset, and half of the largest bbox.
pub const MAX_OVERHANG: i32 = HALF_TILE + 128 + 128;

/// Conservative pixel bounds of everything a chunk can store.
pub const CHUNK_BOUNDS: Rect = Rect::new(
    (-HALF_TILE - MAX_OVERHANG) as f64,
    (-HALF_TILE - MAX_OVERHANG) as f64,
    (CHUNK_SIZE - HALF_TILE + MAX_OVERHANG) as f64,
    (CHUNK_SIZE - HALF_TILE + MAX_OVERHANG) as f64,
);

/// Width and height of a box, in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxSize {
    /// Width.
    pub w: u8,
    /// Height.
    pub h: u8,
}

impl BoxSize {
    /// Create a size.
    pub const fn new(w: u8, h: u8) -> Self {
        Self { w, h }
    }

    /// Whether either side is zero.
    pub const fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.w.max(other.w), self.h.max(other.h))
    }
}

/// Top-left corner of a tile.
pub fn tile_start(local: LocalCoords) -> KPoint {
    let (x, y) = local.center_px();
    KPoint::new(f64::from(x - HALF_TILE), f64::from(y - HALF_TILE))
}

/// The whole tile.
pub fn whole_tile(local: LocalCoords) -> Rect {
    let size = f64::from(TILE_SIZE);
    Rect::from_origin_size(tile_start(local), (size, size))
}

/// A wall along the north edge of a tile, `depth` pixels thick, extending north.
pub fn wall_north(local: LocalCoords, depth: f64) -> Rect {
    let s = tile_start(local);
    Rect::new(s.x, s.y - depth, s.x + f64::from(TILE_SIZE), s.y)
        .inflate(WALL_EPSILON, WALL_EPSILON)
}

/// A wall along the west edge of a tile, `depth` pixels thick, extending west.
pub fn wall_west(local: LocalCoords, depth: f64) -> Rect {
    let s = tile_start(local);
    Rect::new(s.x - depth, s.y, s.x, s.y + f64::from(TILE_SIZE))
        .inflate(WALL_EPSILON, WALL_EPSILON)
}

/// A box of `size` whose center is at integer pixel `(cx, cy)`.
///
/// Odd sizes put the extra pixel on the max side.
pub fn centered_box(cx: i32, cy: i32, size: BoxSize) -> Rect {
    let (w, h) = (i32::from(size.w), i32::from(size.h));
    let (x0, y0) = (cx - w / 2, cy - h / 2);
    Rect::new(
        f64::from(x0),
        f64::from(y0),
        f64::from(x0 + w),
        f64::from(y0 + h),
    )
}

/// Collision box of an object standing on `local`.
pub fn object_box(
    local: LocalCoords,
    offset: PixelOffset,
    bbox_offset: PixelOffset,
    size: BoxSize,
) -> Rect {
    let (cx, cy) = local.center_px();
    centered_box(
        cx + i32::from(offset.x) + i32::from(bbox_offset.x),
        cy + i32::from(offset.y) + i32::from(bbox_offset.y),
        size,
    )
}

/// A mover's box centered on `at`, in `at`'s chunk frame.
pub fn mover_box(at: Point, size: BoxSize) -> Rect {
    let (x, y) = at.local_px();
    centered_box(x, y, size)
}

/// Pixel shift that takes a position in a chunk `(dx, dy)` chunks away into
/// the current chunk's frame.
pub fn chunk_shift(dx: i32, dy: i32) -> Vec2 {
    Vec2::new(f64::from(dx * CHUNK_SIZE), f64::from(dy * CHUNK_SIZE))
}

/// Box swept by a mover going from `from` to `to`, in `to`'s chunk frame.
pub fn swept_box(to: Point, from: Point, size: BoxSize) -> Rect {
    let (dx, dy) = to.chunk().delta(from.chunk());
    let start = mover_box(from, size) + chunk_shift(dx, dy);
    mover_box(to, size).union(start)
}

/// Whether two boxes share a region of positive area.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Convert to the index's box type.
pub fn to_aabb(r: &Rect) -> Aabb2D<f64> {
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

/// Convert from the index's box type.
pub fn from_aabb(a: &Aabb2D<f64>) -> Rect {
    Rect::new(a.min_x, a.min_y, a.max_x, a.max_y)
}
