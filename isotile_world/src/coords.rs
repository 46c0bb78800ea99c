// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chunk, tile, and sub-tile pixel coordinates.
//!
//! A world position is a [`Point`]: a chunk, a tile within the chunk, and a
//! pixel offset from the tile center. Tile `(x, y)` of a chunk is centered on
//! local pixel `(64 x, 64 y)`, so a chunk covers `[-32, 992)` on each axis of
//! its own pixel frame.

use core::cmp::Ordering;

use kurbo::Vec2;

/// Width and height of a tile, in pixels.
pub const TILE_SIZE: i32 = 64;

/// Half a tile, in pixels.
pub const HALF_TILE: i32 = TILE_SIZE / 2;

/// Tiles per chunk along each axis.
pub const TILE_MAX_DIM: u8 = 16;

/// Tiles per chunk.
pub const TILE_COUNT: usize = TILE_MAX_DIM as usize * TILE_MAX_DIM as usize;

/// Width and height of a chunk, in pixels.
pub const CHUNK_SIZE: i32 = TILE_SIZE * TILE_MAX_DIM as i32;

/// Offsets of the eight neighbors of a chunk, in the order
/// [`World::neighbors`](crate::World::neighbors) reports them.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Position of a chunk in the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkCoords {
    /// Chunk column.
    pub x: i16,
    /// Chunk row.
    pub y: i16,
    /// Floor level.
    pub z: i8,
}

impl ChunkCoords {
    /// Create chunk coordinates.
    pub const fn new(x: i16, y: i16, z: i8) -> Self {
        Self { x, y, z }
    }

    /// The chunk `(dx, dy)` chunks away on the same floor.
    ///
    /// # Panics
    ///
    /// Panics if the result leaves the `i16` chunk range.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        self.checked_offset(dx, dy).expect("chunk out of range")
    }

    /// The chunk `(dx, dy)` chunks away, or `None` past the edge of the world.
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = i16::try_from(i32::from(self.x).checked_add(dx)?).ok()?;
        let y = i16::try_from(i32::from(self.y).checked_add(dy)?).ok()?;
        Some(Self { x, y, z: self.z })
    }

    /// How many chunks `other` lies from `self`, ignoring z.
    pub fn delta(self, other: Self) -> (i32, i32) {
        (
            i32::from(other.x) - i32::from(self.x),
            i32::from(other.y) - i32::from(self.y),
        )
    }
}

impl Ord for ChunkCoords {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.z, self.y, self.x).cmp(&(other.z, other.y, other.x))
    }
}

impl PartialOrd for ChunkCoords {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Position of a tile within its chunk; both axes are below [`TILE_MAX_DIM`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "(u8, u8)", into = "(u8, u8)")
)]
pub struct LocalCoords {
    x: u8,
    y: u8,
}

impl LocalCoords {
    /// Create local coordinates.
    ///
    /// # Panics
    ///
    /// Panics if either axis is not below [`TILE_MAX_DIM`].
    pub const fn new(x: u8, y: u8) -> Self {
        assert!(
            x < TILE_MAX_DIM && y < TILE_MAX_DIM,
            "local coordinates out of range"
        );
        Self { x, y }
    }

    /// Local coordinates, or `None` if either axis is not below [`TILE_MAX_DIM`].
    pub const fn checked_new(x: u8, y: u8) -> Option<Self> {
        if x < TILE_MAX_DIM && y < TILE_MAX_DIM {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// The tile at a row-major index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`TILE_COUNT`].
    #[allow(
        clippy::cast_possible_truncation,
        reason = "index is checked against TILE_COUNT, so both parts fit in u8"
    )]
    pub const fn from_index(index: usize) -> Self {
        assert!(index < TILE_COUNT, "tile index out of range");
        let dim = TILE_MAX_DIM as usize;
        Self {
            x: (index % dim) as u8,
            y: (index / dim) as u8,
        }
    }

    /// Column.
    pub const fn x(self) -> u8 {
        self.x
    }

    /// Row.
    pub const fn y(self) -> u8 {
        self.y
    }

    /// Row-major index in `0..TILE_COUNT`.
    pub const fn index(self) -> usize {
        self.y as usize * TILE_MAX_DIM as usize + self.x as usize
    }

    /// Center of the tile in its chunk's pixel frame.
    pub const fn center_px(self) -> (i32, i32) {
        (self.x as i32 * TILE_SIZE, self.y as i32 * TILE_SIZE)
    }

    /// Every tile of a chunk, row by row.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..TILE_COUNT).map(Self::from_index)
    }
}

impl TryFrom<(u8, u8)> for LocalCoords {
    type Error = &'static str;

    fn try_from((x, y): (u8, u8)) -> Result<Self, Self::Error> {
        Self::checked_new(x, y).ok_or("local coordinates out of range")
    }
}

impl From<LocalCoords> for (u8, u8) {
    fn from(l: LocalCoords) -> Self {
        (l.x, l.y)
    }
}

impl Ord for LocalCoords {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for LocalCoords {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A small pixel displacement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelOffset {
    /// Horizontal pixels.
    pub x: i8,
    /// Vertical pixels.
    pub y: i8,
}

impl PixelOffset {
    /// Create an offset.
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }
}

/// A pixel-precise world position.
///
/// The offset from the tile center is always normalized into `[-32, 31]` on
/// each axis, so every pixel has exactly one representation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        try_from = "(ChunkCoords, LocalCoords, PixelOffset)",
        into = "(ChunkCoords, LocalCoords, PixelOffset)"
    )
)]
pub struct Point {
    chunk: ChunkCoords,
    local: LocalCoords,
    offset: PixelOffset,
}

impl Point {
    /// Create a point, carrying an out-of-range offset into neighboring tiles.
    pub fn new(chunk: ChunkCoords, local: LocalCoords, offset: PixelOffset) -> Self {
        Self::at_tile(chunk, local).normalize(offset.x.into(), offset.y.into())
    }

    /// The center of a tile.
    pub const fn at_tile(chunk: ChunkCoords, local: LocalCoords) -> Self {
        Self {
            chunk,
            local,
            offset: PixelOffset::new(0, 0),
        }
    }

    /// The point's chunk.
    pub const fn chunk(self) -> ChunkCoords {
        self.chunk
    }

    /// The point's tile within its chunk.
    pub const fn local(self) -> LocalCoords {
        self.local
    }

    /// The point's offset from its tile center, in `[-32, 31]`.
    pub const fn offset(self) -> PixelOffset {
        self.offset
    }

    /// Position in the chunk's pixel frame.
    pub const fn local_px(self) -> (i32, i32) {
        let (cx, cy) = self.local.center_px();
        (cx + self.offset.x as i32, cy + self.offset.y as i32)
    }

    /// Position in world pixels, ignoring z.
    pub fn global_px(self) -> (i64, i64) {
        let tile = i64::from(TILE_SIZE);
        let dim = i64::from(TILE_MAX_DIM);
        let tx = i64::from(self.chunk.x) * dim + i64::from(self.local.x);
        let ty = i64::from(self.chunk.y) * dim + i64::from(self.local.y);
        (
            tx * tile + i64::from(self.offset.x),
            ty * tile + i64::from(self.offset.y),
        )
    }

    /// The point at world pixel `(x, y)` on floor `z`.
    ///
    /// # Panics
    ///
    /// Panics if the pixel lies outside the `i16` chunk range.
    pub fn from_global_px(x: i64, y: i64, z: i8) -> Self {
        Self::checked_from_global_px(x, y, z).expect("point leaves the world")
    }

    /// The point at world pixel `(x, y)` on floor `z`, or `None` outside the
    /// `i16` chunk range.
    pub fn checked_from_global_px(x: i64, y: i64, z: i8) -> Option<Self> {
        let (cx, lx, ox) = split_axis(x);
        let (cy, ly, oy) = split_axis(y);
        Some(Self {
            chunk: ChunkCoords {
                x: i16::try_from(cx).ok()?,
                y: i16::try_from(cy).ok()?,
                z,
            },
            local: LocalCoords { x: lx, y: ly },
            offset: PixelOffset { x: ox, y: oy },
        })
    }

    /// Move by a pixel delta, carrying into tiles and chunks.
    ///
    /// Moving by deltas that sum to zero returns exactly the starting point.
    ///
    /// # Panics
    ///
    /// Panics if the result leaves the `i16` chunk range; see
    /// [`checked_normalize`](Self::checked_normalize).
    pub fn normalize(self, dx: i32, dy: i32) -> Self {
        self.checked_normalize(dx, dy).expect("point leaves the world")
    }

    /// Move by a pixel delta, or `None` past the edge of the world.
    pub fn checked_normalize(self, dx: i32, dy: i32) -> Option<Self> {
        let (x, y) = self.global_px();
        Self::checked_from_global_px(x + i64::from(dx), y + i64::from(dy), self.chunk.z)
    }

    /// Pixel displacement from `self` to `to`, ignoring z.
    pub fn pixel_delta(self, to: Self) -> (i64, i64) {
        let (ax, ay) = self.global_px();
        let (bx, by) = to.global_px();
        (bx - ax, by - ay)
    }

    /// Pixel displacement from `self` to `to` as a vector.
    #[allow(
        clippy::cast_precision_loss,
        reason = "pixel deltas within the i16 chunk range are far below 2^52"
    )]
    pub fn vec_to(self, to: Self) -> Vec2 {
        let (dx, dy) = self.pixel_delta(to);
        Vec2::new(dx as f64, dy as f64)
    }

    /// Euclidean pixel distance to `to`, rounded down.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "distances are saturated into u32"
    )]
    pub fn distance(self, to: Self) -> u32 {
        let d = self.vec_to(to).hypot().floor();
        if d >= f64::from(u32::MAX) { u32::MAX } else { d as u32 }
    }

    /// Sum of the absolute pixel deltas to `to`, saturated into `u32`.
    pub fn manhattan(self, to: Self) -> u32 {
        let (dx, dy) = self.pixel_delta(to);
        u32::try_from(dx.unsigned_abs() + dy.unsigned_abs()).unwrap_or(u32::MAX)
    }
}

impl TryFrom<(ChunkCoords, LocalCoords, PixelOffset)> for Point {
    type Error = &'static str;

    /// Carries an out-of-range offset like [`Point::new`], failing only past
    /// the edge of the world.
    fn try_from(
        (chunk, local, offset): (ChunkCoords, LocalCoords, PixelOffset),
    ) -> Result<Self, Self::Error> {
        Self::at_tile(chunk, local)
            .checked_normalize(offset.x.into(), offset.y.into())
            .ok_or("point leaves the world")
    }
}

impl From<Point> for (ChunkCoords, LocalCoords, PixelOffset) {
    fn from(p: Point) -> Self {
        (p.chunk, p.local, p.offset)
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chunk
            .cmp(&other.chunk)
            .then_with(|| self.local.cmp(&other.local))
            .then_with(|| (self.offset.y, self.offset.x).cmp(&(other.offset.y, other.offset.x)))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "rem_euclid bounds the tile and offset parts"
)]
fn split_axis(px: i64) -> (i64, u8, i8) {
    let shifted = px + i64::from(HALF_TILE);
    let tile = shifted.div_euclid(i64::from(TILE_SIZE));
    let offset = shifted.rem_euclid(i64::from(TILE_SIZE)) - i64::from(HALF_TILE);
    let dim = i64::from(TILE_MAX_DIM);
    (
        tile.div_euclid(dim),
        tile.rem_euclid(dim) as u8,
        offset as i8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: ChunkCoords = ChunkCoords::new(0, 0, 0);

    #[test]
    fn normalize_carries_into_tiles_and_chunks() {
        let p = Point::at_tile(ORIGIN, LocalCoords::new(15, 0));
        let q = p.normalize(32, -33);
        assert_eq!(q.chunk(), ChunkCoords::new(1, -1, 0));
        assert_eq!(q.local(), LocalCoords::new(0, 15));
        assert_eq!(q.offset(), PixelOffset::new(-32, 31));
        assert_eq!(p.normalize(31, 0).offset(), PixelOffset::new(31, 0));
        assert_eq!(p.normalize(31, 0).local(), LocalCoords::new(15, 0));
    }

    #[test]
    fn deltas_summing_to_zero_return_the_same_point() {
        let start = Point::new(
            ChunkCoords::new(-3, 2, 1),
            LocalCoords::new(7, 12),
            PixelOffset::new(-5, 30),
        );
        let deltas = [
            (1000, -3),
            (-64, 64),
            (-33, 17),
            (5000, 5000),
            (-1, 1),
            (31, -32),
        ];
        let mut p = start;
        for &(dx, dy) in &deltas {
            p = p.normalize(dx, dy);
            assert!((-32..32).contains(&p.offset().x), "offset normalized");
        }
        let (sx, sy) = deltas
            .iter()
            .fold((0, 0), |(ax, ay), &(dx, dy)| (ax + dx, ay + dy));
        assert_eq!(p.normalize(-sx, -sy), start);
        for &(dx, dy) in deltas.iter().rev() {
            p = p.normalize(-dx, -dy);
        }
        assert_eq!(p, start);
    }

    #[test]
    fn new_normalizes_wide_offsets() {
        let p = Point::new(ORIGIN, LocalCoords::new(0, 0), PixelOffset::new(-100, 100));
        assert_eq!(p.global_px(), (-100, 100));
        assert_eq!(p.chunk(), ChunkCoords::new(-1, 0, 0));
        assert_eq!(p.local(), LocalCoords::new(14, 2));
        assert_eq!(p.offset(), PixelOffset::new(28, -28));
    }

    #[test]
    fn distances() {
        let a = Point::at_tile(ORIGIN, LocalCoords::new(0, 0));
        let b = a.normalize(30, 40);
        assert_eq!(a.distance(b), 50);
        assert_eq!(a.manhattan(b), 70);
        assert_eq!(b.pixel_delta(a), (-30, -40));
    }

    #[test]
    fn ordering_is_z_then_y_then_x() {
        let a = Point::at_tile(ChunkCoords::new(5, 0, 0), LocalCoords::new(0, 0));
        let b = Point::at_tile(ChunkCoords::new(0, 1, 0), LocalCoords::new(0, 0));
        let c = Point::at_tile(ChunkCoords::new(0, 0, 1), LocalCoords::new(0, 0));
        assert!(a < b && b < c);
        let d = Point::new(ORIGIN, LocalCoords::new(3, 1), PixelOffset::new(0, -1));
        let e = Point::new(ORIGIN, LocalCoords::new(2, 1), PixelOffset::new(5, 0));
        assert!(e < d);
    }

    #[test]
    fn local_index_round_trip() {
        for (i, l) in LocalCoords::all().enumerate() {
            assert_eq!(l.index(), i);
        }
        assert_eq!(LocalCoords::from_index(17), LocalCoords::new(1, 1));
    }

    #[test]
    fn the_edge_of_the_world_is_checked() {
        let edge = Point::new(
            ChunkCoords::new(i16::MAX, i16::MIN, 0),
            LocalCoords::new(15, 0),
            PixelOffset::new(24, -24),
        );
        assert_eq!(edge.checked_normalize(7, 0), Some(edge.normalize(7, 0)));
        assert_eq!(edge.checked_normalize(8, 0), None);
        assert_eq!(edge.checked_normalize(0, -9), None);
        assert_eq!(edge.checked_normalize(-8, 8), Some(edge.normalize(-8, 8)));
        assert_eq!(Point::checked_from_global_px(i64::MIN / 4, 0, 0), None);
        assert_eq!(LocalCoords::checked_new(15, 16), None);
        assert_eq!(LocalCoords::try_from((3, 4)), Ok(LocalCoords::new(3, 4)));
        assert!(LocalCoords::try_from((200, 4)).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializing_checks_ranges() {
        let bytes = bincode::serialize(&(200_u8, 3_u8)).expect("serialize");
        assert!(bincode::deserialize::<LocalCoords>(&bytes).is_err());

        let raw = (ORIGIN, (0_u8, 0_u8), PixelOffset::new(-100, 100));
        let bytes = bincode::serialize(&raw).expect("serialize");
        let p: Point = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(p, Point::new(ORIGIN, LocalCoords::new(0, 0), PixelOffset::new(-100, 100)));

        let q = Point::new(
            ChunkCoords::new(-4, 9, 2),
            LocalCoords::new(7, 12),
            PixelOffset::new(3, -8),
        );
        let bytes = bincode::serialize(&q).expect("serialize");
        assert_eq!(bincode::deserialize::<Point>(&bytes).ok(), Some(q));
    }
}
