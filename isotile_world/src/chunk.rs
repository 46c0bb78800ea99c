// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chunks: 16×16 tiles, their objects, and the collision index built from both.

use core::cell::{Cell, Ref, RefCell};

use bitflags::bitflags;
use isotile_index::Aabb2D;
use kurbo::Rect;

use crate::bbox::{MAX_WALL_DEPTH, from_aabb, to_aabb, wall_north, wall_west, whole_tile};
use crate::chunk_index::ChunkIndex;
use crate::collision::{CollisionTag, GeometryPart, ObjectId};
use crate::coords::{ChunkCoords, LocalCoords, Point, TILE_COUNT};
use crate::hole::CutResult;
use crate::object::Object;
use crate::pass_mode::PassMode;
use crate::region::PassRegion;

bitflags! {
    /// Caches of a chunk that are stale.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ChunkFlags: u8 {
        /// The collision index must be rebuilt.
        const PASSABILITY = 1 << 0;
        /// The pass region must be recomputed.
        const REGION = 1 << 1;
    }
}

/// A wall along one edge of a tile.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wall {
    /// How much the wall lets through.
    pub pass: PassMode,
    /// Thickness in pixels, reaching out of the tile.
    pub depth: f64,
}

impl Wall {
    /// Create a wall.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is outside `0..=MAX_WALL_DEPTH`.
    pub fn new(pass: PassMode, depth: f64) -> Self {
        assert!(
            (0.0..=MAX_WALL_DEPTH).contains(&depth),
            "wall depth {depth} out of range"
        );
        Self { pass, depth }
    }
}

/// Terrain of one tile.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    /// Ground, if the tile has collidable ground.
    pub ground: Option<PassMode>,
    /// Wall on the north edge.
    pub wall_north: Option<Wall>,
    /// Wall on the west edge.
    pub wall_west: Option<Wall>,
}

/// One chunk of the world.
///
/// The collision index is rebuilt lazily: edits only mark the chunk, and the
/// first query afterwards pays for the rebuild.
#[derive(Debug)]
pub struct Chunk {
    coord: ChunkCoords,
    tiles: Vec<Tile>,
    objects: Vec<Object>,
    index: RefCell<ChunkIndex>,
    region: RefCell<Option<PassRegion>>,
    flags: Cell<ChunkFlags>,
}

impl Chunk {
    /// An empty chunk.
    pub fn new(coord: ChunkCoords) -> Self {
        Self {
            coord,
            tiles: vec![Tile::default(); TILE_COUNT],
            objects: Vec::new(),
            index: RefCell::new(ChunkIndex::new()),
            region: RefCell::new(None),
            flags: Cell::new(ChunkFlags::all()),
        }
    }

    /// Coordinates of the chunk.
    pub fn coord(&self) -> ChunkCoords {
        self.coord
    }

    /// Terrain of a tile.
    pub fn tile(&self, local: LocalCoords) -> &Tile {
        &self.tiles[local.index()]
    }

    /// Replace the terrain of a tile.
    pub fn set_tile(&mut self, local: LocalCoords, tile: Tile) {
        self.tiles[local.index()] = tile;
        self.mark_passability_modified();
    }

    /// Set or clear the ground of a tile.
    pub fn set_ground(&mut self, local: LocalCoords, ground: Option<PassMode>) {
        self.tiles[local.index()].ground = ground;
        self.mark_passability_modified();
    }

    /// Set or clear the north wall of a tile.
    pub fn set_wall_north(&mut self, local: LocalCoords, wall: Option<Wall>) {
        self.tiles[local.index()].wall_north = wall;
        self.mark_passability_modified();
    }

    /// Set or clear the west wall of a tile.
    pub fn set_wall_west(&mut self, local: LocalCoords, wall: Option<Wall>) {
        self.tiles[local.index()].wall_west = wall;
        self.mark_passability_modified();
    }

    /// Objects in the chunk, sorted by id.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Look up an object of this chunk.
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        let i = self.objects.binary_search_by_key(&id, Object::id).ok()?;
        Some(&self.objects[i])
    }

    /// Current stale-cache flags.
    pub fn flags(&self) -> ChunkFlags {
        self.flags.get()
    }

    /// Whether the collision index awaits a rebuild.
    pub fn is_passability_modified(&self) -> bool {
        self.flags.get().contains(ChunkFlags::PASSABILITY)
    }

    /// Force a rebuild of the collision index before the next query.
    pub fn mark_passability_modified(&mut self) {
        self.mark(ChunkFlags::PASSABILITY | ChunkFlags::REGION);
    }

    /// Force the pass region to be recomputed.
    pub fn mark_region_modified(&mut self) {
        self.mark(ChunkFlags::REGION);
    }

    /// Rebuild the collision index if the chunk is marked.
    pub fn ensure_passability(&self) {
        let flags = self.flags.get();
        if !flags.contains(ChunkFlags::PASSABILITY) {
            return;
        }
        self.flags.set(flags - ChunkFlags::PASSABILITY);

        let holes: Vec<Aabb2D<f64>> = self
            .objects
            .iter()
            .filter_map(|o| o.hole_box().map(|r| to_aabb(&r)))
            .collect();

        let mut index = self.index.borrow_mut();
        index.begin_rebuild();
        let mut pieces = Vec::new();
        for local in LocalCoords::all() {
            let tile = &self.tiles[local.index()];
            let geometry = [
                tile.ground
                    .map(|pass| (whole_tile(local), GeometryPart::Ground, pass)),
                tile.wall_north.map(|w| {
                    (wall_north(local, w.depth), GeometryPart::WallNorth, w.pass)
                }),
                tile.wall_west
                    .map(|w| (wall_west(local, w.depth), GeometryPart::WallWest, w.pass)),
            ];
            for (rect, part, pass) in geometry.into_iter().flatten() {
                if !pass.is_blocking() {
                    continue;
                }
                let tag = CollisionTag::geometry(local, part, pass);
                cut_holes(to_aabb(&rect), &holes, &mut pieces);
                for piece in pieces.drain(..) {
                    index.insert_geometry(from_aabb(&piece), tag);
                }
            }
        }
        for object in &self.objects {
            if let Some(rect) = object.collision_box() {
                index.set_object(object.id(), Some((rect, object.tag())));
            }
        }
        log::debug!(
            "rebuilt collision index of chunk {:?}: {} boxes, {} holes",
            self.coord,
            index.len(),
            holes.len()
        );
    }

    /// The collision index, rebuilt first if needed.
    pub fn collision_index(&self) -> Ref<'_, ChunkIndex> {
        self.ensure_passability();
        self.index.borrow()
    }

    /// Visit collision boxes that intersect `rect`, in this chunk's frame.
    ///
    /// Stops as soon as `f` returns `false`; returns `false` if stopped early.
    pub fn search<F>(&self, rect: &Rect, f: F) -> bool
    where
        F: FnMut(&CollisionTag, &Rect) -> bool,
    {
        self.collision_index().search(rect, f)
    }

    pub(crate) fn insert_object(&mut self, object: Object) {
        let i = match self.objects.binary_search_by_key(&object.id(), Object::id) {
            Ok(i) => {
                self.objects[i] = object;
                i
            }
            Err(i) => {
                self.objects.insert(i, object);
                i
            }
        };
        let after = self.objects[i];
        self.sync_object(None, Some(&after));
    }

    pub(crate) fn remove_object(&mut self, id: ObjectId) -> Option<Object> {
        let i = self.objects.binary_search_by_key(&id, Object::id).ok()?;
        let before = self.objects.remove(i);
        self.sync_object(Some(&before), None);
        Some(before)
    }

    /// Move an object to another spot inside this chunk.
    pub(crate) fn move_object(&mut self, id: ObjectId, to: Point) -> bool {
        debug_assert_eq!(to.chunk(), self.coord, "object must stay in its chunk");
        let Ok(i) = self.objects.binary_search_by_key(&id, Object::id) else {
            return false;
        };
        let before = self.objects[i];
        self.objects[i].set_position(to);
        let after = self.objects[i];
        self.sync_object(Some(&before), Some(&after));
        true
    }

    pub(crate) fn cached_region(&self) -> Option<PassRegion> {
        if self.flags.get().contains(ChunkFlags::REGION) {
            return None;
        }
        self.region.borrow().clone()
    }

    pub(crate) fn store_region(&self, region: PassRegion) {
        *self.region.borrow_mut() = Some(region);
        self.flags.set(self.flags.get() - ChunkFlags::REGION);
    }

    fn mark(&self, flags: ChunkFlags) {
        self.flags.set(self.flags.get() | flags);
    }

    /// Keep the index in step with one object change.
    ///
    /// Dynamic objects are patched in place while the index is fresh; anything
    /// else marks the chunk for a rebuild.
    fn sync_object(&mut self, before: Option<&Object>, after: Option<&Object>) {
        self.mark(ChunkFlags::REGION);
        if self.is_passability_modified() {
            return;
        }
        let incremental =
            before.is_none_or(Object::is_dynamic) && after.is_none_or(Object::is_dynamic);
        if !incremental {
            self.mark_passability_modified();
            return;
        }
        let Some(id) = after.or(before).map(Object::id) else {
            return;
        };
        let entry = after.and_then(|o| o.collision_box().map(|r| (r, o.tag())));
        self.index.get_mut().set_object(id, entry);
        log::trace!("updated box of {id:?} in chunk {:?} in place", self.coord);
    }
}

/// Cut every hole out of `rect`, appending the remaining pieces to `out`.
fn cut_holes(rect: Aabb2D<f64>, holes: &[Aabb2D<f64>], out: &mut Vec<Aabb2D<f64>>) {
    out.push(rect);
    for hole in holes {
        let mut i = 0;
        while i < out.len() {
            let cut = CutResult::cut(out[i], *hole);
            if !cut.found() {
                i += 1;
                continue;
            }
            out.swap_remove(i);
            out.extend(cut.iter().copied());
        }
    }
}
