// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The set of loaded chunks and the objects living in them.

use core::cell::Cell;
use std::collections::HashMap;

use crate::chunk::Chunk;
use crate::collision::ObjectId;
use crate::coords::{ChunkCoords, NEIGHBOR_OFFSETS, Point};
use crate::object::{Object, ObjectProto};
use crate::pass_mode::PassMode;
use crate::passability::blocked_by_any;

/// Id handed to the first object made in a world.
pub const FIRST_OBJECT_ID: u64 = 1024;

/// Chunks by coordinate, plus object bookkeeping.
///
/// A `World` is single-threaded: chunk caches are rebuilt through shared
/// references.
#[derive(Debug)]
pub struct World {
    chunks: Vec<Chunk>,
    lookup: HashMap<ChunkCoords, usize>,
    last: Cell<Option<(ChunkCoords, usize)>>,
    homes: HashMap<ObjectId, ChunkCoords>,
    next_id: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// An empty world.
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            lookup: HashMap::new(),
            last: Cell::new(None),
            homes: HashMap::new(),
            next_id: FIRST_OBJECT_ID,
        }
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Loaded chunks, in storage order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.iter()
    }

    /// The chunk at `coord`, if loaded.
    pub fn chunk_at(&self, coord: ChunkCoords) -> Option<&Chunk> {
        self.slot(coord).map(|i| &self.chunks[i])
    }

    /// The chunk at `coord`, if loaded, for editing.
    pub fn chunk_at_mut(&mut self, coord: ChunkCoords) -> Option<&mut Chunk> {
        self.slot(coord).map(|i| &mut self.chunks[i])
    }

    /// The chunk at `coord`, created empty if missing.
    pub fn ensure_chunk(&mut self, coord: ChunkCoords) -> &mut Chunk {
        let i = match self.slot(coord) {
            Some(i) => i,
            None => {
                self.chunks.push(Chunk::new(coord));
                let i = self.chunks.len() - 1;
                self.lookup.insert(coord, i);
                log::debug!("created chunk {coord:?}");
                i
            }
        };
        &mut self.chunks[i]
    }

    /// Unload a chunk, dropping its objects from the world.
    pub fn remove_chunk(&mut self, coord: ChunkCoords) -> Option<Chunk> {
        let i = self.lookup.remove(&coord)?;
        let chunk = self.chunks.swap_remove(i);
        if let Some(moved) = self.chunks.get(i) {
            self.lookup.insert(moved.coord(), i);
        }
        self.last.set(None);
        for object in chunk.objects() {
            self.homes.remove(&object.id());
        }
        self.invalidate_regions_around(coord);
        log::debug!(
            "removed chunk {coord:?} with {} objects",
            chunk.objects().len()
        );
        Some(chunk)
    }

    /// The eight neighbors of `coord`, in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(&self, coord: ChunkCoords) -> [Option<&Chunk>; 8] {
        NEIGHBOR_OFFSETS.map(|(dx, dy)| {
            coord
                .checked_offset(dx, dy)
                .and_then(|c| self.chunk_at(c))
        })
    }

    /// Place a new object, creating its chunk if needed.
    pub fn make_object(&mut self, proto: ObjectProto, at: Point) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.ensure_chunk(at.chunk())
            .insert_object(Object::new(id, at, proto));
        self.homes.insert(id, at.chunk());
        self.invalidate_regions_around(at.chunk());
        log::trace!("made {id:?} at {at:?}");
        id
    }

    /// Delete an object.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<Object> {
        let coord = self.homes.remove(&id)?;
        let object = self.chunk_at_mut(coord)?.remove_object(id);
        self.invalidate_regions_around(coord);
        object
    }

    /// Look up an object.
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.chunk_at(*self.homes.get(&id)?)?.object(id)
    }

    /// Where an object stands.
    pub fn object_position(&self, id: ObjectId) -> Option<Point> {
        let coord = *self.homes.get(&id)?;
        Some(self.chunk_at(coord)?.object(id)?.position(coord))
    }

    /// Put an object at `to` without any collision check.
    ///
    /// Returns `false` if the object does not exist.
    pub fn teleport_object(&mut self, id: ObjectId, to: Point) -> bool {
        let Some(&from) = self.homes.get(&id) else {
            return false;
        };
        let moved = if from == to.chunk() {
            self.chunk_at_mut(from)
                .is_some_and(|chunk| chunk.move_object(id, to))
        } else {
            let Some(mut object) = self.chunk_at_mut(from).and_then(|c| c.remove_object(id)) else {
                return false;
            };
            object.set_position(to);
            self.ensure_chunk(to.chunk()).insert_object(object);
            self.homes.insert(id, to.chunk());
            self.invalidate_regions_around(from);
            true
        };
        if moved {
            self.invalidate_regions_around(to.chunk());
        }
        moved
    }

    /// Whether the object could stand `(dx, dy)` pixels away from where it is.
    ///
    /// Objects without a collision box can move anywhere short of the edge of
    /// the world.
    pub fn can_move_to(&self, id: ObjectId, dx: i32, dy: i32) -> bool {
        let (Some(object), Some(at)) = (self.object(id), self.object_position(id)) else {
            return false;
        };
        let Some(to) = at.checked_normalize(dx, dy) else {
            return false;
        };
        match object.proto().collision_box(to.local(), to.offset()) {
            Some(rect) => self.is_passable(to.chunk(), &rect, Some(id), &blocked_by_any),
            None => true,
        }
    }

    /// Move an object by `(dx, dy)` pixels if nothing is in the way.
    pub fn move_object(&mut self, id: ObjectId, dx: i32, dy: i32) -> bool {
        if !self.can_move_to(id, dx, dy) {
            return false;
        }
        let Some(to) = self
            .object_position(id)
            .and_then(|at| at.checked_normalize(dx, dy))
        else {
            return false;
        };
        self.teleport_object(id, to)
    }

    /// Whether an object made from `proto` fits at `at`.
    ///
    /// Boxes of `mover` are ignored. Prototypes that movers can walk through
    /// fit anywhere.
    pub fn can_place_object(&self, proto: &ObjectProto, at: Point, mover: Option<ObjectId>) -> bool {
        if matches!(proto.pass, PassMode::Pass | PassMode::ShootThrough) {
            return true;
        }
        match proto.collision_box(at.local(), at.offset()) {
            Some(rect) => self.is_passable(at.chunk(), &rect, mover, &blocked_by_any),
            None => true,
        }
    }

    fn slot(&self, coord: ChunkCoords) -> Option<usize> {
        if let Some((c, i)) = self.last.get()
            && c == coord
        {
            return Some(i);
        }
        let i = *self.lookup.get(&coord)?;
        self.last.set(Some((coord, i)));
        Some(i)
    }

    fn invalidate_regions_around(&mut self, coord: ChunkCoords) {
        for (dx, dy) in core::iter::once((0, 0)).chain(NEIGHBOR_OFFSETS) {
            if let Some(chunk) = coord
                .checked_offset(dx, dy)
                .and_then(|c| self.chunk_at_mut(c))
            {
                chunk.mark_region_modified();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BoxSize;
    use crate::chunk::{ChunkFlags, Wall};
    use crate::coords::{LocalCoords, PixelOffset};

    const ORIGIN: ChunkCoords = ChunkCoords::new(0, 0, 0);

    fn tile(x: u8, y: u8) -> Point {
        Point::at_tile(ORIGIN, LocalCoords::new(x, y))
    }

    #[test]
    fn removal_keeps_lookups_consistent() {
        let mut w = World::new();
        let (a, b, c) = (ORIGIN, ORIGIN.offset(1, 0), ORIGIN.offset(2, 0));
        for coord in [a, b, c] {
            w.ensure_chunk(coord);
        }
        assert_eq!(w.chunk_at(c).map(Chunk::coord), Some(c));
        assert!(w.remove_chunk(a).is_some());
        assert!(w.chunk_at(a).is_none());
        assert_eq!(w.chunk_at(c).map(Chunk::coord), Some(c));
        assert_eq!(w.chunk_at(b).map(Chunk::coord), Some(b));
        assert_eq!(w.len(), 2);
        assert!(w.remove_chunk(a).is_none());
    }

    #[test]
    fn neighbors_follow_offset_order() {
        let mut w = World::new();
        for (dx, dy) in NEIGHBOR_OFFSETS {
            w.ensure_chunk(ORIGIN.offset(dx, dy));
        }
        let n = w.neighbors(ORIGIN);
        for (k, (dx, dy)) in NEIGHBOR_OFFSETS.into_iter().enumerate() {
            assert_eq!(n[k].map(Chunk::coord), Some(ORIGIN.offset(dx, dy)));
        }
        let edge = ChunkCoords::new(i16::MAX, 0, 0);
        assert!(w.neighbors(edge).iter().all(Option::is_none));
    }

    #[test]
    fn objects_move_between_chunks() {
        let mut w = World::new();
        let critter = ObjectProto::critter(BoxSize::new(32, 32));
        let a = w.make_object(critter, tile(15, 3));
        let b = w.make_object(critter, tile(1, 1));
        assert_eq!((a, b), (ObjectId(1024), ObjectId(1025)));

        let there = Point::at_tile(ORIGIN.offset(1, 0), LocalCoords::new(0, 3));
        assert!(w.teleport_object(a, there));
        assert_eq!(w.object_position(a), Some(there));
        assert!(w.chunk_at(ORIGIN).is_some_and(|c| c.object(a).is_none()));
        assert_eq!(w.object(a).map(Object::id), Some(a));

        assert!(w.move_object(a, -40, 0));
        assert_eq!(
            w.object_position(a),
            Some(Point::new(ORIGIN, LocalCoords::new(15, 3), PixelOffset::new(24, 0)))
        );

        assert_eq!(w.remove_object(a).map(|o| o.id()), Some(a));
        assert!(w.object(a).is_none());
        assert!(!w.teleport_object(a, there));
    }

    #[test]
    fn walls_stop_movement_across_chunks() {
        let mut w = World::new();
        w.ensure_chunk(ORIGIN);
        w.ensure_chunk(ORIGIN.offset(1, 0))
            .set_wall_west(LocalCoords::new(0, 5), Some(Wall::new(PassMode::Blocked, 8.0)));
        let id = w.make_object(ObjectProto::critter(BoxSize::new(32, 32)), tile(15, 5));
        assert!(w.can_move_to(id, 4, 0));
        assert!(!w.can_move_to(id, 24, 0));
        assert!(!w.move_object(id, 24, 0));
        assert_eq!(w.object_position(id), Some(tile(15, 5)));
    }

    #[test]
    fn walls_stop_movement_inside_a_chunk() {
        let mut w = World::new();
        w.ensure_chunk(ORIGIN)
            .set_wall_north(LocalCoords::new(5, 5), Some(Wall::new(PassMode::Blocked, 8.0)));
        let id = w.make_object(ObjectProto::critter(BoxSize::new(32, 32)), tile(5, 5));
        assert!(w.can_move_to(id, 0, -8));
        assert!(!w.can_move_to(id, 0, -24));
    }

    #[test]
    fn objects_stop_at_the_edge_of_the_world() {
        let mut w = World::new();
        let edge = ChunkCoords::new(i16::MAX, 0, 0);
        let at = Point::new(edge, LocalCoords::new(15, 5), PixelOffset::new(24, 0));
        let id = w.make_object(ObjectProto::critter(BoxSize::new(32, 32)), at);
        assert!(w.can_move_to(id, 7, 0));
        assert!(!w.can_move_to(id, 8, 0));
        assert!(!w.move_object(id, 40, 0));
        assert_eq!(w.object_position(id), Some(at));
        assert!(w.move_object(id, -64, 0));
        assert_eq!(w.object_position(id), Some(at.normalize(-64, 0)));
    }

    #[test]
    fn placement_ignores_the_mover() {
        let mut w = World::new();
        let proto = ObjectProto::critter(BoxSize::new(32, 32));
        let id = w.make_object(proto, tile(4, 4));
        assert!(!w.can_place_object(&proto, tile(4, 4), None));
        assert!(w.can_place_object(&proto, tile(4, 4), Some(id)));
        assert!(w.can_place_object(&proto, tile(6, 4), None));
        let ghost = ObjectProto::scenery(PassMode::ShootThrough, BoxSize::new(32, 32));
        assert!(w.can_place_object(&ghost, tile(4, 4), None));
    }

    #[test]
    fn object_changes_invalidate_nearby_regions() {
        let mut w = World::new();
        w.ensure_chunk(ORIGIN.offset(1, 1));
        w.ensure_chunk(ORIGIN.offset(3, 0));
        let _ = w.pass_region(ORIGIN.offset(1, 1));
        let _ = w.pass_region(ORIGIN.offset(3, 0));
        w.make_object(ObjectProto::critter(BoxSize::new(32, 32)), tile(2, 2));
        let flags = |w: &World, c| w.chunk_at(c).map(Chunk::flags);
        assert!(flags(&w, ORIGIN.offset(1, 1)).is_some_and(|f| f.contains(ChunkFlags::REGION)));
        assert!(flags(&w, ORIGIN.offset(3, 0)).is_some_and(|f| !f.contains(ChunkFlags::REGION)));
    }
}
