// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Isotile World: chunked isometric tile terrain with collision queries.
//!
//! The world is split into chunks of 16×16 tiles, 64 pixels per tile. Every
//! chunk keeps an [`isotile_index`] R-tree over the collision boxes of its
//! ground, walls and objects, expressed in the chunk's own pixel frame.
//!
//! - [`World`] owns the chunks, looks them up by [`ChunkCoords`], and tracks
//!   objects by [`ObjectId`].
//! - [`Point`] is a normalized position: chunk, tile, and a pixel offset in
//!   `[-32, 31]` from the tile center.
//! - Chunk indexes are rebuilt lazily. Edits mark a chunk, and the next query
//!   rebuilds it. Boxes of dynamic objects (critters, doors) are patched in
//!   place instead.
//! - [`World::is_passable`] answers whether a box is free of blocking boxes,
//!   looking into the eight neighbor chunks since boxes overhang borders.
//! - [`CutResult`] subtracts holes from rectangles; physics holes punch gaps
//!   through terrain boxes.
//!
//! The world is single-threaded: caches are refreshed through shared
//! references with `Cell` and `RefCell`.
//!
//! # Example
//!
//! ```rust
//! use isotile_world::{
//!     BoxSize, ChunkCoords, LocalCoords, PassMode, Point, Wall, World, blocked_by_any,
//! };
//!
//! let origin = ChunkCoords::new(0, 0, 0);
//! let mut world = World::new();
//! world
//!     .ensure_chunk(origin)
//!     .set_wall_north(LocalCoords::new(4, 4), Some(Wall::new(PassMode::Blocked, 8.0)));
//!
//! let below = Point::at_tile(origin, LocalCoords::new(4, 4));
//! let size = BoxSize::new(32, 32);
//! assert!(world.is_passable_at(below, size, None, &blocked_by_any));
//! assert!(!world.is_passable_at(below.normalize(0, -24), size, None, &blocked_by_any));
//! ```

pub mod bbox;
pub mod chunk;
pub mod chunk_index;
pub mod collision;
pub mod coords;
pub mod hole;
pub mod object;
pub mod pass_mode;
pub mod passability;
pub mod region;
pub mod search_cache;
pub mod world;

pub use bbox::{BoxSize, CHUNK_BOUNDS, MAX_WALL_DEPTH, WALL_EPSILON};
pub use chunk::{Chunk, ChunkFlags, Tile, Wall};
pub use chunk_index::ChunkIndex;
pub use collision::{Collider, CollisionTag, GeometryPart, ObjectId};
pub use coords::{
    CHUNK_SIZE, ChunkCoords, HALF_TILE, LocalCoords, NEIGHBOR_OFFSETS, PixelOffset, Point,
    TILE_COUNT, TILE_MAX_DIM, TILE_SIZE,
};
pub use hole::CutResult;
pub use object::{Object, ObjectKind, ObjectProto};
pub use pass_mode::{Blocks, PassMode};
pub use passability::{
    SearchContinue, blocked_by, blocked_by_any, is_passable_1, is_passable_stitched,
    pass_through_all,
};
pub use region::{PassRegion, REGION_CELL, REGION_DIM};
pub use search_cache::SearchCache;
pub use world::{FIRST_OBJECT_ID, World};
