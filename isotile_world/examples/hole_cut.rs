// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Punch a pit through blocked ground and watch the collision boxes split.
//!
//! Run with `RUST_LOG=debug` to see chunk rebuilds.

use isotile_index::Aabb2D;
use isotile_world::{
    BoxSize, ChunkCoords, CutResult, LocalCoords, ObjectProto, PassMode, Point, World,
    blocked_by_any,
};

fn main() {
    env_logger::init();

    // The raw cut: a small hole in the middle of a tile leaves a ring of pieces.
    let tile = Aabb2D::new(0.0, 0.0, 64.0, 64.0);
    let cut = CutResult::cut(tile, Aabb2D::new(24.0, 24.0, 40.0, 40.0));
    println!("tile minus a centered hole: {} pieces", cut.len());
    for piece in &cut {
        println!("  {piece:?}");
    }

    let origin = ChunkCoords::new(0, 0, 0);
    let mut world = World::new();
    let chunk = world.ensure_chunk(origin);
    for local in LocalCoords::all() {
        chunk.set_ground(local, Some(PassMode::Blocked));
    }

    let at = Point::at_tile(origin, LocalCoords::new(5, 5));
    let mover = BoxSize::new(32, 32);
    println!(
        "before the pit, (5, 5) passable: {}",
        world.is_passable_at(at, mover, None, &blocked_by_any)
    );

    let pit = world.make_object(ObjectProto::hole(BoxSize::new(48, 48), true), at);
    if let Some(chunk) = world.chunk_at(origin) {
        chunk.ensure_passability();
        println!("{} boxes after the cut", chunk.collision_index().len());
    }
    println!(
        "with the pit, (5, 5) passable: {}",
        world.is_passable_at(at, mover, None, &blocked_by_any)
    );

    world.remove_object(pit);
    println!(
        "pit filled, (5, 5) passable: {}",
        world.is_passable_at(at, mover, None, &blocked_by_any)
    );
}
