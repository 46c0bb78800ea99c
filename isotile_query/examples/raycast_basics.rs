// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cast rays past a glass wall and a rock, with and without diagnostics.

use isotile_query::{RaycastDiag, line_of_sight, raycast, raycast_with_diag};
use isotile_world::{
    BoxSize, ChunkCoords, LocalCoords, ObjectProto, PassMode, Point, Wall, World,
};

fn main() {
    env_logger::init();

    let origin = ChunkCoords::new(0, 0, 0);
    let east = ChunkCoords::new(1, 0, 0);
    let mut world = World::new();
    let glass = Wall::new(PassMode::SeeThrough, 4.0);
    world
        .ensure_chunk(origin)
        .set_wall_west(LocalCoords::new(10, 6), Some(glass));
    world.ensure_chunk(east);
    let rock = ObjectProto::scenery(PassMode::Blocked, BoxSize::new(40, 40));
    world.make_object(rock, Point::at_tile(east, LocalCoords::new(3, 6)));

    let from = Point::at_tile(origin, LocalCoords::new(4, 6));
    let to = Point::at_tile(east, LocalCoords::new(8, 6));

    let hit = raycast(&world, from, to, None);
    println!(
        "movement ray: success {} after {:.2} px, stopped by {:?} at {:?}",
        hit.success,
        hit.distance,
        hit.collider,
        hit.collision.local()
    );

    let sight = line_of_sight(&world, from, to, None);
    println!(
        "sight ray: success {} after {:.2} px, stopped by {:?} in {:?}",
        sight.success,
        sight.distance,
        sight.collider,
        sight.collision.chunk()
    );

    let mut diag = RaycastDiag::default();
    let hit = raycast_with_diag(&mut diag, &world, from, to, None);
    println!(
        "{} probes of step {:?} for a ray of {:.2} px (hit at {:.2})",
        diag.path.len(),
        diag.step_size,
        diag.vector.length(),
        hit.distance
    );
}
