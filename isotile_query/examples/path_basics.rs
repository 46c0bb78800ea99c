// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Route a mover around a wall with a single gap, then compare A* and Dijkstra.
//!
//! Run with `RUST_LOG=debug` to see search statistics.

use isotile_query::{PathRequest, SearchConfig, Searcher};
use isotile_world::{ChunkCoords, LocalCoords, PassMode, Point, Wall, World, blocked_by_any};

fn main() {
    env_logger::init();

    let origin = ChunkCoords::new(0, 0, 0);
    let mut world = World::new();
    let chunk = world.ensure_chunk(origin);
    for x in 0..16 {
        if x != 12 {
            chunk.set_wall_north(LocalCoords::new(x, 8), Some(Wall::new(PassMode::Blocked, 8.0)));
        }
    }

    let from = Point::at_tile(origin, LocalCoords::new(3, 4));
    let to = Point::at_tile(origin, LocalCoords::new(3, 12));
    let req = PathRequest::new(from, to);

    let config = SearchConfig {
        max_cost: 2_000,
        ..SearchConfig::default()
    };
    let mut searcher = match Searcher::new(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("bad search config: {e}");
            return;
        }
    };

    let path = searcher.astar(&world, &req, &blocked_by_any);
    println!(
        "A*: found {} cost {} over {} points, {} nodes expanded",
        path.is_found(),
        path.cost(),
        path.len(),
        searcher.expanded()
    );
    for step in path.simplified_path() {
        println!("  {:?} heading {:?}", step.point.local(), step.direction);
    }
    searcher.release(path);

    let path = searcher.dijkstra(&world, &req, &blocked_by_any);
    println!(
        "Dijkstra: found {} cost {}, {} nodes expanded",
        path.is_found(),
        path.cost(),
        searcher.expanded()
    );
    searcher.release(path);

    // Close the gap: the search settles for the closest point it reached.
    if let Some(chunk) = world.chunk_at_mut(origin) {
        chunk.set_wall_north(LocalCoords::new(12, 8), Some(Wall::new(PassMode::Blocked, 8.0)));
    }
    let path = searcher.astar(&world, &req, &blocked_by_any);
    println!(
        "walled off: found {}, stopped {} px short at {:?}",
        path.is_found(),
        path.distance(),
        path.path().last().map(|p| p.local())
    );
    searcher.release(path);
}
