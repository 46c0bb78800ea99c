// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Isotile Index: insert, update, remove, and query with early exit.

use isotile_index::{Aabb2D, Index};

fn main() {
    let mut idx: Index<f64, &str> = Index::new();
    let wall = idx.insert(Aabb2D::new(0.0, 0.0, 64.0, 2.0), "wall");
    let _rock = idx.insert(Aabb2D::from_center_size(100.0, 100.0, 32.0, 32.0), "rock");
    let door = idx.insert(Aabb2D::new(64.0, 0.0, 96.0, 2.0), "door");

    // Slide the wall down a tile.
    idx.update(wall, Aabb2D::new(0.0, 64.0, 64.0, 66.0));

    // Everything touching the top edge.
    let hits: Vec<_> = idx.query_rect(Aabb2D::new(0.0, -1.0, 128.0, 1.0)).collect();
    println!("hits along the top edge: {hits:?}");

    // Is anything other than the door in the way?
    let clear = idx.search(&Aabb2D::new(60.0, -5.0, 70.0, 70.0), |key, _, name| {
        println!("  candidate {name}");
        key == door
    });
    println!("path clear apart from the door: {clear}");

    idx.remove(door);
    println!("{} boxes left, bounds {:?}", idx.len(), idx.bounds());
}
