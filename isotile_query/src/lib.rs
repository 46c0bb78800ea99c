// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Isotile Query: path search and ray casting over an [`isotile_world::World`].
//!
//! - [`Searcher`] runs A* ([`Searcher::astar`]) or exhaustive uniform-cost
//!   search ([`Searcher::dijkstra`]) on a 16 px grid, stepping a mover's box
//!   through the world's stitched passability test.
//! - [`PathResult`] holds the point list, cost and remaining distance, and a
//!   lazily built [`simplified_path`](PathResult::simplified_path) of straight
//!   runs. Result storage is recycled through a [`PathPool`].
//! - [`raycast`] and [`line_of_sight`] find the nearest box crossing a
//!   segment; [`raycast_with_diag`] also records every probe it used.
//!
//! Unreachable goals are not errors: results carry a `found`/`success` flag
//! and the best partial answer. Mixing floors in a ray is a caller bug and
//! panics.
//!
//! # Example
//!
//! ```rust
//! use isotile_query::{PathRequest, Searcher, raycast};
//! use isotile_world::{ChunkCoords, LocalCoords, PassMode, Point, Wall, World, blocked_by_any};
//!
//! let origin = ChunkCoords::new(0, 0, 0);
//! let mut world = World::new();
//! let chunk = world.ensure_chunk(origin);
//! for x in 0..8 {
//!     chunk.set_wall_north(LocalCoords::new(x, 6), Some(Wall::new(PassMode::Blocked, 8.0)));
//! }
//!
//! let from = Point::at_tile(origin, LocalCoords::new(2, 3));
//! let to = Point::at_tile(origin, LocalCoords::new(2, 9));
//! assert!(!raycast(&world, from, to, None).success);
//!
//! let mut searcher = Searcher::default();
//! let path = searcher.astar(&world, &PathRequest::new(from, to), &blocked_by_any);
//! assert!(path.is_found());
//! assert!(path.cost() > 6 * 64);
//! searcher.release(path);
//! ```

pub mod config;
pub mod error;
pub mod raycast;
pub mod result;
pub mod search;

pub use config::{
    DEFAULT_GOAL_TOLERANCE, DIAGONAL_COST, DIV_SIZE, MIN_GOAL_TOLERANCE, MIN_MOVER_SIZE,
    STEP_COST, SearchConfig,
};
pub use error::ConfigError;
pub use raycast::{
    Probe, RaycastDiag, RaycastResult, line_of_sight, raycast, raycast_with_diag,
};
pub use result::{PathPool, PathResult, PathStep};
pub use search::{PathRequest, Searcher};
