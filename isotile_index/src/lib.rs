// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Isotile Index: a generic 2D AABB index.
//!
//! Isotile Index is the spatial building block under the collision engine.
//!
//! - Insert, update, and remove axis-aligned bounding boxes (AABBs) with user payloads.
//! - Visit entries intersecting a rectangle, stopping early once the caller has its answer.
//! - Keys are generational, so a stale key never addresses a reused slot.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//! Higher layers compute world-space boxes and feed them here.
//!
//! Backends are pluggable via a small trait. The default backend is an R-tree
//! with SAH-like splits and widened accumulator metrics (f32→f64, f64→f64, i64→i128);
//! a flat vector backend with linear scans serves as a reference.
//!
//! # Example
//!
//! ```rust
//! use isotile_index::{Index, Aabb2D};
//!
//! let mut idx: Index<i64, u32> = Index::new();
//! let k1 = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
//! let _k2 = idx.insert(Aabb2D::new(5, 5, 15, 15), 2);
//!
//! // Move the first box away.
//! idx.update(k1, Aabb2D::new(20, 0, 30, 10));
//!
//! // Query a point inside the second box.
//! let hits: Vec<_> = idx.query_point(6, 6).collect();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].1, 2);
//!
//! // Stop at the first payload above 1.
//! let mut first = None;
//! idx.search(&Aabb2D::new(0, 0, 40, 40), |_, _, &p| {
//!     if p > 1 {
//!         first = Some(p);
//!         return false;
//!     }
//!     true
//! });
//! assert_eq!(first, Some(2));
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Debug builds may assert.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod index;
pub mod types;

pub use backend::Backend;
pub use backends::flatvec::FlatVec;
pub use backends::rtree::{RTree, RTreeF32, RTreeF64, RTreeI64};
pub use index::{FlatIndex, Index, IndexGeneric, Key};
pub use types::{Aabb2D, Scalar};
