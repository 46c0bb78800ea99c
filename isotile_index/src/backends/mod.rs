// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans. Used as a reference in tests and benchmarks.
//! - `rtree`: generic R-tree (`T: Scalar`) with SAH-like split (aliases: `RTreeI64`, `RTreeF32`, `RTreeF64`).
//!
//! SAH note
//! --------
//! When a node overflows, the R-tree sorts its children along each axis and,
//! for each split point `k`, evaluates:
//!
//! `cost(k) = area(LB_k) * k + area(RB_k) * (n - k)`
//!
//! where `LB_k` and `RB_k` are the bounding boxes of the first `k` and remaining `n - k` children.
//! All `k` are evaluated in O(n) per axis using prefix/suffix bounding boxes.
//! Accumulators are widened (`f32`→`f64`, `f64`→`f64`, `i64`→`i128`) for robust comparisons.
//! The bulk builder uses an STR-like pass to seed packed leaves and parents.

pub mod flatvec;
pub mod rtree;
