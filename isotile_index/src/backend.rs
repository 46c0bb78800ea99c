// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for spatial indexing implementations.

use core::fmt::Debug;

use crate::types::Aabb2D;

/// Spatial backend abstraction used by `IndexGeneric`.
///
/// Backends only track slot numbers and their boxes. The owning index keeps
/// payloads and generations, and guarantees that a slot is never inserted twice
/// without a removal in between.
pub trait Backend<T: Copy + PartialOrd + Debug> {
    /// Insert a new slot into the spatial structure.
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>);

    /// Move an existing slot to a new AABB.
    fn update(&mut self, slot: usize, aabb: Aabb2D<T>) {
        self.remove(slot);
        self.insert(slot, aabb);
    }

    /// Remove a slot from the spatial structure.
    fn remove(&mut self, slot: usize);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Visit slots whose AABB intersects `rect` (touching edges included).
    ///
    /// Visiting stops as soon as `f` returns `false`; the return value is
    /// `false` in that case and `true` if every candidate was visited.
    /// The visiting order is unspecified.
    fn visit_rect(&self, rect: &Aabb2D<T>, f: &mut dyn FnMut(usize) -> bool) -> bool;

    /// Bounds of everything stored, if anything is stored.
    fn bounds(&self) -> Option<Aabb2D<T>>;
}
