// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The collision index a chunk keeps over its own boxes.

use std::collections::HashMap;

use isotile_index::{Index, Key};
use kurbo::Rect;

use crate::bbox::{from_aabb, to_aabb};
use crate::collision::{CollisionTag, ObjectId};

/// R-tree of every collision box of one chunk, in the chunk's pixel frame.
///
/// Object boxes are also reachable by id so they can be moved or dropped
/// without a rebuild.
#[derive(Debug, Default)]
pub struct ChunkIndex {
    tree: Index<f64, CollisionTag>,
    objects: HashMap<ObjectId, Key>,
    rebuilds: u64,
}

impl ChunkIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored boxes.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether no boxes are stored.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// How many full rebuilds this index has gone through.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Visit stored boxes that intersect `rect`, touching edges included.
    ///
    /// Stops as soon as `f` returns `false`; returns `false` if stopped early.
    pub fn search<F>(&self, rect: &Rect, mut f: F) -> bool
    where
        F: FnMut(&CollisionTag, &Rect) -> bool,
    {
        self.tree
            .search(&to_aabb(rect), |_, aabb, tag| f(tag, &from_aabb(aabb)))
    }

    /// Every stored box, sorted for comparison.
    pub fn entries(&self) -> Vec<(Rect, CollisionTag)> {
        let mut out: Vec<_> = self
            .tree
            .iter()
            .map(|(_, aabb, tag)| (from_aabb(aabb), *tag))
            .collect();
        out.sort_by(|a, b| {
            let key = |r: &Rect| [r.x0, r.y0, r.x1, r.y1];
            key(&a.0)
                .partial_cmp(&key(&b.0))
                .unwrap_or(core::cmp::Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        out
    }

    /// The box stored for an object.
    pub fn object_box(&self, id: ObjectId) -> Option<Rect> {
        let key = self.objects.get(&id)?;
        self.tree.get(*key).map(|(aabb, _)| from_aabb(&aabb))
    }

    /// Drop every box ahead of a rebuild.
    pub(crate) fn begin_rebuild(&mut self) {
        self.tree.clear();
        self.objects.clear();
        self.rebuilds += 1;
    }

    /// Store a box that is not tracked by id.
    pub(crate) fn insert_geometry(&mut self, rect: Rect, tag: CollisionTag) {
        self.tree.insert(to_aabb(&rect), tag);
    }

    /// Store, replace, or drop (`None`) the box of an object.
    pub(crate) fn set_object(&mut self, id: ObjectId, entry: Option<(Rect, CollisionTag)>) {
        match (self.objects.get(&id).copied(), entry) {
            (Some(key), Some((rect, tag))) if self.tree.get(key).map(|(_, t)| t) == Some(tag) => {
                self.tree.update(key, to_aabb(&rect));
            }
            (old, entry) => {
                if let Some(key) = old {
                    self.tree.remove(key);
                    self.objects.remove(&id);
                }
                if let Some((rect, tag)) = entry {
                    let key = self.tree.insert(to_aabb(&rect), tag);
                    self.objects.insert(id, key);
                }
            }
        }
    }
}
