// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::backends::flatvec::FlatVec;
use crate::backends::rtree::RTree;
use crate::types::{Aabb2D, Scalar};

/// Generational handle for entries.
///
/// A key stays valid until its entry is removed; a slot reused by a later
/// insertion carries a new generation, so stale keys never alias it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are 32-bit; an index never holds more than u32::MAX entries."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Entry<T, P> {
    aabb: Aabb2D<T>,
    payload: P,
}

/// A generic AABB index parameterized by a spatial backend.
///
/// Changes apply immediately: a box inserted by [`insert`](Self::insert) is
/// visible to the next query.
#[derive(Debug)]
pub struct IndexGeneric<T: Copy + PartialOrd + Debug, P: Copy + Debug, B: Backend<T>> {
    entries: Vec<Option<Entry<T, P>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    len: usize,
    backend: B,
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self::with_backend(B::default())
    }
}

impl<T, P, B> Default for IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T>,
{
    /// Create an empty index around an already constructed backend.
    ///
    /// The backend must be empty.
    pub fn with_backend(backend: B) -> Self {
        debug_assert!(backend.bounds().is_none(), "backend must start empty");
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            backend,
        }
    }

    /// Reserve space for at least `n` more entries.
    pub fn reserve(&mut self, n: usize) {
        self.entries.reserve(n);
        self.generations.reserve(n);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The spatial backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Insert a new AABB with payload. Returns a stable handle `Key`.
    pub fn insert(&mut self, aabb: Aabb2D<T>, payload: P) -> Key {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generations[idx] = self.generations[idx].wrapping_add(1);
            self.entries[idx] = Some(Entry { aabb, payload });
            idx
        } else {
            self.entries.push(Some(Entry { aabb, payload }));
            self.generations.push(1);
            self.entries.len() - 1
        };
        self.backend.insert(idx, aabb);
        self.len += 1;
        Key::new(idx, self.generations[idx])
    }

    /// Move an existing entry to a new AABB. Returns `false` for a stale key.
    pub fn update(&mut self, key: Key, aabb: Aabb2D<T>) -> bool {
        if !self.is_live(key) {
            return false;
        }
        if let Some(Some(e)) = self.entries.get_mut(key.idx()) {
            e.aabb = aabb;
        }
        self.backend.update(key.idx(), aabb);
        true
    }

    /// Remove an existing entry, returning its payload.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        if !self.is_live(key) {
            return None;
        }
        let entry = self.entries[key.idx()].take()?;
        self.backend.remove(key.idx());
        self.free_list.push(key.idx());
        self.len -= 1;
        Some(entry.payload)
    }

    /// Look up an entry's box and payload.
    pub fn get(&self, key: Key) -> Option<(Aabb2D<T>, P)> {
        if !self.is_live(key) {
            return None;
        }
        let e = self.entries.get(key.idx())?.as_ref()?;
        Some((e.aabb, e.payload))
    }

    /// Remove every entry. Keys issued before the call become stale.
    pub fn clear(&mut self) {
        for (idx, e) in self.entries.iter_mut().enumerate() {
            if e.take().is_some() {
                self.free_list.push(idx);
            }
        }
        self.backend.clear();
        self.len = 0;
    }

    /// Visit entries whose AABB intersects `rect` (touching edges included).
    ///
    /// Stops as soon as `f` returns `false`. Returns `false` if stopped early.
    pub fn search<F>(&self, rect: &Aabb2D<T>, mut f: F) -> bool
    where
        F: FnMut(Key, &Aabb2D<T>, &P) -> bool,
    {
        let entries = &self.entries;
        let generations = &self.generations;
        self.backend.visit_rect(rect, &mut |slot| match entries.get(slot) {
            Some(Some(e)) => f(Key::new(slot, generations[slot]), &e.aabb, &e.payload),
            _ => true,
        })
    }

    /// Query for entries whose AABB intersects the given rectangle.
    pub fn query_rect(&self, rect: Aabb2D<T>) -> impl Iterator<Item = (Key, P)> + '_ {
        let mut out = Vec::new();
        self.search(&rect, |key, _, payload| {
            out.push((key, *payload));
            true
        });
        out.into_iter()
    }

    /// Query for entries whose AABB contains the point.
    pub fn query_point(&self, x: T, y: T) -> impl Iterator<Item = (Key, P)> + '_ {
        self.query_rect(Aabb2D::new(x, y, x, y))
    }

    /// Iterate live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &Aabb2D<T>, &P)> + '_ {
        self.entries.iter().enumerate().filter_map(|(idx, e)| {
            e.as_ref()
                .map(|e| (Key::new(idx, self.generations[idx]), &e.aabb, &e.payload))
        })
    }

    /// Bounds of every live entry.
    pub fn bounds(&self) -> Option<Aabb2D<T>> {
        self.backend.bounds()
    }

    fn is_live(&self, key: Key) -> bool {
        self.generations.get(key.idx()) == Some(&key.1)
            && matches!(self.entries.get(key.idx()), Some(Some(_)))
    }
}

impl<T: Scalar, P: Copy + Debug> IndexGeneric<T, P, RTree<T>> {
    /// Build an R-tree index from a batch of boxes in one packed pass.
    ///
    /// Keys are returned in input order.
    pub fn bulk(items: &[(Aabb2D<T>, P)]) -> (Self, Vec<Key>) {
        let pairs: Vec<(usize, Aabb2D<T>)> =
            items.iter().enumerate().map(|(i, (a, _))| (i, *a)).collect();
        let index = Self {
            entries: items
                .iter()
                .map(|&(aabb, payload)| Some(Entry { aabb, payload }))
                .collect(),
            generations: alloc::vec![1; items.len()],
            free_list: Vec::new(),
            len: items.len(),
            backend: RTree::bulk_build(&pairs),
        };
        let keys = (0..items.len()).map(|i| Key::new(i, 1)).collect();
        (index, keys)
    }
}

/// Default index, backed by an R-tree.
pub type Index<T, P> = IndexGeneric<T, P, RTree<T>>;

/// Index backed by a linear scan, for tiny sets and as a reference.
pub type FlatIndex<T, P> = IndexGeneric<T, P, FlatVec<T>>;
