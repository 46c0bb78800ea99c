// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R-tree backend generic over scalar `T: Scalar` with SAH-like split.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::{Aabb2D, Scalar, ScalarAcc, area, union_aabb};

const DEFAULT_MAX_CHILDREN: usize = 8;
const DEFAULT_MIN_CHILDREN: usize = 4;

/// R-tree backend using SAH-like splits and widened accumulator metrics.
///
/// Every leaf sits at the same depth. Nodes hold at most `max_children`
/// children; splits produce nodes with at least `min_children`, while removals
/// may leave nodes underfull (empty nodes are dropped and a single-child root
/// is collapsed). Node storage freed by removals is reused by later inserts.
pub struct RTree<T: Scalar> {
    max_children: usize,
    min_children: usize,
    root: Option<NodeIdx>,
    nodes: Nodes<T>,
    slots: Vec<Option<Aabb2D<T>>>,
    len: usize,
}

#[derive(Clone, Debug)]
struct RNode<T> {
    bbox: Aabb2D<T>,
    leaf: bool,
    children: Vec<RChild<T>>,
}

#[derive(Copy, Clone, Debug)]
enum RChild<T> {
    Node(NodeIdx),
    Item { slot: usize, bbox: Aabb2D<T> },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn get(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug)]
enum Axis {
    X,
    Y,
}

/// Node arena with a free list.
struct Nodes<T> {
    arena: Vec<RNode<T>>,
    free: Vec<NodeIdx>,
}

impl<T: Scalar> Nodes<T> {
    const fn new() -> Self {
        Self {
            arena: Vec::new(),
            free: Vec::new(),
        }
    }

    fn get(&self, idx: NodeIdx) -> &RNode<T> {
        &self.arena[idx.get()]
    }

    fn get_mut(&mut self, idx: NodeIdx) -> &mut RNode<T> {
        &mut self.arena[idx.get()]
    }

    fn alloc(&mut self, node: RNode<T>) -> NodeIdx {
        if let Some(idx) = self.free.pop() {
            self.arena[idx.get()] = node;
            idx
        } else {
            self.arena.push(node);
            NodeIdx(self.arena.len() - 1)
        }
    }

    fn release(&mut self, idx: NodeIdx) {
        self.get_mut(idx).children.clear();
        self.free.push(idx);
    }

    fn clear(&mut self) {
        self.arena.clear();
        self.free.clear();
    }

    fn live(&self) -> usize {
        self.arena.len() - self.free.len()
    }

    fn child_bbox(&self, c: &RChild<T>) -> Aabb2D<T> {
        match c {
            RChild::Node(i) => self.get(*i).bbox,
            RChild::Item { bbox, .. } => *bbox,
        }
    }

    fn bbox_of(&self, children: &[RChild<T>]) -> Aabb2D<T> {
        let mut it = children.iter();
        let Some(first) = it.next() else {
            return Aabb2D::new(T::zero(), T::zero(), T::zero(), T::zero());
        };
        it.fold(self.child_bbox(first), |acc, c| {
            union_aabb(acc, self.child_bbox(c))
        })
    }

    fn centroid(&self, c: &RChild<T>, axis: Axis) -> T {
        let b = self.child_bbox(c);
        match axis {
            Axis::X => T::mid(b.min_x, b.max_x),
            Axis::Y => T::mid(b.min_y, b.max_y),
        }
    }

    fn sort_along(&self, children: &mut [RChild<T>], axis: Axis) {
        children.sort_by(|a, b| {
            self.centroid(a, axis)
                .partial_cmp(&self.centroid(b, axis))
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Least enlargement first, then smallest area.
    fn choose_child(&self, children: &[RChild<T>], bbox: &Aabb2D<T>) -> usize {
        let mut best: Option<(usize, ScalarAcc<T>, ScalarAcc<T>)> = None;
        for (i, c) in children.iter().enumerate() {
            let cb = self.child_bbox(c);
            let a = area(&cb);
            let enlarge = area(&union_aabb(cb, *bbox)) - a;
            let better = match best {
                None => true,
                Some((_, be, ba)) => enlarge < be || (enlarge == be && a < ba),
            };
            if better {
                best = Some((i, enlarge, a));
            }
        }
        best.map_or(0, |(i, _, _)| i)
    }

    /// SAH-like split: sort along an axis, precompute prefix/suffix AABBs, and
    /// choose `k` that minimizes `area(LB_k) * k + area(RB_k) * (n - k)`.
    fn split(
        &self,
        children: Vec<RChild<T>>,
        min_children: usize,
    ) -> (Vec<RChild<T>>, Vec<RChild<T>>) {
        let n = children.len();
        debug_assert!(n >= 2 * min_children, "only overflowing nodes are split");
        let mut best: Option<(ScalarAcc<T>, Axis, usize)> = None;
        let mut prefix: Vec<Aabb2D<T>> = Vec::with_capacity(n);
        let mut suffix: Vec<Aabb2D<T>> = Vec::with_capacity(n);
        for axis in [Axis::X, Axis::Y] {
            let mut v = children.clone();
            self.sort_along(&mut v, axis);

            prefix.clear();
            for c in &v {
                let bb = self.child_bbox(c);
                prefix.push(prefix.last().map_or(bb, |p| union_aabb(*p, bb)));
            }
            suffix.clear();
            for c in v.iter().rev() {
                let bb = self.child_bbox(c);
                suffix.push(suffix.last().map_or(bb, |s| union_aabb(bb, *s)));
            }
            suffix.reverse();

            for k in min_children..=(n - min_children) {
                let cost = area(&prefix[k - 1]) * T::acc_from_usize(k)
                    + area(&suffix[k]) * T::acc_from_usize(n - k);
                if best.is_none_or(|(c, _, _)| cost < c) {
                    best = Some((cost, axis, k));
                }
            }
        }
        let (axis, k) = best.map_or((Axis::X, n / 2), |(_, axis, k)| (axis, k));
        let mut left = children;
        self.sort_along(&mut left, axis);
        let right = left.split_off(k);
        (left, right)
    }

    /// Insert below `idx`. Returns the new right sibling if `idx` was split.
    fn insert(
        &mut self,
        idx: NodeIdx,
        slot: usize,
        bbox: Aabb2D<T>,
        max_children: usize,
        min_children: usize,
    ) -> Option<NodeIdx> {
        if self.get(idx).leaf {
            let node = self.get_mut(idx);
            node.bbox = if node.children.is_empty() {
                bbox
            } else {
                union_aabb(node.bbox, bbox)
            };
            node.children.push(RChild::Item { slot, bbox });
        } else {
            let pick = self.choose_child(&self.get(idx).children, &bbox);
            let RChild::Node(child) = self.get(idx).children[pick] else {
                unreachable!("interior nodes only hold nodes")
            };
            let sibling = self.insert(child, slot, bbox, max_children, min_children);
            let node = self.get_mut(idx);
            node.bbox = union_aabb(node.bbox, bbox);
            if let Some(sibling) = sibling {
                node.children.insert(pick + 1, RChild::Node(sibling));
            }
        }

        if self.get(idx).children.len() <= max_children {
            return None;
        }
        let node = self.get_mut(idx);
        let leaf = node.leaf;
        let children = core::mem::take(&mut node.children);
        let (left, right) = self.split(children, min_children);
        let left_bbox = self.bbox_of(&left);
        let right_bbox = self.bbox_of(&right);
        let node = self.get_mut(idx);
        node.children = left;
        node.bbox = left_bbox;
        Some(self.alloc(RNode {
            bbox: right_bbox,
            leaf,
            children: right,
        }))
    }

    /// Remove `slot` (stored with `bbox`) below `idx`, dropping emptied children.
    fn remove(&mut self, idx: NodeIdx, slot: usize, bbox: &Aabb2D<T>) -> bool {
        if !self.get(idx).bbox.intersects(bbox) {
            return false;
        }
        if self.get(idx).leaf {
            let node = self.get_mut(idx);
            let Some(pos) = node
                .children
                .iter()
                .position(|c| matches!(c, RChild::Item { slot: s, .. } if *s == slot))
            else {
                return false;
            };
            node.children.remove(pos);
            let bb = self.bbox_of(&self.get(idx).children);
            self.get_mut(idx).bbox = bb;
            return true;
        }
        for i in 0..self.get(idx).children.len() {
            let RChild::Node(child) = self.get(idx).children[i] else {
                continue;
            };
            if !self.remove(child, slot, bbox) {
                continue;
            }
            if self.get(child).children.is_empty() {
                self.get_mut(idx).children.remove(i);
                self.release(child);
            }
            let bb = self.bbox_of(&self.get(idx).children);
            self.get_mut(idx).bbox = bb;
            return true;
        }
        false
    }

    /// Pack one level of an STR bulk build: returns the parents of `items`.
    fn pack_level(
        &mut self,
        items: &mut [RChild<T>],
        leaf: bool,
        max_children: usize,
    ) -> Vec<RChild<T>> {
        let n = items.len();
        let groups = n.div_ceil(max_children);
        let mut gx = 1_usize;
        while gx * gx < groups {
            gx += 1;
        }
        self.sort_along(items, Axis::X);
        let slice_size = n.div_ceil(gx);
        let mut parents = Vec::with_capacity(groups);
        for slice in items.chunks_mut(slice_size) {
            self.sort_along(slice, Axis::Y);
            for group in slice.chunks(max_children) {
                let children = group.to_vec();
                let bbox = self.bbox_of(&children);
                let idx = self.alloc(RNode {
                    bbox,
                    leaf,
                    children,
                });
                parents.push(RChild::Node(idx));
            }
        }
        parents
    }
}

impl<T: Scalar> Default for RTree<T> {
    fn default() -> Self {
        Self::with_fanout(DEFAULT_MAX_CHILDREN, DEFAULT_MIN_CHILDREN)
    }
}

impl<T: Scalar> RTree<T> {
    /// Create an empty tree with a custom node fanout.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= min_children` and `2 * min_children <= max_children + 1`.
    pub fn with_fanout(max_children: usize, min_children: usize) -> Self {
        assert!(
            min_children >= 1 && 2 * min_children <= max_children + 1,
            "fanout {min_children}..{max_children} cannot split an overflowing node"
        );
        Self {
            max_children,
            min_children,
            root: None,
            nodes: Nodes::new(),
            slots: Vec::new(),
            len: 0,
        }
    }

    /// Build a tree from `(slot, bbox)` pairs using a packed STR layout.
    ///
    /// Slots must be unique.
    pub fn bulk_build(pairs: &[(usize, Aabb2D<T>)]) -> Self {
        let mut tree = Self::default();
        for &(slot, bbox) in pairs {
            tree.track(slot, bbox);
        }
        let mut level: Vec<RChild<T>> = pairs
            .iter()
            .map(|&(slot, bbox)| RChild::Item { slot, bbox })
            .collect();
        if level.is_empty() {
            return tree;
        }
        let mut leaf = true;
        loop {
            level = tree.nodes.pack_level(&mut level, leaf, tree.max_children);
            leaf = false;
            if let [RChild::Node(root)] = level[..] {
                tree.root = Some(root);
                return tree;
            }
        }
    }

    /// Number of stored boxes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree stores nothing.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels from the root to the leaves; zero for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut cur = self.root;
        while let Some(idx) = cur {
            height += 1;
            let node = self.nodes.get(idx);
            cur = match node.children.first() {
                Some(RChild::Node(child)) if !node.leaf => Some(*child),
                _ => None,
            };
        }
        height
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.live()
    }

    fn track(&mut self, slot: usize, bbox: Aabb2D<T>) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        debug_assert!(self.slots[slot].is_none(), "slot {slot} inserted twice");
        self.slots[slot] = Some(bbox);
        self.len += 1;
    }

    fn collapse_root(&mut self) {
        while let Some(root) = self.root {
            let node = self.nodes.get(root);
            if node.children.is_empty() {
                self.nodes.release(root);
                self.root = None;
            } else if let [RChild::Node(only)] = node.children[..]
                && !node.leaf
            {
                self.nodes.release(root);
                self.root = Some(only);
            } else {
                break;
            }
        }
    }
}

impl<T: Scalar> Backend<T> for RTree<T> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>) {
        self.track(slot, aabb);
        let Some(root) = self.root else {
            self.root = Some(self.nodes.alloc(RNode {
                bbox: aabb,
                leaf: true,
                children: vec![RChild::Item { slot, bbox: aabb }],
            }));
            return;
        };
        if let Some(sibling) =
            self.nodes
                .insert(root, slot, aabb, self.max_children, self.min_children)
        {
            let bbox = union_aabb(self.nodes.get(root).bbox, self.nodes.get(sibling).bbox);
            self.root = Some(self.nodes.alloc(RNode {
                bbox,
                leaf: false,
                children: vec![RChild::Node(root), RChild::Node(sibling)],
            }));
        }
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.slots.get(slot).copied().flatten() == Some(aabb) {
            return;
        }
        self.remove(slot);
        self.insert(slot, aabb);
    }

    fn remove(&mut self, slot: usize) {
        let Some(old) = self.slots.get_mut(slot).and_then(Option::take) else {
            return;
        };
        self.len -= 1;
        if let Some(root) = self.root {
            let removed = self.nodes.remove(root, slot, &old);
            debug_assert!(removed, "tracked slot {slot} missing from the tree");
            self.collapse_root();
        }
    }

    fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
        self.slots.clear();
        self.len = 0;
    }

    fn visit_rect(&self, rect: &Aabb2D<T>, f: &mut dyn FnMut(usize) -> bool) -> bool {
        let Some(root) = self.root else {
            return true;
        };
        let mut stack = Vec::with_capacity(16);
        stack.push(root);
        while let Some(idx) = stack.pop() {
            let node = self.nodes.get(idx);
            if !node.bbox.intersects(rect) {
                continue;
            }
            for c in &node.children {
                match c {
                    RChild::Node(child) => stack.push(*child),
                    RChild::Item { slot, bbox } => {
                        if bbox.intersects(rect) && !f(*slot) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    fn bounds(&self) -> Option<Aabb2D<T>> {
        self.root.map(|root| self.nodes.get(root).bbox)
    }
}

impl<T: Scalar> Debug for RTree<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RTree")
            .field("max_children", &self.max_children)
            .field("min_children", &self.min_children)
            .field("len", &self.len)
            .field("height", &self.height())
            .field("live_nodes", &self.nodes.live())
            .field("free_nodes", &self.nodes.free.len())
            .finish_non_exhaustive()
    }
}

/// Convenience type aliases.
/// R-tree with i64 coordinates and i128 metrics.
pub type RTreeI64 = RTree<i64>;

/// R-tree with f32 coordinates and f64 metrics.
pub type RTreeF32 = RTree<f32>;

/// R-tree with f64 coordinates and f64 metrics.
pub type RTreeF64 = RTree<f64>;
