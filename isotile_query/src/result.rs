// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path search results and the pool that recycles their storage.

use core::cell::OnceCell;

use isotile_world::Point;

/// Capacity given to freshly allocated path buffers.
const MIN_PATH_CAPACITY: usize = 32;

/// Start of a straight run in a simplified path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathStep {
    /// Where the run starts.
    pub point: Point,
    /// Pixel direction of the run, reduced to lowest terms; zero at the end.
    pub direction: (i64, i64),
}

/// Outcome of a path search.
///
/// When no path was found, [`path`](Self::path) leads to the node that got
/// closest to the goal, and [`distance`](Self::distance) says how close.
#[derive(Debug)]
pub struct PathResult {
    path: Vec<Point>,
    simplified: OnceCell<Vec<PathStep>>,
    found: bool,
    cost: u32,
    distance: u32,
}

impl Default for PathResult {
    fn default() -> Self {
        Self::with_buffer(Vec::new())
    }
}

impl PathResult {
    fn with_buffer(path: Vec<Point>) -> Self {
        debug_assert!(path.is_empty(), "pooled buffers are cleared");
        Self {
            path,
            simplified: OnceCell::new(),
            found: false,
            cost: 0,
            distance: u32::MAX,
        }
    }

    /// Whether the goal was reached.
    pub fn is_found(&self) -> bool {
        self.found
    }

    /// Points from the start to the goal, or to the closest node reached.
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Number of points in the path.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Whether the path has no points, as when the start is blocked.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Cost of the path.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Pixel distance left to the goal: zero when found, `u32::MAX` when the
    /// search never started.
    pub fn distance(&self) -> u32 {
        self.distance
    }

    /// The path as straight runs, computed on first use.
    pub fn simplified_path(&self) -> &[PathStep] {
        self.simplified.get_or_init(|| simplify(&self.path))
    }

    pub(crate) fn finish(&mut self, found: bool, cost: u32, distance: u32) {
        self.found = found;
        self.cost = cost;
        self.distance = distance;
        self.simplified = OnceCell::new();
    }

    pub(crate) fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.path
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

fn reduce((dx, dy): (i64, i64)) -> (i64, i64) {
    match gcd(dx, dy) {
        0 => (0, 0),
        g => (dx / g, dy / g),
    }
}

/// Collapse consecutive steps that share a direction.
fn simplify(path: &[Point]) -> Vec<PathStep> {
    let Some((&last, _)) = path.split_last() else {
        return Vec::new();
    };
    let direction = |i: usize| reduce(path[i].pixel_delta(path[i + 1]));
    let mut out = Vec::new();
    let mut i = 0;
    while i + 1 < path.len() {
        let run = direction(i);
        out.push(PathStep {
            point: path[i],
            direction: run,
        });
        i += 1;
        while i + 1 < path.len() && direction(i) == run {
            i += 1;
        }
    }
    out.push(PathStep {
        point: last,
        direction: (0, 0),
    });
    out
}

/// Free list of path buffers.
///
/// A released result's storage is handed to the next acquired result, so a
/// steady stream of searches stops allocating.
#[derive(Debug, Default)]
pub struct PathPool {
    free: Vec<Vec<Point>>,
}

impl PathPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// A blank, not-found result, reusing pooled storage when available.
    pub fn acquire(&mut self) -> PathResult {
        let buf = self
            .free
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(MIN_PATH_CAPACITY));
        PathResult::with_buffer(buf)
    }

    /// Return a result's storage to the pool.
    pub fn release(&mut self, result: PathResult) {
        let mut buf = result.path;
        if buf.capacity() == 0 {
            return;
        }
        buf.clear();
        self.free.push(buf);
    }

    /// Number of buffers waiting for reuse.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Whether no buffer is waiting for reuse.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}
