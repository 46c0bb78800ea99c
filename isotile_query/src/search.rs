// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A* and Dijkstra over a 16 px grid anchored at the start point.

use std::collections::{BinaryHeap, HashMap};

use core::cmp::Ordering;
use core::fmt;

use isotile_world::bbox::swept_box;
use isotile_world::{BoxSize, CollisionTag, ObjectId, Point, SearchCache, SearchContinue, World};

use crate::config::{DIAGONAL_COST, DIV_SIZE, MIN_MOVER_SIZE, STEP_COST, SearchConfig};
use crate::error::ConfigError;
use crate::result::{PathPool, PathResult};

const NONE: u32 = u32::MAX;

const DIRECTIONS: [(i32, i32, u32); 8] = [
    (-1, -1, DIAGONAL_COST),
    (1, 1, DIAGONAL_COST),
    (-1, 1, DIAGONAL_COST),
    (1, -1, DIAGONAL_COST),
    (-1, 0, STEP_COST),
    (0, -1, STEP_COST),
    (1, 0, STEP_COST),
    (0, 1, STEP_COST),
];

/// What to search for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathRequest {
    /// Start position.
    pub from: Point,
    /// Goal position.
    pub to: Point,
    /// The mover, whose own boxes never block it.
    pub own_id: Option<ObjectId>,
    /// Size of the mover's box. Raised to [`MIN_MOVER_SIZE`].
    pub own_size: BoxSize,
}

impl PathRequest {
    /// A request for a minimum-size mover with no boxes of its own.
    pub fn new(from: Point, to: Point) -> Self {
        Self {
            from,
            to,
            own_id: None,
            own_size: MIN_MOVER_SIZE,
        }
    }

    /// Ignore the boxes of `id`.
    pub fn with_owner(mut self, id: ObjectId) -> Self {
        self.own_id = Some(id);
        self
    }

    /// Search for a mover of `size`.
    pub fn with_size(mut self, size: BoxSize) -> Self {
        self.own_size = size;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    AStar,
    Dijkstra,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AStar => "A*",
            Self::Dijkstra => "Dijkstra",
        })
    }
}

#[derive(Copy, Clone, Debug)]
struct Node {
    point: Point,
    cost: u32,
    prev: u32,
}

/// Heap entry; the smallest `(f, h, seq)` pops first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Entry {
    f: u32,
    h: u32,
    seq: u64,
    node: u32,
    cost: u32,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.f, other.h, other.seq).cmp(&(self.f, self.h, self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Runs path searches, keeping its buffers and result pool between runs.
pub struct Searcher {
    config: SearchConfig,
    pool: PathPool,
    nodes: Vec<Node>,
    lookup: HashMap<Point, u32>,
    heap: BinaryHeap<Entry>,
    seq: u64,
    expanded: usize,
}

impl fmt::Debug for Searcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Searcher")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .field("nodes", &self.nodes.len())
            .field("expanded", &self.expanded)
            .finish_non_exhaustive()
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::with_valid_config(SearchConfig::default())
    }
}

impl Searcher {
    /// A searcher with the given budgets.
    pub fn new(config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: SearchConfig) -> Self {
        Self {
            config,
            pool: PathPool::new(),
            nodes: Vec::new(),
            lookup: HashMap::new(),
            heap: BinaryHeap::new(),
            seq: 0,
            expanded: 0,
        }
    }

    /// Budgets in use.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The pool results are drawn from.
    pub fn pool(&self) -> &PathPool {
        &self.pool
    }

    /// Hand a result's storage back for reuse.
    pub fn release(&mut self, result: PathResult) {
        self.pool.release(result);
    }

    /// Nodes expanded by the last search.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Cheapest path by A* with a Euclidean heuristic.
    pub fn astar<P>(&mut self, world: &World, req: &PathRequest, pred: &P) -> PathResult
    where
        P: Fn(&CollisionTag) -> SearchContinue + ?Sized,
    {
        self.run(world, req, pred, Mode::AStar)
    }

    /// Cheapest path by exhaustive uniform-cost search.
    ///
    /// Finds the same cost as [`astar`](Self::astar) while expanding more
    /// nodes; meant for checking it.
    pub fn dijkstra<P>(&mut self, world: &World, req: &PathRequest, pred: &P) -> PathResult
    where
        P: Fn(&CollisionTag) -> SearchContinue + ?Sized,
    {
        self.run(world, req, pred, Mode::Dijkstra)
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.lookup.clear();
        self.heap.clear();
        self.seq = 0;
        self.expanded = 0;
    }

    fn push(&mut self, node: u32, cost: u32, h: u32) {
        self.heap.push(Entry {
            f: cost.saturating_add(h),
            h,
            seq: self.seq,
            node,
            cost,
        });
        self.seq += 1;
    }

    fn run<P>(&mut self, world: &World, req: &PathRequest, pred: &P, mode: Mode) -> PathResult
    where
        P: Fn(&CollisionTag) -> SearchContinue + ?Sized,
    {
        let mut result = self.pool.acquire();
        self.clear();
        let PathRequest {
            from, to, own_id, ..
        } = *req;
        if from.chunk().z != to.chunk().z {
            log::debug!("{mode}: start and goal on different floors");
            return result;
        }

        let size = req.own_size.max(MIN_MOVER_SIZE);
        let mut cache = SearchCache::new(world);
        let mut passable = |at: Point, prev: Point| {
            cache.is_passable(at.chunk(), &swept_box(at, prev, size), own_id, pred)
        };
        if !passable(from, from) || !passable(to, to) {
            log::debug!("{mode}: start or goal is blocked");
            return result;
        }

        let heuristic = |p: Point| match mode {
            Mode::AStar => p.distance(to),
            Mode::Dijkstra => 0,
        };

        self.nodes.push(Node {
            point: from,
            cost: 0,
            prev: NONE,
        });
        self.lookup.insert(from, 0);
        self.push(0, 0, heuristic(from));

        let mut best = self.config.max_cost;
        let mut goal = NONE;
        let (mut closest, mut closest_dist) = (0, u32::MAX);

        while let Some(entry) = self.heap.pop() {
            let Node { point, cost, .. } = self.nodes[entry.node as usize];
            if entry.cost != cost {
                continue;
            }
            if entry.f >= best {
                if mode == Mode::AStar {
                    break;
                }
                continue;
            }
            if self.expanded >= self.config.max_nodes {
                log::debug!(
                    "{mode}: node budget of {} exhausted",
                    self.config.max_nodes
                );
                break;
            }
            self.expanded += 1;

            let dist = point.distance(to);
            if dist < closest_dist {
                (closest, closest_dist) = (entry.node, dist);
            }
            if dist < self.config.goal_tolerance {
                let total = cost.saturating_add(ceil_distance(point, to));
                if total < best && passable(to, point) {
                    best = total;
                    goal = entry.node;
                    continue;
                }
            }

            for (dx, dy, step) in DIRECTIONS {
                let next_cost = cost.saturating_add(step);
                if next_cost >= best {
                    continue;
                }
                let Some(next) = point.checked_normalize(dx * DIV_SIZE, dy * DIV_SIZE) else {
                    continue;
                };
                let known = self.lookup.get(&next).copied();
                if known.is_some_and(|i| self.nodes[i as usize].cost <= next_cost) {
                    continue;
                }
                if !passable(next, point) {
                    continue;
                }
                let idx = match known {
                    Some(i) => {
                        let n = &mut self.nodes[i as usize];
                        n.cost = next_cost;
                        n.prev = entry.node;
                        i
                    }
                    None => {
                        let i = u32::try_from(self.nodes.len()).unwrap_or(NONE);
                        if i == NONE {
                            continue;
                        }
                        self.nodes.push(Node {
                            point: next,
                            cost: next_cost,
                            prev: entry.node,
                        });
                        self.lookup.insert(next, i);
                        i
                    }
                };
                self.push(idx, next_cost, heuristic(next));
            }
        }

        if goal != NONE {
            self.write_path(&mut result, goal, Some(to));
            result.finish(true, best, 0);
        } else {
            self.write_path(&mut result, closest, None);
            let cost = self.nodes[closest as usize].cost;
            result.finish(false, cost, closest_dist);
        }
        log::debug!(
            "{mode}: found={} cost={} distance={} expanded={} nodes={}",
            result.is_found(),
            result.cost(),
            result.distance(),
            self.expanded,
            self.nodes.len()
        );
        result
    }

    fn write_path(&self, result: &mut PathResult, last: u32, goal: Option<Point>) {
        let points = result.points_mut();
        points.clear();
        if let Some(goal) = goal
            && self.nodes[last as usize].point != goal
        {
            points.push(goal);
        }
        let mut i = last;
        while i != NONE {
            let node = &self.nodes[i as usize];
            points.push(node.point);
            i = node.prev;
        }
        points.reverse();
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "goal distances are below the goal tolerance"
)]
fn ceil_distance(a: Point, b: Point) -> u32 {
    a.vec_to(b).hypot().ceil() as u32
}
