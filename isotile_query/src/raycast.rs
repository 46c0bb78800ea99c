// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ray casting against chunk collision boxes.
//!
//! The segment is cut into a few steps. Each step queries a probe box around
//! its part of the segment in the chunks near it, and every box found is
//! tested against the whole ray with a slab test. The nearest hit wins.

use isotile_world::{
    Blocks, CHUNK_BOUNDS, CHUNK_SIZE, ChunkCoords, CollisionTag, NEIGHBOR_OFFSETS, ObjectId,
    Point, SearchCache, TILE_SIZE, World,
};
use kurbo::{Rect, Vec2};

/// Direction components smaller than this are treated as this, keeping the sign.
const EPS: f64 = 1e-6;

/// Probes are grown by this many pixels on every side.
const PROBE_FUZZ: u32 = 2;

/// Boxes are grown by this much before the slab test.
const BOX_FUZZ: f64 = 0.5;

/// Far end of the slab test.
const T_MAX: f64 = 16_777_216.0;

/// Outcome of a ray cast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaycastResult {
    /// Start of the ray.
    pub from: Point,
    /// End of the ray.
    pub to: Point,
    /// Where the ray stopped: `to` when nothing was hit.
    pub collision: Point,
    /// The box that stopped the ray.
    pub collider: Option<CollisionTag>,
    /// Distance travelled along the ray.
    pub distance: f64,
    /// Whether the ray reached `to`.
    pub success: bool,
}

/// One probe box, as recorded by [`raycast_with_diag`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Probe {
    /// Center of the probe.
    pub center: Point,
    /// Width and height, fuzz included.
    pub size: (u32, u32),
}

/// Intermediate values of a ray cast, for drawing and testing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RaycastDiag {
    /// Pixel vector from start to end.
    pub vector: Vec2,
    /// Unit direction.
    pub dir: Vec2,
    /// Per-axis inverse of the direction.
    pub dir_inv: Vec2,
    /// Probe size before the first and last steps are trimmed.
    pub step_size: (u32, u32),
    /// Ray parameter of the hit, zero on success.
    pub tmin: f64,
    /// Every probe, in order.
    pub path: Vec<Probe>,
}

trait Recorder {
    fn begin(&mut self, vector: Vec2, dir: Vec2, dir_inv: Vec2, step_size: (u32, u32), steps: u32);
    fn probe(&mut self, probe: Probe);
    fn finish(&mut self, tmin: f64);
}

impl Recorder for () {
    fn begin(&mut self, _: Vec2, _: Vec2, _: Vec2, _: (u32, u32), _: u32) {}
    fn probe(&mut self, _: Probe) {}
    fn finish(&mut self, _: f64) {}
}

impl Recorder for RaycastDiag {
    fn begin(&mut self, vector: Vec2, dir: Vec2, dir_inv: Vec2, step_size: (u32, u32), steps: u32) {
        self.vector = vector;
        self.dir = dir;
        self.dir_inv = dir_inv;
        self.step_size = step_size;
        self.tmin = 0.0;
        self.path.clear();
        self.path.reserve(steps as usize + 1);
    }

    fn probe(&mut self, probe: Probe) {
        self.path.push(probe);
    }

    fn finish(&mut self, tmin: f64) {
        self.tmin = tmin;
    }
}

/// Cast a ray that movement-blocking boxes stop.
///
/// # Panics
///
/// Panics if `from` and `to` are on different floors.
pub fn raycast(world: &World, from: Point, to: Point, own: Option<ObjectId>) -> RaycastResult {
    cast(&mut (), world, from, to, own, Blocks::MOVEMENT)
}

/// [`raycast`], recording every probe into `diag`.
pub fn raycast_with_diag(
    diag: &mut RaycastDiag,
    world: &World,
    from: Point,
    to: Point,
    own: Option<ObjectId>,
) -> RaycastResult {
    cast(diag, world, from, to, own, Blocks::MOVEMENT)
}

/// Cast a ray that only sight-blocking boxes stop.
pub fn line_of_sight(world: &World, from: Point, to: Point, own: Option<ObjectId>) -> RaycastResult {
    cast(&mut (), world, from, to, own, Blocks::SIGHT)
}

/// Slab test of a ray against a box; the entry parameter on a hit.
fn slab(origin: Vec2, dir_inv: Vec2, r: &Rect) -> Option<f64> {
    let (mut tmin, mut tmax) = (0.0_f64, T_MAX);
    for (o, inv, lo, hi) in [(origin.x, dir_inv.x, r.x0, r.x1), (origin.y, dir_inv.y, r.y0, r.y1)] {
        let (near, far) = if inv.is_sign_negative() { (hi, lo) } else { (lo, hi) };
        tmin = tmin.max((near - o) * inv);
        tmax = tmax.min((far - o) * inv);
    }
    (tmin < tmax).then_some(tmin)
}

fn inverse(d: f64) -> f64 {
    if d.abs() < EPS { (1.0 / EPS).copysign(d) } else { 1.0 / d }
}

fn signum(v: f64) -> i64 {
    i64::from(v > 0.0) - i64::from(v < 0.0)
}

fn axis(v: Vec2, long_is_y: bool) -> (f64, f64) {
    if long_is_y { (v.y, v.x) } else { (v.x, v.y) }
}

fn chunk_origin(c: ChunkCoords) -> (i64, i64) {
    let size = i64::from(CHUNK_SIZE);
    (i64::from(c.x) * size, i64::from(c.y) * size)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    reason = "pixel spans of a ray stay far inside the i32 and f64 mantissa ranges"
)]
fn cast<R: Recorder>(
    rec: &mut R,
    world: &World,
    from: Point,
    to: Point,
    own: Option<ObjectId>,
    traffic: Blocks,
) -> RaycastResult {
    assert_eq!(
        from.chunk().z,
        to.chunk().z,
        "raycast endpoints must share a floor"
    );

    let v = from.vec_to(to);
    let ray_len = v.hypot();
    let mut dir = if ray_len > 0.0 { v / ray_len } else { Vec2::ZERO };
    if dir.x.abs() < EPS && dir.y.abs() < EPS {
        dir = Vec2::new(EPS, EPS);
    }
    let long_is_y = dir.y.abs() > dir.x.abs();
    let (v_long, v_short) = axis(v, long_is_y);

    let long_len = (v_long.abs().ceil() as u32).max(1);
    let short_len = (v_short.abs().ceil() as u32).max(1);
    let tile = TILE_SIZE as u32;
    let chunk = CHUNK_SIZE as u32;
    let steps = 1_u32
        .max(short_len.div_ceil(tile))
        .max(long_len.div_ceil(chunk));
    let step_long = long_len.div_ceil(steps);
    let step_short = (short_len + steps * 2 - 1) / steps;

    let dir_inv = Vec2::new(inverse(dir.x), inverse(dir.y));
    let step_size = if long_is_y { (step_short, step_long) } else { (step_long, step_short) };
    rec.begin(v, dir, dir_inv, step_size, steps);

    let (from_gx, from_gy) = from.global_px();
    let mut cache = SearchCache::new(world);
    let mut best: Option<(f64, CollisionTag)> = None;

    for k in 0..=steps {
        let frac = f64::from(k) / f64::from(steps);
        let mut pos_long = ((v_long * frac).abs().ceil() as i64) * signum(v_long);
        let mut pos_short = ((v_short * frac).abs().ceil() as i64) * signum(v_short);
        let (mut size_long, mut size_short) = (step_long, step_short);

        if k == 0 {
            pos_long += i64::from(size_long / 4) * signum(v_long);
            size_long -= size_long / 2;
            pos_short += i64::from(size_short / 4) * signum(v_short);
            size_short -= size_short / 2;
        } else if k == steps {
            let add = tile.div_ceil(2);
            if size_long > tile + add {
                let off = size_long / 2 - add;
                pos_long -= i64::from(off / 2) * signum(v_long);
                size_long -= off;
            }
        }
        size_long += PROBE_FUZZ * 2;
        size_short += PROBE_FUZZ * 2;

        let (dx, dy, w, h) = if long_is_y {
            (pos_short, pos_long, size_short, size_long)
        } else {
            (pos_long, pos_short, size_long, size_short)
        };
        let center = from.normalize(dx as i32, dy as i32);
        rec.probe(Probe {
            center,
            size: (w, h),
        });

        let (cx, cy) = center.global_px();
        let x0 = cx - i64::from(w / 2);
        let y0 = cy - i64::from(h / 2);
        let probe = Rect::new(
            x0 as f64,
            y0 as f64,
            (x0 + i64::from(w)) as f64,
            (y0 + i64::from(h)) as f64,
        );

        for (ox, oy) in core::iter::once((0, 0)).chain(NEIGHBOR_OFFSETS) {
            let Some(coord) = center.chunk().checked_offset(ox, oy) else {
                continue;
            };
            let Some(chunk) = cache.chunk(coord) else {
                continue;
            };
            let (gx, gy) = chunk_origin(coord);
            let shift = Vec2::new(gx as f64, gy as f64);
            let query = (probe - shift).inflate(BOX_FUZZ, BOX_FUZZ);
            if !isotile_world::bbox::overlaps(&query, &CHUNK_BOUNDS) {
                continue;
            }
            let origin = Vec2::new((from_gx - gx) as f64, (from_gy - gy) as f64);
            chunk.search(&query, |tag, r| {
                if tag.is_owned_by(own) || !tag.pass.blocks().intersects(traffic) {
                    return true;
                }
                let Some(t) = slab(origin, dir_inv, &r.inflate(BOX_FUZZ, BOX_FUZZ)) else {
                    return true;
                };
                if t <= ray_len && best.is_none_or(|(b, _)| t < b) {
                    best = Some((t, *tag));
                }
                true
            });
        }
    }
    log::trace!(
        "raycast over {} steps: {}",
        steps + 1,
        if best.is_some() { "hit" } else { "clear" }
    );

    match best {
        Some((t, tag)) => {
            rec.finish(t);
            let hit = dir * t;
            RaycastResult {
                from,
                to,
                collision: from.normalize(hit.x as i32, hit.y as i32),
                collider: Some(tag),
                distance: t,
                success: false,
            }
        }
        None => {
            rec.finish(0.0);
            RaycastResult {
                from,
                to,
                collision: to,
                collider: None,
                distance: ray_len,
                success: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isotile_world::{Collider, GeometryPart, LocalCoords, PassMode, PixelOffset, Wall};

    const ORIGIN: ChunkCoords = ChunkCoords::new(0, 0, 0);

    fn at(chunk: ChunkCoords, x: u8, y: u8, dx: i8) -> Point {
        Point::new(chunk, LocalCoords::new(x, y), PixelOffset::new(dx, 0))
    }

    fn north_wall(pass: PassMode) -> World {
        let mut w = World::new();
        w.ensure_chunk(ORIGIN)
            .set_wall_north(LocalCoords::new(8, 9), Some(Wall::new(pass, 8.0)));
        w
    }

    #[test]
    fn ray_along_a_wall_edge_is_blocked() {
        let w = north_wall(PassMode::Blocked);
        let r = raycast(&w, at(ORIGIN, 8, 15, -32), at(ORIGIN, 8, 0, -32), None);
        assert!(!r.success);
        assert_eq!(r.collision.chunk(), ORIGIN);
        assert_eq!(r.collision.local(), LocalCoords::new(8, 9));
        assert_eq!(r.distance, 415.25);
        assert_eq!(
            r.collider.map(|t| t.collider),
            Some(Collider::Geometry {
                tile: LocalCoords::new(8, 9),
                part: GeometryPart::WallNorth,
            })
        );
    }

    #[test]
    fn clear_rays_reach_the_end() {
        let w = north_wall(PassMode::Blocked);
        let from = at(ORIGIN, 2, 15, 0);
        let to = at(ORIGIN, 2, 0, 0);
        let r = raycast(&w, from, to, None);
        assert!(r.success);
        assert_eq!(r.collision, to);
        assert_eq!(r.distance, 960.0);
        assert_eq!(r.collider, None);
    }

    #[test]
    fn sight_passes_see_through_walls() {
        let w = north_wall(PassMode::SeeThrough);
        let from = at(ORIGIN, 8, 15, 0);
        let to = at(ORIGIN, 8, 0, 0);
        assert!(!raycast(&w, from, to, None).success);
        assert!(line_of_sight(&w, from, to, None).success);
        let w = north_wall(PassMode::Blocked);
        assert!(!line_of_sight(&w, from, to, None).success);
    }

    #[test]
    fn rays_cross_chunks() {
        let mut w = World::new();
        w.ensure_chunk(ORIGIN);
        w.ensure_chunk(ORIGIN.offset(2, 0));
        w.ensure_chunk(ORIGIN.offset(1, 0))
            .set_wall_west(LocalCoords::new(5, 8), Some(Wall::new(PassMode::Blocked, 8.0)));
        let from = at(ORIGIN, 8, 8, 0);
        let to = at(ORIGIN.offset(2, 0), 8, 8, 0);
        let r = raycast(&w, from, to, None);
        assert!(!r.success);
        assert_eq!(r.collision, at(ORIGIN.offset(1, 0), 4, 8, 23));
        assert_eq!(r.distance, 791.25);

        let back = raycast(&w, to, from, None);
        assert!(!back.success);
        assert_eq!(back.collision.chunk(), ORIGIN.offset(1, 0));
        assert_eq!(back.collision.local(), LocalCoords::new(5, 8));
    }

    #[test]
    fn own_boxes_do_not_stop_the_ray() {
        let mut w = World::new();
        w.ensure_chunk(ORIGIN);
        let me = w.make_object(
            isotile_world::ObjectProto::critter(isotile_world::BoxSize::new(32, 32)),
            at(ORIGIN, 4, 4, 0),
        );
        let from = at(ORIGIN, 4, 4, 0);
        let to = at(ORIGIN, 12, 4, 0);
        assert!(!raycast(&w, from, to, None).success);
        assert!(raycast(&w, from, to, Some(me)).success);
    }

    #[test]
    fn diagnostics_do_not_change_the_answer() {
        let mut w = north_wall(PassMode::Blocked);
        w.ensure_chunk(ORIGIN.offset(-1, 1))
            .set_ground(LocalCoords::new(3, 3), Some(PassMode::Blocked));
        let rays = [
            (at(ORIGIN, 8, 15, -32), at(ORIGIN, 8, 0, -32)),
            (at(ORIGIN, 0, 0, 0), at(ORIGIN, 15, 15, 7)),
            (at(ORIGIN, 8, 15, 0), at(ORIGIN.offset(-1, 1), 3, 3, 0)),
            (at(ORIGIN, 3, 3, 5), at(ORIGIN, 3, 3, 5)),
            (at(ORIGIN, 1, 14, 0), at(ORIGIN, 14, 14, -3)),
        ];
        for (from, to) in rays {
            let mut diag = RaycastDiag::default();
            let plain = raycast(&w, from, to, None);
            let traced = raycast_with_diag(&mut diag, &w, from, to, None);
            assert_eq!(plain, traced);
            assert!(diag.path.len() >= 2);
            if plain.success {
                assert_eq!(diag.tmin, 0.0);
            } else {
                assert_eq!(diag.tmin, plain.distance);
            }
        }
    }

    #[test]
    fn long_rays_use_more_steps() {
        let w = World::new();
        let mut diag = RaycastDiag::default();
        let from = at(ORIGIN, 0, 0, 0);
        let to = at(ORIGIN.offset(3, 0), 0, 2, 0);
        let r = raycast_with_diag(&mut diag, &w, from, to, None);
        assert!(r.success);
        assert_eq!(diag.path.len(), 4);
        assert_eq!(diag.step_size, (1024, 44));
        assert_eq!(diag.path[0].center, from.normalize(256, 11));
        assert_eq!(diag.path[0].size, (516, 26));
    }

    #[test]
    #[should_panic(expected = "raycast endpoints must share a floor")]
    fn floors_must_match() {
        let w = World::new();
        let _ = raycast(
            &w,
            at(ORIGIN, 0, 0, 0),
            at(ChunkCoords::new(0, 0, 1), 0, 0, 0),
            None,
        );
    }
}
