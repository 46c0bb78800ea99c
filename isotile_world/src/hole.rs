// Copyright 2025 the Isotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle subtraction: the parts of a rectangle not covered by a hole.
//!
//! Which of the hole's edges reach past the rectangle's edges gives a 4-bit
//! case number; each case has a fixed pattern of output rectangles whose
//! corners are picked from the rectangle's and the hole's min/max coordinates.

use isotile_index::{Aabb2D, Scalar};

/// Most rectangles a single cut can produce.
pub const MAX_PIECES: usize = 8;

/// Result of cutting a hole out of a rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CutResult<T> {
    rects: [Aabb2D<T>; MAX_PIECES],
    len: u8,
    found: bool,
}

/// Coordinate source for one side of an output rectangle.
#[derive(Copy, Clone, Debug)]
enum Edge {
    R0,
    R1,
    H0,
    H1,
}

/// `[x0, x1, y0, y1]`.
type Piece = [Edge; 4];

#[derive(Copy, Clone)]
struct Case {
    len: u8,
    pieces: [Piece; MAX_PIECES],
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "patterns hold at most MAX_PIECES pieces"
)]
const fn case<const N: usize>(pieces: [Piece; N]) -> Case {
    let mut out = [[Edge::R0; 4]; MAX_PIECES];
    let mut i = 0;
    while i < N {
        out[i] = pieces[i];
        i += 1;
    }
    Case {
        len: N as u8,
        pieces: out,
    }
}

const SX: usize = 1 << 0;
const EX: usize = 1 << 1;
const SY: usize = 1 << 2;
const EY: usize = 1 << 3;

/// Indexed by which hole edges cover the rectangle's edges.
const CASES: [Case; 16] = {
    use Edge::{H0, H1, R0, R1};
    let mut t = [case([]); 16];
    t[SX | EX | SY | EY] = case([]);
    t[0] = case([
        [R0, H0, R0, H0],
        [H0, H1, R0, H0],
        [H1, R1, R0, H0],
        [R0, H0, H0, H1],
        [H1, R1, H0, H1],
        [R0, H0, H1, R1],
        [H0, H1, H1, R1],
        [H1, R1, H1, R1],
    ]);
    t[SX | EX] = case([[R0, R1, R0, H0], [R0, R1, H1, R1]]);
    t[SY | EY] = case([[R0, H0, R0, R1], [H1, R1, R0, R1]]);
    t[SX | EX | SY] = case([[R0, R1, H1, R1]]);
    t[SX | EX | EY] = case([[R0, R1, R0, H0]]);
    t[SX | SY | EY] = case([[H1, R1, R0, R1]]);
    t[EX | SY | EY] = case([[R0, H0, R0, R1]]);
    t[SX] = case([[R0, R1, R0, H0], [H1, R1, H0, H1], [R0, R1, H1, R1]]);
    t[EX] = case([[R0, R1, R0, H0], [R0, H0, H0, H1], [R0, R1, H1, R1]]);
    t[SY] = case([[R0, H0, R0, R1], [H0, H1, H1, R1], [H1, R1, R0, R1]]);
    t[EY] = case([[R0, H0, R0, R1], [H0, H1, R0, H0], [H1, R1, R0, R1]]);
    t[SX | SY] = case([[H1, R1, R0, H1], [R0, R1, H1, R1]]);
    t[EX | SY] = case([[R0, H0, R0, H1], [R0, R1, H1, R1]]);
    t[SX | EY] = case([[R0, R1, R0, H0], [H1, R1, H0, R1]]);
    t[EX | EY] = case([[R0, R1, R0, H0], [R0, H0, H0, R1]]);
    t
};

impl<T: Scalar> CutResult<T> {
    /// Cut `hole` out of `rect`.
    ///
    /// If the two do not overlap, or either has no area, the result is `rect`
    /// itself and [`found`](Self::found) is `false`.
    pub fn cut(rect: Aabb2D<T>, hole: Aabb2D<T>) -> Self {
        let zero = Aabb2D::new(T::zero(), T::zero(), T::zero(), T::zero());
        let mut rects = [zero; MAX_PIECES];
        if rect.is_degenerate() || hole.is_degenerate() || !rect.overlaps(&hole) {
            rects[0] = rect;
            return Self {
                rects,
                len: 1,
                found: false,
            };
        }

        let mut case_no = 0;
        if hole.min_x <= rect.min_x {
            case_no |= SX;
        }
        if hole.max_x >= rect.max_x {
            case_no |= EX;
        }
        if hole.min_y <= rect.min_y {
            case_no |= SY;
        }
        if hole.max_y >= rect.max_y {
            case_no |= EY;
        }
        let case = &CASES[case_no];

        let xs = [rect.min_x, rect.max_x, hole.min_x, hole.max_x];
        let ys = [rect.min_y, rect.max_y, hole.min_y, hole.max_y];
        let pieces = &case.pieces[..usize::from(case.len)];
        for (out, &[x0, x1, y0, y1]) in rects.iter_mut().zip(pieces) {
            *out = Aabb2D::new(
                xs[x0 as usize],
                ys[y0 as usize],
                xs[x1 as usize],
                ys[y1 as usize],
            );
        }
        Self {
            rects,
            len: case.len,
            found: true,
        }
    }

    /// Cut a hole given as center and size out of a rectangle given the same way.
    pub fn cut_centered(rect: (T, T, T, T), hole: (T, T, T, T)) -> Self {
        Self::cut(
            Aabb2D::from_center_size(rect.0, rect.1, rect.2, rect.3),
            Aabb2D::from_center_size(hole.0, hole.1, hole.2, hole.3),
        )
    }
}

impl<T> CutResult<T> {
    /// Whether the hole overlapped the rectangle.
    pub fn found(&self) -> bool {
        self.found
    }

    /// The remaining pieces.
    pub fn as_slice(&self) -> &[Aabb2D<T>] {
        &self.rects[..usize::from(self.len)]
    }

    /// Number of remaining pieces.
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Whether the hole covered the whole rectangle.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate the remaining pieces.
    pub fn iter(&self) -> core::slice::Iter<'_, Aabb2D<T>> {
        self.as_slice().iter()
    }
}

impl<'a, T> IntoIterator for &'a CutResult<T> {
    type Item = &'a Aabb2D<T>;
    type IntoIter = core::slice::Iter<'a, Aabb2D<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
