// Copyright 2024 the Arcfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Triangle of three sample points, used to estimate a circle center.
use crate::{Point, Vec2};

/// Triangle
//     A
//     *
//    / \
//   /   \
//  *-----*
//  B     C
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    /// vertex a.
    pub a: Point,
    /// vertex b.
    pub b: Point,
    /// vertex c.
    pub c: Point,
}

impl Triangle {
    /// A new [`Triangle`] from three vertices ([`Point`]s).
    #[inline(always)]
    pub fn new(a: impl Into<Point>, b: impl Into<Point>, c: impl Into<Point>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            c: c.into(),
        }
    }

    /// The center of the circle through all three vertices.
    ///
    /// This is the intersection of the perpendicular bisectors of the sides.
    /// Returns `None` when the vertices are collinear (including when two of
    /// them coincide), as the bisectors are then parallel, and when the
    /// result would not be finite.
    pub fn circumcenter(&self) -> Option<Point> {
        let b = self.b - self.a;
        let c = self.c - self.a;
        let d = b.cross(c);
        if d == 0.0 {
            return None;
        }
        let b_len2 = b.hypot2();
        let c_len2 = c.hypot2();
        let d_recip = 0.5 / d;

        let x = (c.y * b_len2 - b.y * c_len2) * d_recip;
        let y = (b.x * c_len2 - c.x * b_len2) * d_recip;
        let center = self.a + Vec2::new(x, y);
        center.is_finite().then_some(center)
    }
}
