// Copyright 2024 the Arcfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lines.

use crate::{Point, Vec2};

/// A single line.
///
/// In arc fitting this is the chord joining the start and the end of a
/// candidate arc.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// The line's start point.
    pub p0: Point,
    /// The line's end point.
    pub p1: Point,
}

impl Line {
    /// Create a new line.
    #[inline(always)]
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Line {
        Line {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    /// The length of the line.
    #[inline]
    pub fn length(self) -> f64 {
        (self.p1 - self.p0).hypot()
    }

    /// The midpoint of the line.
    ///
    /// This is the same as calling [`Point::midpoint`] with
    /// the endpoints of this line.
    #[must_use]
    #[inline]
    pub fn midpoint(&self) -> Point {
        self.p0.midpoint(self.p1)
    }

    /// The unit normal of the line, the direction vector turned by 90 degrees.
    ///
    /// Returns `None` for a zero-length line, which has no direction.
    pub fn unit_normal(self) -> Option<Vec2> {
        let d = self.p1 - self.p0;
        let len = d.hypot();
        if len > 0.0 && len.is_finite() {
            Some(d.turn_90() / len)
        } else {
            None
        }
    }
}
