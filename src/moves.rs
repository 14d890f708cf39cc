// Copyright 2024 the Arcfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Buffered linear moves and the extrusion bookkeeping mode.

use crate::Point;

/// A straight move to `end` that deposits `amount` along the way.
///
/// The `amount` is the extrusion (E) word of the move; whether it is a
/// running total or a per-move delta depends on the [`ExtrusionMode`]
/// in effect.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    /// The position reached at the end of the move.
    pub end: Point,
    /// The deposition quantity associated with the move.
    pub amount: f64,
}

impl Move {
    /// Create a new move.
    #[inline]
    pub fn new(end: impl Into<Point>, amount: f64) -> Move {
        Move {
            end: end.into(),
            amount,
        }
    }
}

/// How the deposition quantity of consecutive moves relates.
///
/// Toggled in G-code by `M82` (absolute) and `M83` (relative).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExtrusionMode {
    /// Each amount is a running total; a merged move carries the last one.
    #[default]
    Absolute,
    /// Each amount is a delta; a merged move carries their sum.
    Relative,
}

impl ExtrusionMode {
    /// The amount a single move standing in for `moves` has to carry.
    ///
    /// Returns `0.0` for an empty slice.
    pub fn merged_amount(self, moves: &[Move]) -> f64 {
        match self {
            ExtrusionMode::Absolute => moves.last().map_or(0.0, |m| m.amount),
            ExtrusionMode::Relative => moves.iter().map(|m| m.amount).sum(),
        }
    }
}
