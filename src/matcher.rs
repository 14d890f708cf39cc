// Copyright 2024 the Arcfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy matching of buffered moves to the longest acceptable arc.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use log::{debug, trace};

use crate::{
    fit_and_validate, ArcCandidate, ArcDirection, ArcFitOptions, ExtrusionMode, Move, Point, Vec2,
};

/// An arc standing in for a run of buffered moves.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcMove {
    /// The winding direction.
    pub direction: ArcDirection,
    /// Signed radius; negative selects the major arc.
    pub radius: f64,
    /// Center of the arc.
    pub center: Point,
    /// Position before the first replaced move.
    pub start: Point,
    /// Position after the last replaced move.
    pub end: Point,
    /// The merged deposition quantity, see [`ExtrusionMode::merged_amount`].
    pub amount: f64,
    /// Number of moves replaced.
    pub consumed: usize,
    /// RMS radial deviation of the replaced interior points.
    pub fit_error: f64,
}

impl ArcMove {
    /// Offset of the center from the start, the `I`/`J` words of an arc.
    #[inline]
    pub fn center_offset(&self) -> Vec2 {
        self.center - self.start
    }
}

/// The decision taken for the front of a move buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Commit {
    /// The first [`ArcMove::consumed`] moves become one arc.
    Arc(ArcMove),
    /// The first move is emitted unchanged.
    Passthrough(Move),
}

impl Commit {
    /// Number of buffered moves this decision removes; always at least one.
    pub fn consumed(&self) -> usize {
        match self {
            Commit::Arc(arc) => arc.consumed,
            Commit::Passthrough(_) => 1,
        }
    }

    /// The position reached after this decision.
    pub fn end(&self) -> Point {
        match self {
            Commit::Arc(arc) => arc.end,
            Commit::Passthrough(mv) => mv.end,
        }
    }

    /// The deposition quantity carried by the emitted move.
    pub fn amount(&self) -> f64 {
        match self {
            Commit::Arc(arc) => arc.amount,
            Commit::Passthrough(mv) => mv.amount,
        }
    }

    /// Whether an arc was found.
    pub fn is_arc(&self) -> bool {
        matches!(self, Commit::Arc(_))
    }
}

/// Whether a matcher has enough moves buffered to attempt a fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchState {
    /// Fewer moves than [`ArcFitOptions::min_run`] are buffered.
    Idle,
    /// Enough moves are buffered to look for an arc.
    Scanning,
}

/// Decide what to emit for the front of `pending`, starting at `position`.
///
/// Runs of increasing length, from the minimum run length up, are fitted
/// with [`fit_and_validate`]; the first rejection ends the search, so at
/// most `pending.len() - min_run + 1` fits are attempted. The longest
/// accepted run becomes an arc. When no run is accepted, including when
/// fewer than `min_run` moves are buffered, the first move passes through.
///
/// Returns `None` only for an empty buffer.
///
/// # Examples
///
/// ```
/// use arcfit::{try_extend, ArcFitOptions, Commit, ExtrusionMode, Move, Point};
///
/// let pending = [
///     Move::new((1.0, 0.0), 0.1),
///     Move::new((1.0, 1.0), 0.2),
///     Move::new((2.0, 1.0), 0.3),
///     Move::new((2.0, 2.0), 0.4),
/// ];
/// let opts = ArcFitOptions::default();
/// let commit = try_extend(Point::ZERO, &pending, ExtrusionMode::Absolute, &opts).unwrap();
/// assert_eq!(commit, Commit::Passthrough(pending[0]));
/// ```
pub fn try_extend(
    position: Point,
    pending: &[Move],
    mode: ExtrusionMode,
    options: &ArcFitOptions,
) -> Option<Commit> {
    let first = *pending.first()?;
    let commit = match longest_arc(position, pending, options) {
        Some((len, arc)) => Commit::Arc(ArcMove {
            direction: arc.direction,
            radius: arc.radius,
            center: arc.center,
            start: position,
            end: pending[len - 1].end,
            amount: mode.merged_amount(&pending[..len]),
            consumed: len,
            fit_error: arc.fit_error,
        }),
        None => Commit::Passthrough(first),
    };
    Some(commit)
}

/// The interior points grow by one per accepted run, so a decision copies
/// no more than the longest accepted run plus one.
fn longest_arc(
    start: Point,
    pending: &[Move],
    options: &ArcFitOptions,
) -> Option<(usize, ArcCandidate)> {
    let min_run = options.effective_min_run();
    let mut interior: Vec<Point> = pending.iter().take(min_run - 1).map(|mv| mv.end).collect();
    let mut best = None;
    for len in min_run..=pending.len() {
        let end = pending[len - 1].end;
        match fit_and_validate(start, end, &interior, options) {
            Ok(arc) => {
                trace!("run of {len} accepted, r={} rms={}", arc.radius, arc.fit_error);
                best = Some((len, arc));
                interior.push(end);
            }
            Err(err) => {
                trace!("run of {len} rejected: {err}");
                break;
            }
        }
    }
    best
}

/// Buffers moves and replaces runs of them with arcs.
///
/// This owns all state the matching needs: the pending moves, the position
/// before the first of them, and the extrusion mode.
///
/// # Examples
///
/// ```
/// use arcfit::{ArcFitOptions, ArcMatcher, Move, Point};
///
/// let mut matcher = ArcMatcher::new(ArcFitOptions::default());
/// for i in 1..=6 {
///     let a = (180.0 - 5.0 * i as f64).to_radians();
///     matcher.push(Move::new((10.0 + 10.0 * a.cos(), 10.0 * a.sin()), 0.01 * i as f64));
/// }
/// let commits: Vec<_> = matcher.flush().collect();
/// assert_eq!(commits.len(), 1);
/// assert!(commits[0].is_arc());
/// assert!(matcher.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct ArcMatcher {
    pending: VecDeque<Move>,
    position: Point,
    mode: ExtrusionMode,
    options: ArcFitOptions,
}

impl ArcMatcher {
    /// Create an empty matcher at the origin, in absolute extrusion mode.
    pub fn new(options: ArcFitOptions) -> Self {
        ArcMatcher {
            pending: VecDeque::new(),
            position: Point::ZERO,
            mode: ExtrusionMode::default(),
            options,
        }
    }

    /// The options in use.
    pub fn options(&self) -> &ArcFitOptions {
        &self.options
    }

    /// The position before the first buffered move.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Set the position before the first buffered move.
    ///
    /// Meant for tracking moves that bypass the matcher, so it is normally
    /// called with an empty buffer.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Set only the x coordinate of the position.
    pub fn set_x(&mut self, x: f64) {
        self.position.x = x;
    }

    /// Set only the y coordinate of the position.
    pub fn set_y(&mut self, y: f64) {
        self.position.y = y;
    }

    /// The extrusion mode applied to merged amounts.
    pub fn extrusion_mode(&self) -> ExtrusionMode {
        self.mode
    }

    /// Set the extrusion mode applied to merged amounts.
    pub fn set_extrusion_mode(&mut self, mode: ExtrusionMode) {
        self.mode = mode;
    }

    /// Append a move to the buffer.
    pub fn push(&mut self, mv: Move) {
        self.pending.push_back(mv);
    }

    /// Number of buffered moves.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no moves are buffered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The buffered moves, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Move> + '_ {
        self.pending.iter()
    }

    /// Whether enough moves are buffered to look for an arc.
    pub fn state(&self) -> MatchState {
        if self.pending.len() < self.options.effective_min_run() {
            MatchState::Idle
        } else {
            MatchState::Scanning
        }
    }

    /// Take one decision for the front of the buffer.
    ///
    /// The consumed moves are removed and the position advances to the end
    /// of the emitted move. Returns `None` when the buffer is empty.
    pub fn try_extend(&mut self) -> Option<Commit> {
        let commit = try_extend(
            self.position,
            self.pending.make_contiguous(),
            self.mode,
            &self.options,
        )?;
        self.pending.drain(..commit.consumed());
        self.position = commit.end();
        match &commit {
            Commit::Arc(arc) => debug!(
                "arc over {} moves to {:?}, r={:.3}",
                arc.consumed, arc.end, arc.radius
            ),
            Commit::Passthrough(mv) => debug!("passthrough to {:?}", mv.end),
        }
        Some(commit)
    }

    /// Decide on every buffered move, front to back.
    ///
    /// Moves not yet decided when the iterator is dropped stay buffered.
    pub fn flush(&mut self) -> Flush<'_> {
        Flush { matcher: self }
    }
}

impl Default for ArcMatcher {
    fn default() -> Self {
        Self::new(ArcFitOptions::default())
    }
}

/// Iterator returned by [`ArcMatcher::flush`].
#[derive(Debug)]
pub struct Flush<'a> {
    matcher: &'a mut ArcMatcher,
}

impl Iterator for Flush<'_> {
    type Item = Commit;

    fn next(&mut self) -> Option<Commit> {
        self.matcher.try_extend()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.matcher.len();
        (usize::from(len > 0), Some(len))
    }
}
