// Copyright 2024 the Arcfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Acceptance checks for a fitted circle, and the winding of the arc.

use core::fmt;
use core::iter;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::normalize_angle;
use crate::{fit_circle, ArcFitOptions, Circle, Line, Point};

/// Winding direction of an arc, with Y pointing up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArcDirection {
    /// Clockwise, `G2`.
    Clockwise,
    /// Counter-clockwise, `G3`.
    CounterClockwise,
}

/// Why a run of points was not accepted as an arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArcRejection {
    /// The start and the end of the run coincide.
    DegenerateChord,
    /// The points stray too far from the best-fit circle.
    FitError {
        /// RMS radial deviation of the interior points.
        rms: f64,
    },
    /// The points do not turn monotonically about the center.
    DirectionReversal,
    /// A single move sweeps too large an angle.
    StepAngle {
        /// The largest per-move angle, in radians.
        angle: f64,
    },
    /// A single move deviates too far from the arc.
    Sagitta {
        /// The per-move deviation estimate, `angle² × radius`.
        offset: f64,
    },
}

impl ArcRejection {
    /// Whether the input itself was degenerate, as opposed to merely not
    /// arc-like.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, ArcRejection::DegenerateChord)
    }
}

impl fmt::Display for ArcRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArcRejection::DegenerateChord => write!(f, "Chord has zero length"),
            ArcRejection::FitError { rms } => write!(f, "Fit error {rms} exceeds the limit"),
            ArcRejection::DirectionReversal => {
                write!(f, "Points do not turn monotonically about the center")
            }
            ArcRejection::StepAngle { angle } => {
                write!(f, "Step angle {angle} rad exceeds the limit")
            }
            ArcRejection::Sagitta { offset } => {
                write!(f, "Sagitta estimate {offset} exceeds the limit")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ArcRejection {}

/// Winding and radius sign of an accepted arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcSense {
    /// The winding direction.
    pub direction: ArcDirection,
    /// The radius, negated when the arc is the major (longer than a half
    /// turn) one of the two arcs sharing the chord and the circle.
    pub radius: f64,
}

/// A fitted and validated arc from a start point through a run of points.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcCandidate {
    /// The winding direction.
    pub direction: ArcDirection,
    /// Signed radius; negative selects the major arc.
    pub radius: f64,
    /// Center of the fitted circle.
    pub center: Point,
    /// RMS radial deviation of the interior points.
    pub fit_error: f64,
}

impl ArcCandidate {
    /// The fitted circle, with a non-negative radius.
    pub fn circle(&self) -> Circle {
        Circle::new(self.center, self.radius.abs())
    }

    /// Whether this is the major arc of its chord.
    pub fn is_major(&self) -> bool {
        self.radius < 0.0
    }
}

/// Signed angle increments between consecutive points, seen from the
/// center of `circle`.
///
/// The first increment is from `start` to the first of `points`. Each
/// increment is wrapped into (-π, π], so crossing the ±π direction does not
/// register as a near full turn.
pub fn angle_steps<I>(circle: Circle, start: Point, points: I) -> impl Iterator<Item = f64>
where
    I: IntoIterator<Item = Point>,
{
    let mut last = circle.angle_of(start);
    points.into_iter().map(move |p| {
        let a = circle.angle_of(p);
        let step = normalize_angle(a - last);
        last = a;
        step
    })
}

/// Check that the run `start`, `interior`, `end` traces `circle` acceptably.
///
/// All angle increments must share the sign of the first one (zero steps are
/// tolerated), the largest single increment must stay within
/// [`ArcFitOptions::angle_limit`], and `largest_step² × radius` within
/// [`ArcFitOptions::offset_limit`].
///
/// The RMS fit error is not checked here; see [`fit_and_validate`].
pub fn validate_arc(
    start: Point,
    end: Point,
    interior: &[Point],
    circle: Circle,
    options: &ArcFitOptions,
) -> Result<ArcSense, ArcRejection> {
    let mut steps = angle_steps(
        circle,
        start,
        interior.iter().copied().chain(iter::once(end)),
    );
    let first = steps.next().unwrap_or(0.0);
    let (direction, sign) = if first < 0.0 {
        (ArcDirection::Clockwise, -1.0)
    } else {
        (ArcDirection::CounterClockwise, 1.0)
    };

    let mut max_step = sign * first;
    for step in steps {
        let step = sign * step;
        if step < 0.0 {
            return Err(ArcRejection::DirectionReversal);
        }
        max_step = max_step.max(step);
    }
    if !(max_step <= options.angle_limit) {
        return Err(ArcRejection::StepAngle { angle: max_step });
    }
    let offset = max_step * max_step * circle.radius;
    if !(offset <= options.offset_limit) {
        return Err(ArcRejection::Sagitta { offset });
    }

    // The chord and the start radius turn the same way as the arc exactly
    // when the arc bulges past the center.
    let bulge = (end - start).cross(start - circle.center);
    let radius = if sign * bulge > 0.0 {
        -circle.radius
    } else {
        circle.radius
    };
    Ok(ArcSense { direction, radius })
}

/// Fit and validate an arc from `start` to `end` through `interior`.
///
/// This rejects a zero-length chord, an RMS fit error above
/// [`ArcFitOptions::rms_limit`], and everything [`validate_arc`] rejects.
///
/// # Examples
///
/// ```
/// use arcfit::{fit_and_validate, ArcDirection, ArcFitOptions, Point};
///
/// // Clockwise quarter turn about (10, 0), in 10 degree steps.
/// let pts: Vec<Point> = (1..=9)
///     .map(|i| {
///         let a = (180.0 - 10.0 * i as f64).to_radians();
///         Point::new(10.0 + 10.0 * a.cos(), 10.0 * a.sin())
///     })
///     .collect();
/// let opts = ArcFitOptions::default().offset_limit(0.5);
/// let arc = fit_and_validate(Point::ZERO, pts[8], &pts[..8], &opts).unwrap();
/// assert_eq!(arc.direction, ArcDirection::Clockwise);
/// assert!((arc.radius - 10.0).abs() < 1e-6);
/// ```
pub fn fit_and_validate(
    start: Point,
    end: Point,
    interior: &[Point],
    options: &ArcFitOptions,
) -> Result<ArcCandidate, ArcRejection> {
    let fit = fit_circle(Line::new(start, end), interior, options.max_iterations)
        .ok_or(ArcRejection::DegenerateChord)?;
    if !(fit.rms <= options.rms_limit) {
        return Err(ArcRejection::FitError { rms: fit.rms });
    }
    let sense = validate_arc(start, end, interior, fit.circle, options)?;
    Ok(ArcCandidate {
        direction: sense.direction,
        radius: sense.radius,
        center: fit.circle.center,
        fit_error: fit.rms,
    })
}

#[cfg(test)]
mod tests {
    use core::f64::consts::PI;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{
        angle_steps, fit_and_validate, validate_arc, ArcDirection, ArcFitOptions, ArcRejection,
        Circle, Point, Vec2,
    };

    fn arc_points(center: Point, radius: f64, start_deg: f64, step_deg: f64, n: usize) -> Vec<Point> {
        (0..=n)
            .map(|i| {
                let a = (start_deg + step_deg * i as f64).to_radians();
                center + radius * Vec2::new(a.cos(), a.sin())
            })
            .collect()
    }

    /// Points on a circle, starting at `start_deg` and turning by each of `steps_deg`.
    fn walk(center: Point, radius: f64, start_deg: f64, steps_deg: &[f64]) -> Vec<Point> {
        let mut a = start_deg;
        let mut angles = vec![a];
        for step in steps_deg {
            a += step;
            angles.push(a);
        }
        angles
            .into_iter()
            .map(|a| center + radius * Vec2::new(a.to_radians().cos(), a.to_radians().sin()))
            .collect()
    }

    fn relaxed() -> ArcFitOptions {
        ArcFitOptions::default().offset_limit(1.0)
    }

    #[test]
    fn steps_wrap_around_pi() {
        let circle = Circle::new((1.0, 1.0), 3.0);
        let pts = arc_points(circle.center, 3.0, 150.0, 10.0, 8);
        for step in angle_steps(circle, pts[0], pts[1..].iter().copied()) {
            assert!((step - 10f64.to_radians()).abs() < 1e-12, "{step}");
        }
        let back: Vec<f64> = angle_steps(circle, pts[8], pts[..8].iter().rev().copied()).collect();
        assert_eq!(back.len(), 8);
        assert!(back.iter().all(|s| (s + 10f64.to_radians()).abs() < 1e-12));
    }

    #[test]
    fn steps_stay_in_half_open_range() {
        let circle = Circle::new(Point::ZERO, 1.0);
        let pts = [
            Point::new(-1.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(-1.0, -1e-300),
            Point::new(0.0, 1.0),
        ];
        for step in angle_steps(circle, Point::new(1.0, 1e-9), pts) {
            assert!(step > -PI && step <= PI, "{step}");
        }
    }

    #[test]
    fn counter_clockwise_minor() {
        let center = Point::new(0.0, 0.0);
        let pts = arc_points(center, 2.0, -45.0, 10.0, 9);
        let sense = validate_arc(pts[0], pts[9], &pts[1..9], Circle::new(center, 2.0), &relaxed())
            .unwrap();
        assert_eq!(sense.direction, ArcDirection::CounterClockwise);
        assert_eq!(sense.radius, 2.0);
    }

    #[test]
    fn clockwise_minor() {
        let center = Point::new(5.0, 5.0);
        let pts = arc_points(center, 4.0, 100.0, -15.0, 6);
        let sense = validate_arc(pts[0], pts[6], &pts[1..6], Circle::new(center, 4.0), &relaxed())
            .unwrap();
        assert_eq!(sense.direction, ArcDirection::Clockwise);
        assert_eq!(sense.radius, 4.0);
    }

    #[test]
    fn major_arc_negates_radius() {
        let center = Point::new(0.0, 0.0);
        let ccw = arc_points(center, 2.0, -45.0, 10.0, 27);
        let sense = validate_arc(ccw[0], ccw[27], &ccw[1..27], Circle::new(center, 2.0), &relaxed())
            .unwrap();
        assert_eq!(sense.direction, ArcDirection::CounterClockwise);
        assert_eq!(sense.radius, -2.0);

        let cw: Vec<Point> = ccw.iter().rev().copied().collect();
        let sense = validate_arc(cw[0], cw[27], &cw[1..27], Circle::new(center, 2.0), &relaxed())
            .unwrap();
        assert_eq!(sense.direction, ArcDirection::Clockwise);
        assert_eq!(sense.radius, -2.0);
    }

    #[test]
    fn reversal_rejected() {
        let center = Point::new(0.0, 0.0);
        let mut pts = arc_points(center, 5.0, 0.0, 5.0, 6);
        // Swap two interior points so one increment runs backwards.
        pts.swap(3, 4);
        let err = validate_arc(pts[0], pts[6], &pts[1..6], Circle::new(center, 5.0), &relaxed())
            .unwrap_err();
        assert_eq!(err, ArcRejection::DirectionReversal);
    }

    #[test]
    fn reversal_at_the_end_rejected() {
        let center = Point::new(0.0, 0.0);
        let pts = arc_points(center, 5.0, 0.0, 5.0, 5);
        // The end steps back past the last interior point.
        let err = validate_arc(pts[0], pts[3], &pts[1..5], Circle::new(center, 5.0), &relaxed())
            .unwrap_err();
        assert_eq!(err, ArcRejection::DirectionReversal);
    }

    #[test]
    fn random_flipped_step_rejected() {
        let mut rng = StdRng::seed_from_u64(0xf11d);
        let opts = ArcFitOptions::default().offset_limit(10.0);
        for _ in 0..2_000 {
            let center = Point::new(rng.random_range(-100.0..100.0), rng.random_range(-100.0..100.0));
            let radius = rng.random_range(0.5..20.0);
            let circle = Circle::new(center, radius);
            let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let n = rng.random_range(2..=12_usize);
            let mut steps: Vec<f64> = (0..n).map(|_| sign * rng.random_range(1.0..10.0)).collect();
            let start = rng.random_range(-180.0..180.0);

            let pts = walk(center, radius, start, &steps);
            let sense = validate_arc(pts[0], pts[n], &pts[1..n], circle, &opts).unwrap();
            let direction = if sign > 0.0 {
                ArcDirection::CounterClockwise
            } else {
                ArcDirection::Clockwise
            };
            assert_eq!(sense.direction, direction);

            let j = rng.random_range(0..n);
            steps[j] = -steps[j];
            let pts = walk(center, radius, start, &steps);
            let err = validate_arc(pts[0], pts[n], &pts[1..n], circle, &opts).unwrap_err();
            assert_eq!(err, ArcRejection::DirectionReversal, "{steps:?}");
        }
    }

    #[test]
    fn step_angle_rejected() {
        let center = Point::new(0.0, 0.0);
        let pts = arc_points(center, 0.1, 0.0, 45.0, 3);
        let err = validate_arc(pts[0], pts[3], &pts[1..3], Circle::new(center, 0.1), &relaxed())
            .unwrap_err();
        assert!(matches!(err, ArcRejection::StepAngle { .. }), "{err:?}");
    }

    #[test]
    fn sagitta_rejected() {
        let center = Point::new(0.0, 0.0);
        let pts = arc_points(center, 10.0, 0.0, 20.0, 3);
        let opts = ArcFitOptions::default();
        let err = validate_arc(pts[0], pts[3], &pts[1..3], Circle::new(center, 10.0), &opts)
            .unwrap_err();
        match err {
            ArcRejection::Sagitta { offset } => {
                let step = 20f64.to_radians();
                assert!((offset - step * step * 10.0).abs() < 1e-9);
            }
            _ => panic!("unexpected {err:?}"),
        }
    }

    #[test]
    fn fit_and_validate_paths() {
        let p = Point::new(1.0, 1.0);
        assert_eq!(
            fit_and_validate(p, p, &[Point::new(2.0, 2.0)], &relaxed()),
            Err(ArcRejection::DegenerateChord)
        );
        assert!(ArcRejection::DegenerateChord.is_degenerate());

        let zigzag = [Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 1.0)];
        let err = fit_and_validate(Point::ZERO, Point::new(2.0, 2.0), &zigzag, &relaxed())
            .unwrap_err();
        assert!(!err.is_degenerate());

        let center = Point::new(-3.0, 2.0);
        let pts = arc_points(center, 6.0, 30.0, 5.0, 8);
        let arc = fit_and_validate(pts[0], pts[8], &pts[1..8], &ArcFitOptions::default()).unwrap();
        assert_eq!(arc.direction, ArcDirection::CounterClockwise);
        assert!((arc.radius - 6.0).abs() < 1e-9);
        assert!(arc.center.distance(center) < 1e-9);
        assert!(arc.fit_error < 1e-9);
        assert!(!arc.is_major());
        assert!((arc.circle().radius - 6.0).abs() < 1e-9);
    }

    #[test]
    fn rejection_display() {
        let msg = format!("{}", ArcRejection::Sagitta { offset: 0.5 });
        assert_eq!(msg, "Sagitta estimate 0.5 exceeds the limit");
    }
}
