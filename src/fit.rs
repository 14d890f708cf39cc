// Copyright 2024 the Arcfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Least-squares fitting of a circle constrained to pass through a chord.
//!
//! Every circle through both ends of a chord has its center on the chord's
//! perpendicular bisector, so the family is parametrized by a single signed
//! offset `d` of the center from the chord midpoint, along the chord's unit
//! normal. For a chord of length `k` the radius is `sqrt(d² + k²/4)`.
//!
//! The fit minimizes the summed squared radial deviation of the interior
//! points,
//!
//! ```text
//! G(d) = Σ (|center(d) - p_i| - radius(d))²
//! ```
//!
//! by running the secant method on the analytic derivative `G'(d)`. The
//! starting estimate comes from the circumcenter of the two chord ends and
//! the middle interior point.

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::solve_secant;
use crate::{Circle, Line, Point, Triangle, Vec2};

/// Width of the initial secant bracket, as a fraction of the chord length.
const SECANT_STEP: f64 = 0.1;

/// Center offset used when the seed points are collinear, as a fraction of
/// the chord length.
const FALLBACK_SEED_OFFSET: f64 = 0.1;

/// The best-fit circle through a chord, with its quality.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleFit {
    /// The fitted circle. The radius is always non-negative.
    pub circle: Circle,
    /// Root mean square of the radial deviation of the interior points.
    ///
    /// Zero when there are no interior points.
    pub rms: f64,
    /// Signed offset of the center from the chord midpoint, along
    /// [`Line::unit_normal`].
    pub offset: f64,
}

/// Fit a circle through both ends of `chord` that best matches `interior`.
///
/// The root-finder runs at most `max_iterations` secant steps and does not
/// check for convergence; see [`solve_secant`].
///
/// Returns `None` when the chord has zero length, as there is no
/// well-defined circle family through a single point. Otherwise a
/// best-effort fit is always returned, however poor; judging it is up to
/// the caller.
///
/// # Examples
///
/// ```
/// use arcfit::{fit_circle, Line, Point};
///
/// let chord = Line::new((0.0, 0.0), (10.0, 10.0));
/// let interior = [Point::new(10.0 - 50f64.sqrt(), 50f64.sqrt())];
/// let fit = fit_circle(chord, &interior, 10).unwrap();
/// assert!(fit.rms < 1e-9);
/// assert!((fit.circle.radius - 10.0).abs() < 1e-9);
/// assert!(fit.circle.center.distance(Point::new(10.0, 0.0)) < 1e-9);
/// ```
///
/// [`solve_secant`]: crate::common::solve_secant
pub fn fit_circle(chord: Line, interior: &[Point], max_iterations: usize) -> Option<CircleFit> {
    let normal = chord.unit_normal()?;
    let k = chord.length();
    let model = ChordFamily {
        mid: chord.midpoint(),
        normal,
        half_chord2: 0.25 * k * k,
    };

    let seed = interior
        .get(interior.len().saturating_sub(1) / 2)
        .and_then(|&p| Triangle::new(chord.p0, chord.p1, p).circumcenter())
        .map(|c| (c - model.mid).dot(normal))
        .filter(|d| d.is_finite())
        .unwrap_or(FALLBACK_SEED_OFFSET * k);

    let d = solve_secant(
        |d| model.cost_deriv(d, interior),
        seed - SECANT_STEP * k,
        seed,
        max_iterations,
    );

    let rms = if interior.is_empty() {
        0.0
    } else {
        (model.cost(d, interior) / interior.len() as f64).sqrt()
    };
    Some(CircleFit {
        circle: model.circle(d),
        rms,
        offset: d,
    })
}

/// Circles through the two ends of a fixed chord.
struct ChordFamily {
    mid: Point,
    normal: Vec2,
    half_chord2: f64,
}

impl ChordFamily {
    #[inline]
    fn center(&self, d: f64) -> Point {
        self.mid + d * self.normal
    }

    #[inline]
    fn radius(&self, d: f64) -> f64 {
        (d * d + self.half_chord2).sqrt()
    }

    fn circle(&self, d: f64) -> Circle {
        Circle::new(self.center(d), self.radius(d))
    }

    fn cost(&self, d: f64, pts: &[Point]) -> f64 {
        let circle = self.circle(d);
        pts.iter()
            .map(|&p| {
                let e = circle.radial_deviation(p);
                e * e
            })
            .sum()
    }

    fn cost_deriv(&self, d: f64, pts: &[Point]) -> f64 {
        let center = self.center(d);
        let r = self.radius(d);
        // r > 0 for any non-degenerate chord.
        let dr = d / r;
        pts.iter()
            .map(|&p| {
                let v = center - p;
                let dist = v.hypot();
                // The distance is not differentiable at the center itself.
                let ddist = if dist > 0.0 {
                    v.dot(self.normal) / dist
                } else {
                    0.0
                };
                2.0 * (dist - r) * (ddist - dr)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::PI;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{fit_circle, Line, Point, Vec2};

    fn on_circle(center: Point, radius: f64, theta: f64) -> Point {
        center + radius * Vec2::new(theta.cos(), theta.sin())
    }

    fn sample_arc(center: Point, radius: f64, start: f64, sweep: f64, n: usize) -> Vec<Point> {
        (0..=n)
            .map(|i| on_circle(center, radius, start + sweep * (i as f64 / n as f64)))
            .collect()
    }

    #[test]
    fn exact_circle() {
        let center = Point::new(3.0, -2.0);
        for n in [2, 3, 5, 9] {
            let pts = sample_arc(center, 5.0, 0.3, 1.9, n);
            let chord = Line::new(pts[0], pts[n]);
            let fit = fit_circle(chord, &pts[1..n], 10).unwrap();
            assert!(fit.rms < 1e-9, "n={n}: rms {}", fit.rms);
            assert!((fit.circle.radius - 5.0).abs() < 1e-9, "n={n}: {fit:?}");
            assert!(fit.circle.center.distance(center) < 1e-9, "n={n}: {fit:?}");
        }
    }

    #[test]
    fn exact_circle_major_arc() {
        // Interior points on the far side of the center from the chord.
        let center = Point::new(0.0, 0.0);
        let pts = sample_arc(center, 2.0, -0.25 * PI, 1.5 * PI, 6);
        let fit = fit_circle(Line::new(pts[0], pts[6]), &pts[1..6], 10).unwrap();
        assert!(fit.rms < 1e-9, "{fit:?}");
        assert!((fit.circle.radius - 2.0).abs() < 1e-9, "{fit:?}");
    }

    #[test]
    fn seed_is_exact_for_three_points() {
        let pts = sample_arc(Point::new(-1.0, 4.0), 7.5, 2.0, 0.6, 2);
        let fit = fit_circle(Line::new(pts[0], pts[2]), &pts[1..2], 0).unwrap();
        assert!(fit.rms < 1e-9);
        assert!((fit.circle.radius - 7.5).abs() < 1e-9);
    }

    #[test]
    fn degenerate_chord() {
        let p = Point::new(1.0, 1.0);
        let interior = [Point::new(2.0, 2.0), Point::new(3.0, 1.0)];
        assert!(fit_circle(Line::new(p, p), &interior, 10).is_none());
        assert!(fit_circle(Line::new(p, p), &[], 10).is_none());
        let nan = Point::new(f64::NAN, 0.0);
        assert!(fit_circle(Line::new(nan, p), &interior, 10).is_none());
    }

    #[test]
    fn no_interior_points() {
        let fit = fit_circle(Line::new((0.0, 0.0), (4.0, 0.0)), &[], 10).unwrap();
        assert_eq!(fit.rms, 0.0);
        assert!(fit.circle.is_finite());
        assert!(fit.circle.radius >= 2.0);
    }

    #[test]
    fn collinear_seed_falls_back() {
        let chord = Line::new((0.0, 0.0), (3.0, 0.0));
        let interior = [Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        let fit = fit_circle(chord, &interior, 10).unwrap();
        assert!(fit.circle.is_finite(), "{fit:?}");
        assert!(fit.rms.is_finite() && fit.rms >= 0.0, "{fit:?}");
    }

    #[test]
    fn noisy_arc() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let center = Point::new(50.0, 20.0);
        let radius = 20.0;
        let n = 12;
        let mut pts = sample_arc(center, radius, 0.1, 80f64.to_radians(), n);
        for p in &mut pts[1..n] {
            let dir = (*p - center).normalize();
            *p += rng.random_range(-0.001..0.001) * dir;
        }
        let fit = fit_circle(Line::new(pts[0], pts[n]), &pts[1..n], 10).unwrap();
        assert!(fit.rms <= 0.001, "{fit:?}");
        assert!((fit.circle.radius - radius).abs() < 0.1, "{fit:?}");
        assert!(fit.circle.center.distance(center) < 0.1, "{fit:?}");
    }
}
