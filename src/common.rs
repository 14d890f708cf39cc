// Copyright 2024 the Arcfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Common mathematical operations

#![allow(missing_docs)]

use core::f64::consts::PI;

/// Defines a trait that chooses between libstd or libm implementations of float methods.
macro_rules! define_float_funcs {
    ($(
        fn $name:ident(self $(,$arg:ident: $arg_ty:ty)*) -> $ret:ty
        => $lname:ident/$lfname:ident;
    )+) => {
        #[cfg(not(feature = "std"))]
        pub(crate) trait FloatFuncs : Sized {
            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret;)+
        }

        #[cfg(not(feature = "std"))]
        impl FloatFuncs for f32 {
            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret {
                #[cfg(feature = "libm")]
                return libm::$lfname(self $(,$arg as _)*);

                #[cfg(not(feature = "libm"))]
                compile_error!("arcfit requires either the `std` or `libm` feature")
            })+
        }

        #[cfg(not(feature = "std"))]
        impl FloatFuncs for f64 {
            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret {
                #[cfg(feature = "libm")]
                return libm::$lname(self $(,$arg as _)*);

                #[cfg(not(feature = "libm"))]
                compile_error!("arcfit requires either the `std` or `libm` feature")
            })+
        }
    }
}

define_float_funcs! {
    fn abs(self) -> Self => fabs/fabsf;
    fn atan2(self, other: Self) -> Self => atan2/atan2f;
    fn hypot(self, other: Self) -> Self => hypot/hypotf;
    fn round(self) -> Self => round/roundf;
    fn sqrt(self) -> Self => sqrt/sqrtf;
}

/// Wrap an angle difference into the half-open range (-π, π].
///
/// Differences of two `atan2` results lie in (-2π, 2π), so a single
/// correction step is enough for them; larger inputs are reduced by
/// whole turns.
///
/// # Examples
///
/// ```
/// use arcfit::common::normalize_angle;
/// use core::f64::consts::PI;
///
/// assert_eq!(normalize_angle(-PI), PI);
/// assert!((normalize_angle(1.5 * PI) + 0.5 * PI).abs() < 1e-12);
/// ```
pub fn normalize_angle(theta: f64) -> f64 {
    if !theta.is_finite() {
        return theta;
    }
    let mut a = theta;
    if a.abs() > 4.0 * PI {
        a -= (a / (2.0 * PI)).round() * (2.0 * PI);
    }
    while a > PI {
        a -= 2.0 * PI;
    }
    while a <= -PI {
        a += 2.0 * PI;
    }
    a
}

/// Find a zero of `f` with the secant method.
///
/// Starting from the two abscissae `x0` and `x1`, this runs at most
/// `max_iter` secant updates and returns the latest estimate. There is no
/// convergence tolerance: the iteration count alone bounds the work. The
/// loop stops early when two consecutive samples of `f` are equal (the
/// update would divide by zero) or when an update is not finite, in which
/// case the last finite estimate is kept.
///
/// The returned value is `x1` when `max_iter` is zero.
pub fn solve_secant(mut f: impl FnMut(f64) -> f64, x0: f64, x1: f64, max_iter: usize) -> f64 {
    let (mut x_last, mut x) = (x0, x1);
    let (mut y_last, mut y) = (f(x_last), f(x));
    for _ in 0..max_iter {
        if y_last == y {
            break;
        }
        let next = x + y * (x - x_last) / (y_last - y);
        if !next.is_finite() {
            break;
        }
        x_last = x;
        x = next;
        y_last = y;
        y = f(x);
    }
    x
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn normalize_range() {
        let samples = [
            -7.0 * PI,
            -3.0 * PI,
            -PI,
            -0.5,
            0.0,
            0.5,
            PI,
            PI + 1e-9,
            1.999 * PI,
            3.0 * PI,
            123.456,
        ];
        for theta in samples {
            let a = normalize_angle(theta);
            assert!(a > -PI && a <= PI, "{theta} -> {a}");
            // Same direction as the input.
            let turns = (theta - a) / (2.0 * PI);
            assert!((turns - turns.round()).abs() < 1e-9, "{theta} -> {a}");
        }
    }

    #[test]
    fn normalize_atan2_differences() {
        let angles = [-3.1, -2.0, -0.1, 0.0, 0.7, 1.6, 3.14];
        for &a in &angles {
            for &b in &angles {
                let d = normalize_angle(b - a);
                assert!(d > -PI && d <= PI, "{a} {b} -> {d}");
            }
        }
        assert_eq!(normalize_angle(PI), PI);
        assert_eq!(normalize_angle(-PI), PI);
    }

    #[test]
    fn normalize_random_pairs() {
        let mut rng = StdRng::seed_from_u64(0xa7c);
        for _ in 0..10_000 {
            let a = rng.random_range(-1.0..1.0_f64).atan2(rng.random_range(-1.0..1.0));
            let b = rng.random_range(-1.0..1.0_f64).atan2(rng.random_range(-1.0..1.0));
            let d = normalize_angle(b - a);
            assert!(d > -PI && d <= PI, "{a} {b} -> {d}");
            let turns = (a + d - b) / (2.0 * PI);
            assert!((turns - turns.round()).abs() < 1e-12, "{a} {b} -> {d}");

            let theta = rng.random_range(-1e3..1e3);
            let t = normalize_angle(theta);
            assert!(t > -PI && t <= PI, "{theta} -> {t}");
            let turns = (theta - t) / (2.0 * PI);
            assert!((turns - turns.round()).abs() < 1e-9, "{theta} -> {t}");
        }
    }

    #[test]
    fn normalize_nan() {
        assert!(normalize_angle(f64::NAN).is_nan());
    }

    #[test]
    fn secant_finds_root() {
        let f = |x: f64| x * x - 2.0;
        let x = solve_secant(f, 1.0, 2.0, 10);
        assert!((x - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn secant_equal_samples_exit() {
        let mut calls = 0;
        let x = solve_secant(
            |_| {
                calls += 1;
                0.0
            },
            1.0,
            3.0,
            10,
        );
        assert_eq!(x, 3.0);
        assert_eq!(calls, 2);
    }

    #[test]
    fn secant_iteration_cap() {
        let mut calls = 0;
        let _ = solve_secant(
            |x| {
                calls += 1;
                x.powi(3) - x - 2.0
            },
            0.0,
            0.1,
            3,
        );
        assert_eq!(calls, 5);
        assert_eq!(solve_secant(|x| x, 5.0, 7.0, 0), 7.0);
    }
}
