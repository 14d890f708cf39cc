// Copyright 2024 the Arcfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replacing runs of short straight moves with circular arcs.
//!
//! Toolpaths for 3D printers and CNC machines often approximate curves by
//! many short line segments. This crate finds runs of such segments that
//! lie close to a circle and replaces each run with a single arc move.
//!
//! The work is split into three layers:
//!
//! - [`fit_circle`] finds the circle through both ends of a chord that best
//!   matches the points in between, in the least-squares sense.
//! - [`validate_arc`] decides whether the points actually travel along that
//!   circle in one direction, in small enough steps, and reports the arc's
//!   direction and signed radius. [`fit_and_validate`] combines the two.
//! - [`try_extend`] and [`ArcMatcher`] greedily pick the longest acceptable
//!   run from a buffer of [`Move`]s.
//!
//! The [`gcode`] module wires this up to G-code text.
//!
//! # Examples
//!
//! ```
//! use arcfit::{ArcDirection, ArcFitOptions, ArcMatcher, Commit, Move, Point, Vec2};
//!
//! // Eight moves counter-clockwise around (0, 5), starting at the origin.
//! let center = Point::new(0.0, 5.0);
//! let mut matcher = ArcMatcher::new(ArcFitOptions::default());
//! for i in 1..=8 {
//!     let theta = (-90.0 + 5.0 * i as f64).to_radians();
//!     let end = center + 5.0 * Vec2::new(theta.cos(), theta.sin());
//!     matcher.push(Move::new(end, 0.02 * i as f64));
//! }
//!
//! match matcher.try_extend() {
//!     Some(Commit::Arc(arc)) => {
//!         assert_eq!(arc.consumed, 8);
//!         assert_eq!(arc.direction, ArcDirection::CounterClockwise);
//!         assert!((arc.radius - 5.0).abs() < 1e-9);
//!     }
//!     other => panic!("no arc: {other:?}"),
//! }
//! assert!(matcher.is_empty());
//! ```
//!
//! # Features
//!
//! This crate either uses the standard library or the [`libm`] crate for
//! math functionality. The `std` feature is enabled by default, but can be
//! disabled, as long as the `libm` feature is enabled. This is useful for
//! `no_std` environments such as motion controller firmware. The crate
//! uses the `alloc` crate regardless.
//!
//! The `serde`, `schemars` and `mint` features add the matching trait
//! implementations to the public types.
//!
//! [`libm`]: https://docs.rs/libm

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(clippy::many_single_char_names, clippy::excessive_precision)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("arcfit requires either the `std` or `libm` feature");

extern crate alloc;

mod circle;
pub mod common;
mod fit;
pub mod gcode;
mod line;
mod matcher;
mod moves;
mod options;
mod point;
mod triangle;
mod validate;
mod vec2;

pub use crate::circle::*;
pub use crate::fit::*;
pub use crate::line::*;
pub use crate::matcher::*;
pub use crate::moves::*;
pub use crate::options::*;
pub use crate::point::*;
pub use crate::triangle::*;
pub use crate::validate::*;
pub use crate::vec2::*;
