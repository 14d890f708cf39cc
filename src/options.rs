// Copyright 2024 the Arcfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning of the arc fitter and the greedy matcher.

use core::f64::consts::PI;

/// How a committed arc names its circle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArcForm {
    /// Signed radius (`R`); a negative radius selects the major arc.
    #[default]
    Radius,
    /// Center offsets from the start point (`I`, `J`).
    CenterOffset,
}

/// Options for fitting arcs to runs of moves.
///
/// All thresholds are in the length units of the input coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArcFitOptions {
    /// Number of buffered moves needed before a fit is attempted.
    ///
    /// Values below [`ArcFitOptions::MIN_RUN_FLOOR`] are raised to it.
    pub min_run: usize,
    /// Largest accepted RMS radial deviation of the interior points.
    pub rms_limit: f64,
    /// Largest accepted angle, in radians, swept by a single move.
    pub angle_limit: f64,
    /// Budget for `step_angle² × radius`, the per-move sagitta bound.
    pub offset_limit: f64,
    /// Output form of committed arcs.
    pub form: ArcForm,
    /// Iteration cap of the radius root-finder.
    pub max_iterations: usize,
}

impl ArcFitOptions {
    /// The shortest run the matcher will try: one interior point.
    pub const MIN_RUN_FLOOR: usize = 2;

    /// Default iteration cap of the radius root-finder.
    pub const DEFAULT_MAX_ITERATIONS: usize = 10;

    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the minimum run length.
    pub fn min_run(mut self, min_run: usize) -> Self {
        self.min_run = min_run;
        self
    }

    /// Builder: set the RMS fit error limit.
    pub fn rms_limit(mut self, limit: f64) -> Self {
        self.rms_limit = limit;
        self
    }

    /// Builder: set the per-move angle limit, in radians.
    pub fn angle_limit(mut self, limit: f64) -> Self {
        self.angle_limit = limit;
        self
    }

    /// Builder: set the per-move angle limit, in degrees.
    pub fn angle_limit_degrees(self, degrees: f64) -> Self {
        self.angle_limit(degrees * (PI / 180.0))
    }

    /// Builder: set the sagitta budget.
    pub fn offset_limit(mut self, limit: f64) -> Self {
        self.offset_limit = limit;
        self
    }

    /// Builder: set the output form.
    pub fn form(mut self, form: ArcForm) -> Self {
        self.form = form;
        self
    }

    /// Builder: set the root-finder iteration cap.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The minimum run length actually used by the matcher.
    #[inline]
    pub fn effective_min_run(&self) -> usize {
        self.min_run.max(Self::MIN_RUN_FLOOR)
    }
}

impl Default for ArcFitOptions {
    fn default() -> Self {
        ArcFitOptions {
            min_run: 4,
            rms_limit: 0.01,
            angle_limit: 40.0 * (PI / 180.0),
            offset_limit: 0.1,
            form: ArcForm::Radius,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}
