//! Parametric curve sampling
//!
//! Plotted simulation modes (generic graph, parabola, linear, motion
//! trajectories) repeatedly evaluate one formula while sweeping a single
//! variable across a domain. The samplers here do that sweep and collect
//! the finite `(x, y)` pairs; samples whose evaluation fails are dropped
//! rather than recorded as the evaluator's `0.0` fallback, so a plotted
//! curve has holes where the formula is undefined instead of spikes to
//! zero.

use crate::formula::{EvalContext, FormulaEngine};

/// Default spacing between samples, in domain units.
pub const DEFAULT_STEP: f64 = 0.2;

/// An evaluation domain `[min, max]` swept at `step` intervals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Domain {
    /// Domain with the default step of 0.2 units.
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            step: DEFAULT_STEP,
        }
    }

    pub fn with_step(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
            && self.step.is_finite()
            && self.step > 0.0
    }
}

/// A borrowed context with one extra binding layered on top.
///
/// Sweeping injects the loop variable without cloning the parameter map
/// per sample; the injected binding shadows any parameter of the same
/// name, matching how the original graph mode spread `{...params, x}`.
struct Overlay<'a, C> {
    base: &'a C,
    var: &'a str,
    value: f64,
}

impl<C: EvalContext> EvalContext for Overlay<'_, C> {
    fn lookup(&self, name: &str) -> Option<f64> {
        if name == self.var {
            Some(self.value)
        } else {
            self.base.lookup(name)
        }
    }
}

/// Sample `formula` at evenly spaced values of `var` across `domain`.
///
/// Sample positions are computed by index (`min + i * step`) so the grid
/// does not drift over long domains. Both endpoints are included when the
/// span is a whole number of steps. Failed or non-finite evaluations are
/// discarded.
///
/// # Examples
///
/// ```
/// use stemlab::formula::FormulaEngine;
/// use stemlab::parameters::ParameterSet;
/// use stemlab::sampler::{sample_curve, Domain};
///
/// let engine = FormulaEngine::new();
/// let mut params = ParameterSet::new();
/// params.insert("a", 2.0);
///
/// let points = sample_curve(&engine, "a * x", &params, "x", &Domain::new(0.0, 1.0));
/// assert_eq!(points.len(), 6);
/// assert_eq!(points[5], (1.0, 2.0));
/// ```
pub fn sample_curve<C: EvalContext>(
    engine: &FormulaEngine,
    formula: &str,
    params: &C,
    var: &str,
    domain: &Domain,
) -> Vec<(f64, f64)> {
    if !domain.is_valid() {
        return Vec::new();
    }

    // Small slack so a span that is a whole number of steps up to float
    // noise (e.g. 1.9 / 0.1) still includes its right endpoint.
    let count = ((domain.max - domain.min) / domain.step + 1e-6).floor() as usize;
    let mut points = Vec::with_capacity(count + 1);

    for i in 0..=count {
        let x = (domain.min + i as f64 * domain.step).min(domain.max);

        let overlay = Overlay {
            base: params,
            var,
            value: x,
        };
        if let Ok(y) = engine.try_evaluate(formula, &overlay) {
            points.push((x, y));
        }
    }

    points
}

/// Sample `formula` at `samples` evenly spaced values of `var` over
/// `[min, max]`, endpoints included.
///
/// Fixed-count variant used for time-parameterized motion (the canvases
/// draw trajectories from a fixed number of points regardless of flight
/// time). Returns an empty vector when `samples < 2` or the range is not
/// finite.
pub fn sample_n<C: EvalContext>(
    engine: &FormulaEngine,
    formula: &str,
    params: &C,
    var: &str,
    min: f64,
    max: f64,
    samples: usize,
) -> Vec<(f64, f64)> {
    if samples < 2 || !min.is_finite() || !max.is_finite() || min > max {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(samples);
    for i in 0..samples {
        let x = min + (max - min) * i as f64 / (samples - 1) as f64;
        let overlay = Overlay {
            base: params,
            var,
            value: x,
        };
        if let Ok(y) = engine.try_evaluate(formula, &overlay) {
            points.push((x, y));
        }
    }

    points
}

/// Closed-form projectile trajectory, sampled at `samples` points.
///
/// `theta_deg` is the launch angle in degrees. Points run from launch to
/// touchdown (flight time `2 * v0 * sin(theta) / g`); with `g <= 0` or
/// `v0 < 0` there is no trajectory and the result is empty.
pub fn projectile_trajectory(v0: f64, theta_deg: f64, g: f64, samples: usize) -> Vec<(f64, f64)> {
    if samples < 2 || g <= 0.0 || v0 < 0.0 {
        return Vec::new();
    }

    let theta = theta_deg.to_radians();
    let flight_time = 2.0 * v0 * theta.sin() / g;

    let mut points = Vec::with_capacity(samples);
    for i in 0..samples {
        let t = flight_time * i as f64 / (samples - 1) as f64;
        let x = v0 * theta.cos() * t;
        let y = v0 * theta.sin() * t - 0.5 * g * t * t;
        points.push((x, y));
    }

    points
}
