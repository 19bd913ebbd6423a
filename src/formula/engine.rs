//! The evaluation boundary that the rest of the lab talks to
//!
//! Everything above this module treats a formula as an opaque string and a
//! result as a plain `f64`. The functions here apply the legacy angle-unit
//! heuristic, collapse every failure to the `0.0` fallback, and (through
//! [`FormulaEngine`]) cache parsed ASTs so a formula re-evaluated on every
//! animation tick is not re-parsed on every animation tick.

use crate::formula::expression::{BinaryOp, EvalContext, Expr, FormulaError, FormulaResult};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

/// Unit of an angle-valued parameter.
///
/// An explicit tag on a parameter descriptor overrides the name-based
/// heuristic for any trig call that mentions the parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleUnit {
    Radians,
    Degrees,
}

/// Evaluate a formula against a parameter map, falling back to `0.0`.
///
/// This is the public entry point the simulation renderers use. It is a
/// total function: any parse error, unknown identifier, numeric domain
/// error, or non-finite result yields `0.0` rather than an error, so a
/// broken formula degrades a displayed value instead of crashing a render.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use stemlab::formula::evaluate;
///
/// let mut params = HashMap::new();
/// params.insert("voltage".to_string(), 6.0);
/// params.insert("resistance".to_string(), 20.0);
///
/// assert_eq!(evaluate("voltage / resistance", &params), 0.3);
/// assert_eq!(evaluate("voltage / 0", &params), 0.0);
/// ```
pub fn evaluate(formula: &str, params: &HashMap<String, f64>) -> f64 {
    evaluate_with_diagnostics(formula, params).unwrap_or(0.0)
}

/// Evaluate a formula, surfacing the failure kind instead of `0.0`.
///
/// Same semantics as [`evaluate`] on success; on failure the
/// [`FormulaError`] is returned so callers and tests can see why a value
/// degraded. The silent-zero behavior of [`evaluate`] is exactly
/// `evaluate_with_diagnostics(..).unwrap_or(0.0)`.
pub fn evaluate_with_diagnostics<C: EvalContext>(
    formula: &str,
    params: &C,
) -> FormulaResult<f64> {
    let expr = apply_angle_rule(Expr::parse(formula)?, &HashMap::new());
    finite(expr.evaluate(params)?)
}

fn finite(value: f64) -> FormulaResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::NonFinite)
    }
}

/// Round a value to `digits` decimal places for presentation.
///
/// The evaluator itself always returns unrounded doubles; this is the
/// rounding the results panels apply before display.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Whether the argument of a trig call should be read as degrees.
///
/// Legacy heuristic, preserved for compatibility with existing authored
/// formulas: an argument is "in degrees" when it mentions an identifier
/// containing `theta`, `angle`, or a degree sign. Explicit [`AngleUnit`]
/// tags override it, with `Radians` winning over `Degrees` when the
/// argument mentions parameters tagged both ways.
fn wants_degrees(arg: &Expr, units: &HashMap<String, AngleUnit>) -> bool {
    if arg.mentions_variable(&|name: &str| units.get(name) == Some(&AngleUnit::Radians)) {
        return false;
    }
    if arg.mentions_variable(&|name: &str| units.get(name) == Some(&AngleUnit::Degrees)) {
        return true;
    }
    arg.mentions_variable(&|name: &str| {
        name.contains("theta") || name.contains("angle") || name.contains('°')
    })
}

fn is_trig(name: &str) -> bool {
    matches!(name, "sin" | "cos" | "tan")
}

/// Rewrite trig calls whose argument is in degrees to `(arg * π) / 180`.
///
/// Applied once at parse time, so cached and uncached evaluation agree
/// bit for bit.
pub(crate) fn apply_angle_rule(expr: Expr, units: &HashMap<String, AngleUnit>) -> Expr {
    match expr {
        Expr::Call(name, args) => {
            let mut args: Vec<Expr> = args
                .into_iter()
                .map(|arg| apply_angle_rule(arg, units))
                .collect();

            if is_trig(&name) && args.len() == 1 && wants_degrees(&args[0], units) {
                let arg = args.pop().unwrap_or(Expr::Number(0.0));
                let scaled = Expr::Binary(
                    BinaryOp::Div,
                    Box::new(Expr::Binary(
                        BinaryOp::Mul,
                        Box::new(arg),
                        Box::new(Expr::Number(PI)),
                    )),
                    Box::new(Expr::Number(180.0)),
                );
                args = vec![scaled];
            }

            Expr::Call(name, args)
        }
        Expr::Unary(op, inner) => Expr::Unary(op, Box::new(apply_angle_rule(*inner, units))),
        Expr::Binary(op, left, right) => Expr::Binary(
            op,
            Box::new(apply_angle_rule(*left, units)),
            Box::new(apply_angle_rule(*right, units)),
        ),
        leaf @ (Expr::Number(_) | Expr::Variable(_)) => leaf,
    }
}

/// Reusable evaluator with an AST cache.
///
/// A `FormulaEngine` holds the angle-unit tags for one experiment and a
/// concurrent cache of parsed (and angle-rewritten) ASTs keyed by formula
/// string. Evaluation through the engine is observably identical to the
/// free [`evaluate`] function; the cache only skips the re-parse that the
/// per-tick render loop would otherwise pay.
#[derive(Debug, Default)]
pub struct FormulaEngine {
    angle_units: HashMap<String, AngleUnit>,
    cache: DashMap<String, Arc<Expr>>,
}

impl FormulaEngine {
    /// Create an engine with no explicit angle tags (heuristic only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with explicit per-parameter angle units.
    pub fn with_angle_units(angle_units: HashMap<String, AngleUnit>) -> Self {
        Self {
            angle_units,
            cache: DashMap::new(),
        }
    }

    /// Parse and angle-rewrite a formula, consulting the cache first.
    /// Parse failures are not cached.
    fn compile(&self, formula: &str) -> FormulaResult<Arc<Expr>> {
        if let Some(cached) = self.cache.get(formula) {
            return Ok(Arc::clone(cached.value()));
        }

        let expr = Arc::new(apply_angle_rule(Expr::parse(formula)?, &self.angle_units));
        self.cache.insert(formula.to_string(), Arc::clone(&expr));
        Ok(expr)
    }

    /// Evaluate with the silent `0.0` fallback (see [`evaluate`]).
    pub fn evaluate<C: EvalContext>(&self, formula: &str, params: &C) -> f64 {
        self.try_evaluate(formula, params).unwrap_or(0.0)
    }

    /// Evaluate, surfacing the failure kind.
    pub fn try_evaluate<C: EvalContext>(&self, formula: &str, params: &C) -> FormulaResult<f64> {
        let expr = self.compile(formula)?;
        finite(expr.evaluate(params)?)
    }

    /// Number of distinct formulas currently cached.
    pub fn cached_formulas(&self) -> usize {
        self.cache.len()
    }
}
