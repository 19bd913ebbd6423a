//! # Formula Evaluation
//!
//! The core of the lab: a small, safe evaluator for the restricted
//! algebraic formulas that define derived simulation outputs. A formula
//! like `(v0^2 * sin(2*theta)) / g` is parsed into a typed AST and
//! evaluated against a read-only map of parameter values; the result is a
//! finite `f64`, or the `0.0` fallback when anything goes wrong.
//!
//! ## Key Behaviors
//!
//! - **Restricted grammar**: `+ - * / ^`, parentheses, the functions
//!   `sin cos tan sqrt abs pow`, and the constant `pi`/`π`. Nothing else.
//! - **Silent fallback**: [`evaluate`] never fails; every error collapses
//!   to `0.0` so a broken formula degrades a displayed value instead of a
//!   whole simulation. [`evaluate_with_diagnostics`] surfaces the kind.
//! - **Angle heuristic**: trig arguments mentioning `theta` or `angle`
//!   are read as degrees and converted to radians. Legacy behavior; tag
//!   parameters with an explicit [`AngleUnit`] to opt out of guessing.
//! - **AST caching**: a [`FormulaEngine`] caches parsed formulas so the
//!   per-tick render loop does not pay a re-parse per evaluation.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use stemlab::formula::{evaluate, round_to};
//!
//! let mut params = HashMap::new();
//! params.insert("v0".to_string(), 20.0);
//! params.insert("theta".to_string(), 45.0);
//! params.insert("g".to_string(), 9.8);
//!
//! // theta is interpreted as degrees, so sin(2*theta) = sin(90°) = 1.
//! let range = evaluate("(v0^2 * sin(2*theta)) / g", &params);
//! assert_eq!(round_to(range, 2), 40.82);
//! ```

pub mod engine;
pub mod expression;

// Re-export key types
pub use engine::{
    evaluate, evaluate_with_diagnostics, round_to, AngleUnit, FormulaEngine,
};
pub use expression::{
    BinaryOp, EvalContext, Expr, FormulaError, FormulaResult, UnaryOp, MAX_FORMULA_LEN,
    MAX_NESTING_DEPTH,
};
