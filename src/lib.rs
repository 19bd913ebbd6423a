//! # stemlab
//!
//! `stemlab` is the simulation core of a browser-based virtual STEM lab:
//! the formula evaluator that turns user- and AI-authored algebraic
//! expressions into plotted values, plus the parameter, sampling, and
//! experiment-record machinery around it.
//!
//! The library provides:
//! - A safe evaluator for a restricted formula grammar (no string
//!   rewriting, no general-purpose eval) with a silent `0.0` fallback
//!   and an optional diagnostic channel
//! - The legacy degree/radian heuristic for trig arguments, with
//!   explicit per-parameter angle units as the opt-in alternative
//! - Bounded, steppable named parameters matching the stored slider
//!   definitions
//! - Curve samplers for the plotted simulation modes
//! - The built-in experiments and the AI-generated experiment record
//!   schema
//!
//! ## Basic Usage
//!
//! ```
//! use std::collections::HashMap;
//! use stemlab::formula::{evaluate, round_to};
//!
//! let mut params = HashMap::new();
//! params.insert("length".to_string(), 1.0);
//! params.insert("gravity".to_string(), 9.8);
//!
//! let period = evaluate("2 * pi * sqrt(length / gravity)", &params);
//! assert_eq!(round_to(period, 3), 2.007);
//! ```

// Public modules
pub mod error;

// Formula evaluation core
pub mod formula;

// Parameter system
pub mod parameters;

// Curve sampling
pub mod sampler;

// Simulation definitions and AI-generated content
pub mod content;
pub mod simulation;

// Re-exports for convenience
pub use error::{LabError, Result};

pub use formula::{evaluate, evaluate_with_diagnostics, FormulaEngine};

pub use parameters::{ParameterDescriptor, ParameterSet};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
