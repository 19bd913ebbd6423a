//! # Parameter System
//!
//! Parameters are the named, bounded, steppable numeric inputs that drive
//! a simulation: each one backed by a slider in the UI and referenced by
//! name from formulas.
//!
//! ## Core Components
//!
//! - [`ParameterDescriptor`]: the stored definition of one parameter
//!   (id, display name, unit, range, step, default), serde-compatible
//!   with the AI-generated and locally stored JSON records
//! - [`ParameterSet`]: the per-cycle id → value mapping formulas are
//!   evaluated against, with slider clamp/snap semantics on update
//! - [`Bounds`]: finite `[min, max]` range handling
//!
//! ## Example Usage
//!
//! ```rust
//! use stemlab::formula::FormulaEngine;
//! use stemlab::parameters::{ParameterDescriptor, ParameterSet};
//!
//! let descriptors = vec![
//!     ParameterDescriptor::new("length", 0.1, 2.0, 0.1, 1.0),
//!     ParameterDescriptor::new("gravity", 1.0, 20.0, 0.5, 9.8),
//! ];
//!
//! let mut params = ParameterSet::from_descriptors(&descriptors).unwrap();
//! params.set("length", 0.5).unwrap();
//!
//! let engine = FormulaEngine::new();
//! let period = engine.evaluate("2 * pi * sqrt(length / gravity)", &params);
//! assert!(period > 0.0);
//! ```

pub mod bounds;
pub mod descriptor;
pub mod set;

// Re-export key types
pub use bounds::{Bounds, BoundsError};
pub use descriptor::{ParameterDescriptor, ParameterError};
pub use set::ParameterSet;
