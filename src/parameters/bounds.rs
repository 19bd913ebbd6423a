//! Slider bounds for simulation parameters
//!
//! Every parameter is driven by a bounded slider, so unlike a general
//! optimizer's bounds these are always finite and always present.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must not exceed max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Bounds must be finite, got [{min}, {max}]")]
    NonFiniteBounds { min: f64, max: f64 },
}

/// The inclusive `[min, max]` range a parameter value may take
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Create bounds from a finite `min <= max` pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use stemlab::parameters::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 12.0).unwrap();
    /// assert_eq!(bounds.clamp(15.0), 12.0);
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(BoundsError::NonFiniteBounds { min, max });
        }
        if min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// Whether `value` lies within the bounds (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp `value` into the bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Width of the range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}
