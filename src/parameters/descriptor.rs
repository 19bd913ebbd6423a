//! Parameter descriptors
//!
//! A descriptor is the stored/AI-generated definition of one slider: its
//! identifier (the name formulas refer to it by), display name and unit,
//! range, step size, and default value. The serde field names match the
//! JSON records the generative content service produces and the client
//! stores (`defaultValue`, optional `angleUnit`).

use crate::formula::AngleUnit;
use crate::parameters::bounds::{Bounds, BoundsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Invalid parameter id '{id}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier { id: String },

    #[error("Bounds error for parameter '{id}': {source}")]
    InvalidBounds {
        id: String,
        #[source]
        source: BoundsError,
    },

    #[error("Parameter '{id}' has invalid step {step}: must be finite and positive")]
    InvalidStep { id: String, step: f64 },

    #[error("Parameter '{id}' not found")]
    UnknownParameter { id: String },

    #[error("Value for parameter '{id}' must be finite, got {value}")]
    NonFiniteValue { id: String, value: f64 },
}

/// Definition of a single simulation parameter
///
/// # Examples
///
/// ```
/// use stemlab::parameters::ParameterDescriptor;
///
/// let json = r#"{
///     "id": "voltage", "name": "Voltage", "unit": "V",
///     "min": 0, "max": 12, "step": 0.5, "defaultValue": 6
/// }"#;
///
/// let desc: ParameterDescriptor = serde_json::from_str(json).unwrap();
/// desc.validate().unwrap();
/// assert_eq!(desc.default_value, 6.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    /// Identifier used in formulas
    pub id: String,

    /// Human-readable display name
    pub name: String,

    /// Display unit (may be empty)
    pub unit: String,

    /// Slider minimum
    pub min: f64,

    /// Slider maximum
    pub max: f64,

    /// Slider step size
    pub step: f64,

    /// Initial value
    pub default_value: f64,

    /// Explicit angle unit, overriding the name-based degree heuristic
    /// for trig calls that mention this parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_unit: Option<AngleUnit>,
}

impl ParameterDescriptor {
    /// Create a descriptor with an empty display name and unit.
    /// Mostly useful in tests and ad hoc tooling.
    pub fn new(id: &str, min: f64, max: f64, step: f64, default_value: f64) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            unit: String::new(),
            min,
            max,
            step,
            default_value,
            angle_unit: None,
        }
    }

    /// Check the descriptor for structural problems.
    ///
    /// The id must be a valid formula identifier, the bounds finite with
    /// `min <= max`, and the step finite and positive. An out-of-range
    /// default is not an error here; it is clamped on use.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !is_valid_identifier(&self.id) {
            return Err(ParameterError::InvalidIdentifier {
                id: self.id.clone(),
            });
        }

        self.bounds()?;

        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(ParameterError::InvalidStep {
                id: self.id.clone(),
                step: self.step,
            });
        }

        if !self.default_value.is_finite() {
            return Err(ParameterError::NonFiniteValue {
                id: self.id.clone(),
                value: self.default_value,
            });
        }

        Ok(())
    }

    /// The descriptor's range as [`Bounds`].
    pub fn bounds(&self) -> Result<Bounds, ParameterError> {
        Bounds::new(self.min, self.max).map_err(|source| ParameterError::InvalidBounds {
            id: self.id.clone(),
            source,
        })
    }

    /// Clamp a value into the descriptor's range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Snap a value to the nearest step-grid point, then clamp.
    ///
    /// This is the slider semantics: reachable values are
    /// `min + k * step` within `[min, max]`.
    pub fn snap(&self, value: f64) -> f64 {
        let steps = ((value - self.min) / self.step).round();
        self.clamp(self.min + steps * self.step)
    }
}

fn is_valid_identifier(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
