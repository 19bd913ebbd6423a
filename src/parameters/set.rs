//! Parameter value sets
//!
//! A [`ParameterSet`] is the id → value mapping one render/update cycle
//! evaluates formulas against. It is built from descriptors at their
//! defaults, updated by slider moves (clamped and snapped to the slider
//! grid), and read by the evaluator through
//! [`EvalContext`](crate::formula::EvalContext) without being mutated.

use crate::formula::EvalContext;
use crate::parameters::descriptor::{ParameterDescriptor, ParameterError};
use std::collections::HashMap;

/// A read-mostly collection of named parameter values
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    values: HashMap<String, f64>,
    descriptors: HashMap<String, ParameterDescriptor>,
}

impl ParameterSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from descriptors, every parameter at its default value
    /// (clamped into its bounds, like the sliders themselves).
    ///
    /// Each descriptor is validated; duplicate ids are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use stemlab::parameters::{ParameterDescriptor, ParameterSet};
    ///
    /// let descriptors = vec![
    ///     ParameterDescriptor::new("length", 0.1, 2.0, 0.1, 1.0),
    ///     ParameterDescriptor::new("gravity", 1.0, 20.0, 0.5, 9.8),
    /// ];
    ///
    /// let params = ParameterSet::from_descriptors(&descriptors).unwrap();
    /// assert_eq!(params.get("gravity"), Some(9.8));
    /// ```
    pub fn from_descriptors(descriptors: &[ParameterDescriptor]) -> Result<Self, ParameterError> {
        let mut set = Self::new();

        for desc in descriptors {
            desc.validate()?;
            if set.descriptors.contains_key(&desc.id) {
                return Err(ParameterError::InvalidIdentifier {
                    id: format!("{} (duplicate)", desc.id),
                });
            }

            set.values
                .insert(desc.id.clone(), desc.clamp(desc.default_value));
            set.descriptors.insert(desc.id.clone(), desc.clone());
        }

        Ok(set)
    }

    /// Insert or overwrite a value without descriptor checks.
    ///
    /// For ad hoc contexts (tests, sampling overlays) where no slider
    /// definition exists. Non-finite values are silently ignored, keeping
    /// the invariant that every stored value is finite.
    pub fn insert(&mut self, id: &str, value: f64) {
        if value.is_finite() {
            self.values.insert(id.to_string(), value);
        }
    }

    /// Update a described parameter with slider semantics.
    ///
    /// The value is snapped to the descriptor's step grid and clamped to
    /// its bounds. Unknown ids and non-finite values are errors.
    pub fn set(&mut self, id: &str, value: f64) -> Result<(), ParameterError> {
        if !value.is_finite() {
            return Err(ParameterError::NonFiniteValue {
                id: id.to_string(),
                value,
            });
        }

        let desc = self
            .descriptors
            .get(id)
            .ok_or_else(|| ParameterError::UnknownParameter { id: id.to_string() })?;

        self.values.insert(id.to_string(), desc.snap(value));
        Ok(())
    }

    /// Current value of a parameter.
    pub fn get(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    /// Current value, or `fallback` when the parameter is absent.
    pub fn get_or(&self, id: &str, fallback: f64) -> f64 {
        self.get(id).unwrap_or(fallback)
    }

    /// Reset every described parameter to its default value.
    pub fn reset(&mut self) {
        for (id, desc) in &self.descriptors {
            self.values.insert(id.clone(), desc.clamp(desc.default_value));
        }
    }

    /// The descriptor behind a parameter, if it has one.
    pub fn descriptor(&self, id: &str) -> Option<&ParameterDescriptor> {
        self.descriptors.get(id)
    }

    /// The raw id → value mapping.
    pub fn values(&self) -> &HashMap<String, f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl EvalContext for ParameterSet {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name)
    }
}
