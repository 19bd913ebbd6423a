//! # Simulation Definitions
//!
//! A simulation is a type tag (selecting a visualization renderer, which
//! lives outside this crate), a list of parameter descriptors, and a
//! computation from parameter values to named numeric results. The six
//! built-in experiments ship as [`presets`]; AI-generated experiments
//! arrive through [`crate::content`] and compute their results with the
//! formula evaluator instead of closed-form code.

pub mod presets;

use crate::parameters::{ParameterDescriptor, ParameterError, ParameterSet};
use serde::{Deserialize, Serialize};

/// Tag selecting which parametric visualization renders a simulation.
///
/// Irrelevant to the evaluator itself; carried so stored records and
/// generated experiments round-trip. Serialized as the snake_case strings
/// the client stores (`"ohm_law"`, `"acid_base"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationType {
    // Built-in experiments
    OhmLaw,
    AcidBase,
    PlantCell,
    Pendulum,
    Refraction,
    Electrolysis,
    // Dynamic renderers used by generated experiments
    Projectile,
    Parabola,
    Quadratic,
    Linear,
    Graph,
    Wave,
    Circuit,
    Chemistry,
}

/// One computed output of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub id: String,

    pub name: String,

    pub unit: String,

    /// Presentation-rounded value
    pub value: f64,

    /// Display formula, when the output has one worth showing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl SimulationResult {
    pub fn new(id: &str, name: &str, unit: &str, value: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            unit: unit.to_string(),
            value,
            formula: None,
        }
    }

    pub fn with_formula(mut self, formula: &str) -> Self {
        self.formula = Some(formula.to_string());
        self
    }
}

/// A runnable simulation definition: parameters in, named results out
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub sim_type: SimulationType,
    pub parameters: Vec<ParameterDescriptor>,
    compute: fn(&ParameterSet) -> Vec<SimulationResult>,
}

impl SimulationConfig {
    pub fn new(
        sim_type: SimulationType,
        parameters: Vec<ParameterDescriptor>,
        compute: fn(&ParameterSet) -> Vec<SimulationResult>,
    ) -> Self {
        Self {
            sim_type,
            parameters,
            compute,
        }
    }

    /// A parameter set at this simulation's defaults.
    pub fn default_parameters(&self) -> Result<ParameterSet, ParameterError> {
        ParameterSet::from_descriptors(&self.parameters)
    }

    /// Compute the result panel values for the given parameters.
    pub fn run(&self, params: &ParameterSet) -> Vec<SimulationResult> {
        (self.compute)(params)
    }
}
