//! AI-generated experiment records
//!
//! Teachers create new experiments by sending free text or an image to a
//! generative model, which is prompted to answer with a single JSON
//! object. This module is the contract side of that exchange: the record
//! schema, extraction of the JSON object from surrounding model prose,
//! structural validation, and evaluation of the record's formulas into
//! result panel values.
//!
//! The HTTP client, prompting, and model fallback live in the web client
//! and are out of scope here. Malformed records fail loudly at this
//! boundary; malformed *formula strings* inside a well-formed record do
//! not: they degrade to the evaluator's `0.0` fallback at evaluation
//! time, like any other broken formula.

use crate::formula::{round_to, AngleUnit, Expr, FormulaEngine};
use crate::parameters::{ParameterDescriptor, ParameterError, ParameterSet};
use crate::simulation::SimulationResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors for generated-experiment records
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("No JSON object found in model output")]
    MissingJson,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Experiment has no parameters")]
    NoParameters,

    #[error("Experiment has no formulas")]
    NoFormulas,

    #[error("Duplicate id '{id}'")]
    DuplicateId { id: String },

    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),
}

/// One derived output: a named value computed by a formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaSpec {
    pub output_id: String,

    pub output_name: String,

    pub output_unit: String,

    /// The formula string, treated as opaque until evaluation
    pub formula: String,
}

/// A complete AI-generated experiment record
///
/// Field names match the JSON the model is prompted to produce: the
/// record itself is snake_case, parameter and formula descriptors are
/// camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedExperiment {
    pub title: String,

    pub subject: String,

    pub difficulty_level: String,

    pub short_description: String,

    #[serde(default)]
    pub learning_objectives: Vec<String>,

    #[serde(default)]
    pub tools_instructions: Vec<String>,

    /// Free-text headline formula shown on the experiment page
    #[serde(default)]
    pub simulation_config: String,

    /// Estimated duration in minutes
    #[serde(default)]
    pub estimated_time: u32,

    pub parameters: Vec<ParameterDescriptor>,

    pub formulas: Vec<FormulaSpec>,
}

impl GeneratedExperiment {
    /// Extract and parse the experiment record from raw model output.
    ///
    /// Models wrap the JSON in prose or code fences despite being asked
    /// not to, so the record is taken as the span from the first `{` to
    /// the last `}` of the text.
    ///
    /// # Examples
    ///
    /// ```
    /// use stemlab::content::GeneratedExperiment;
    ///
    /// let reply = r#"Here is your experiment:
    /// {
    ///   "title": "Free fall",
    ///   "subject": "Physics",
    ///   "difficulty_level": "Easy",
    ///   "short_description": "Drop height vs time",
    ///   "parameters": [
    ///     {"id": "h", "name": "Height", "unit": "m",
    ///      "min": 1, "max": 100, "step": 1, "defaultValue": 20}
    ///   ],
    ///   "formulas": [
    ///     {"outputId": "t", "outputName": "Fall time", "outputUnit": "s",
    ///      "formula": "sqrt(2 * h / 9.8)"}
    ///   ]
    /// }
    /// Enjoy!"#;
    ///
    /// let experiment = GeneratedExperiment::from_model_text(reply).unwrap();
    /// assert_eq!(experiment.parameters.len(), 1);
    /// ```
    pub fn from_model_text(text: &str) -> Result<Self, ContentError> {
        let start = text.find('{').ok_or(ContentError::MissingJson)?;
        let end = text.rfind('}').filter(|&end| end > start);
        let end = end.ok_or(ContentError::MissingJson)?;

        Ok(serde_json::from_str(&text[start..=end])?)
    }

    /// Structural validation of the record.
    ///
    /// Checks that there is at least one parameter and one formula, that
    /// every parameter descriptor is well-formed, and that parameter and
    /// output ids are unique. Formula *contents* are deliberately not
    /// validated here; see [`unresolved_identifiers`].
    ///
    /// [`unresolved_identifiers`]: GeneratedExperiment::unresolved_identifiers
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.parameters.is_empty() {
            return Err(ContentError::NoParameters);
        }
        if self.formulas.is_empty() {
            return Err(ContentError::NoFormulas);
        }

        let mut seen = std::collections::HashSet::new();
        for desc in &self.parameters {
            desc.validate()?;
            if !seen.insert(desc.id.as_str()) {
                return Err(ContentError::DuplicateId {
                    id: desc.id.clone(),
                });
            }
        }

        let mut outputs = std::collections::HashSet::new();
        for spec in &self.formulas {
            if !outputs.insert(spec.output_id.as_str()) {
                return Err(ContentError::DuplicateId {
                    id: spec.output_id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Identifiers referenced by formulas but not declared as parameters.
    ///
    /// Diagnostic only: evaluation tolerates these via the fallback, but
    /// surfacing them lets the review UI flag a generated record whose
    /// outputs would silently read as 0. Formulas that do not parse are
    /// skipped (they surface through evaluation diagnostics instead).
    pub fn unresolved_identifiers(&self) -> Vec<(String, Vec<String>)> {
        let declared: std::collections::HashSet<&str> =
            self.parameters.iter().map(|p| p.id.as_str()).collect();

        let mut report = Vec::new();
        for spec in &self.formulas {
            let Ok(expr) = Expr::parse(&spec.formula) else {
                continue;
            };

            let missing: Vec<String> = expr
                .variables()
                .into_iter()
                .filter(|name| {
                    !declared.contains(name.as_str()) && !name.eq_ignore_ascii_case("pi")
                })
                .collect();

            if !missing.is_empty() {
                report.push((spec.output_id.clone(), missing));
            }
        }

        report
    }

    /// A parameter set at this experiment's defaults.
    pub fn default_parameters(&self) -> Result<ParameterSet, ParameterError> {
        ParameterSet::from_descriptors(&self.parameters)
    }

    /// An engine carrying this experiment's explicit angle-unit tags.
    pub fn engine(&self) -> FormulaEngine {
        let units: HashMap<String, AngleUnit> = self
            .parameters
            .iter()
            .filter_map(|p| p.angle_unit.map(|unit| (p.id.clone(), unit)))
            .collect();

        if units.is_empty() {
            FormulaEngine::new()
        } else {
            FormulaEngine::with_angle_units(units)
        }
    }

    /// Evaluate every formula into a result panel row.
    ///
    /// Values carry the 2-decimal presentation rounding; a formula that
    /// cannot be evaluated shows as 0 rather than failing the panel.
    pub fn evaluate_outputs(
        &self,
        engine: &FormulaEngine,
        params: &ParameterSet,
    ) -> Vec<SimulationResult> {
        self.formulas
            .iter()
            .map(|spec| {
                let value = round_to(engine.evaluate(&spec.formula, params), 2);
                SimulationResult::new(
                    &spec.output_id,
                    &spec.output_name,
                    &spec.output_unit,
                    value,
                )
                .with_formula(&spec.formula)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projectile_record() -> GeneratedExperiment {
        serde_json::from_value(serde_json::json!({
            "title": "Projectile range",
            "subject": "Physics",
            "difficulty_level": "Medium",
            "short_description": "Launch angle vs range",
            "learning_objectives": ["Understand projectile motion"],
            "tools_instructions": ["Virtual launcher"],
            "simulation_config": "R = v0²·sin(2θ)/g",
            "estimated_time": 30,
            "parameters": [
                {"id": "v0", "name": "Initial speed", "unit": "m/s",
                 "min": 0, "max": 50, "step": 1, "defaultValue": 20},
                {"id": "theta", "name": "Launch angle", "unit": "°",
                 "min": 0, "max": 90, "step": 5, "defaultValue": 45},
                {"id": "g", "name": "Gravity", "unit": "m/s²",
                 "min": 1, "max": 20, "step": 0.1, "defaultValue": 9.8}
            ],
            "formulas": [
                {"outputId": "range", "outputName": "Range", "outputUnit": "m",
                 "formula": "(v0^2 * sin(2*theta)) / g"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_from_model_text_strips_prose() {
        let record = projectile_record();
        let json = serde_json::to_string_pretty(&record).unwrap();
        let reply = format!("Sure! Here is the experiment:\n```json\n{json}\n```\nDone.");

        let parsed = GeneratedExperiment::from_model_text(&reply).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_from_model_text_without_json() {
        assert!(matches!(
            GeneratedExperiment::from_model_text("I cannot help with that."),
            Err(ContentError::MissingJson)
        ));
        assert!(matches!(
            GeneratedExperiment::from_model_text("} backwards {"),
            Err(ContentError::MissingJson)
        ));
    }

    #[test]
    fn test_from_model_text_malformed_json() {
        assert!(matches!(
            GeneratedExperiment::from_model_text("{\"title\": }"),
            Err(ContentError::Json(_))
        ));
    }

    #[test]
    fn test_validate() {
        projectile_record().validate().unwrap();

        let mut record = projectile_record();
        record.parameters.clear();
        assert!(matches!(record.validate(), Err(ContentError::NoParameters)));

        let mut record = projectile_record();
        record.formulas.clear();
        assert!(matches!(record.validate(), Err(ContentError::NoFormulas)));

        let mut record = projectile_record();
        let dup = record.parameters[0].clone();
        record.parameters.push(dup);
        assert!(matches!(
            record.validate(),
            Err(ContentError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_unresolved_identifiers() {
        let mut record = projectile_record();
        record.formulas.push(FormulaSpec {
            output_id: "energy".to_string(),
            output_name: "Energy".to_string(),
            output_unit: "J".to_string(),
            formula: "0.5 * mass * v0^2".to_string(),
        });

        let report = record.unresolved_identifiers();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].0, "energy");
        assert_eq!(report[0].1, vec!["mass".to_string()]);
    }

    #[test]
    fn test_pi_is_not_unresolved() {
        let mut record = projectile_record();
        record.formulas[0].formula = "2 * pi * v0".to_string();
        assert!(record.unresolved_identifiers().is_empty());
    }

    #[test]
    fn test_evaluate_outputs() {
        let record = projectile_record();
        let engine = record.engine();
        let params = record.default_parameters().unwrap();

        let results = record.evaluate_outputs(&engine, &params);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "range");
        assert_eq!(results[0].unit, "m");

        // theta=45° reads as degrees via the heuristic: sin(90°) = 1.
        assert_eq!(results[0].value, round_to(400.0 / 9.8, 2));
    }

    #[test]
    fn test_evaluate_outputs_with_broken_formula() {
        let mut record = projectile_record();
        record.formulas[0].formula = "v0 / (g - g)".to_string();

        let engine = record.engine();
        let params = record.default_parameters().unwrap();
        let results = record.evaluate_outputs(&engine, &params);

        assert_eq!(results[0].value, 0.0);
    }

    #[test]
    fn test_engine_uses_declared_angle_units() {
        let mut record = projectile_record();
        record.parameters[1].angle_unit = Some(AngleUnit::Radians);
        record.formulas[0].formula = "sin(theta)".to_string();

        let engine = record.engine();
        let mut params = record.default_parameters().unwrap();
        params.insert("theta", std::f64::consts::FRAC_PI_2);

        let results = record.evaluate_outputs(&engine, &params);
        assert_eq!(results[0].value, 1.0);
    }
}
