//! Full path of an AI-generated experiment: model reply text → record →
//! parameter set → evaluated result panel → plotted curve.

use stemlab::content::GeneratedExperiment;
use stemlab::formula::round_to;
use stemlab::sampler::{sample_curve, Domain};
use stemlab::simulation::SimulationType;

const MODEL_REPLY: &str = r#"Here is the experiment you asked for:

{
  "title": "Thí nghiệm con lắc đơn",
  "subject": "Vật lý",
  "difficulty_level": "Trung bình",
  "short_description": "Khảo sát chu kỳ con lắc theo chiều dài dây.",
  "learning_objectives": ["Hiểu chu kỳ dao động", "Đo gia tốc trọng trường"],
  "tools_instructions": ["Dây treo", "Quả nặng", "Đồng hồ bấm giây"],
  "simulation_config": "T = 2π√(l/g)",
  "estimated_time": 30,
  "parameters": [
    {"id": "length", "name": "Chiều dài dây", "unit": "m",
     "min": 0.1, "max": 2, "step": 0.1, "defaultValue": 1},
    {"id": "gravity", "name": "Gia tốc g", "unit": "m/s²",
     "min": 1, "max": 20, "step": 0.5, "defaultValue": 9.8}
  ],
  "formulas": [
    {"outputId": "period", "outputName": "Chu kỳ", "outputUnit": "s",
     "formula": "2 * pi * sqrt(length / gravity)"},
    {"outputId": "frequency", "outputName": "Tần số", "outputUnit": "Hz",
     "formula": "1 / (2 * pi * sqrt(length / gravity))"}
  ]
}

Let me know if you want adjustments."#;

#[test]
fn model_reply_to_result_panel() {
    let experiment = GeneratedExperiment::from_model_text(MODEL_REPLY).unwrap();
    experiment.validate().unwrap();
    assert!(experiment.unresolved_identifiers().is_empty());

    let engine = experiment.engine();
    let params = experiment.default_parameters().unwrap();
    let results = experiment.evaluate_outputs(&engine, &params);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "period");
    assert_eq!(results[0].value, 2.01); // 2π√(1/9.8) to 2 d.p.
    assert_eq!(results[1].id, "frequency");
    assert_eq!(results[1].value, 0.5);
}

#[test]
fn slider_update_changes_outputs() {
    let experiment = GeneratedExperiment::from_model_text(MODEL_REPLY).unwrap();
    let engine = experiment.engine();
    let mut params = experiment.default_parameters().unwrap();

    // The slider snaps the raw value onto the 0.1 grid first.
    params.set("length", 0.25).unwrap();
    let snapped = params.get("length").unwrap();
    assert_eq!(snapped, 0.2);

    let results = experiment.evaluate_outputs(&engine, &params);
    let expected = 2.0 * std::f64::consts::PI * (snapped / 9.8).sqrt();
    assert_eq!(results[0].value, round_to(expected, 2));
    assert!(results[0].value < 2.01);
}

#[test]
fn curve_sampling_over_generated_formula() {
    let experiment = GeneratedExperiment::from_model_text(MODEL_REPLY).unwrap();
    let engine = experiment.engine();
    let params = experiment.default_parameters().unwrap();

    // Sweep rope length to plot period vs length.
    let points = sample_curve(
        &engine,
        &experiment.formulas[0].formula,
        &params,
        "length",
        &Domain::with_step(0.1, 2.0, 0.1),
    );

    assert_eq!(points.len(), 20);
    // Monotonically increasing in length.
    assert!(points.windows(2).all(|w| w[1].1 > w[0].1));
}

#[test]
fn simulation_type_tags_round_trip_with_stored_records() {
    // Stored experiment records carry the renderer tag as a string.
    let tag: SimulationType = serde_json::from_str("\"pendulum\"").unwrap();
    assert_eq!(tag, SimulationType::Pendulum);
    assert_eq!(serde_json::to_string(&tag).unwrap(), "\"pendulum\"");
}
