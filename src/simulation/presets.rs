//! The built-in experiments
//!
//! Closed-form computations for the six stock simulations. Values are
//! rounded for presentation with the same per-output precision the
//! results panels use.

use crate::formula::round_to;
use crate::parameters::ParameterDescriptor;
use crate::simulation::{SimulationConfig, SimulationResult, SimulationType};

fn descriptor(
    id: &str,
    name: &str,
    unit: &str,
    min: f64,
    max: f64,
    step: f64,
    default_value: f64,
) -> ParameterDescriptor {
    ParameterDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        unit: unit.to_string(),
        min,
        max,
        step,
        default_value,
        angle_unit: None,
    }
}

/// Look up the built-in definition for a simulation type, if one exists.
pub fn config_for(sim_type: SimulationType) -> Option<SimulationConfig> {
    match sim_type {
        SimulationType::OhmLaw => Some(ohm_law()),
        SimulationType::AcidBase => Some(acid_base()),
        SimulationType::PlantCell => Some(plant_cell()),
        SimulationType::Pendulum => Some(pendulum()),
        SimulationType::Refraction => Some(refraction()),
        SimulationType::Electrolysis => Some(electrolysis()),
        _ => None,
    }
}

/// Ohm's law: current and power from voltage and resistance.
pub fn ohm_law() -> SimulationConfig {
    SimulationConfig::new(
        SimulationType::OhmLaw,
        vec![
            descriptor("voltage", "Voltage", "V", 0.0, 12.0, 0.5, 6.0),
            descriptor("resistance", "Resistance", "Ω", 1.0, 100.0, 1.0, 20.0),
        ],
        |params| {
            let voltage = params.get_or("voltage", 6.0);
            let resistance = params.get_or("resistance", 20.0);
            let current = voltage / resistance;
            let power = voltage * current;

            vec![
                SimulationResult::new("current", "Current", "A", round_to(current, 3))
                    .with_formula("I = U/R"),
                SimulationResult::new("power", "Power", "W", round_to(power, 3))
                    .with_formula("P = U×I"),
            ]
        },
    )
}

/// Strong acid/strong base mixing: resulting pH and mole balance.
///
/// Status output: 0 = excess acid, 1 = neutral, 2 = excess base.
pub fn acid_base() -> SimulationConfig {
    SimulationConfig::new(
        SimulationType::AcidBase,
        vec![
            descriptor("acidConc", "HCl concentration", "M", 0.1, 2.0, 0.1, 1.0),
            descriptor("baseConc", "NaOH concentration", "M", 0.1, 2.0, 0.1, 1.0),
            descriptor("acidVolume", "Acid volume", "ml", 10.0, 100.0, 5.0, 50.0),
            descriptor("baseVolume", "Base volume", "ml", 10.0, 100.0, 5.0, 30.0),
        ],
        |params| {
            let acid_conc = params.get_or("acidConc", 1.0);
            let base_conc = params.get_or("baseConc", 1.0);
            let acid_volume = params.get_or("acidVolume", 50.0);
            let base_volume = params.get_or("baseVolume", 30.0);

            let acid_moles = acid_conc * acid_volume / 1000.0;
            let base_moles = base_conc * base_volume / 1000.0;
            let total_volume = (acid_volume + base_volume) / 1000.0;

            let (ph, status) = if (acid_moles - base_moles).abs() < 1e-4 {
                (7.0, 1.0)
            } else if acid_moles > base_moles {
                let excess_h = (acid_moles - base_moles) / total_volume;
                (-excess_h.log10(), 0.0)
            } else {
                let excess_oh = (base_moles - acid_moles) / total_volume;
                let p_oh = -excess_oh.log10();
                (14.0 - p_oh, 2.0)
            };

            vec![
                SimulationResult::new("ph", "pH", "", round_to(ph, 2)),
                SimulationResult::new("status", "Status", "", status),
                SimulationResult::new("acidMoles", "HCl amount", "mol", round_to(acid_moles, 4)),
                SimulationResult::new("baseMoles", "NaOH amount", "mol", round_to(base_moles, 4)),
            ]
        },
    )
}

/// Microscope view of a plant cell: clarity and apparent size vs zoom.
pub fn plant_cell() -> SimulationConfig {
    SimulationConfig::new(
        SimulationType::PlantCell,
        vec![
            descriptor("zoom", "Magnification", "x", 100.0, 400.0, 50.0, 100.0),
            descriptor("stain", "Stain", "%", 0.0, 100.0, 10.0, 50.0),
        ],
        |params| {
            let zoom = params.get_or("zoom", 100.0);
            let stain = params.get_or("stain", 50.0);
            let visibility = (zoom / 400.0 * 100.0 + stain * 0.3).min(100.0);

            vec![
                SimulationResult::new("visibility", "Clarity", "%", round_to(visibility, 1)),
                SimulationResult::new(
                    "cellSize",
                    "Apparent size",
                    "μm",
                    round_to(100.0 / zoom * 50.0, 1),
                ),
            ]
        },
    )
}

/// Simple pendulum: period, frequency, angular frequency.
///
/// The initial angle drives the animation only; in the small-angle
/// approximation it does not enter the period.
pub fn pendulum() -> SimulationConfig {
    SimulationConfig::new(
        SimulationType::Pendulum,
        vec![
            descriptor("length", "Rope length", "m", 0.1, 2.0, 0.1, 1.0),
            descriptor("angle", "Initial angle", "°", 5.0, 45.0, 5.0, 15.0),
            descriptor("gravity", "Gravity", "m/s²", 1.0, 20.0, 0.5, 9.8),
        ],
        |params| {
            let length = params.get_or("length", 1.0);
            let gravity = params.get_or("gravity", 9.8);

            let period = 2.0 * std::f64::consts::PI * (length / gravity).sqrt();
            let frequency = 1.0 / period;
            let omega = (gravity / length).sqrt();

            vec![
                SimulationResult::new("period", "Period", "s", round_to(period, 3))
                    .with_formula("T = 2π√(l/g)"),
                SimulationResult::new("frequency", "Frequency", "Hz", round_to(frequency, 3))
                    .with_formula("f = 1/T"),
                SimulationResult::new("omega", "Angular frequency", "rad/s", round_to(omega, 3))
                    .with_formula("ω = √(g/l)"),
            ]
        },
    )
}

/// Snell refraction: refracted angle, critical angle, total internal
/// reflection flag (0/1).
pub fn refraction() -> SimulationConfig {
    SimulationConfig::new(
        SimulationType::Refraction,
        vec![
            descriptor("incidentAngle", "Incident angle", "°", 0.0, 85.0, 5.0, 30.0),
            descriptor("n1", "Index of medium 1", "", 1.0, 2.0, 0.1, 1.0),
            descriptor("n2", "Index of medium 2", "", 1.0, 2.5, 0.1, 1.5),
        ],
        |params| {
            let incident_angle = params.get_or("incidentAngle", 30.0);
            let n1 = params.get_or("n1", 1.0);
            let n2 = params.get_or("n2", 1.5);

            let sin_refracted = (n1 / n2) * incident_angle.to_radians().sin();
            let total_reflection = sin_refracted > 1.0;
            let refracted_angle = if total_reflection {
                90.0
            } else {
                sin_refracted.asin().to_degrees()
            };

            let critical_angle = if n1 < n2 {
                90.0
            } else {
                (n2 / n1).asin().to_degrees()
            };

            vec![
                SimulationResult::new(
                    "refractedAngle",
                    "Refracted angle",
                    "°",
                    round_to(refracted_angle, 1),
                )
                .with_formula("n₁sinθ₁ = n₂sinθ₂"),
                SimulationResult::new(
                    "criticalAngle",
                    "Critical angle",
                    "°",
                    round_to(critical_angle, 1),
                ),
                SimulationResult::new(
                    "totalReflection",
                    "Total internal reflection",
                    "",
                    if total_reflection { 1.0 } else { 0.0 },
                ),
            ]
        },
    )
}

/// Electrolysis of CuSO₄ with copper deposition and oxygen evolution,
/// per Faraday's law.
pub fn electrolysis() -> SimulationConfig {
    SimulationConfig::new(
        SimulationType::Electrolysis,
        vec![
            descriptor("current", "Current", "A", 0.1, 5.0, 0.1, 1.0),
            descriptor("time", "Time", "min", 1.0, 60.0, 1.0, 30.0),
        ],
        |params| {
            let current = params.get_or("current", 1.0);
            let time_seconds = params.get_or("time", 30.0) * 60.0;

            const FARADAY: f64 = 96485.0;
            // Cu: M = 64 g/mol, n = 2; O₂: M = 32 g/mol, n = 4.
            let mass_cu = (64.0 * current * time_seconds) / (2.0 * FARADAY);
            let mass_o2 = (32.0 * current * time_seconds) / (4.0 * FARADAY);
            let volume_o2 = (mass_o2 / 32.0) * 22.4;

            vec![
                SimulationResult::new("massCu", "Copper deposited", "g", round_to(mass_cu, 3))
                    .with_formula("m = (M×I×t)/(n×F)"),
                SimulationResult::new(
                    "volumeO2",
                    "O₂ volume (STP)",
                    "L",
                    round_to(volume_o2, 3),
                ),
                SimulationResult::new(
                    "charge",
                    "Charge",
                    "C",
                    round_to(current * time_seconds, 1),
                )
                .with_formula("Q = I×t"),
            ]
        },
    )
}
