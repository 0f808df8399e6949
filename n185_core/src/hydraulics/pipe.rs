//! # Pipe Friction (Hazen-Williams)
//!
//! Friction loss in US units, expressed in the same `k * Q^1.85` form as a
//! supply curve so a pipe run can be added to (or removed from) a curve by
//! adjusting `k`.
//!
//! ```text
//! k' = 10.44 / C^1.85 / d^4.87 / 2.31        (PSI per foot per GPM^1.85)
//! hL = L * k' * Q^1.85                       (PSI)
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{FlowError, FlowResult};
use crate::style::Rgb;
use crate::units::{Feet, Inches};

use super::curve::{Category, FireFlowCurve};
use super::FLOW_EXPONENT;

/// Hazen-Williams C for cement-lined ductile iron
pub const DEFAULT_C_FACTOR: f64 = 130.0;

/// Hue step between what-if scenario colors (golden angle)
const SCENARIO_HUE_STEP: f64 = 137.5;

/// Unit friction slope of a pipe: PSI lost per foot at 1 GPM^1.85.
pub fn unit_friction_slope(diameter_in: f64, c_factor: f64) -> f64 {
    10.44 / c_factor.powf(FLOW_EXPONENT) / diameter_in.powf(4.87) / 2.31
}

/// Friction loss (PSI) through `length_ft` of pipe at `flow_gpm`.
pub fn headloss(length_ft: f64, diameter_in: f64, flow_gpm: f64, c_factor: f64) -> f64 {
    length_ft * unit_friction_slope(diameter_in, c_factor) * flow_gpm.powf(FLOW_EXPONENT)
}

/// Whether a pipe run is added to or removed from the path to the test point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrictionChange {
    /// Extra pipe downstream of the test hydrant
    Add,
    /// Pipe upstream of the test hydrant that is no longer in the path
    Remove,
}

impl FrictionChange {
    pub fn sign(self) -> f64 {
        match self {
            FrictionChange::Add => 1.0,
            FrictionChange::Remove => -1.0,
        }
    }
}

/// A straight run of pipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeSegment {
    pub length: Feet,
    pub diameter: Inches,
    /// Hazen-Williams roughness coefficient
    pub c_factor: f64,
}

impl PipeSegment {
    pub fn new(length_ft: f64, diameter_in: f64, c_factor: f64) -> Self {
        PipeSegment {
            length: Feet(length_ft),
            diameter: Inches(diameter_in),
            c_factor,
        }
    }

    pub fn validate(&self) -> FlowResult<()> {
        let checks = [
            ("length_ft", self.length.value(), "Pipe length must be positive"),
            ("diameter_in", self.diameter.value(), "Pipe diameter must be positive"),
            ("c_factor", self.c_factor, "Hazen-Williams C must be positive"),
        ];
        for (field, value, reason) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(FlowError::invalid_input(field, value.to_string(), reason));
            }
        }
        Ok(())
    }

    /// Change in curve `k` contributed by this run.
    pub fn friction_slope(&self) -> f64 {
        self.length.value() * unit_friction_slope(self.diameter.value(), self.c_factor)
    }

    /// Friction loss (PSI) at the given flow.
    pub fn headloss(&self, flow_gpm: f64) -> f64 {
        headloss(self.length.value(), self.diameter.value(), flow_gpm, self.c_factor)
    }
}

/// Color for the `index`-th what-if scenario.
pub fn scenario_color(index: usize) -> String {
    let hue = (index as f64 * SCENARIO_HUE_STEP) % 360.0;
    Rgb::from_hsl(hue, 0.60, 0.45).to_hex()
}

/// Compare candidate pipe sizes: one added-friction curve per diameter.
///
/// Each result is a `scenario` curve labelled `"<id> (<d>\")"`.
pub fn what_if_scenarios(
    curve: &FireFlowCurve,
    length_ft: f64,
    c_factor: f64,
    diameters_in: &[f64],
) -> FlowResult<Vec<FireFlowCurve>> {
    if diameters_in.is_empty() {
        return Err(FlowError::invalid_input(
            "diameters_in",
            "[]",
            "Please enter valid pipe sizes",
        ));
    }

    diameters_in
        .iter()
        .enumerate()
        .map(|(index, &diameter)| {
            let pipe = PipeSegment::new(length_ft, diameter, c_factor);
            let scenario = curve
                .tilt_for_pipe(&pipe, FrictionChange::Add)?
                .with_id(format!("{} ({}\")", curve.id(), diameter))
                .with_category(Category::Scenario)
                .with_color(scenario_color(index));
            Ok(scenario)
        })
        .collect()
}
