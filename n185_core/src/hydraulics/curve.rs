//! # Fire-Flow Supply Curve
//!
//! A supply curve per NFPA 291 is the power law
//!
//! ```text
//! P = Ps - k * Q^1.85
//! ```
//!
//! where `Ps` is the static pressure and `k` is fitted from a single hydrant
//! flow test `(Qt, Pt)`: `k = (Ps - Pt) / Qt^1.85`.
//!
//! Curves are either *test curves* (backed by a physical flow test) or
//! *derived curves* produced by [`FireFlowCurve::tilt`] (change in pipe
//! friction) or [`FireFlowCurve::shift`] (change in static pressure). Derived
//! curves never touch their parent; they only remember its id.
//!
//! ## Example
//!
//! ```rust
//! use n185_core::hydraulics::{CurveStyle, FireFlowCurve};
//!
//! let curve = FireFlowCurve::new(65.0, 1500.0, 35.0, "H-101", CurveStyle::default())?;
//!
//! // Pressure left when flowing the test flow is the test residual
//! assert!((curve.needed_fire_flow_pressure(1500.0) - 35.0).abs() < 1e-9);
//!
//! // Residual above 20 PSI means more than the test flow is available at 20 PSI
//! assert!(curve.available_fire_flow(20.0) > 1500.0);
//! # Ok::<(), n185_core::errors::FlowError>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{FlowError, FlowResult};
use crate::style::{LineStyle, DEFAULT_CURVE_COLOR};
use crate::units::{elevation_to_pressure, Feet};

use super::pipe::{FrictionChange, PipeSegment};
use super::FLOW_EXPONENT;

/// Minimum residual pressure used for Available Fire Flow unless stated
pub const DEFAULT_MIN_PRESSURE: f64 = 20.0;

/// Static pressures above this are flagged as implausible
pub const HIGH_STATIC_PSI: f64 = 100.0;

/// Residual pressures below this are flagged as implausible
pub const LOW_RESIDUAL_PSI: f64 = 20.0;

/// Where a curve came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Measured in the field
    #[default]
    Field,
    /// Produced by a modelling operation (tilt/shift)
    Model,
    /// One of a set of what-if alternatives
    Scenario,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Field => "field",
            Category::Model => "model",
            Category::Scenario => "scenario",
        }
    }
}

/// Cosmetic attributes of a curve. None of these affect hydraulics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveStyle {
    pub color: String,
    pub line_style: LineStyle,
    pub category: Category,
    pub visible: bool,
}

impl Default for CurveStyle {
    fn default() -> Self {
        CurveStyle {
            color: DEFAULT_CURVE_COLOR.to_string(),
            line_style: LineStyle::Solid,
            category: Category::Field,
            visible: true,
        }
    }
}

/// Physically implausible (but valid) test inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Advisory {
    /// Static pressure above 100 PSI
    HighStatic { static_psi: f64 },
    /// Test residual below 20 PSI
    LowResidual { residual_psi: f64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::HighStatic { static_psi } => write!(
                f,
                "Static is {static_psi} PSI, greater than {HIGH_STATIC_PSI} PSI. This may be unreasonable."
            ),
            Advisory::LowResidual { residual_psi } => write!(
                f,
                "Test Residual is {residual_psi} PSI, less than {LOW_RESIDUAL_PSI} PSI. This may be unreasonable."
            ),
        }
    }
}

/// One fire-flow supply curve.
///
/// Hydraulic fields are private so `k` can only come from a validated test
/// or from a transform of another curve.
#[derive(Debug, Clone, PartialEq)]
pub struct FireFlowCurve {
    id: String,
    static_pressure: f64,
    test_flow: Option<f64>,
    test_residual: Option<f64>,
    k: f64,
    is_derived: bool,
    parent_id: Option<String>,
    /// Color, line style, category, visibility
    pub style: CurveStyle,
}

impl FireFlowCurve {
    /// Fit a curve from a hydrant flow test.
    ///
    /// # Errors
    ///
    /// `FlowError::InvalidInput` when any value is NaN/infinite or
    /// non-positive, or when static <= residual.
    pub fn new(
        static_pressure: f64,
        test_flow: f64,
        test_residual: f64,
        id: impl Into<String>,
        style: CurveStyle,
    ) -> FlowResult<Self> {
        validate_test(static_pressure, test_flow, test_residual)?;

        let curve = FireFlowCurve {
            id: id.into(),
            static_pressure,
            test_flow: Some(test_flow),
            test_residual: Some(test_residual),
            k: (static_pressure - test_residual) / test_flow.powf(FLOW_EXPONENT),
            is_derived: false,
            parent_id: None,
            style,
        };

        for advisory in curve.advisories() {
            tracing::warn!(curve = %curve.id, "{advisory}");
        }

        Ok(curve)
    }

    /// Fit a curve from text entries (form fields, CLI arguments).
    pub fn parse(
        static_pressure: &str,
        test_flow: &str,
        test_residual: &str,
        id: impl Into<String>,
        style: CurveStyle,
    ) -> FlowResult<Self> {
        let static_pressure = parse_number("static_pressure", static_pressure)?;
        let test_flow = parse_number("test_flow", test_flow)?;
        let test_residual = parse_number("test_residual", test_residual)?;
        Self::new(static_pressure, test_flow, test_residual, id, style)
    }

    /// Rebuild a curve from persisted fields. `k` is taken as authoritative.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: String,
        static_pressure: f64,
        test_flow: Option<f64>,
        test_residual: Option<f64>,
        k: f64,
        is_derived: bool,
        parent_id: Option<String>,
        style: CurveStyle,
    ) -> Self {
        FireFlowCurve {
            id,
            static_pressure,
            test_flow,
            test_residual,
            k,
            is_derived,
            parent_id,
            style,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn static_pressure(&self) -> f64 {
        self.static_pressure
    }

    /// Test flow (GPM); `None` for derived curves
    pub fn test_flow(&self) -> Option<f64> {
        self.test_flow
    }

    /// Test residual (PSI); `None` for derived curves
    pub fn test_residual(&self) -> Option<f64> {
        self.test_residual
    }

    /// Friction coefficient k in `P = Ps - k * Q^1.85`
    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn is_derived(&self) -> bool {
        self.is_derived
    }

    /// Id of the curve this one was derived from
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.style.visible
    }

    /// The physical test point `(Qt, Pt)`, if this curve has one.
    pub fn test_point(&self) -> Option<(f64, f64)> {
        match (self.test_flow, self.test_residual) {
            (Some(q), Some(p)) if !self.is_derived => Some((q, p)),
            _ => None,
        }
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.style.category = category;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.style.color = color.into();
        self
    }

    /// Implausible-but-valid conditions of this curve's inputs.
    pub fn advisories(&self) -> Vec<Advisory> {
        let mut found = Vec::new();
        if self.static_pressure > HIGH_STATIC_PSI {
            found.push(Advisory::HighStatic {
                static_psi: self.static_pressure,
            });
        }
        if let Some(residual) = self.test_residual {
            if residual < LOW_RESIDUAL_PSI {
                found.push(Advisory::LowResidual {
                    residual_psi: residual,
                });
            }
        }
        found
    }

    /// Pressure (PSI) at flow `q` (GPM). Negative past the curve's zero.
    pub fn pressure_at_flow(&self, q: f64) -> f64 {
        self.static_pressure - self.k * q.powf(FLOW_EXPONENT)
    }

    /// Flow (GPM) at which pressure drops to `p` (PSI).
    ///
    /// Zero at or above static. Non-finite when `k <= 0`: a curve that never
    /// loses pressure has no such flow, and callers display that as N/A.
    pub fn flow_at_pressure(&self, p: f64) -> f64 {
        if p >= self.static_pressure {
            return 0.0;
        }
        if !(self.k > 0.0) {
            return f64::NAN;
        }
        ((self.static_pressure - p) / self.k).powf(1.0 / FLOW_EXPONENT)
    }

    /// Available Fire Flow at the given minimum residual pressure.
    pub fn available_fire_flow(&self, min_pressure: f64) -> f64 {
        self.flow_at_pressure(min_pressure)
    }

    /// Pressure remaining at the required (needed) fire flow.
    pub fn needed_fire_flow_pressure(&self, required_flow: f64) -> f64 {
        self.pressure_at_flow(required_flow)
    }

    /// `num_points + 1` evenly spaced `(Q, P)` samples over `[0, max_flow]`.
    pub fn generate_curve(&self, max_flow: f64, num_points: usize) -> Vec<(f64, f64)> {
        let n = num_points.max(1);
        (0..=n)
            .map(|i| {
                let q = max_flow * i as f64 / n as f64;
                (q, self.pressure_at_flow(q))
            })
            .collect()
    }

    /// Derived curve with `k' = k + friction_slope_delta`.
    ///
    /// Positive deltas add friction (a point downstream of the test), negative
    /// deltas remove it (upstream). The result is not validated: a `k'` at or
    /// below zero yields non-finite flows rather than an error.
    pub fn tilt(&self, friction_slope_delta: f64) -> FireFlowCurve {
        let mut tilted = self.derive(self.static_pressure);
        tilted.k = self.k + friction_slope_delta;
        tilted
    }

    /// Tilt by the friction of a pipe run added or removed.
    pub fn tilt_for_pipe(&self, pipe: &PipeSegment, change: FrictionChange) -> FlowResult<FireFlowCurve> {
        pipe.validate()?;
        Ok(self.tilt(change.sign() * pipe.friction_slope()))
    }

    /// Derived curve with the same `k` and a new static pressure.
    pub fn shift(&self, new_static_pressure: f64) -> FlowResult<FireFlowCurve> {
        if !new_static_pressure.is_finite() || new_static_pressure <= 0.0 {
            return Err(FlowError::invalid_input(
                "new_static_pressure",
                new_static_pressure.to_string(),
                "New static pressure must be greater than 0",
            ));
        }
        Ok(self.derive(new_static_pressure))
    }

    /// Shift for an elevation change. Positive feet = higher = less pressure.
    pub fn shift_by_elevation(&self, elevation: Feet) -> FlowResult<FireFlowCurve> {
        let change = elevation_to_pressure(elevation);
        self.shift(self.static_pressure - change.value())
    }

    fn derive(&self, static_pressure: f64) -> FireFlowCurve {
        tracing::debug!(parent = %self.id, static_pressure, "deriving curve");
        FireFlowCurve {
            id: format!("{}*", self.id),
            static_pressure,
            test_flow: None,
            test_residual: None,
            k: self.k,
            is_derived: true,
            parent_id: Some(self.id.clone()),
            style: CurveStyle {
                visible: true,
                ..self.style.clone()
            },
        }
    }
}

pub(crate) fn validate_test(static_pressure: f64, test_flow: f64, test_residual: f64) -> FlowResult<()> {
    for (field, value) in [
        ("static_pressure", static_pressure),
        ("test_flow", test_flow),
        ("test_residual", test_residual),
    ] {
        if !value.is_finite() {
            return Err(FlowError::invalid_input(
                field,
                value.to_string(),
                "Numerical inputs required for Static, Test Flow, and Test Residual",
            ));
        }
    }

    if static_pressure <= 0.0 {
        return Err(FlowError::invalid_input(
            "static_pressure",
            static_pressure.to_string(),
            "Static must be greater than 0",
        ));
    }
    if test_flow <= 0.0 {
        return Err(FlowError::invalid_input(
            "test_flow",
            test_flow.to_string(),
            "Test Flow must be greater than 0",
        ));
    }
    if test_residual <= 0.0 {
        return Err(FlowError::invalid_input(
            "test_residual",
            test_residual.to_string(),
            "Test Residual must be greater than 0",
        ));
    }
    if static_pressure <= test_residual {
        return Err(FlowError::invalid_input(
            "static_pressure",
            format!("{static_pressure} <= {test_residual}"),
            "Static pressure must be greater than residual pressure",
        ));
    }
    Ok(())
}

fn parse_number(field: &str, text: &str) -> FlowResult<f64> {
    text.trim().parse::<f64>().map_err(|_| {
        FlowError::invalid_input(
            field,
            text,
            "Numerical inputs required for Static, Test Flow, and Test Residual",
        )
    })
}
