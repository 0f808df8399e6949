//! # Hydraulics
//!
//! Fire-flow supply curves and the pipe-friction helpers used to derive new
//! curves from them.
//!
//! - [`curve`] - `FireFlowCurve`: fit, evaluate, tilt, shift
//! - [`pipe`] - Hazen-Williams friction slope, headloss, what-if scenarios
//! - [`summary`] - AFF/NFF read-outs for a curve

pub mod curve;
pub mod pipe;
pub mod summary;

/// Exponent of flow in both the supply curve and Hazen-Williams friction
pub const FLOW_EXPONENT: f64 = 1.85;

pub use curve::{Advisory, Category, CurveStyle, FireFlowCurve, DEFAULT_MIN_PRESSURE};
pub use pipe::{
    headloss, unit_friction_slope, what_if_scenarios, FrictionChange, PipeSegment, DEFAULT_C_FACTOR,
};
pub use summary::{query, CurveSummary, FlowQuery, QueryAnswer};
