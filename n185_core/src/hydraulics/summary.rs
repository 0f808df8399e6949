//! # Curve Summary
//!
//! The standard read-out for a selected curve: test data, `k`, Available Fire
//! Flow at the usual residual pressures, and the pressure left at common
//! required flows. Values are serializable so a UI, the CLI or a script can
//! all present the same numbers.

use serde::{Deserialize, Serialize};

use crate::units::{Gpm, Psi};

use super::curve::FireFlowCurve;

/// Residual pressures (PSI) reported for Available Fire Flow
pub const STANDARD_MIN_PRESSURES: [f64; 3] = [20.0, 30.0, 40.0];

/// Required flows (GPM) reported for pressure-at-flow
pub const STANDARD_REQUIRED_FLOWS: [f64; 4] = [1000.0, 1500.0, 2000.0, 2500.0];

/// The physical test behind a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestData {
    pub flow: Gpm,
    pub residual: Psi,
}

/// Available flow at a minimum pressure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvailableFlow {
    pub min_pressure: Psi,
    /// Non-finite when the curve has no such flow
    pub flow: Gpm,
}

/// Remaining pressure at a required flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureAtFlow {
    pub required_flow: Gpm,
    pub pressure: Psi,
}

/// Read-out for one curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSummary {
    pub id: String,
    pub static_pressure: Psi,
    /// `None` for derived curves
    pub test: Option<TestData>,
    pub k: f64,
    pub is_derived: bool,
    pub available_flows: Vec<AvailableFlow>,
    pub pressures_at_flow: Vec<PressureAtFlow>,
}

impl CurveSummary {
    /// Summary at the standard pressures and flows.
    pub fn for_curve(curve: &FireFlowCurve) -> Self {
        Self::with_points(curve, &STANDARD_MIN_PRESSURES, &STANDARD_REQUIRED_FLOWS)
    }

    /// Summary at caller-chosen pressures and flows.
    pub fn with_points(curve: &FireFlowCurve, min_pressures: &[f64], required_flows: &[f64]) -> Self {
        let test = match (curve.test_flow(), curve.test_residual()) {
            (Some(flow), Some(residual)) => Some(TestData {
                flow: Gpm(flow),
                residual: Psi(residual),
            }),
            _ => None,
        };

        CurveSummary {
            id: curve.id().to_string(),
            static_pressure: Psi(curve.static_pressure()),
            test,
            k: curve.k(),
            is_derived: curve.is_derived(),
            available_flows: min_pressures
                .iter()
                .map(|&p| AvailableFlow {
                    min_pressure: Psi(p),
                    flow: Gpm(curve.available_fire_flow(p)),
                })
                .collect(),
            pressures_at_flow: required_flows
                .iter()
                .map(|&q| PressureAtFlow {
                    required_flow: Gpm(q),
                    pressure: Psi(curve.needed_fire_flow_pressure(q)),
                })
                .collect(),
        }
    }
}

/// A one-off AFF or NFF question about a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowQuery {
    /// Available Fire Flow at this minimum pressure
    AvailableFlow { min_pressure: f64 },
    /// Pressure remaining at this required flow
    PressureAtFlow { required_flow: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryAnswer {
    AvailableFlow(AvailableFlow),
    PressureAtFlow(PressureAtFlow),
}

/// Answer a custom AFF/NFF query.
pub fn query(curve: &FireFlowCurve, question: FlowQuery) -> QueryAnswer {
    match question {
        FlowQuery::AvailableFlow { min_pressure } => QueryAnswer::AvailableFlow(AvailableFlow {
            min_pressure: Psi(min_pressure),
            flow: Gpm(curve.available_fire_flow(min_pressure)),
        }),
        FlowQuery::PressureAtFlow { required_flow } => QueryAnswer::PressureAtFlow(PressureAtFlow {
            required_flow: Gpm(required_flow),
            pressure: Psi(curve.needed_fire_flow_pressure(required_flow)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydraulics::CurveStyle;

    fn curve() -> FireFlowCurve {
        FireFlowCurve::new(65.0, 1500.0, 35.0, "H-101", CurveStyle::default()).unwrap()
    }

    #[test]
    fn test_standard_summary() {
        let summary = CurveSummary::for_curve(&curve());
        assert_eq!(summary.available_flows.len(), 3);
        assert_eq!(summary.pressures_at_flow.len(), 4);
        assert_eq!(summary.test.unwrap().flow, Gpm(1500.0));

        // Higher minimum pressure, less available flow
        let flows: Vec<f64> = summary.available_flows.iter().map(|a| a.flow.0).collect();
        assert!(flows[0] > flows[1] && flows[1] > flows[2]);

        let at_1500 = summary.pressures_at_flow[1];
        assert_eq!(at_1500.required_flow, Gpm(1500.0));
        assert!((at_1500.pressure.0 - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_derived_summary_has_no_test() {
        let summary = CurveSummary::for_curve(&curve().tilt(1e-6));
        assert!(summary.test.is_none());
        assert!(summary.is_derived);
    }

    #[test]
    fn test_custom_query() {
        let c = curve();
        match query(&c, FlowQuery::AvailableFlow { min_pressure: 35.0 }) {
            QueryAnswer::AvailableFlow(a) => assert!((a.flow.0 - 1500.0).abs() < 1e-6),
            other => panic!("unexpected answer: {other:?}"),
        }
        match query(&c, FlowQuery::PressureAtFlow { required_flow: 0.0 }) {
            QueryAnswer::PressureAtFlow(p) => assert_eq!(p.pressure, Psi(65.0)),
            other => panic!("unexpected answer: {other:?}"),
        }
    }

    #[test]
    fn test_summary_json() {
        let json = serde_json::to_string(&CurveSummary::for_curve(&curve())).unwrap();
        assert!(json.contains("\"id\":\"H-101\""));
        assert!(json.contains("\"static_pressure\":65.0"));
    }
}
