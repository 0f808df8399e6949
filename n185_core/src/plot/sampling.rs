//! # Curve Sampling
//!
//! Turns a supply curve into screen-space polylines. The curve is evaluated
//! at evenly spaced flows; samples whose pressure falls outside
//! `[0, 1.2 * max_pressure]` are dropped and split the path, so a renderer
//! never joins across an excluded point.

use serde::{Deserialize, Serialize};

use crate::hydraulics::FireFlowCurve;
use crate::style::LineStyle;

use super::coords::{PlotCoordinateSystem, ScreenPoint};

/// Minimum number of intervals across the sampled flow range
pub const DEFAULT_SAMPLES: usize = 100;

/// Pressure headroom above the axis maximum before samples are dropped
pub const PRESSURE_HEADROOM: f64 = 1.2;

/// Radius of the hollow test-point marker (px)
pub const TEST_MARKER_RADIUS: f64 = 6.0;

/// How densely and how far to sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    /// Intervals across the range; values below 100 are raised to 100
    pub samples: usize,
    /// Sampled range as a multiple of `max_flow`
    pub overscan: f64,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        SamplingOptions {
            samples: DEFAULT_SAMPLES,
            overscan: 1.0,
        }
    }
}

/// Marker for the physical flow test behind a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestMarker {
    pub center: ScreenPoint,
    pub radius: f64,
}

/// Screen geometry for one visible curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveTrace {
    pub id: String,
    pub color: String,
    pub line_style: LineStyle,
    /// Runs of consecutive in-bounds samples
    pub segments: Vec<Vec<ScreenPoint>>,
    pub test_marker: Option<TestMarker>,
}

impl CurveTrace {
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

/// Sample one curve. Hidden curves produce `None`.
pub fn sample_curve(
    coords: &PlotCoordinateSystem,
    curve: &FireFlowCurve,
    options: &SamplingOptions,
) -> Option<CurveTrace> {
    if !curve.is_visible() {
        return None;
    }

    let samples = options.samples.max(DEFAULT_SAMPLES);
    let overscan = if options.overscan.is_finite() && options.overscan > 0.0 {
        options.overscan
    } else {
        1.0
    };
    let end_flow = coords.max_flow() * overscan;
    let ceiling = coords.max_pressure() * PRESSURE_HEADROOM;

    let mut segments = Vec::new();
    let mut current: Vec<ScreenPoint> = Vec::new();

    for i in 0..=samples {
        let q = end_flow * i as f64 / samples as f64;
        let p = curve.pressure_at_flow(q);

        if (0.0..=ceiling).contains(&p) {
            current.push(coords.forward(q, p));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    let test_marker = curve.test_point().map(|(flow, residual)| TestMarker {
        center: coords.forward(flow, residual),
        radius: TEST_MARKER_RADIUS,
    });

    Some(CurveTrace {
        id: curve.id().to_string(),
        color: curve.style.color.clone(),
        line_style: curve.style.line_style,
        segments,
        test_marker,
    })
}

/// Sample every visible curve, in order.
pub fn sample_curves(
    coords: &PlotCoordinateSystem,
    curves: &[FireFlowCurve],
    options: &SamplingOptions,
) -> Vec<CurveTrace> {
    let traces: Vec<CurveTrace> = curves
        .iter()
        .filter_map(|curve| sample_curve(coords, curve, options))
        .collect();
    tracing::trace!(
        curves = traces.len(),
        points = traces.iter().map(CurveTrace::point_count).sum::<usize>(),
        "sampled curves"
    );
    traces
}
