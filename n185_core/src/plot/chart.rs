//! # Chart Model
//!
//! Owns the coordinate system plus the curves and annotations currently on
//! the chart. Collaborators push [`ChartEvent`]s; every accepted event yields
//! a fresh full [`ChartScene`]. Events are applied through `&mut self`, so a
//! resize never interleaves with a redraw.
//!
//! ## Example
//!
//! ```rust
//! use n185_core::hydraulics::{CurveStyle, FireFlowCurve};
//! use n185_core::plot::{Chart, ChartEvent, ChartLayout, GraphSettings};
//!
//! let mut chart = Chart::new(GraphSettings::default(), ChartLayout::default())?;
//! let curve = FireFlowCurve::new(65.0, 1500.0, 35.0, "H-101", CurveStyle::default())?;
//!
//! let scene = chart.handle(ChartEvent::CurvesChanged(vec![curve]))?;
//! assert!(scene.is_some());
//! # Ok::<(), n185_core::errors::FlowError>(())
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::annotations::Annotation;
use crate::errors::FlowResult;
use crate::hydraulics::FireFlowCurve;

use super::coords::{GraphSettings, Margins, PlotCoordinateSystem};
use super::sampling::SamplingOptions;
use super::scene::{build_scene, ChartScene};

/// Canvas size, margins and sampling for a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayout {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub margins: Margins,
    pub sampling: SamplingOptions,
}

impl Default for ChartLayout {
    fn default() -> Self {
        ChartLayout {
            canvas_width: 1000.0,
            canvas_height: 650.0,
            margins: Margins::default(),
            sampling: SamplingOptions::default(),
        }
    }
}

/// A change pushed to the chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// Full replacement of the plotted curves, in draw order
    CurvesChanged(Vec<FireFlowCurve>),
    /// Full replacement of the annotations, in draw order
    AnnotationsChanged(Vec<Annotation>),
    /// New view parameters, applied all at once
    ViewChanged(GraphSettings),
    /// New canvas size in px
    Resized { width: f64, height: f64 },
}

#[derive(Debug, Clone)]
pub struct Chart {
    coords: PlotCoordinateSystem,
    sampling: SamplingOptions,
    curves: Vec<FireFlowCurve>,
    annotations: Vec<Annotation>,
    date: Option<NaiveDate>,
}

impl Chart {
    /// A chart sized to `layout`. Fails if the settings are invalid.
    pub fn new(settings: GraphSettings, layout: ChartLayout) -> FlowResult<Self> {
        settings.validate()?;
        let mut coords = PlotCoordinateSystem::new(settings, layout.margins);
        if !coords.resize(layout.canvas_width, layout.canvas_height) {
            tracing::warn!(
                width = layout.canvas_width,
                height = layout.canvas_height,
                "canvas too small for the plot margins; waiting for a resize"
            );
        }
        Ok(Chart {
            coords,
            sampling: layout.sampling,
            curves: Vec::new(),
            annotations: Vec::new(),
            date: None,
        })
    }

    /// Pin the printed date instead of using today's.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Apply an event and redraw.
    ///
    /// Returns `Ok(None)` while the chart has no usable size yet. A rejected
    /// view change leaves the chart as it was.
    pub fn handle(&mut self, event: ChartEvent) -> FlowResult<Option<ChartScene>> {
        match event {
            ChartEvent::CurvesChanged(curves) => {
                tracing::debug!(count = curves.len(), "curves changed");
                self.curves = curves;
            }
            ChartEvent::AnnotationsChanged(annotations) => {
                tracing::debug!(count = annotations.len(), "annotations changed");
                self.annotations = annotations;
            }
            ChartEvent::ViewChanged(settings) => {
                self.coords.update(settings)?;
            }
            ChartEvent::Resized { width, height } => {
                self.coords.resize(width, height);
            }
        }
        Ok(self.render())
    }

    /// Full redraw of the current state, or `None` before a usable resize.
    pub fn render(&self) -> Option<ChartScene> {
        if !self.coords.is_ready() {
            return None;
        }
        let date = if self.coords.settings().show_date {
            Some(self.date.unwrap_or_else(|| chrono::Local::now().date_naive()))
        } else {
            None
        };
        Some(build_scene(
            &self.coords,
            &self.curves,
            &self.annotations,
            &self.sampling,
            date,
        ))
    }

    /// Flow and pressure under the pointer, for hover read-outs.
    pub fn hover(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.coords.pointer_to_data(x, y)
    }

    pub fn coords(&self) -> &PlotCoordinateSystem {
        &self.coords
    }

    pub fn curves(&self) -> &[FireFlowCurve] {
        &self.curves
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}
