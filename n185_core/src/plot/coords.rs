//! # Plot Coordinate System
//!
//! Maps data space (flow in GPM, pressure in PSI) onto a pixel rectangle.
//! The flow axis is scaled by `Q^1.85` so every supply curve plots as a
//! straight line; the pressure axis is linear and inverted (up is higher).
//!
//! ```text
//! x = left + (Q^1.85 / maxFlow^1.85) * width
//! y = top + height - (P / maxPressure) * height
//! ```
//!
//! A system starts *uninitialized* and becomes *ready* on the first
//! [`PlotCoordinateSystem::resize`] with a non-degenerate rectangle. Using a
//! transform before that is a programming error and panics.
//!
//! ## Example
//!
//! ```rust
//! use n185_core::plot::{GraphSettings, Margins, PlotCoordinateSystem};
//!
//! let mut coords = PlotCoordinateSystem::new(GraphSettings::default(), Margins::default());
//! coords.resize(1000.0, 650.0);
//!
//! let x = coords.forward_flow(2500.0);
//! assert!((coords.inverse_flow(x) - 2500.0).abs() < 1e-9);
//! assert_eq!(coords.pointer_to_data(0.0, 0.0), None);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{FlowError, FlowResult};
use crate::hydraulics::FLOW_EXPONENT;

/// Default right edge of the flow axis (GPM)
pub const DEFAULT_MAX_FLOW: f64 = 5000.0;

/// Default top of the pressure axis (PSI)
pub const DEFAULT_MAX_PRESSURE: f64 = 100.0;

/// Highest accepted pressure axis maximum (PSI); the axis gets a tick per PSI.
pub const MAX_PRESSURE_LIMIT: f64 = 1000.0;

/// Space reserved around the plot for ticks, labels and the title.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            top: 60.0,
            right: 30.0,
            bottom: 60.0,
            left: 60.0,
        }
    }
}

/// A point in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        ScreenPoint { x, y }
    }
}

/// The plot area inside the margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Inclusive of the edges.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.left && x <= self.right()
    }

    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.top && y <= self.bottom()
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// User-facing view parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Right edge of the flow axis (GPM)
    pub max_flow: f64,
    /// Top of the pressure axis (PSI)
    pub max_pressure: f64,
    pub title: String,
    pub show_date: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        GraphSettings {
            max_flow: DEFAULT_MAX_FLOW,
            max_pressure: DEFAULT_MAX_PRESSURE,
            title: String::new(),
            show_date: false,
        }
    }
}

impl GraphSettings {
    pub fn validate(&self) -> FlowResult<()> {
        if !self.max_flow.is_finite() || self.max_flow <= 0.0 {
            return Err(FlowError::invalid_input(
                "max_flow",
                self.max_flow.to_string(),
                "Maximum flow must be positive",
            ));
        }
        if !self.max_pressure.is_finite() || self.max_pressure <= 0.0 {
            return Err(FlowError::invalid_input(
                "max_pressure",
                self.max_pressure.to_string(),
                "Maximum pressure must be positive",
            ));
        }
        if self.max_pressure > MAX_PRESSURE_LIMIT {
            return Err(FlowError::invalid_input(
                "max_pressure",
                self.max_pressure.to_string(),
                format!("Maximum pressure must be at most {MAX_PRESSURE_LIMIT} PSI"),
            ));
        }
        Ok(())
    }
}

/// Owned view state: settings, margins and (once sized) the plot rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotCoordinateSystem {
    settings: GraphSettings,
    margins: Margins,
    canvas: Option<(f64, f64)>,
    rect: Option<PlotRect>,
}

impl PlotCoordinateSystem {
    /// An uninitialized system. Call [`resize`](Self::resize) before mapping.
    pub fn new(settings: GraphSettings, margins: Margins) -> Self {
        PlotCoordinateSystem {
            settings,
            margins,
            canvas: None,
            rect: None,
        }
    }

    /// Recompute the plot rectangle for a canvas of `width` x `height` px.
    ///
    /// Returns whether the system is ready afterwards. A canvas too small to
    /// hold a plot inside the margins is ignored: an uninitialized system
    /// stays uninitialized and a ready one keeps its previous rectangle.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let rect = PlotRect {
            left: self.margins.left,
            top: self.margins.top,
            width: width - self.margins.left - self.margins.right,
            height: height - self.margins.top - self.margins.bottom,
        };

        if rect.width > 0.0 && rect.height > 0.0 {
            self.canvas = Some((width, height));
            self.rect = Some(rect);
            tracing::debug!(width, height, plot_width = rect.width, plot_height = rect.height, "plot resized");
        } else {
            tracing::debug!(width, height, "ignoring degenerate canvas size");
        }
        self.is_ready()
    }

    /// Replace the view parameters in one step.
    ///
    /// Invalid settings leave the current ones untouched.
    pub fn update(&mut self, settings: GraphSettings) -> FlowResult<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.rect.is_some()
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    pub fn margins(&self) -> &Margins {
        &self.margins
    }

    pub fn max_flow(&self) -> f64 {
        self.settings.max_flow
    }

    pub fn max_pressure(&self) -> f64 {
        self.settings.max_pressure
    }

    /// Canvas size from the last successful resize.
    pub fn canvas_size(&self) -> Option<(f64, f64)> {
        self.canvas
    }

    /// The plot rectangle, if ready.
    pub fn rect(&self) -> Option<&PlotRect> {
        self.rect.as_ref()
    }

    /// The plot rectangle of a ready system.
    ///
    /// # Panics
    ///
    /// Panics if the system has never been given a usable size.
    pub fn plot_rect(&self) -> &PlotRect {
        match &self.rect {
            Some(rect) => rect,
            None => panic!("plot coordinate system used before a non-degenerate resize"),
        }
    }

    /// Flow (GPM) to x pixel.
    pub fn forward_flow(&self, flow: f64) -> f64 {
        let rect = self.plot_rect();
        let ratio = flow.powf(FLOW_EXPONENT) / self.settings.max_flow.powf(FLOW_EXPONENT);
        rect.left + ratio * rect.width
    }

    /// x pixel to flow (GPM). Non-finite left of the plot.
    pub fn inverse_flow(&self, x: f64) -> f64 {
        let rect = self.plot_rect();
        let ratio = (x - rect.left) / rect.width;
        (ratio * self.settings.max_flow.powf(FLOW_EXPONENT)).powf(1.0 / FLOW_EXPONENT)
    }

    /// Pressure (PSI) to y pixel.
    pub fn forward_pressure(&self, pressure: f64) -> f64 {
        let rect = self.plot_rect();
        rect.top + rect.height - (pressure / self.settings.max_pressure) * rect.height
    }

    /// y pixel to pressure (PSI).
    pub fn inverse_pressure(&self, y: f64) -> f64 {
        let rect = self.plot_rect();
        (rect.top + rect.height - y) / rect.height * self.settings.max_pressure
    }

    pub fn forward(&self, flow: f64, pressure: f64) -> ScreenPoint {
        ScreenPoint::new(self.forward_flow(flow), self.forward_pressure(pressure))
    }

    /// Data under the pointer, or `None` outside the plot rectangle.
    pub fn pointer_to_data(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rect = self.rect.as_ref()?;
        if !rect.contains(x, y) {
            return None;
        }
        Some((self.inverse_flow(x), self.inverse_pressure(y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> PlotCoordinateSystem {
        let mut coords = PlotCoordinateSystem::new(GraphSettings::default(), Margins::default());
        assert!(coords.resize(1000.0, 650.0));
        coords
    }

    #[test]
    fn test_rect_from_margins() {
        let coords = ready();
        let rect = coords.plot_rect();
        assert_eq!(rect.left, 60.0);
        assert_eq!(rect.top, 60.0);
        assert_eq!(rect.width, 910.0);
        assert_eq!(rect.height, 530.0);
        assert_eq!(rect.right(), 970.0);
        assert_eq!(rect.bottom(), 590.0);
    }

    #[test]
    fn test_axis_endpoints() {
        let coords = ready();
        assert_eq!(coords.forward_flow(0.0), 60.0);
        assert!((coords.forward_flow(5000.0) - 970.0).abs() < 1e-9);
        assert_eq!(coords.forward_pressure(0.0), 590.0);
        assert_eq!(coords.forward_pressure(100.0), 60.0);
    }

    #[test]
    fn test_flow_axis_is_power_scaled() {
        let coords = ready();
        // Half the flow sits well left of the midpoint
        let half = coords.forward_flow(2500.0);
        let expected = 60.0 + 0.5f64.powf(1.85) * 910.0;
        assert!((half - expected).abs() < 1e-9);
        assert!(half < coords.plot_rect().center().x);
    }

    #[test]
    fn test_state_machine() {
        let mut coords = PlotCoordinateSystem::new(GraphSettings::default(), Margins::default());
        assert!(!coords.is_ready());
        assert!(!coords.resize(80.0, 650.0));
        assert!(!coords.is_ready());
        assert!(coords.resize(1000.0, 650.0));

        // Ready stays ready; a degenerate size keeps the last rectangle
        assert!(coords.resize(0.0, 0.0));
        assert_eq!(coords.plot_rect().width, 910.0);
        assert_eq!(coords.canvas_size(), Some((1000.0, 650.0)));
    }

    #[test]
    #[should_panic(expected = "before a non-degenerate resize")]
    fn test_transform_before_ready_panics() {
        let coords = PlotCoordinateSystem::new(GraphSettings::default(), Margins::default());
        coords.forward_flow(100.0);
    }

    #[test]
    fn test_pointer_to_data() {
        let coords = ready();
        assert_eq!(coords.pointer_to_data(10.0, 300.0), None);
        assert_eq!(coords.pointer_to_data(500.0, 600.0), None);

        let (q, p) = coords.pointer_to_data(970.0, 60.0).unwrap();
        assert!((q - 5000.0).abs() < 1e-6);
        assert!((p - 100.0).abs() < 1e-9);

        let uninit = PlotCoordinateSystem::new(GraphSettings::default(), Margins::default());
        assert_eq!(uninit.pointer_to_data(500.0, 300.0), None);
    }

    #[test]
    fn test_update_replaces_settings() {
        let mut coords = ready();
        let before = coords.forward_flow(2500.0);
        coords
            .update(GraphSettings {
                max_flow: 2500.0,
                max_pressure: 150.0,
                title: "Main St".to_string(),
                show_date: true,
            })
            .unwrap();
        assert!((coords.forward_flow(2500.0) - 970.0).abs() < 1e-9);
        assert!(coords.forward_flow(2500.0) > before);
        assert_eq!(coords.forward_pressure(150.0), 60.0);
        assert_eq!(coords.settings().title, "Main St");
    }

    #[test]
    fn test_invalid_update_keeps_settings() {
        let mut coords = ready();
        let err = coords
            .update(GraphSettings {
                max_flow: 0.0,
                ..GraphSettings::default()
            })
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(coords.max_flow(), DEFAULT_MAX_FLOW);

        let bad_pressure = GraphSettings {
            max_pressure: f64::NAN,
            ..GraphSettings::default()
        };
        assert!(coords.update(bad_pressure).is_err());
    }

    #[test]
    fn test_max_pressure_limit() {
        let at_limit = GraphSettings {
            max_pressure: MAX_PRESSURE_LIMIT,
            ..GraphSettings::default()
        };
        assert!(at_limit.validate().is_ok());

        let mut coords = ready();
        let err = coords
            .update(GraphSettings {
                max_pressure: 1e10,
                ..GraphSettings::default()
            })
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(coords.max_pressure(), DEFAULT_MAX_PRESSURE);
    }

    #[test]
    fn test_settings_json_defaults() {
        let settings: GraphSettings = serde_json::from_str(r#"{"max_flow": 3000}"#).unwrap();
        assert_eq!(settings.max_flow, 3000.0);
        assert_eq!(settings.max_pressure, DEFAULT_MAX_PRESSURE);
        assert!(!settings.show_date);
    }
}
