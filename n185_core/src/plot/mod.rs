//! # Plotting
//!
//! Everything between hydraulic curves and pixels. Nothing here draws; the
//! output is a [`ChartScene`] that any backend can render.
//!
//! - [`coords`] - the `Q^1.85` / linear coordinate system and hit-testing
//! - [`axes`] - grid lines and tick marks
//! - [`sampling`] - curve polylines with out-of-range breaks
//! - [`placement`] - annotation geometry
//! - [`scene`] - the ordered draw list
//! - [`chart`] - event-driven chart model

pub mod axes;
pub mod chart;
pub mod coords;
pub mod placement;
pub mod sampling;
pub mod scene;

pub use axes::{flow_ticks, grid_lines, pressure_ticks, Axis, GridLine, Tick, TickLength};
pub use chart::{Chart, ChartEvent, ChartLayout};
pub use coords::{GraphSettings, Margins, PlotCoordinateSystem, PlotRect, ScreenPoint};
pub use placement::{place_annotation, place_annotations, PlacedAnnotation, PlacedShape};
pub use sampling::{sample_curve, sample_curves, CurveTrace, SamplingOptions, TestMarker};
pub use scene::{build_scene, ChartScene, SceneItem};
