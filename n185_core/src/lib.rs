//! # n185_core - Fire-Flow Curve Engine
//!
//! `n185_core` models water-supply curves from hydrant flow tests (NFPA 291)
//! and lays them out on the classic `N^1.85` graph paper, where every supply
//! curve is a straight line. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Effect-free**: Curves are immutable; modelling returns new curves
//! - **JSON-First**: Records, summaries and chart scenes implement Serialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Backend-neutral plotting**: The chart produces a draw list, not pixels
//!
//! ## Quick Start
//!
//! ```rust
//! use n185_core::hydraulics::{CurveStyle, FireFlowCurve, PipeSegment, FrictionChange};
//!
//! let test = FireFlowCurve::new(65.0, 1500.0, 35.0, "H-101", CurveStyle::default())?;
//! println!("AFF @ 20 PSI: {:.0} GPM", test.available_fire_flow(20.0));
//!
//! // 800 ft of 8" main between the test hydrant and the site
//! let site = test.tilt_for_pipe(&PipeSegment::new(800.0, 8.0, 130.0), FrictionChange::Add)?;
//! assert!(site.available_fire_flow(20.0) < test.available_fire_flow(20.0));
//! # Ok::<(), n185_core::errors::FlowError>(())
//! ```
//!
//! ## Modules
//!
//! - [`hydraulics`] - Supply curves, pipe friction, summaries
//! - [`plot`] - Coordinate system, axes, sampling, chart scene
//! - [`annotations`] - Points, labels and reference lines
//! - [`project`] - Project container and persisted records
//! - [`file_io`] - Atomic saves and versioned loads
//! - [`units`] - Type-safe unit wrappers and number formatting
//! - [`style`] - Colors and line styles
//! - [`errors`] - Structured error types

pub mod annotations;
pub mod errors;
pub mod file_io;
pub mod hydraulics;
pub mod plot;
pub mod project;
pub mod style;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use annotations::{Annotation, AnnotationKind};
pub use errors::{FlowError, FlowResult};
pub use file_io::{load_project, save_project};
pub use hydraulics::{CurveStyle, FireFlowCurve};
pub use plot::{Chart, ChartEvent, ChartScene, GraphSettings, PlotCoordinateSystem};
pub use project::{Project, ProjectMetadata, ProjectSettings};
