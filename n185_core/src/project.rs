//! # Project Data Structures
//!
//! The `Project` struct is the root container for a set of flow tests, the
//! curves derived from them, and chart annotations. Projects serialize to
//! `.n185` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, name, timestamps)
//! ├── settings: ProjectSettings (graph view, chart layout)
//! ├── tests: Vec<CurveRecord> (curves in draw order)
//! └── annotations: Vec<AnnotationRecord>
//! ```
//!
//! Curves and annotations are stored as flat records so the file stays
//! readable and stable; they are converted to [`FireFlowCurve`] and
//! [`Annotation`] on the way out.
//!
//! ## Example
//!
//! ```rust
//! use n185_core::hydraulics::{CurveStyle, FireFlowCurve};
//! use n185_core::project::Project;
//!
//! let mut project = Project::new("Main St Improvements");
//! let curve = FireFlowCurve::new(65.0, 1500.0, 35.0, "H-101", CurveStyle::default())?;
//! project.add_curve(&curve)?;
//!
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("\"staticPressure\": 65.0"));
//! # Ok::<(), n185_core::errors::FlowError>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::annotations::{Annotation, AnnotationKind, FontSize, MarkerSize, Orientation, RefLineStyle};
use crate::errors::{FlowError, FlowResult};
use crate::hydraulics::curve::validate_test;
use crate::hydraulics::{Category, CurveStyle, FireFlowCurve};
use crate::plot::{Chart, ChartEvent, ChartLayout, GraphSettings};
use crate::style::{LineStyle, DEFAULT_ANNOTATION_COLOR, DEFAULT_CURVE_COLOR};

/// Current schema version for .n185 files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// File extension for project files
pub const PROJECT_EXTENSION: &str = "n185";

/// Root project container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,

    #[serde(default)]
    pub settings: ProjectSettings,

    /// Curves in draw order. Ids are unique.
    #[serde(default)]
    pub tests: Vec<CurveRecord>,

    #[serde(default)]
    pub annotations: Vec<AnnotationRecord>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// ```rust
    /// use n185_core::project::Project;
    ///
    /// let project = Project::new("Untitled Project");
    /// assert_eq!(project.meta.name, "Untitled Project");
    /// assert_eq!(project.settings.graph.max_flow, 5000.0);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                name: name.into(),
                created: now,
                modified: now,
            },
            settings: ProjectSettings::default(),
            tests: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Append a curve. Fails if a curve with the same id is already stored.
    pub fn add_curve(&mut self, curve: &FireFlowCurve) -> FlowResult<()> {
        if self.tests.iter().any(|r| r.id == curve.id()) {
            return Err(FlowError::invalid_input(
                "id",
                curve.id(),
                "A curve with this id already exists",
            ));
        }
        self.tests.push(CurveRecord::from(curve));
        self.touch();
        Ok(())
    }

    /// Append several curves, stopping at the first duplicate id.
    pub fn add_curves<'a>(&mut self, curves: impl IntoIterator<Item = &'a FireFlowCurve>) -> FlowResult<()> {
        for curve in curves {
            self.add_curve(curve)?;
        }
        Ok(())
    }

    /// Look up a curve by id.
    pub fn curve(&self, id: &str) -> FlowResult<FireFlowCurve> {
        self.tests
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| FlowError::curve_not_found(id))
            .and_then(|r| FireFlowCurve::try_from(r.clone()))
    }

    /// All curves, in draw order.
    pub fn curves(&self) -> FlowResult<Vec<FireFlowCurve>> {
        self.tests.iter().cloned().map(FireFlowCurve::try_from).collect()
    }

    /// Remove a curve by id. Curves derived from it keep their `parentId`.
    pub fn remove_curve(&mut self, id: &str) -> FlowResult<CurveRecord> {
        let index = self
            .tests
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| FlowError::curve_not_found(id))?;
        self.touch();
        Ok(self.tests.remove(index))
    }

    /// Append an annotation and return its id.
    pub fn add_annotation(&mut self, annotation: &Annotation) -> Uuid {
        self.annotations.push(AnnotationRecord::from(annotation));
        self.touch();
        annotation.id
    }

    /// Remove an annotation by id.
    pub fn remove_annotation(&mut self, id: &Uuid) -> Option<AnnotationRecord> {
        let index = self.annotations.iter().position(|a| a.id == *id)?;
        self.touch();
        Some(self.annotations.remove(index))
    }

    /// All annotations, in draw order.
    pub fn annotations(&self) -> FlowResult<Vec<Annotation>> {
        self.annotations.iter().cloned().map(Annotation::try_from).collect()
    }

    /// A chart loaded with this project's settings, curves and annotations.
    pub fn chart(&self) -> FlowResult<Chart> {
        let mut chart = Chart::new(self.settings.graph.clone(), self.settings.layout)?;
        chart.handle(ChartEvent::CurvesChanged(self.curves()?))?;
        chart.handle(ChartEvent::AnnotationsChanged(self.annotations()?))?;
        Ok(chart)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn curve_count(&self) -> usize {
        self.tests.len()
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("Untitled Project")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub name: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// View and layout settings saved with the project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub graph: GraphSettings,
    pub layout: ChartLayout,
}

/// Flat, persisted form of a [`FireFlowCurve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveRecord {
    pub id: String,
    pub static_pressure: f64,
    pub test_flow: Option<f64>,
    pub test_residual: Option<f64>,
    pub k: f64,
    #[serde(default = "default_curve_color")]
    pub color: String,
    #[serde(default)]
    pub line_style: LineStyle,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub is_derived: bool,
    #[serde(default)]
    pub parent_id: Option<String>,
}

fn default_curve_color() -> String {
    DEFAULT_CURVE_COLOR.to_string()
}

fn default_annotation_color() -> String {
    DEFAULT_ANNOTATION_COLOR.to_string()
}

fn default_visible() -> bool {
    true
}

impl From<&FireFlowCurve> for CurveRecord {
    fn from(curve: &FireFlowCurve) -> Self {
        CurveRecord {
            id: curve.id().to_string(),
            static_pressure: curve.static_pressure(),
            test_flow: curve.test_flow(),
            test_residual: curve.test_residual(),
            k: curve.k(),
            color: curve.style.color.clone(),
            line_style: curve.style.line_style,
            category: curve.style.category,
            visible: curve.style.visible,
            is_derived: curve.is_derived(),
            parent_id: curve.parent_id().map(str::to_string),
        }
    }
}

impl TryFrom<CurveRecord> for FireFlowCurve {
    type Error = FlowError;

    /// Restores the stored `k` as-is; test data is kept only when complete
    /// and must pass the same checks as a fresh flow test.
    fn try_from(record: CurveRecord) -> FlowResult<Self> {
        if !record.static_pressure.is_finite() || record.static_pressure <= 0.0 {
            return Err(FlowError::invalid_input(
                "staticPressure",
                record.static_pressure.to_string(),
                "Static must be greater than 0",
            ));
        }
        if !record.k.is_finite() {
            return Err(FlowError::invalid_input(
                "k",
                record.k.to_string(),
                "Friction coefficient must be a finite number",
            ));
        }

        let (test_flow, test_residual) = match (record.test_flow, record.test_residual) {
            (Some(flow), Some(residual)) if !record.is_derived => {
                validate_test(record.static_pressure, flow, residual)?;
                (Some(flow), Some(residual))
            }
            _ => (None, None),
        };

        Ok(FireFlowCurve::restore(
            record.id,
            record.static_pressure,
            test_flow,
            test_residual,
            record.k,
            record.is_derived,
            record.parent_id,
            CurveStyle {
                color: record.color,
                line_style: record.line_style,
                category: record.category,
                visible: record.visible,
            },
        ))
    }
}

/// Flat, persisted form of an [`Annotation`].
///
/// `style` holds the marker size, label font size or line style, depending
/// on `type`. Points and labels use `Q`/`P`; lines use `value` and
/// `orientation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_annotation_color")]
    pub color: String,
    #[serde(rename = "Q", default, skip_serializing_if = "Option::is_none")]
    pub q: Option<f64>,
    #[serde(rename = "P", default, skip_serializing_if = "Option::is_none")]
    pub p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

impl From<&Annotation> for AnnotationRecord {
    fn from(annotation: &Annotation) -> Self {
        let mut record = AnnotationRecord {
            id: annotation.id,
            kind: annotation.kind.type_name().to_string(),
            visible: annotation.visible,
            text: annotation.text.clone(),
            color: annotation.color.clone(),
            q: None,
            p: None,
            style: None,
            value: None,
            orientation: None,
        };
        match annotation.kind {
            AnnotationKind::Point { flow, pressure, size } => {
                record.q = Some(flow);
                record.p = Some(pressure);
                record.style = Some(size.as_str().to_string());
            }
            AnnotationKind::Label {
                flow,
                pressure,
                font_size,
            } => {
                record.q = Some(flow);
                record.p = Some(pressure);
                record.style = Some(font_size.as_str().to_string());
            }
            AnnotationKind::ReferenceLine {
                orientation,
                value,
                line_style,
            } => {
                record.value = Some(value);
                record.orientation = Some(orientation);
                record.style = Some(line_style.as_str().to_string());
            }
        }
        record
    }
}

fn required(field: &str, value: Option<f64>, kind: &str) -> FlowResult<f64> {
    value.ok_or_else(|| FlowError::invalid_input(field, "null", format!("A {kind} annotation needs {field}")))
}

impl TryFrom<AnnotationRecord> for Annotation {
    type Error = FlowError;

    fn try_from(record: AnnotationRecord) -> FlowResult<Self> {
        let style = record.style.as_deref().unwrap_or_default();
        let kind = match record.kind.as_str() {
            "point" => AnnotationKind::Point {
                flow: required("Q", record.q, "point")?,
                pressure: required("P", record.p, "point")?,
                size: MarkerSize::from_name(style),
            },
            "label" => AnnotationKind::Label {
                flow: required("Q", record.q, "label")?,
                pressure: required("P", record.p, "label")?,
                font_size: FontSize::from_name(style),
            },
            "line" => {
                let orientation = record.orientation.unwrap_or(Orientation::Horizontal);
                // Older records carry the position in Q or P instead of value
                let fallback = match orientation {
                    Orientation::Horizontal => record.p,
                    Orientation::Vertical => record.q,
                };
                AnnotationKind::ReferenceLine {
                    orientation,
                    value: required("value", record.value.or(fallback), "line")?,
                    line_style: RefLineStyle::from_name(style),
                }
            }
            other => {
                return Err(FlowError::invalid_input(
                    "type",
                    other,
                    "Annotation type must be point, label or line",
                ))
            }
        };

        Ok(Annotation {
            id: record.id,
            visible: record.visible,
            text: record.text,
            color: record.color,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydraulics::{FrictionChange, PipeSegment};

    fn test_curve() -> FireFlowCurve {
        FireFlowCurve::new(65.0, 1500.0, 35.0, "H-101", CurveStyle::default()).unwrap()
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("Main St");
        assert_eq!(project.meta.name, "Main St");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert_eq!(project.curve_count(), 0);
        assert_eq!(project.settings.layout.canvas_width, 1000.0);
    }

    #[test]
    fn test_project_serialization() {
        let mut project = Project::new("Main St");
        project.add_curve(&test_curve()).unwrap();
        let json = serde_json::to_string_pretty(&project).unwrap();

        assert!(json.contains("\"staticPressure\": 65.0"));
        assert!(json.contains("\"lineStyle\": \"solid\""));
        assert!(json.contains("\"parentId\": null"));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.name, "Main St");
        assert_eq!(roundtrip.tests, project.tests);
    }

    #[test]
    fn test_curve_record_roundtrip_evaluates_same() {
        let original = test_curve();
        let restored = FireFlowCurve::try_from(CurveRecord::from(&original)).unwrap();
        assert_eq!(restored, original);
        for q in [0.0, 750.0, 1500.0, 3000.0] {
            assert_eq!(restored.pressure_at_flow(q), original.pressure_at_flow(q));
        }
    }

    #[test]
    fn test_derived_record_roundtrip() {
        let pipe = PipeSegment::new(1000.0, 8.0, 130.0);
        let derived = test_curve().tilt_for_pipe(&pipe, FrictionChange::Add).unwrap();
        let record = CurveRecord::from(&derived);
        assert!(record.is_derived);
        assert_eq!(record.parent_id.as_deref(), Some("H-101"));
        assert_eq!(record.test_flow, None);

        let restored = FireFlowCurve::try_from(record).unwrap();
        assert_eq!(restored.k(), derived.k());
        assert!(restored.test_point().is_none());
    }

    #[test]
    fn test_bad_curve_record() {
        let mut record = CurveRecord::from(&test_curve());
        record.static_pressure = 0.0;
        assert!(FireFlowCurve::try_from(record.clone()).is_err());

        record.static_pressure = 65.0;
        record.k = f64::NAN;
        let err = FireFlowCurve::try_from(record).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_curve_record_with_bad_test_data() {
        let json = r#"{"id":"H-1","staticPressure":30,"testFlow":1500,"testResidual":35,"k":-0.0001}"#;
        let record: CurveRecord = serde_json::from_str(json).unwrap();
        let err = FireFlowCurve::try_from(record).unwrap_err();
        assert!(err.is_validation());

        let json = r#"{"id":"H-1","staticPressure":65,"testFlow":-5,"testResidual":35,"k":0.0001}"#;
        let record: CurveRecord = serde_json::from_str(json).unwrap();
        assert!(FireFlowCurve::try_from(record).is_err());

        // Derived records drop their test fields instead of checking them
        let json = r#"{"id":"H-1*","staticPressure":30,"testFlow":1500,"testResidual":35,"k":0.0001,"isDerived":true}"#;
        let record: CurveRecord = serde_json::from_str(json).unwrap();
        assert_eq!(FireFlowCurve::try_from(record).unwrap().test_point(), None);
    }

    #[test]
    fn test_minimal_curve_record() {
        let json = r#"{"id":"H-2","staticPressure":70,"testFlow":null,"testResidual":null,"k":0.0001}"#;
        let record: CurveRecord = serde_json::from_str(json).unwrap();
        let curve = FireFlowCurve::try_from(record).unwrap();
        assert!(curve.is_visible());
        assert_eq!(curve.style.color, DEFAULT_CURVE_COLOR);
    }

    #[test]
    fn test_add_find_remove_curves() {
        let mut project = Project::new("P");
        let curve = test_curve();
        project.add_curve(&curve).unwrap();
        assert!(project.add_curve(&curve).is_err());

        let tilted = curve.tilt(1e-6);
        project.add_curves([&tilted]).unwrap();
        assert_eq!(project.curve("H-101*").unwrap().parent_id(), Some("H-101"));
        assert_eq!(project.curves().unwrap().len(), 2);

        let err = project.curve("nope").unwrap_err();
        assert_eq!(err, FlowError::curve_not_found("nope"));

        project.remove_curve("H-101").unwrap();
        assert!(project.remove_curve("H-101").is_err());
        assert_eq!(project.curve_count(), 1);
    }

    #[test]
    fn test_annotation_records() {
        let annotations = [
            Annotation::point(2000.0, 35.0, "Design").with_color("#FF0000"),
            Annotation::label(500.0, 80.0, "Note"),
            Annotation::vertical_line(1500.0, "NFF"),
        ];
        let mut project = Project::new("P");
        for a in &annotations {
            project.add_annotation(a);
        }

        let json = serde_json::to_string(&project.annotations).unwrap();
        assert!(json.contains("\"type\":\"point\""));
        assert!(json.contains("\"Q\":2000.0"));
        assert!(json.contains("\"orientation\":\"vertical\""));

        let restored = project.annotations().unwrap();
        assert_eq!(restored.as_slice(), &annotations);

        assert!(project.remove_annotation(&annotations[1].id).is_some());
        assert!(project.remove_annotation(&annotations[1].id).is_none());
    }

    #[test]
    fn test_legacy_line_record() {
        let json = format!(
            r#"{{"id":"{}","type":"line","text":"20 PSI","P":20,"style":"dashed"}}"#,
            Uuid::new_v4()
        );
        let record: AnnotationRecord = serde_json::from_str(&json).unwrap();
        let annotation = Annotation::try_from(record).unwrap();
        assert_eq!(
            annotation.kind,
            AnnotationKind::ReferenceLine {
                orientation: Orientation::Horizontal,
                value: 20.0,
                line_style: RefLineStyle::Dashed,
            }
        );
    }

    #[test]
    fn test_bad_annotation_records() {
        let point = format!(r#"{{"id":"{}","type":"point","Q":100}}"#, Uuid::new_v4());
        let record: AnnotationRecord = serde_json::from_str(&point).unwrap();
        assert!(Annotation::try_from(record).unwrap_err().is_validation());

        let arrow = format!(r#"{{"id":"{}","type":"arrow"}}"#, Uuid::new_v4());
        let record: AnnotationRecord = serde_json::from_str(&arrow).unwrap();
        assert!(Annotation::try_from(record).is_err());
    }

    #[test]
    fn test_project_chart() {
        let mut project = Project::new("P");
        project.add_curve(&test_curve()).unwrap();
        project.add_annotation(&Annotation::horizontal_line(20.0, "20 PSI"));

        let chart = project.chart().unwrap();
        assert_eq!(chart.curves().len(), 1);
        let scene = chart.render().unwrap();
        assert_eq!(scene.polylines().count(), 1);
        assert!(scene.texts().any(|t| t.text == "20 PSI"));
    }
}
