//! # Annotations
//!
//! Cosmetic drawing directives anchored in data space: point markers, text
//! labels, and horizontal/vertical reference lines. Each kind carries only the
//! fields it uses.
//!
//! ## Example
//!
//! ```rust
//! use n185_core::annotations::{Annotation, AnnotationKind};
//!
//! let design = Annotation::point(2000.0, 35.0, "Design Point").with_color("#FF0000");
//! let minimum = Annotation::horizontal_line(20.0, "20 PSI minimum");
//!
//! assert!(matches!(design.kind, AnnotationKind::Point { .. }));
//! assert!(minimum.visible);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::style::DEFAULT_ANNOTATION_COLOR;

/// Point marker size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl MarkerSize {
    /// Marker radius in pixels
    pub fn radius(self) -> f64 {
        match self {
            MarkerSize::Small => 8.0,
            MarkerSize::Medium => 12.0,
            MarkerSize::Large => 16.0,
        }
    }
}

/// Label font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    /// Font size in pixels
    pub fn px(self) -> f64 {
        match self {
            FontSize::Small => 11.0,
            FontSize::Medium => 13.0,
            FontSize::Large => 16.0,
        }
    }
}

/// Shared spelling for the small/medium/large presets.
pub(crate) fn size_name(index: u8) -> &'static str {
    match index {
        0 => "small",
        2 => "large",
        _ => "medium",
    }
}

impl MarkerSize {
    pub fn as_str(self) -> &'static str {
        size_name(self as u8)
    }

    /// Unknown names fall back to medium.
    pub fn from_name(name: &str) -> Self {
        match name {
            "small" => MarkerSize::Small,
            "large" => MarkerSize::Large,
            _ => MarkerSize::Medium,
        }
    }
}

impl FontSize {
    pub fn as_str(self) -> &'static str {
        size_name(self as u8)
    }

    /// Unknown names fall back to medium.
    pub fn from_name(name: &str) -> Self {
        match name {
            "small" => FontSize::Small,
            "large" => FontSize::Large,
            _ => FontSize::Medium,
        }
    }
}

/// Direction of a reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Constant pressure, spans the full plot width
    Horizontal,
    /// Constant flow, spans the full plot height
    Vertical,
}

/// Stroke of a reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefLineStyle {
    #[default]
    Solid,
    Dashed,
}

impl RefLineStyle {
    pub fn dash_pattern(self) -> &'static [f64] {
        match self {
            RefLineStyle::Solid => &[],
            RefLineStyle::Dashed => &[8.0, 4.0],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RefLineStyle::Solid => "solid",
            RefLineStyle::Dashed => "dashed",
        }
    }

    pub fn from_name(name: &str) -> Self {
        if name == "dashed" {
            RefLineStyle::Dashed
        } else {
            RefLineStyle::Solid
        }
    }
}

/// What an annotation draws and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnnotationKind {
    /// Filled circle at `(flow, pressure)` with optional text to its right
    Point {
        flow: f64,
        pressure: f64,
        size: MarkerSize,
    },
    /// Free text anchored at `(flow, pressure)`
    Label {
        flow: f64,
        pressure: f64,
        font_size: FontSize,
    },
    /// Line at a fixed pressure (horizontal) or flow (vertical)
    ReferenceLine {
        orientation: Orientation,
        value: f64,
        line_style: RefLineStyle,
    },
}

impl AnnotationKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            AnnotationKind::Point { .. } => "point",
            AnnotationKind::Label { .. } => "label",
            AnnotationKind::ReferenceLine { .. } => "line",
        }
    }
}

/// A single annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: Uuid,
    pub visible: bool,
    pub text: String,
    pub color: String,
    pub kind: AnnotationKind,
}

impl Annotation {
    pub fn new(kind: AnnotationKind, text: impl Into<String>) -> Self {
        Annotation {
            id: Uuid::new_v4(),
            visible: true,
            text: text.into(),
            color: DEFAULT_ANNOTATION_COLOR.to_string(),
            kind,
        }
    }

    /// Medium point marker.
    pub fn point(flow: f64, pressure: f64, text: impl Into<String>) -> Self {
        Self::new(
            AnnotationKind::Point {
                flow,
                pressure,
                size: MarkerSize::Medium,
            },
            text,
        )
    }

    /// Medium text label.
    pub fn label(flow: f64, pressure: f64, text: impl Into<String>) -> Self {
        Self::new(
            AnnotationKind::Label {
                flow,
                pressure,
                font_size: FontSize::Medium,
            },
            text,
        )
    }

    /// Solid line at a constant pressure.
    pub fn horizontal_line(pressure: f64, text: impl Into<String>) -> Self {
        Self::new(
            AnnotationKind::ReferenceLine {
                orientation: Orientation::Horizontal,
                value: pressure,
                line_style: RefLineStyle::Solid,
            },
            text,
        )
    }

    /// Solid line at a constant flow.
    pub fn vertical_line(flow: f64, text: impl Into<String>) -> Self {
        Self::new(
            AnnotationKind::ReferenceLine {
                orientation: Orientation::Vertical,
                value: flow,
                line_style: RefLineStyle::Solid,
            },
            text,
        )
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(MarkerSize::Small.radius(), 8.0);
        assert_eq!(MarkerSize::default().radius(), 12.0);
        assert_eq!(FontSize::Large.px(), 16.0);
        assert_eq!(MarkerSize::from_name("large"), MarkerSize::Large);
        assert_eq!(FontSize::from_name("huge"), FontSize::Medium);
        assert_eq!(FontSize::Small.as_str(), "small");
        assert_eq!(MarkerSize::Large.as_str(), "large");
    }

    #[test]
    fn test_constructors() {
        let point = Annotation::point(2000.0, 35.0, "Design");
        assert_eq!(point.kind.type_name(), "point");
        assert_eq!(point.color, "#000000");

        let line = Annotation::vertical_line(1500.0, "NFF").with_color("#00AA00");
        match line.kind {
            AnnotationKind::ReferenceLine {
                orientation, value, ..
            } => {
                assert_eq!(orientation, Orientation::Vertical);
                assert_eq!(value, 1500.0);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
        assert_eq!(line.color, "#00AA00");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Annotation::label(1.0, 1.0, "a");
        let b = Annotation::label(1.0, 1.0, "a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_ref_line_style() {
        assert_eq!(RefLineStyle::Dashed.dash_pattern(), &[8.0, 4.0]);
        assert_eq!(RefLineStyle::from_name("dotted"), RefLineStyle::Solid);
    }
}
