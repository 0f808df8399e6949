//! # Annotation Placement
//!
//! Resolves annotations to screen geometry through the forward transforms.
//! Anything that lands outside the plot rectangle is dropped whole; nothing
//! is clamped to the edge.

use uuid::Uuid;

use crate::annotations::{Annotation, AnnotationKind, Orientation};

use super::coords::{PlotCoordinateSystem, ScreenPoint};

/// Gap between a point marker and its text (px)
pub const MARKER_TEXT_GAP: f64 = 4.0;

/// Offset of label text from its anchor (px, right and up)
pub const LABEL_OFFSET: f64 = 2.0;

/// Screen geometry for one annotation kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacedShape {
    Marker {
        center: ScreenPoint,
        radius: f64,
        /// Left edge of the marker text, vertically centered
        text_anchor: ScreenPoint,
    },
    Label {
        /// Bottom-left corner of the text
        text_anchor: ScreenPoint,
        font_px: f64,
    },
    Line {
        orientation: Orientation,
        from: ScreenPoint,
        to: ScreenPoint,
        dash: Vec<f64>,
        /// Horizontal: bottom-right of the text. Vertical: start of the
        /// text running down the line.
        text_anchor: ScreenPoint,
    },
}

/// An annotation that survived placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAnnotation {
    pub id: Uuid,
    pub color: String,
    /// `None` when the annotation has no text
    pub text: Option<String>,
    pub shape: PlacedShape,
}

/// Place one annotation, or `None` if hidden or off the plot.
pub fn place_annotation(coords: &PlotCoordinateSystem, annotation: &Annotation) -> Option<PlacedAnnotation> {
    if !annotation.visible {
        return None;
    }
    let rect = *coords.plot_rect();

    let shape = match annotation.kind {
        AnnotationKind::Point { flow, pressure, size } => {
            let center = coords.forward(flow, pressure);
            if !rect.contains(center.x, center.y) {
                return None;
            }
            let radius = size.radius();
            PlacedShape::Marker {
                center,
                radius,
                text_anchor: ScreenPoint::new(center.x + radius + MARKER_TEXT_GAP, center.y),
            }
        }
        AnnotationKind::Label {
            flow,
            pressure,
            font_size,
        } => {
            let anchor = coords.forward(flow, pressure);
            if !rect.contains(anchor.x, anchor.y) {
                return None;
            }
            PlacedShape::Label {
                text_anchor: ScreenPoint::new(anchor.x + LABEL_OFFSET, anchor.y - LABEL_OFFSET),
                font_px: font_size.px(),
            }
        }
        AnnotationKind::ReferenceLine {
            orientation: Orientation::Horizontal,
            value,
            line_style,
        } => {
            let y = coords.forward_pressure(value);
            if !rect.contains_y(y) {
                return None;
            }
            PlacedShape::Line {
                orientation: Orientation::Horizontal,
                from: ScreenPoint::new(rect.left, y),
                to: ScreenPoint::new(rect.right(), y),
                dash: line_style.dash_pattern().to_vec(),
                text_anchor: ScreenPoint::new(rect.right() - 5.0, y - 3.0),
            }
        }
        AnnotationKind::ReferenceLine {
            orientation: Orientation::Vertical,
            value,
            line_style,
        } => {
            let x = coords.forward_flow(value);
            if !rect.contains_x(x) {
                return None;
            }
            PlacedShape::Line {
                orientation: Orientation::Vertical,
                from: ScreenPoint::new(x, rect.top),
                to: ScreenPoint::new(x, rect.bottom()),
                dash: line_style.dash_pattern().to_vec(),
                text_anchor: ScreenPoint::new(x + 3.0, rect.top + 5.0),
            }
        }
    };

    let text = Some(annotation.text.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Some(PlacedAnnotation {
        id: annotation.id,
        color: annotation.color.clone(),
        text,
        shape,
    })
}

/// Place every annotation, in order, dropping those that do not fit.
pub fn place_annotations(coords: &PlotCoordinateSystem, annotations: &[Annotation]) -> Vec<PlacedAnnotation> {
    let placed: Vec<_> = annotations
        .iter()
        .filter_map(|a| place_annotation(coords, a))
        .collect();
    if placed.len() < annotations.len() {
        tracing::debug!(
            total = annotations.len(),
            placed = placed.len(),
            "skipped hidden or off-plot annotations"
        );
    }
    placed
}
