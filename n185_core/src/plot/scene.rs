//! # Chart Scene
//!
//! A complete, backend-neutral description of one redraw: an ordered list of
//! primitives in canvas pixels. Renderers walk the list front to back; later
//! items paint over earlier ones.
//!
//! Layer order: plot background, grid, ticks and tick labels, axis titles,
//! curves with their test markers, annotations, title and date, plot border.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::annotations::{Annotation, Orientation};
use crate::hydraulics::FireFlowCurve;

use super::axes::{flow_ticks, grid_lines, pressure_ticks, Axis, Tick};
use super::coords::{PlotCoordinateSystem, PlotRect, ScreenPoint};
use super::placement::{place_annotations, PlacedAnnotation, PlacedShape};
use super::sampling::{sample_curves, CurveTrace, SamplingOptions};

pub const FLOW_AXIS_TITLE: &str = "Flow (GPM)";
pub const PRESSURE_AXIS_TITLE: &str = "Head (PSI)";

const BLACK: &str = "#000000";
const WHITE: &str = "#FFFFFF";
const GRID_COLOR: &str = "#C0C0C0";

const CURVE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    Serif,
    SansSerif,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// Text direction, measured from the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRotation {
    #[default]
    None,
    /// Reads top to bottom
    Clockwise,
    /// Reads bottom to top
    CounterClockwise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub text: String,
    pub anchor: ScreenPoint,
    pub font_px: f64,
    pub family: FontFamily,
    pub bold: bool,
    pub color: String,
    pub h_align: HAlign,
    pub v_align: VAlign,
    #[serde(default)]
    pub rotation: TextRotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub from: ScreenPoint,
    pub to: ScreenPoint,
    pub color: String,
    pub width: f64,
    /// On/off lengths in px; empty is solid
    pub dash: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineItem {
    pub points: Vec<ScreenPoint>,
    pub color: String,
    pub width: f64,
    pub dash: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleItem {
    pub center: ScreenPoint,
    pub radius: f64,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectItem {
    pub rect: PlotRect,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneItem {
    Rect(RectItem),
    Line(LineItem),
    Polyline(PolylineItem),
    Circle(CircleItem),
    Text(TextItem),
}

/// Everything needed to draw the chart once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartScene {
    pub width: f64,
    pub height: f64,
    pub items: Vec<SceneItem>,
}

impl ChartScene {
    pub fn texts(&self) -> impl Iterator<Item = &TextItem> {
        self.items.iter().filter_map(|item| match item {
            SceneItem::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn polylines(&self) -> impl Iterator<Item = &PolylineItem> {
        self.items.iter().filter_map(|item| match item {
            SceneItem::Polyline(line) => Some(line),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = &CircleItem> {
        self.items.iter().filter_map(|item| match item {
            SceneItem::Circle(circle) => Some(circle),
            _ => None,
        })
    }
}

fn text(
    content: impl Into<String>,
    anchor: ScreenPoint,
    font_px: f64,
    family: FontFamily,
    h_align: HAlign,
    v_align: VAlign,
) -> TextItem {
    TextItem {
        text: content.into(),
        anchor,
        font_px,
        family,
        bold: false,
        color: BLACK.to_string(),
        h_align,
        v_align,
        rotation: TextRotation::None,
    }
}

fn line(from: ScreenPoint, to: ScreenPoint, color: &str, width: f64) -> SceneItem {
    SceneItem::Line(LineItem {
        from,
        to,
        color: color.to_string(),
        width,
        dash: Vec::new(),
    })
}

/// Build the scene for a ready coordinate system.
///
/// `date` is printed top right when the settings ask for it.
///
/// # Panics
///
/// Panics if `coords` has not been sized.
pub fn build_scene(
    coords: &PlotCoordinateSystem,
    curves: &[FireFlowCurve],
    annotations: &[Annotation],
    sampling: &SamplingOptions,
    date: Option<NaiveDate>,
) -> ChartScene {
    let rect = *coords.plot_rect();
    let margins = *coords.margins();
    let (width, height) = coords
        .canvas_size()
        .unwrap_or((rect.right() + margins.right, rect.bottom() + margins.bottom));

    let mut items = Vec::new();

    items.push(SceneItem::Rect(RectItem {
        rect,
        fill: Some(WHITE.to_string()),
        stroke: None,
        stroke_width: 0.0,
    }));

    items.extend(
        grid_lines(coords)
            .into_iter()
            .map(|g| line(g.from, g.to, GRID_COLOR, 0.5)),
    );

    push_ticks(&mut items, &rect, &flow_ticks(coords));
    push_ticks(&mut items, &rect, &pressure_ticks(coords));
    push_axis_titles(&mut items, &rect, height);

    for trace in sample_curves(coords, curves, sampling) {
        push_trace(&mut items, trace);
    }

    for placed in place_annotations(coords, annotations) {
        push_annotation(&mut items, placed);
    }

    let settings = coords.settings();
    if !settings.title.is_empty() {
        let mut title = text(
            settings.title.clone(),
            ScreenPoint::new(width / 2.0, 10.0),
            16.0,
            FontFamily::Serif,
            HAlign::Center,
            VAlign::Top,
        );
        title.bold = true;
        items.push(SceneItem::Text(title));
    }
    if settings.show_date {
        if let Some(date) = date {
            items.push(SceneItem::Text(text(
                date.format("%-m/%-d/%Y").to_string(),
                ScreenPoint::new(width - 10.0, 10.0),
                11.0,
                FontFamily::Serif,
                HAlign::Right,
                VAlign::Top,
            )));
        }
    }

    items.push(SceneItem::Rect(RectItem {
        rect,
        fill: None,
        stroke: Some(BLACK.to_string()),
        stroke_width: 2.0,
    }));

    ChartScene { width, height, items }
}

fn push_ticks(items: &mut Vec<SceneItem>, rect: &PlotRect, ticks: &[Tick]) {
    for tick in ticks {
        let len = tick.length.px();
        let pos = tick.position;
        match tick.axis {
            Axis::Flow => {
                items.push(line(
                    ScreenPoint::new(pos, rect.bottom()),
                    ScreenPoint::new(pos, rect.bottom() + len),
                    BLACK,
                    1.0,
                ));
                items.push(line(
                    ScreenPoint::new(pos, rect.top),
                    ScreenPoint::new(pos, rect.top - len),
                    BLACK,
                    1.0,
                ));
                if let Some(label) = &tick.label {
                    items.push(SceneItem::Text(text(
                        label.clone(),
                        ScreenPoint::new(pos, rect.bottom() + 20.0),
                        12.0,
                        FontFamily::Serif,
                        HAlign::Center,
                        VAlign::Bottom,
                    )));
                }
            }
            Axis::Pressure => {
                items.push(line(
                    ScreenPoint::new(rect.left, pos),
                    ScreenPoint::new(rect.left - len, pos),
                    BLACK,
                    1.0,
                ));
                items.push(line(
                    ScreenPoint::new(rect.right(), pos),
                    ScreenPoint::new(rect.right() + len, pos),
                    BLACK,
                    1.0,
                ));
                if let Some(label) = &tick.label {
                    items.push(SceneItem::Text(text(
                        label.clone(),
                        ScreenPoint::new(rect.left - 10.0, pos),
                        12.0,
                        FontFamily::Serif,
                        HAlign::Right,
                        VAlign::Middle,
                    )));
                }
            }
        }
    }
}

fn push_axis_titles(items: &mut Vec<SceneItem>, rect: &PlotRect, height: f64) {
    let center = rect.center();
    items.push(SceneItem::Text(text(
        FLOW_AXIS_TITLE,
        ScreenPoint::new(center.x, height - 20.0),
        14.0,
        FontFamily::Serif,
        HAlign::Center,
        VAlign::Top,
    )));

    let mut pressure = text(
        PRESSURE_AXIS_TITLE,
        ScreenPoint::new(15.0, center.y),
        14.0,
        FontFamily::Serif,
        HAlign::Center,
        VAlign::Top,
    );
    pressure.rotation = TextRotation::CounterClockwise;
    items.push(SceneItem::Text(pressure));
}

fn push_trace(items: &mut Vec<SceneItem>, trace: CurveTrace) {
    let dash = trace.line_style.dash_pattern().to_vec();
    for segment in trace.segments.into_iter().filter(|s| s.len() > 1) {
        items.push(SceneItem::Polyline(PolylineItem {
            points: segment,
            color: trace.color.clone(),
            width: CURVE_WIDTH,
            dash: dash.clone(),
        }));
    }
    if let Some(marker) = trace.test_marker {
        items.push(SceneItem::Circle(CircleItem {
            center: marker.center,
            radius: marker.radius,
            fill: Some(WHITE.to_string()),
            stroke: Some(trace.color),
            stroke_width: CURVE_WIDTH,
        }));
    }
}

fn push_annotation(items: &mut Vec<SceneItem>, placed: PlacedAnnotation) {
    let color = placed.color;
    match placed.shape {
        PlacedShape::Marker {
            center,
            radius,
            text_anchor,
        } => {
            items.push(SceneItem::Circle(CircleItem {
                center,
                radius,
                fill: Some(color.clone()),
                stroke: Some(WHITE.to_string()),
                stroke_width: 2.0,
            }));
            if let Some(content) = placed.text {
                let mut item = text(
                    content,
                    text_anchor,
                    12.0,
                    FontFamily::SansSerif,
                    HAlign::Left,
                    VAlign::Middle,
                );
                item.bold = true;
                item.color = color;
                items.push(SceneItem::Text(item));
            }
        }
        PlacedShape::Label { text_anchor, font_px } => {
            if let Some(content) = placed.text {
                let mut item = text(
                    content,
                    text_anchor,
                    font_px,
                    FontFamily::SansSerif,
                    HAlign::Left,
                    VAlign::Bottom,
                );
                item.color = color;
                items.push(SceneItem::Text(item));
            }
        }
        PlacedShape::Line {
            orientation,
            from,
            to,
            dash,
            text_anchor,
        } => {
            items.push(SceneItem::Line(LineItem {
                from,
                to,
                color: color.clone(),
                width: 2.0,
                dash,
            }));
            if let Some(content) = placed.text {
                let (h_align, v_align, rotation) = match orientation {
                    Orientation::Horizontal => (HAlign::Right, VAlign::Bottom, TextRotation::None),
                    Orientation::Vertical => (HAlign::Left, VAlign::Top, TextRotation::Clockwise),
                };
                let mut item = text(content, text_anchor, 11.0, FontFamily::SansSerif, h_align, v_align);
                item.bold = true;
                item.color = color;
                item.rotation = rotation;
                items.push(SceneItem::Text(item));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydraulics::CurveStyle;
    use crate::plot::{GraphSettings, Margins};

    fn coords(settings: GraphSettings) -> PlotCoordinateSystem {
        let mut coords = PlotCoordinateSystem::new(settings, Margins::default());
        coords.resize(1000.0, 650.0);
        coords
    }

    fn curve() -> FireFlowCurve {
        FireFlowCurve::new(65.0, 1500.0, 35.0, "H-101", CurveStyle::default()).unwrap()
    }

    #[test]
    fn test_empty_scene_layers() {
        let scene = build_scene(
            &coords(GraphSettings::default()),
            &[],
            &[],
            &SamplingOptions::default(),
            None,
        );
        assert_eq!(scene.width, 1000.0);
        assert_eq!(scene.height, 650.0);

        // Background first, border last
        match (scene.items.first(), scene.items.last()) {
            (Some(SceneItem::Rect(bg)), Some(SceneItem::Rect(border))) => {
                assert!(bg.fill.is_some());
                assert_eq!(border.stroke_width, 2.0);
            }
            other => panic!("unexpected layers: {other:?}"),
        }

        let texts: Vec<&str> = scene.texts().map(|t| t.text.as_str()).collect();
        assert!(texts.contains(&FLOW_AXIS_TITLE));
        assert!(texts.contains(&PRESSURE_AXIS_TITLE));
        assert!(texts.contains(&"5,000"));
        assert!(texts.contains(&"100"));
        assert_eq!(scene.polylines().count(), 0);
    }

    #[test]
    fn test_axis_titles_centered_on_plot() {
        let scene = build_scene(
            &coords(GraphSettings::default()),
            &[],
            &[],
            &SamplingOptions::default(),
            None,
        );
        let flow = scene.texts().find(|t| t.text == FLOW_AXIS_TITLE).unwrap();
        assert_eq!(flow.anchor, ScreenPoint::new(515.0, 630.0));

        let pressure = scene.texts().find(|t| t.text == PRESSURE_AXIS_TITLE).unwrap();
        assert_eq!(pressure.anchor, ScreenPoint::new(15.0, 325.0));
        assert_eq!(pressure.rotation, TextRotation::CounterClockwise);
    }

    #[test]
    fn test_title_and_date() {
        let settings = GraphSettings {
            title: "Main St Flow Test".to_string(),
            show_date: true,
            ..GraphSettings::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 3, 7);
        let scene = build_scene(&coords(settings), &[], &[], &SamplingOptions::default(), date);

        let title = scene.texts().find(|t| t.text == "Main St Flow Test").unwrap();
        assert!(title.bold);
        assert_eq!(title.anchor, ScreenPoint::new(500.0, 10.0));
        assert!(scene.texts().any(|t| t.text == "3/7/2024" && t.h_align == HAlign::Right));
    }

    #[test]
    fn test_date_hidden_unless_enabled() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7);
        let scene = build_scene(
            &coords(GraphSettings::default()),
            &[],
            &[],
            &SamplingOptions::default(),
            date,
        );
        assert!(!scene.texts().any(|t| t.text == "3/7/2024"));
    }

    #[test]
    fn test_curves_and_markers() {
        let c = coords(GraphSettings::default());
        let derived = curve().tilt(1e-6);
        let scene = build_scene(
            &c,
            &[curve(), derived],
            &[],
            &SamplingOptions::default(),
            None,
        );
        assert_eq!(scene.polylines().count(), 2);
        // Only the test curve gets a hollow marker
        let markers: Vec<_> = scene.circles().collect();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].fill.as_deref(), Some(WHITE));
        assert_eq!(markers[0].center, c.forward(1500.0, 35.0));
    }

    #[test]
    fn test_annotation_items() {
        let c = coords(GraphSettings::default());
        let annotations = [
            Annotation::point(2000.0, 35.0, "Design").with_color("#FF0000"),
            Annotation::vertical_line(1500.0, "NFF"),
            Annotation::point(9000.0, 35.0, "off plot"),
        ];
        let scene = build_scene(&c, &[], &annotations, &SamplingOptions::default(), None);

        let design = scene.texts().find(|t| t.text == "Design").unwrap();
        assert_eq!(design.color, "#FF0000");
        let nff = scene.texts().find(|t| t.text == "NFF").unwrap();
        assert_eq!(nff.rotation, TextRotation::Clockwise);
        assert!(!scene.texts().any(|t| t.text == "off plot"));
        assert_eq!(scene.circles().count(), 1);
    }

    #[test]
    fn test_scene_json() {
        let scene = build_scene(
            &coords(GraphSettings::default()),
            &[curve()],
            &[],
            &SamplingOptions::default(),
            None,
        );
        let json = serde_json::to_string(&scene).unwrap();
        assert!(json.contains("\"kind\":\"polyline\""));
        let back: ChartScene = serde_json::from_str(&json).unwrap();
        assert_eq!(back.items.len(), scene.items.len());
    }
}
