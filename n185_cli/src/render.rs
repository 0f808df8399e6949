//! SVG output for a [`ChartScene`] through plotters.

use std::path::Path;

use anyhow::{anyhow, Result};
use n185_core::plot::scene::{
    CircleItem, FontFamily, HAlign, LineItem, PolylineItem, RectItem, TextItem, TextRotation, VAlign,
};
use n185_core::plot::{ChartScene, SceneItem, ScreenPoint};
use n185_core::style::Rgb;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontStyle, FontTransform};

type Point = (f64, f64);

pub fn render_svg(scene: &ChartScene, path: &Path) -> Result<()> {
    let backend = SVGBackend::new(path, canvas_size(scene));
    let drawing = backend.into_drawing_area();
    draw_scene(&drawing, scene)?;
    drawing
        .present()
        .map_err(|e| anyhow!("failed to write {}: {e}", path.display()))?;
    Ok(())
}

#[cfg(test)]
pub fn render_svg_string(scene: &ChartScene) -> Result<String> {
    let mut svg = String::new();
    {
        let drawing = SVGBackend::with_string(&mut svg, canvas_size(scene)).into_drawing_area();
        draw_scene(&drawing, scene)?;
        drawing.present().map_err(|e| anyhow!("failed to finish svg: {e}"))?;
    }
    Ok(svg)
}

fn canvas_size(scene: &ChartScene) -> (u32, u32) {
    (scene.width.round().max(1.0) as u32, scene.height.round().max(1.0) as u32)
}

/// Paint every scene item in order.
pub fn draw_scene<DB: DrawingBackend>(drawing: &DrawingArea<DB, Shift>, scene: &ChartScene) -> Result<()> {
    for item in &scene.items {
        match item {
            SceneItem::Rect(rect) => draw_rect(drawing, rect)?,
            SceneItem::Line(line) => draw_line(drawing, line)?,
            SceneItem::Polyline(polyline) => draw_polyline(drawing, polyline)?,
            SceneItem::Circle(circle) => draw_circle(drawing, circle)?,
            SceneItem::Text(text) => draw_label(drawing, text)?,
        }
    }
    Ok(())
}

fn draw_rect<DB: DrawingBackend>(drawing: &DrawingArea<DB, Shift>, item: &RectItem) -> Result<()> {
    let corners = [
        (round_i32(item.rect.left), round_i32(item.rect.top)),
        (round_i32(item.rect.right()), round_i32(item.rect.bottom())),
    ];
    if let Some(fill) = &item.fill {
        drawing
            .draw(&Rectangle::new(corners, color(fill).filled()))
            .map_err(|e| anyhow!("failed to fill rect: {e}"))?;
    }
    if let Some(stroke) = &item.stroke {
        drawing
            .draw(&Rectangle::new(corners, stroke_style(stroke, item.stroke_width)))
            .map_err(|e| anyhow!("failed to stroke rect: {e}"))?;
    }
    Ok(())
}

fn draw_line<DB: DrawingBackend>(drawing: &DrawingArea<DB, Shift>, item: &LineItem) -> Result<()> {
    let points = [to_point(item.from), to_point(item.to)];
    draw_path(drawing, &points, &item.color, item.width, &item.dash)
}

fn draw_polyline<DB: DrawingBackend>(drawing: &DrawingArea<DB, Shift>, item: &PolylineItem) -> Result<()> {
    let points: Vec<Point> = item.points.iter().copied().map(to_point).collect();
    draw_path(drawing, &points, &item.color, item.width, &item.dash)
}

fn draw_path<DB: DrawingBackend>(
    drawing: &DrawingArea<DB, Shift>,
    points: &[Point],
    stroke: &str,
    width: f64,
    dash: &[f64],
) -> Result<()> {
    let style = stroke_style(stroke, width);
    for run in dash_runs(points, dash) {
        drawing
            .draw(&PathElement::new(to_backend_points(&run), style))
            .map_err(|e| anyhow!("failed to draw path: {e}"))?;
    }
    Ok(())
}

fn draw_circle<DB: DrawingBackend>(drawing: &DrawingArea<DB, Shift>, item: &CircleItem) -> Result<()> {
    let center = (round_i32(item.center.x), round_i32(item.center.y));
    let radius = round_i32(item.radius).max(1);
    if let Some(fill) = &item.fill {
        drawing
            .draw(&Circle::new(center, radius, color(fill).filled()))
            .map_err(|e| anyhow!("failed to fill circle: {e}"))?;
    }
    if let Some(stroke) = &item.stroke {
        drawing
            .draw(&Circle::new(center, radius, stroke_style(stroke, item.stroke_width)))
            .map_err(|e| anyhow!("failed to stroke circle: {e}"))?;
    }
    Ok(())
}

fn draw_label<DB: DrawingBackend>(drawing: &DrawingArea<DB, Shift>, item: &TextItem) -> Result<()> {
    if item.text.is_empty() {
        return Ok(());
    }
    let family = match item.family {
        FontFamily::Serif => plotters::style::FontFamily::Serif,
        FontFamily::SansSerif => plotters::style::FontFamily::SansSerif,
    };
    let weight = if item.bold { FontStyle::Bold } else { FontStyle::Normal };
    let transform = match item.rotation {
        TextRotation::None => FontTransform::None,
        TextRotation::Clockwise => FontTransform::Rotate90,
        TextRotation::CounterClockwise => FontTransform::Rotate270,
    };
    let style = FontDesc::new(family, item.font_px, weight)
        .color(&color(&item.color))
        .transform(transform)
        .pos(Pos::new(h_pos(item.h_align), v_pos(item.v_align)));

    drawing
        .draw_text(&item.text, &style, (round_i32(item.anchor.x), round_i32(item.anchor.y)))
        .map_err(|e| anyhow!("failed to draw text '{}': {e}", item.text))?;
    Ok(())
}

fn h_pos(align: HAlign) -> HPos {
    match align {
        HAlign::Left => HPos::Left,
        HAlign::Center => HPos::Center,
        HAlign::Right => HPos::Right,
    }
}

fn v_pos(align: VAlign) -> VPos {
    match align {
        VAlign::Top => VPos::Top,
        VAlign::Middle => VPos::Center,
        VAlign::Bottom => VPos::Bottom,
    }
}

/// `#rrggbb` to a plotters color; unreadable values draw black.
fn color(hex: &str) -> RGBColor {
    let rgb = Rgb::parse_hex(hex).unwrap_or(Rgb::BLACK);
    RGBColor(rgb.r, rgb.g, rgb.b)
}

fn stroke_style(hex: &str, width: f64) -> ShapeStyle {
    ShapeStyle::from(&color(hex)).stroke_width(width.round().max(1.0) as u32)
}

/// Split a polyline into the visible runs of an on/off dash pattern.
///
/// An empty pattern (or one with no positive length) is a solid line and
/// comes back as a single run.
fn dash_runs(points: &[Point], pattern: &[f64]) -> Vec<Vec<Point>> {
    if points.len() < 2 {
        return Vec::new();
    }
    if pattern.is_empty() || pattern.iter().all(|&len| len <= 0.0) {
        return vec![points.to_vec()];
    }

    let mut runs = Vec::new();
    let mut current: Vec<Point> = vec![points[0]];
    let mut index = 0;
    let mut left = pattern[0];
    let mut on = true;

    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let length = ((end.0 - start.0).powi(2) + (end.1 - start.1).powi(2)).sqrt();
        let mut travelled = 0.0;

        while length - travelled > left {
            travelled += left;
            let t = travelled / length;
            let at = (start.0 + (end.0 - start.0) * t, start.1 + (end.1 - start.1) * t);
            if on {
                current.push(at);
                runs.push(std::mem::take(&mut current));
            } else {
                current = vec![at];
            }
            on = !on;
            index = (index + 1) % pattern.len();
            left = pattern[index];
        }

        left -= length - travelled;
        if on {
            current.push(end);
        }
    }

    if on && current.len() > 1 {
        runs.push(current);
    }
    runs
}

fn to_point(p: ScreenPoint) -> Point {
    (p.x, p.y)
}

fn to_backend_points(points: &[Point]) -> Vec<(i32, i32)> {
    points.iter().map(|&(x, y)| (round_i32(x), round_i32(y))).collect()
}

fn round_i32(value: f64) -> i32 {
    value.round() as i32
}
