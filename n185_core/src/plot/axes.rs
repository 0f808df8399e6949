//! # Grid and Axis Ticks
//!
//! Grid lines and tick marks in screen space for the current view.
//!
//! Flow axis: grid and labelled major ticks at tenths of `max_flow`, minor
//! ticks at hundredths (medium on the half-major boundaries). Pressure axis:
//! grid every 10 PSI, labelled major ticks every 10 PSI from zero, minor ticks
//! every PSI (medium on multiples of 5).
//!
//! Ticks are positions only; renderers draw each tick inward from both
//! opposite edges of the plot (bottom and top, left and right).

use serde::{Deserialize, Serialize};

use crate::units::format_number;

use super::coords::{PlotCoordinateSystem, ScreenPoint, MAX_PRESSURE_LIMIT};

/// Major intervals across the flow axis
pub const FLOW_DIVISIONS: u32 = 10;

/// Minor subdivisions per major flow interval
pub const FLOW_MINOR_PER_MAJOR: u32 = 10;

/// Pressure grid and label spacing (PSI)
pub const PRESSURE_MAJOR_STEP: u64 = 10;

/// Pressure minor tick spacing (PSI)
pub const PRESSURE_MINOR_STEP: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Flow,
    Pressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickLength {
    Major,
    Medium,
    Short,
}

impl TickLength {
    pub fn px(self) -> f64 {
        match self {
            TickLength::Major => 6.0,
            TickLength::Medium => 4.0,
            TickLength::Short => 2.0,
        }
    }
}

/// One grid line spanning the plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub axis: Axis,
    /// Data value (GPM or PSI)
    pub value: f64,
    pub from: ScreenPoint,
    pub to: ScreenPoint,
}

/// One tick mark on an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub axis: Axis,
    /// Data value (GPM or PSI)
    pub value: f64,
    /// Screen x for flow ticks, screen y for pressure ticks
    pub position: f64,
    pub length: TickLength,
    pub label: Option<String>,
}

/// Whole `step`s up to `max_pressure`, never past [`MAX_PRESSURE_LIMIT`].
fn pressure_steps(max_pressure: f64, step: u64) -> u64 {
    if max_pressure.is_finite() && max_pressure > 0.0 {
        (max_pressure.min(MAX_PRESSURE_LIMIT) / step as f64).floor() as u64
    } else {
        0
    }
}

/// Vertical lines at each flow tenth, horizontal lines every 10 PSI above zero.
pub fn grid_lines(coords: &PlotCoordinateSystem) -> Vec<GridLine> {
    let rect = *coords.plot_rect();
    let max_flow = coords.max_flow();
    let mut lines = Vec::new();

    for i in 1..=FLOW_DIVISIONS {
        let q = max_flow * i as f64 / FLOW_DIVISIONS as f64;
        let x = coords.forward_flow(q);
        lines.push(GridLine {
            axis: Axis::Flow,
            value: q,
            from: ScreenPoint::new(x, rect.top),
            to: ScreenPoint::new(x, rect.bottom()),
        });
    }

    for i in 1..=pressure_steps(coords.max_pressure(), PRESSURE_MAJOR_STEP) {
        let p = (i * PRESSURE_MAJOR_STEP) as f64;
        let y = coords.forward_pressure(p);
        lines.push(GridLine {
            axis: Axis::Pressure,
            value: p,
            from: ScreenPoint::new(rect.left, y),
            to: ScreenPoint::new(rect.right(), y),
        });
    }

    lines
}

/// Flow axis ticks, majors first.
pub fn flow_ticks(coords: &PlotCoordinateSystem) -> Vec<Tick> {
    let max_flow = coords.max_flow();
    let subdivisions = FLOW_DIVISIONS * FLOW_MINOR_PER_MAJOR;
    let mut ticks = Vec::with_capacity(subdivisions as usize);

    for i in 1..=FLOW_DIVISIONS {
        let q = max_flow * i as f64 / FLOW_DIVISIONS as f64;
        ticks.push(Tick {
            axis: Axis::Flow,
            value: q,
            position: coords.forward_flow(q),
            length: TickLength::Major,
            label: Some(format_number(q, 0)),
        });
    }

    // Indexed so majors are skipped exactly, whatever max_flow is
    for i in (1..=subdivisions).filter(|i| i % FLOW_MINOR_PER_MAJOR != 0) {
        let q = max_flow * i as f64 / subdivisions as f64;
        let length = if i % (FLOW_MINOR_PER_MAJOR / 2) == 0 {
            TickLength::Medium
        } else {
            TickLength::Short
        };
        ticks.push(Tick {
            axis: Axis::Flow,
            value: q,
            position: coords.forward_flow(q),
            length,
            label: None,
        });
    }

    ticks
}

/// Pressure axis ticks, majors first.
pub fn pressure_ticks(coords: &PlotCoordinateSystem) -> Vec<Tick> {
    let max_pressure = coords.max_pressure();
    let mut ticks = Vec::new();

    for i in 0..=pressure_steps(max_pressure, PRESSURE_MAJOR_STEP) {
        let p = i * PRESSURE_MAJOR_STEP;
        ticks.push(Tick {
            axis: Axis::Pressure,
            value: p as f64,
            position: coords.forward_pressure(p as f64),
            length: TickLength::Major,
            label: Some(p.to_string()),
        });
    }

    for i in 0..=pressure_steps(max_pressure, PRESSURE_MINOR_STEP) {
        let p = i * PRESSURE_MINOR_STEP;
        if p % PRESSURE_MAJOR_STEP == 0 {
            continue;
        }
        let length = if p % 5 == 0 {
            TickLength::Medium
        } else {
            TickLength::Short
        };
        ticks.push(Tick {
            axis: Axis::Pressure,
            value: p as f64,
            position: coords.forward_pressure(p as f64),
            length,
            label: None,
        });
    }

    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{GraphSettings, Margins};

    fn coords(max_flow: f64, max_pressure: f64) -> PlotCoordinateSystem {
        let settings = GraphSettings {
            max_flow,
            max_pressure,
            ..GraphSettings::default()
        };
        let mut coords = PlotCoordinateSystem::new(settings, Margins::default());
        coords.resize(1000.0, 650.0);
        coords
    }

    #[test]
    fn test_grid_lines() {
        let lines = grid_lines(&coords(5000.0, 100.0));
        let vertical: Vec<_> = lines.iter().filter(|l| l.axis == Axis::Flow).collect();
        let horizontal: Vec<_> = lines.iter().filter(|l| l.axis == Axis::Pressure).collect();

        assert_eq!(vertical.len(), 10);
        assert_eq!(vertical[0].value, 500.0);
        assert_eq!(vertical[9].value, 5000.0);
        assert_eq!(vertical[0].from.y, 60.0);
        assert_eq!(vertical[0].to.y, 590.0);

        assert_eq!(horizontal.len(), 10);
        assert_eq!(horizontal[0].value, 10.0);
        assert_eq!(horizontal[9].value, 100.0);
        assert_eq!(horizontal[0].from.x, 60.0);
        assert_eq!(horizontal[0].to.x, 970.0);
    }

    #[test]
    fn test_flow_ticks() {
        let ticks = flow_ticks(&coords(5000.0, 100.0));
        let majors: Vec<_> = ticks.iter().filter(|t| t.length == TickLength::Major).collect();
        let mediums = ticks.iter().filter(|t| t.length == TickLength::Medium).count();
        let shorts = ticks.iter().filter(|t| t.length == TickLength::Short).count();

        assert_eq!(majors.len(), 10);
        assert_eq!(mediums, 10);
        assert_eq!(shorts, 80);
        assert_eq!(majors[1].label.as_deref(), Some("1,000"));
        assert!(ticks
            .iter()
            .filter(|t| t.length != TickLength::Major)
            .all(|t| t.label.is_none()));
    }

    #[test]
    fn test_no_duplicate_flow_ticks() {
        // 3000 / 100 = 30, and float accumulation would miss majors
        let ticks = flow_ticks(&coords(3000.0, 100.0));
        let mut positions: Vec<f64> = ticks.iter().map(|t| t.position).collect();
        positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
        positions.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        assert_eq!(positions.len(), ticks.len());
        assert_eq!(ticks.len(), 100);
    }

    #[test]
    fn test_half_major_is_medium() {
        let ticks = flow_ticks(&coords(5000.0, 100.0));
        let at_250 = ticks.iter().find(|t| (t.value - 250.0).abs() < 1e-9).unwrap();
        assert_eq!(at_250.length, TickLength::Medium);
        let at_50 = ticks.iter().find(|t| (t.value - 50.0).abs() < 1e-9).unwrap();
        assert_eq!(at_50.length, TickLength::Short);
    }

    #[test]
    fn test_pressure_ticks() {
        let ticks = pressure_ticks(&coords(5000.0, 100.0));
        let majors: Vec<_> = ticks.iter().filter(|t| t.length == TickLength::Major).collect();
        assert_eq!(majors.len(), 11);
        assert_eq!(majors[0].label.as_deref(), Some("0"));
        assert_eq!(majors[10].label.as_deref(), Some("100"));
        assert_eq!(majors[0].position, 590.0);

        let medium: Vec<f64> = ticks
            .iter()
            .filter(|t| t.length == TickLength::Medium)
            .map(|t| t.value)
            .collect();
        assert_eq!(medium.len(), 10);
        assert!(medium.iter().all(|p| p % 5.0 == 0.0 && p % 10.0 != 0.0));
        assert_eq!(ticks.len(), 101);
    }

    #[test]
    fn test_pressure_ticks_uneven_max() {
        let ticks = pressure_ticks(&coords(5000.0, 105.0));
        let last_major = ticks.iter().filter(|t| t.length == TickLength::Major).last().unwrap();
        assert_eq!(last_major.value, 100.0);
        assert!(ticks.iter().any(|t| t.value == 105.0 && t.length == TickLength::Medium));
    }

    #[test]
    fn test_huge_max_pressure_is_bounded() {
        let coords = coords(5000.0, 1e10);
        let ticks = pressure_ticks(&coords);
        assert_eq!(ticks.len(), 1001);
        assert!(ticks.iter().all(|t| t.value <= MAX_PRESSURE_LIMIT));

        let horizontal = grid_lines(&coords).into_iter().filter(|l| l.axis == Axis::Pressure).count();
        assert_eq!(horizontal, 100);
    }
}
