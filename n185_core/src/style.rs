//! # Drawing Styles
//!
//! Line styles and colors shared by supply curves and annotations. Colors are
//! carried as CSS-style hex strings in records (`"#142B6C"`) and parsed into
//! [`Rgb`] only when a renderer needs channel values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default curve color (NFPA chart navy)
pub const DEFAULT_CURVE_COLOR: &str = "#142B6C";

/// Default annotation color
pub const DEFAULT_ANNOTATION_COLOR: &str = "#000000";

/// Stroke pattern for a supply curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    #[serde(rename = "dashdot")]
    DashDot,
}

impl LineStyle {
    /// Dash pattern in pixels (on, off, on, off, ...). Empty means solid.
    pub fn dash_pattern(self) -> &'static [f64] {
        match self {
            LineStyle::Solid => &[],
            LineStyle::Dashed => &[10.0, 5.0],
            LineStyle::Dotted => &[2.0, 3.0],
            LineStyle::DashDot => &[10.0, 5.0, 2.0, 5.0],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
            LineStyle::Dotted => "dotted",
            LineStyle::DashDot => "dashdot",
        }
    }

    /// Parse the record spelling; unknown names fall back to solid.
    pub fn from_name(name: &str) -> Self {
        match name {
            "dashed" => LineStyle::Dashed,
            "dotted" => LineStyle::Dotted,
            "dashdot" => LineStyle::DashDot,
            _ => LineStyle::Solid,
        }
    }
}

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    /// Parse `#rrggbb` or `#rgb`.
    pub fn parse_hex(text: &str) -> Option<Rgb> {
        let hex = text.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Rgb {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => {
                let expand = |s: &str| channel(s).map(|v| v * 17);
                Some(Rgb {
                    r: expand(&hex[0..1])?,
                    g: expand(&hex[1..2])?,
                    b: expand(&hex[2..3])?,
                })
            }
            _ => None,
        }
    }

    /// Convert from HSL (hue in degrees, saturation/lightness in 0..=1).
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Rgb {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Rgb { r: v, g: v, b: v };
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        let to_u8 = |t: f64| (hue_to_channel(p, q, t) * 255.0).round() as u8;
        Rgb {
            r: to_u8(h + 1.0 / 3.0),
            g: to_u8(h),
            b: to_u8(h - 1.0 / 3.0),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_patterns() {
        assert!(LineStyle::Solid.dash_pattern().is_empty());
        assert_eq!(LineStyle::Dashed.dash_pattern(), &[10.0, 5.0]);
        assert_eq!(LineStyle::DashDot.dash_pattern().len(), 4);
    }

    #[test]
    fn test_line_style_names() {
        for style in [LineStyle::Solid, LineStyle::Dashed, LineStyle::Dotted, LineStyle::DashDot] {
            assert_eq!(LineStyle::from_name(style.as_str()), style);
        }
        assert_eq!(LineStyle::from_name("wavy"), LineStyle::Solid);
        assert_eq!(serde_json::to_string(&LineStyle::DashDot).unwrap(), "\"dashdot\"");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(
            Rgb::parse_hex(DEFAULT_CURVE_COLOR),
            Some(Rgb { r: 0x14, g: 0x2B, b: 0x6C })
        );
        assert_eq!(Rgb::parse_hex("#f00"), Some(Rgb { r: 255, g: 0, b: 0 }));
        assert_eq!(Rgb::parse_hex("142B6C"), None);
        assert_eq!(Rgb::parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_hsl() {
        assert_eq!(Rgb::from_hsl(0.0, 1.0, 0.5), Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(Rgb::from_hsl(120.0, 1.0, 0.5), Rgb { r: 0, g: 255, b: 0 });
        assert_eq!(Rgb::from_hsl(240.0, 1.0, 0.5), Rgb { r: 0, g: 0, b: 255 });
        assert_eq!(Rgb::from_hsl(42.0, 0.0, 1.0), Rgb::WHITE);
        assert_eq!(Rgb::from_hsl(0.0, 1.0, 0.5).to_hex(), "#FF0000");
    }
}
