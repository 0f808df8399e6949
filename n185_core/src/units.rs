//! # Unit Types
//!
//! Type-safe wrappers for the US customary units used in fire-flow work.
//! These are plain f64 newtypes: they serialize as bare numbers and cost
//! nothing at runtime.
//!
//! - Flow: gallons per minute (GPM)
//! - Pressure: pounds per square inch (PSI)
//! - Length: feet (pipe length, elevation), inches (pipe diameter)
//!
//! ## Example
//!
//! ```rust
//! use n185_core::units::{elevation_to_pressure, Feet, Psi};
//!
//! let rise = Feet(10.0);
//! let loss: Psi = elevation_to_pressure(rise);
//! assert!((loss.0 - 4.33).abs() < 1e-12);
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Pressure exerted by one foot of water column, in PSI
pub const PSI_PER_FOOT: f64 = 0.433;

// ============================================================================
// Flow and Pressure
// ============================================================================

/// Flow rate in gallons per minute
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gpm(pub f64);

/// Pressure in pounds per square inch
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Psi(pub f64);

impl fmt::Display for Gpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = f.precision().unwrap_or(0);
        write!(f, "{} GPM", format_number(self.0, decimals))
    }
}

impl fmt::Display for Psi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = f.precision().unwrap_or(1);
        write!(f, "{} PSI", format_number(self.0, decimals))
    }
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

// ============================================================================
// Elevation <-> Pressure
// ============================================================================

/// Pressure change produced by an elevation change (positive feet = higher).
pub fn elevation_to_pressure(elevation: Feet) -> Psi {
    Psi(elevation.0 * PSI_PER_FOOT)
}

/// Elevation change equivalent to a pressure change.
pub fn pressure_to_elevation(pressure: Psi) -> Feet {
    Feet(pressure.0 / PSI_PER_FOOT)
}

// ============================================================================
// Formatting
// ============================================================================

/// Format a number with a fixed number of decimals and thousands separators.
///
/// Non-finite values (the "no such flow" result of a curve with k <= 0)
/// render as `N/A`.
///
/// ```rust
/// use n185_core::units::format_number;
///
/// assert_eq!(format_number(1234567.891, 1), "1,234,567.9");
/// assert_eq!(format_number(f64::NAN, 0), "N/A");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0" after rounding is just "0"
    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Gpm);
impl_arithmetic!(Psi);
impl_arithmetic!(Feet);
impl_arithmetic!(Inches);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevation_roundtrip() {
        let psi = elevation_to_pressure(Feet(25.0));
        assert!((psi.0 - 10.825).abs() < 1e-12);
        let ft = pressure_to_elevation(psi);
        assert!((ft.0 - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_arithmetic() {
        let a = Psi(60.0);
        let b = Psi(15.0);
        assert_eq!((a - b).0, 45.0);
        assert_eq!((a + b).0, 75.0);
        assert_eq!((b * 2.0).0, 30.0);
        assert_eq!((a / 4.0).value(), 15.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(2512.6, 0), "2,513");
        assert_eq!(format_number(35.04, 1), "35.0");
        assert_eq!(format_number(-1500.25, 2), "-1,500.25");
        assert_eq!(format_number(-0.01, 0), "0");
        assert_eq!(format_number(f64::INFINITY, 1), "N/A");
    }

    #[test]
    fn test_display() {
        assert_eq!(Gpm(1500.0).to_string(), "1,500 GPM");
        assert_eq!(Psi(35.0).to_string(), "35.0 PSI");
        assert_eq!(format!("{:.0}", Psi(35.0)), "35 PSI");
        assert_eq!(Gpm(f64::NAN).to_string(), "N/A GPM");
    }

    #[test]
    fn test_serialization() {
        let q = Gpm(1500.0);
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, "1500.0");
        let roundtrip: Gpm = serde_json::from_str(&json).unwrap();
        assert_eq!(q, roundtrip);
    }
}
