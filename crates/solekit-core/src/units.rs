//! Physical unit model
//!
//! Canvas units are CSS pixels at 96 DPI. Every physical length that enters
//! the engine is converted through these constants, so a centimeter measured
//! on paper equals a centimeter requested by the clinician.

use serde::{Deserialize, Serialize};

/// Canvas units per inch (CSS reference pixel).
pub const UNITS_PER_INCH: f64 = 96.0;

/// Canvas units per centimeter at 96 DPI.
pub const CM_TO_UNIT: f64 = 37.795_275_590_6;

/// Canvas units per millimeter at 96 DPI.
pub const MM_TO_UNIT: f64 = CM_TO_UNIT / 10.0;

/// Smallest width or height a placed piece may have, in canvas units.
pub const MIN_PIECE_SIZE: f64 = 20.0;

/// Convert centimeters to canvas units.
pub fn cm_to_units(cm: f64) -> f64 {
    cm * CM_TO_UNIT
}

/// Convert canvas units to centimeters.
pub fn units_to_cm(units: f64) -> f64 {
    units / CM_TO_UNIT
}

/// Convert millimeters to canvas units.
pub fn mm_to_units(mm: f64) -> f64 {
    mm * MM_TO_UNIT
}

/// The single supported print page.
///
/// Only A4 portrait is supported; the type exists so the page geometry is
/// computed in one place rather than scattered as literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    /// ISO A4, 210 mm x 297 mm, portrait
    #[default]
    A4,
}

impl PageFormat {
    /// Page width in millimeters.
    pub fn width_mm(&self) -> f64 {
        match self {
            Self::A4 => 210.0,
        }
    }

    /// Page height in millimeters.
    pub fn height_mm(&self) -> f64 {
        match self {
            Self::A4 => 297.0,
        }
    }

    /// Page width in canvas units.
    pub fn width_units(&self) -> f64 {
        mm_to_units(self.width_mm())
    }

    /// Page height in canvas units.
    pub fn height_units(&self) -> f64 {
        mm_to_units(self.height_mm())
    }

    /// Usable area `(width, height)` after removing `margin` units on every side.
    pub fn usable_area(&self, margin: f64) -> (f64, f64) {
        (
            (self.width_units() - 2.0 * margin).max(0.0),
            (self.height_units() - 2.0 * margin).max(0.0),
        )
    }

    /// Page center in canvas units.
    pub fn center(&self) -> (f64, f64) {
        (self.width_units() / 2.0, self.height_units() / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cm_round_trip() {
        assert!((units_to_cm(cm_to_units(27.3)) - 27.3).abs() < 1e-12);
        assert!((cm_to_units(2.54) - UNITS_PER_INCH).abs() < 1e-6);
    }

    #[test]
    fn test_a4_usable_area() {
        let (w, h) = PageFormat::A4.usable_area(70.0);
        assert!((w - 653.7).abs() < 0.1, "usable width was {}", w);
        assert!((h - 982.5).abs() < 0.1, "usable height was {}", h);
    }
}
