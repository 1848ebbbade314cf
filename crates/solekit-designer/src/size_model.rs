//! Shoe size to physical size model.
//!
//! Pure functions mapping a shoe size to the patient's foot length, a width
//! correction and the scale/rotation descriptor used to print the outline.

use crate::catalog::{Outline, REFERENCE_OUTLINE_HEIGHT};
use crate::rotation_fit::angle_by_size;
use serde::Serialize;
use solekit_core::{Bounds, PageFormat, ShoeSize, CM_TO_UNIT};

/// Foot length in centimeters for EU sizes 32..=48.
const FOOT_LENGTH_TABLE: [(i32, f64); 17] = [
    (32, 21.3),
    (33, 22.0),
    (34, 22.6),
    (35, 23.3),
    (36, 24.0),
    (37, 24.6),
    (38, 25.3),
    (39, 26.0),
    (40, 26.6),
    (41, 27.3),
    (42, 28.0),
    (43, 28.6),
    (44, 29.3),
    (45, 30.0),
    (46, 30.6),
    (47, 31.3),
    (48, 32.0),
];

/// Size at which the width factor is neutral.
const WIDTH_FACTOR_CENTER: i32 = 41;
const WIDTH_FACTOR_STEP: f64 = 0.01;
const WIDTH_FACTOR_MIN: f64 = 0.9;
const WIDTH_FACTOR_MAX: f64 = 1.1;

/// Foot length in centimeters for any integer size.
///
/// Sizes inside the table are read directly; sizes outside are extrapolated
/// linearly using the slope of the nearest table segment.
pub fn foot_length_at(size: i32) -> f64 {
    let first = FOOT_LENGTH_TABLE[0];
    let last = FOOT_LENGTH_TABLE[FOOT_LENGTH_TABLE.len() - 1];

    if size < first.0 {
        let next = FOOT_LENGTH_TABLE[1];
        let slope = (next.1 - first.1) / f64::from(next.0 - first.0);
        return first.1 + slope * f64::from(size - first.0);
    }

    if size > last.0 {
        let prev = FOOT_LENGTH_TABLE[FOOT_LENGTH_TABLE.len() - 2];
        let slope = (last.1 - prev.1) / f64::from(last.0 - prev.0);
        return last.1 + slope * f64::from(size - last.0);
    }

    FOOT_LENGTH_TABLE[(size - first.0) as usize].1
}

/// Foot length in centimeters.
pub fn foot_length_cm(size: ShoeSize) -> f64 {
    foot_length_at(size.value())
}

/// Width multiplier, 1.0 at size 41 and 1% per size step, clamped to [0.9, 1.1].
pub fn width_factor(size: ShoeSize) -> f64 {
    let steps = f64::from(size.value() - WIDTH_FACTOR_CENTER);
    (1.0 + steps * WIDTH_FACTOR_STEP).clamp(WIDTH_FACTOR_MIN, WIDTH_FACTOR_MAX)
}

/// Factor mapping the reference outline's authored height onto the true foot
/// length in canvas units. Pieces are sized with the same factor.
pub fn svg_scale(size: ShoeSize) -> f64 {
    foot_length_cm(size) * CM_TO_UNIT / REFERENCE_OUTLINE_HEIGHT
}

/// Scale and rotation descriptor for printing the outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrintScale {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Cosmetic rotation for this size, in degrees
    pub rotation: f64,
    /// The full page in canvas units
    pub page_bounds: Bounds,
}

impl PrintScale {
    /// Size of the scaled outline's unrotated bounding box.
    pub fn scaled_extent(&self, outline: &Outline) -> (f64, f64) {
        let local = outline.local_bounds();
        (local.width() * self.scale_x, local.height() * self.scale_y)
    }
}

/// Computes the print scale for `size`.
///
/// `scale_y` maps the reference height to the true foot length;
/// `scale_x = scale_y * base_aspect_ratio * width_factor`.
pub fn print_scale(size: ShoeSize, outline: &Outline, page: PageFormat) -> PrintScale {
    let scale_y = svg_scale(size);
    let scale_x = scale_y * outline.base_aspect_ratio() * width_factor(size);
    PrintScale {
        scale_x,
        scale_y,
        rotation: angle_by_size(size),
        page_bounds: Bounds::new(0.0, 0.0, page.width_units(), page.height_units()),
    }
}
