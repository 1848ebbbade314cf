//! Rotation-fit solver.
//!
//! Finds the rotation that lets the true-scale outline fit the printable
//! area. Scale is never touched here: when no rotation fits, the solver
//! reports a best-effort angle and says so.

use serde::Serialize;
use solekit_core::geometry::rotated_extent;
use solekit_core::ShoeSize;

/// Cosmetic rotation at the largest supported size, in degrees.
pub const MAX_COSMETIC_ANGLE: f64 = 30.0;

/// Sweep resolution, in degrees.
pub const SWEEP_STEP_DEG: f64 = 0.1;

/// Number of sweep steps covering 0..=90 degrees.
const SWEEP_STEPS: u32 = 900;

/// Cosmetic rotation, 0 degrees at the smallest size rising linearly to
/// 30 degrees at the largest.
pub fn angle_by_size(size: ShoeSize) -> f64 {
    let span = f64::from(ShoeSize::MAX - ShoeSize::MIN);
    MAX_COSMETIC_ANGLE * size.index() as f64 / span
}

/// Whether a `w` x `h` box rotated by `degrees` fits inside `a` x `b`.
pub fn fits_at(w: f64, h: f64, a: f64, b: f64, degrees: f64) -> bool {
    let (rw, rh) = rotated_extent(w, h, degrees);
    rw <= a && rh <= b
}

/// How far the rotated box sticks out of the area, 0 when it fits.
pub fn overflow_at(w: f64, h: f64, a: f64, b: f64, degrees: f64) -> f64 {
    let (rw, rh) = rotated_extent(w, h, degrees);
    (rw - a).max(rh - b).max(0.0)
}

/// Outcome of the angle sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitSearch {
    /// Chosen angle, in degrees
    pub angle: f64,
    /// Whether the box fits at `angle`
    pub fits: bool,
    /// Overflow at `angle`, in canvas units
    pub overflow: f64,
}

/// Sweeps 0..=90 degrees in 0.1 degree steps and stops at the first angle at
/// which the rotated box fits.
///
/// When no swept angle fits, returns the angle with the smallest overflow
/// (earliest on ties) with `fits == false`.
pub fn search_fit(w: f64, h: f64, a: f64, b: f64) -> FitSearch {
    let mut best = FitSearch {
        angle: 0.0,
        fits: false,
        overflow: f64::INFINITY,
    };

    for step in 0..=SWEEP_STEPS {
        let angle = f64::from(step) * SWEEP_STEP_DEG;
        let overflow = overflow_at(w, h, a, b, angle);
        if fits_at(w, h, a, b, angle) {
            return FitSearch {
                angle,
                fits: true,
                overflow: 0.0,
            };
        }
        if overflow < best.overflow {
            best = FitSearch {
                angle,
                fits: false,
                overflow,
            };
        }
    }

    best
}

/// Smallest swept angle at which the box fits, or the best-effort angle.
pub fn min_angle_to_fit(w: f64, h: f64, a: f64, b: f64) -> f64 {
    search_fit(w, h, a, b).angle
}

/// Final rotation decision for one print request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RotationFit {
    pub cosmetic_angle: f64,
    pub fit_angle: f64,
    pub final_rotation: f64,
    /// Whether the outline fits the printable area at `final_rotation`
    pub fits: bool,
    pub overflow: f64,
}

/// `final_rotation = max(angle_by_size, min_angle_to_fit)`.
pub fn solve(size: ShoeSize, w: f64, h: f64, a: f64, b: f64) -> RotationFit {
    let cosmetic_angle = angle_by_size(size);
    let fit_angle = min_angle_to_fit(w, h, a, b);
    let final_rotation = cosmetic_angle.max(fit_angle);
    let overflow = overflow_at(w, h, a, b, final_rotation);

    if overflow > 0.0 {
        tracing::warn!(
            size = size.value(),
            final_rotation,
            overflow,
            "Outline exceeds the printable area; printing at true scale anyway"
        );
    }

    RotationFit {
        cosmetic_angle,
        fit_angle,
        final_rotation,
        fits: overflow <= 0.0,
        overflow,
    }
}
