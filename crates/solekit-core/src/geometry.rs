//! 2D geometry primitives
//!
//! Points, axis-aligned bounds and a small affine transform used both by the
//! interactive hit-testing code and by the print composer, so a rotation is
//! interpreted identically everywhere.
//!
//! The coordinate system is the SVG one: x grows right, y grows down, and a
//! positive angle turns clockwise on screen.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotates this point by `degrees` around `center`.
    pub fn rotated_about(&self, center: Point, degrees: f64) -> Point {
        Affine2::rotation_about(center, degrees).apply(*self)
    }

    /// Expresses this point in the frame of an object centered at `center`
    /// and rotated by `degrees`; the result is relative to the center.
    pub fn to_local_frame(&self, center: Point, degrees: f64) -> Point {
        Affine2::rotation(-degrees).apply(*self - center)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point::new(v.0, v.1)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Creates bounds from two corners.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Extent `(width, height)` of the axis-aligned box enclosing a `w` x `h`
/// rectangle rotated by `degrees`.
pub fn rotated_extent(w: f64, h: f64, degrees: f64) -> (f64, f64) {
    let (s, c) = degrees.to_radians().sin_cos();
    ((w * c).abs() + (h * s).abs(), (w * s).abs() + (h * c).abs())
}

/// Affine transform `[a c e; b d f; 0 0 1]`, matching the SVG `matrix()` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine2 {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::identity()
        }
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    /// Rotation about the origin, clockwise on screen for positive `degrees`.
    pub fn rotation(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self {
            a: c,
            b: s,
            c: -s,
            d: c,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Rotation about an arbitrary center.
    pub fn rotation_about(center: Point, degrees: f64) -> Self {
        Self::translation(center.x, center.y)
            .then(&Self::rotation(degrees))
            .then(&Self::translation(-center.x, -center.y))
    }

    /// Composes `self * other`: `other` is applied first, then `self`.
    ///
    /// This mirrors how an SVG `transform` list reads left to right.
    pub fn then(&self, other: &Affine2) -> Affine2 {
        Affine2 {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform, `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Affine2> {
        let det = self.determinant();
        if det.abs() < 1e-12 {
            return None;
        }
        Some(Affine2 {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }

    /// Coefficients in SVG `matrix(a b c d e f)` order.
    pub fn to_svg_matrix(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_rotation_is_clockwise_on_screen() {
        // 12 o'clock rotated by 90 degrees lands on 3 o'clock.
        let p = Affine2::rotation(90.0).apply(Point::new(0.0, -1.0));
        assert!(close(p, Point::new(1.0, 0.0)), "got {:?}", p);
    }

    #[test]
    fn test_local_frame_undoes_rotation() {
        let center = Point::new(100.0, 50.0);
        let local = Point::new(30.0, -10.0);
        let world = (center + local).rotated_about(center, 37.0);
        assert!(close(world.to_local_frame(center, 37.0), local));
    }

    #[test]
    fn test_compose_and_inverse() {
        let t = Affine2::translation(10.0, 20.0)
            .then(&Affine2::rotation(30.0))
            .then(&Affine2::scaling(2.0, 3.0));
        let p = Point::new(4.0, -7.0);
        let inv = t.inverse().expect("invertible");
        assert!(close(inv.apply(t.apply(p)), p));
    }

    #[test]
    fn test_rotated_extent() {
        let (w, h) = rotated_extent(200.0, 600.0, 0.0);
        assert!((w - 200.0).abs() < 1e-9 && (h - 600.0).abs() < 1e-9);
        let (w, h) = rotated_extent(200.0, 600.0, 90.0);
        assert!((w - 600.0).abs() < 1e-9 && (h - 200.0).abs() < 1e-9);
    }
}
