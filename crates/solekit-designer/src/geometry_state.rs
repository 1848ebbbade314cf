//! In-session geometry: placed pieces, guides and the calibration circle.
//!
//! Coordinates live in the *outline frame*: the scaled outline's unrotated
//! bounding box with its top-left corner at the origin, in true-scale canvas
//! units.

use crate::catalog;
use serde::{Deserialize, Serialize};
use solekit_core::{DimensionError, Point, ValidationError, CM_TO_UNIT};

pub use solekit_core::MIN_PIECE_SIZE;

/// Physical diameter of the calibration circle.
pub const REFERENCE_CIRCLE_DIAMETER_CM: f64 = 2.5;

/// Placement of one piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecePosition {
    pub id: String,
    /// Center x
    pub x: f64,
    /// Center y
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise, unbounded
    #[serde(default)]
    pub rotation: f64,
}

impl PiecePosition {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_center(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    /// Corner in the piece's own frame, relative to its center.
    pub fn local_corner(&self, corner: Corner) -> Point {
        let (sx, sy) = corner.signs();
        Point::new(sx * self.width / 2.0, sy * self.height / 2.0)
    }

    /// Corner in the outline frame, rotation applied.
    pub fn corner(&self, corner: Corner) -> Point {
        (self.center() + self.local_corner(corner)).rotated_about(self.center(), self.rotation)
    }

    /// Whether `p` (outline frame) lies on the piece's rotated body.
    pub fn contains(&self, p: Point) -> bool {
        let local = p.to_local_frame(self.center(), self.rotation);
        local.x.abs() <= self.width / 2.0 && local.y.abs() <= self.height / 2.0
    }
}

/// Resize handle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Axis signs of this corner in the piece frame (y grows down).
    pub fn signs(&self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }
}

/// Advisory alignment line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidePosition {
    pub id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// One end of a guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideEndpoint {
    Start,
    End,
}

impl GuidePosition {
    pub fn endpoint(&self, which: GuideEndpoint) -> Point {
        match which {
            GuideEndpoint::Start => Point::new(self.x1, self.y1),
            GuideEndpoint::End => Point::new(self.x2, self.y2),
        }
    }

    pub fn set_endpoint(&mut self, which: GuideEndpoint, p: Point) {
        match which {
            GuideEndpoint::Start => {
                self.x1 = p.x;
                self.y1 = p.y;
            }
            GuideEndpoint::End => {
                self.x2 = p.x;
                self.y2 = p.y;
            }
        }
    }
}

/// Calibration circle of known physical size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCircle {
    pub cx: f64,
    pub cy: f64,
}

impl ReferenceCircle {
    /// Radius in canvas units. Constant: never derived from the shoe size.
    pub fn radius() -> f64 {
        REFERENCE_CIRCLE_DIAMETER_CM * CM_TO_UNIT / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.center().distance_to(&p) <= Self::radius()
    }
}

impl Default for ReferenceCircle {
    fn default() -> Self {
        let r = Self::radius();
        Self { cx: r, cy: r }
    }
}

/// All mutable geometry of one editing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryState {
    /// Catalog ids toggled on, in toggle order
    selected_pieces: Vec<String>,
    /// Placed pieces in draw order (last drawn on top)
    pieces: Vec<PiecePosition>,
    guides: Vec<GuidePosition>,
    reference_circle: ReferenceCircle,
    next_guide: u32,
}

impl GeometryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a piece. Enforces a known id, one position per id and the
    /// minimum size.
    pub fn place(&mut self, mut position: PiecePosition) -> solekit_core::Result<()> {
        if !catalog::is_known(&position.id) {
            return Err(DimensionError::UnknownPiece {
                piece_id: position.id,
            }
            .into());
        }
        for (field, value) in [
            ("x", position.x),
            ("y", position.y),
            ("width", position.width),
            ("height", position.height),
            ("rotation", position.rotation),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::InvalidDimension {
                    piece_id: position.id.clone(),
                    field: field.to_string(),
                    value,
                }
                .into());
            }
        }
        if self.piece(&position.id).is_some() {
            return Err(solekit_core::Error::other(format!(
                "piece {} is already placed",
                position.id
            )));
        }
        position.width = position.width.max(MIN_PIECE_SIZE);
        position.height = position.height.max(MIN_PIECE_SIZE);
        if !self.selected_pieces.contains(&position.id) {
            self.selected_pieces.push(position.id.clone());
        }
        self.pieces.push(position);
        Ok(())
    }

    /// Removes a piece's position and its catalog selection.
    pub fn remove(&mut self, piece_id: &str) -> Option<PiecePosition> {
        self.selected_pieces.retain(|id| id != piece_id);
        let idx = self.pieces.iter().position(|p| p.id == piece_id)?;
        Some(self.pieces.remove(idx))
    }

    pub fn piece(&self, piece_id: &str) -> Option<&PiecePosition> {
        self.pieces.iter().find(|p| p.id == piece_id)
    }

    pub fn piece_mut(&mut self, piece_id: &str) -> Option<&mut PiecePosition> {
        self.pieces.iter_mut().find(|p| p.id == piece_id)
    }

    /// Pieces in draw order.
    pub fn pieces(&self) -> &[PiecePosition] {
        &self.pieces
    }

    pub fn pieces_mut(&mut self) -> impl Iterator<Item = &mut PiecePosition> {
        self.pieces.iter_mut()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn selected_pieces(&self) -> &[String] {
        &self.selected_pieces
    }

    pub fn is_selected_in_catalog(&self, piece_id: &str) -> bool {
        self.selected_pieces.iter().any(|id| id == piece_id)
    }

    /// Adds a guide and returns its id.
    pub fn add_guide(&mut self, start: Point, end: Point) -> String {
        self.next_guide += 1;
        let id = format!("guide-{}", self.next_guide);
        self.guides.push(GuidePosition {
            id: id.clone(),
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
        });
        id
    }

    /// Restores a guide with its persisted id.
    pub fn insert_guide(&mut self, guide: GuidePosition) {
        if let Some(n) = guide
            .id
            .strip_prefix("guide-")
            .and_then(|n| n.parse::<u32>().ok())
        {
            self.next_guide = self.next_guide.max(n);
        }
        self.guides.retain(|g| g.id != guide.id);
        self.guides.push(guide);
    }

    pub fn remove_guide(&mut self, guide_id: &str) -> bool {
        let before = self.guides.len();
        self.guides.retain(|g| g.id != guide_id);
        self.guides.len() != before
    }

    pub fn guides(&self) -> &[GuidePosition] {
        &self.guides
    }

    pub fn guide_mut(&mut self, guide_id: &str) -> Option<&mut GuidePosition> {
        self.guides.iter_mut().find(|g| g.id == guide_id)
    }

    pub fn guides_mut(&mut self) -> impl Iterator<Item = &mut GuidePosition> {
        self.guides.iter_mut()
    }

    pub fn reference_circle(&self) -> &ReferenceCircle {
        &self.reference_circle
    }

    pub fn set_reference_circle(&mut self, circle: ReferenceCircle) {
        self.reference_circle = circle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(id: &str, w: f64, h: f64) -> PiecePosition {
        PiecePosition {
            id: id.to_string(),
            x: 100.0,
            y: 200.0,
            width: w,
            height: h,
            rotation: 0.0,
        }
    }

    #[test]
    fn test_place_enforces_invariants() {
        let mut state = GeometryState::new();
        assert!(state.place(pos("heel_lift", 5.0, 60.0)).is_ok());
        assert_eq!(state.piece("heel_lift").map(|p| p.width), Some(MIN_PIECE_SIZE));
        assert!(state.place(pos("heel_lift", 50.0, 60.0)).is_err());
        assert!(state.place(pos("not_in_catalog", 50.0, 60.0)).is_err());
        let mut bad = pos("toe_crest", 50.0, 60.0);
        bad.x = f64::NAN;
        assert!(state.place(bad).is_err());
        assert_eq!(state.piece_count(), 1);
        assert_eq!(state.selected_pieces(), ["heel_lift".to_string()]);
    }

    #[test]
    fn test_remove_clears_catalog_membership() {
        let mut state = GeometryState::new();
        state.place(pos("heel_lift", 50.0, 60.0)).expect("place");
        state.place(pos("toe_crest", 50.0, 60.0)).expect("place");
        assert!(state.remove("heel_lift").is_some());
        assert!(!state.is_selected_in_catalog("heel_lift"));
        assert_eq!(state.piece_count(), 1);
        assert!(state.remove("heel_lift").is_none());
    }

    #[test]
    fn test_rotated_contains() {
        let mut p = pos("heel_lift", 100.0, 20.0);
        assert!(p.contains(Point::new(145.0, 200.0)));
        p.rotation = 90.0;
        assert!(!p.contains(Point::new(145.0, 200.0)));
        assert!(p.contains(Point::new(100.0, 245.0)));
    }

    #[test]
    fn test_corner_follows_rotation() {
        let mut p = pos("heel_lift", 100.0, 40.0);
        let tr = p.corner(Corner::TopRight);
        assert!((tr.x - 150.0).abs() < 1e-9 && (tr.y - 180.0).abs() < 1e-9);
        p.rotation = 180.0;
        let tr = p.corner(Corner::TopRight);
        assert!((tr.x - 50.0).abs() < 1e-9 && (tr.y - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_guides() {
        let mut state = GeometryState::new();
        let id = state.add_guide(Point::new(0.0, 0.0), Point::new(0.0, 100.0));
        assert_eq!(id, "guide-1");
        state.insert_guide(GuidePosition {
            id: "guide-7".to_string(),
            x1: 1.0,
            y1: 2.0,
            x2: 3.0,
            y2: 4.0,
        });
        assert_eq!(state.add_guide(Point::default(), Point::default()), "guide-8");
        assert!(state.remove_guide("guide-1"));
        assert!(!state.remove_guide("guide-1"));
        assert_eq!(state.guides().len(), 2);
    }

    #[test]
    fn test_reference_circle_radius_constant() {
        let r = ReferenceCircle::radius();
        assert!((r * 2.0 / CM_TO_UNIT - 2.5).abs() < 1e-12);
        let c = ReferenceCircle { cx: 10.0, cy: 10.0 };
        assert!(c.contains(Point::new(10.0 + r - 0.5, 10.0)));
        assert!(!c.contains(Point::new(10.0 + r + 1.0, 10.0)));
    }
}
