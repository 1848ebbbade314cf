//! Built-in piece catalog and reference insole outline.
//!
//! The catalog is static data: every piece a clinician can place, with its
//! default physical dimensions, drawing shape and default placement inside
//! the outline. Clinician edits never modify this table; they are layered on
//! top by the dimension store.

use solekit_core::{Bounds, FootSide, Point};

/// Height of the reference outline in its authored frame, in canvas units.
///
/// The size model maps this height onto the patient's true foot length.
pub const REFERENCE_OUTLINE_HEIGHT: f64 = 800.0;

/// Width of the reference outline in its authored frame, in canvas units.
pub const REFERENCE_OUTLINE_WIDTH: f64 = 300.0;

/// Horizontal correction applied on top of the vertical scale so the printed
/// outline keeps its intended silhouette. The outline is authored at its
/// clinical proportions, so the correction is neutral.
pub const BASE_ASPECT_RATIO: f64 = 1.0;

/// How a piece is drawn inside its width x height box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceShape {
    Rectangle,
    Ellipse,
    /// Rounded front, tapering towards the heel (metatarsal pads)
    Teardrop,
    /// Trapezoid, wide at the bottom
    Wedge,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub thickness_mm: f64,
    pub width_cm: f64,
    pub depth_cm: f64,
    pub material: &'static str,
    pub shape: PieceShape,
    /// Default center as fractions of the left outline's width and height.
    pub placement: (f64, f64),
}

const BUILTIN: &[CatalogEntry] = &[
    CatalogEntry {
        id: "metatarsal_pad",
        name: "Metatarsal pad",
        thickness_mm: 5.0,
        width_cm: 4.5,
        depth_cm: 6.0,
        material: "EVA 35 Shore A",
        shape: PieceShape::Teardrop,
        placement: (0.50, 0.33),
    },
    CatalogEntry {
        id: "medial_arch_support",
        name: "Medial arch support",
        thickness_mm: 8.0,
        width_cm: 3.5,
        depth_cm: 10.0,
        material: "EVA 50 Shore A",
        shape: PieceShape::Ellipse,
        placement: (0.72, 0.55),
    },
    CatalogEntry {
        id: "lateral_wedge",
        name: "Lateral wedge",
        thickness_mm: 4.0,
        width_cm: 2.5,
        depth_cm: 12.0,
        material: "Cork",
        shape: PieceShape::Wedge,
        placement: (0.22, 0.62),
    },
    CatalogEntry {
        id: "heel_lift",
        name: "Heel lift",
        thickness_mm: 6.0,
        width_cm: 5.5,
        depth_cm: 7.0,
        material: "Cork",
        shape: PieceShape::Rectangle,
        placement: (0.50, 0.86),
    },
    CatalogEntry {
        id: "heel_spur_pad",
        name: "Heel spur pad",
        thickness_mm: 3.0,
        width_cm: 3.0,
        depth_cm: 3.0,
        material: "Poron",
        shape: PieceShape::Ellipse,
        placement: (0.50, 0.88),
    },
    CatalogEntry {
        id: "toe_crest",
        name: "Toe crest",
        thickness_mm: 6.0,
        width_cm: 6.0,
        depth_cm: 2.0,
        material: "Silicone",
        shape: PieceShape::Ellipse,
        placement: (0.45, 0.18),
    },
    CatalogEntry {
        id: "morton_extension",
        name: "Morton extension",
        thickness_mm: 2.0,
        width_cm: 3.0,
        depth_cm: 6.5,
        material: "Carbon fibre",
        shape: PieceShape::Rectangle,
        placement: (0.70, 0.17),
    },
    CatalogEntry {
        id: "cuboid_support",
        name: "Cuboid support",
        thickness_mm: 5.0,
        width_cm: 3.0,
        depth_cm: 4.0,
        material: "EVA 50 Shore A",
        shape: PieceShape::Teardrop,
        placement: (0.25, 0.66),
    },
];

/// All catalog entries in display order.
pub fn entries() -> &'static [CatalogEntry] {
    BUILTIN
}

/// Looks up a catalog entry by id.
pub fn entry(id: &str) -> Option<&'static CatalogEntry> {
    BUILTIN.iter().find(|e| e.id == id)
}

pub fn is_known(id: &str) -> bool {
    entry(id).is_some()
}

impl CatalogEntry {
    /// Default center as fractions of the outline frame for `side`.
    ///
    /// The right outline mirrors the left one, so placements mirror too.
    pub fn placement_for(&self, side: FootSide) -> (f64, f64) {
        match side {
            FootSide::Left => self.placement,
            FootSide::Right => (1.0 - self.placement.0, self.placement.1),
        }
    }
}

/// Outline path command in the authored frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    CubicTo(Point, Point, Point),
    Close,
}

const fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Left insole, toe at the top, big toe on the right.
const LEFT_OUTLINE: &[PathCmd] = &[
    PathCmd::MoveTo(p(190.0, 0.0)),
    PathCmd::CubicTo(p(250.0, 0.0), p(290.0, 60.0), p(295.0, 150.0)),
    PathCmd::CubicTo(p(300.0, 260.0), p(280.0, 330.0), p(265.0, 420.0)),
    PathCmd::CubicTo(p(250.0, 510.0), p(245.0, 600.0), p(245.0, 680.0)),
    PathCmd::CubicTo(p(245.0, 760.0), p(200.0, 800.0), p(150.0, 800.0)),
    PathCmd::CubicTo(p(95.0, 800.0), p(55.0, 760.0), p(55.0, 690.0)),
    PathCmd::CubicTo(p(55.0, 600.0), p(40.0, 520.0), p(20.0, 430.0)),
    PathCmd::CubicTo(p(0.0, 330.0), p(5.0, 220.0), p(30.0, 140.0)),
    PathCmd::CubicTo(p(60.0, 50.0), p(120.0, 0.0), p(190.0, 0.0)),
    PathCmd::Close,
];

/// The insole outline for one foot side.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub side: FootSide,
    commands: Vec<PathCmd>,
}

impl Outline {
    pub fn for_side(side: FootSide) -> Self {
        let commands = match side {
            FootSide::Left => LEFT_OUTLINE.to_vec(),
            FootSide::Right => LEFT_OUTLINE.iter().map(mirror_cmd).collect(),
        };
        Self { side, commands }
    }

    /// Authored frame of the outline; the size model scales this box.
    pub fn local_bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, REFERENCE_OUTLINE_WIDTH, REFERENCE_OUTLINE_HEIGHT)
    }

    pub fn local_center(&self) -> Point {
        self.local_bounds().center()
    }

    pub fn base_aspect_ratio(&self) -> f64 {
        BASE_ASPECT_RATIO
    }

    pub fn commands(&self) -> &[PathCmd] {
        &self.commands
    }

    /// SVG path data in the authored frame.
    pub fn to_svg_path(&self) -> String {
        let mut d = String::new();
        for cmd in &self.commands {
            match cmd {
                PathCmd::MoveTo(pt) => d.push_str(&format!("M {} {} ", pt.x, pt.y)),
                PathCmd::CubicTo(c1, c2, pt) => d.push_str(&format!(
                    "C {} {} {} {} {} {} ",
                    c1.x, c1.y, c2.x, c2.y, pt.x, pt.y
                )),
                PathCmd::Close => d.push('Z'),
            }
        }
        d.trim_end().to_string()
    }
}

fn mirror_point(pt: Point) -> Point {
    Point::new(REFERENCE_OUTLINE_WIDTH - pt.x, pt.y)
}

fn mirror_cmd(cmd: &PathCmd) -> PathCmd {
    match *cmd {
        PathCmd::MoveTo(pt) => PathCmd::MoveTo(mirror_point(pt)),
        PathCmd::CubicTo(c1, c2, pt) => {
            PathCmd::CubicTo(mirror_point(c1), mirror_point(c2), mirror_point(pt))
        }
        PathCmd::Close => PathCmd::Close,
    }
}
