//! Standalone SVG page writer for print output.
//!
//! The page is declared in millimeters and carries a `viewBox` in canvas
//! units, so one canvas unit prints as exactly 1/96 inch.

use crate::catalog::PieceShape;
use solekit_core::{Affine2, PageFormat};
use std::fmt::Write as _;

const OUTLINE_STYLE: &str = "fill:none;stroke:#000000;stroke-width:1.5";
const PIECE_STYLE: &str = "fill:#d9d9d9;fill-opacity:0.6;stroke:#333333;stroke-width:1";
const CIRCLE_STYLE: &str = "fill:none;stroke:#000000;stroke-width:1";

/// Formats a number with at most four decimals and no trailing zeros.
pub fn fmt_num(v: f64) -> String {
    let s = format!("{:.4}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// `matrix(a b c d e f)` for an SVG `transform` attribute.
pub fn matrix_attr(m: &Affine2) -> String {
    let [a, b, c, d, e, f] = m.to_svg_matrix();
    format!(
        "matrix({} {} {} {} {} {})",
        fmt_num(a),
        fmt_num(b),
        fmt_num(c),
        fmt_num(d),
        fmt_num(e),
        fmt_num(f)
    )
}

/// SVG element drawing `shape` in a `width` x `height` box centered on the
/// origin.
pub fn shape_element(shape: PieceShape, width: f64, height: f64, attrs: &str) -> String {
    let hw = width / 2.0;
    let hh = height / 2.0;
    match shape {
        PieceShape::Rectangle => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" {attrs}/>"#,
            fmt_num(-hw),
            fmt_num(-hh),
            fmt_num(width),
            fmt_num(height)
        ),
        PieceShape::Ellipse => format!(
            r#"<ellipse cx="0" cy="0" rx="{}" ry="{}" {attrs}/>"#,
            fmt_num(hw),
            fmt_num(hh)
        ),
        PieceShape::Teardrop => {
            let shoulder = height / 6.0;
            format!(
                r#"<path d="M 0 {hh} C {hw} {sh} {hw} {nhh} 0 {nhh} C {nhw} {nhh} {nhw} {sh} 0 {hh} Z" {attrs}/>"#,
                hh = fmt_num(hh),
                nhh = fmt_num(-hh),
                hw = fmt_num(hw),
                nhw = fmt_num(-hw),
                sh = fmt_num(shoulder),
            )
        }
        PieceShape::Wedge => {
            let top = width * 0.3;
            format!(
                r#"<path d="M {} {} L {} {} L {} {} L {} {} Z" {attrs}/>"#,
                fmt_num(-top),
                fmt_num(-hh),
                fmt_num(top),
                fmt_num(-hh),
                fmt_num(hw),
                fmt_num(hh),
                fmt_num(-hw),
                fmt_num(hh)
            )
        }
    }
}

/// Incremental builder for one printed page.
#[derive(Debug, Clone)]
pub struct SvgDocumentBuilder {
    page: PageFormat,
    body: String,
}

impl SvgDocumentBuilder {
    pub fn new(page: PageFormat) -> Self {
        Self {
            page,
            body: String::new(),
        }
    }

    /// Adds the insole outline with its full print transform.
    pub fn outline(&mut self, path_data: &str, transform: &Affine2) -> &mut Self {
        let _ = writeln!(
            self.body,
            r#"  <path id="outline" d="{}" transform="{}" style="{}"/>"#,
            path_data,
            matrix_attr(transform),
            OUTLINE_STYLE
        );
        self
    }

    /// Adds one piece, drawn centered on the origin, under `transform`.
    pub fn piece(
        &mut self,
        piece_id: &str,
        shape: PieceShape,
        width: f64,
        height: f64,
        transform: &Affine2,
    ) -> &mut Self {
        let attrs = format!(r#"style="{}""#, PIECE_STYLE);
        let _ = writeln!(
            self.body,
            r#"  <g id="piece-{}" transform="{}">{}</g>"#,
            piece_id,
            matrix_attr(transform),
            shape_element(shape, width, height, &attrs)
        );
        self
    }

    /// Adds the unrotated calibration circle.
    pub fn calibration_circle(&mut self, cx: f64, cy: f64, r: f64) -> &mut Self {
        let _ = writeln!(
            self.body,
            r#"  <circle id="calibration" cx="{}" cy="{}" r="{}" style="{}"/>"#,
            fmt_num(cx),
            fmt_num(cy),
            fmt_num(r),
            CIRCLE_STYLE
        );
        self
    }

    pub fn build(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                "\n",
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}mm" height="{}mm" viewBox="0 0 {} {}">"#,
                "\n{}</svg>\n"
            ),
            fmt_num(self.page.width_mm()),
            fmt_num(self.page.height_mm()),
            fmt_num(self.page.width_units()),
            fmt_num(self.page.height_units()),
            self.body
        )
    }
}
