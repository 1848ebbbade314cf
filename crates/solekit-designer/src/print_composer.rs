//! Print composition
//!
//! Turns an editing session into a page. The outline prints at the patient's
//! foot length; only rotation is used to fit the printable area.
//!
//! Outline transform, applied right to left:
//!
//! ```text
//! T(page_center) . R(final_rotation) . S(scale_x, scale_y) . T(-outline_local_center)
//! ```
//!
//! Each piece gets the same page placement and rotation, then its own offset
//! and rotation, and no scale: its width and height already carry the size's
//! svg scale.

use crate::catalog::{self, Outline};
use crate::geometry_state::{PiecePosition, ReferenceCircle};
use crate::interaction::EditorState;
use crate::rotation_fit::{self, RotationFit};
use crate::size_model::print_scale;
use crate::svg_document::SvgDocumentBuilder;
use serde::Serialize;
use solekit_core::units::mm_to_units;
use solekit_core::{Affine2, FootSide, PageFormat, ShoeSize, ValidationError};
use solekit_settings::PrintSettings;

/// Distance of the calibration circle from the page edges, in millimeters.
const CALIBRATION_INSET_MM: f64 = 5.0;

/// Raw print request, as it arrives from a form or a session file.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintConfig {
    pub shoe_size: Option<String>,
    pub foot_side: Option<String>,
    pub pieces: Vec<PiecePosition>,
    pub margin: f64,
    pub include_calibration_circle: bool,
    pub page: PageFormat,
}

impl PrintConfig {
    /// Print request for the current editor state.
    pub fn from_state(state: &EditorState, settings: &PrintSettings) -> Self {
        Self {
            shoe_size: Some(state.shoe_size.to_string()),
            foot_side: Some(state.foot_side.to_string()),
            pieces: state.geometry.pieces().to_vec(),
            margin: settings.margin_units,
            include_calibration_circle: settings.include_calibration_circle,
            page: settings.page,
        }
    }
}

/// A print request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintRequest {
    pub shoe_size: ShoeSize,
    pub foot_side: FootSide,
    pub pieces: Vec<PiecePosition>,
    pub margin: f64,
    pub include_calibration_circle: bool,
    pub page: PageFormat,
}

/// Checks a raw request. Never panics; the first problem found is returned.
pub fn validate(config: &PrintConfig) -> Result<PrintRequest, ValidationError> {
    let shoe_size = match config.shoe_size.as_deref() {
        None => return Err(ValidationError::MissingShoeSize),
        Some(raw) if raw.trim().is_empty() => return Err(ValidationError::MissingShoeSize),
        Some(raw) => ShoeSize::parse(raw)?,
    };
    let foot_side = match config.foot_side.as_deref() {
        None => return Err(ValidationError::MissingFootSide),
        Some(raw) => raw.parse::<FootSide>()?,
    };

    let mut pieces = Vec::with_capacity(config.pieces.len());
    for piece in &config.pieces {
        if !catalog::is_known(&piece.id) {
            tracing::warn!(piece_id = %piece.id, "Skipping unknown piece in print request");
            continue;
        }
        for (field, value) in [("width", piece.width), ("height", piece.height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::InvalidDimension {
                    piece_id: piece.id.clone(),
                    field: field.to_string(),
                    value,
                });
            }
        }
        for (field, value) in [("x", piece.x), ("y", piece.y), ("rotation", piece.rotation)] {
            if !value.is_finite() {
                return Err(ValidationError::InvalidDimension {
                    piece_id: piece.id.clone(),
                    field: field.to_string(),
                    value,
                });
            }
        }
        pieces.push(piece.clone());
    }

    if !config.margin.is_finite() || config.margin < 0.0 {
        return Err(ValidationError::InvalidDimension {
            piece_id: "page".to_string(),
            field: "margin".to_string(),
            value: config.margin,
        });
    }

    Ok(PrintRequest {
        shoe_size,
        foot_side,
        pieces,
        margin: config.margin,
        include_calibration_circle: config.include_calibration_circle,
        page: config.page,
    })
}

/// The final outline transform in decomposed form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl PrintTransform {
    /// Page placement shared by the outline and the pieces.
    pub fn placement(&self) -> Affine2 {
        Affine2::translation(self.translate_x, self.translate_y)
            .then(&Affine2::rotation(self.rotation))
    }

    /// Full outline matrix for an outline whose authored center is `local_center`.
    pub fn outline_matrix(&self, outline: &Outline) -> Affine2 {
        let c = outline.local_center();
        self.placement()
            .then(&Affine2::scaling(self.scale_x, self.scale_y))
            .then(&Affine2::translation(-c.x, -c.y))
    }

    /// Matrix for a piece in the outline frame of size `frame` (`W`, `H`).
    pub fn piece_matrix(&self, piece: &PiecePosition, frame: (f64, f64)) -> Affine2 {
        let (w, h) = frame;
        self.placement()
            .then(&Affine2::translation(piece.x - w / 2.0, piece.y - h / 2.0))
            .then(&Affine2::rotation(piece.rotation))
    }
}

/// A composed page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintDocument {
    pub shoe_size: ShoeSize,
    pub foot_side: FootSide,
    pub transform: PrintTransform,
    pub fit: RotationFit,
    /// Scaled outline size before rotation
    pub outline_extent: (f64, f64),
    pub page: PageFormat,
    #[serde(skip)]
    pub svg: String,
}

/// Validates and composes in one step.
pub fn compose(config: &PrintConfig) -> Result<PrintDocument, ValidationError> {
    let request = validate(config)?;
    Ok(compose_request(&request))
}

/// Composes a validated request. Infallible.
pub fn compose_request(request: &PrintRequest) -> PrintDocument {
    let outline = Outline::for_side(request.foot_side);
    let scale = print_scale(request.shoe_size, &outline, request.page);
    let (w, h) = scale.scaled_extent(&outline);
    let (a, b) = request.page.usable_area(request.margin);
    let fit = rotation_fit::solve(request.shoe_size, w, h, a, b);
    let (cx, cy) = request.page.center();

    let transform = PrintTransform {
        translate_x: cx,
        translate_y: cy,
        rotation: fit.final_rotation,
        scale_x: scale.scale_x,
        scale_y: scale.scale_y,
    };

    let mut svg = SvgDocumentBuilder::new(request.page);
    svg.outline(&outline.to_svg_path(), &transform.outline_matrix(&outline));
    for piece in &request.pieces {
        if let Some(entry) = catalog::entry(&piece.id) {
            svg.piece(
                &piece.id,
                entry.shape,
                piece.width,
                piece.height,
                &transform.piece_matrix(piece, (w, h)),
            );
        }
    }
    if request.include_calibration_circle {
        let r = ReferenceCircle::radius();
        let inset = mm_to_units(CALIBRATION_INSET_MM);
        svg.calibration_circle(inset + r, inset + r, r);
    }

    tracing::info!(
        size = request.shoe_size.value(),
        side = %request.foot_side,
        pieces = request.pieces.len(),
        rotation = fit.final_rotation,
        fits = fit.fits,
        "Composed print page"
    );

    PrintDocument {
        shoe_size: request.shoe_size,
        foot_side: request.foot_side,
        transform,
        fit,
        outline_extent: (w, h),
        page: request.page,
        svg: svg.build(),
    }
}
