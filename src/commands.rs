//! Command implementations behind the `solekit` binary.

use anyhow::{Context, Result};
use serde::Serialize;
use solekit_core::{FootSide, PageFormat, ShoeSize};
use solekit_designer::{
    catalog, compose, dispatch_print, foot_length_cm, print_scale, rotation_fit, svg_scale,
    DimensionStore, EditorSession, FilePrintSurface, JsonFileOverrides, JsonFileSessionStore,
    Outline, PrintConfig, PrintDocument, SessionSnapshot, SessionStore,
};
use solekit_settings::Config;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Loads `path` if given, else the default location, else built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match Config::default_path() {
            Ok(default) => Config::load_or_default(&default)
                .with_context(|| format!("Failed to load config {}", default.display())),
            Err(e) => {
                tracing::warn!(error = %e, "No config location, using defaults");
                Ok(Config::default())
            }
        },
    }
}

/// Dimension store backed by the configured overrides file, if any.
pub fn dimension_store(config: &Config) -> Result<DimensionStore> {
    match &config.storage.overrides_file {
        Some(path) => {
            let overrides = JsonFileOverrides::load(path)
                .with_context(|| format!("Failed to read overrides {}", path.display()))?;
            Ok(DimensionStore::new(overrides))
        }
        None => Ok(DimensionStore::catalog_only()),
    }
}

/// Where the session to print comes from.
#[derive(Debug, Clone)]
pub enum SessionSource {
    File(PathBuf),
    Stored { patient_id: String, side: FootSide },
}

/// Summary of one `size` query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeReport {
    pub shoe_size: i32,
    pub foot_length_cm: f64,
    pub svg_scale: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub outline_width: f64,
    pub outline_height: f64,
    pub cosmetic_angle: f64,
    pub final_rotation: f64,
    pub fits: bool,
    pub overflow: f64,
}

pub fn size_report(size: ShoeSize, side: FootSide, config: &Config) -> SizeReport {
    let outline = Outline::for_side(side);
    let scale = print_scale(size, &outline, config.print.page);
    let (w, h) = scale.scaled_extent(&outline);
    let (a, b) = config.print.page.usable_area(config.print.margin_units);
    let fit = rotation_fit::solve(size, w, h, a, b);

    SizeReport {
        shoe_size: size.value(),
        foot_length_cm: foot_length_cm(size),
        svg_scale: svg_scale(size),
        scale_x: scale.scale_x,
        scale_y: scale.scale_y,
        outline_width: w,
        outline_height: h,
        cosmetic_angle: fit.cosmetic_angle,
        final_rotation: fit.final_rotation,
        fits: fit.fits,
        overflow: fit.overflow,
    }
}

/// One catalog line with dimensions resolved at a size.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogLine {
    pub id: String,
    pub name: String,
    pub width_cm: f64,
    pub depth_cm: f64,
    pub thickness_mm: f64,
    pub material: String,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

pub fn catalog_report(size: ShoeSize, store: &DimensionStore) -> Vec<CatalogLine> {
    let ids: Vec<&str> = catalog::entries().iter().map(|e| e.id).collect();
    let resolved = store.get_multiple(&ids);

    ids.iter()
        .filter_map(|id| resolved.get(*id))
        .map(|dims| {
            let real = solekit_designer::calculate_real_scale(size, dims);
            CatalogLine {
                id: dims.id.clone(),
                name: dims.name.clone(),
                width_cm: dims.width_cm,
                depth_cm: dims.depth_cm,
                thickness_mm: dims.thickness_mm,
                material: dims.material.clone(),
                canvas_width: real.width,
                canvas_height: real.height,
            }
        })
        .collect()
}

/// Reads a snapshot file written by a session store.
pub fn read_snapshot(path: &Path) -> Result<SessionSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session {}", path.display()))
}

/// Loads a session, composes its page and writes it to `output`.
pub async fn print_session(
    source: SessionSource,
    output: &Path,
    config: &Config,
) -> Result<PrintDocument> {
    let dimensions = dimension_store(config)?;

    let session = match source {
        SessionSource::File(path) => {
            let snapshot = read_snapshot(&path)?;
            let patient_id = snapshot.patient_id.clone();
            let side = snapshot.foot_side;
            EditorSession::from_snapshot(
                Some(snapshot),
                &patient_id,
                side,
                &dimensions,
                config.editor.clone(),
            )
        }
        SessionSource::Stored { patient_id, side } => {
            let store = JsonFileSessionStore::new(&config.storage.sessions_dir);
            let snapshot = store
                .load_by_patient_and_side(&patient_id, side)
                .await
                .with_context(|| format!("Failed to load session for {} ({})", patient_id, side))?
                .with_context(|| format!("No saved session for {} ({})", patient_id, side))?;
            EditorSession::from_snapshot(
                Some(snapshot),
                &patient_id,
                side,
                &dimensions,
                config.editor.clone(),
            )
        }
    };

    let request = PrintConfig::from_state(session.state(), &config.print);
    let document = compose(&request).context("Print request rejected")?;

    let settle = Duration::from_millis(config.print.settle_delay_ms);
    dispatch_print(FilePrintSurface::new(output), document.svg.clone(), settle)
        .await
        .context("Print task did not complete")?
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(document)
}

/// Page size in millimeters, for display.
pub fn page_label(page: PageFormat) -> String {
    format!("A4 {}x{} mm", page.width_mm(), page.height_mm())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_report_reference_size() {
        let report = size_report(ShoeSize::default(), FootSide::Left, &Config::default());
        assert_eq!(report.shoe_size, 41);
        assert!((report.foot_length_cm - 27.3).abs() < 1e-12);
        assert!(report.final_rotation >= report.cosmetic_angle);
    }

    #[test]
    fn test_catalog_report_lists_every_piece() {
        let lines = catalog_report(ShoeSize::default(), &DimensionStore::catalog_only());
        assert_eq!(lines.len(), catalog::entries().len());
        assert!(lines.iter().all(|l| l.canvas_width > 0.0 && l.canvas_height > 0.0));
    }

    #[test]
    fn test_page_label() {
        assert_eq!(page_label(PageFormat::A4), "A4 210x297 mm");
    }
}
