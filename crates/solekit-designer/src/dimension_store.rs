//! Piece dimension resolution.
//!
//! Resolves each piece's physical dimensions (clinician override or catalog
//! default) and converts them into on-canvas size at a given shoe size.
//!
//! # Fallback rules
//!
//! - A complete, valid override wins.
//! - An incomplete or invalid override is ignored.
//! - A failing override collaborator is logged and ignored.
//!
//! In every case a known piece id resolves to *something*: the catalog
//! default is the floor.

use crate::catalog::{self, CatalogEntry};
use crate::size_model::svg_scale;
use serde::{Deserialize, Serialize};
use solekit_core::{DimensionError, PersistenceError, ShoeSize, ValidationError, CM_TO_UNIT};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use parking_lot::RwLock;

/// Physical dimensions of one piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceDimensions {
    pub id: String,
    pub name: String,
    pub thickness_mm: f64,
    pub width_cm: f64,
    pub depth_cm: f64,
    pub material: String,
    #[serde(default)]
    pub is_complete: bool,
}

impl PieceDimensions {
    /// Catalog default for an entry.
    pub fn from_catalog(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
            thickness_mm: entry.thickness_mm,
            width_cm: entry.width_cm,
            depth_cm: entry.depth_cm,
            material: entry.material.to_string(),
            is_complete: true,
        }
    }

    /// Rejects zero, negative or non-finite dimensions.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let checks = [
            ("width_cm", self.width_cm, false),
            ("depth_cm", self.depth_cm, false),
            ("thickness_mm", self.thickness_mm, true),
        ];
        for (field, value, zero_ok) in checks {
            let bad = !value.is_finite() || value < 0.0 || (!zero_ok && value == 0.0);
            if bad {
                return Err(ValidationError::InvalidDimension {
                    piece_id: self.id.clone(),
                    field: field.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Whether this record may replace the catalog default.
    pub fn is_usable(&self) -> bool {
        self.is_complete && self.validate().is_ok()
    }

    /// Width over depth; invariant across shoe sizes once scaled.
    pub fn aspect_ratio(&self) -> f64 {
        self.width_cm / self.depth_cm
    }
}

/// Source of clinician dimension overrides.
///
/// Implementations return `Ok(None)` when no override exists for an id.
pub trait DimensionOverrides: Send + Sync {
    fn get(&self, piece_id: &str) -> Result<Option<PieceDimensions>, DimensionError>;

    /// Batch lookup. The result may omit ids; callers re-resolve those.
    fn get_multiple(
        &self,
        piece_ids: &[&str],
    ) -> Result<HashMap<String, PieceDimensions>, DimensionError> {
        let mut out = HashMap::new();
        for id in piece_ids {
            if let Some(dims) = self.get(id)? {
                out.insert((*id).to_string(), dims);
            }
        }
        Ok(out)
    }
}

/// Overrides held in memory, editable at runtime.
#[derive(Debug, Default)]
pub struct InMemoryOverrides {
    entries: RwLock<HashMap<String, PieceDimensions>>,
}

impl InMemoryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I: IntoIterator<Item = PieceDimensions>>(entries: I) -> Self {
        let map = entries.into_iter().map(|d| (d.id.clone(), d)).collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Stores a clinician edit. Unknown ids and invalid values are rejected.
    pub fn set_override(&self, dims: PieceDimensions) -> solekit_core::Result<()> {
        if !catalog::is_known(&dims.id) {
            return Err(DimensionError::UnknownPiece { piece_id: dims.id }.into());
        }
        dims.validate()?;
        self.entries.write().insert(dims.id.clone(), dims);
        Ok(())
    }

    pub fn clear_override(&self, piece_id: &str) -> bool {
        self.entries.write().remove(piece_id).is_some()
    }

    /// All overrides, sorted by id.
    pub fn snapshot(&self) -> Vec<PieceDimensions> {
        let mut list: Vec<_> = self.entries.read().values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }
}

impl DimensionOverrides for InMemoryOverrides {
    fn get(&self, piece_id: &str) -> Result<Option<PieceDimensions>, DimensionError> {
        Ok(self.entries.read().get(piece_id).cloned())
    }

    fn get_multiple(
        &self,
        piece_ids: &[&str],
    ) -> Result<HashMap<String, PieceDimensions>, DimensionError> {
        let entries = self.entries.read();
        Ok(piece_ids
            .iter()
            .filter_map(|id| entries.get(*id).map(|d| ((*id).to_string(), d.clone())))
            .collect())
    }
}

/// Overrides read from a JSON array of [`PieceDimensions`].
#[derive(Debug)]
pub struct JsonFileOverrides {
    path: PathBuf,
    inner: InMemoryOverrides,
}

impl JsonFileOverrides {
    /// Loads the file; a missing file means no overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let entries: Vec<PieceDimensions> = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), count = entries.len(), "Loaded dimension overrides");
        Ok(Self {
            path,
            inner: InMemoryOverrides::with_entries(entries),
        })
    }

    pub fn overrides(&self) -> &InMemoryOverrides {
        &self.inner
    }

    /// Writes the current overrides back to the file.
    pub fn save(&self) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.inner.snapshot())?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl DimensionOverrides for JsonFileOverrides {
    fn get(&self, piece_id: &str) -> Result<Option<PieceDimensions>, DimensionError> {
        self.inner.get(piece_id)
    }

    fn get_multiple(
        &self,
        piece_ids: &[&str],
    ) -> Result<HashMap<String, PieceDimensions>, DimensionError> {
        self.inner.get_multiple(piece_ids)
    }
}

/// Piece size on the canvas at one shoe size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RealScale {
    pub width: f64,
    pub height: f64,
    pub svg_scale: f64,
}

/// `width = dims.width * CM_TO_UNIT * svg_scale`, likewise for depth.
///
/// Stored dimensions are nominal: a piece prints at `width_cm * svg_scale`
/// centimeters, so it follows the foot rather than staying 1:1. Both axes use the same factor, so the ratio of a piece never depends on
/// the shoe size.
pub fn calculate_real_scale(size: ShoeSize, dims: &PieceDimensions) -> RealScale {
    let scale = svg_scale(size);
    RealScale {
        width: dims.width_cm * CM_TO_UNIT * scale,
        height: dims.depth_cm * CM_TO_UNIT * scale,
        svg_scale: scale,
    }
}

/// Resolves piece dimensions from overrides with catalog fallback.
pub struct DimensionStore {
    overrides: Box<dyn DimensionOverrides>,
}

impl Default for DimensionStore {
    fn default() -> Self {
        Self::new(InMemoryOverrides::new())
    }
}

impl std::fmt::Debug for DimensionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DimensionStore").finish_non_exhaustive()
    }
}

impl DimensionStore {
    pub fn new(overrides: impl DimensionOverrides + 'static) -> Self {
        Self {
            overrides: Box::new(overrides),
        }
    }

    /// Catalog defaults only.
    pub fn catalog_only() -> Self {
        Self::default()
    }

    /// Dimensions for a known piece: a usable override, else the default.
    pub fn get_dimensions(&self, piece_id: &str) -> Result<PieceDimensions, DimensionError> {
        let entry = catalog::entry(piece_id).ok_or_else(|| DimensionError::UnknownPiece {
            piece_id: piece_id.to_string(),
        })?;

        match self.overrides.get(piece_id) {
            Ok(Some(dims)) => Ok(accept_or_default(entry, dims)),
            Ok(None) => Ok(PieceDimensions::from_catalog(entry)),
            Err(e) => {
                tracing::warn!(piece_id, error = %e, "Override lookup failed, using catalog default");
                Ok(PieceDimensions::from_catalog(entry))
            }
        }
    }

    /// Batch lookup; ids missing from the batch are resolved one by one.
    /// Unknown ids are skipped with a warning.
    pub fn get_multiple(&self, piece_ids: &[&str]) -> HashMap<String, PieceDimensions> {
        let known: Vec<&str> = piece_ids
            .iter()
            .copied()
            .filter(|id| {
                let ok = catalog::is_known(id);
                if !ok {
                    tracing::warn!(piece_id = *id, "Ignoring unknown piece id");
                }
                ok
            })
            .collect();

        let mut batch = match self.overrides.get_multiple(&known) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(error = %e, "Batch override lookup failed, resolving individually");
                HashMap::new()
            }
        };

        let mut out = HashMap::with_capacity(known.len());
        for id in known {
            let resolved = match (batch.remove(id), catalog::entry(id)) {
                (Some(dims), Some(entry)) => Some(accept_or_default(entry, dims)),
                _ => self.get_dimensions(id).ok(),
            };
            if let Some(dims) = resolved {
                out.insert(id.to_string(), dims);
            }
        }
        out
    }

    /// Resolved dimensions scaled to the canvas at `size`.
    pub fn real_scale(&self, size: ShoeSize, piece_id: &str) -> Result<RealScale, DimensionError> {
        let dims = self.get_dimensions(piece_id)?;
        Ok(calculate_real_scale(size, &dims))
    }
}

fn accept_or_default(entry: &CatalogEntry, dims: PieceDimensions) -> PieceDimensions {
    if dims.is_usable() {
        dims
    } else {
        tracing::warn!(
            piece_id = entry.id,
            complete = dims.is_complete,
            "Override incomplete or invalid, using catalog default"
        );
        PieceDimensions::from_catalog(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(id: &str, width: f64, depth: f64, complete: bool) -> PieceDimensions {
        PieceDimensions {
            id: id.to_string(),
            name: "Custom".to_string(),
            thickness_mm: 4.0,
            width_cm: width,
            depth_cm: depth,
            material: "EVA".to_string(),
            is_complete: complete,
        }
    }

    struct FailingOverrides;

    impl DimensionOverrides for FailingOverrides {
        fn get(&self, piece_id: &str) -> Result<Option<PieceDimensions>, DimensionError> {
            Err(DimensionError::LookupFailed {
                piece_id: piece_id.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    /// Batch lookup that silently drops every id.
    struct LossyBatch(InMemoryOverrides);

    impl DimensionOverrides for LossyBatch {
        fn get(&self, piece_id: &str) -> Result<Option<PieceDimensions>, DimensionError> {
            self.0.get(piece_id)
        }

        fn get_multiple(
            &self,
            _piece_ids: &[&str],
        ) -> Result<HashMap<String, PieceDimensions>, DimensionError> {
            Ok(HashMap::new())
        }
    }

    #[test]
    fn test_default_when_no_override() {
        let store = DimensionStore::catalog_only();
        let d = store.get_dimensions("heel_lift").expect("known piece");
        assert_eq!(d.width_cm, 5.5);
        assert_eq!(d.depth_cm, 7.0);
        assert!(d.is_complete);
    }

    #[test]
    fn test_complete_override_wins() {
        let store = DimensionStore::new(InMemoryOverrides::with_entries([dims(
            "heel_lift",
            8.0,
            12.0,
            true,
        )]));
        let d = store.get_dimensions("heel_lift").expect("known piece");
        assert_eq!((d.width_cm, d.depth_cm), (8.0, 12.0));
    }

    #[test]
    fn test_incomplete_override_falls_back() {
        let store = DimensionStore::new(InMemoryOverrides::with_entries([dims(
            "heel_lift",
            8.0,
            12.0,
            false,
        )]));
        assert_eq!(store.get_dimensions("heel_lift").map(|d| d.width_cm), Ok(5.5));
    }

    #[test]
    fn test_invalid_override_falls_back() {
        let store = DimensionStore::new(InMemoryOverrides::with_entries([dims(
            "heel_lift",
            -1.0,
            12.0,
            true,
        )]));
        assert_eq!(store.get_dimensions("heel_lift").map(|d| d.width_cm), Ok(5.5));
    }

    #[test]
    fn test_failing_collaborator_falls_back() {
        let store = DimensionStore::new(FailingOverrides);
        assert_eq!(store.get_dimensions("toe_crest").map(|d| d.width_cm), Ok(6.0));
        let batch = store.get_multiple(&["toe_crest", "heel_lift"]);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_unknown_piece_is_an_error() {
        let store = DimensionStore::catalog_only();
        assert!(matches!(
            store.get_dimensions("flux_capacitor"),
            Err(DimensionError::UnknownPiece { .. })
        ));
    }

    #[test]
    fn test_batch_reresolves_missing_ids() {
        let inner = InMemoryOverrides::with_entries([dims("toe_crest", 7.0, 2.5, true)]);
        let store = DimensionStore::new(LossyBatch(inner));
        let batch = store.get_multiple(&["toe_crest", "heel_lift", "nope"]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch["toe_crest"].width_cm, 7.0);
        assert_eq!(batch["heel_lift"].width_cm, 5.5);
    }

    #[test]
    fn test_set_override_validates() {
        let overrides = InMemoryOverrides::new();
        assert!(overrides.set_override(dims("unknown", 1.0, 1.0, true)).is_err());
        assert!(overrides.set_override(dims("heel_lift", 0.0, 1.0, true)).is_err());
        assert!(overrides.set_override(dims("heel_lift", 6.0, 8.0, true)).is_ok());
        assert_eq!(overrides.snapshot().len(), 1);
        assert!(overrides.clear_override("heel_lift"));
        assert!(overrides.snapshot().is_empty());
    }

    #[test]
    fn test_overrides_shared_across_threads() {
        let overrides = std::sync::Arc::new(InMemoryOverrides::new());
        let ids = ["heel_lift", "toe_crest", "morton_extension", "heel_spur_pad"];
        let handles: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let overrides = std::sync::Arc::clone(&overrides);
                let record = dims(id, 3.0 + i as f64, 6.0, true);
                std::thread::spawn(move || overrides.set_override(record))
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread").expect("valid override");
        }

        let all = overrides.snapshot();
        assert_eq!(all.len(), ids.len());
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
        assert!(overrides.clear_override("toe_crest"));
        assert!(!overrides.clear_override("toe_crest"));
        assert_eq!(overrides.get("toe_crest"), Ok(None));
    }

    #[test]
    fn test_real_scale_reference_piece() {
        let size = ShoeSize::new(41).expect("size");
        let piece = dims("heel_lift", 8.0, 12.0, true);
        let real = calculate_real_scale(size, &piece);
        assert!((real.width / real.height - 8.0 / 12.0).abs() < 1e-9);
        // 27.3 cm foot over an 800 unit outline.
        let expected_scale = 27.3 * CM_TO_UNIT / 800.0;
        assert!((real.svg_scale - expected_scale).abs() < 1e-12);
        assert!((real.width - 8.0 * CM_TO_UNIT * expected_scale).abs() < 1e-9);
    }

    #[test]
    fn test_json_file_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("overrides.json");

        let missing = JsonFileOverrides::load(&path).expect("missing file is empty");
        assert!(missing.overrides().snapshot().is_empty());

        missing
            .overrides()
            .set_override(dims("morton_extension", 3.5, 7.0, true))
            .expect("valid override");
        missing.save().expect("save");

        let reloaded = JsonFileOverrides::load(&path).expect("reload");
        let store = DimensionStore::new(reloaded);
        let d = store.get_dimensions("morton_extension").expect("known");
        assert_eq!((d.width_cm, d.depth_cm), (3.5, 7.0));
    }
}
