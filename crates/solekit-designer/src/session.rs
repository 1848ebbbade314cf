//! Editing sessions and their persistence.
//!
//! A session is saved only on an explicit request. Saves run on tokio in the
//! background and report back through [`Notification`]; a failed save or
//! load never touches the in-memory geometry.

use crate::dimension_store::DimensionStore;
use crate::geometry_state::{GeometryState, GuidePosition, PiecePosition, ReferenceCircle};
use crate::interaction::{EditorEvent, EditorState, InteractionController, Transition};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use solekit_core::{FootSide, PersistenceError, ShoeSize};
use solekit_settings::EditorSettings;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};

/// Persisted form of one patient's session for one foot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Opaque id assigned by the store on first save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_id: String,
    pub foot_side: FootSide,
    /// Stored raw; out-of-range values fall back to the default on restore
    pub shoe_size: i32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub background_image_ref: Option<String>,
    /// Pose keypoints, kept opaque
    #[serde(default)]
    pub keypoints: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub guides: Vec<GuidePosition>,
    #[serde(default)]
    pub reference_circle: Option<ReferenceCircle>,
    #[serde(default)]
    pub selected_pieces: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub piece_positions: Vec<PiecePosition>,
    pub saved_at: DateTime<Utc>,
}

/// Deserializes a list, dropping entries that do not parse.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed snapshot entry");
                None
            }
        })
        .collect())
}

/// Session persistence collaborator.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` when nothing was ever saved for this patient and side.
    async fn load_by_patient_and_side(
        &self,
        patient_id: &str,
        side: FootSide,
    ) -> Result<Option<SessionSnapshot>, PersistenceError>;

    /// Stores the snapshot and returns its id.
    async fn save(&self, snapshot: SessionSnapshot) -> Result<String, PersistenceError>;
}

/// One JSON file per patient and side inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    dir: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, patient_id: &str, side: FootSide) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", sanitize_file_stem(patient_id), side))
    }
}

fn sanitize_file_stem(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn check_patient_id(patient_id: &str) -> Result<(), PersistenceError> {
    if patient_id.trim().is_empty() {
        return Err(PersistenceError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "patient id is empty",
        )));
    }
    Ok(())
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn load_by_patient_and_side(
        &self,
        patient_id: &str,
        side: FootSide,
    ) -> Result<Option<SessionSnapshot>, PersistenceError> {
        check_patient_id(patient_id)?;
        let path = self.path_for(patient_id, side);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        let snapshot: SessionSnapshot = serde_json::from_str(&content)?;
        if snapshot.patient_id != patient_id || snapshot.foot_side != side {
            return Err(PersistenceError::Corrupted(format!(
                "{} holds the session of {} ({})",
                path.display(),
                snapshot.patient_id,
                snapshot.foot_side
            )));
        }
        tracing::debug!(path = %path.display(), "Session loaded");
        Ok(Some(snapshot))
    }

    async fn save(&self, mut snapshot: SessionSnapshot) -> Result<String, PersistenceError> {
        check_patient_id(&snapshot.patient_id)?;
        let id = snapshot
            .id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone();

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&snapshot.patient_id, snapshot.foot_side);
        let tmp = path.with_extension(format!("{}.json.tmp", uuid::Uuid::new_v4().simple()));
        let json = serde_json::to_string_pretty(&snapshot)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::info!(id = %id, path = %path.display(), "Session saved");
        Ok(id)
    }
}

/// Non-blocking outcome report for the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Saved { id: String },
    SaveFailed { message: String },
    LoadFailed { message: String },
}

/// A patient's editing session: editor state plus clinical metadata.
#[derive(Debug, Clone)]
pub struct EditorSession {
    pub patient_id: String,
    pub notes: String,
    pub background_image_ref: Option<String>,
    pub keypoints: Vec<serde_json::Value>,
    session_id: Option<String>,
    controller: InteractionController,
}

impl EditorSession {
    pub fn new(
        patient_id: impl Into<String>,
        side: FootSide,
        size: ShoeSize,
        settings: EditorSettings,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            notes: String::new(),
            background_image_ref: None,
            keypoints: Vec::new(),
            session_id: None,
            controller: InteractionController::new(EditorState::new(size, side), settings),
        }
    }

    /// Rebuilds a session. A missing snapshot yields the defaults.
    ///
    /// Entries that break a geometry invariant are skipped with a warning.
    /// Selected pieces without a stored position are seeded from the catalog.
    pub fn from_snapshot(
        snapshot: Option<SessionSnapshot>,
        patient_id: &str,
        side: FootSide,
        dimensions: &DimensionStore,
        settings: EditorSettings,
    ) -> Self {
        let mut session = Self::new(patient_id, side, ShoeSize::default(), settings);
        if let Some(snapshot) = snapshot {
            session.restore(snapshot, dimensions);
        }
        session
    }

    fn restore(&mut self, snapshot: SessionSnapshot, dimensions: &DimensionStore) {
        let shoe_size = ShoeSize::new(snapshot.shoe_size).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Stored shoe size rejected, using default");
            ShoeSize::default()
        });

        let mut state = EditorState::new(shoe_size, snapshot.foot_side);
        let mut geometry = GeometryState::new();
        for piece in snapshot.piece_positions {
            let id = piece.id.clone();
            if let Err(e) = geometry.place(piece) {
                tracing::warn!(piece_id = %id, error = %e, "Skipping stored piece");
            }
        }
        for guide in snapshot.guides {
            geometry.insert_guide(guide);
        }
        if let Some(circle) = snapshot.reference_circle {
            if circle.cx.is_finite() && circle.cy.is_finite() {
                geometry.set_reference_circle(circle);
            }
        }
        state.geometry = geometry;

        for id in &snapshot.selected_pieces {
            if state.geometry.piece(id).is_none() {
                if let Err(e) = state.toggle_piece(id, dimensions) {
                    tracing::warn!(piece_id = %id, error = %e, "Skipping stored selection");
                }
            }
        }

        self.patient_id = snapshot.patient_id;
        self.notes = snapshot.notes;
        self.background_image_ref = snapshot.background_image_ref;
        self.keypoints = snapshot.keypoints;
        self.session_id = snapshot.id;
        *self.controller.state_mut() = state;
    }

    /// Loads through `store`; on failure the defaults are used and a
    /// notification is returned.
    pub async fn load(
        store: &dyn SessionStore,
        patient_id: &str,
        side: FootSide,
        dimensions: &DimensionStore,
        settings: EditorSettings,
    ) -> (Self, Option<Notification>) {
        match store.load_by_patient_and_side(patient_id, side).await {
            Ok(snapshot) => (
                Self::from_snapshot(snapshot, patient_id, side, dimensions, settings),
                None,
            ),
            Err(e) => {
                tracing::warn!(patient_id, %side, error = %e, "Session load failed");
                (
                    Self::from_snapshot(None, patient_id, side, dimensions, settings),
                    Some(Notification::LoadFailed {
                        message: e.to_string(),
                    }),
                )
            }
        }
    }

    /// Merges a snapshot that finished loading after the session was opened.
    ///
    /// Ignored when it belongs to another patient or side, or while a drag
    /// is in progress.
    pub fn merge_loaded(
        &mut self,
        snapshot: SessionSnapshot,
        dimensions: &DimensionStore,
    ) -> Transition {
        let state = self.controller.state();
        if snapshot.patient_id != self.patient_id || snapshot.foot_side != state.foot_side {
            tracing::warn!(
                patient_id = %snapshot.patient_id,
                side = %snapshot.foot_side,
                "Ignoring snapshot for another session"
            );
            return Transition::Noop;
        }
        if state.is_dragging() {
            tracing::debug!("Drag in progress, loaded snapshot not merged");
            return Transition::Noop;
        }
        self.restore(snapshot, dimensions);
        Transition::Changed
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn state(&self) -> &EditorState {
        self.controller.state()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    pub fn dispatch(&mut self, event: EditorEvent) -> Transition {
        self.controller.dispatch(event)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.controller.state();
        SessionSnapshot {
            id: self.session_id.clone(),
            patient_id: self.patient_id.clone(),
            foot_side: state.foot_side,
            shoe_size: state.shoe_size.value(),
            notes: self.notes.clone(),
            background_image_ref: self.background_image_ref.clone(),
            keypoints: self.keypoints.clone(),
            guides: state.geometry.guides().to_vec(),
            reference_circle: Some(*state.geometry.reference_circle()),
            selected_pieces: state.geometry.selected_pieces().to_vec(),
            piece_positions: state.geometry.pieces().to_vec(),
            saved_at: Utc::now(),
        }
    }

    /// Starts a save on the tokio runtime and returns immediately.
    ///
    /// The session id is assigned here, so saves started before an earlier
    /// one completes still write the same record.
    pub fn save_in_background(
        &mut self,
        store: Arc<dyn SessionStore>,
    ) -> JoinHandle<Result<String, PersistenceError>> {
        self.session_id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string());
        let snapshot = self.snapshot();
        tokio::spawn(async move { store.save(snapshot).await })
    }

    /// Saves and waits for the outcome.
    pub async fn save(&mut self, store: Arc<dyn SessionStore>) -> Notification {
        let outcome = self.save_in_background(store).await;
        self.handle_save_result(outcome)
    }

    /// Records the outcome of a background save.
    pub fn handle_save_result(
        &mut self,
        outcome: Result<Result<String, PersistenceError>, JoinError>,
    ) -> Notification {
        let result = outcome.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Save task did not complete");
            Err(PersistenceError::Cancelled)
        });
        match result {
            Ok(id) => {
                self.session_id = Some(id.clone());
                Notification::Saved { id }
            }
            Err(e) => {
                tracing::warn!(patient_id = %self.patient_id, error = %e, "Session save failed");
                Notification::SaveFailed {
                    message: e.to_string(),
                }
            }
        }
    }
}
