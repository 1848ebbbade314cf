//! Pointer and keyboard interaction state machine.
//!
//! The editor is an explicit value, [`EditorState`], and every input event
//! goes through the pure transition [`apply`]. [`InteractionController`] is a
//! thin owner that keeps the current state for a host UI.
//!
//! ```text
//! Idle --pointer-down on target--> Dragging(action) --pointer-up/leave--> Idle
//! ```
//!
//! Pointer positions are expressed in the outline frame (see
//! [`crate::geometry_state`]); mapping from screen space is the host's job.

use crate::catalog;
use crate::dimension_store::DimensionStore;
use crate::geometry_state::{
    Corner, GeometryState, GuideEndpoint, PiecePosition, ReferenceCircle,
};
use crate::hit_test::{hit_test, HitTarget};
use crate::size_model::{print_scale, svg_scale};
use serde::{Deserialize, Serialize};
use solekit_core::{FootSide, PageFormat, Point, ShoeSize, MIN_PIECE_SIZE};
use solekit_settings::EditorSettings;

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Keep the width/height ratio while resizing
    pub aspect_lock: bool,
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Delete,
    Escape,
}

/// Input event in the outline frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorEvent {
    PointerDown { at: Point, modifiers: Modifiers },
    PointerMove { at: Point, modifiers: Modifiers },
    PointerUp,
    PointerLeave,
    Key(Key),
}

/// The gesture in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum DragAction {
    Move {
        piece_id: String,
        grab_offset: Point,
    },
    Resize {
        piece_id: String,
        corner: Corner,
        /// Width over height when the drag started
        original_ratio: f64,
    },
    Rotate {
        piece_id: String,
    },
    Guide {
        guide_id: String,
        endpoint: GuideEndpoint,
    },
    ReferenceCircle {
        grab_offset: Point,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragAction),
}

/// Result of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Noop,
}

impl Transition {
    pub fn changed(&self) -> bool {
        matches!(self, Transition::Changed)
    }
}

/// Complete editor state of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub shoe_size: ShoeSize,
    pub foot_side: FootSide,
    pub geometry: GeometryState,
    pub selection: Option<String>,
    pub drag: DragState,
}

impl EditorState {
    pub fn new(shoe_size: ShoeSize, foot_side: FootSide) -> Self {
        Self {
            shoe_size,
            foot_side,
            geometry: GeometryState::new(),
            selection: None,
            drag: DragState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging(_))
    }

    /// Size of the scaled, unrotated outline, which is the editing frame.
    pub fn frame_size(&self) -> (f64, f64) {
        frame_size(self.shoe_size, self.foot_side)
    }

    pub fn selected_piece(&self) -> Option<&PiecePosition> {
        self.selection
            .as_deref()
            .and_then(|id| self.geometry.piece(id))
    }

    /// Toggles a catalog piece. Returns `true` when the piece is now placed.
    ///
    /// Placing seeds the catalog's default position and the piece's canvas
    /// size at the current shoe size (nominal centimeters times svg scale).
    pub fn toggle_piece(
        &mut self,
        piece_id: &str,
        store: &DimensionStore,
    ) -> solekit_core::Result<bool> {
        if self.geometry.remove(piece_id).is_some() {
            if self.selection.as_deref() == Some(piece_id) {
                self.selection = None;
                self.drag = DragState::Idle;
            }
            tracing::debug!(piece_id, "Piece toggled off");
            return Ok(false);
        }

        let entry = catalog::entry(piece_id).ok_or_else(|| {
            solekit_core::DimensionError::UnknownPiece {
                piece_id: piece_id.to_string(),
            }
        })?;
        let real = store.real_scale(self.shoe_size, piece_id)?;
        let (fw, fh) = self.frame_size();
        let (px, py) = entry.placement_for(self.foot_side);

        self.geometry.place(PiecePosition {
            id: piece_id.to_string(),
            x: px * fw,
            y: py * fh,
            width: real.width,
            height: real.height,
            rotation: 0.0,
        })?;
        tracing::debug!(piece_id, width = real.width, height = real.height, "Piece placed");
        Ok(true)
    }

    /// Changes the shoe size, rescaling every placed piece.
    ///
    /// Piece sizes scale by the ratio of svg scales, so pieces grow and shrink
    /// with the outline. Positions, guides and the calibration circle keep
    /// their relative place in the outline frame.
    pub fn set_shoe_size(&mut self, size: ShoeSize) {
        if size == self.shoe_size {
            return;
        }
        let ratio = svg_scale(size) / svg_scale(self.shoe_size);
        let (old_w, old_h) = self.frame_size();
        let (new_w, new_h) = frame_size(size, self.foot_side);
        let (kx, ky) = (new_w / old_w, new_h / old_h);

        for piece in self.geometry.pieces_mut() {
            piece.x *= kx;
            piece.y *= ky;
            piece.width *= ratio;
            piece.height *= ratio;
        }
        for guide in self.geometry.guides_mut() {
            guide.x1 *= kx;
            guide.y1 *= ky;
            guide.x2 *= kx;
            guide.y2 *= ky;
        }
        let circle = *self.geometry.reference_circle();
        self.geometry.set_reference_circle(ReferenceCircle {
            cx: circle.cx * kx,
            cy: circle.cy * ky,
        });

        tracing::debug!(from = %self.shoe_size, to = %size, "Shoe size changed");
        self.shoe_size = size;
    }
}

/// Size of the scaled, unrotated outline for a size and side.
pub fn frame_size(size: ShoeSize, side: FootSide) -> (f64, f64) {
    let outline = catalog::Outline::for_side(side);
    print_scale(size, &outline, PageFormat::A4).scaled_extent(&outline)
}

/// Pure transition: consumes the state and an event, returns the new state.
pub fn apply(
    mut state: EditorState,
    event: &EditorEvent,
    settings: &EditorSettings,
) -> (EditorState, Transition) {
    let transition = match *event {
        EditorEvent::PointerDown { at, .. } => pointer_down(&mut state, at, settings),
        EditorEvent::PointerMove { at, modifiers } => {
            pointer_move(&mut state, at, modifiers, settings)
        }
        EditorEvent::PointerUp | EditorEvent::PointerLeave => {
            if state.is_dragging() {
                state.drag = DragState::Idle;
                Transition::Changed
            } else {
                Transition::Noop
            }
        }
        EditorEvent::Key(key) => key_press(&mut state, key, settings),
    };
    (state, transition)
}

fn pointer_down(state: &mut EditorState, at: Point, settings: &EditorSettings) -> Transition {
    let target = hit_test(&state.geometry, state.selection.as_deref(), at, settings);

    let action = match target {
        HitTarget::Background => {
            return match state.selection.take() {
                Some(_) => Transition::Changed,
                None => Transition::Noop,
            };
        }
        HitTarget::PieceBody { piece_id } => {
            let Some(piece) = state.geometry.piece(&piece_id) else {
                return Transition::Noop;
            };
            let grab_offset = at - piece.center();
            state.selection = Some(piece_id.clone());
            DragAction::Move {
                piece_id,
                grab_offset,
            }
        }
        HitTarget::ResizeHandle { piece_id, corner } => {
            let Some(piece) = state.geometry.piece(&piece_id) else {
                return Transition::Noop;
            };
            let original_ratio = piece.width / piece.height;
            DragAction::Resize {
                piece_id,
                corner,
                original_ratio,
            }
        }
        HitTarget::RotateHandle { piece_id } => DragAction::Rotate { piece_id },
        HitTarget::GuideHandle { guide_id, endpoint } => DragAction::Guide { guide_id, endpoint },
        HitTarget::ReferenceCircle => DragAction::ReferenceCircle {
            grab_offset: at - state.geometry.reference_circle().center(),
        },
    };

    tracing::debug!(?action, "Drag started");
    state.drag = DragState::Dragging(action);
    Transition::Changed
}

fn pointer_move(
    state: &mut EditorState,
    at: Point,
    modifiers: Modifiers,
    settings: &EditorSettings,
) -> Transition {
    let DragState::Dragging(action) = &state.drag else {
        return Transition::Noop;
    };

    match action {
        DragAction::Move {
            piece_id,
            grab_offset,
        } => {
            let center = at - *grab_offset;
            match state.geometry.piece_mut(piece_id) {
                Some(piece) => {
                    piece.set_center(center);
                    Transition::Changed
                }
                None => Transition::Noop,
            }
        }
        DragAction::Resize {
            piece_id,
            corner,
            original_ratio,
        } => {
            let lock = modifiers.aspect_lock.then_some(*original_ratio);
            let (corner, min) = (*corner, settings.min_piece_size);
            match state.geometry.piece_mut(piece_id) {
                Some(piece) => {
                    resize_piece(piece, corner, at, lock, min);
                    Transition::Changed
                }
                None => Transition::Noop,
            }
        }
        DragAction::Rotate { piece_id } => match state.geometry.piece_mut(piece_id) {
            Some(piece) => match rotation_towards(piece.center(), at) {
                Some(rotation) => {
                    piece.rotation = rotation;
                    Transition::Changed
                }
                None => Transition::Noop,
            },
            None => Transition::Noop,
        },
        DragAction::Guide { guide_id, endpoint } => {
            let endpoint = *endpoint;
            match state.geometry.guide_mut(guide_id) {
                Some(guide) => {
                    guide.set_endpoint(endpoint, at);
                    Transition::Changed
                }
                None => Transition::Noop,
            }
        }
        DragAction::ReferenceCircle { grab_offset } => {
            let center = at - *grab_offset;
            state.geometry.set_reference_circle(ReferenceCircle {
                cx: center.x,
                cy: center.y,
            });
            Transition::Changed
        }
    }
}

fn key_press(state: &mut EditorState, key: Key, settings: &EditorSettings) -> Transition {
    if state.is_dragging() {
        return Transition::Noop;
    }

    match key {
        Key::ArrowLeft | Key::ArrowRight => {
            let step = if key == Key::ArrowLeft {
                -settings.nudge_step_deg
            } else {
                settings.nudge_step_deg
            };
            let Some(id) = state.selection.clone() else {
                return Transition::Noop;
            };
            match state.geometry.piece_mut(&id) {
                Some(piece) => {
                    piece.rotation += step;
                    Transition::Changed
                }
                None => Transition::Noop,
            }
        }
        Key::Delete => {
            let Some(id) = state.selection.take() else {
                return Transition::Noop;
            };
            state.geometry.remove(&id);
            tracing::debug!(piece_id = %id, "Piece deleted");
            Transition::Changed
        }
        Key::Escape => match state.selection.take() {
            Some(_) => Transition::Changed,
            None => Transition::Noop,
        },
    }
}

/// Rotation that points the piece's 12 o'clock towards `target`.
///
/// `None` when the target coincides with the center.
pub fn rotation_towards(center: Point, target: Point) -> Option<f64> {
    let dx = target.x - center.x;
    let dy = target.y - center.y;
    if dx.hypot(dy) < f64::EPSILON {
        return None;
    }
    Some(dx.atan2(-dy).to_degrees())
}

/// Symmetric resize around the center from a corner drag.
///
/// The pointer is taken into the piece frame first, so dragging the
/// bottom-right handle of a piece rotated by 90 degrees still grows it along
/// its own axes. With `lock`, the lagging axis grows to restore the ratio.
/// `min_size` below [`MIN_PIECE_SIZE`] is raised to it.
pub fn resize_piece(
    piece: &mut PiecePosition,
    corner: Corner,
    at: Point,
    lock: Option<f64>,
    min_size: f64,
) {
    let min_size = min_size.max(MIN_PIECE_SIZE);
    let local = at.to_local_frame(piece.center(), piece.rotation);
    let (sx, sy) = corner.signs();

    let mut width = (2.0 * local.x * sx).max(min_size);
    let mut height = (2.0 * local.y * sy).max(min_size);

    if let Some(ratio) = lock.filter(|r| r.is_finite() && *r > 0.0) {
        if width / height > ratio {
            height = width / ratio;
        } else {
            width = height * ratio;
        }
    }

    piece.width = width;
    piece.height = height;
}

/// Owner of one session's editor state.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: EditorState,
    settings: EditorSettings,
}

impl InteractionController {
    pub fn new(state: EditorState, settings: EditorSettings) -> Self {
        Self { state, settings }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Direct access for non-pointer edits (toggles, size changes).
    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn into_state(self) -> EditorState {
        self.state
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Feeds one event through [`apply`].
    pub fn dispatch(&mut self, event: EditorEvent) -> Transition {
        let placeholder = EditorState::new(self.state.shoe_size, self.state.foot_side);
        let current = std::mem::replace(&mut self.state, placeholder);
        let (next, transition) = apply(current, &event, &self.settings);
        self.state = next;
        transition
    }
}

/// Serialisable view of a drag, for host UIs that show a cursor hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorHint {
    Default,
    Grab,
    Resize,
    Rotate,
}

impl DragState {
    pub fn cursor_hint(&self) -> CursorHint {
        match self {
            DragState::Idle => CursorHint::Default,
            DragState::Dragging(DragAction::Resize { .. }) => CursorHint::Resize,
            DragState::Dragging(DragAction::Rotate { .. }) => CursorHint::Rotate,
            DragState::Dragging(_) => CursorHint::Grab,
        }
    }
}
