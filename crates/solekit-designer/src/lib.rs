//! # SoleKit Designer
//!
//! Sizing, interactive layout and print fitting for modular orthotic insoles.
//! A clinician picks a shoe size and a set of correction pieces; this crate
//! turns that into true-scale geometry, lets the pieces be moved, resized and
//! rotated over the insole outline, and composes a page that prints at 1:1.
//!
//! ## Core Components
//!
//! - **Size model**: shoe size to foot length, outline scale and cosmetic tilt
//! - **Dimension store**: catalog defaults with clinician overrides layered on top
//! - **Geometry state**: placed pieces, guides and the calibration circle
//! - **Interaction**: pure pointer/keyboard state machine with hit-testing
//! - **Rotation fit**: the rotation that fits the outline on the page without
//!   shrinking it
//! - **Print composer**: final transforms and the SVG page
//! - **Sessions**: snapshots and their async persistence
//!
//! ## Architecture
//!
//! ```text
//! catalog ── dimension_store ── size_model
//!                 │                 │
//!          geometry_state ── interaction (hit_test)
//!                 │
//!          print_composer ── rotation_fit
//!                 │
//!          svg_document ── print_dispatch
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use solekit_designer::{compose, DimensionStore, EditorState, PrintConfig};
//!
//! let store = DimensionStore::catalog_only();
//! let mut state = EditorState::new(ShoeSize::new(42)?, FootSide::Left);
//! state.toggle_piece("metatarsal_pad", &store)?;
//! let page = compose(&PrintConfig::from_state(&state, &PrintSettings::default()))?;
//! ```

pub mod catalog;
pub mod dimension_store;
pub mod geometry_state;
pub mod interaction;
pub mod print_composer;
pub mod print_dispatch;
pub mod rotation_fit;
pub mod session;
pub mod size_model;
pub mod svg_document;

pub use catalog::{CatalogEntry, Outline, PieceShape};
pub use dimension_store::{
    calculate_real_scale, DimensionOverrides, DimensionStore, InMemoryOverrides,
    JsonFileOverrides, PieceDimensions, RealScale,
};
pub use geometry_state::{
    Corner, GeometryState, GuideEndpoint, GuidePosition, PiecePosition, ReferenceCircle,
    MIN_PIECE_SIZE,
};
pub use hit_test::{hit_test, HitTarget};
pub use interaction::{
    apply, DragAction, DragState, EditorEvent, EditorState, InteractionController, Key,
    Modifiers, Transition,
};
pub use print_composer::{
    compose, compose_request, validate, PrintConfig, PrintDocument, PrintRequest, PrintTransform,
};
pub use print_dispatch::{dispatch_print, run_print, FilePrintSurface, PrintError, PrintSurface};
pub use rotation_fit::{angle_by_size, min_angle_to_fit, RotationFit};
pub use session::{EditorSession, JsonFileSessionStore, Notification, SessionSnapshot, SessionStore};
pub use size_model::{foot_length_cm, print_scale, svg_scale, width_factor, PrintScale};
