//! # SoleKit Core
//!
//! Core types and utilities shared by the SoleKit crates.
//! Provides the physical unit model, the fixed print page, the 2D affine
//! helpers used for rotation-aware geometry, the clinical domain types and
//! the error taxonomy.

pub mod error;
pub mod geometry;
pub mod types;
pub mod units;

pub use error::{DimensionError, Error, PersistenceError, Result, ValidationError};
pub use geometry::{Affine2, Bounds, Point};
pub use types::{FootSide, ShoeSize};
pub use units::{PageFormat, CM_TO_UNIT, MIN_PIECE_SIZE, MM_TO_UNIT, UNITS_PER_INCH};
