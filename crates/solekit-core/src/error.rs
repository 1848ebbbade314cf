//! Error handling for SoleKit
//!
//! Provides error types for every layer of the engine:
//! - Validation errors (boundary checks on clinical input)
//! - Dimension errors (piece catalog and override resolution)
//! - Persistence errors (session snapshot collaborators)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Validation error type
///
/// Raised at the boundary before values reach the size model or the
/// rotation-fit solver. A validation error blocks the print request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Shoe size outside the supported clinical domain
    #[error("Shoe size {value} is outside the supported range {min}-{max}")]
    ShoeSizeOutOfRange {
        /// The rejected value.
        value: i32,
        /// Smallest supported size.
        min: i32,
        /// Largest supported size.
        max: i32,
    },

    /// Shoe size could not be read as a number
    #[error("Shoe size '{input}' is not a number")]
    ShoeSizeNotNumeric {
        /// The raw input.
        input: String,
    },

    /// Shoe size missing from a print request
    #[error("Shoe size is required")]
    MissingShoeSize,

    /// Foot side descriptor missing from a print request
    #[error("Foot side is required (left or right)")]
    MissingFootSide,

    /// Foot side descriptor present but not recognised
    #[error("Unknown foot side '{input}', expected 'left' or 'right'")]
    UnknownFootSide {
        /// The raw input.
        input: String,
    },

    /// A physical dimension was zero, negative or not finite
    #[error("Invalid dimension '{field}' for piece {piece_id}: {value}")]
    InvalidDimension {
        /// The piece the dimension belongs to.
        piece_id: String,
        /// The dimension field name.
        field: String,
        /// The rejected value.
        value: f64,
    },
}

/// Dimension resolution error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DimensionError {
    /// The id does not reference a catalog entry
    #[error("Unknown piece id: {piece_id}")]
    UnknownPiece {
        /// The unknown id.
        piece_id: String,
    },

    /// The override collaborator failed
    #[error("Dimension lookup failed for {piece_id}: {reason}")]
    LookupFailed {
        /// The piece being resolved.
        piece_id: String,
        /// Why the lookup failed.
        reason: String,
    },
}

/// Persistence error type
///
/// Raised by session and override collaborators. These never abort
/// interaction; callers turn them into non-blocking notifications.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The stored snapshot is structurally wrong
    #[error("Corrupted session snapshot: {0}")]
    Corrupted(String),

    /// The background task was dropped before completing
    #[error("Persistence task cancelled")]
    Cancelled,
}

/// Main error type for SoleKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Dimension resolution error
    #[error(transparent)]
    Dimension(#[from] DimensionError),

    /// Persistence error
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error should block the current action
    pub fn is_blocking(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Dimension(DimensionError::UnknownPiece { .. }))
    }

    /// Check if this is a persistence error
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
