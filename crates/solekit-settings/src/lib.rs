//! SoleKit Settings Crate
//!
//! Handles engine configuration: print margins and timing, editor
//! interaction tolerances and storage locations.

pub mod config;
pub mod error;

pub use config::{Config, EditorSettings, PrintSettings, StorageSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
