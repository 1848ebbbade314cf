//! Configuration management for SoleKit
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Print settings (margins, settle delay, calibration mark)
//! - Editor settings (nudge step, minimum piece size, handle tolerances)
//! - Storage settings (session directory, dimension override file)

use crate::error::{ConfigError, SettingsError, SettingsResult};
pub use solekit_core::units::PageFormat;
use solekit_core::MIN_PIECE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Print output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintSettings {
    /// Page format; A4 is the only supported page
    pub page: PageFormat,
    /// Margin removed from every page edge, in canvas units
    pub margin_units: f64,
    /// Delay between writing the document and triggering the print action
    pub settle_delay_ms: u64,
    /// Draw the 2.5 cm calibration circle in the page corner
    pub include_calibration_circle: bool,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            page: PageFormat::A4,
            margin_units: 70.0,
            settle_delay_ms: 500,
            include_calibration_circle: true,
        }
    }
}

/// Interactive editor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Rotation applied per arrow key press, in degrees
    pub nudge_step_deg: f64,
    /// Smallest width or height a piece can be resized to, in canvas units
    pub min_piece_size: f64,
    /// Pick radius around resize and guide handles, in canvas units
    pub handle_hit_radius: f64,
    /// Distance of the rotate handle above the piece's top edge
    pub rotate_handle_offset: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            nudge_step_deg: 5.0,
            min_piece_size: 20.0,
            handle_hit_radius: 8.0,
            rotate_handle_offset: 24.0,
        }
    }
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding one JSON snapshot per patient and foot side
    pub sessions_dir: PathBuf,
    /// Optional JSON file of clinician dimension overrides
    pub overrides_file: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            sessions_dir: base.join("solekit").join("sessions"),
            overrides_file: None,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub print: PrintSettings,
    #[serde(default)]
    pub editor: EditorSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location (`<config dir>/solekit/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("solekit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                )
                .into())
            }
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load config from `path` when it exists, otherwise return defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                )
                .into())
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let (usable_w, usable_h) = self.print.page.usable_area(self.print.margin_units);
        if !self.print.margin_units.is_finite()
            || self.print.margin_units < 0.0
            || usable_w <= 0.0
            || usable_h <= 0.0
        {
            return Err(out_of_range("print.margin_units", self.print.margin_units));
        }

        let nudge = self.editor.nudge_step_deg;
        if !nudge.is_finite() || nudge <= 0.0 || nudge >= 360.0 {
            return Err(out_of_range("editor.nudge_step_deg", nudge));
        }

        let min_size = self.editor.min_piece_size;
        if !min_size.is_finite() || min_size < MIN_PIECE_SIZE {
            return Err(out_of_range("editor.min_piece_size", min_size));
        }

        let radius = self.editor.handle_hit_radius;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(out_of_range("editor.handle_hit_radius", radius));
        }

        let offset = self.editor.rotate_handle_offset;
        if !offset.is_finite() || offset < 0.0 {
            return Err(out_of_range("editor.rotate_handle_offset", offset));
        }

        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn out_of_range(key: &str, value: f64) -> SettingsError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}
