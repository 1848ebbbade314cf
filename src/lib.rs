//! # SoleKit
//!
//! Sizing, manipulation and true-scale print layout for modular orthotic
//! insoles.
//!
//! ## Architecture
//!
//! SoleKit is organized as a workspace with multiple crates:
//!
//! 1. **solekit-core** - Units, page geometry, affine helpers, domain types, errors
//! 2. **solekit-settings** - Print, editor and storage configuration
//! 3. **solekit-designer** - Size model, dimension store, interaction state
//!    machine, rotation fit, print composition and sessions
//! 4. **solekit** - Command-line front end that integrates all crates
//!
//! ## Features
//!
//! - **True scale**: centimeters in equal centimeters out on an A4 page
//! - **Rotation fit**: the outline is turned to fit, never shrunk
//! - **Interactive layout**: move, resize (with aspect lock) and rotate pieces
//! - **Sessions**: JSON snapshots per patient and foot side

pub mod commands;

pub use solekit_core::{Error, FootSide, PageFormat, Result, ShoeSize};
pub use solekit_designer as designer;
pub use solekit_settings::{Config, EditorSettings, PrintSettings, StorageSettings};

pub use solekit_designer::{
    compose, DimensionStore, EditorSession, EditorState, InteractionController, PrintConfig,
    PrintDocument, SessionSnapshot,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, so command output on stdout stays clean
/// - RUST_LOG environment variable support
/// - INFO as the default level
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
