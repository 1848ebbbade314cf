//! Print dispatch.
//!
//! The composed page goes to a [`PrintSurface`]: open it, write the
//! document, let it settle, then trigger printing. Dispatch is fire and
//! forget; the caller gets a handle it may await or drop.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Print dispatch error type
#[derive(Error, Debug)]
pub enum PrintError {
    /// I/O error while writing the page
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The surface was used before it was opened
    #[error("Print surface is not open")]
    NotOpen,

    /// Nothing was written before printing
    #[error("Print surface is empty")]
    Empty,

    /// Surface-specific failure
    #[error("Print surface error: {0}")]
    Surface(String),
}

/// Destination of a composed page, such as a print window or a file.
#[async_trait]
pub trait PrintSurface: Send {
    async fn open(&mut self) -> Result<(), PrintError>;

    async fn write(&mut self, document: &str) -> Result<(), PrintError>;

    /// Triggers the actual print once the document has settled.
    async fn print(&mut self) -> Result<(), PrintError>;
}

/// Writes the page to an SVG file.
#[derive(Debug, Clone)]
pub struct FilePrintSurface {
    path: PathBuf,
    buffer: Option<String>,
}

impl FilePrintSurface {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            buffer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PrintSurface for FilePrintSurface {
    async fn open(&mut self) -> Result<(), PrintError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        self.buffer = Some(String::new());
        Ok(())
    }

    async fn write(&mut self, document: &str) -> Result<(), PrintError> {
        let buffer = self.buffer.as_mut().ok_or(PrintError::NotOpen)?;
        buffer.push_str(document);
        Ok(())
    }

    async fn print(&mut self) -> Result<(), PrintError> {
        let buffer = self.buffer.take().ok_or(PrintError::NotOpen)?;
        if buffer.is_empty() {
            return Err(PrintError::Empty);
        }
        tokio::fs::write(&self.path, buffer).await?;
        tracing::info!(path = %self.path.display(), "Print page written");
        Ok(())
    }
}

/// Runs the full open, write, settle, print sequence.
pub async fn run_print<S: PrintSurface + ?Sized>(
    surface: &mut S,
    document: &str,
    settle: Duration,
) -> Result<(), PrintError> {
    surface.open().await?;
    surface.write(document).await?;
    tokio::time::sleep(settle).await;
    surface.print().await
}

/// Spawns [`run_print`] on the tokio runtime.
pub fn dispatch_print<S>(
    mut surface: S,
    document: String,
    settle: Duration,
) -> JoinHandle<Result<(), PrintError>>
where
    S: PrintSurface + 'static,
{
    tokio::spawn(async move {
        let result = run_print(&mut surface, &document, settle).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Print dispatch failed");
        }
        result
    })
}
