//! Preview pipeline errors.

use std::path::PathBuf;

/// Errors raised by the preview pipeline.
///
/// All variants are fatal during startup. Once the service runs, only
/// [`PreviewError::Read`] can occur again and the pipeline logs and skips it.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// The target path could not be resolved to an absolute, canonical path.
    #[error("Cannot resolve {}: {source}", path.display())]
    Target {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The target file could not be read.
    #[error("Error reading from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The filesystem watch could not be established.
    #[error("Cannot watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        source: notify::Error,
    },
}

impl PreviewError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Target { path, .. } | Self::Read { path, .. } | Self::Watch { path, .. } => path,
        }
    }
}
