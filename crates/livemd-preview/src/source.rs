//! Document source abstraction.
//!
//! The pipeline never touches the filesystem directly; it reads the target
//! through a [`DocumentSource`]. [`FsSource`] is the real implementation,
//! `MockSource` (behind the `mock` feature) serves tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::PreviewError;

/// Supplies the raw bytes of the target document.
pub trait DocumentSource: Send + Sync {
    /// Absolute path of the document (used for logging and event filtering).
    fn path(&self) -> &Path;

    /// Read the whole document.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the document cannot be read.
    fn read(&self) -> io::Result<Vec<u8>>;
}

/// Filesystem-backed document source.
#[derive(Debug)]
pub struct FsSource {
    /// Canonical absolute path of the target file.
    path: PathBuf,
}

impl FsSource {
    /// Resolve `path` to its canonical absolute form.
    ///
    /// Symlinks are followed so that filesystem events, which report the real
    /// location, can be compared against the result.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Target`] if the path does not exist or cannot
    /// be resolved.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreviewError> {
        let path = path.as_ref();
        let canonical = fs::canonicalize(path).map_err(|source| PreviewError::Target {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self { path: canonical })
    }
}

impl DocumentSource for FsSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}
