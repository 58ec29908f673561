//! In-memory document source for tests.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::source::DocumentSource;

/// Document source backed by memory.
///
/// Content can be swapped at any time and reads can be made to fail, which
/// lets tests drive the pipeline through read errors without a filesystem.
pub struct MockSource {
    path: PathBuf,
    content: Mutex<Option<Vec<u8>>>,
}

impl MockSource {
    /// Create a source reporting `path` with the given initial content.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: Mutex::new(Some(content.into())),
        }
    }

    /// Replace the document content (subsequent reads succeed).
    pub fn set_content(&self, content: impl Into<Vec<u8>>) {
        *self.content.lock().unwrap_or_else(PoisonError::into_inner) = Some(content.into());
    }

    /// Make subsequent reads fail with `NotFound` until content is set again.
    pub fn fail_reads(&self) {
        *self.content.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl DocumentSource for MockSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        self.content
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "mock document unavailable"))
    }
}
