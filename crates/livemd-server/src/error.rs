//! Server errors.

use livemd_preview::PreviewError;

/// Errors that prevent the preview server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Initial render or watch setup failed.
    #[error(transparent)]
    Preview(#[from] PreviewError),

    /// The listen address could not be resolved.
    #[error("Invalid listen address {addr}: {source}")]
    Address {
        addr: String,
        source: std::io::Error,
    },

    /// The listener could not be bound.
    #[error("Cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}
