//! Document snapshot.

use serde::Serialize;

/// Latest rendering of the target document.
///
/// This is also the wire payload pushed to viewer sessions:
/// `{"title": "...", "html": "..."}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DocumentSnapshot {
    /// Guessed title (fallback title when the document has no leading `#` heading).
    pub title: String,
    /// Sanitized HTML.
    pub html: String,
}

impl DocumentSnapshot {
    /// Snapshot used before the first render.
    #[must_use]
    pub fn empty(fallback_title: &str) -> Self {
        Self {
            title: fallback_title.to_owned(),
            html: String::new(),
        }
    }
}
