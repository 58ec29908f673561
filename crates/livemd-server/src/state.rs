//! Application state.

use std::sync::Arc;

use livemd_preview::PreviewHub;

/// State shared by all request handlers.
pub(crate) struct AppState {
    /// Current snapshot and live sessions.
    pub(crate) hub: Arc<PreviewHub>,
}
