//! Broadcast pipeline.
//!
//! Single writer of the preview snapshot: every qualifying change is turned
//! into a read, a render and a broadcast, strictly one at a time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::error::PreviewError;
use crate::hub::PreviewHub;
use crate::registry::BroadcastReport;
use crate::snapshot::DocumentSnapshot;
use crate::source::DocumentSource;

/// Longest a burst may postpone a render, in debounce windows.
const MAX_FOLD_WINDOWS: u32 = 10;

/// Signal delivered to the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The target document was written.
    Changed,
}

/// Pipeline stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PipelineState {
    /// Waiting for the next change.
    #[default]
    Idle,
    /// Reading and rendering the document.
    Rendering,
    /// Committing and broadcasting the new snapshot.
    Publishing,
}

/// Turns document changes into published snapshots.
pub struct BroadcastPipeline {
    source: Arc<dyn DocumentSource>,
    hub: Arc<PreviewHub>,
    debounce: Duration,
    state: PipelineState,
}

impl BroadcastPipeline {
    /// Create an idle pipeline reading from `source` and publishing to `hub`.
    #[must_use]
    pub fn new(source: Arc<dyn DocumentSource>, hub: Arc<PreviewHub>) -> Self {
        Self {
            source,
            hub,
            debounce: Duration::ZERO,
            state: PipelineState::Idle,
        }
    }

    /// Fold changes arriving within `debounce` of each other into one render.
    ///
    /// A steady stream of changes still renders at least once every
    /// ten windows.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Current stage.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Perform the startup render.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Read`] if the document cannot be read. The
    /// service must not start with a broken preview, so callers treat this as
    /// fatal.
    pub fn initialize(&mut self) -> Result<(), PreviewError> {
        let report = self.refresh()?;
        tracing::info!(
            path = %self.source.path().display(),
            title = %self.hub.snapshot().title,
            sessions = report.delivered,
            "Initial render complete"
        );
        Ok(())
    }

    /// Re-read the document, render it and broadcast the result.
    ///
    /// On failure the pipeline returns to idle and the previous snapshot stays
    /// in place.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Read`] if the document cannot be read.
    pub fn refresh(&mut self) -> Result<BroadcastReport, PreviewError> {
        let start = Instant::now();
        self.transition(PipelineState::Rendering);

        let bytes = match self.source.read() {
            Ok(bytes) => bytes,
            Err(source) => {
                self.transition(PipelineState::Idle);
                return Err(PreviewError::Read {
                    path: self.source.path().to_path_buf(),
                    source,
                });
            }
        };

        let html = livemd_renderer::render(&bytes);
        let title = livemd_renderer::guess_title_or(&html, self.hub.fallback_title());

        self.transition(PipelineState::Publishing);
        let report = self.hub.publish(DocumentSnapshot { title, html });
        self.transition(PipelineState::Idle);

        tracing::debug!(
            bytes = bytes.len(),
            delivered = report.delivered,
            pruned = report.pruned,
            elapsed_ms = start.elapsed().as_millis(),
            "Snapshot published"
        );
        Ok(report)
    }

    /// Process change events until every sender is dropped.
    ///
    /// Read failures are logged and skipped.
    pub async fn run(mut self, mut events: mpsc::Receiver<PipelineEvent>) {
        while let Some(event) = events.recv().await {
            tracing::trace!(?event, "Pipeline event");
            if !self.debounce.is_zero() {
                self.coalesce(&mut events).await;
            }

            if let Err(err) = self.refresh() {
                tracing::error!(error = %err, "Keeping previous snapshot");
            }
        }

        tracing::debug!("Pipeline stopped");
    }

    /// Swallow events until the channel stays quiet for the debounce window,
    /// or until [`MAX_FOLD_WINDOWS`] windows have passed.
    async fn coalesce(&self, events: &mut mpsc::Receiver<PipelineEvent>) {
        let cap = tokio::time::Instant::now() + self.debounce * MAX_FOLD_WINDOWS;
        let mut folded = 0_usize;
        loop {
            let quiet = tokio::time::Instant::now() + self.debounce;
            match tokio::time::timeout_at(quiet.min(cap), events.recv()).await {
                Ok(Some(_)) => folded += 1,
                Ok(None) | Err(_) => break,
            }
        }
        if folded > 0 {
            tracing::debug!(folded, "Coalesced change events");
        }
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::trace!(from = ?self.state, to = ?next, "Pipeline state");
        self.state = next;
    }
}
