//! Filesystem change watcher.
//!
//! Watches the directory containing the target rather than the file itself,
//! so editors that save by writing a temp file and renaming it over the
//! target keep triggering updates.
//!
//! On backends that report the closing of a written file (inotify), that
//! close is the only in-place write signal: truncating and writing each fire
//! a modify event, and rendering between them would publish a half-written
//! document.

use std::fs;
use std::path::{Path, PathBuf};

use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, WatcherKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::PreviewError;
use crate::pipeline::PipelineEvent;

/// Raw notify results buffered between the notify thread and the filter task.
const RAW_EVENT_CAPACITY: usize = 100;

/// Which event marks a completed in-place write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WriteSignal {
    /// The writer closed the file (`IN_CLOSE_WRITE`).
    CloseWrite,
    /// Any data modification; used where closes are not reported.
    Modify,
}

impl WriteSignal {
    /// Signal available from the platform's recommended watcher.
    pub(crate) fn for_platform() -> Self {
        match RecommendedWatcher::kind() {
            WatcherKind::Inotify => Self::CloseWrite,
            _ => Self::Modify,
        }
    }
}

/// Decides which notify events are writes to the target.
#[derive(Clone, Debug)]
pub(crate) struct TargetFilter {
    dir: PathBuf,
    target: PathBuf,
    signal: WriteSignal,
}

impl TargetFilter {
    pub(crate) fn new(dir: PathBuf, target: PathBuf, signal: WriteSignal) -> Self {
        Self {
            dir,
            target,
            signal,
        }
    }

    /// Whether `event` is a completed write to the target.
    pub(crate) fn matches(&self, event: &Event) -> bool {
        match (self.signal, event.kind) {
            (WriteSignal::CloseWrite, EventKind::Access(AccessKind::Close(AccessMode::Write)))
            | (
                WriteSignal::CloseWrite,
                EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Any)),
            )
            | (
                WriteSignal::Modify,
                EventKind::Create(_)
                | EventKind::Modify(
                    ModifyKind::Any
                    | ModifyKind::Data(_)
                    | ModifyKind::Other
                    | ModifyKind::Name(RenameMode::To | RenameMode::Any),
                ),
            ) => event.paths.iter().any(|p| self.is_target(p)),
            // Paths are [from, to]; only the destination matters. inotify
            // reports the same move as `To` as well.
            (WriteSignal::Modify, EventKind::Modify(ModifyKind::Name(RenameMode::Both))) => {
                event.paths.last().is_some_and(|p| self.is_target(p))
            }
            _ => false,
        }
    }

    fn is_target(&self, path: &Path) -> bool {
        resolve(path, &self.dir) == self.target
    }
}

/// Running watch on the target's directory.
///
/// Qualifying writes are forwarded as [`PipelineEvent::Changed`] until the
/// watcher is dropped or the pipeline stops listening.
pub struct ChangeWatcher {
    _watcher: RecommendedWatcher,
    target: PathBuf,
    task: JoinHandle<()>,
}

impl ChangeWatcher {
    /// Start watching `target`, which must be canonical.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Watch`] if the watcher cannot be created or the
    /// directory cannot be watched (e.g. permission denied).
    pub fn start(
        target: &Path,
        events: mpsc::Sender<PipelineEvent>,
    ) -> Result<Self, PreviewError> {
        let dir = target
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
        let watch_error = |source| PreviewError::Watch {
            path: dir.clone(),
            source,
        };

        let (raw_tx, raw_rx) = mpsc::channel::<notify::Result<Event>>(RAW_EVENT_CAPACITY);

        // Callback runs on the notify thread, outside the runtime
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = raw_tx.blocking_send(res);
        })
        .map_err(watch_error)?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(watch_error)?;

        let signal = WriteSignal::for_platform();
        tracing::info!(
            path = %target.display(),
            dir = %dir.display(),
            ?signal,
            "Watching for changes"
        );

        let filter = TargetFilter::new(dir, target.to_path_buf(), signal);
        let task = tokio::spawn(forward_events(raw_rx, filter, events));

        Ok(Self {
            _watcher: watcher,
            target: target.to_path_buf(),
            task,
        })
    }

    /// Path being watched.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Filter raw notify results and forward qualifying writes to the pipeline.
///
/// Errors from the notification source are logged and skipped. Returns when
/// the raw stream ends or the pipeline receiver is gone.
pub(crate) async fn forward_events(
    mut raw: mpsc::Receiver<notify::Result<Event>>,
    filter: TargetFilter,
    events: mpsc::Sender<PipelineEvent>,
) {
    while let Some(res) = raw.recv().await {
        match res {
            Ok(event) => {
                if !filter.matches(&event) {
                    continue;
                }
                tracing::debug!(kind = ?event.kind, "Target changed");
                if events.send(PipelineEvent::Changed).await.is_err() {
                    break;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "File watcher error");
            }
        }
    }
}

/// Resolve an event path to an absolute path, following symlinks when possible.
fn resolve(path: &Path, dir: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    };
    fs::canonicalize(&absolute).unwrap_or(absolute)
}
