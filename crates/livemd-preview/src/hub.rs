//! Shared preview state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::registry::{BroadcastReport, SESSION_QUEUE_CAPACITY, SessionId, SessionRegistry};
use crate::snapshot::DocumentSnapshot;

/// State guarded by the hub lock.
struct HubState {
    snapshot: Arc<DocumentSnapshot>,
    sessions: SessionRegistry,
}

/// Owner of the current document snapshot and of the live sessions.
///
/// Exactly one hub exists per served document. The broadcast pipeline is its
/// only writer; connection handlers register through it and the HTTP page
/// reads the snapshot from it.
pub struct PreviewHub {
    state: Mutex<HubState>,
    fallback_title: String,
}

impl PreviewHub {
    /// Create a hub holding an empty snapshot titled `fallback_title`.
    #[must_use]
    pub fn new(fallback_title: impl Into<String>) -> Self {
        Self::with_queue_capacity(fallback_title, SESSION_QUEUE_CAPACITY)
    }

    /// Create a hub whose sessions may queue up to `capacity` snapshots.
    #[must_use]
    pub fn with_queue_capacity(fallback_title: impl Into<String>, capacity: usize) -> Self {
        let fallback_title = fallback_title.into();
        Self {
            state: Mutex::new(HubState {
                snapshot: Arc::new(DocumentSnapshot::empty(&fallback_title)),
                sessions: SessionRegistry::new(capacity),
            }),
            fallback_title,
        }
    }

    /// Title used when the document has no leading heading.
    #[must_use]
    pub fn fallback_title(&self) -> &str {
        &self.fallback_title
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<DocumentSnapshot> {
        Arc::clone(&self.lock().snapshot)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Register a new viewer session.
    ///
    /// The current snapshot is queued as the session's first message before
    /// the lock is released, so no publish can slip in between.
    #[must_use]
    pub fn register(self: &Arc<Self>) -> SessionHandle {
        let mut state = self.lock();
        let welcome = Arc::clone(&state.snapshot);
        let (id, updates) = state.sessions.register(welcome);
        drop(state);

        SessionHandle {
            id,
            updates,
            hub: Arc::clone(self),
        }
    }

    /// Commit `snapshot` as the current one and broadcast it to every session.
    pub fn publish(&self, snapshot: DocumentSnapshot) -> BroadcastReport {
        let mut state = self.lock();
        state.snapshot = Arc::new(snapshot);
        let snapshot = Arc::clone(&state.snapshot);
        state.sessions.broadcast(&snapshot)
    }

    fn unregister(&self, id: SessionId) {
        self.lock().sessions.unregister(id);
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A registered viewer session.
///
/// Yields snapshots in publish order, starting with the one current at
/// registration. Dropping the handle unregisters the session.
pub struct SessionHandle {
    id: SessionId,
    updates: mpsc::Receiver<Arc<DocumentSnapshot>>,
    hub: Arc<PreviewHub>,
}

impl SessionHandle {
    /// Session identity.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the hub has pruned this session.
    pub async fn recv(&mut self) -> Option<Arc<DocumentSnapshot>> {
        self.updates.recv().await
    }

    /// Take the next queued snapshot without waiting.
    #[must_use]
    pub fn try_recv(&mut self) -> Option<Arc<DocumentSnapshot>> {
        self.updates.try_recv().ok()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}
