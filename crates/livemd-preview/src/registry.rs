//! Session bookkeeping.
//!
//! Sessions are keyed by a monotonically increasing [`SessionId`], so adding
//! and pruning are O(1) and ids are never reused within a process.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::snapshot::DocumentSnapshot;

/// Pending snapshots a session may have queued before it counts as stalled.
pub const SESSION_QUEUE_CAPACITY: usize = 16;

/// Identity of a registered viewer session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a single broadcast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Sessions the snapshot was queued for.
    pub delivered: usize,
    /// Sessions dropped because their queue was closed or full.
    pub pruned: usize,
}

/// Set of live viewer sessions.
///
/// Not synchronized on its own; [`PreviewHub`](crate::PreviewHub) guards it
/// together with the current snapshot.
pub(crate) struct SessionRegistry {
    sessions: HashMap<SessionId, mpsc::Sender<Arc<DocumentSnapshot>>>,
    next_id: u64,
    capacity: usize,
}

impl SessionRegistry {
    /// Create an empty registry whose sessions queue up to `capacity` snapshots.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            next_id: 0,
            capacity: capacity.max(1),
        }
    }

    /// Add a session and queue `welcome` as its first message.
    ///
    /// Returns the new id and the receiving end of the session queue.
    pub(crate) fn register(
        &mut self,
        welcome: Arc<DocumentSnapshot>,
    ) -> (SessionId, mpsc::Receiver<Arc<DocumentSnapshot>>) {
        let id = SessionId(self.next_id);
        self.next_id += 1;

        let (tx, rx) = mpsc::channel(self.capacity);
        // Fresh queue with capacity >= 1 and a live receiver: cannot fail
        let _ = tx.try_send(welcome);
        self.sessions.insert(id, tx);

        tracing::debug!(session = %id, sessions = self.sessions.len(), "Session registered");
        (id, rx)
    }

    /// Remove a session. Returns `false` if it was already gone.
    pub(crate) fn unregister(&mut self, id: SessionId) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            tracing::debug!(session = %id, sessions = self.sessions.len(), "Session unregistered");
        }
        removed
    }

    /// Queue `snapshot` for every session, pruning the ones that cannot take it.
    ///
    /// Every session gets exactly one attempt; a failure on one never stops
    /// delivery to the others.
    pub(crate) fn broadcast(&mut self, snapshot: &Arc<DocumentSnapshot>) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        self.sessions
            .retain(|id, tx| match tx.try_send(Arc::clone(snapshot)) {
                Ok(()) => {
                    report.delivered += 1;
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(session = %id, "Session closed, pruning");
                    report.pruned += 1;
                    false
                }
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(session = %id, "Session stalled, pruning");
                    report.pruned += 1;
                    false
                }
            });

        report
    }

    /// Number of registered sessions.
    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }
}
