//! Live preview pipeline for livemd.
//!
//! Watches a single markdown file, re-renders it on every write and pushes the
//! result to every connected viewer session.
//!
//! # Architecture
//!
//! ```text
//! notify thread ──raw events──► ChangeWatcher task
//!                                   │ (qualifying writes only)
//!                                   ▼
//!                        PipelineEvent::Changed
//!                                   │
//!                                   ▼
//!                         BroadcastPipeline task ──read──► DocumentSource
//!                                   │  render + guess title
//!                                   ▼
//!                              PreviewHub ─── snapshot (single writer)
//!                                   │
//!                                   └─► SessionRegistry ──try_send──► per-session queues
//!                                                                        │
//!                                                    websocket handlers ◄┘
//! ```
//!
//! The [`PreviewHub`] owns both the current [`DocumentSnapshot`] and the
//! session set behind one lock, so a session registering while a broadcast is
//! in flight either receives the old snapshot and then the broadcast, or the
//! new snapshot directly.

mod error;
mod hub;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod pipeline;
mod registry;
mod snapshot;
mod source;
mod watcher;

pub use error::PreviewError;
pub use hub::{PreviewHub, SessionHandle};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockSource;
pub use pipeline::{BroadcastPipeline, PipelineEvent, PipelineState};
pub use registry::{BroadcastReport, SESSION_QUEUE_CAPACITY, SessionId};
pub use snapshot::DocumentSnapshot;
pub use source::{DocumentSource, FsSource};
pub use watcher::ChangeWatcher;

pub use livemd_renderer::DEFAULT_TITLE;
