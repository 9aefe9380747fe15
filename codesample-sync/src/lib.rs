//! # codesample-sync
//!
//! Fragment reconciliation and backend synchronization.
//!
//! Build a [`SyncOrchestrator`] from a [`codesample_core::SyncConfig`] and the
//! three collaborators ([`SnapshotStore`], [`FragmentSource`],
//! [`ContentBackend`]), then call [`SyncOrchestrator::run`] once per change
//! notification.

pub mod backend;
pub mod client;
pub mod error;
pub mod grouper;
pub mod memory;
pub mod orchestrator;
pub mod reconcile;
pub mod source;
pub mod store;
pub mod webhook;

pub use backend::ContentBackend;
pub use client::{ContentSyncClient, RemoveOutcome};
pub use error::{BackendError, SourceError, StoreError, SyncError};
pub use orchestrator::{SyncFailure, SyncOrchestrator, SyncReport, WorkUnit};
pub use reconcile::{compare, FragmentDelta};
pub use source::FragmentSource;
pub use store::{JsonFileStore, SnapshotStore};
