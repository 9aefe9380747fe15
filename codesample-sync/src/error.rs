//! Error types for codesample-sync.

use std::path::PathBuf;

use thiserror::Error;

use codesample_core::CodenameRoot;

/// Errors surfaced by a [`crate::ContentBackend`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The item's current variant is published and cannot be written in place.
    #[error("cannot update published content of '{codename}'")]
    PublishConflict { codename: CodenameRoot },

    /// The backend refused the request for any other reason.
    #[error("backend rejected request for '{codename}': {message}")]
    Rejected {
        codename: CodenameRoot,
        message: String,
    },

    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by a [`crate::SnapshotStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot document could not be (de)serialized.
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A blocking store task panicked or was cancelled.
    #[error("store task join error: {0}")]
    Join(String),
}

/// Errors surfaced by a [`crate::FragmentSource`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The path no longer exists upstream.
    #[error("source file not found: {path}")]
    NotFound { path: String },

    /// Any other fetch or parse failure.
    #[error("failed to fetch {path}: {message}")]
    Fetch { path: String, message: String },
}

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// The write still conflicted after a new draft version was created.
    #[error("'{codename}' is still published after creating a new version")]
    PublishConflictAfterRetry { codename: CodenameRoot },

    /// The change notification payload could not be parsed.
    #[error("invalid change notification: {0}")]
    Webhook(#[source] serde_json::Error),

    /// A per-path or per-bundle task panicked or was cancelled.
    #[error("task join error: {0}")]
    Join(String),

    /// At least one unit of work in the invocation failed.
    #[error("{failed} unit(s) of work failed")]
    Partial { failed: usize },
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
