//! Snapshot store port and its file-backed implementation.

pub mod json;

use async_trait::async_trait;

use codesample_core::CodeFile;

use crate::error::StoreError;

pub use json::JsonFileStore;

/// Durable last-known fragment set per tracked path.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Upsert by path, replacing any prior value.
    async fn store(&self, file: &CodeFile) -> Result<(), StoreError>;

    async fn get(&self, path: &str) -> Result<Option<CodeFile>, StoreError>;

    /// Remove `path` from the active set and return its last value, if any.
    /// The value stays retrievable as a tombstone.
    async fn archive(&self, path: &str) -> Result<Option<CodeFile>, StoreError>;
}
