//! Content backend port.
//!
//! The backend keeps one content item per codename root. An item's working
//! variant is either a draft (writable) or published (writable only after a
//! new draft version is created).

use async_trait::async_trait;

use codesample_core::{CodeSamples, ContentItem};

use crate::error::BackendError;

#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Look up an item by codename root. `Ok(None)` when it does not exist.
    async fn get_item(&self, codename: &str) -> Result<Option<ContentItem>, BackendError>;

    /// Create an item of `content_type` whose codename is `codename` and
    /// display name is `name`.
    async fn create_item(
        &self,
        codename: &str,
        name: &str,
        content_type: &str,
    ) -> Result<ContentItem, BackendError>;

    /// Current variant of an item, if one was ever written.
    async fn get_variant(&self, item: &ContentItem) -> Result<Option<CodeSamples>, BackendError>;

    /// Write the item's working variant.
    ///
    /// Fails with [`BackendError::PublishConflict`] when the variant is published.
    async fn write_variant(
        &self,
        item: &ContentItem,
        record: &CodeSamples,
    ) -> Result<CodeSamples, BackendError>;

    /// Open a new draft version of a published variant.
    async fn create_draft_version(&self, item: &ContentItem) -> Result<(), BackendError>;
}
