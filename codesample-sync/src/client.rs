//! Idempotent push of bundles into the content backend.
//!
//! ## Upsert
//!
//! 1. Look up the item by codename root; create it if missing.
//! 2. Render the bundle to a full record.
//! 3. Write the record as the item's working variant.
//! 4. On a publish conflict, open a new draft version and write once more.
//!
//! ## Remove
//!
//! Clears the languages present in the bundle, leaving the item and its
//! other languages in place. A missing item is a no-op. Uses the same
//! single-retry publish conflict policy as upsert.

use std::sync::Arc;

use codesample_core::config::DEFAULT_CONTENT_TYPE;
use codesample_core::{CodeSamples, CodenameCodeFragments, ContentItem};

use crate::backend::ContentBackend;
use crate::error::{BackendError, SyncError};
use crate::grouper;

/// Outcome of [`ContentSyncClient::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The item exists and the bundle's languages were cleared.
    Cleared(CodeSamples),
    /// No item or no variant for the codename root; nothing to clear.
    Absent,
}

pub struct ContentSyncClient<B: ?Sized> {
    backend: Arc<B>,
    content_type: String,
}

impl<B: ?Sized> Clone for ContentSyncClient<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            content_type: self.content_type.clone(),
        }
    }
}

impl<B> ContentSyncClient<B>
where
    B: ContentBackend + ?Sized,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Content type given to items this client creates.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Create-or-update the item for `bundle` and return the written record.
    pub async fn upsert(&self, bundle: &CodenameCodeFragments) -> Result<CodeSamples, SyncError> {
        let record = grouper::to_record(bundle);
        let item = self.ensure_item(bundle).await?;
        let written = self.write_with_retry(&item, &record).await?;
        tracing::info!(
            codename = %bundle.codename_root,
            languages = ?written.filled(),
            "upserted code samples",
        );
        Ok(written)
    }

    /// Clear the bundle's languages on the item, if it exists.
    pub async fn remove(&self, bundle: &CodenameCodeFragments) -> Result<RemoveOutcome, SyncError> {
        let root = &bundle.codename_root;
        let Some(item) = self.backend.get_item(root.as_str()).await? else {
            tracing::debug!(codename = %root, "no item to clear");
            return Ok(RemoveOutcome::Absent);
        };
        let Some(current) = self.backend.get_variant(&item).await? else {
            tracing::debug!(codename = %root, "item has no variant to clear");
            return Ok(RemoveOutcome::Absent);
        };

        let languages = bundle.languages();
        let cleared = grouper::clear_languages(&current, &languages);
        let written = self.write_with_retry(&item, &cleared).await?;
        tracing::info!(codename = %root, languages = ?languages, "cleared code samples");
        Ok(RemoveOutcome::Cleared(written))
    }

    async fn ensure_item(&self, bundle: &CodenameCodeFragments) -> Result<ContentItem, SyncError> {
        let root = bundle.codename_root.as_str();
        if let Some(item) = self.backend.get_item(root).await? {
            return Ok(item);
        }
        let name = grouper::title_from_codename_root(root);
        tracing::info!(codename = root, name = %name, "creating content item");
        Ok(self
            .backend
            .create_item(root, &name, &self.content_type)
            .await?)
    }

    async fn write_with_retry(
        &self,
        item: &ContentItem,
        record: &CodeSamples,
    ) -> Result<CodeSamples, SyncError> {
        match self.backend.write_variant(item, record).await {
            Err(BackendError::PublishConflict { codename }) => {
                tracing::warn!(codename = %codename, "variant is published; creating new version");
                self.backend.create_draft_version(item).await?;
                match self.backend.write_variant(item, record).await {
                    Err(BackendError::PublishConflict { codename }) => {
                        Err(SyncError::PublishConflictAfterRetry { codename })
                    }
                    other => Ok(other?),
                }
            }
            other => Ok(other?),
        }
    }
}
