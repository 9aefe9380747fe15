//! Source repository port.

use async_trait::async_trait;

use codesample_core::CodeFragment;

use crate::error::SourceError;

/// Fetches a file from the documentation repository and extracts its fragments.
#[async_trait]
pub trait FragmentSource: Send + Sync {
    /// Fragments of `path` in file order.
    ///
    /// Fails with [`SourceError::NotFound`] if the path no longer exists upstream.
    async fn fetch_fragments(&self, path: &str) -> Result<Vec<CodeFragment>, SourceError>;
}
