//! In-memory adapters for every port.
//!
//! Used by the test suites and for offline runs. [`MemoryBackend`] records
//! each call it receives so tests can assert on the exact request sequence.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use codesample_core::{CodeFile, CodeFragment, CodeSamples, CodenameRoot, ContentItem};

use crate::backend::ContentBackend;
use crate::error::{BackendError, SourceError, StoreError};
use crate::source::FragmentSource;
use crate::store::SnapshotStore;

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StoreState {
    active: HashMap<String, CodeFile>,
    archived: HashMap<String, CodeFile>,
    failing: HashSet<String>,
}

/// [`SnapshotStore`] kept in a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tombstone left by [`SnapshotStore::archive`].
    pub async fn archived(&self, path: &str) -> Option<CodeFile> {
        self.state.lock().await.archived.get(path).cloned()
    }

    /// Make every operation on `path` fail.
    pub async fn fail_on(&self, path: &str) {
        self.state.lock().await.failing.insert(path.to_string());
    }
}

fn store_failure(path: &str) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source: std::io::Error::other("injected store failure"),
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn store(&self, file: &CodeFile) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.failing.contains(&file.path) {
            return Err(store_failure(&file.path));
        }
        state.archived.remove(&file.path);
        state.active.insert(file.path.clone(), file.clone());
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<CodeFile>, StoreError> {
        let state = self.state.lock().await;
        if state.failing.contains(path) {
            return Err(store_failure(path));
        }
        Ok(state.active.get(path).cloned())
    }

    async fn archive(&self, path: &str) -> Result<Option<CodeFile>, StoreError> {
        let mut state = self.state.lock().await;
        if state.failing.contains(path) {
            return Err(store_failure(path));
        }
        let Some(file) = state.active.remove(path) else {
            return Ok(None);
        };
        state.archived.insert(path.to_string(), file.clone());
        Ok(Some(file))
    }
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// [`FragmentSource`] serving preset fragment lists.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: Mutex<HashMap<String, Result<Vec<CodeFragment>, SourceError>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, path: &str, fragments: Vec<CodeFragment>) {
        self.files
            .lock()
            .await
            .insert(path.to_string(), Ok(fragments));
    }

    /// Make fetches of `path` fail with a non-not-found error.
    pub async fn fail(&self, path: &str, message: &str) {
        self.files.lock().await.insert(
            path.to_string(),
            Err(SourceError::Fetch {
                path: path.to_string(),
                message: message.to_string(),
            }),
        );
    }
}

#[async_trait]
impl FragmentSource for MemorySource {
    async fn fetch_fragments(&self, path: &str) -> Result<Vec<CodeFragment>, SourceError> {
        match self.files.lock().await.get(path) {
            Some(result) => result.clone(),
            None => Err(SourceError::NotFound {
                path: path.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryBackend
// ---------------------------------------------------------------------------

/// One request received by a [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    GetItem(String),
    CreateItem {
        codename: String,
        name: String,
        content_type: String,
    },
    GetVariant(String),
    WriteVariant(String),
    CreateDraftVersion(String),
}

impl BackendCall {
    /// Whether the call changes backend state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            BackendCall::CreateItem { .. }
                | BackendCall::WriteVariant(_)
                | BackendCall::CreateDraftVersion(_)
        )
    }
}

#[derive(Debug)]
struct ItemState {
    item: ContentItem,
    variant: Option<CodeSamples>,
    published: bool,
}

#[derive(Debug, Default)]
struct BackendState {
    items: HashMap<String, ItemState>,
    calls: Vec<BackendCall>,
    always_conflict: bool,
    failing: HashSet<String>,
    next_id: u64,
}

impl BackendState {
    fn check_failing(&self, codename: &str) -> Result<(), BackendError> {
        if self.failing.contains(codename) {
            return Err(BackendError::Unavailable(format!(
                "injected failure for '{codename}'"
            )));
        }
        Ok(())
    }

    fn item_mut(&mut self, item: &ContentItem) -> Result<&mut ItemState, BackendError> {
        self.items
            .get_mut(item.codename.as_str())
            .ok_or_else(|| BackendError::Rejected {
                codename: item.codename.clone(),
                message: "item does not exist".to_string(),
            })
    }
}

/// [`ContentBackend`] with draft/published variant semantics.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<BackendState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an item directly, bypassing the call log.
    pub async fn seed(&self, codename: &str, variant: Option<CodeSamples>) -> ContentItem {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let item = ContentItem {
            id: format!("item-{}", state.next_id),
            codename: CodenameRoot::from(codename),
            name: codename.to_string(),
        };
        state.items.insert(
            codename.to_string(),
            ItemState {
                item: item.clone(),
                variant,
                published: false,
            },
        );
        item
    }

    /// Mark the item's current variant as published.
    pub async fn publish(&self, codename: &str) {
        if let Some(item) = self.state.lock().await.items.get_mut(codename) {
            item.published = true;
        }
    }

    /// Reject every variant write with a publish conflict.
    pub async fn set_always_conflict(&self, always: bool) {
        self.state.lock().await.always_conflict = always;
    }

    /// Make every call about `codename` fail as unavailable.
    pub async fn fail_on(&self, codename: &str) {
        self.state.lock().await.failing.insert(codename.to_string());
    }

    pub async fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn item(&self, codename: &str) -> Option<ContentItem> {
        self.state
            .lock()
            .await
            .items
            .get(codename)
            .map(|s| s.item.clone())
    }

    pub async fn variant(&self, codename: &str) -> Option<CodeSamples> {
        self.state
            .lock()
            .await
            .items
            .get(codename)
            .and_then(|s| s.variant.clone())
    }

    pub async fn is_published(&self, codename: &str) -> bool {
        self.state
            .lock()
            .await
            .items
            .get(codename)
            .is_some_and(|s| s.published)
    }
}

#[async_trait]
impl ContentBackend for MemoryBackend {
    async fn get_item(&self, codename: &str) -> Result<Option<ContentItem>, BackendError> {
        let mut state = self.state.lock().await;
        state.calls.push(BackendCall::GetItem(codename.to_string()));
        state.check_failing(codename)?;
        Ok(state.items.get(codename).map(|s| s.item.clone()))
    }

    async fn create_item(
        &self,
        codename: &str,
        name: &str,
        content_type: &str,
    ) -> Result<ContentItem, BackendError> {
        let mut state = self.state.lock().await;
        state.calls.push(BackendCall::CreateItem {
            codename: codename.to_string(),
            name: name.to_string(),
            content_type: content_type.to_string(),
        });
        state.check_failing(codename)?;
        if state.items.contains_key(codename) {
            return Err(BackendError::Rejected {
                codename: CodenameRoot::from(codename),
                message: "codename already in use".to_string(),
            });
        }
        state.next_id += 1;
        let item = ContentItem {
            id: format!("item-{}", state.next_id),
            codename: CodenameRoot::from(codename),
            name: name.to_string(),
        };
        state.items.insert(
            codename.to_string(),
            ItemState {
                item: item.clone(),
                variant: None,
                published: false,
            },
        );
        Ok(item)
    }

    async fn get_variant(&self, item: &ContentItem) -> Result<Option<CodeSamples>, BackendError> {
        let mut state = self.state.lock().await;
        state
            .calls
            .push(BackendCall::GetVariant(item.codename.0.clone()));
        state.check_failing(item.codename.as_str())?;
        Ok(state.item_mut(item)?.variant.clone())
    }

    async fn write_variant(
        &self,
        item: &ContentItem,
        record: &CodeSamples,
    ) -> Result<CodeSamples, BackendError> {
        let mut state = self.state.lock().await;
        state
            .calls
            .push(BackendCall::WriteVariant(item.codename.0.clone()));
        state.check_failing(item.codename.as_str())?;
        let always_conflict = state.always_conflict;
        let entry = state.item_mut(item)?;
        if always_conflict || entry.published {
            return Err(BackendError::PublishConflict {
                codename: item.codename.clone(),
            });
        }
        entry.variant = Some(record.clone());
        Ok(record.clone())
    }

    async fn create_draft_version(&self, item: &ContentItem) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state
            .calls
            .push(BackendCall::CreateDraftVersion(item.codename.0.clone()));
        state.check_failing(item.codename.as_str())?;
        state.item_mut(item)?.published = false;
        Ok(())
    }
}
