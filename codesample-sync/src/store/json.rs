//! File-backed snapshot store.
//!
//! Layout under the configured root:
//!
//! ```text
//! <root>/
//!   active/<sha256(path)>.json    (last stored CodeFile per tracked path)
//!   archive/<sha256(path)>.json   (tombstones of removed paths)
//! ```
//!
//! Writes go to `<file>.json.tmp` and are renamed into place. Archiving is a
//! rename from `active/` to `archive/`, so a path is never in both sets after
//! a completed call.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use codesample_core::CodeFile;

use crate::error::{io_err, StoreError};
use crate::store::SnapshotStore;

/// On-disk snapshot payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotDocument {
    pub stored_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    pub file: CodeFile,
}

/// `<root>/active/<key>.json`
pub fn active_path_at(root: &Path, path: &str) -> PathBuf {
    root.join("active").join(format!("{}.json", path_key(path)))
}

/// `<root>/archive/<key>.json`
pub fn archive_path_at(root: &Path, path: &str) -> PathBuf {
    root.join("archive").join(format!("{}.json", path_key(path)))
}

/// Store `file`, replacing any active snapshot and clearing its tombstone.
pub fn store_at(root: &Path, file: &CodeFile) -> Result<(), StoreError> {
    let doc = SnapshotDocument {
        stored_at: Utc::now(),
        archived_at: None,
        file: file.clone(),
    };
    write_document(&active_path_at(root, &file.path), &doc)?;
    remove_if_exists(&archive_path_at(root, &file.path))?;
    tracing::debug!(path = %file.path, fragments = file.fragments.len(), "stored snapshot");
    Ok(())
}

/// Load the active snapshot for `path`.
pub fn load_at(root: &Path, path: &str) -> Result<Option<CodeFile>, StoreError> {
    Ok(read_document(&active_path_at(root, path))?.map(|doc| doc.file))
}

/// Move the active snapshot for `path` to the archive and return it.
pub fn archive_at(root: &Path, path: &str) -> Result<Option<CodeFile>, StoreError> {
    let active = active_path_at(root, path);
    let Some(mut doc) = read_document(&active)? else {
        return Ok(None);
    };

    let archived = archive_path_at(root, path);
    ensure_parent(&archived)?;
    std::fs::rename(&active, &archived).map_err(|e| io_err(&active, e))?;

    doc.archived_at = Some(Utc::now());
    write_document(&archived, &doc)?;
    tracing::debug!(path, "archived snapshot");
    Ok(Some(doc.file))
}

/// Last archived value for `path`, with its timestamps.
pub fn tombstone_at(root: &Path, path: &str) -> Result<Option<SnapshotDocument>, StoreError> {
    read_document(&archive_path_at(root, path))
}

fn path_key(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    hex::encode(hasher.finalize())
}

fn read_document(file: &Path) -> Result<Option<SnapshotDocument>, StoreError> {
    match std::fs::read_to_string(file) {
        Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(file, err)),
    }
}

fn write_document(file: &Path, doc: &SnapshotDocument) -> Result<(), StoreError> {
    ensure_parent(file)?;
    let json = serde_json::to_string_pretty(doc)?;
    let tmp = file.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, file) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(file, e));
    }
    Ok(())
}

fn ensure_parent(file: &Path) -> Result<(), StoreError> {
    let Some(dir) = file.parent() else {
        return Err(io_err(file, std::io::Error::other("invalid snapshot path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))
}

fn remove_if_exists(file: &Path) -> Result<(), StoreError> {
    match std::fs::remove_file(file) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(file, err)),
    }
}

// ---------------------------------------------------------------------------
// SnapshotStore adapter
// ---------------------------------------------------------------------------

/// [`SnapshotStore`] over the directory layout above.
///
/// Blocking filesystem work runs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn tombstone(&self, path: &str) -> Result<Option<SnapshotDocument>, StoreError> {
        let root = self.root.clone();
        let path = path.to_string();
        run_blocking(move || tombstone_at(&root, &path)).await
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn store(&self, file: &CodeFile) -> Result<(), StoreError> {
        let root = self.root.clone();
        let file = file.clone();
        run_blocking(move || store_at(&root, &file)).await
    }

    async fn get(&self, path: &str) -> Result<Option<CodeFile>, StoreError> {
        let root = self.root.clone();
        let path = path.to_string();
        run_blocking(move || load_at(&root, &path)).await
    }

    async fn archive(&self, path: &str) -> Result<Option<CodeFile>, StoreError> {
        let root = self.root.clone();
        let path = path.to_string();
        run_blocking(move || archive_at(&root, &path)).await
    }
}

async fn run_blocking<T, F>(job: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|err| StoreError::Join(err.to_string()))?
}

#[cfg(test)]
mod tests {
    use codesample_core::{CodeFragment, Language};
    use tempfile::TempDir;

    use super::*;

    fn sample_file(path: &str, content: &str) -> CodeFile {
        CodeFile::new(
            path,
            vec![CodeFragment::new("intro_curl", Language::Curl, content)],
        )
    }

    #[test]
    fn missing_snapshot_loads_as_none() {
        let tmp = TempDir::new().unwrap();
        assert!(load_at(tmp.path(), "docs/intro.md").unwrap().is_none());
    }

    #[test]
    fn store_then_load_returns_latest_value() {
        let tmp = TempDir::new().unwrap();
        store_at(tmp.path(), &sample_file("docs/intro.md", "v1")).unwrap();
        store_at(tmp.path(), &sample_file("docs/intro.md", "v2")).unwrap();
        let loaded = load_at(tmp.path(), "docs/intro.md").unwrap().unwrap();
        assert_eq!(loaded, sample_file("docs/intro.md", "v2"));
    }

    #[test]
    fn tmp_file_cleaned_up_after_store() {
        let tmp = TempDir::new().unwrap();
        store_at(tmp.path(), &sample_file("a.md", "x")).unwrap();
        let tmp_path = active_path_at(tmp.path(), "a.md").with_extension("json.tmp");
        assert!(!tmp_path.exists(), "tmp file should be removed after atomic rename");
    }

    #[test]
    fn archive_moves_snapshot_to_tombstone() {
        let tmp = TempDir::new().unwrap();
        store_at(tmp.path(), &sample_file("a.md", "x")).unwrap();

        let archived = archive_at(tmp.path(), "a.md").unwrap();
        assert_eq!(archived, Some(sample_file("a.md", "x")));
        assert!(load_at(tmp.path(), "a.md").unwrap().is_none());

        let tombstone = tombstone_at(tmp.path(), "a.md").unwrap().expect("tombstone");
        assert!(tombstone.archived_at.is_some());
        assert_eq!(tombstone.file, sample_file("a.md", "x"));
    }

    #[test]
    fn archive_of_unknown_path_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(archive_at(tmp.path(), "never.md").unwrap().is_none());
        assert!(tombstone_at(tmp.path(), "never.md").unwrap().is_none());
    }

    #[test]
    fn archive_twice_returns_none_second_time() {
        let tmp = TempDir::new().unwrap();
        store_at(tmp.path(), &sample_file("a.md", "x")).unwrap();
        assert!(archive_at(tmp.path(), "a.md").unwrap().is_some());
        assert!(archive_at(tmp.path(), "a.md").unwrap().is_none());
        assert!(tombstone_at(tmp.path(), "a.md").unwrap().is_some());
    }

    #[test]
    fn storing_again_clears_tombstone() {
        let tmp = TempDir::new().unwrap();
        store_at(tmp.path(), &sample_file("a.md", "x")).unwrap();
        archive_at(tmp.path(), "a.md").unwrap();
        store_at(tmp.path(), &sample_file("a.md", "y")).unwrap();
        assert!(tombstone_at(tmp.path(), "a.md").unwrap().is_none());
        assert_eq!(
            load_at(tmp.path(), "a.md").unwrap(),
            Some(sample_file("a.md", "y"))
        );
    }

    #[test]
    fn corrupt_snapshot_is_a_json_error() {
        let tmp = TempDir::new().unwrap();
        let file = active_path_at(tmp.path(), "a.md");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "{ not json").unwrap();
        assert!(matches!(load_at(tmp.path(), "a.md"), Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn async_adapter_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path());
        store.store(&sample_file("a.md", "x")).await.unwrap();
        assert_eq!(
            store.get("a.md").await.unwrap(),
            Some(sample_file("a.md", "x"))
        );
        assert!(store.archive("a.md").await.unwrap().is_some());
        assert!(store.tombstone("a.md").await.unwrap().is_some());
        assert!(store.get("a.md").await.unwrap().is_none());
    }
}
