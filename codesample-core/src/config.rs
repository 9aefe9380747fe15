//! Sync configuration.
//!
//! A [`SyncConfig`] is built once and handed to the orchestrator and its
//! collaborators at construction. Nothing in the engine reads the process
//! environment.
//!
//! ```yaml
//! concurrency: 8
//! store:
//!   root: /var/lib/codesample/snapshots
//! backend:
//!   project_id: 975bf280-fd91-488c-994c-2f04416e5ee3
//!   api_key: ew0KICAiYWxnIjo...
//!   content_type: code_samples
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_CONTENT_TYPE: &str = "code_samples";

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Upper bound on per-path and per-bundle tasks running at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            store: StoreConfig::default(),
            backend: None,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if let Some(backend) = &self.backend {
            if backend.project_id.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "backend.project_id must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Location of the file-backed snapshot store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".codesample").join("snapshots"),
        }
    }
}

/// Connection values for the content backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub project_id: String,
    pub api_key: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"<redacted>")
            .field("content_type", &self.content_type)
            .finish()
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

/// Load and validate a config document from `path`.
pub fn load_at(path: &Path) -> Result<SyncConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SyncConfig =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}
