//! codesample core library: domain types, configuration, errors.
//!
//! - [`types`] — fragments, files, bundles and the fixed-shape backend record
//! - [`config`] — the explicit [`SyncConfig`] value and its YAML loader
//! - [`error`] — [`CoreError`] and [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{BackendConfig, StoreConfig, SyncConfig};
pub use error::{ConfigError, CoreError};
pub use types::{
    ChangeSet, CodeFile, CodeFragment, CodeSamples, CodenameCodeFragments, CodenameRoot,
    ContentItem, FragmentKey, FragmentType, Language,
};
