//! Error types for codesample-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while interpreting domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A language name outside the supported set.
    #[error("unknown language '{0}'")]
    UnknownLanguage(String),

    /// A fragment type name that is not recognised.
    #[error("unknown fragment type '{0}'")]
    UnknownFragmentType(String),
}

/// Errors raised while loading a [`crate::SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with file path and serde_yaml's line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed but holds an unusable value.
    #[error("invalid config: {0}")]
    Invalid(String),
}
