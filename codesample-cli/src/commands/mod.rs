pub mod changes;
pub mod diff;
pub mod render;
pub mod snapshot;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use codesample_core::{CodeFile, CodeFragment};

/// Fragment input accepted by the commands: a bare list or a whole `CodeFile`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FragmentInput {
    File(CodeFile),
    List(Vec<CodeFragment>),
}

pub(crate) fn read_fragments(path: &Path) -> Result<Vec<CodeFragment>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let input: FragmentInput = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a fragment list or code file", path.display()))?;
    let fragments = match input {
        FragmentInput::File(file) => file.fragments,
        FragmentInput::List(fragments) => fragments,
    };
    tracing::debug!(
        path = %path.display(),
        fragments = fragments.len(),
        "read fragment input"
    );
    Ok(fragments)
}
