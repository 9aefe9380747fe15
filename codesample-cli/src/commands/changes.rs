//! `codesample changes <payload>` — net path changes of a push notification.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use codesample_sync::webhook;

/// Arguments for `codesample changes`.
#[derive(Args, Debug)]
pub struct ChangesArgs {
    /// Push notification payload (JSON).
    pub payload: PathBuf,

    /// Emit the change set as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ChangesArgs {
    pub fn run(self) -> Result<()> {
        let payload = std::fs::read_to_string(&self.payload)
            .with_context(|| format!("failed to read {}", self.payload.display()))?;
        let changes = webhook::parse_push(&payload)
            .with_context(|| format!("failed to parse {}", self.payload.display()))?;
        tracing::debug!(
            added = changes.added.len(),
            modified = changes.modified.len(),
            removed = changes.removed.len(),
            "parsed push payload"
        );

        if self.json {
            println!("{}", serde_json::to_string_pretty(&changes)?);
            return Ok(());
        }

        if changes.is_empty() {
            println!("No file changes.");
            return Ok(());
        }

        for path in &changes.added {
            println!("{} {path}", "A".green().bold());
        }
        for path in &changes.modified {
            println!("{} {path}", "M".yellow().bold());
        }
        for path in &changes.removed {
            println!("{} {path}", "D".red().bold());
        }
        Ok(())
    }
}
