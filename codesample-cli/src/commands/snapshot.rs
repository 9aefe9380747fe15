//! `codesample snapshot <path>` — show what the snapshot store holds for a path.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use codesample_core::{config, CodeFile};
use codesample_sync::store::json;

/// Arguments for `codesample snapshot`.
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Repository-relative path of the tracked file.
    pub path: String,

    /// Snapshot store root (defaults to `~/.codesample/snapshots`).
    #[arg(long, conflicts_with = "config")]
    pub store: Option<PathBuf>,

    /// Take the store root from a config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show the tombstone left by a removal instead of the active snapshot.
    #[arg(long)]
    pub archived: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SnapshotArgs {
    pub fn run(self) -> Result<()> {
        let root = self.store_root()?;

        if self.archived {
            let Some(doc) = json::tombstone_at(&root, &self.path)
                .with_context(|| format!("failed to read tombstone for '{}'", self.path))?
            else {
                println!("No tombstone for '{}'.", self.path);
                return Ok(());
            };
            if self.json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
                return Ok(());
            }
            if let Some(archived_at) = doc.archived_at {
                println!("archived at {}", archived_at.to_rfc3339());
            }
            print_file(&doc.file);
            return Ok(());
        }

        let Some(file) = json::load_at(&root, &self.path)
            .with_context(|| format!("failed to read snapshot for '{}'", self.path))?
        else {
            println!("'{}' is not tracked.", self.path);
            return Ok(());
        };
        if self.json {
            println!("{}", serde_json::to_string_pretty(&file)?);
            return Ok(());
        }
        print_file(&file);
        Ok(())
    }

    fn store_root(&self) -> Result<PathBuf> {
        let root = if let Some(store) = &self.store {
            store.clone()
        } else if let Some(config_path) = &self.config {
            let config = config::load_at(config_path)
                .with_context(|| format!("failed to load config {}", config_path.display()))?;
            config.store.root
        } else {
            let home = dirs::home_dir().context("could not determine home directory")?;
            home.join(".codesample").join("snapshots")
        };
        tracing::debug!(root = %root.display(), "using snapshot store");
        Ok(root)
    }
}

fn print_file(file: &CodeFile) {
    println!(
        "{} ({} fragment(s))",
        file.path.bold(),
        file.fragments.len()
    );
    for fragment in &file.fragments {
        println!(
            "  {}  {} line(s)",
            fragment.key(),
            fragment.content.lines().count()
        );
    }
}
