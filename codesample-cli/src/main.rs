//! codesample — inspect code sample fragments and sync state.
//!
//! # Usage
//!
//! ```text
//! codesample diff <old.json> <new.json>
//! codesample render <fragments.json> [--json]
//! codesample changes <payload.json> [--json]
//! codesample snapshot <path> [--store <dir> | --config <file>] [--archived]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    changes::ChangesArgs, diff::DiffArgs, render::RenderArgs, snapshot::SnapshotArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "codesample",
    version,
    about = "Inspect code sample fragments, bundles and sync snapshots",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile two fragment lists and show what a sync would push.
    Diff(DiffArgs),

    /// Group fragments by codename root and show the backend records.
    Render(RenderArgs),

    /// Show the paths a push notification adds, modifies and removes.
    Changes(ChangesArgs),

    /// Show the stored snapshot (or tombstone) of a tracked path.
    Snapshot(SnapshotArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Diff(args) => args.run(),
        Commands::Render(args) => args.run(),
        Commands::Changes(args) => args.run(),
        Commands::Snapshot(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
