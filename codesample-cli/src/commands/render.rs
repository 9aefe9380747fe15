//! `codesample render <fragments>` — show the records a sync would write.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use codesample_core::{CodeSamples, CodenameCodeFragments};
use codesample_sync::grouper;

use super::read_fragments;

/// Arguments for `codesample render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Fragment list (JSON array or code file).
    pub fragments: PathBuf,

    /// Emit the full records as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RenderedItem {
    codename: String,
    name: String,
    record: CodeSamples,
}

#[derive(Tabled)]
struct BundleRow {
    #[tabled(rename = "codename")]
    codename: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "languages")]
    languages: String,
    #[tabled(rename = "fragments")]
    fragments: usize,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let fragments = read_fragments(&self.fragments)?;
        let mut bundles: Vec<CodenameCodeFragments> = grouper::group_by_codename_root(fragments)
            .into_values()
            .collect();
        bundles.sort_by(|a, b| a.codename_root.cmp(&b.codename_root));

        if self.json {
            let items: Vec<RenderedItem> = bundles
                .iter()
                .map(|bundle| RenderedItem {
                    codename: bundle.codename_root.to_string(),
                    name: grouper::title_from_codename_root(bundle.codename_root.as_str()),
                    record: grouper::to_record(bundle),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
            return Ok(());
        }

        if bundles.is_empty() {
            println!("No fragments.");
            return Ok(());
        }

        let rows: Vec<BundleRow> = bundles.iter().map(bundle_row).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn bundle_row(bundle: &CodenameCodeFragments) -> BundleRow {
    BundleRow {
        codename: bundle.codename_root.to_string(),
        name: grouper::title_from_codename_root(bundle.codename_root.as_str()),
        languages: bundle
            .languages()
            .iter()
            .map(|lang| lang.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        fragments: bundle.fragments.len(),
    }
}
