//! `codesample diff <old> <new>` — reconcile two fragment lists.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use similar::TextDiff;

use codesample_core::{CodeFragment, FragmentKey};
use codesample_sync::compare;

use super::read_fragments;

/// Arguments for `codesample diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Previous fragment list (JSON array or code file).
    pub old: PathBuf,

    /// Current fragment list (JSON array or code file).
    pub new: PathBuf,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let old = read_fragments(&self.old)?;
        let new = read_fragments(&self.new)?;
        let delta = compare(&old, &new);

        if delta.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        let mut previous: HashMap<FragmentKey, &CodeFragment> = HashMap::new();
        for fragment in &old {
            previous.entry(fragment.key()).or_insert(fragment);
        }

        for fragment in &delta.added {
            println!("{} {}", "+".green().bold(), fragment.key());
        }
        for fragment in &delta.modified {
            println!("{} {}", "~".yellow().bold(), fragment.key());
            let before = previous
                .get(&fragment.key())
                .map(|f| f.content.as_str())
                .unwrap_or_default();
            print!("{}", content_diff(&fragment.codename, before, &fragment.content));
        }
        for fragment in &delta.removed {
            println!("{} {}", "-".red().bold(), fragment.key());
        }

        println!(
            "\n{} added, {} modified, {} removed",
            delta.added.len(),
            delta.modified.len(),
            delta.removed.len()
        );
        Ok(())
    }
}

fn content_diff(codename: &str, before: &str, after: &str) -> String {
    let old_header = format!("a/{codename}");
    let new_header = format!("b/{codename}");
    let mut unified = TextDiff::from_lines(before, after)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();
    if !unified.ends_with('\n') {
        unified.push('\n');
    }
    unified
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_diff_has_headers_and_hunks() {
        let diff = content_diff("intro_curl", "curl -X GET\n", "curl -X POST\n");
        assert!(diff.contains("--- a/intro_curl"));
        assert!(diff.contains("+++ b/intro_curl"));
        assert!(diff.contains("-curl -X GET"));
        assert!(diff.contains("+curl -X POST"));
    }
}
