//! Remove duplicate rules within individual stylesheets.
//!
//! Each file goes through three passes: selector lists are split into one rule
//! per selector, exact duplicates of a rule are removed keeping the last one,
//! and with `--merge` rules sharing a selector and context are folded into the
//! last of them. Empty blocks left behind are pruned.
//!
//! # Examples
//!
//! ```bash
//! stylefold dedupe                                   # whole styles tree
//! stylefold dedupe --file src/styles/legacy.css --dry
//! stylefold dedupe --all --merge
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{info, warn};

use super::common::{print_backup, print_failures, print_stat};
use crate::apply::BackupArchive;
use crate::config::Project;
use crate::dedupe::{DedupeOptions, dedupe_files};

/// Arguments of `stylefold dedupe`.
#[derive(Args, Debug)]
pub struct DedupeCommand {
    /// Stylesheet to process, relative to the project root (repeatable).
    #[arg(long = "file", value_name = "PATH", conflicts_with = "all")]
    pub(super) files: Vec<PathBuf>,

    /// Process every stylesheet in the styles tree.
    #[arg(long)]
    pub(super) all: bool,

    /// Report what would change without writing anything.
    #[arg(long)]
    pub(super) dry: bool,

    /// Merge rules that share a selector and context.
    #[arg(long)]
    pub(super) merge: bool,
}

impl DedupeCommand {
    /// Resolve the target files and deduplicate them.
    pub async fn execute(self, project: &Project) -> Result<()> {
        let files = if self.all || self.files.is_empty() {
            project.stylesheets()
        } else {
            self.files
                .iter()
                .map(|path| project.root.join(path))
                .filter(|path| {
                    let exists = path.is_file();
                    if !exists {
                        warn!("Skipping missing file {}", path.display());
                    }
                    exists
                })
                .collect()
        };
        info!("Deduplicating {} stylesheets", files.len());

        let options = DedupeOptions {
            merge: self.merge,
            dry_run: self.dry,
        };
        let mut archive = BackupArchive::new(&project.backup_dir(), "dedupe");
        let summary = dedupe_files(&project.root, &files, options, &mut archive);
        let stats = summary.stats;

        if self.dry {
            println!("{} Dry run, no files written", "ℹ".blue());
        } else {
            println!("{} Deduplication complete", "✓".green());
        }
        print_stat("Files processed", summary.files_processed);
        print_stat(if self.dry { "Files to change" } else { "Files changed" }, summary.files_changed);
        print_stat("Selector lists split", stats.lists_split);
        print_stat("Repeated selectors", stats.selectors_dropped);
        print_stat("Duplicates removed", stats.duplicates_removed);
        if self.merge {
            print_stat("Groups merged", stats.groups_merged);
            print_stat("Rules merged away", stats.merged_rules_removed);
        }
        print_stat("Empty blocks pruned", stats.shells_pruned);
        print_backup(&project.root, summary.backup_dir.as_deref());
        print_failures(&summary.failures);
        Ok(())
    }
}
