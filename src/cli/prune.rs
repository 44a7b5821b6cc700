//! Remove contextual rules that a later global rule makes redundant.
//!
//! A rule inside `@media`, `@supports` or similar is dropped only when the same
//! file has a global rule with the same selector, later in the file, with the
//! same declarations. Operates on the whole styles tree.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::info;

use super::common::{print_backup, print_failures, print_stat};
use crate::apply::BackupArchive;
use crate::config::Project;
use crate::prune::prune_files;

/// Arguments of `stylefold prune`.
#[derive(Args, Debug)]
pub struct PruneCommand {}

impl PruneCommand {
    /// Prune every stylesheet in the tree.
    pub async fn execute(self, project: &Project) -> Result<()> {
        let files = project.stylesheets();
        info!("Pruning redundant context rules in {} stylesheets", files.len());

        let mut archive = BackupArchive::new(&project.backup_dir(), "prune");
        let summary = prune_files(&project.root, &files, &mut archive);

        println!("{} Context pruning complete", "✓".green());
        print_stat("Files processed", summary.files_processed);
        print_stat("Files written", summary.files_written);
        print_stat("Rules pruned", summary.rules_pruned);
        print_stat("Empty blocks pruned", summary.shells_pruned);
        print_backup(&project.root, summary.backup_dir.as_deref());
        print_failures(&summary.failures);
        Ok(())
    }
}
