//! Execute the consolidation plan.
//!
//! By default only Identical groups are applied: removing a copy of a rule
//! whose declarations match the canonical copy cannot change rendering. With
//! `--all`, Conflicting groups are applied too and the canonical rule receives
//! the declarations merged in cascade order.
//!
//! Every removed or rewritten rule is copied into
//! `<backup_dir>/apply-<timestamp>/` before its file is written. Running the
//! same plan twice is a no-op the second time.
//!
//! `--plan <file>` applies a plan saved with `stylefold plan --output`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use super::common::{print_backup, print_failures, print_stat};
use crate::apply::{ApplyMode, BackupArchive, apply_plan};
use crate::config::Project;
use crate::plan::ConsolidationPlan;

/// Arguments of `stylefold apply`.
#[derive(Args, Debug)]
pub struct ApplyCommand {
    /// Also apply conflicting groups, merging declarations into the canonical rule.
    #[arg(long)]
    pub(super) all: bool,

    /// Read the plan from here instead of the reports directory.
    #[arg(long, value_name = "FILE")]
    pub(super) plan: Option<PathBuf>,
}

impl ApplyCommand {
    /// Load the plan and apply it.
    pub async fn execute(self, project: &Project) -> Result<()> {
        let plan_path =
            self.plan.as_ref().map_or_else(|| project.plan_path(), |p| project.root.join(p));
        let plan = ConsolidationPlan::load(&plan_path)?;
        let mode = if self.all { ApplyMode::All } else { ApplyMode::Safe };
        info!("Applying {} plan items in {:?} mode", plan.items.len(), mode);

        let mut archive = BackupArchive::new(&project.backup_dir(), "apply");
        let summary = apply_plan(&project.root, &plan, mode, &mut archive);

        if summary.files_written == 0 && summary.failures.is_empty() {
            println!("{} Nothing to apply", "✓".green());
        } else {
            println!("{} Consolidation plan applied", "✓".green());
        }
        print_stat("Items applied", summary.items_applied);
        if summary.items_skipped > 0 {
            print_stat(
                "Items skipped",
                format!("{} (conflicting, use --all)", summary.items_skipped),
            );
        }
        print_stat("Files written", summary.files_written);
        print_stat("Rules removed", summary.rules_removed);
        print_stat("Rules inserted", summary.rules_inserted);
        print_stat("Rules merged", summary.rules_rewritten);
        print_stat("Empty blocks pruned", summary.shells_pruned);
        print_backup(&project.root, summary.backup_dir.as_deref());
        print_failures(&summary.failures);
        Ok(())
    }
}
