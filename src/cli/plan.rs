//! Build the consolidation plan from the duplicate report.
//!
//! The report written by `stylefold report` must exist; `--report` reads one
//! saved elsewhere with `stylefold report --output`. Cascade order is
//! recomputed from the configured entry points and script imports, so the plan
//! reflects the tree as it is now. `--output` writes the plan to another path,
//! which `stylefold apply --plan` accepts.
//!
//! ```bash
//! stylefold report --output /tmp/duplicates.json
//! stylefold plan --report /tmp/duplicates.json --output /tmp/plan.json
//! stylefold apply --plan /tmp/plan.json
//! ```
//!
//! # Canonical overrides
//!
//! `--canonical-map <file>` names a JSON document of override rules:
//!
//! ```json
//! {
//!   "rules": [
//!     { "selectorPrefix": ".btn", "canonical": "src/styles/components/button.css" },
//!     { "selector": ".card", "context": "@media (min-width: 768px)",
//!       "canonical": "src/styles/components/card.css" }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use super::common::print_stat;
use crate::cascade::resolve_cascade_order;
use crate::config::Project;
use crate::duplicates::DuplicateReport;
use crate::plan::{OverrideMap, Planner};
use crate::utils::fs::relative_posix;

/// Arguments of `stylefold plan`.
#[derive(Args, Debug)]
pub struct PlanCommand {
    /// JSON file of canonical-file override rules, relative to the project root.
    #[arg(long, value_name = "FILE")]
    pub(super) canonical_map: Option<PathBuf>,

    /// Read the duplicate report from here instead of the reports directory.
    #[arg(long, value_name = "FILE")]
    pub(super) report: Option<PathBuf>,

    /// Write the plan here instead of the reports directory.
    #[arg(short, long, value_name = "FILE")]
    pub(super) output: Option<PathBuf>,
}

impl PlanCommand {
    /// Load the report, resolve cascade order, plan and save.
    pub async fn execute(self, project: &Project) -> Result<()> {
        let report_path =
            self.report.as_ref().map_or_else(|| project.report_path(), |p| project.root.join(p));
        let report = DuplicateReport::load(&report_path)?;

        let overrides = match &self.canonical_map {
            Some(path) => OverrideMap::load(&project.root.join(path))?,
            None => OverrideMap::default(),
        };
        if !overrides.is_empty() {
            info!("Loaded {} canonical override rules", overrides.len());
        }

        let order = resolve_cascade_order(project).context("Failed to resolve cascade order")?;
        info!("Cascade order covers {} stylesheets", order.len());

        let mut planner =
            Planner::new(&project.root, &order, &overrides, &project.config.component_hint);
        let plan = planner.plan(&report);

        let path = self.output.map_or_else(|| project.plan_path(), |p| project.root.join(p));
        plan.save(&path)?;

        println!(
            "{} Consolidation plan written to {}",
            "✓".green(),
            relative_posix(&project.root, &path)
        );
        print_stat("Ranked stylesheets", order.len());
        print_stat("Files considered", plan.files_considered);
        print_stat("Selector groups", plan.groups_considered);
        print_stat("Items planned", plan.items.len());
        print_stat("Identical", plan.identical_groups);
        print_stat("Conflicting", plan.conflicting_groups);

        let warned = plan.warned_items();
        if warned > 0 {
            println!(
                "{} {} item(s) carry warnings; review them before running 'stylefold apply --all'",
                "⚠".yellow(),
                warned
            );
        }
        Ok(())
    }
}
