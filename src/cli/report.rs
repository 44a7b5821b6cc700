//! Generate the cross-file duplicate report.
//!
//! Every stylesheet below the configured styles directory is parsed; files that
//! fail to parse are skipped with a warning. Groups of flat rules sharing a
//! selector and context in two or more files are written to
//! `reports/css-cross-file-duplicates.json`.
//!
//! # Examples
//!
//! ```bash
//! stylefold report
//! stylefold report --output /tmp/duplicates.json
//! stylefold plan --report /tmp/duplicates.json
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use super::common::print_stat;
use crate::config::Project;
use crate::css::StyleSource;
use crate::duplicates::detect_duplicates;
use crate::utils::fs::relative_posix;

/// Arguments of `stylefold report`.
#[derive(Args, Debug)]
pub struct ReportCommand {
    /// Write the report here instead of the configured reports directory.
    #[arg(short, long, value_name = "FILE")]
    pub(super) output: Option<PathBuf>,
}

impl ReportCommand {
    /// Scan, detect and save.
    pub async fn execute(self, project: &Project) -> Result<()> {
        let files = project.stylesheets();
        info!("Scanning {} stylesheets", files.len());

        let (sources, skipped) = StyleSource::load_all(&project.root, &files);
        let report = detect_duplicates(&project.config.styles_dir, &sources);

        let path = self.output.map_or_else(|| project.report_path(), |p| project.root.join(p));
        report.save(&path)?;

        println!("{} Duplicate report written to {}", "✓".green(), relative_posix(&project.root, &path));
        print_stat("Files scanned", report.files_scanned);
        if !skipped.is_empty() {
            print_stat("Files skipped", skipped.len().to_string().yellow());
        }
        print_stat("Selector groups", report.total_groups);
        print_stat("Cross-file groups", report.cross_file_groups);
        print_stat("Identical", report.identical_groups);
        print_stat("Conflicting", report.conflicting_groups);
        Ok(())
    }
}
