//! Command-line interface for stylefold.
//!
//! Every phase of the consolidation workflow is exposed as its own subcommand
//! so that each artifact can be reviewed before the next phase consumes it.
//!
//! # Available Commands
//!
//! ## Cross-file consolidation
//! - `report` - scan the styles tree and write the duplicate report
//! - `plan` - turn the report into a consolidation plan
//! - `apply` - execute the plan, backing up everything it removes
//!
//! ## Single-file cleanup
//! - `dedupe` - split selector lists, drop exact duplicates, optionally merge
//! - `prune` - drop contextual rules that repeat a later global rule
//!
//! # Typical Workflow
//!
//! ```bash
//! # 1. Find duplicates across files
//! stylefold report
//!
//! # 2. Review reports/css-cross-file-consolidation-plan.json
//! stylefold plan --canonical-map canonical.json
//!
//! # 3. Apply identical groups, then conflicting ones once reviewed
//! stylefold apply
//! stylefold apply --all
//!
//! # 4. Tidy individual files
//! stylefold dedupe --merge
//! stylefold prune
//! ```
//!
//! # Global Options
//!
//! - `--project-dir <dir>` - project root (defaults to the current directory)
//! - `--config <file>` - configuration file (defaults to `<root>/stylefold.toml`)
//! - `--verbose` / `--quiet` - log verbosity on stderr
//!
//! Run summaries are printed to stdout; logs go to stderr so that summaries
//! stay readable when piped.

mod apply;
mod common;
mod dedupe;
mod plan;
mod prune;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::Project;

pub use common::init_logging;

/// Main CLI structure for stylefold.
///
/// All options marked `global = true` are accepted before or after the
/// subcommand name.
///
/// # Examples
///
/// ```bash
/// stylefold --verbose report
/// stylefold --project-dir ../site plan
/// stylefold apply --all --config ci/stylefold.toml
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "stylefold",
    about = "Cascade-aware CSS duplicate consolidation",
    version,
    long_about = "stylefold finds rules repeated across a stylesheet tree, plans where each \
                  should live based on cascade order, and consolidates them with backups."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    ///
    /// Defaults to `stylefold.toml` in the project directory. An explicitly
    /// named file must exist.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root all configured paths are relative to.
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the styles tree and write the cross-file duplicate report.
    ///
    /// See [`report::ReportCommand`].
    Report(report::ReportCommand),

    /// Build a consolidation plan from the duplicate report.
    ///
    /// See [`plan::PlanCommand`].
    Plan(plan::PlanCommand),

    /// Execute the consolidation plan.
    ///
    /// See [`apply::ApplyCommand`].
    Apply(apply::ApplyCommand),

    /// Remove duplicate rules within individual files.
    ///
    /// See [`dedupe::DedupeCommand`].
    Dedupe(dedupe::DedupeCommand),

    /// Remove contextual rules made redundant by a later global rule.
    ///
    /// See [`prune::PruneCommand`].
    Prune(prune::PruneCommand),
}

impl Cli {
    /// Log filter requested by the verbosity flags.
    ///
    /// `RUST_LOG`, when set, takes precedence over this value.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Load the project and run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded, a required
    /// artifact is missing or invalid, or an artifact cannot be written.
    /// Per-file problems are reported in the command summary instead.
    pub async fn execute(self) -> Result<()> {
        let project = Project::open(&self.project_dir, self.config.as_deref())?;
        debug!("Project root: {}", project.root.display());

        match self.command {
            Commands::Report(cmd) => cmd.execute(&project).await,
            Commands::Plan(cmd) => cmd.execute(&project).await,
            Commands::Apply(cmd) => cmd.execute(&project).await,
            Commands::Dedupe(cmd) => cmd.execute(&project).await,
            Commands::Prune(cmd) => cmd.execute(&project).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::parse_from(["stylefold", "report"]);
        assert_eq!(cli.log_level(), "warn");

        let cli = Cli::parse_from(["stylefold", "-v", "report"]);
        assert_eq!(cli.log_level(), "debug");

        let cli = Cli::parse_from(["stylefold", "report", "--quiet"]);
        assert_eq!(cli.log_level(), "error");
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["stylefold", "-v", "-q", "report"]).is_err());
    }

    #[test]
    fn test_global_paths() {
        let cli = Cli::parse_from([
            "stylefold",
            "apply",
            "--all",
            "--project-dir",
            "site",
            "--config",
            "ci.toml",
        ]);
        assert_eq!(cli.project_dir, PathBuf::from("site"));
        assert_eq!(cli.config, Some(PathBuf::from("ci.toml")));
        assert!(matches!(cli.command, Commands::Apply(ref cmd) if cmd.all));
    }

    #[test]
    fn test_artifact_path_flags() {
        let cli = Cli::parse_from(["stylefold", "report", "-o", "out/dups.json"]);
        assert!(matches!(
            cli.command,
            Commands::Report(ref cmd) if cmd.output == Some(PathBuf::from("out/dups.json"))
        ));

        let cli = Cli::parse_from([
            "stylefold",
            "plan",
            "--report",
            "out/dups.json",
            "--output",
            "out/plan.json",
        ]);
        let Commands::Plan(cmd) = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(cmd.report, Some(PathBuf::from("out/dups.json")));
        assert_eq!(cmd.output, Some(PathBuf::from("out/plan.json")));
        assert_eq!(cmd.canonical_map, None);

        let cli = Cli::parse_from(["stylefold", "apply", "--plan", "out/plan.json"]);
        assert!(matches!(
            cli.command,
            Commands::Apply(ref cmd) if !cmd.all && cmd.plan == Some(PathBuf::from("out/plan.json"))
        ));
    }

    #[test]
    fn test_dedupe_flags() {
        let cli = Cli::parse_from([
            "stylefold",
            "dedupe",
            "--file",
            "a.css",
            "--file",
            "b.css",
            "--dry",
            "--merge",
        ]);
        let Commands::Dedupe(cmd) = cli.command else {
            panic!("expected dedupe");
        };
        assert_eq!(cmd.files.len(), 2);
        assert!(cmd.dry && cmd.merge && !cmd.all);
    }

    #[test]
    fn test_dedupe_file_conflicts_with_all() {
        assert!(Cli::try_parse_from(["stylefold", "dedupe", "--file", "a.css", "--all"]).is_err());
    }
}
