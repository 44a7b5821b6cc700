//! Helpers shared by the subcommands.

use colored::Colorize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::apply::FileFailure;
use crate::utils::fs::relative_posix;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies. Calling this
/// more than once is harmless.
pub fn init_logging(default_level: &str) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(default_level)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Print a `label: value` summary line.
pub(super) fn print_stat(label: &str, value: impl std::fmt::Display) {
    println!("  {:<22} {}", format!("{label}:"), value);
}

/// Print per-file failures, if any.
pub(super) fn print_failures(failures: &[FileFailure]) {
    if failures.is_empty() {
        return;
    }
    println!("{} {} file(s) could not be processed:", "⚠".yellow(), failures.len());
    for failure in failures {
        println!("  {} {}: {}", "✗".red(), failure.file, failure.reason);
    }
}

/// Print where removed text was archived.
pub(super) fn print_backup(root: &Path, backup_dir: Option<&Path>) {
    if let Some(dir) = backup_dir {
        println!("  Backups written to {}", relative_posix(root, dir).cyan());
    }
}
