//! Backup archives of removed rule text.
//!
//! Every run that removes or rewrites stylesheet text first records that text
//! in a [`BackupArchive`]: a timestamped directory that mirrors the project
//! paths of the touched files.
//!
//! ```text
//! backups/css-consolidation/
//! └── apply-20240501-143012/
//!     └── src/styles/pages/home.css
//! ```
//!
//! Each archived file starts every recording with a header comment naming
//! the source file and the removal time, followed by the removed snippets:
//!
//! ```css
//! /* stylefold backup: removed from src/styles/pages/home.css at 2024-05-01T14:30:12+00:00 */
//! /* context: @media (min-width: 768px) */
//! .btn { color: red; }
//! ```
//!
//! The archive directory is only created once something is recorded.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::BACKUP_TIMESTAMP_FORMAT;
use crate::utils::fs::safe_write;

/// One piece of removed or replaced text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSnippet {
    /// Context chain of the removed rule; empty for global rules
    pub context: String,
    /// The exact removed text
    pub text: String,
}

impl BackupSnippet {
    /// A snippet without context.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            context: String::new(),
            text: text.into(),
        }
    }

    /// A snippet removed from inside an at-rule context.
    pub fn in_context(context: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            text: text.into(),
        }
    }
}

/// A timestamped, path-mirroring store of removed text for one run.
#[derive(Debug)]
pub struct BackupArchive {
    dir: PathBuf,
    started: DateTime<Local>,
    snippets: usize,
    files: usize,
}

impl BackupArchive {
    /// Prepare an archive below `backup_root` named `<label>-<timestamp>`.
    ///
    /// Nothing is written until [`BackupArchive::record`] is called.
    pub fn new(backup_root: &Path, label: &str) -> Self {
        let started = Local::now();
        let dir = backup_root.join(format!("{label}-{}", started.format(BACKUP_TIMESTAMP_FORMAT)));
        Self {
            dir,
            started,
            snippets: 0,
            files: 0,
        }
    }

    /// Archive directory of this run.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of snippets recorded so far.
    pub fn snippets(&self) -> usize {
        self.snippets
    }

    /// Number of recordings so far.
    pub fn files(&self) -> usize {
        self.files
    }

    /// Whether anything was recorded.
    pub fn is_empty(&self) -> bool {
        self.files == 0
    }

    /// Mirrored archive path of a project-relative file.
    pub fn path_for(&self, rel: &str) -> PathBuf {
        self.dir.join(rel)
    }

    /// Append snippets removed from `rel` to the archive.
    ///
    /// Recording an empty snippet list is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive file cannot be read or written.
    pub fn record(&mut self, rel: &str, snippets: &[BackupSnippet]) -> Result<()> {
        if snippets.is_empty() {
            return Ok(());
        }

        let path = self.path_for(rel);
        let mut content = if path.is_file() {
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read backup file: {}", path.display()))?
        } else {
            String::new()
        };
        if !content.is_empty() && !content.ends_with("\n\n") {
            content.push('\n');
        }

        content.push_str(&format!(
            "/* stylefold backup: removed from {rel} at {} */\n",
            self.started.to_rfc3339_opts(SecondsFormat::Secs, false)
        ));
        for snippet in snippets {
            if !snippet.context.is_empty() {
                content.push_str(&format!("/* context: {} */\n", snippet.context));
            }
            content.push_str(snippet.text.trim_end());
            content.push('\n');
        }

        safe_write(&path, &content)
            .with_context(|| format!("Failed to write backup file: {}", path.display()))?;
        debug!("Backed up {} snippet(s) of {} to {}", snippets.len(), rel, path.display());

        self.snippets += snippets.len();
        self.files += 1;
        Ok(())
    }
}
