//! Committing in-memory stylesheet rewrites.
//!
//! The applier, the deduper and the pruner all end the same way: prune the
//! empty shells their edits left behind, check the result still parses,
//! archive everything that was removed, then write the file atomically.

use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

use super::backup::{BackupArchive, BackupSnippet};
use crate::core::StylefoldError;
use crate::css::{parse, prune_empty};

/// A fully computed rewrite of one stylesheet.
#[derive(Debug, Clone)]
pub struct Rewrite {
    /// Project-relative path
    pub rel: String,
    /// Absolute path
    pub path: PathBuf,
    /// Text as read
    pub original: String,
    /// Text to write
    pub text: String,
    /// Removed or replaced text, in removal order
    pub snippets: Vec<BackupSnippet>,
    /// Empty shells removed by the final prune
    pub shells_pruned: usize,
}

impl Rewrite {
    /// Start a rewrite; `text` begins equal to `original`.
    pub fn new(rel: impl Into<String>, path: PathBuf, original: String) -> Self {
        Self {
            rel: rel.into(),
            path,
            text: original.clone(),
            original,
            snippets: Vec::new(),
            shells_pruned: 0,
        }
    }

    /// Whether the text differs from what was read.
    pub fn is_changed(&self) -> bool {
        self.text != self.original
    }

    /// Remove empty rule shells and at-rules left behind by earlier edits.
    ///
    /// Does nothing when no edit changed the text, so untouched files keep
    /// any pre-existing empty rules. Leading whitespace exposed by removing
    /// the first rule of the file is dropped, and a file left with only
    /// whitespace becomes empty.
    ///
    /// # Errors
    ///
    /// [`StylefoldError::SyntaxBroken`] if the edited text does not parse.
    pub fn prune_shells(&mut self) -> Result<()> {
        if !self.is_changed() {
            return Ok(());
        }
        let (pruned, removed) = prune_empty(&self.text).map_err(|err| self.broken(&err.to_string()))?;
        self.shells_pruned += removed.len();
        self.snippets.extend(removed.into_iter().map(BackupSnippet::new));
        self.text = if pruned.trim().is_empty() {
            String::new()
        } else if !self.original.starts_with(char::is_whitespace) {
            pruned.trim_start().to_string()
        } else {
            pruned
        };
        Ok(())
    }

    /// Verify, archive and write the rewrite.
    ///
    /// Returns `false` without touching anything when the text is unchanged.
    /// The backup is recorded before the stylesheet is written; if it fails,
    /// the stylesheet is not written.
    ///
    /// # Errors
    ///
    /// - [`StylefoldError::SyntaxBroken`] if the new text does not parse
    /// - [`StylefoldError::BackupFailed`] if the backup cannot be written
    /// - an I/O error if the stylesheet cannot be written
    pub fn commit(&self, archive: &mut BackupArchive) -> Result<bool> {
        if !self.is_changed() {
            return Ok(false);
        }
        parse(&self.text).map_err(|err| self.broken(&err.to_string()))?;

        archive.record(&self.rel, &self.snippets).map_err(|err| StylefoldError::BackupFailed {
            file: self.rel.clone(),
            reason: format!("{err:#}"),
        })?;

        crate::utils::fs::safe_write(&self.path, &self.text)?;
        debug!("Wrote {}", self.rel);
        Ok(true)
    }

    fn broken(&self, reason: &str) -> StylefoldError {
        StylefoldError::SyntaxBroken {
            file: self.rel.clone(),
            reason: reason.to_string(),
        }
    }
}
