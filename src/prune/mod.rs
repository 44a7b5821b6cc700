//! Redundant-context pruning.
//!
//! A rule inside an at-rule context is redundant when the same file has a
//! global rule for the same selector that
//!
//! - is the last global flat rule for that selector,
//! - comes after the contextual rule in document order, and
//! - has exactly the same signature (values and `!important` flags).
//!
//! The global rule then renders the same declarations whether or not the
//! context's condition holds, so the contextual copy can go.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::apply::{BackupArchive, BackupSnippet, FileFailure, Rewrite};
use crate::css::{CssParseError, EditSet, Signature, extract_rules, parse};
use crate::utils::fs::relative_posix;

/// Outcome of a pruning run.
#[derive(Debug, Clone, Default)]
pub struct PruneSummary {
    /// Files examined
    pub files_processed: usize,
    /// Files written
    pub files_written: usize,
    /// Contextual rules removed
    pub rules_pruned: usize,
    /// Empty shells removed afterwards
    pub shells_pruned: usize,
    /// Per-file failures
    pub failures: Vec<FileFailure>,
    /// Archive directory, when anything was backed up
    pub backup_dir: Option<PathBuf>,
}

/// Remove redundant contextual rules from `rewrite.text`.
///
/// Returns the number of removed rules; their text is appended to
/// `rewrite.snippets`.
///
/// # Errors
///
/// Returns an error if the text does not parse.
pub fn prune_rewrite(rewrite: &mut Rewrite) -> Result<usize, CssParseError> {
    let text = rewrite.text.clone();
    let rules = extract_rules(&parse(&text)?);

    let mut last_global: HashMap<&str, (usize, Signature)> = HashMap::new();
    for rule in rules.iter().filter(|rule| rule.is_global()) {
        if let Some(signature) = rule.signature() {
            last_global.insert(rule.selector.as_str(), (rule.source_order, signature));
        }
    }

    let mut edits = EditSet::new();
    let mut pruned = 0;
    for rule in rules.iter().filter(|rule| !rule.is_global()) {
        let Some(signature) = rule.signature() else {
            continue;
        };
        let Some((global_order, global_signature)) = last_global.get(rule.selector.as_str()) else {
            continue;
        };
        if *global_order > rule.source_order && *global_signature == signature {
            debug!("Pruning {} in {} of {}", rule.selector, rule.context_key(), rewrite.rel);
            rewrite
                .snippets
                .push(BackupSnippet::in_context(rule.context_key(), rule.text(&text)));
            edits.remove(rule.removal.clone());
            pruned += 1;
        }
    }

    if !edits.is_empty() {
        rewrite.text = edits.apply(&text);
    }
    Ok(pruned)
}

/// Prune redundant contextual rules across a set of files.
pub fn prune_files(root: &Path, files: &[PathBuf], archive: &mut BackupArchive) -> PruneSummary {
    let mut summary = PruneSummary::default();

    for path in files {
        let rel = relative_posix(root, path);
        summary.files_processed += 1;
        match prune_file(&rel, path, archive) {
            Ok((pruned, shells, written)) => {
                summary.rules_pruned += pruned;
                summary.shells_pruned += shells;
                if written {
                    summary.files_written += 1;
                }
            }
            Err(err) => {
                warn!("Skipping {}: {:#}", rel, err);
                summary.failures.push(FileFailure {
                    file: rel,
                    reason: format!("{err:#}"),
                });
            }
        }
    }

    if !archive.is_empty() {
        summary.backup_dir = Some(archive.dir().to_path_buf());
    }
    info!(
        "Pruned {} redundant contextual rules in {} files",
        summary.rules_pruned, summary.files_written
    );
    summary
}

fn prune_file(rel: &str, path: &Path, archive: &mut BackupArchive) -> Result<(usize, usize, bool)> {
    let original = crate::utils::fs::read_text_file(path)?;
    let mut rewrite = Rewrite::new(rel, path.to_path_buf(), original);
    let pruned = prune_rewrite(&mut rewrite).map_err(|err| crate::core::StylefoldError::ParseError {
        file: rel.to_string(),
        line: err.line,
        column: err.column,
        reason: err.message,
    })?;
    rewrite.prune_shells()?;
    let written = rewrite.commit(archive)?;
    Ok((pruned, rewrite.shells_pruned, written))
}
