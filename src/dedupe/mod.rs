//! Intra-file deduplication.
//!
//! Runs up to three passes over one stylesheet, each one a full
//! parse → compute edits → apply cycle:
//!
//! 1. **split**: a flat rule with a selector list (`.a, .b { ... }`) becomes one
//!    rule per distinct selector; repeated selectors in a list are dropped
//! 2. **dedupe**: walking rules from last to first, every flat rule whose
//!    `(context, selector, signature)` was already seen later is removed, so
//!    the physically last copy survives
//! 3. **merge** (opt-in): flat rules sharing `(context, selector)` but not a
//!    signature are folded last-wins into the last occurrence
//!
//! Empty shells are pruned afterwards. Non-flat rules are never touched.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::apply::{BackupArchive, BackupSnippet, FileFailure, Rewrite};
use crate::css::selector::{split_selector_list, unique_selectors};
use crate::css::{
    CssParseError, EditSet, RuleRecord, Signature, extract_rules, fold_in_order, parse, render_body,
};
use crate::utils::fs::relative_posix;

/// Deduplication switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupeOptions {
    /// Also merge same-selector rules with different declarations
    pub merge: bool,
    /// Compute everything, write nothing
    pub dry_run: bool,
}

/// Counters for one file or a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupeStats {
    /// Selector-list rules split into single-selector rules
    pub lists_split: usize,
    /// Repeated selectors dropped from lists
    pub selectors_dropped: usize,
    /// Exact duplicate rules removed
    pub duplicates_removed: usize,
    /// Same-selector groups merged
    pub groups_merged: usize,
    /// Rules removed by merging
    pub merged_rules_removed: usize,
    /// Empty shells pruned
    pub shells_pruned: usize,
}

impl DedupeStats {
    fn add(&mut self, other: &Self) {
        self.lists_split += other.lists_split;
        self.selectors_dropped += other.selectors_dropped;
        self.duplicates_removed += other.duplicates_removed;
        self.groups_merged += other.groups_merged;
        self.merged_rules_removed += other.merged_rules_removed;
        self.shells_pruned += other.shells_pruned;
    }
}

/// Outcome of a deduplication run.
#[derive(Debug, Clone, Default)]
pub struct DedupeSummary {
    /// Files examined
    pub files_processed: usize,
    /// Files that changed (or would change in a dry run)
    pub files_changed: usize,
    /// Files actually written
    pub files_written: usize,
    /// Summed counters
    pub stats: DedupeStats,
    /// Per-file failures
    pub failures: Vec<FileFailure>,
    /// Archive directory, when anything was backed up
    pub backup_dir: Option<PathBuf>,
}

/// Deduplicate one stylesheet text in memory.
///
/// Removed and replaced text is appended to `rewrite.snippets`; the final text
/// is left in `rewrite.text` (empty shells not yet pruned).
///
/// # Errors
///
/// Returns an error if the text, or an intermediate pass result, does not parse.
pub fn dedupe_rewrite(rewrite: &mut Rewrite, options: DedupeOptions) -> Result<DedupeStats, CssParseError> {
    let mut stats = DedupeStats::default();
    split_pass(rewrite, &mut stats)?;
    dedupe_pass(rewrite, &mut stats)?;
    if options.merge {
        merge_pass(rewrite, &mut stats)?;
    }
    Ok(stats)
}

/// Split selector lists into one flat rule per distinct selector.
fn split_pass(rewrite: &mut Rewrite, stats: &mut DedupeStats) -> Result<(), CssParseError> {
    let text = rewrite.text.clone();
    let rules = extract_rules(&parse(&text)?);
    let mut edits = EditSet::new();

    for rule in rules.iter().filter(|rule| rule.flat) {
        let parts = split_selector_list(&rule.selector);
        let total = parts.len();
        let unique = unique_selectors(parts);
        if total <= 1 {
            continue;
        }
        stats.selectors_dropped += total - unique.len();

        let body = &text[rule.body.clone()];
        let replacement = if unique.len() == 1 {
            format!("{} {{{}}}", unique[0], body)
        } else {
            stats.lists_split += 1;
            let indent = line_indent(&text, rule.span.start);
            unique
                .iter()
                .map(|selector| format!("{selector} {{{body}}}"))
                .collect::<Vec<_>>()
                .join(&format!("\n{indent}"))
        };
        edits.replace(rule.span.clone(), replacement);
    }

    if !edits.is_empty() {
        rewrite.text = edits.apply(&text);
    }
    Ok(())
}

/// Remove earlier copies of identical `(context, selector, signature)` rules.
fn dedupe_pass(rewrite: &mut Rewrite, stats: &mut DedupeStats) -> Result<(), CssParseError> {
    let text = rewrite.text.clone();
    let rules = extract_rules(&parse(&text)?);
    let mut edits = EditSet::new();
    let mut seen: HashSet<(String, &str, Signature)> = HashSet::new();

    for rule in rules.iter().rev() {
        let Some(signature) = rule.signature() else {
            continue;
        };
        if !seen.insert((rule.context_key(), rule.selector.as_str(), signature)) {
            remove(&text, rule, &mut edits, rewrite);
            stats.duplicates_removed += 1;
        }
    }

    if !edits.is_empty() {
        rewrite.text = edits.apply(&text);
    }
    Ok(())
}

/// Fold same-`(context, selector)` flat rules into their last occurrence.
fn merge_pass(rewrite: &mut Rewrite, stats: &mut DedupeStats) -> Result<(), CssParseError> {
    let text = rewrite.text.clone();
    let rules = extract_rules(&parse(&text)?);
    let mut edits = EditSet::new();

    let mut keys: Vec<(String, &str)> = Vec::new();
    let mut groups: HashMap<(String, &str), Vec<&RuleRecord>> = HashMap::new();
    for rule in rules.iter().filter(|rule| rule.flat) {
        let key = (rule.context_key(), rule.selector.as_str());
        let group = groups.entry(key.clone()).or_default();
        if group.is_empty() {
            keys.push(key);
        }
        group.push(rule);
    }

    for key in &keys {
        let Some(group) = groups.get(key) else {
            continue;
        };
        let Some((last, earlier)) = group.split_last() else {
            continue;
        };
        if earlier.is_empty() {
            continue;
        }

        let merged = fold_in_order(group.iter().flat_map(|rule| rule.declarations.iter()));
        let comments: Vec<&str> = last.comments.iter().map(|range| &text[range.clone()]).collect();
        rewrite
            .snippets
            .push(BackupSnippet::in_context(last.context_key(), last.text(&text)));
        edits.replace(last.body.clone(), render_body(&text[last.body.clone()], &comments, &merged));

        for rule in earlier {
            remove(&text, rule, &mut edits, rewrite);
            stats.merged_rules_removed += 1;
        }
        stats.groups_merged += 1;
    }

    if !edits.is_empty() {
        rewrite.text = edits.apply(&text);
    }
    Ok(())
}

fn remove(text: &str, rule: &RuleRecord, edits: &mut EditSet, rewrite: &mut Rewrite) {
    rewrite.snippets.push(BackupSnippet::in_context(rule.context_key(), rule.text(text)));
    edits.remove(rule.removal.clone());
}

/// Whitespace between the start of the line and `offset`.
fn line_indent(text: &str, offset: usize) -> &str {
    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &text[line_start..offset];
    if prefix.chars().all(char::is_whitespace) { prefix } else { "" }
}

/// Deduplicate a set of stylesheet files.
///
/// Each file is processed independently; a file that cannot be read, parsed
/// or written is recorded as a failure and the run continues.
pub fn dedupe_files(
    root: &Path,
    files: &[PathBuf],
    options: DedupeOptions,
    archive: &mut BackupArchive,
) -> DedupeSummary {
    let mut summary = DedupeSummary::default();

    for path in files {
        let rel = relative_posix(root, path);
        summary.files_processed += 1;
        match dedupe_file(&rel, path, options, archive) {
            Ok((stats, changed, written)) => {
                if changed {
                    debug!("{}: {:?}", rel, stats);
                    summary.files_changed += 1;
                }
                if written {
                    summary.files_written += 1;
                }
                summary.stats.add(&stats);
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
        "Deduplicated {} files: {} duplicates removed, {} groups merged",
        summary.files_processed, summary.stats.duplicates_removed, summary.stats.groups_merged
    );
    summary
}

fn dedupe_file(
    rel: &str,
    path: &Path,
    options: DedupeOptions,
    archive: &mut BackupArchive,
) -> Result<(DedupeStats, bool, bool)> {
    let original = crate::utils::fs::read_text_file(path)?;
    let mut rewrite = Rewrite::new(rel, path.to_path_buf(), original);
    let mut stats = dedupe_rewrite(&mut rewrite, options).map_err(|err| {
        crate::core::StylefoldError::ParseError {
            file: rel.to_string(),
            line: err.line,
            column: err.column,
            reason: err.message,
        }
    })?;
    rewrite.prune_shells()?;
    stats.shells_pruned = rewrite.shells_pruned;

    let changed = rewrite.is_changed();
    if options.dry_run {
        return Ok((stats, changed, false));
    }
    let written = rewrite.commit(archive)?;
    Ok((stats, changed, written))
}
