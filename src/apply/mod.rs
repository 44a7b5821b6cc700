//! Plan application.
//!
//! Executes a [`ConsolidationPlan`] against the stylesheet tree. Work is
//! grouped per file; each file is parsed once, every edit for it is computed
//! against that snapshot, and the result is written in one atomic step after
//! its removed text has been archived.
//!
//! Two modes:
//!
//! - [`ApplyMode::Safe`] (default) applies identical groups only
//! - [`ApplyMode::All`] also applies conflicting groups, rewriting the
//!   canonical rule with the planner's merged declarations
//!
//! There is no cross-file transaction. A failure while processing one file
//! leaves that file untouched and is reported in the [`ApplySummary`];
//! files already written stay written.

pub mod backup;
pub mod rewrite;

pub use backup::{BackupArchive, BackupSnippet};
pub use rewrite::Rewrite;

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::css::{EditSet, RuleRecord, StyleSource, fold_sorted, render_body};
use crate::duplicates::GroupKind;
use crate::plan::{ConsolidationPlan, PlanItem};

/// Which plan items to execute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyMode {
    /// Identical groups only
    #[default]
    Safe,
    /// Identical and conflicting groups
    All,
}

impl ApplyMode {
    /// Whether items of `kind` are applied in this mode.
    pub fn includes(self, kind: GroupKind) -> bool {
        match self {
            Self::Safe => kind == GroupKind::Identical,
            Self::All => true,
        }
    }
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Project-relative path
    pub file: String,
    /// What went wrong
    pub reason: String,
}

/// Counters of one apply run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Plan items executed
    pub items_applied: usize,
    /// Plan items skipped by the mode
    pub items_skipped: usize,
    /// Files parsed
    pub files_processed: usize,
    /// Files written
    pub files_written: usize,
    /// Rule occurrences removed
    pub rules_removed: usize,
    /// Canonical rules appended
    pub rules_inserted: usize,
    /// Canonical rules rewritten with merged declarations
    pub rules_rewritten: usize,
    /// Empty shells pruned after edits
    pub shells_pruned: usize,
    /// Per-file failures
    pub failures: Vec<FileFailure>,
    /// Archive directory, when anything was backed up
    pub backup_dir: Option<PathBuf>,
}

/// What to do with one file for one plan item.
#[derive(Debug, Clone, Copy)]
enum Task<'p> {
    /// Remove every matching flat rule
    Remove(&'p PlanItem),
    /// Make sure the merged rule lives here
    Canonical(&'p PlanItem),
}

#[derive(Debug, Default)]
struct FileCounts {
    removed: usize,
    inserted: usize,
    rewritten: usize,
}

/// Execute `plan` against the tree rooted at `root`.
pub fn apply_plan(
    root: &Path,
    plan: &ConsolidationPlan,
    mode: ApplyMode,
    archive: &mut BackupArchive,
) -> ApplySummary {
    let mut summary = ApplySummary::default();
    let mut tasks: BTreeMap<&str, Vec<Task<'_>>> = BTreeMap::new();

    for item in &plan.items {
        if !mode.includes(item.kind) {
            debug!("Skipping {} group {} in safe mode", item.kind, item.selector);
            summary.items_skipped += 1;
            continue;
        }
        summary.items_applied += 1;
        tasks.entry(item.canonical.as_str()).or_default().push(Task::Canonical(item));
        for file in &item.remove_from {
            tasks.entry(file.as_str()).or_default().push(Task::Remove(item));
        }
    }

    for (rel, file_tasks) in tasks {
        summary.files_processed += 1;
        match apply_file(root, rel, &file_tasks, archive) {
            Ok((counts, rewrite, written)) => {
                summary.rules_removed += counts.removed;
                summary.rules_inserted += counts.inserted;
                summary.rules_rewritten += counts.rewritten;
                summary.shells_pruned += rewrite.shells_pruned;
                if written {
                    summary.files_written += 1;
                }
            }
            Err(err) => {
                warn!("Failed to apply plan to {}: {:#}", rel, err);
                summary.failures.push(FileFailure {
                    file: rel.to_string(),
                    reason: format!("{err:#}"),
                });
            }
        }
    }

    if !archive.is_empty() {
        summary.backup_dir = Some(archive.dir().to_path_buf());
    }
    info!(
        "Applied {} items: {} files written, {} rules removed, {} inserted, {} rewritten",
        summary.items_applied,
        summary.files_written,
        summary.rules_removed,
        summary.rules_inserted,
        summary.rules_rewritten
    );
    summary
}

/// Parse, edit, verify, back up and write one file.
fn apply_file(
    root: &Path,
    rel: &str,
    tasks: &[Task<'_>],
    archive: &mut BackupArchive,
) -> Result<(FileCounts, Rewrite, bool)> {
    let source = StyleSource::load(root, &root.join(rel))?;
    let mut rewrite = Rewrite::new(rel, source.path.clone(), source.text.clone());
    let mut edits = EditSet::new();
    let mut counts = FileCounts::default();
    let mut touched: HashSet<usize> = HashSet::new();

    for task in tasks {
        match *task {
            Task::Remove(item) => {
                for rule in source.matching_rules(&item.selector, &item.context) {
                    if touched.insert(rule.source_order) {
                        remove_rule(&source, rule, &mut edits, &mut rewrite);
                        counts.removed += 1;
                    }
                }
            }
            Task::Canonical(item) => {
                let matches: Vec<&RuleRecord> =
                    source.matching_rules(&item.selector, &item.context).collect();
                let Some((last, earlier)) = matches.split_last() else {
                    edits.append(item.rule_css.clone());
                    counts.inserted += 1;
                    continue;
                };
                if item.kind != GroupKind::Conflicting {
                    continue;
                }
                for rule in earlier {
                    if touched.insert(rule.source_order) {
                        remove_rule(&source, rule, &mut edits, &mut rewrite);
                        counts.removed += 1;
                    }
                }
                if fold_sorted(&last.declarations) != item.merged_decls
                    && touched.insert(last.source_order)
                {
                    let comments: Vec<&str> =
                        last.comments.iter().map(|range| &source.text[range.clone()]).collect();
                    let body = render_body(&source.text[last.body.clone()], &comments, &item.merged_decls);
                    rewrite.snippets.push(BackupSnippet::in_context(
                        last.context_key(),
                        last.text(&source.text),
                    ));
                    edits.replace(last.body.clone(), body);
                    counts.rewritten += 1;
                }
            }
        }
    }

    if edits.is_empty() {
        return Ok((counts, rewrite, false));
    }

    rewrite.text = edits.apply(&source.text);
    rewrite.prune_shells()?;
    let written = rewrite
        .commit(archive)
        .with_context(|| format!("Failed to write {rel}"))?;
    Ok((counts, rewrite, written))
}

fn remove_rule(source: &StyleSource, rule: &RuleRecord, edits: &mut EditSet, rewrite: &mut Rewrite) {
    rewrite
        .snippets
        .push(BackupSnippet::in_context(rule.context_key(), rule.text(&source.text)));
    edits.remove(rule.removal.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::CascadeOrder;
    use crate::duplicates::detect_duplicates;
    use crate::plan::{OverrideMap, Planner};
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    fn read(root: &Path, rel: &str) -> String {
        std::fs::read_to_string(root.join(rel)).unwrap()
    }

    fn plan(root: &Path, files: &[&str], order: &[&str]) -> ConsolidationPlan {
        let paths: Vec<PathBuf> = files.iter().map(|f| root.join(f)).collect();
        let (sources, _) = StyleSource::load_all(root, &paths);
        let report = detect_duplicates("", &sources);
        let order = CascadeOrder::from_visit_order(order.iter().map(|p| (*p).to_string()).collect());
        let overrides = OverrideMap::default();
        Planner::new(root, &order, &overrides, "components/").plan(&report)
    }

    #[test]
    fn test_identical_group_removed_from_non_canonical() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "a.css", ".keep { top: 0; }\n.btn { color: red; }\n");
        write(root, "b.css", ".btn { color: red; }\n");
        let plan = plan(root, &["a.css", "b.css"], &["a.css", "b.css"]);

        let mut archive = BackupArchive::new(&root.join("backups"), "apply");
        let summary = apply_plan(root, &plan, ApplyMode::Safe, &mut archive);

        assert_eq!(read(root, "a.css"), ".keep { top: 0; }\n");
        assert_eq!(read(root, "b.css"), ".btn { color: red; }\n");
        assert_eq!(summary.rules_removed, 1);
        assert_eq!(summary.files_written, 1);
        assert_eq!(summary.files_processed, 2);
        let backup = std::fs::read_to_string(archive.path_for("a.css")).unwrap();
        assert!(backup.contains(".btn { color: red; }"));
        assert!(summary.backup_dir.is_some());
    }

    #[test]
    fn test_safe_mode_skips_conflicting() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "a.css", ".card { padding: 8px; }\n");
        write(root, "b.css", ".card { padding: 12px; margin: 4px; }\n");
        let plan = plan(root, &["a.css", "b.css"], &["a.css", "b.css"]);

        let mut archive = BackupArchive::new(&root.join("backups"), "apply");
        let summary = apply_plan(root, &plan, ApplyMode::Safe, &mut archive);
        assert_eq!(summary.items_skipped, 1);
        assert_eq!(summary.files_processed, 0);
        assert_eq!(read(root, "a.css"), ".card { padding: 8px; }\n");
    }

    #[test]
    fn test_all_mode_merges_into_canonical() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        // b.css loads first, so a.css decides padding while b.css adds margin
        write(root, "a.css", ".card {\n  padding: 8px;\n}\n");
        write(root, "b.css", ".card {\n  padding: 12px;\n  margin: 4px;\n}\n");
        let plan = plan(root, &["a.css", "b.css"], &["b.css", "a.css"]);
        assert_eq!(plan.items[0].canonical, "a.css");

        let mut archive = BackupArchive::new(&root.join("backups"), "apply");
        let summary = apply_plan(root, &plan, ApplyMode::All, &mut archive);

        assert_eq!(read(root, "a.css"), ".card {\n  margin: 4px;\n  padding: 8px;\n}\n");
        assert_eq!(read(root, "b.css"), "");
        assert_eq!(summary.rules_rewritten, 1);
        assert_eq!(summary.rules_removed, 1);
        let backup_a = std::fs::read_to_string(archive.path_for("a.css")).unwrap();
        assert!(backup_a.contains("padding: 8px;"));
        let backup_b = std::fs::read_to_string(archive.path_for("b.css")).unwrap();
        assert!(backup_b.contains("padding: 12px;"));
    }

    #[test]
    fn test_missing_canonical_rule_is_appended() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "a.css", ".btn { color: red; }\n");
        write(root, "b.css", ".btn { color: red; }\n");
        let plan = plan(root, &["a.css", "b.css"], &["a.css", "b.css"]);
        // Canonical lost its copy between plan and apply
        write(root, "b.css", ".other { top: 0; }\n");

        let mut archive = BackupArchive::new(&root.join("backups"), "apply");
        let summary = apply_plan(root, &plan, ApplyMode::Safe, &mut archive);
        assert_eq!(summary.rules_inserted, 1);
        assert_eq!(read(root, "b.css"), ".other { top: 0; }\n\n.btn {\n  color: red;\n}\n");
        assert_eq!(read(root, "a.css"), "");
    }

    #[test]
    fn test_context_shell_is_pruned_and_blockless_kept() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "a.css", "@import \"b.css\";\n@media print {\n  .btn { color: red; }\n}\n");
        write(root, "b.css", "@media print {\n  .btn { color: red; }\n}\n");
        let plan = plan(root, &["a.css", "b.css"], &["a.css", "b.css"]);

        let mut archive = BackupArchive::new(&root.join("backups"), "apply");
        let summary = apply_plan(root, &plan, ApplyMode::Safe, &mut archive);
        assert_eq!(read(root, "a.css"), "@import \"b.css\";\n");
        assert_eq!(summary.shells_pruned, 1);
        let backup = std::fs::read_to_string(archive.path_for("a.css")).unwrap();
        assert!(backup.contains("/* context: @media print */"));
    }

    #[test]
    fn test_unparsable_file_fails_alone() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "a.css", ".btn { color: red; }\n");
        write(root, "b.css", ".btn { color: red; }\n");
        write(root, "c.css", ".btn { color: red; }\n");
        let plan = plan(root, &["a.css", "b.css", "c.css"], &["a.css", "b.css", "c.css"]);
        write(root, "a.css", ".btn { color: red;\n");

        let mut archive = BackupArchive::new(&root.join("backups"), "apply");
        let summary = apply_plan(root, &plan, ApplyMode::Safe, &mut archive);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].file, "a.css");
        assert_eq!(read(root, "b.css"), "");
        assert_eq!(summary.files_written, 1);
    }

    #[test]
    fn test_second_apply_is_noop() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "a.css", ".btn { color: red; }\n");
        write(root, "b.css", ".btn { color: red; }\n");
        let first = plan(root, &["a.css", "b.css"], &["a.css", "b.css"]);
        let mut archive = BackupArchive::new(&root.join("backups"), "apply");
        apply_plan(root, &first, ApplyMode::Safe, &mut archive);

        let second = plan(root, &["a.css", "b.css"], &["a.css", "b.css"]);
        assert!(second.items.is_empty());
    }
}
