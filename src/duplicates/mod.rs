//! Cross-file duplicate detection.
//!
//! Every flat rule of every scanned stylesheet is keyed by
//! `(context, selector)`. A key whose occurrences span more than one file is a
//! cross-file group; it is [`GroupKind::Identical`] when all occurrences share
//! one [`Signature`] and [`GroupKind::Conflicting`] otherwise.
//!
//! Non-flat rules never take part: they have no signature.

pub mod report;

pub use report::{DuplicateReport, GroupKind, ReportItem, SignatureExample};

use chrono::Utc;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::debug;

use crate::css::{Signature, StyleSource};

/// One flat rule occurrence of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Project-relative file path
    pub file: String,
    /// Position among the file's extracted rules
    pub source_order: usize,
    /// The rule's signature
    pub signature: Signature,
}

/// All occurrences sharing one `(context, selector)` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Selector text
    pub selector: String,
    /// Joined context chain
    pub context: String,
    /// Occurrences in scan order (file order, then document order)
    pub occurrences: Vec<Occurrence>,
}

impl DuplicateGroup {
    /// Distinct member files in scan order.
    pub fn files(&self) -> Vec<String> {
        let mut files: Vec<String> = Vec::new();
        for occurrence in &self.occurrences {
            if !files.contains(&occurrence.file) {
                files.push(occurrence.file.clone());
            }
        }
        files
    }

    /// Whether the group spans more than one file.
    pub fn is_cross_file(&self) -> bool {
        self.occurrences.iter().any(|o| o.file != self.occurrences[0].file)
    }

    /// Distinct signatures with the files declaring each, in first-seen order.
    pub fn signature_examples(&self) -> Vec<SignatureExample> {
        let mut examples: Vec<SignatureExample> = Vec::new();
        for occurrence in &self.occurrences {
            match examples.iter_mut().find(|e| e.signature == occurrence.signature) {
                Some(example) => {
                    if !example.files.contains(&occurrence.file) {
                        example.files.push(occurrence.file.clone());
                    }
                }
                None => examples.push(SignatureExample {
                    signature: occurrence.signature.clone(),
                    files: vec![occurrence.file.clone()],
                }),
            }
        }
        examples
    }

    /// Identical or conflicting.
    pub fn kind(&self) -> GroupKind {
        GroupKind::from_signature_count(self.signature_examples().len())
    }
}

/// Group every flat rule of `sources` by `(context, selector)`.
///
/// Groups come back ordered by key; each key appears exactly once.
pub fn group_rules(sources: &[StyleSource]) -> Vec<DuplicateGroup> {
    let mut groups: BTreeMap<(String, String), Vec<Occurrence>> = BTreeMap::new();
    for source in sources {
        for rule in &source.rules {
            let Some(signature) = rule.signature() else {
                continue;
            };
            groups.entry((rule.context_key(), rule.selector.clone())).or_default().push(Occurrence {
                file: source.rel.clone(),
                source_order: rule.source_order,
                signature,
            });
        }
    }

    groups
        .into_iter()
        .map(|((context, selector), occurrences)| DuplicateGroup {
            selector,
            context,
            occurrences,
        })
        .collect()
}

/// Build the duplicate report for a scanned tree.
///
/// `base_dir` is recorded verbatim. Only cross-file groups become items,
/// sorted conflicting first, then by selector, then by context.
pub fn detect_duplicates(base_dir: &str, sources: &[StyleSource]) -> DuplicateReport {
    let groups = group_rules(sources);
    let total_groups = groups.len();

    let mut items: Vec<ReportItem> = groups
        .iter()
        .filter(|group| group.is_cross_file())
        .map(|group| {
            let signature_examples = group.signature_examples();
            let item = ReportItem {
                selector: group.selector.clone(),
                context: group.context.clone(),
                files: group.files(),
                unique_signatures: signature_examples.len(),
                kind: GroupKind::from_signature_count(signature_examples.len()),
                signature_examples,
            };
            debug!(
                "Group {} [{}]: {} across {} files",
                item.selector,
                item.context,
                item.kind,
                item.files.len()
            );
            item
        })
        .collect();

    items.sort_by(|a, b| {
        (Reverse(a.kind), &a.selector, &a.context).cmp(&(Reverse(b.kind), &b.selector, &b.context))
    });

    let identical_groups = items.iter().filter(|item| item.kind == GroupKind::Identical).count();
    DuplicateReport {
        generated_at: Utc::now(),
        base_dir: base_dir.to_string(),
        files_scanned: sources.len(),
        total_groups,
        cross_file_groups: items.len(),
        identical_groups,
        conflicting_groups: items.len() - identical_groups,
        items,
    }
}
