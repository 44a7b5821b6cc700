//! Consolidation planning.
//!
//! For every cross-file group of a [`DuplicateReport`] the planner
//!
//! 1. picks exactly one canonical file: an override when one applies, else
//!    the member with the highest cascade rank, else a path heuristic
//! 2. re-collects every matching flat rule of every member file and orders
//!    them by `(file rank, source order)`, unranked files first
//! 3. folds their declarations last-wins across that whole sequence
//!
//! so that the merged rule reproduces what rendered before consolidation.

use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use super::artifact::{CanonicalSource, ConsolidationPlan, PlanItem};
use super::overrides::OverrideMap;
use crate::cascade::CascadeOrder;
use crate::css::{Declaration, StyleSource, fold_sorted, render_rule};
use crate::duplicates::{DuplicateReport, ReportItem};

/// Inputs shared by every item of one planning run.
pub struct Planner<'a> {
    root: &'a Path,
    order: &'a CascadeOrder,
    overrides: &'a OverrideMap,
    component_hint: &'a str,
    sources: HashMap<String, Option<StyleSource>>,
}

/// A rule occurrence positioned in cascade sequence.
struct RankedOccurrence<'s> {
    rank: Option<usize>,
    source_order: usize,
    declarations: &'s [Declaration],
}

impl<'a> Planner<'a> {
    /// Create a planner over a project root.
    pub fn new(
        root: &'a Path,
        order: &'a CascadeOrder,
        overrides: &'a OverrideMap,
        component_hint: &'a str,
    ) -> Self {
        Self {
            root,
            order,
            overrides,
            component_hint,
            sources: HashMap::new(),
        }
    }

    /// Seed the parsed-source cache, mainly for in-memory use.
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = StyleSource>) -> Self {
        for source in sources {
            self.sources.insert(source.rel.clone(), Some(source));
        }
        self
    }

    /// Plan every item of `report`.
    pub fn plan(&mut self, report: &DuplicateReport) -> ConsolidationPlan {
        let items: Vec<PlanItem> =
            report.items.iter().filter_map(|item| self.plan_item(item)).collect();

        let identical_groups =
            items.iter().filter(|item| item.kind == crate::duplicates::GroupKind::Identical).count();

        ConsolidationPlan {
            generated_at: Utc::now(),
            base_dir: report.base_dir.clone(),
            files_considered: report.files_scanned,
            groups_considered: report.total_groups,
            identical_groups,
            conflicting_groups: items.len() - identical_groups,
            items,
        }
    }

    /// Choose the canonical file of a group.
    pub fn choose_canonical(
        &self,
        selector: &str,
        context: &str,
        files: &[String],
    ) -> Option<(String, CanonicalSource)> {
        if let Some(file) = self.overrides.choose(selector, context, files) {
            return Some((file, CanonicalSource::Override));
        }

        let mut best: Option<(&String, usize)> = None;
        for file in files {
            if let Some(rank) = self.order.rank(file)
                && best.is_none_or(|(_, best_rank)| rank > best_rank)
            {
                best = Some((file, rank));
            }
        }
        if let Some((file, _)) = best {
            return Some((file.clone(), CanonicalSource::Cascade));
        }

        files
            .iter()
            .find(|file| file.contains(self.component_hint))
            .or_else(|| files.first())
            .map(|file| (file.clone(), CanonicalSource::Heuristic))
    }

    fn source(&mut self, rel: &str) -> Option<&StyleSource> {
        if !self.sources.contains_key(rel) {
            let loaded = StyleSource::load(self.root, &self.root.join(rel))
                .inspect_err(|err| warn!("Cannot read group member {rel}: {err:#}"))
                .ok();
            self.sources.insert(rel.to_string(), loaded);
        }
        self.sources.get(rel).and_then(Option::as_ref)
    }

    fn plan_item(&mut self, item: &ReportItem) -> Option<PlanItem> {
        let Some((canonical, canonical_source)) =
            self.choose_canonical(&item.selector, &item.context, &item.files)
        else {
            warn!("Group {} has no member files; skipping", item.selector);
            return None;
        };

        for file in &item.files {
            self.source(file);
        }

        let mut ranked: Vec<RankedOccurrence<'_>> = Vec::new();
        let mut context_chain: Option<Vec<String>> = None;
        let mut missing: Vec<&str> = Vec::new();
        for file in &item.files {
            let Some(source) = self.sources.get(file.as_str()).and_then(Option::as_ref) else {
                missing.push(file);
                continue;
            };
            let rank = self.order.rank(file);
            for rule in source.matching_rules(&item.selector, &item.context) {
                context_chain.get_or_insert_with(|| rule.context.clone());
                ranked.push(RankedOccurrence {
                    rank,
                    source_order: rule.source_order,
                    declarations: &rule.declarations,
                });
            }
        }

        let Some(context_chain) = context_chain else {
            warn!(
                "No flat rule for {} [{}] found in its member files any more; skipping",
                item.selector, item.context
            );
            return None;
        };

        // Stable: unranked files keep report order among themselves
        ranked.sort_by_key(|occurrence| (occurrence.rank, occurrence.source_order));
        let merged_decls =
            fold_sorted(ranked.iter().flat_map(|occurrence| occurrence.declarations.iter()));
        let rule_css = render_rule(&item.selector, &context_chain, &merged_decls);

        let mut warnings = Vec::new();
        if canonical_source == CanonicalSource::Heuristic {
            warnings.push(format!(
                "No member file is reachable from the entry points; {canonical} was chosen by path heuristic"
            ));
        }
        let unranked: Vec<&str> = item
            .files
            .iter()
            .filter(|file| self.order.rank(file).is_none())
            .map(String::as_str)
            .collect();
        if !unranked.is_empty() {
            warnings.push(format!(
                "Not reachable from the entry points: {}; their load order is unknown",
                unranked.join(", ")
            ));
        }
        if !missing.is_empty() {
            warnings.push(format!("Could not read: {}", missing.join(", ")));
        }

        debug!(
            "Planned {} [{}]: canonical {} ({}), {} occurrences",
            item.selector,
            item.context,
            canonical,
            canonical_source,
            ranked.len()
        );

        Some(PlanItem {
            selector: item.selector.clone(),
            context: item.context.clone(),
            kind: item.kind,
            canonical_rank: self.order.rank(&canonical),
            remove_from: item.files.iter().filter(|file| **file != canonical).cloned().collect(),
            canonical,
            canonical_source,
            merged_decls,
            rule_css,
            warnings,
        })
    }
}
