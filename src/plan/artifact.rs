//! Consolidation plan artifact.
//!
//! Written to `reports/css-cross-file-consolidation-plan.json` by
//! `stylefold plan` and executed by `stylefold apply`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::css::Declaration;
use crate::duplicates::GroupKind;
use crate::utils::fs::{read_json_artifact, write_json_file};

/// How the canonical file of an item was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalSource {
    /// An override map rule named a member file
    Override,
    /// The member with the highest cascade rank
    Cascade,
    /// No member was ranked; chosen by path
    Heuristic,
}

impl fmt::Display for CanonicalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Cascade => write!(f, "cascade"),
            Self::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// The consolidation decision for one duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    /// Selector text
    pub selector: String,
    /// Joined context chain
    pub context: String,
    /// Identical or conflicting
    pub kind: GroupKind,
    /// File that keeps (or receives) the rule
    pub canonical: String,
    /// How `canonical` was chosen
    pub canonical_source: CanonicalSource,
    /// Cascade rank of `canonical`; `null` when unreached
    pub canonical_rank: Option<usize>,
    /// Member files that lose their copies
    pub remove_from: Vec<String>,
    /// Last-wins declarations across every occurrence, sorted by property
    pub merged_decls: Vec<Declaration>,
    /// Rule text to append when the canonical file lacks the rule
    pub rule_css: String,
    /// Reasons to review this item by hand
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// The consolidation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationPlan {
    /// When the plan was generated
    pub generated_at: DateTime<Utc>,
    /// Scanned stylesheet directory, as recorded by the report
    pub base_dir: String,
    /// Stylesheets scanned by the report
    pub files_considered: usize,
    /// Every `(selector, context)` group of the report, cross-file or not
    pub groups_considered: usize,
    /// Items of kind identical
    pub identical_groups: usize,
    /// Items of kind conflicting
    pub conflicting_groups: usize,
    /// Planned items, in report order
    pub items: Vec<PlanItem>,
}

impl ConsolidationPlan {
    /// Read a plan written by an earlier run.
    ///
    /// # Errors
    ///
    /// [`crate::core::StylefoldError::MissingArtifact`] when absent, or
    /// [`crate::core::StylefoldError::InvalidArtifact`] when malformed.
    pub fn load(path: &Path) -> Result<Self> {
        read_json_artifact(path, "consolidation plan")
    }

    /// Write the plan as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_file(path, self)
    }

    /// Items carrying at least one warning.
    pub fn warned_items(&self) -> usize {
        self.items.iter().filter(|item| !item.warnings.is_empty()).count()
    }
}
