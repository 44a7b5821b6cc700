//! Duplicate report artifact.
//!
//! Serialized to `reports/css-cross-file-duplicates.json` by `stylefold report`
//! and read back by `stylefold plan`. Field names are camelCase; `kind` is the
//! lowercase tag `"identical"` or `"conflicting"`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::css::Signature;
use crate::utils::fs::{read_json_artifact, write_json_file};

/// Classification of a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Every occurrence has the same signature
    Identical,
    /// At least two distinct signatures
    Conflicting,
}

impl GroupKind {
    /// Classify by number of distinct signatures.
    pub fn from_signature_count(count: usize) -> Self {
        if count > 1 {
            Self::Conflicting
        } else {
            Self::Identical
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identical => write!(f, "identical"),
            Self::Conflicting => write!(f, "conflicting"),
        }
    }
}

/// Files sharing one distinct signature within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureExample {
    /// The shared signature
    pub signature: Signature,
    /// Files declaring it, in scan order
    pub files: Vec<String>,
}

/// One cross-file duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportItem {
    /// Selector text
    pub selector: String,
    /// Context chain joined with `" > "`; empty for global rules
    pub context: String,
    /// Member files, in scan order
    pub files: Vec<String>,
    /// Number of distinct signatures
    pub unique_signatures: usize,
    /// Identical or conflicting
    pub kind: GroupKind,
    /// One entry per distinct signature
    pub signature_examples: Vec<SignatureExample>,
}

/// The duplicate report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
    /// Scanned stylesheet directory, relative to the project root
    pub base_dir: String,
    /// Number of stylesheets parsed
    pub files_scanned: usize,
    /// Distinct `(context, selector)` keys among flat rules
    pub total_groups: usize,
    /// Keys spanning more than one file
    pub cross_file_groups: usize,
    /// Cross-file groups with one signature
    pub identical_groups: usize,
    /// Cross-file groups with several signatures
    pub conflicting_groups: usize,
    /// Cross-file groups, conflicting first
    pub items: Vec<ReportItem>,
}

impl DuplicateReport {
    /// Read a report written by an earlier run.
    ///
    /// # Errors
    ///
    /// [`crate::core::StylefoldError::MissingArtifact`] when absent, or
    /// [`crate::core::StylefoldError::InvalidArtifact`] when malformed.
    pub fn load(path: &Path) -> Result<Self> {
        read_json_artifact(path, "duplicate report")
    }

    /// Write the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_file(path, self)
    }
}
