//! Stylesheet parsing, rule extraction and text edits.
//!
//! This module holds the leaf primitives every stylefold phase is built on:
//!
//! - [`parser`] - lossless, span-preserving stylesheet tree
//! - [`extract`] - flat [`RuleRecord`] list with at-rule context chains
//! - [`signature`] - canonical last-wins [`Signature`] for rule equality
//! - [`selector`] - selector list splitting
//! - [`edit`] - snapshot edits, empty-shell pruning, rule rendering
//!
//! [`StyleSource`] bundles a file's path, its raw text and the rules parsed from
//! it. Sources are read fresh on every run and never persisted.

pub mod edit;
pub mod extract;
pub mod parser;
pub mod selector;
pub mod signature;

pub use edit::{EditSet, prune_empty, render_body, render_rule};
pub use extract::{RuleRecord, extract_rules};
pub use parser::{CssParseError, Declaration, Stylesheet, parse};
pub use signature::{Signature, fold_in_order, fold_sorted};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::StylefoldError;
use crate::utils::fs::relative_posix;

/// A stylesheet file together with its parsed rules.
#[derive(Debug, Clone)]
pub struct StyleSource {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Project-relative path with forward slashes
    pub rel: String,
    /// Raw text as read from disk
    pub text: String,
    /// Parsed tree
    pub sheet: Stylesheet,
    /// Extracted rules in document order
    pub rules: Vec<RuleRecord>,
}

impl StyleSource {
    /// Parse an in-memory stylesheet.
    ///
    /// # Errors
    ///
    /// Returns [`CssParseError`] if the text does not parse.
    pub fn from_text(
        path: PathBuf,
        rel: impl Into<String>,
        text: String,
    ) -> Result<Self, CssParseError> {
        let sheet = parse(&text)?;
        let rules = extract_rules(&sheet);
        Ok(Self {
            path,
            rel: rel.into(),
            text,
            sheet,
            rules,
        })
    }

    /// Read and parse a stylesheet below `root`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// [`StylefoldError::ParseError`] if it does not parse.
    pub fn load(root: &Path, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stylesheet: {}", path.display()))?;
        let rel = relative_posix(root, path);
        Self::from_text(path.to_path_buf(), rel.clone(), text).map_err(|err| {
            StylefoldError::ParseError {
                file: rel,
                line: err.line,
                column: err.column,
                reason: err.message,
            }
            .into()
        })
    }

    /// Load every stylesheet in `paths`, skipping files that fail to read or
    /// parse.
    ///
    /// Skipped files are logged with `warn!` and returned by project-relative
    /// path alongside the loaded sources.
    pub fn load_all(root: &Path, paths: &[PathBuf]) -> (Vec<Self>, Vec<String>) {
        let mut sources = Vec::with_capacity(paths.len());
        let mut skipped = Vec::new();
        for path in paths {
            match Self::load(root, path) {
                Ok(source) => {
                    debug!("Parsed {} ({} rules)", source.rel, source.rules.len());
                    sources.push(source);
                }
                Err(err) => {
                    warn!("Skipping {}: {:#}", relative_posix(root, path), err);
                    skipped.push(relative_posix(root, path));
                }
            }
        }
        (sources, skipped)
    }

    /// Flat rules matching a `(selector, context)` group key, in document order.
    pub fn matching_rules<'a>(
        &'a self,
        selector: &'a str,
        context: &'a str,
    ) -> impl Iterator<Item = &'a RuleRecord> + 'a {
        self.rules.iter().filter(move |rule| rule.matches_key(selector, context))
    }
}
