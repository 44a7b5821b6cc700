//! Canonical override map.
//!
//! Operators can pin the canonical file of selected groups:
//!
//! ```json
//! {
//!   "rules": [
//!     { "selector": ".btn", "canonical": "src/styles/components/button.css" },
//!     { "selectorPrefix": ".card", "context": "", "canonical": "src/styles/components/card.css" },
//!     { "selectorRegex": "^\\.u-", "canonical": "src/styles/utilities.css" }
//!   ]
//! }
//! ```
//!
//! Rules are tried in order and the first match decides. When the matched
//! rule's canonical file is not a member of the group, the cascade choice is
//! used instead; later rules are not consulted.

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::core::StylefoldError;

/// One override rule as written in the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRule {
    /// Exact selector to match
    pub selector: Option<String>,
    /// Selector prefix to match
    pub selector_prefix: Option<String>,
    /// Selector regular expression to match
    pub selector_regex: Option<String>,
    /// Exact context filter; `""` matches global groups only
    pub context: Option<String>,
    /// Project-relative canonical file
    pub canonical: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OverrideFile {
    #[serde(default)]
    rules: Vec<OverrideRule>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: OverrideRule,
    regex: Option<Regex>,
    canonical: String,
}

impl CompiledRule {
    fn matches(&self, selector: &str, context: &str) -> bool {
        if let Some(filter) = &self.rule.context
            && filter != context
        {
            return false;
        }
        if self.rule.selector.as_deref() == Some(selector) {
            return true;
        }
        if let Some(prefix) = &self.rule.selector_prefix
            && !prefix.is_empty()
            && selector.starts_with(prefix.as_str())
        {
            return true;
        }
        self.regex.as_ref().is_some_and(|regex| regex.is_match(selector))
    }
}

/// Compiled canonical overrides, in evaluation order.
#[derive(Debug, Clone, Default)]
pub struct OverrideMap {
    rules: Vec<CompiledRule>,
}

impl OverrideMap {
    /// Compile override rules.
    ///
    /// Rules without a canonical file are dropped. An invalid regular
    /// expression is logged and never matches.
    pub fn new(rules: Vec<OverrideRule>) -> Self {
        let rules = rules
            .into_iter()
            .filter_map(|rule| {
                let canonical = normalize_rel(rule.canonical.as_deref()?);
                if canonical.is_empty() {
                    return None;
                }
                let regex = rule.selector_regex.as_deref().and_then(|pattern| {
                    Regex::new(pattern)
                        .inspect_err(|err| {
                            warn!("Ignoring invalid selectorRegex {pattern:?}: {err}");
                        })
                        .ok()
                });
                Some(CompiledRule {
                    rule,
                    regex,
                    canonical,
                })
            })
            .collect();
        Self {
            rules,
        }
    }

    /// Read an override map from a JSON file.
    ///
    /// # Errors
    ///
    /// [`StylefoldError::OverrideMapError`] when the file is missing,
    /// unreadable or not a valid map.
    pub fn load(path: &Path) -> Result<Self> {
        let error = |reason: String| StylefoldError::OverrideMapError {
            file: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|err| error(err.to_string()))?;
        let file: OverrideFile =
            serde_json::from_str(&content).map_err(|err| error(err.to_string()))?;
        Ok(Self::new(file.rules))
    }

    /// Number of usable rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The override canonical for a group, if the first matching rule names
    /// one of its member files.
    pub fn choose(&self, selector: &str, context: &str, files: &[String]) -> Option<String> {
        let rule = self.rules.iter().find(|rule| rule.matches(selector, context))?;
        if files.iter().any(|file| *file == rule.canonical) {
            Some(rule.canonical.clone())
        } else {
            warn!(
                "Override for {selector} names {} which is not a member of the group; using cascade order",
                rule.canonical
            );
            None
        }
    }
}

/// Forward slashes, no leading `./`.
fn normalize_rel(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}
