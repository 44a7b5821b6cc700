//! Declaration signatures and last-wins folding.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::parser::Declaration;

/// Canonical, order-independent form of a rule's effective declarations.
///
/// Built by folding declarations last-wins per property and serializing the
/// result sorted by property name. Two rules with equal signatures render the
/// same values for every property they declare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Compute the signature of a declaration list.
    pub fn from_declarations(declarations: &[Declaration]) -> Self {
        let folded = fold_sorted(declarations);
        let mut out = String::new();
        for decl in &folded {
            out.push_str(&decl.property);
            out.push(':');
            out.push_str(&decl.value);
            if decl.important {
                out.push_str("!important");
            }
            out.push(';');
        }
        Self(out)
    }

    /// The serialized signature.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fold declarations last-wins per property, sorted by property name.
pub fn fold_sorted<'a>(declarations: impl IntoIterator<Item = &'a Declaration>) -> Vec<Declaration> {
    let mut folded: BTreeMap<&str, &Declaration> = BTreeMap::new();
    for decl in declarations {
        folded.insert(decl.property.as_str(), decl);
    }
    folded.into_values().cloned().collect()
}

/// Fold declarations last-wins per property, ordered by each property's last occurrence.
pub fn fold_in_order<'a>(declarations: impl IntoIterator<Item = &'a Declaration>) -> Vec<Declaration> {
    let mut last: HashMap<&str, (usize, &Declaration)> = HashMap::new();
    for (seq, decl) in declarations.into_iter().enumerate() {
        last.insert(decl.property.as_str(), (seq, decl));
    }
    let mut kept: Vec<_> = last.into_values().collect();
    kept.sort_by_key(|(seq, _)| *seq);
    kept.into_iter().map(|(_, decl)| decl.clone()).collect()
}
