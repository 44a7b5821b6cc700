//! Rule extraction.
//!
//! Flattens a parsed [`Stylesheet`] into the list of qualified rules the rest of
//! the pipeline reasons about. Each [`RuleRecord`] carries its at-rule context
//! chain (outermost first), its declarations, whether it is flat, and the byte
//! ranges needed to archive, remove, or rewrite it.
//!
//! Two things are never extracted:
//!
//! - rules inside `@keyframes` (their preludes are percentages, not selectors)
//! - rules nested inside another rule's body (the outer rule is recorded as
//!   non-flat and its body stays opaque)

use std::ops::Range;

use super::parser::{Declaration, Node, NodeKind, Stylesheet};
use super::signature::Signature;
use crate::constants::CONTEXT_SEPARATOR;

/// A qualified rule occurrence within one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRecord {
    /// Selector text (whitespace collapsed)
    pub selector: String,
    /// Enclosing at-rule headers, outermost to innermost
    pub context: Vec<String>,
    /// Body declarations in document order
    pub declarations: Vec<Declaration>,
    /// Whether the body holds only declarations and comments
    pub flat: bool,
    /// Position among the extracted rules of the file, starting at 0
    pub source_order: usize,
    /// The rule's own text (selector through closing brace)
    pub span: Range<usize>,
    /// The rule's text including its leading whitespace
    pub removal: Range<usize>,
    /// Text between the braces
    pub body: Range<usize>,
    /// Comment texts found in the body, in order
    pub comments: Vec<Range<usize>>,
}

impl RuleRecord {
    /// Context chain joined into the grouping key form (`""` when global).
    pub fn context_key(&self) -> String {
        self.context.join(CONTEXT_SEPARATOR)
    }

    /// Whether the rule sits outside any at-rule.
    pub fn is_global(&self) -> bool {
        self.context.is_empty()
    }

    /// Canonical signature, or `None` for non-flat rules.
    pub fn signature(&self) -> Option<Signature> {
        self.flat.then(|| Signature::from_declarations(&self.declarations))
    }

    /// Whether this is a flat rule with the given selector and context key.
    pub fn matches_key(&self, selector: &str, context: &str) -> bool {
        self.flat && self.selector == selector && self.context_key() == context
    }

    /// The rule's source text.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }
}

/// Extract every qualified rule of a stylesheet in document order.
pub fn extract_rules(sheet: &Stylesheet) -> Vec<RuleRecord> {
    let mut out = Vec::new();
    let mut context = Vec::new();
    collect(&sheet.nodes, &mut context, &mut out);
    out
}

fn collect(nodes: &[Node], context: &mut Vec<String>, out: &mut Vec<RuleRecord>) {
    for node in nodes {
        match &node.kind {
            NodeKind::Rule(rule) => {
                let comments = rule
                    .block
                    .children
                    .iter()
                    .filter(|child| matches!(child.kind, NodeKind::Comment))
                    .map(|child| child.span.clone())
                    .collect();
                out.push(RuleRecord {
                    selector: rule.selector.clone(),
                    context: context.clone(),
                    declarations: rule.declarations().cloned().collect(),
                    flat: rule.is_flat(),
                    source_order: out.len(),
                    span: node.span.clone(),
                    removal: node.removal_range(),
                    body: rule.block.inner(),
                    comments,
                });
            }
            NodeKind::AtRule(at) if at.is_keyframes() => {}
            NodeKind::AtRule(at) => {
                if let Some(block) = &at.block {
                    context.push(at.header());
                    collect(&block.children, context, out);
                    context.pop();
                }
            }
            _ => {}
        }
    }
}
