//! Text edits over stylesheet sources.
//!
//! Every mutating pass in stylefold follows the same three steps: parse a
//! snapshot, compute an [`EditSet`] against that snapshot, then apply the whole
//! set in one pass. Nothing is removed while the rule list is being walked.
//!
//! Edits address byte ranges of the snapshot they were computed from, so an
//! [`EditSet`] must only be applied to that exact text.

use std::ops::Range;
use tracing::warn;

use super::parser::{CssParseError, Declaration, Node, NodeKind, parse};

/// A single change to a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    /// Replace a byte range (empty replacement removes it)
    Replace {
        range: Range<usize>,
        text: String,
    },
    /// Append text at the end of the file
    Append(String),
}

/// A batch of non-overlapping edits against one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    /// Create an empty edit set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a byte range.
    pub fn remove(&mut self, range: Range<usize>) {
        self.edits.push(Edit::Replace {
            range,
            text: String::new(),
        });
    }

    /// Replace a byte range with new text.
    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.edits.push(Edit::Replace {
            range,
            text: text.into(),
        });
    }

    /// Append a block of text to the end of the file.
    pub fn append(&mut self, text: impl Into<String>) {
        self.edits.push(Edit::Append(text.into()));
    }

    /// Number of queued edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether no edits are queued.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all edits to `source` and return the new text.
    ///
    /// Range edits are applied in ascending order; a range overlapping an
    /// earlier one is dropped with a warning. Appends are added after the last
    /// byte, each separated from the previous content by a blank line.
    pub fn apply(&self, source: &str) -> String {
        let mut ranges: Vec<(&Range<usize>, &str)> = Vec::new();
        let mut appends: Vec<&str> = Vec::new();
        for edit in &self.edits {
            match edit {
                Edit::Replace {
                    range,
                    text,
                } => ranges.push((range, text.as_str())),
                Edit::Append(text) => appends.push(text.as_str()),
            }
        }
        ranges.sort_by_key(|(range, _)| (range.start, range.end));

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for (range, text) in ranges {
            if range.start < cursor || range.end > source.len() {
                warn!("Skipping overlapping edit at bytes {}..{}", range.start, range.end);
                continue;
            }
            out.push_str(&source[cursor..range.start]);
            out.push_str(text);
            cursor = range.end;
        }
        out.push_str(&source[cursor..]);

        for text in appends {
            if !out.is_empty() {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                if !out.ends_with("\n\n") {
                    out.push('\n');
                }
            }
            out.push_str(text.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Remove empty rule shells and empty block at-rules.
///
/// A rule is an empty shell when its body holds nothing but comments. A block
/// at-rule is empty when every child is a comment or itself empty; this is
/// evaluated bottom-up, so one pass clears whole chains of emptied wrappers.
/// Blockless at-rules (`@import`, `@charset`, `@namespace`, `@layer a, b;`)
/// are always kept. Non-empty rules are never entered.
///
/// Returns the pruned text and the source text of every removed node.
///
/// # Errors
///
/// Returns an error if `source` does not parse.
pub fn prune_empty(source: &str) -> Result<(String, Vec<String>), CssParseError> {
    let sheet = parse(source)?;
    let mut edits = EditSet::new();
    let mut removed = Vec::new();
    collect_empty(source, &sheet.nodes, &mut edits, &mut removed);
    Ok((edits.apply(source), removed))
}

fn collect_empty(source: &str, nodes: &[Node], edits: &mut EditSet, removed: &mut Vec<String>) {
    for node in nodes {
        if is_empty_shell(node) {
            edits.remove(node.removal_range());
            removed.push(node.text(source).to_string());
        } else if let NodeKind::AtRule(at) = &node.kind
            && let Some(block) = &at.block
        {
            collect_empty(source, &block.children, edits, removed);
        }
    }
}

fn is_empty_shell(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Rule(rule) => {
            rule.block.children.iter().all(|child| matches!(child.kind, NodeKind::Comment))
        }
        NodeKind::AtRule(at) => match &at.block {
            None => false,
            Some(block) => block
                .children
                .iter()
                .all(|child| matches!(child.kind, NodeKind::Comment) || is_empty_shell(child)),
        },
        _ => false,
    }
}

/// Render a standalone rule, wrapped in its context at-rules.
///
/// Declarations are written one per line sorted by property; each enclosing
/// at-rule adds one level of two-space indentation.
pub fn render_rule(selector: &str, context: &[String], declarations: &[Declaration]) -> String {
    let mut sorted: Vec<&Declaration> = declarations.iter().collect();
    sorted.sort_by(|a, b| a.property.cmp(&b.property));

    let depth = context.len();
    let pad = |level: usize| "  ".repeat(level);

    let mut out = String::new();
    for (level, header) in context.iter().enumerate() {
        out.push_str(&format!("{}{} {{\n", pad(level), header));
    }
    out.push_str(&format!("{}{} {{\n", pad(depth), selector));
    for decl in sorted {
        out.push_str(&format!("{}{}\n", pad(depth + 1), decl.to_css()));
    }
    out.push_str(&format!("{}}}", pad(depth)));
    for level in (0..depth).rev() {
        out.push_str(&format!("\n{}}}", pad(level)));
    }
    out
}

/// Render replacement body text for a rule, keeping its existing layout.
///
/// `original_body` is the current text between the braces. Multi-line bodies
/// keep their indentation and closing-brace alignment; single-line bodies stay
/// on one line. `comments` are re-emitted before the declarations.
pub fn render_body(original_body: &str, comments: &[&str], declarations: &[Declaration]) -> String {
    let items: Vec<String> = comments
        .iter()
        .map(|comment| (*comment).to_string())
        .chain(declarations.iter().map(Declaration::to_css))
        .collect();

    if !original_body.contains('\n') {
        return if items.is_empty() {
            String::new()
        } else {
            format!(" {} ", items.join(" "))
        };
    }

    let indent = body_indent(original_body).unwrap_or_else(|| "  ".to_string());
    let closing = original_body
        .rsplit('\n')
        .next()
        .filter(|tail| tail.chars().all(char::is_whitespace))
        .unwrap_or("")
        .to_string();

    let mut out = String::new();
    for item in items {
        out.push('\n');
        out.push_str(&indent);
        out.push_str(&item);
    }
    out.push('\n');
    out.push_str(&closing);
    out
}

/// Indentation of the first non-blank line of a body.
fn body_indent(body: &str) -> Option<String> {
    body.split('\n').skip(1).find(|line| !line.trim().is_empty()).map(|line| {
        line.chars().take_while(|c| c.is_whitespace()).collect()
    })
}
