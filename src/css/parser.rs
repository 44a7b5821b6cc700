//! Lossless stylesheet parser.
//!
//! The parser builds a shallow tree of [`Node`]s over the original source text
//! without copying or re-printing it. Every node remembers the byte span it was
//! parsed from, plus the offset where its leading whitespace starts, so that
//! later passes can remove or replace a node by slicing the untouched source.
//! This is what lets stylefold archive the exact text of a removed rule and
//! leave every other byte of a file alone.
//!
//! The grammar is intentionally small:
//!
//! - `/* ... */` comments
//! - `@name prelude;` blockless at-rules and `@name prelude { ... }` block at-rules
//! - `selector { ... }` rules, whose bodies may hold anything the top level holds
//! - `property: value [!important];` declarations
//! - anything else ending in `;` or `}` is kept as a [`NodeKind::Raw`] statement
//!
//! Strings, escapes, comments and parenthesised groups are skipped while
//! scanning for the structural `{`, `;` and `}` bytes. Unbalanced braces,
//! unterminated comments and unterminated strings are reported as
//! [`CssParseError`] with a line and column.

use std::ops::Range;
use thiserror::Error;

/// A stylesheet could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct CssParseError {
    /// Human readable description of the problem
    pub message: String,
    /// 1-based line of the offending byte
    pub line: usize,
    /// 1-based column (in characters) of the offending byte
    pub column: usize,
    /// Byte offset of the offending byte
    pub offset: usize,
}

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Declaration {
    /// Property name, trimmed
    #[serde(rename = "prop")]
    pub property: String,
    /// Value without the `!important` flag, trimmed
    pub value: String,
    /// Whether the declaration carried `!important`
    #[serde(default)]
    pub important: bool,
}

impl Declaration {
    /// Create a declaration.
    pub fn new(property: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important,
        }
    }

    /// Render the declaration as `property: value;`.
    pub fn to_css(&self) -> String {
        if self.important {
            format!("{}: {} !important;", self.property, self.value)
        } else {
            format!("{}: {};", self.property, self.value)
        }
    }
}

/// A `{ ... }` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Offset of the opening `{`
    pub open: usize,
    /// Offset of the closing `}`
    pub close: usize,
    /// Parsed children in document order
    pub children: Vec<Node>,
}

impl Block {
    /// Byte range of the text between the braces.
    pub fn inner(&self) -> Range<usize> {
        self.open + 1..self.close
    }
}

/// A qualified rule: `selector { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNode {
    /// Selector text with whitespace collapsed
    pub selector: String,
    /// Offset where the selector text starts
    pub selector_start: usize,
    /// Rule body
    pub block: Block,
}

impl RuleNode {
    /// A rule is flat when its body holds only declarations and comments.
    pub fn is_flat(&self) -> bool {
        self.block
            .children
            .iter()
            .all(|child| matches!(child.kind, NodeKind::Declaration(_) | NodeKind::Comment))
    }

    /// Declarations of the body in document order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.block.children.iter().filter_map(|child| match &child.kind {
            NodeKind::Declaration(decl) => Some(decl),
            _ => None,
        })
    }
}

/// An at-rule, with or without a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRuleNode {
    /// Name without the leading `@`, as written
    pub name: String,
    /// Prelude text with whitespace collapsed
    pub params: String,
    /// Body for block-form at-rules, `None` for directives such as `@import`
    pub block: Option<Block>,
}

impl AtRuleNode {
    /// `@name params` as used in context chains.
    pub fn header(&self) -> String {
        if self.params.is_empty() {
            format!("@{}", self.name)
        } else {
            format!("@{} {}", self.name, self.params)
        }
    }

    /// Whether this is `@keyframes` or a vendor-prefixed variant.
    pub fn is_keyframes(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with("keyframes")
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// The kind of a parsed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// `/* ... */`
    Comment,
    /// `property: value;`
    Declaration(Declaration),
    /// `selector { ... }`
    Rule(RuleNode),
    /// `@name ...`
    AtRule(AtRuleNode),
    /// A statement that is neither a declaration nor a block
    Raw,
}

/// A node in the stylesheet tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Offset where the whitespace preceding this node starts
    pub lead: usize,
    /// Byte range of the node itself (including a terminating `;` or `}`)
    pub span: Range<usize>,
    /// What the node is
    pub kind: NodeKind,
}

impl Node {
    /// Range that removes the node together with its leading whitespace.
    pub fn removal_range(&self) -> Range<usize> {
        self.lead..self.span.end
    }

    /// The node's own source text.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }
}

/// A parsed stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stylesheet {
    /// Top-level nodes in document order
    pub nodes: Vec<Node>,
}

/// Parse stylesheet text into a lossless [`Stylesheet`] tree.
///
/// # Errors
///
/// Returns [`CssParseError`] on unbalanced braces, unterminated comments and
/// unterminated strings.
pub fn parse(source: &str) -> Result<Stylesheet, CssParseError> {
    let mut parser = Parser {
        source,
        bytes: source.as_bytes(),
        pos: 0,
    };
    let (nodes, _) = parser.parse_nodes(None)?;
    Ok(Stylesheet {
        nodes,
    })
}

struct Parser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    /// Parse nodes until the closing `}` of `open`, or EOF at the top level.
    ///
    /// Returns the children and the offset of the closing brace (the source
    /// length at the top level).
    fn parse_nodes(&mut self, open: Option<usize>) -> Result<(Vec<Node>, usize), CssParseError> {
        let mut nodes = Vec::new();
        loop {
            let lead = self.pos;
            self.skip_trivia();

            if self.at_end() {
                return match open {
                    Some(offset) => Err(self.error_at(offset, "Unclosed block")),
                    None => Ok((nodes, self.bytes.len())),
                };
            }

            match self.bytes[self.pos] {
                b'}' => {
                    if open.is_none() {
                        return Err(self.error_at(self.pos, "Unexpected '}'"));
                    }
                    let close = self.pos;
                    self.pos += 1;
                    return Ok((nodes, close));
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    let start = self.pos;
                    self.skip_comment()?;
                    nodes.push(Node {
                        lead,
                        span: start..self.pos,
                        kind: NodeKind::Comment,
                    });
                }
                b'@' => {
                    let node = self.parse_at_rule(lead)?;
                    nodes.push(node);
                }
                _ => {
                    let node = self.parse_statement(lead)?;
                    nodes.push(node);
                }
            }
        }
    }

    fn parse_at_rule(&mut self, lead: usize) -> Result<Node, CssParseError> {
        let start = self.pos;
        self.pos += 1;
        while !self.at_end() {
            let b = self.bytes[self.pos];
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let name = self.source[start + 1..self.pos].to_string();
        let params_start = self.pos;

        match self.scan_prelude()? {
            Some(b'{') => {
                let open = self.pos;
                let params = collapse_whitespace(&self.source[params_start..open]);
                self.pos += 1;
                let (children, close) = self.parse_nodes(Some(open))?;
                Ok(Node {
                    lead,
                    span: start..self.pos,
                    kind: NodeKind::AtRule(AtRuleNode {
                        name,
                        params,
                        block: Some(Block {
                            open,
                            close,
                            children,
                        }),
                    }),
                })
            }
            terminator => {
                let params = collapse_whitespace(&self.source[params_start..self.pos]);
                if terminator == Some(b';') {
                    self.pos += 1;
                }
                Ok(Node {
                    lead,
                    span: start..self.pos,
                    kind: NodeKind::AtRule(AtRuleNode {
                        name,
                        params,
                        block: None,
                    }),
                })
            }
        }
    }

    fn parse_statement(&mut self, lead: usize) -> Result<Node, CssParseError> {
        let start = self.pos;
        match self.scan_prelude()? {
            Some(b'{') => {
                let open = self.pos;
                let selector = collapse_whitespace(&self.source[start..open]);
                self.pos += 1;
                let (children, close) = self.parse_nodes(Some(open))?;
                Ok(Node {
                    lead,
                    span: start..self.pos,
                    kind: NodeKind::Rule(RuleNode {
                        selector,
                        selector_start: start,
                        block: Block {
                            open,
                            close,
                            children,
                        },
                    }),
                })
            }
            terminator => {
                let text_end = self.pos;
                if terminator == Some(b';') {
                    self.pos += 1;
                }
                let kind = parse_declaration(&self.source[start..text_end])
                    .map_or(NodeKind::Raw, NodeKind::Declaration);
                Ok(Node {
                    lead,
                    span: start..self.pos,
                    kind,
                })
            }
        }
    }

    /// Advance to the next top-level `{`, `;` or `}` without consuming it.
    fn scan_prelude(&mut self) -> Result<Option<u8>, CssParseError> {
        let mut depth = 0usize;
        while !self.at_end() {
            let b = self.bytes[self.pos];
            match b {
                b'\\' => {
                    self.pos = (self.pos + 2).min(self.bytes.len());
                    continue;
                }
                b'"' | b'\'' => {
                    self.skip_string(b)?;
                    continue;
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    self.skip_comment()?;
                    continue;
                }
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                b'{' | b';' | b'}' if depth == 0 => return Ok(Some(b)),
                _ => {}
            }
            self.pos += 1;
        }
        Ok(None)
    }

    /// Skip whitespace and stray semicolons.
    fn skip_trivia(&mut self) {
        while !self.at_end() {
            let b = self.bytes[self.pos];
            if b.is_ascii_whitespace() || b == b';' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), CssParseError> {
        let start = self.pos;
        match self.source[start + 2..].find("*/") {
            Some(offset) => {
                self.pos = start + 2 + offset + 2;
                Ok(())
            }
            None => Err(self.error_at(start, "Unclosed comment")),
        }
    }

    fn skip_string(&mut self, quote: u8) -> Result<(), CssParseError> {
        let start = self.pos;
        self.pos += 1;
        while !self.at_end() {
            let b = self.bytes[self.pos];
            if b == b'\\' {
                self.pos = (self.pos + 2).min(self.bytes.len());
            } else if b == quote {
                self.pos += 1;
                return Ok(());
            } else {
                self.pos += 1;
            }
        }
        Err(self.error_at(start, "Unclosed string"))
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn error_at(&self, offset: usize, message: &str) -> CssParseError {
        let (line, column) = line_column(self.source, offset);
        CssParseError {
            message: message.to_string(),
            line,
            column,
            offset,
        }
    }
}

/// 1-based line and column of a byte offset.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Parse `property: value [!important]`, or `None` if the text is not a declaration.
fn parse_declaration(text: &str) -> Option<Declaration> {
    let colon = text.find(':')?;
    let property = text[..colon].trim();
    if property.is_empty() || !property.chars().enumerate().all(|(idx, c)| is_property_char(idx, c)) {
        return None;
    }

    let mut value = text[colon + 1..].trim();
    let mut important = false;
    if let Some(bang) = value.rfind('!')
        && value[bang + 1..].trim().eq_ignore_ascii_case("important")
    {
        important = true;
        value = value[..bang].trim_end();
    }

    Some(Declaration::new(property, value, important))
}

fn is_property_char(idx: usize, c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || (idx == 0 && c == '*')
}

/// Trim and collapse runs of whitespace outside quoted strings.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;

    for c in text.trim().chars() {
        if let Some(q) = quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
        out.push(c);
    }
    out
}
