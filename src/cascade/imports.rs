//! Import specifier extraction.
//!
//! Two sources of load order are recognized:
//!
//! - stylesheet `@import` statements: `@import "a.css";`, `@import url("a.css");`
//!   and `@import url(a.css);` (trailing media or layer conditions are ignored)
//! - script-level side-effect or named imports of a stylesheet:
//!   `import "./app.css";`, `import styles from './card.css'`
//!
//! Only specifiers ending in `.css` are returned. External specifiers
//! (`http:`, `https:`, protocol-relative `//`, `data:`) are dropped.

use anyhow::{Context, Result};
use regex::Regex;

use crate::css::parser::{Node, NodeKind, Stylesheet};

/// Every local `@import` target of a stylesheet, in document order.
pub fn css_import_targets(sheet: &Stylesheet) -> Vec<String> {
    let mut out = Vec::new();
    collect_imports(&sheet.nodes, &mut out);
    out
}

fn collect_imports(nodes: &[Node], out: &mut Vec<String>) {
    for node in nodes {
        if let NodeKind::AtRule(at) = &node.kind {
            if at.is_named("import") {
                if let Some(target) = import_specifier(&at.params) {
                    out.push(target);
                }
            } else if let Some(block) = &at.block {
                collect_imports(&block.children, out);
            }
        }
    }
}

/// The target of an `@import` prelude, if it names a local stylesheet.
pub fn import_specifier(params: &str) -> Option<String> {
    let params = params.trim();
    let target = if params.get(..4).is_some_and(|head| head.eq_ignore_ascii_case("url(")) {
        let close = params.find(')')?;
        unquote(params[4..close].trim())
    } else {
        leading_string(params)?
    };
    is_local_stylesheet(target).then(|| target.to_string())
}

/// Strip one pair of matching quotes, if present.
fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// A quoted string at the start of `text`.
fn leading_string(text: &str) -> Option<&str> {
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &text[1..];
    let end = rest.find(quote)?;
    Some(&rest[..end])
}

fn is_local_stylesheet(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    !target.is_empty()
        && lower.ends_with(".css")
        && !lower.starts_with("http:")
        && !lower.starts_with("https:")
        && !lower.starts_with("data:")
        && !target.starts_with("//")
}

/// Finds stylesheet imports in script sources.
#[derive(Debug, Clone)]
pub struct ScriptImportScanner {
    pattern: Regex,
}

impl ScriptImportScanner {
    /// Compile the import pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern fails to compile.
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(r#"import\s+(?:[^'";]*from\s+)?["']([^"']+?\.css)["']"#)
            .context("Failed to compile script import pattern")?;
        Ok(Self {
            pattern,
        })
    }

    /// Every local stylesheet specifier imported by `source`, in order.
    pub fn targets(&self, source: &str) -> Vec<String> {
        self.pattern
            .captures_iter(source)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|target| is_local_stylesheet(target))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parse;

    #[test]
    fn test_import_specifier_forms() {
        assert_eq!(import_specifier("\"base/reset.css\""), Some("base/reset.css".to_string()));
        assert_eq!(import_specifier("'a.css' screen"), Some("a.css".to_string()));
        assert_eq!(import_specifier("url(\"theme.css\")"), Some("theme.css".to_string()));
        assert_eq!(import_specifier("URL( layout.css ) layer(base)"), Some("layout.css".to_string()));
        assert_eq!(import_specifier("url(https://cdn.example.com/x.css)"), None);
        assert_eq!(import_specifier("\"//cdn.example.com/x.css\""), None);
        assert_eq!(import_specifier("\"font.woff2\""), None);
    }

    #[test]
    fn test_css_import_targets_in_order() {
        let sheet = parse(
            "@charset \"utf-8\";\n@import \"base.css\";\n@import url(components/button.css);\n\
             @layer x { @import \"ignored-but-scanned.css\"; }\n.a { color: red; }",
        )
        .unwrap();
        assert_eq!(
            css_import_targets(&sheet),
            vec!["base.css", "components/button.css", "ignored-but-scanned.css"]
        );
    }

    #[test]
    fn test_script_targets() {
        let scanner = ScriptImportScanner::new().unwrap();
        let source = "import './styles/app.css';\nimport styles from \"../card.css\";\n\
                      import { x } from './util.js';\nimport 'https://cdn.example.com/a.css';\n";
        assert_eq!(scanner.targets(source), vec!["./styles/app.css", "../card.css"]);
    }
}
