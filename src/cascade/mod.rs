//! Cascade order resolution.
//!
//! Which of two identical selectors wins depends first on which file the
//! browser loads later. This module reconstructs that order:
//!
//! 1. [`build_graph`] reads the configured entry stylesheets and every script
//!    under the configured script directories, then follows local `@import`
//!    statements transitively, recording each file and import as a node and
//!    edge of a [`StyleGraph`].
//! 2. [`StyleGraph::cascade_order`] walks that graph once and hands out ranks,
//!    producing an immutable [`CascadeOrder`].
//!
//! Imports of external URLs, of non-`.css` files, of files that do not exist,
//! and of paths escaping the project root are ignored. A stylesheet that fails
//! to parse is still ranked; its imports are not followed.

pub mod graph;
pub mod imports;

pub use graph::{CascadeOrder, FileKind, StyleGraph, StyleNode};
pub use imports::{ScriptImportScanner, css_import_targets, import_specifier};

use anyhow::Result;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Project;
use crate::css::parse;
use crate::utils::fs::{relative_posix, resolve_within};

/// Build the load graph of a project.
///
/// Seeds are registered in this order: existing entry points as configured,
/// then every script (sorted by path) that imports at least one stylesheet.
///
/// # Errors
///
/// Returns an error only if the script import pattern fails to compile.
/// Unreadable or unparsable files are logged and skipped.
pub fn build_graph(project: &Project) -> Result<StyleGraph> {
    let root = project.root.as_path();
    let scanner = ScriptImportScanner::new()?;
    let mut graph = StyleGraph::new();
    let mut pending: VecDeque<PathBuf> = VecDeque::new();

    for entry in project.entry_points() {
        if entry.is_file() {
            graph.add_seed(StyleNode::stylesheet(relative_posix(root, &entry)));
            pending.push_back(entry);
        } else {
            debug!("Entry point {} not found; skipping", entry.display());
        }
    }

    for script in project.scripts() {
        let source = match std::fs::read_to_string(&script) {
            Ok(source) => source,
            Err(err) => {
                warn!("Skipping unreadable script {}: {}", script.display(), err);
                continue;
            }
        };
        let targets = resolve_targets(root, &script, scanner.targets(&source));
        if targets.is_empty() {
            continue;
        }
        let from = StyleNode::script(relative_posix(root, &script));
        graph.add_seed(from.clone());
        for (position, target) in targets.into_iter().enumerate() {
            graph.add_import(
                from.clone(),
                StyleNode::stylesheet(relative_posix(root, &target)),
                position,
            );
            pending.push_back(target);
        }
    }

    let mut expanded: HashSet<PathBuf> = HashSet::new();
    while let Some(sheet) = pending.pop_front() {
        if !expanded.insert(sheet.clone()) {
            continue;
        }
        let text = match std::fs::read_to_string(&sheet) {
            Ok(text) => text,
            Err(err) => {
                warn!("Skipping unreadable stylesheet {}: {}", sheet.display(), err);
                continue;
            }
        };
        let parsed = match parse(&text) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(
                    "Not following imports of {}: parse error at {}:{}: {}",
                    relative_posix(root, &sheet),
                    err.line,
                    err.column,
                    err.message
                );
                continue;
            }
        };
        let from = StyleNode::stylesheet(relative_posix(root, &sheet));
        let targets = resolve_targets(root, &sheet, css_import_targets(&parsed));
        for (position, target) in targets.into_iter().enumerate() {
            graph.add_import(
                from.clone(),
                StyleNode::stylesheet(relative_posix(root, &target)),
                position,
            );
            pending.push_back(target);
        }
    }

    Ok(graph)
}

/// Resolve specifiers relative to the importing file, keeping existing
/// stylesheets inside the project root.
fn resolve_targets(root: &Path, importer: &Path, specifiers: Vec<String>) -> Vec<PathBuf> {
    let base = importer.parent().unwrap_or(root);
    specifiers
        .into_iter()
        .filter_map(|specifier| {
            let resolved = resolve_within(root, base, &specifier);
            if resolved.is_none() {
                debug!("Ignoring import {} from {}: outside project root", specifier, importer.display());
            }
            resolved
        })
        .filter(|path| {
            let exists = path.is_file();
            if !exists {
                debug!("Ignoring import of missing file {}", path.display());
            }
            exists
        })
        .collect()
}

/// Build the load graph and rank every reachable stylesheet.
///
/// # Errors
///
/// See [`build_graph`].
pub fn resolve_cascade_order(project: &Project) -> Result<CascadeOrder> {
    let graph = build_graph(project)?;
    let order = graph.cascade_order();
    info!(
        "Cascade order: {} ranked stylesheets ({} files, {} imports in load graph)",
        order.len(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(order)
}
