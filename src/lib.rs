//! stylefold - cascade-aware CSS duplicate consolidation
//!
//! stylefold finds style rules repeated across a multi-file stylesheet tree and
//! consolidates each group into a single canonical file, choosing that file so
//! that the computed style of every element is unchanged.
//!
//! # Architecture Overview
//!
//! The work is split into phases that communicate through reviewable JSON
//! artifacts:
//!
//! 1. **Report** - every stylesheet is parsed into flat rule records keyed by
//!    `(selector, context)`; groups present in two or more files are written to
//!    `reports/css-cross-file-duplicates.json`.
//! 2. **Plan** - the cascade order is derived from `@import` chains and script
//!    imports, then for each group a canonical file is chosen (override map,
//!    then latest in cascade, then a path heuristic) and the declarations are
//!    merged last-wins. Written to `reports/css-cross-file-consolidation-plan.json`.
//! 3. **Apply** - non-canonical copies are removed, the canonical rule is
//!    inserted or rewritten, emptied blocks are pruned. All removed text is
//!    archived first.
//!
//! Two single-file passes complete the toolbox: [`dedupe`] (selector list
//! splitting, exact duplicate removal, optional merge) and [`prune`] (context
//! rules that repeat a later global rule).
//!
//! ## Key Properties
//!
//! - **Lossless**: edits address byte spans of the parsed source, so untouched
//!   text (comments, formatting, unknown syntax) is preserved exactly
//! - **Safe by default**: only identical groups are applied unless `--all`
//! - **Backed up**: nothing is removed from a file before it is archived
//! - **Idempotent**: re-running any mutating phase on its own output is a no-op
//!
//! # Core Modules
//!
//! - [`css`] - parser, rule extraction, signatures and text edits
//! - [`cascade`] - import graph and cascade order
//! - [`duplicates`] - cross-file duplicate detection and the report artifact
//! - [`plan`] - consolidation planning and the plan artifact
//! - [`apply`] - plan execution and backup archives
//! - [`dedupe`] - intra-file deduplication
//! - [`prune`] - redundant-context pruning
//!
//! ## Supporting Modules
//!
//! - [`cli`] - command-line interface
//! - [`config`] - `stylefold.toml` and resolved project paths
//! - [`core`] - error types and user-facing error rendering
//! - [`utils`] - file discovery, atomic writes and path helpers
//!
//! # Configuration (stylefold.toml)
//!
//! ```toml
//! styles_dir = "src/styles"
//! entry_points = ["src/styles/main.css"]
//! script_dirs = ["src"]
//! exclude = ["**/node_modules/**", "**/dist/**", "**/backups/**"]
//! reports_dir = "reports"
//! backup_dir = "backups/css-consolidation"
//! component_hint = "src/styles/components/"
//! ```
//!
//! Every key is optional.

pub mod apply;
pub mod cascade;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod css;
pub mod dedupe;
pub mod duplicates;
pub mod plan;
pub mod prune;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
