//! Configuration management for stylefold
//!
//! A project may carry a `stylefold.toml` at its root. Every key is optional;
//! an absent file means the defaults below. A file that exists but does not
//! parse is a fatal error ([`crate::core::StylefoldError::ConfigParseError`]).
//!
//! ```toml
//! styles_dir = "src/styles"
//! entry_points = ["src/styles/main.css"]
//! script_dirs = ["src"]
//! script_extensions = ["js", "mjs", "cjs", "ts", "jsx", "tsx"]
//! exclude = ["**/node_modules/**", "**/dist/**", "**/backups/**"]
//! reports_dir = "reports"
//! backup_dir = "backups/css-consolidation"
//! component_hint = "src/styles/components/"
//! ```
//!
//! All paths are relative to the project root. [`Project`] binds a loaded
//! [`ProjectConfig`] to that root and answers every "where is X" question the
//! phases ask.

mod project;

pub use project::{Project, ProjectConfig};
