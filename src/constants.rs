//! Global constants used throughout stylefold.
//!
//! Default locations and artifact names live here so the configuration layer,
//! the phases and the tests agree on them.

/// Separator used when joining an at-rule context chain into a grouping key.
///
/// `["@supports (display: grid)", "@media (min-width: 768px)"]` becomes
/// `"@supports (display: grid) > @media (min-width: 768px)"`.
pub const CONTEXT_SEPARATOR: &str = " > ";

/// Name of the project configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "stylefold.toml";

/// File name of the cross-file duplicate report inside the reports directory.
pub const REPORT_FILE_NAME: &str = "css-cross-file-duplicates.json";

/// File name of the consolidation plan inside the reports directory.
pub const PLAN_FILE_NAME: &str = "css-cross-file-consolidation-plan.json";

/// Default root of the stylesheet tree.
pub const DEFAULT_STYLES_DIR: &str = "src/styles";

/// Default main stylesheet entry point.
pub const DEFAULT_ENTRY_POINT: &str = "src/styles/main.css";

/// Default directory scanned for script-level stylesheet imports.
pub const DEFAULT_SCRIPT_DIR: &str = "src";

/// Default extensions of script files scanned for stylesheet imports.
pub const DEFAULT_SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts", "jsx", "tsx"];

/// Default exclusion globs, matched against project-relative paths.
pub const DEFAULT_EXCLUDES: &[&str] = &["**/node_modules/**", "**/dist/**", "**/backups/**"];

/// Default directory for the JSON artifacts.
pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Default root of the backup archives.
pub const DEFAULT_BACKUP_DIR: &str = "backups/css-consolidation";

/// Path prefix preferred for canonical files when no cascade rank exists.
pub const DEFAULT_COMPONENT_HINT: &str = "src/styles/components/";

/// Timestamp format used in backup archive directory names.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
