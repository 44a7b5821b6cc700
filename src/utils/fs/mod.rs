//! File system utilities for stylesheet trees and JSON artifacts
//!
//! Every write stylefold performs goes through this module: stylesheet
//! rewrites, JSON artifacts and backup archives. Writes are atomic, so a file
//! either keeps its old content or holds the complete new content.
//!
//! # Key Features
//!
//! - **Atomic operations**: write-then-rename for every file stylefold touches
//! - **Stable paths**: project-relative paths always use forward slashes
//! - **Deterministic discovery**: file walks are sorted by path
//! - **Typed artifacts**: a missing report or plan surfaces as
//!   [`crate::core::StylefoldError::MissingArtifact`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use stylefold_cli::utils::fs::{ensure_dir, safe_write, relative_posix};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("reports"))?;
//! safe_write(Path::new("reports/notes.txt"), "hello")?;
//!
//! let rel = relative_posix(Path::new("/project"), Path::new("/project/src/styles/main.css"));
//! assert_eq!(rel, "src/styles/main.css");
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;
pub mod discovery;
pub mod formats;
pub mod paths;

// Directory operations
pub use dirs::{ensure_dir, ensure_parent_dir};

// Atomic write operations
pub use atomic::{atomic_write, safe_write};

// Path utilities
pub use paths::{normalize_path, relative_posix, resolve_within, to_posix};

// File discovery
pub use discovery::{ExcludeSet, find_files_with_extensions};

// Structured files
pub use formats::{read_json_artifact, read_text_file, write_json_file};
