//! Shared helpers
//!
//! - [`fs`] - atomic writes, project-relative paths, sorted file discovery and
//!   JSON artifact I/O
//!
//! # Example
//!
//! ```rust,no_run
//! use stylefold_cli::utils::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("reports"))?;
//! atomic_write(Path::new("reports/out.json"), b"{}")?;
//! # Ok(())
//! # }
//! ```

pub mod fs;

pub use fs::{atomic_write, ensure_dir, normalize_path, relative_posix, safe_write};
