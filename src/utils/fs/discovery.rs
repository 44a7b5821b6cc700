//! File discovery below the project root.
//!
//! Walks are sorted by file name so every phase sees files in the same order
//! on every platform. Exclusions are glob patterns matched against
//! project-relative, forward-slash paths.

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::paths::relative_posix;

/// Compiled exclusion globs.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<Pattern>,
}

impl ExcludeSet {
    /// Compile a list of glob patterns.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first pattern that does not compile.
    pub fn from_globs<S: AsRef<str>>(globs: &[S]) -> Result<Self> {
        let patterns = globs
            .iter()
            .map(|glob| {
                Pattern::new(glob.as_ref())
                    .with_context(|| format!("Invalid exclude pattern: {}", glob.as_ref()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            patterns,
        })
    }

    /// Whether a project-relative path matches any pattern.
    pub fn is_excluded(&self, rel: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.patterns.iter().any(|pattern| pattern.matches_with(rel, options))
    }
}

/// Recursively find files under `dir` whose extension is one of `extensions`.
///
/// Returned paths are absolute when `dir` is, sorted, and never match
/// `exclude` (tested on the path relative to `root`). A missing `dir` yields an
/// empty list. Unreadable entries are skipped.
///
/// # Examples
///
/// ```rust,no_run
/// use stylefold_cli::utils::fs::{ExcludeSet, find_files_with_extensions};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let root = Path::new("/project");
/// let exclude = ExcludeSet::from_globs(&["**/node_modules/**"])?;
/// let sheets = find_files_with_extensions(root, &root.join("src/styles"), &["css"], &exclude);
/// # Ok(())
/// # }
/// ```
pub fn find_files_with_extensions<S: AsRef<str>>(
    root: &Path,
    dir: &Path,
    extensions: &[S],
    exclude: &ExcludeSet,
) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|wanted| wanted.as_ref() == ext))
        })
        .filter(|path| !exclude.is_excluded(&relative_posix(root, path)))
        .collect()
}
