//! Atomic file writes.
//!
//! Files are written to a sibling temporary file, synced to disk, and renamed
//! over the target. Readers never observe a partially written stylesheet.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::dirs::ensure_dir;
use crate::core::StylefoldError;

/// Safely writes a string to a file using atomic operations.
///
/// Convenience wrapper around [`atomic_write`].
///
/// # Errors
///
/// Returns an error if any step of the write fails.
///
/// # Examples
///
/// ```rust,no_run
/// use stylefold_cli::utils::fs::safe_write;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// safe_write(Path::new("src/styles/main.css"), ".btn { color: red; }\n")?;
/// # Ok(())
/// # }
/// ```
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// 1. Write content to a temporary sibling file
/// 2. Sync the temporary file to disk
/// 3. Rename the temporary file over the target
///
/// Parent directories are created when missing. On failure the temporary file
/// is removed and the target keeps its previous content.
///
/// # Errors
///
/// Returns [`StylefoldError::IoError`] with context if the temporary file
/// cannot be created, written, synced or renamed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_dir(parent)?;
    }

    let temp_path = temp_sibling(path);

    let written = (|| -> Result<()> {
        let mut file =
            fs::File::create(&temp_path).map_err(StylefoldError::from).with_context(|| {
                format!(
                    "Failed to create temp file: {}\n\nCheck file permissions and that directory exists",
                    temp_path.display()
                )
            })?;

        file.write_all(content)
            .map_err(StylefoldError::from)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().map_err(StylefoldError::from).context("Failed to sync file to disk")?;

        fs::rename(&temp_path, path)
            .map_err(StylefoldError::from)
            .with_context(|| format!("Failed to rename temp file to: {}", path.display()))
    })();

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

/// `dir/.name.stylefold.tmp` next to the target.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!(".{name}.stylefold.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_parents() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("src/styles/main.css");
        safe_write(&target, ".a { color: red; }\n").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), ".a { color: red; }\n");
    }

    #[test]
    fn test_atomic_write_replaces_and_leaves_no_temp() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("a.css");
        fs::write(&target, "old").unwrap();
        atomic_write(&target, b"new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");

        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_failed_rename_is_io_error_and_cleans_up() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("taken");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("inner.css"), ".a {}").unwrap();

        let err = safe_write(&target, ".a { color: red; }\n").unwrap_err();
        assert!(matches!(err.downcast_ref::<StylefoldError>(), Some(StylefoldError::IoError(_))));
        assert!(target.is_dir());
        assert!(!temp.path().join(".taken.stylefold.tmp").exists());
    }
}
