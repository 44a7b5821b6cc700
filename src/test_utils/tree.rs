//! Scratch project trees for tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::constants::{DEFAULT_BACKUP_DIR, DEFAULT_STYLES_DIR};
use crate::utils::fs::relative_posix;

/// A temporary project directory laid out with the default configuration.
pub struct StyleTree {
    temp_dir: TempDir,
}

impl StyleTree {
    /// Create an empty project with `src/styles/` in place.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join(DEFAULT_STYLES_DIR))?;
        Ok(Self {
            temp_dir,
        })
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a project-relative file.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {rel}"))?;
        Ok(path)
    }

    /// Read a project-relative file.
    pub fn read(&self, rel: &str) -> Result<String> {
        fs::read_to_string(self.path(rel)).with_context(|| format!("Failed to read {rel}"))
    }

    /// Whether a project-relative file exists.
    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Every file below the default backup root, project-relative and sorted.
    pub fn backup_files(&self) -> Vec<String> {
        let root = self.path(DEFAULT_BACKUP_DIR);
        let mut files: Vec<String> = WalkDir::new(&root)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| relative_posix(self.root(), entry.path()))
            .collect();
        files.sort();
        files
    }
}
