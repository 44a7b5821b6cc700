//! Project configuration and resolved project paths.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_BACKUP_DIR, DEFAULT_COMPONENT_HINT, DEFAULT_ENTRY_POINT,
    DEFAULT_EXCLUDES, DEFAULT_REPORTS_DIR, DEFAULT_SCRIPT_DIR, DEFAULT_SCRIPT_EXTENSIONS,
    DEFAULT_STYLES_DIR, PLAN_FILE_NAME, REPORT_FILE_NAME,
};
use crate::core::StylefoldError;
use crate::utils::fs::{ExcludeSet, find_files_with_extensions, normalize_path};

/// Contents of `stylefold.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Root of the scanned stylesheet tree
    pub styles_dir: String,
    /// Entry stylesheets that seed cascade order
    pub entry_points: Vec<String>,
    /// Directories scanned for script-level stylesheet imports
    pub script_dirs: Vec<String>,
    /// Script file extensions to scan
    pub script_extensions: Vec<String>,
    /// Glob patterns excluded from every walk
    pub exclude: Vec<String>,
    /// Location of the report and plan artifacts
    pub reports_dir: String,
    /// Root of the backup archives
    pub backup_dir: String,
    /// Path fragment preferred by the canonical-file heuristic
    pub component_hint: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            styles_dir: DEFAULT_STYLES_DIR.to_string(),
            entry_points: vec![DEFAULT_ENTRY_POINT.to_string()],
            script_dirs: vec![DEFAULT_SCRIPT_DIR.to_string()],
            script_extensions: DEFAULT_SCRIPT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()).collect(),
            reports_dir: DEFAULT_REPORTS_DIR.to_string(),
            backup_dir: DEFAULT_BACKUP_DIR.to_string(),
            component_hint: DEFAULT_COMPONENT_HINT.to_string(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// [`StylefoldError::ConfigParseError`] if it is not valid configuration.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        toml::from_str(&content).map_err(|err| {
            StylefoldError::ConfigParseError {
                file: path.display().to_string(),
                reason: err.message().to_string(),
            }
            .into()
        })
    }

    /// Load `explicit` when given, else `<root>/stylefold.toml` when present,
    /// else defaults.
    ///
    /// An explicitly named file must exist.
    ///
    /// # Errors
    ///
    /// See [`ProjectConfig::load_from`].
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            debug!("Loading configuration from {}", path.display());
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// A project root with its configuration resolved to absolute paths.
#[derive(Debug, Clone)]
pub struct Project {
    /// Absolute, normalized project root
    pub root: PathBuf,
    /// Loaded configuration
    pub config: ProjectConfig,
    exclude: ExcludeSet,
}

impl Project {
    /// Bind a configuration to a project root.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined (for a
    /// relative root) or an exclude pattern does not compile.
    pub fn new(root: &Path, config: ProjectConfig) -> Result<Self> {
        let root = if root.is_absolute() {
            normalize_path(root)
        } else {
            normalize_path(&std::env::current_dir()?.join(root))
        };
        let exclude = ExcludeSet::from_globs(&config.exclude).map_err(|err| {
            StylefoldError::ConfigParseError {
                file: CONFIG_FILE_NAME.to_string(),
                reason: format!("{err:#}"),
            }
        })?;
        Ok(Self {
            root,
            config,
            exclude,
        })
    }

    /// Load the configuration for `root` and bind it.
    ///
    /// # Errors
    ///
    /// See [`ProjectConfig::load`] and [`Project::new`].
    pub fn open(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = ProjectConfig::load(root, config_path)?;
        Self::new(root, config)
    }

    /// Absolute path of a project-relative path.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        normalize_path(&self.root.join(rel))
    }

    /// Absolute stylesheet tree root.
    pub fn styles_dir(&self) -> PathBuf {
        self.resolve(&self.config.styles_dir)
    }

    /// Absolute entry point paths, in configured order.
    pub fn entry_points(&self) -> Vec<PathBuf> {
        self.config.entry_points.iter().map(|entry| self.resolve(entry)).collect()
    }

    /// Compiled exclusion globs.
    pub fn exclude(&self) -> &ExcludeSet {
        &self.exclude
    }

    /// Every stylesheet of the styles tree, sorted.
    pub fn stylesheets(&self) -> Vec<PathBuf> {
        find_files_with_extensions(&self.root, &self.styles_dir(), &["css"], &self.exclude)
    }

    /// Every script file of the configured script directories, sorted.
    pub fn scripts(&self) -> Vec<PathBuf> {
        let mut scripts: Vec<PathBuf> = self
            .config
            .script_dirs
            .iter()
            .flat_map(|dir| {
                find_files_with_extensions(
                    &self.root,
                    &self.resolve(dir),
                    &self.config.script_extensions,
                    &self.exclude,
                )
            })
            .collect();
        scripts.sort();
        scripts.dedup();
        scripts
    }

    /// Default location of the duplicate report.
    pub fn report_path(&self) -> PathBuf {
        self.resolve(&self.config.reports_dir).join(REPORT_FILE_NAME)
    }

    /// Default location of the consolidation plan.
    pub fn plan_path(&self) -> PathBuf {
        self.resolve(&self.config.reports_dir).join(PLAN_FILE_NAME)
    }

    /// Root of the backup archives.
    pub fn backup_dir(&self) -> PathBuf {
        self.resolve(&self.config.backup_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let temp = tempdir().unwrap();
        let config = ProjectConfig::load(temp.path(), None).unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.entry_points, vec!["src/styles/main.css"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = tempdir().unwrap();
        std::fs::write(
            temp.path().join("stylefold.toml"),
            "styles_dir = \"app/css\"\nentry_points = [\"app/css/index.css\"]\n",
        )
        .unwrap();
        let config = ProjectConfig::load(temp.path(), None).unwrap();
        assert_eq!(config.styles_dir, "app/css");
        assert_eq!(config.entry_points, vec!["app/css/index.css"]);
        assert_eq!(config.reports_dir, "reports");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("stylefold.toml"), "styles_dir = [").unwrap();
        let err = ProjectConfig::load(temp.path(), None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StylefoldError>(),
            Some(StylefoldError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("stylefold.toml"), "style_dir = \"x\"").unwrap();
        assert!(ProjectConfig::load(temp.path(), None).is_err());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let temp = tempdir().unwrap();
        assert!(ProjectConfig::load(temp.path(), Some(&temp.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_project_paths() {
        let temp = tempdir().unwrap();
        let project = Project::new(temp.path(), ProjectConfig::default()).unwrap();
        assert!(project.report_path().ends_with("reports/css-cross-file-duplicates.json"));
        assert!(project.plan_path().ends_with("reports/css-cross-file-consolidation-plan.json"));
        assert!(project.styles_dir().ends_with("src/styles"));
        assert_eq!(project.entry_points().len(), 1);
    }

    #[test]
    fn test_stylesheets_respect_excludes() {
        let temp = tempdir().unwrap();
        let styles = temp.path().join("src/styles");
        std::fs::create_dir_all(styles.join("backups")).unwrap();
        std::fs::write(styles.join("main.css"), "").unwrap();
        std::fs::write(styles.join("backups/old.css"), "").unwrap();
        let project = Project::new(temp.path(), ProjectConfig::default()).unwrap();
        let sheets = project.stylesheets();
        assert_eq!(sheets.len(), 1);
        assert!(sheets[0].ends_with("main.css"));
    }
}
