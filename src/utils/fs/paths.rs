//! Path utilities for normalization and project-relative naming.
//!
//! Stylefold identifies files by their path relative to the project root with
//! forward slashes (`src/styles/main.css`) in every artifact, log line and
//! backup, independent of the host platform.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path by resolving `.` and `..` components.
///
/// Logical resolution only: the file system is not touched and symbolic links
/// are not followed.
///
/// # Examples
///
/// ```rust,no_run
/// use stylefold_cli::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// let path = Path::new("/project/src/styles/../styles/./main.css");
/// assert_eq!(normalize_path(path), PathBuf::from("/project/src/styles/main.css"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {} // Skip .
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Render a path with forward slashes.
#[must_use]
pub fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of `path` relative to `root`, with forward slashes.
///
/// Paths outside `root` are returned whole (still with forward slashes).
#[must_use]
pub fn relative_posix(root: &Path, path: &Path) -> String {
    let root = normalize_path(root);
    let path = normalize_path(path);
    match path.strip_prefix(&root) {
        Ok(rel) => to_posix(rel),
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}

/// Resolve `target` against `base_dir`, rejecting results outside `root`.
///
/// A leading `/` makes `target` relative to `root` itself. Returns `None` when
/// the normalized result escapes the project root.
///
/// # Examples
///
/// ```rust,no_run
/// use stylefold_cli::utils::fs::resolve_within;
/// use std::path::{Path, PathBuf};
///
/// let root = Path::new("/project");
/// let base = Path::new("/project/src/styles");
/// assert_eq!(
///     resolve_within(root, base, "./components/button.css"),
///     Some(PathBuf::from("/project/src/styles/components/button.css"))
/// );
/// assert_eq!(resolve_within(root, base, "../../../etc/passwd.css"), None);
/// ```
#[must_use]
pub fn resolve_within(root: &Path, base_dir: &Path, target: &str) -> Option<PathBuf> {
    let root = normalize_path(root);
    let joined = match target.strip_prefix('/') {
        Some(rooted) => root.join(rooted),
        None => base_dir.join(target),
    };
    let resolved = normalize_path(&joined);
    resolved.starts_with(&root).then_some(resolved)
}
