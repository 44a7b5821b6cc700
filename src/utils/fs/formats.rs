//! Reading and writing text and JSON files.
//!
//! All writes go through [`super::atomic::safe_write`]. Reading a pipeline
//! artifact with [`read_json_artifact`] maps a missing file to
//! [`StylefoldError::MissingArtifact`] so the CLI can tell the user which phase
//! to run first.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::atomic::safe_write;
use crate::core::StylefoldError;

/// Reads a text file with context on failure.
///
/// # Errors
///
/// Returns [`StylefoldError::IoError`] if the file cannot be read or is not UTF-8.
pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(StylefoldError::from)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Writes data as pretty-printed JSON, atomically, with a trailing newline.
///
/// # Errors
///
/// Returns [`StylefoldError::JsonError`] if serialization fails, or an error
/// from [`safe_write`] if the file cannot be written.
pub fn write_json_file<T>(path: &Path, data: &T) -> Result<()>
where
    T: serde::Serialize,
{
    let mut json = serde_json::to_string_pretty(data).map_err(StylefoldError::from)?;
    json.push('\n');
    safe_write(path, &json).with_context(|| format!("Failed to write JSON file: {}", path.display()))
}

/// Reads a JSON artifact produced by an earlier phase.
///
/// `kind` names the artifact in error messages ("duplicate report").
///
/// # Errors
///
/// - [`StylefoldError::MissingArtifact`] when the file does not exist
/// - [`StylefoldError::InvalidArtifact`] when it does not deserialize
pub fn read_json_artifact<T>(path: &Path, kind: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    if !path.is_file() {
        return Err(StylefoldError::MissingArtifact {
            kind: kind.to_string(),
            path: path.display().to_string(),
        }
        .into());
    }
    let content = read_text_file(path)?;
    serde_json::from_str(&content).map_err(|err| {
        StylefoldError::InvalidArtifact {
            kind: kind.to_string(),
            path: path.display().to_string(),
            reason: err.to_string(),
        }
        .into()
    })
}
