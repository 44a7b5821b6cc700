//! Error handling for stylefold
//!
//! This module provides the error types and user-friendly error reporting for
//! stylefold. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`StylefoldError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Fatal vs. recoverable errors
//!
//! Only two classes of failure end a run with a non-zero exit status:
//! - a missing upstream artifact ([`StylefoldError::MissingArtifact`]), e.g.
//!   running `plan` before `report`
//! - a configuration or canonical override map that fails to parse
//!   ([`StylefoldError::ConfigParseError`], [`StylefoldError::OverrideMapError`])
//!
//! Everything that goes wrong with a single stylesheet ([`StylefoldError::ParseError`],
//! write or backup failures) is logged, counted in the run summary, and the
//! run moves on to the next file.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stylefold_cli::core::{StylefoldError, user_friendly_error};
//!
//! let error = StylefoldError::MissingArtifact {
//!     kind: "duplicate report".to_string(),
//!     path: "reports/css-cross-file-duplicates.json".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display(); // Shows coloured error with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for stylefold operations
#[derive(Error, Debug)]
pub enum StylefoldError {
    /// A stylesheet could not be parsed.
    ///
    /// Recoverable: the file is skipped and the rest of the tree is processed.
    #[error("Failed to parse {file} at line {line}, column {column}: {reason}")]
    ParseError {
        /// Project-relative path of the stylesheet
        file: String,
        /// 1-based line of the problem
        line: usize,
        /// 1-based column of the problem
        column: usize,
        /// Parser message
        reason: String,
    },

    /// A phase was run without the artifact produced by the phase before it.
    #[error("No {kind} found at {path}")]
    MissingArtifact {
        /// Artifact description ("duplicate report", "consolidation plan")
        kind: String,
        /// Expected location
        path: String,
    },

    /// An artifact exists but is not valid JSON of the expected shape.
    #[error("Invalid {kind} at {path}: {reason}")]
    InvalidArtifact {
        /// Artifact description
        kind: String,
        /// Location of the artifact
        path: String,
        /// Deserializer message
        reason: String,
    },

    /// The project configuration file failed to parse.
    #[error("Invalid configuration file {file}")]
    ConfigParseError {
        /// Path of the configuration file
        file: String,
        /// TOML parser message
        reason: String,
    },

    /// The canonical override map is missing or invalid.
    #[error("Invalid canonical override map {file}: {reason}")]
    OverrideMapError {
        /// Path of the override map
        file: String,
        /// What went wrong
        reason: String,
    },

    /// Writing the backup archive for a file failed.
    #[error("Failed to back up removed rules of {file}: {reason}")]
    BackupFailed {
        /// Project-relative path of the file being edited
        file: String,
        /// Underlying error
        reason: String,
    },

    /// Rewritten stylesheet text no longer parses.
    #[error("Refusing to write {file}: rewritten stylesheet does not parse ({reason})")]
    SyntaxBroken {
        /// Project-relative path of the file
        file: String,
        /// Parser message
        reason: String,
    },

    /// A file system operation failed.
    #[error("File system error: {operation}")]
    FileSystemError {
        /// The operation that failed
        operation: String,
        /// The path involved
        path: String,
    },

    /// IO error from the standard library
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl Clone for StylefoldError {
    fn clone(&self) -> Self {
        match self {
            Self::ParseError {
                file,
                line,
                column,
                reason,
            } => Self::ParseError {
                file: file.clone(),
                line: *line,
                column: *column,
                reason: reason.clone(),
            },
            Self::MissingArtifact {
                kind,
                path,
            } => Self::MissingArtifact {
                kind: kind.clone(),
                path: path.clone(),
            },
            Self::InvalidArtifact {
                kind,
                path,
                reason,
            } => Self::InvalidArtifact {
                kind: kind.clone(),
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::ConfigParseError {
                file,
                reason,
            } => Self::ConfigParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::OverrideMapError {
                file,
                reason,
            } => Self::OverrideMapError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::BackupFailed {
                file,
                reason,
            } => Self::BackupFailed {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::SyntaxBroken {
                file,
                reason,
            } => Self::SyntaxBroken {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::FileSystemError {
                operation,
                path,
            } => Self::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
            },
            // io::Error and serde_json::Error are not Clone; keep kind and message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Wraps a [`StylefoldError`] with an optional suggestion (shown in green) and
/// optional details (shown in yellow).
///
/// ```rust,no_run
/// use stylefold_cli::core::{StylefoldError, ErrorContext};
///
/// let context = ErrorContext::new(StylefoldError::Other { message: "boom".into() })
///     .with_suggestion("Run with --verbose for more information");
/// println!("{}", context);
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: StylefoldError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: StylefoldError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`StylefoldError`] anywhere in the error chain, then common
/// [`std::io::Error`] kinds, and falls back to the full error chain as a
/// generic message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let stylefold_error = error.chain().find_map(|cause| cause.downcast_ref::<StylefoldError>());
    if let Some(stylefold_error) = stylefold_error
        && !matches!(stylefold_error, StylefoldError::IoError(_) | StylefoldError::JsonError(_))
    {
        return create_error_context(stylefold_error.clone());
    }

    let io_kind = error.chain().find_map(|cause| match cause.downcast_ref::<StylefoldError>() {
        Some(StylefoldError::IoError(io_error)) => Some(io_error.kind()),
        _ => cause.downcast_ref::<std::io::Error>().map(std::io::Error::kind),
    });
    match io_kind {
        Some(std::io::ErrorKind::PermissionDenied) => {
            return ErrorContext::new(StylefoldError::FileSystemError {
                operation: error.to_string(),
                path: "unknown".to_string(),
            })
            .with_suggestion("Check file ownership and permissions of the stylesheet tree")
            .with_details("stylefold needs read and write access to every stylesheet it rewrites");
        }
        Some(std::io::ErrorKind::NotFound) => {
            return ErrorContext::new(StylefoldError::FileSystemError {
                operation: error.to_string(),
                path: "unknown".to_string(),
            })
            .with_suggestion("Check that the file or directory exists and the path is correct");
        }
        _ => {}
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(StylefoldError::Other {
        message,
    })
}

/// Map each [`StylefoldError`] variant to a tailored suggestion.
fn create_error_context(error: StylefoldError) -> ErrorContext {
    match &error {
        StylefoldError::MissingArtifact {
            kind,
            ..
        } => {
            let suggestion = if kind.contains("plan") {
                "Run 'stylefold plan' first to generate the consolidation plan"
            } else {
                "Run 'stylefold report' first to generate the duplicate report"
            };
            ErrorContext::new(error.clone())
                .with_suggestion(suggestion)
                .with_details("Each phase reads the artifact written by the phase before it")
        }
        StylefoldError::InvalidArtifact {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Regenerate the artifact with 'stylefold report' and 'stylefold plan'"),
        StylefoldError::ConfigParseError {
            file,
            reason,
        } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Check the TOML syntax in {file}. Every key is optional; delete unknown keys"
            ))
            .with_details(reason.clone()),
        StylefoldError::OverrideMapError {
            ..
        } => ErrorContext::new(error.clone()).with_suggestion(
            "The map must be JSON: {\"rules\": [{\"selector\": \".btn\", \"canonical\": \"src/styles/components/button.css\"}]}",
        ),
        StylefoldError::ParseError {
            ..
        }
        | StylefoldError::SyntaxBroken {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Fix the stylesheet syntax; the file is left untouched until it parses"),
        StylefoldError::BackupFailed {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Check that the backup directory is writable; no edits were written for this file"),
        _ => ErrorContext::new(error.clone()),
    }
}
