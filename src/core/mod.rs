//! Core types for stylefold
//!
//! Currently this is the error system shared by every phase:
//! - [`StylefoldError`] - enumerated failure modes
//! - [`ErrorContext`] - user-facing wrapper with details and suggestions
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] for CLI display

pub mod error;

pub use error::{ErrorContext, StylefoldError, user_friendly_error};
