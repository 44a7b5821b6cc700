//! Integration test suite for stylefold
//!
//! End-to-end tests that drive the `stylefold` binary against scratch project
//! trees built with [`stylefold_cli::test_utils::StyleTree`].
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **consolidate**: report, plan and apply workflows and idempotence
//! - **dedupe**: intra-file deduplication flags
//! - **error_scenarios**: missing artifacts, bad configuration, broken files
//! - **prune**: redundant-context pruning

#[path = "../common/mod.rs"]
mod common;

mod consolidate;
mod dedupe;
mod error_scenarios;
mod prune;
