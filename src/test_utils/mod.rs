//! Test utilities for stylefold
//!
//! Helpers shared by unit tests and the CLI integration suite:
//! - [`init_test_logging`] - one-time tracing setup honouring `RUST_LOG`
//! - [`StyleTree`] - a scratch project directory with stylesheet helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use stylefold_cli::test_utils::StyleTree;
//!
//! let tree = StyleTree::new().unwrap();
//! tree.write("src/styles/main.css", "@import \"./base.css\";\n").unwrap();
//! tree.write("src/styles/base.css", ".a { color: red; }\n").unwrap();
//! assert!(tree.exists("src/styles/base.css"));
//! ```

mod tree;

pub use tree::StyleTree;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, else `RUST_LOG` when set, else installs nothing.
/// Safe to call from every test.
///
/// ```bash
/// RUST_LOG=stylefold_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
