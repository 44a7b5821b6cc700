//! Shared helpers for the CLI integration suite.

use assert_cmd::Command;
use serde_json::Value;
use stylefold_cli::test_utils::StyleTree;

pub const REPORT: &str = "reports/css-cross-file-duplicates.json";
pub const PLAN: &str = "reports/css-cross-file-consolidation-plan.json";

/// A `stylefold` invocation rooted at `tree` with colours and env logging off.
pub fn stylefold(tree: &StyleTree) -> Command {
    let mut cmd = Command::cargo_bin("stylefold").unwrap();
    cmd.current_dir(tree.root()).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

/// Run `args` and require success.
pub fn run_ok(tree: &StyleTree, args: &[&str]) {
    stylefold(tree).args(args).assert().success();
}

/// Parse a project-relative JSON artifact.
pub fn read_json(tree: &StyleTree, rel: &str) -> Value {
    serde_json::from_str(&tree.read(rel).unwrap()).unwrap()
}

/// A tree whose entry point imports `a.css` before `b.css`.
pub fn ordered_tree(a: &str, b: &str) -> StyleTree {
    let tree = StyleTree::new().unwrap();
    tree.write("src/styles/main.css", "@import \"./a.css\";\n@import url(\"./b.css\");\n").unwrap();
    tree.write("src/styles/a.css", a).unwrap();
    tree.write("src/styles/b.css", b).unwrap();
    tree
}
