//! Failure handling and exit codes.

use predicates::prelude::*;
use stylefold_cli::test_utils::StyleTree;

use crate::common::{REPORT, ordered_tree, read_json, run_ok, stylefold};

#[test]
fn test_plan_without_report_fails() {
    let tree = StyleTree::new().unwrap();

    stylefold(&tree)
        .arg("plan")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No duplicate report found"))
        .stderr(predicate::str::contains("stylefold report"));
}

#[test]
fn test_apply_without_plan_fails() {
    let tree = StyleTree::new().unwrap();

    stylefold(&tree)
        .arg("apply")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No consolidation plan found"))
        .stderr(predicate::str::contains("stylefold plan"));
}

#[test]
fn test_invalid_configuration_fails() {
    let tree = StyleTree::new().unwrap();
    tree.write("stylefold.toml", "styles_dir = [\n").unwrap();

    stylefold(&tree)
        .arg("report")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid configuration file"));
}

#[test]
fn test_unknown_configuration_key_fails() {
    let tree = StyleTree::new().unwrap();
    tree.write("stylefold.toml", "style_dir = \"css\"\n").unwrap();

    stylefold(&tree).arg("report").assert().code(1);
}

#[test]
fn test_invalid_canonical_map_fails() {
    let tree = ordered_tree(".a { top: 0; }\n", ".a { top: 0; }\n");
    tree.write("canonical.json", "{ not json").unwrap();
    run_ok(&tree, &["report"]);

    stylefold(&tree)
        .args(["plan", "--canonical-map", "canonical.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid canonical override map"));
}

/// An unparsable stylesheet is skipped; the rest of the tree is still reported.
#[test]
fn test_unparsable_file_is_skipped() {
    let tree = ordered_tree(".a { top: 0; }\n", ".a { top: 0; }\n");
    tree.write("src/styles/broken.css", ".a { top: 0;\n").unwrap();

    stylefold(&tree)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Files skipped:\s+1").unwrap());

    let report = read_json(&tree, REPORT);
    assert_eq!(report["filesScanned"], 3);
    assert_eq!(report["crossFileGroups"], 1);
    assert_eq!(tree.read("src/styles/broken.css").unwrap(), ".a { top: 0;\n");
}

#[test]
fn test_empty_tree_succeeds() {
    let tree = StyleTree::new().unwrap();

    run_ok(&tree, &["report"]);
    run_ok(&tree, &["plan"]);
    stylefold(&tree)
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to apply"));
    run_ok(&tree, &["dedupe"]);
    run_ok(&tree, &["prune"]);
}
