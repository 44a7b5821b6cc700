//! `stylefold dedupe` behaviour.

use predicates::prelude::*;
use stylefold_cli::test_utils::StyleTree;

use crate::common::{run_ok, stylefold};

const DUPLICATED: &str = ".tag { color: blue; }\n.x { top: 0; }\n.tag { color: blue; }\n";

/// The earlier exact duplicate goes, the later one stays.
#[test]
fn test_dedupe_keeps_last_occurrence() {
    let tree = StyleTree::new().unwrap();
    tree.write("src/styles/tags.css", DUPLICATED).unwrap();

    stylefold(&tree)
        .arg("dedupe")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Duplicates removed:\s+1").unwrap());

    assert_eq!(tree.read("src/styles/tags.css").unwrap(), ".x { top: 0; }\n.tag { color: blue; }\n");
    let backups = tree.backup_files();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].contains("/dedupe-"));
    assert!(tree.read(&backups[0]).unwrap().contains(".tag { color: blue; }"));

    // Second run has nothing left to do
    run_ok(&tree, &["dedupe"]);
    assert_eq!(tree.read("src/styles/tags.css").unwrap(), ".x { top: 0; }\n.tag { color: blue; }\n");
    assert_eq!(tree.backup_files().len(), 1);
}

#[test]
fn test_dry_run_reports_without_writing() {
    let tree = StyleTree::new().unwrap();
    tree.write("src/styles/tags.css", DUPLICATED).unwrap();

    stylefold(&tree)
        .args(["dedupe", "--dry"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::is_match(r"Files to change:\s+1").unwrap());

    assert_eq!(tree.read("src/styles/tags.css").unwrap(), DUPLICATED);
    assert!(tree.backup_files().is_empty());
}

/// Only the named file is processed.
#[test]
fn test_single_file_target() {
    let tree = StyleTree::new().unwrap();
    tree.write("src/styles/one.css", DUPLICATED).unwrap();
    tree.write("src/styles/two.css", DUPLICATED).unwrap();

    run_ok(&tree, &["dedupe", "--file", "src/styles/one.css"]);
    assert_ne!(tree.read("src/styles/one.css").unwrap(), DUPLICATED);
    assert_eq!(tree.read("src/styles/two.css").unwrap(), DUPLICATED);
}

#[test]
fn test_missing_file_target_is_skipped() {
    let tree = StyleTree::new().unwrap();

    stylefold(&tree)
        .args(["dedupe", "--file", "src/styles/nope.css"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Files processed:\s+0").unwrap());
}

/// Conflicting same-selector rules only fold together with --merge.
#[test]
fn test_merge_flag() {
    let css = ".a { color: red; }\n.a { margin: 0; }\n";
    let tree = StyleTree::new().unwrap();
    tree.write("src/styles/a.css", css).unwrap();

    run_ok(&tree, &["dedupe"]);
    assert_eq!(tree.read("src/styles/a.css").unwrap(), css);

    run_ok(&tree, &["dedupe", "--all", "--merge"]);
    assert_eq!(tree.read("src/styles/a.css").unwrap(), ".a { color: red; margin: 0; }\n");
}

#[test]
fn test_selector_lists_are_split() {
    let tree = StyleTree::new().unwrap();
    tree.write("src/styles/a.css", ".a, .b { top: 0; }\n").unwrap();

    run_ok(&tree, &["dedupe"]);
    assert_eq!(tree.read("src/styles/a.css").unwrap(), ".a { top: 0; }\n.b { top: 0; }\n");
}
