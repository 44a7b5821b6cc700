//! `stylefold prune` behaviour.

use stylefold_cli::test_utils::StyleTree;

use crate::common::run_ok;

#[test]
fn test_contextual_copy_of_later_global_rule_is_pruned() {
    let tree = StyleTree::new().unwrap();
    tree.write(
        "src/styles/tag.css",
        "@media (min-width: 768px) {\n  .tag { color: blue; }\n}\n.tag { color: blue; }\n",
    )
    .unwrap();

    run_ok(&tree, &["prune"]);
    assert_eq!(tree.read("src/styles/tag.css").unwrap(), ".tag { color: blue; }\n");

    let backups = tree.backup_files();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].contains("/prune-"));
    let archived = tree.read(&backups[0]).unwrap();
    assert!(archived.contains("/* context: @media (min-width: 768px) */"));
    assert!(archived.contains(".tag { color: blue; }"));
}

/// The global rule must come later and match exactly, importance included.
#[test]
fn test_non_redundant_context_rules_stay() {
    let earlier_global = ".tag { color: blue; }\n@media print {\n  .tag { color: blue; }\n}\n";
    let different = "@media print {\n  .tag { color: red; }\n}\n.tag { color: blue; }\n";
    let important = "@media print {\n  .tag { color: blue !important; }\n}\n.tag { color: blue; }\n";

    let tree = StyleTree::new().unwrap();
    tree.write("src/styles/a.css", earlier_global).unwrap();
    tree.write("src/styles/b.css", different).unwrap();
    tree.write("src/styles/c.css", important).unwrap();

    run_ok(&tree, &["prune"]);
    assert_eq!(tree.read("src/styles/a.css").unwrap(), earlier_global);
    assert_eq!(tree.read("src/styles/b.css").unwrap(), different);
    assert_eq!(tree.read("src/styles/c.css").unwrap(), important);
    assert!(tree.backup_files().is_empty());
}
