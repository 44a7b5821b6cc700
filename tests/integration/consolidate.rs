//! report → plan → apply workflows.

use predicates::prelude::*;
use stylefold_cli::test_utils::StyleTree;

use crate::common::{PLAN, REPORT, ordered_tree, read_json, run_ok, stylefold};

/// Two files defining the same rule: the later file in cascade order keeps it.
#[test]
fn test_identical_group_consolidates_into_later_file() {
    let tree = ordered_tree(".btn { color: red; }\n.a-only { top: 0; }\n", ".btn { color: red; }\n");

    stylefold(&tree)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cross-file groups:"));

    let report = read_json(&tree, REPORT);
    assert_eq!(report["crossFileGroups"], 1);
    assert_eq!(report["identicalGroups"], 1);
    let item = &report["items"][0];
    assert_eq!(item["selector"], ".btn");
    assert_eq!(item["context"], "");
    assert_eq!(item["kind"], "identical");
    assert_eq!(item["uniqueSignatures"], 1);
    assert_eq!(item["files"][0], "src/styles/a.css");
    assert_eq!(item["files"][1], "src/styles/b.css");

    run_ok(&tree, &["plan"]);
    let plan = read_json(&tree, PLAN);
    let item = &plan["items"][0];
    assert_eq!(item["canonical"], "src/styles/b.css");
    assert_eq!(item["canonicalSource"], "cascade");
    assert_eq!(item["canonicalRank"], 2);
    assert_eq!(item["removeFrom"][0], "src/styles/a.css");

    stylefold(&tree)
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backups written to"));

    assert_eq!(tree.read("src/styles/a.css").unwrap(), ".a-only { top: 0; }\n");
    assert_eq!(tree.read("src/styles/b.css").unwrap(), ".btn { color: red; }\n");

    let backups = tree.backup_files();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].ends_with("/src/styles/a.css"));
    let archived = tree.read(&backups[0]).unwrap();
    assert!(archived.starts_with("/* stylefold backup: removed from src/styles/a.css at "));
    assert!(archived.contains(".btn { color: red; }"));
}

/// Conflicting groups need --all and merge last-wins in cascade order.
#[test]
fn test_conflicting_group_merges_in_cascade_order() {
    let tree = ordered_tree(".card { padding: 8px; }\n", ".card { padding: 12px; margin: 4px; }\n");

    run_ok(&tree, &["report"]);
    let report = read_json(&tree, REPORT);
    assert_eq!(report["items"][0]["kind"], "conflicting");
    assert_eq!(report["items"][0]["uniqueSignatures"], 2);
    assert_eq!(report["items"][0]["signatureExamples"].as_array().unwrap().len(), 2);

    run_ok(&tree, &["plan"]);
    let plan = read_json(&tree, PLAN);
    let item = &plan["items"][0];
    assert_eq!(item["canonical"], "src/styles/b.css");
    let merged: Vec<(String, String)> = item["mergedDecls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| (d["prop"].as_str().unwrap().to_string(), d["value"].as_str().unwrap().to_string()))
        .collect();
    assert_eq!(
        merged,
        vec![("margin".to_string(), "4px".to_string()), ("padding".to_string(), "12px".to_string())]
    );

    // Safe mode leaves conflicting groups alone
    stylefold(&tree)
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("use --all"));
    assert_eq!(tree.read("src/styles/a.css").unwrap(), ".card { padding: 8px; }\n");
    assert!(tree.backup_files().is_empty());

    run_ok(&tree, &["apply", "--all"]);
    assert!(!tree.read("src/styles/a.css").unwrap().contains(".card"));
    assert_eq!(tree.read("src/styles/b.css").unwrap(), ".card { padding: 12px; margin: 4px; }\n");

    let backups = tree.backup_files();
    assert_eq!(backups.len(), 1);
    assert!(tree.read(&backups[0]).unwrap().contains(".card { padding: 8px; }"));
}

/// A canonical copy earlier in cascade order receives the merged declarations.
#[test]
fn test_canonical_override_rewrites_canonical_rule() {
    let tree = ordered_tree(".card {\n  padding: 8px;\n}\n", ".card {\n  padding: 12px;\n}\n");
    tree.write(
        "canonical.json",
        r#"{"rules":[{"selectorPrefix":".ca","canonical":"src/styles/a.css"}]}"#,
    )
    .unwrap();

    run_ok(&tree, &["report"]);
    run_ok(&tree, &["plan", "--canonical-map", "canonical.json"]);
    let plan = read_json(&tree, PLAN);
    assert_eq!(plan["items"][0]["canonical"], "src/styles/a.css");
    assert_eq!(plan["items"][0]["canonicalSource"], "override");

    run_ok(&tree, &["apply", "--all"]);
    assert_eq!(tree.read("src/styles/a.css").unwrap(), ".card {\n  padding: 12px;\n}\n");
    assert!(!tree.read("src/styles/b.css").unwrap().contains(".card"));
    assert_eq!(tree.backup_files().len(), 2);
}

/// Context-wrapped groups are matched and emptied wrappers are pruned.
#[test]
fn test_context_group_prunes_empty_media_block() {
    let tree = ordered_tree(
        "@media (min-width: 768px) {\n  .nav { display: flex; }\n}\n",
        "@media (min-width: 768px) {\n  .nav { display: flex; }\n}\n",
    );

    run_ok(&tree, &["report"]);
    let report = read_json(&tree, REPORT);
    assert_eq!(report["items"][0]["context"], "@media (min-width: 768px)");

    run_ok(&tree, &["plan"]);
    run_ok(&tree, &["apply"]);
    assert_eq!(tree.read("src/styles/a.css").unwrap(), "");
    assert!(tree.read("src/styles/b.css").unwrap().contains(".nav { display: flex; }"));

    let backups = tree.backup_files();
    let archived = tree.read(&backups[0]).unwrap();
    assert!(archived.contains("/* context: @media (min-width: 768px) */"));
}

/// Running the whole pipeline a second time finds nothing left to do.
#[test]
fn test_pipeline_is_idempotent() {
    let tree = ordered_tree(
        ".btn { color: red; }\n.card { padding: 8px; }\n",
        ".btn { color: red; }\n.card { padding: 12px; }\n",
    );

    run_ok(&tree, &["report"]);
    run_ok(&tree, &["plan"]);
    run_ok(&tree, &["apply"]);
    let a_after_first = tree.read("src/styles/a.css").unwrap();

    run_ok(&tree, &["report"]);
    let report = read_json(&tree, REPORT);
    assert_eq!(report["identicalGroups"], 0);

    run_ok(&tree, &["plan"]);
    let plan = read_json(&tree, PLAN);
    assert_eq!(plan["identicalGroups"], 0);

    stylefold(&tree)
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to apply"));
    assert_eq!(tree.read("src/styles/a.css").unwrap(), a_after_first);
}

/// Rules with nested children are never reported or touched.
#[test]
fn test_nested_rules_are_left_untouched() {
    let nested = ".menu { .item { color: red; } }\n";
    let tree = ordered_tree(nested, nested);

    run_ok(&tree, &["report"]);
    let report = read_json(&tree, REPORT);
    assert_eq!(report["crossFileGroups"], 0);
    assert!(report["items"].as_array().unwrap().is_empty());

    run_ok(&tree, &["plan"]);
    run_ok(&tree, &["apply", "--all"]);
    assert_eq!(tree.read("src/styles/a.css").unwrap(), nested);
    assert_eq!(tree.read("src/styles/b.css").unwrap(), nested);
}

/// Files no entry point reaches fall back to the heuristic, with a warning.
#[test]
fn test_unreachable_files_warn_in_plan() {
    let tree = StyleTree::new().unwrap();
    tree.write("src/styles/pages/home.css", ".hero { margin: 0; }\n").unwrap();
    tree.write("src/styles/components/hero.css", ".hero { margin: 0; }\n").unwrap();

    run_ok(&tree, &["report"]);
    stylefold(&tree)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("carry warnings"));

    let plan = read_json(&tree, PLAN);
    let item = &plan["items"][0];
    assert_eq!(item["canonical"], "src/styles/components/hero.css");
    assert_eq!(item["canonicalSource"], "heuristic");
    assert!(item["canonicalRank"].is_null());
    assert!(!item["warnings"].as_array().unwrap().is_empty());
}

/// Script-level stylesheet imports seed the cascade after entry points.
#[test]
fn test_script_imports_rank_stylesheets() {
    let tree = StyleTree::new().unwrap();
    tree.write("src/styles/main.css", "@import \"./base.css\";\n").unwrap();
    tree.write("src/styles/base.css", ".x { color: red; }\n").unwrap();
    tree.write("src/styles/widget.css", ".x { color: red; }\n").unwrap();
    tree.write("src/app.tsx", "import './styles/widget.css';\nexport const App = () => null;\n")
        .unwrap();

    run_ok(&tree, &["report"]);
    run_ok(&tree, &["plan"]);
    let plan = read_json(&tree, PLAN);
    let item = &plan["items"][0];
    // main.css, widget.css (script seed), then base.css (imported by main.css)
    assert_eq!(item["canonical"], "src/styles/base.css");
    assert_eq!(item["canonicalSource"], "cascade");
    assert_eq!(item["canonicalRank"], 2);
    assert!(item.get("warnings").is_none());
}

/// A configuration file relocates the scanned tree and the artifacts.
#[test]
fn test_configuration_paths() {
    let tree = StyleTree::new().unwrap();
    tree.write(
        "stylefold.toml",
        "styles_dir = \"css\"\nentry_points = [\"css/index.css\"]\nreports_dir = \"out\"\n",
    )
    .unwrap();
    tree.write("css/index.css", "@import \"one.css\";\n@import \"two.css\";\n").unwrap();
    tree.write("css/one.css", ".b { top: 0; }\n").unwrap();
    tree.write("css/two.css", ".b { top: 0; }\n").unwrap();

    run_ok(&tree, &["report"]);
    let report = read_json(&tree, "out/css-cross-file-duplicates.json");
    assert_eq!(report["baseDir"], "css");
    assert_eq!(report["filesScanned"], 3);
    assert!(!tree.exists(REPORT));

    run_ok(&tree, &["plan"]);
    let plan = read_json(&tree, "out/css-cross-file-consolidation-plan.json");
    assert_eq!(plan["items"][0]["canonical"], "css/two.css");
}

/// Plan totals count every scanned file and group, not only planned ones.
#[test]
fn test_plan_totals_match_report_scan() {
    let tree = ordered_tree(".btn { color: red; }\n.a-only { top: 0; }\n", ".btn { color: red; }\n");
    tree.write("src/styles/solo.css", ".solo { margin: 0; }\n").unwrap();

    run_ok(&tree, &["report"]);
    run_ok(&tree, &["plan"]);

    let report = read_json(&tree, REPORT);
    let plan = read_json(&tree, PLAN);
    assert_eq!(report["filesScanned"], 4);
    assert_eq!(plan["filesConsidered"], report["filesScanned"]);
    assert_eq!(plan["groupsConsidered"], report["totalGroups"]);
    assert_eq!(plan["items"].as_array().unwrap().len(), 1);
}

/// Artifacts written to custom paths feed the next phase.
#[test]
fn test_custom_artifact_paths_chain() {
    let tree = ordered_tree(".btn { color: red; }\n", ".btn { color: red; }\n");

    run_ok(&tree, &["report", "--output", "x.json"]);
    assert!(tree.exists("x.json"));
    assert!(!tree.exists(REPORT));

    stylefold(&tree)
        .args(["plan", "--report", "x.json", "--output", "y.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Consolidation plan written to y.json"));
    assert!(!tree.exists(PLAN));
    let plan = read_json(&tree, "y.json");
    assert_eq!(plan["items"][0]["canonical"], "src/styles/b.css");

    run_ok(&tree, &["apply", "--plan", "y.json"]);
    assert_eq!(tree.read("src/styles/a.css").unwrap(), "");
    assert_eq!(tree.read("src/styles/b.css").unwrap(), ".btn { color: red; }\n");

    stylefold(&tree)
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("stylefold report"));
}
