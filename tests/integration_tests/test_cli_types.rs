// integration tests for the types and show commands

use crate::common::*;
use ccond::cli::exit_codes;

#[test]
fn test_types_lists_builtin_kinds() {
    let dir = create_test_dir("types_builtin");

    let output = run_ccond(&dir, &["--json", "types"]);

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let json = parse_json(&output);
    let types = json["result"].as_array().unwrap();
    assert_eq!(types.len(), 9);

    let entity_term = types
        .iter()
        .find(|t| t["tag"] == "entity-term")
        .expect("entity-term should be listed");
    assert_eq!(entity_term["fact"], "entity-terms");

    cleanup_test_dir(&dir);
}

#[test]
fn test_types_includes_aliases() {
    let dir = create_test_dir("types_alias");
    let config = write_config(
        &dir,
        r#"{ settings: { aliases: [ { tag: "post_template", "type": "entity-template" } ] } }"#,
    );

    let output = run_ccond(&dir, &["--config", config.to_str().unwrap(), "--no-json", "types"]);

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let out = stdout(&output);
    assert_eq!(out.lines().count(), 10);
    assert!(out.contains("(alias of entity-template)"));

    cleanup_test_dir(&dir);
}

#[test]
fn test_types_conflicting_alias_is_config_error() {
    let dir = create_test_dir("types_conflict");
    let config = write_config(
        &dir,
        r#"{ settings: { aliases: [ { tag: "entity-id", "type": "term" } ] } }"#,
    );

    let output = run_ccond(&dir, &["--config", config.to_str().unwrap(), "--no-json", "types"]);

    assert_eq!(output.status.code(), Some(exit_codes::CONFIG_ERROR));

    cleanup_test_dir(&dir);
}

#[test]
fn test_show_prints_tree() {
    let dir = create_test_dir("show_tree");
    let config = write_config(&dir, SAMPLE_CONFIG);

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--no-json", "show", "page-options"],
    );

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let out = stdout(&output);
    assert!(out.starts_with("all("), "unexpected output: {}", out);
    assert!(out.contains("entity-id = 42"));
    assert!(out.contains("entity-template == \"page.tpl\""));

    cleanup_test_dir(&dir);
}

#[test]
fn test_show_with_spec_round_trips() {
    let dir = create_test_dir("show_spec");
    let config = write_config(&dir, SAMPLE_CONFIG);

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--json", "show", "news-sidebar", "--spec"],
    );

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let json = parse_json(&output);
    let spec = &json["result"]["spec"];
    assert_eq!(spec["relation"], "OR");
    assert_eq!(spec["items"][0]["type"], "entity-term");
    assert_eq!(spec["items"][1]["compare"], ">=");

    cleanup_test_dir(&dir);
}

#[test]
fn test_show_broken_container() {
    let dir = create_test_dir("show_broken");
    let config = write_config(&dir, SAMPLE_CONFIG);

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--no-json", "show", "broken"],
    );

    assert_eq!(output.status.code(), Some(exit_codes::CONFIG_ERROR));
    assert!(stderr(&output).contains("did you mean: entity-id"));

    cleanup_test_dir(&dir);
}

#[test]
fn test_show_unknown_container() {
    let dir = create_test_dir("show_unknown");
    let config = write_config(&dir, SAMPLE_CONFIG);

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--no-json", "show", "missing"],
    );

    assert_eq!(output.status.code(), Some(exit_codes::CONTAINER_NOT_FOUND));
    assert!(stderr(&output).contains("Did you mean:"));

    cleanup_test_dir(&dir);
}
