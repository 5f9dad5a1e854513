// integration tests for the eval command

use crate::common::*;
use ccond::cli::exit_codes;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

fn write_context(dir: &Path, content: &serde_json::Value) -> String {
    let path = dir.join("context.json");
    fs::write(&path, serde_json::to_string_pretty(content).unwrap())
        .expect("Failed to write context");
    path.to_str().unwrap().to_string()
}

/// map container name -> result object from a JSON eval response
fn decisions(json: &serde_json::Value) -> Vec<(String, serde_json::Value)> {
    json["result"]
        .as_array()
        .expect("result should be an array")
        .iter()
        .map(|d| (d["container"].as_str().unwrap().to_string(), d.clone()))
        .collect()
}

fn decision<'a>(all: &'a [(String, serde_json::Value)], name: &str) -> &'a serde_json::Value {
    &all.iter()
        .find(|(n, _)| n == name)
        .unwrap_or_else(|| panic!("no decision for {}", name))
        .1
}

#[test]
fn test_eval_all_containers_json() {
    let dir = create_test_dir("eval_all");
    let config = write_config(&dir, SAMPLE_CONFIG);
    let context = write_context(
        &dir,
        &serde_json::json!({
            "entity-id": 42,
            "entity-template": "page.tpl",
            "entity-terms": ["category:news", "tag:rust"],
            "entity-level": 1
        }),
    );

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--json", "eval", "--context", &context],
    );

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let all = decisions(&parse_json(&output));
    assert_eq!(all.len(), 4);

    assert_eq!(decision(&all, "page-options")["outcome"], "active");
    assert_eq!(decision(&all, "news-sidebar")["outcome"], "active");
    assert_eq!(decision(&all, "everywhere")["outcome"], "active");

    let broken = decision(&all, "broken");
    assert_eq!(broken["outcome"], "broken");
    assert_eq!(broken["active"], false);
    assert!(broken["error"].as_str().unwrap().contains("entity-idd"));

    cleanup_test_dir(&dir);
}

#[test]
fn test_eval_inactive_containers() {
    let dir = create_test_dir("eval_inactive");
    let config = write_config(&dir, SAMPLE_CONFIG);
    let context = write_context(
        &dir,
        &serde_json::json!({ "entity-id": 7, "entity-template": "page.tpl", "entity-level": 1 }),
    );

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--json", "eval", "--context", &context],
    );

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let all = decisions(&parse_json(&output));
    assert_eq!(decision(&all, "page-options")["outcome"], "inactive");
    assert_eq!(decision(&all, "page-options")["active"], false);
    // no entity-terms fact and level 1 < 3
    assert_eq!(decision(&all, "news-sidebar")["outcome"], "inactive");
    assert_eq!(decision(&all, "everywhere")["outcome"], "active");

    cleanup_test_dir(&dir);
}

#[test]
fn test_eval_single_container_with_facts() {
    let dir = create_test_dir("eval_facts");
    let config = write_config(&dir, SAMPLE_CONFIG);

    let output = run_ccond(
        &dir,
        &[
            "--config",
            config.to_str().unwrap(),
            "--no-json",
            "eval",
            "--container",
            "news-sidebar",
            "--fact",
            "entity-level=4",
        ],
    );

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let out = stdout(&output);
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("news-sidebar: active"), "unexpected output: {}", out);

    cleanup_test_dir(&dir);
}

#[test]
fn test_eval_fact_overrides_context_file() {
    let dir = create_test_dir("eval_override");
    let config = write_config(&dir, SAMPLE_CONFIG);
    let context = write_context(
        &dir,
        &serde_json::json!({ "entity-id": 42, "entity-template": "page.tpl" }),
    );

    let output = run_ccond(
        &dir,
        &[
            "--config",
            config.to_str().unwrap(),
            "--json",
            "eval",
            "--context",
            &context,
            "--fact",
            "entity-template=landing.tpl",
            "--container",
            "page-options",
        ],
    );

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let all = decisions(&parse_json(&output));
    assert_eq!(all.len(), 1);
    assert_eq!(decision(&all, "page-options")["outcome"], "inactive");

    cleanup_test_dir(&dir);
}

#[test]
fn test_eval_context_from_stdin() {
    let dir = create_test_dir("eval_stdin");
    let config = write_config(&dir, SAMPLE_CONFIG);

    let mut child = Command::new(ccond_binary_path())
        .args([
            "--config",
            config.to_str().unwrap(),
            "--json",
            "eval",
            "--context",
            "-",
            "--container",
            "news-sidebar",
        ])
        .env("HOME", &dir)
        .env_remove("CCOND_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn ccond");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(br#"{ "entity-terms": [{ "taxonomy": "category", "term": "news" }] }"#)
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let all = decisions(&parse_json(&output));
    assert_eq!(decision(&all, "news-sidebar")["outcome"], "active");

    cleanup_test_dir(&dir);
}

#[test]
fn test_eval_ignores_unrelated_object_facts() {
    let dir = create_test_dir("eval_extra_facts");
    let config = write_config(&dir, SAMPLE_CONFIG);
    let context = write_context(
        &dir,
        &serde_json::json!({
            "entity-id": 42,
            "entity-template": "page.tpl",
            "meta": { "author": "ana", "revision": 3 }
        }),
    );

    let output = run_ccond(
        &dir,
        &[
            "--config",
            config.to_str().unwrap(),
            "--json",
            "eval",
            "--context",
            &context,
            "--container",
            "page-options",
        ],
    );

    assert_eq!(output.status.code(), Some(exit_codes::SUCCESS), "stderr={}", stderr(&output));
    let all = decisions(&parse_json(&output));
    assert_eq!(decision(&all, "page-options")["outcome"], "active");

    cleanup_test_dir(&dir);
}

#[test]
fn test_eval_unknown_container() {
    let dir = create_test_dir("eval_unknown");
    let config = write_config(&dir, SAMPLE_CONFIG);

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--json", "eval", "--container", "sidebar"],
    );

    assert_eq!(output.status.code(), Some(exit_codes::CONTAINER_NOT_FOUND));
    let json = parse_json(&output);
    let suggestions = json["error"]["data"]["suggestions"].as_array().unwrap();
    assert!(suggestions.iter().any(|s| s == "news-sidebar"));

    cleanup_test_dir(&dir);
}

#[test]
fn test_eval_invalid_context() {
    let dir = create_test_dir("eval_bad_context");
    let config = write_config(&dir, SAMPLE_CONFIG);
    let context = write_context(&dir, &serde_json::json!([1, 2, 3]));

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--no-json", "eval", "--context", &context],
    );

    assert_eq!(output.status.code(), Some(exit_codes::INVALID_ARGS));
    assert!(stderr(&output).contains("context must be an object"));

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--no-json", "eval", "--fact", "entity-id"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::INVALID_ARGS));

    cleanup_test_dir(&dir);
}

#[test]
fn test_eval_undecided_fails_closed() {
    let dir = create_test_dir("eval_undecided");
    let config = write_config(
        &dir,
        r#"{
            containers: [
                { name: "odd", conditions: { "type": "entity-id", compare: "IN", value: 1 } },
                { name: "fine", conditions: { "type": "entity-id", value: 1 } },
            ],
        }"#,
    );

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--json", "eval", "--fact", "entity-id=1"],
    );

    assert_eq!(output.status.code(), Some(exit_codes::EVAL_ERROR));
    let all = decisions(&parse_json(&output));
    let odd = decision(&all, "odd");
    assert_eq!(odd["outcome"], "undecided");
    assert_eq!(odd["active"], false);
    assert!(odd["error"].as_str().unwrap().contains("contain"));
    // the other container is still decided
    assert_eq!(decision(&all, "fine")["outcome"], "active");

    cleanup_test_dir(&dir);
}

#[test]
fn test_eval_undecided_fail_open() {
    let dir = create_test_dir("eval_fail_open");
    let config = write_config(
        &dir,
        r#"{
            containers: [
                { name: "odd", conditions: { "type": "entity-id", compare: "IN", value: 1 } },
            ],
            settings: { fail_closed: false },
        }"#,
    );

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--json", "eval", "--fact", "entity-id=1"],
    );

    assert_eq!(output.status.code(), Some(exit_codes::EVAL_ERROR));
    let all = decisions(&parse_json(&output));
    assert_eq!(decision(&all, "odd")["active"], true);

    cleanup_test_dir(&dir);
}

#[test]
fn test_eval_quiet_prints_nothing() {
    let dir = create_test_dir("eval_quiet");
    let config = write_config(&dir, SAMPLE_CONFIG);

    let output = run_ccond(
        &dir,
        &["--config", config.to_str().unwrap(), "--quiet", "eval", "--fact", "entity-id=42"],
    );

    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).is_empty());

    cleanup_test_dir(&dir);
}
