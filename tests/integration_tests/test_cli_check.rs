// integration tests for the check command

use crate::common::*;
use ccond::cli::exit_codes;

#[test]
fn test_check_valid_config() {
    let dir = create_test_dir("check_valid");
    let config = write_config(
        &dir,
        r#"{ "containers": [ { "name": "a", "conditions": { "type": "entity-id", "value": 1 } } ] }"#,
    );

    let output = run_ccond(&dir, &["--config", config.to_str().unwrap(), "--no-json", "check"]);

    assert!(
        output.status.success(),
        "check failed: stdout={}, stderr={}",
        stdout(&output),
        stderr(&output)
    );
    assert!(stdout(&output).contains("1 container(s) valid"));

    cleanup_test_dir(&dir);
}

#[test]
fn test_check_reports_broken_container() {
    let dir = create_test_dir("check_broken");
    let config = write_config(&dir, SAMPLE_CONFIG);

    let output = run_ccond(&dir, &["--config", config.to_str().unwrap(), "--no-json", "check"]);

    assert_eq!(output.status.code(), Some(exit_codes::CONFIG_ERROR));
    let out = stdout(&output);
    assert!(out.contains("1 error(s)"), "unexpected output: {}", out);
    assert!(out.contains("containers[3] (broken)"));
    assert!(out.contains("did you mean: entity-id"));

    cleanup_test_dir(&dir);
}

#[test]
fn test_check_json_error_details() {
    let dir = create_test_dir("check_json");
    let config = write_config(&dir, SAMPLE_CONFIG);

    let output = run_ccond(&dir, &["--config", config.to_str().unwrap(), "--json", "check"]);

    assert_eq!(output.status.code(), Some(exit_codes::CONFIG_ERROR));
    let json = parse_json(&output);
    assert_eq!(json["error"]["code"], -32000 - exit_codes::CONFIG_ERROR);
    let details = json["error"]["data"]["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);

    cleanup_test_dir(&dir);
}

#[test]
fn test_check_json_success() {
    let dir = create_test_dir("check_json_ok");
    let config = write_config(&dir, r#"{ "containers": [ { "name": "always" } ] }"#);

    let output = run_ccond(&dir, &["--config", config.to_str().unwrap(), "--json", "check"]);

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let json = parse_json(&output);
    assert_eq!(json["result"]["containers"], 1);
    assert_eq!(json["result"]["errors"].as_array().unwrap().len(), 0);

    cleanup_test_dir(&dir);
}

#[test]
fn test_check_config_from_env_var() {
    let dir = create_test_dir("check_env");
    let config = write_config(&dir, r#"{ "containers": [] }"#);

    let output = run_ccond_with_env(
        &dir,
        &["--no-json", "check"],
        &[("CCOND_CONFIG", config.to_str().unwrap())],
    );

    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).contains(config.to_str().unwrap()));

    cleanup_test_dir(&dir);
}

#[test]
fn test_check_missing_explicit_config() {
    let dir = create_test_dir("check_missing");
    let missing = dir.join("nope.json");

    let output = run_ccond(&dir, &["--config", missing.to_str().unwrap(), "--no-json", "check"]);

    assert_eq!(output.status.code(), Some(exit_codes::CONFIG_ERROR));
    assert!(stderr(&output).contains("config file not found"));

    cleanup_test_dir(&dir);
}

#[test]
fn test_check_unparseable_config() {
    let dir = create_test_dir("check_unparseable");
    let config = write_config(&dir, "{ containers: [ ");

    let output = run_ccond(&dir, &["--config", config.to_str().unwrap(), "--no-json", "check"]);

    assert_eq!(output.status.code(), Some(exit_codes::CONFIG_ERROR));

    cleanup_test_dir(&dir);
}

#[test]
fn test_check_without_config_uses_defaults() {
    let dir = create_test_dir("check_default");

    // HOME points at an empty directory, so no ~/.ccond/config.json exists
    let output = run_ccond(&dir, &["--no-json", "check"]);

    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).contains("0 container(s) valid"));

    cleanup_test_dir(&dir);
}
