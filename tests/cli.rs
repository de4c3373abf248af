//! `chain-config` binary exit status and error reporting.

use std::process::{Command, Output};

mod common;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chain-config"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_show_toml_with_null_fails() {
    let doc = r#"{"networks": {}, "compiler": {"version": "0.8.21"},
                  "testRunnerOptions": {"grep": null}}"#;
    let file = common::write_document(doc, "json");
    let path = file.path().to_str().unwrap();

    let output = run(&["--config", path, "show", "--format", "toml"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr: {stderr}");

    let output = run(&["--config", path, "show", "--format", "json"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("\"grep\": null"));
}

#[test]
fn test_validate_reports_invalid_document() {
    let file = common::write_document(&common::json_with_port("0"), "json");
    let output = run(&["--config", file.path().to_str().unwrap(), "validate"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("networks.dev.port"), "stderr: {stderr}");
}
