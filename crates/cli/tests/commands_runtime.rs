use std::fs;

use clap::Parser;
use tempfile::TempDir;

use itinera_cli::commands::{config, doctor};
use itinera_cli::Cli;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("itinera.toml");
    fs::write(&path, body).expect("write config file");
    path
}

#[test]
fn cli_accepts_documented_invocations() {
    for args in [
        vec!["itinera", "chat"],
        vec!["itinera", "ask", "3 day honeymoon trip to Udaipur"],
        vec!["itinera", "config"],
        vec!["itinera", "doctor", "--json"],
        vec!["itinera", "--config", "custom.toml", "doctor"],
    ] {
        assert!(Cli::try_parse_from(&args).is_ok(), "should parse: {args:?}");
    }

    assert!(Cli::try_parse_from(["itinera", "teleport"]).is_err());
}

#[test]
fn doctor_reports_ok_for_a_valid_config_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        r#"
[llm]
model = "llama3.2"

[retrieval]
index_name = "travel-knowledge"
"#,
    );

    let result = doctor::run(Some(path), true);
    assert_eq!(result.exit_code, 0);

    let report: serde_json::Value = serde_json::from_str(&result.output).expect("json report");
    assert_eq!(report["status"], "ok");
    let checks = report["checks"].as_array().expect("checks array");
    assert!(checks.iter().any(|check| check["name"] == "config_load"));
}

#[test]
fn doctor_flags_a_malformed_endpoint() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        r#"
[retrieval]
base_url = "not-a-url"
"#,
    );

    let result = doctor::run(Some(path), true);
    assert_eq!(result.exit_code, 1);

    let report: serde_json::Value = serde_json::from_str(&result.output).expect("json report");
    assert_eq!(report["status"], "error");
}

#[test]
fn doctor_falls_back_to_defaults_when_config_file_absent() {
    let result = doctor::run(Some("definitely-missing.toml".into()), true);
    // an absent optional file falls back to defaults, which validate
    assert_eq!(result.exit_code, 0);
}

#[test]
fn config_command_redacts_api_keys() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        r#"
[retrieval]
api_key = "pc-very-secret"
"#,
    );

    let result = config::run(Some(path));
    assert_eq!(result.exit_code, 0);
    assert!(!result.output.contains("pc-very-secret"));
    assert!(result.output.contains("<redacted>"));
    // llm key was never set
    assert!(result.output.contains("<unset>"));
}

#[test]
fn config_command_rejects_a_broken_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "this is not toml = = =");

    let result = config::run(Some(path));
    assert_eq!(result.exit_code, 2);
    assert!(result.output.contains("error"));
}
