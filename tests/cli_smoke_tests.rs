//! CLI smoke tests for the codedna binary
//!
//! Spawns the built binary against a temporary project and data directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn codedna(args: &[&str], data_dir: &Path) -> Output {
    let bin_path = env!("CARGO_BIN_EXE_codedna");
    Command::new(bin_path)
        .args(args)
        .arg("--data-dir")
        .arg(data_dir)
        .env_remove("CODEDNA_LOG")
        .output()
        .expect("Failed to run codedna binary")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): {}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("package.json"), r#"{ "name": "smoke-app" }"#).unwrap();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(
        root.join("src/main.ts"),
        "import { helper } from './helper';\nhelper();\n",
    )
    .unwrap();
    fs::write(root.join("src/helper.ts"), "export function helper() {}\n").unwrap();
    dir
}

#[test]
fn test_ingest_top_show_round_trip() {
    let project = sample_project();
    let data = TempDir::new().unwrap();
    let root = project.path().to_str().unwrap();

    let output = codedna(&["ingest", root, "--output", "json"], data.path());
    assert!(
        output.status.success(),
        "ingest failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json = json_stdout(&output);
    assert_eq!(json["schema_version"], "1.0.0");
    assert!(json["execution_id"].is_string());
    assert_eq!(json["data"]["slug"], "smoke-app");
    assert_eq!(json["data"]["cached"], false);
    assert_eq!(json["data"]["nodes"], 2);
    assert_eq!(json["data"]["edges"], 1);
    assert_eq!(json["data"]["top_files"][0]["path"], "src/helper.ts");
    assert!(data.path().join("projects/smoke-app/dna.md").is_file());
    assert!(data.path().join("meta.db").is_file());

    let output = codedna(&["top", root, "--limit", "1", "--output", "json"], data.path());
    assert!(output.status.success());
    let json = json_stdout(&output);
    let files = json["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["path"], "src/helper.ts");
    assert_eq!(files[0]["rank"], 1.0);

    let output = codedna(&["show", root], data.path());
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.starts_with("---\nproject: smoke-app\n"));
    assert!(text.contains("# Project DNA: smoke-app"));
}

#[test]
fn test_human_ingest_output() {
    let project = sample_project();
    let data = TempDir::new().unwrap();

    let output = codedna(&["ingest", project.path().to_str().unwrap()], data.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ingested smoke-app (smoke-app)"));
    assert!(stdout.contains("2 nodes, 1 edges"));
}

#[test]
fn test_no_store_leaves_no_database() {
    let project = sample_project();
    let data = TempDir::new().unwrap();

    let output = codedna(
        &["ingest", project.path().to_str().unwrap(), "--no-store"],
        data.path(),
    );
    assert!(output.status.success());
    assert!(!data.path().join("meta.db").exists());
}

#[test]
fn test_missing_root_fails_with_json_error() {
    let data = TempDir::new().unwrap();
    let missing = data.path().join("nowhere");

    let output = codedna(
        &["ingest", missing.to_str().unwrap(), "--output", "json"],
        data.path(),
    );
    assert_eq!(output.status.code(), Some(1));
    let json = json_stdout(&output);
    assert_eq!(json["data"]["error"], "invalid_root");
    assert!(json["data"]["message"]
        .as_str()
        .unwrap()
        .contains("does not exist"));
}

#[test]
fn test_show_before_ingest_fails() {
    let project = sample_project();
    let data = TempDir::new().unwrap();

    let output = codedna(&["show", project.path().to_str().unwrap()], data.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("codedna ingest"));
}

#[test]
fn test_version_command() {
    let data = TempDir::new().unwrap();
    let output = codedna(&["version"], data.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("codedna "));
}
