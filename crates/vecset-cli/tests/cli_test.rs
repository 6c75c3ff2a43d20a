//! Integration tests for the vecset binary
//!
//! Each test builds a small catalog in a temporary directory and runs the
//! binary against it.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_catalog(root: &Path) {
    let dir = root.join("toy-dataset");
    fs::create_dir_all(&dir).unwrap();

    let metadata = serde_json::json!({
        "name": "toy-dataset",
        "created_at": "2024-01-01T00:00:00Z",
        "documents": 7,
        "queries": 0,
        "source": "generated",
        "dense_model": {"name": "toy-model", "dimension": 3},
    });
    fs::write(dir.join("metadata.json"), metadata.to_string()).unwrap();

    let documents: Vec<String> = (0..7)
        .map(|i| serde_json::json!({"id": i.to_string(), "values": [i as f32, 0.5, 1.0]}).to_string())
        .collect();
    fs::write(dir.join("documents.jsonl"), documents.join("\n")).unwrap();
}

fn vecset(catalog: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vecset"))
        .arg("--catalog")
        .arg(catalog)
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("VECSET_CATALOG")
        .env_remove("VECSET_BATCH_SIZE")
        .env_remove("VECSET_CONCURRENCY")
        .output()
        .expect("Failed to execute vecset")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_list_json() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path());

    let output = vecset(dir.path(), &["list", "--json"]);
    assert!(output.status.success());

    let parsed = json_stdout(&output);
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["data"][0]["name"], "toy-dataset");
    assert_eq!(parsed["data"][0]["dimension"], 3);
}

#[test]
fn test_show_with_head() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path());

    let output = vecset(dir.path(), &["show", "toy-dataset", "--head", "2", "--json"]);
    assert!(output.status.success());

    let parsed = json_stdout(&output);
    assert_eq!(parsed["data"]["metadata"]["documents"], 7);
    assert_eq!(parsed["data"]["head"].as_array().unwrap().len(), 2);
}

#[test]
fn test_upload_to_memory_service() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path());

    let output = vecset(
        dir.path(),
        &["upload", "toy-dataset", "--index", "toy", "--service", "memory", "--batch-size", "3", "--json"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let parsed = json_stdout(&output);
    assert_eq!(parsed["data"]["outcome"]["total_acknowledged"], 7);
    assert_eq!(parsed["data"]["outcome"]["batches_succeeded"], 3);
    assert_eq!(parsed["data"]["namespace"], "");
}

#[test]
fn test_upload_without_create_fails_on_missing_index() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path());

    let output = vecset(
        dir.path(),
        &["upload", "toy-dataset", "--index", "toy", "--service", "memory", "--no-create"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Index not found"));
}

#[test]
fn test_upload_dry_run_plans_batches() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path());

    let output = vecset(
        dir.path(),
        &["upload", "toy-dataset", "--index", "toy", "--batch-size", "2", "--dry-run", "--json"],
    );
    assert!(output.status.success());

    let parsed = json_stdout(&output);
    assert_eq!(parsed["data"]["dry_run"], true);
    let steps = parsed["data"]["plan"]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0]["action"], "check_index");
    assert_eq!(steps[1]["action"], "create_index");
    assert_eq!(steps[2]["action"], "upsert");
    assert_eq!(steps[2]["batches"], 4);
    assert_eq!(steps[2]["last_batch"], 1);
}

#[test]
fn test_zero_batch_size_rejected() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path());

    let output = vecset(
        dir.path(),
        &["upload", "toy-dataset", "--index", "toy", "--service", "memory", "--batch-size", "0"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("batch_size"));
}

#[test]
fn test_unknown_dataset() {
    let dir = TempDir::new().unwrap();
    write_catalog(dir.path());

    let output = vecset(dir.path(), &["show", "nope"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Dataset not found"));
}

#[test]
fn test_config_reports_cli_source() {
    let dir = TempDir::new().unwrap();

    let output = vecset(dir.path(), &["config", "--json"]);
    assert!(output.status.success());

    let parsed = json_stdout(&output);
    let rows = parsed["data"].as_array().unwrap();
    let catalog = rows.iter().find(|row| row["key"] == "catalog_root").unwrap();
    assert_eq!(catalog["source"], "Cli");
}
