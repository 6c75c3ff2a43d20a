//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use vecset_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use vecset_core::models::Metric;

fn clear_env() {
    for key in [
        "VECSET_CATALOG",
        "VECSET_BATCH_SIZE",
        "VECSET_CONCURRENCY",
        "VECSET_MAX_ATTEMPTS",
        "VECSET_INITIAL_BACKOFF_MS",
        "VECSET_MAX_BACKOFF_MS",
        "VECSET_METRIC",
        "VECSET_REQUEST_TIMEOUT_SECS",
    ] {
        env::remove_var(key);
    }
}

fn config_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
catalog_root = "/srv/datasets"
batch_size = 250
concurrency = 2
"#
    )
    .unwrap();
    file
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let file = config_file();
    env::set_var("VECSET_BATCH_SIZE", "500");
    env::set_var("VECSET_METRIC", "euclidean");

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.batch_size.value, 500);
    assert_eq!(config.batch_size.source, ConfigSource::Environment);
    assert_eq!(config.concurrency.value, 2);
    assert_eq!(config.concurrency.source, ConfigSource::File);
    assert_eq!(config.metric.value, Metric::Euclidean);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_environment() {
    clear_env();
    env::set_var("VECSET_CONCURRENCY", "8");
    env::set_var("VECSET_CATALOG", "/from/env");

    let mut config = LayeredConfig::with_defaults().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        concurrency: Some(1),
        ..Default::default()
    });

    assert_eq!(config.concurrency.value, 1);
    assert_eq!(config.concurrency.source, ConfigSource::Cli);
    assert_eq!(config.catalog_root.value, PathBuf::from("/from/env"));
    assert_eq!(config.catalog_root.source, ConfigSource::Environment);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_values_are_ignored() {
    clear_env();
    env::set_var("VECSET_BATCH_SIZE", "many");
    env::set_var("VECSET_METRIC", "hamming");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.batch_size.value, 100);
    assert_eq!(config.batch_size.source, ConfigSource::Default);
    assert_eq!(config.metric.value, Metric::Cosine);

    clear_env();
}

#[test]
fn test_missing_file_is_config_error() {
    let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/vecset.toml");
    assert!(result.is_err());
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "batch_size = \"lots\"").unwrap();

    let result = LayeredConfig::with_defaults().load_from_file(file.path());
    assert!(result.is_err());
}
