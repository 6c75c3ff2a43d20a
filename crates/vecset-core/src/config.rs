use crate::error::{Result, VecsetError};
use crate::models::Metric;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for vecset
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub catalog_root: ConfigValue<PathBuf>,
    pub batch_size: ConfigValue<usize>,
    pub concurrency: ConfigValue<usize>,
    pub max_attempts: ConfigValue<u32>,
    pub initial_backoff_ms: ConfigValue<u64>,
    pub max_backoff_ms: ConfigValue<u64>,
    pub metric: ConfigValue<Metric>,
    pub request_timeout_secs: ConfigValue<u64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            catalog_root: ConfigValue::new(PathBuf::from("datasets"), ConfigSource::Default),
            batch_size: ConfigValue::new(100, ConfigSource::Default),
            concurrency: ConfigValue::new(10, ConfigSource::Default),
            max_attempts: ConfigValue::new(3, ConfigSource::Default),
            initial_backoff_ms: ConfigValue::new(200, ConfigSource::Default),
            max_backoff_ms: ConfigValue::new(5000, ConfigSource::Default),
            metric: ConfigValue::new(Metric::Cosine, ConfigSource::Default),
            request_timeout_secs: ConfigValue::new(30, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| VecsetError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| VecsetError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(catalog_root) = file_config.catalog_root {
            self.catalog_root.update(catalog_root, ConfigSource::File);
        }

        if let Some(batch_size) = file_config.batch_size {
            self.batch_size.update(batch_size, ConfigSource::File);
        }

        if let Some(concurrency) = file_config.concurrency {
            self.concurrency.update(concurrency, ConfigSource::File);
        }

        if let Some(retry) = file_config.retry {
            if let Some(max_attempts) = retry.max_attempts {
                self.max_attempts.update(max_attempts, ConfigSource::File);
            }
            if let Some(initial) = retry.initial_backoff_ms {
                self.initial_backoff_ms.update(initial, ConfigSource::File);
            }
            if let Some(max) = retry.max_backoff_ms {
                self.max_backoff_ms.update(max, ConfigSource::File);
            }
        }

        if let Some(metric) = file_config.metric {
            self.metric.update(metric, ConfigSource::File);
        }

        if let Some(timeout) = file_config.request_timeout_secs {
            self.request_timeout_secs.update(timeout, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // VECSET_CATALOG
        if let Ok(root) = env::var("VECSET_CATALOG") {
            self.catalog_root.update(PathBuf::from(root), ConfigSource::Environment);
        }

        if let Some(batch_size) = parse_env::<usize>("VECSET_BATCH_SIZE") {
            self.batch_size.update(batch_size, ConfigSource::Environment);
        }

        if let Some(concurrency) = parse_env::<usize>("VECSET_CONCURRENCY") {
            self.concurrency.update(concurrency, ConfigSource::Environment);
        }

        if let Some(max_attempts) = parse_env::<u32>("VECSET_MAX_ATTEMPTS") {
            self.max_attempts.update(max_attempts, ConfigSource::Environment);
        }

        if let Some(initial) = parse_env::<u64>("VECSET_INITIAL_BACKOFF_MS") {
            self.initial_backoff_ms.update(initial, ConfigSource::Environment);
        }

        if let Some(max) = parse_env::<u64>("VECSET_MAX_BACKOFF_MS") {
            self.max_backoff_ms.update(max, ConfigSource::Environment);
        }

        // VECSET_METRIC
        if let Ok(metric_str) = env::var("VECSET_METRIC") {
            match metric_str.parse::<Metric>() {
                Ok(metric) => self.metric.update(metric, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid VECSET_METRIC value '{}': expected cosine, euclidean, or dotproduct",
                    metric_str
                ),
            }
        }

        if let Some(timeout) = parse_env::<u64>("VECSET_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs.update(timeout, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(catalog_root) = overrides.catalog_root {
            self.catalog_root.update(catalog_root, ConfigSource::Cli);
        }

        if let Some(batch_size) = overrides.batch_size {
            self.batch_size.update(batch_size, ConfigSource::Cli);
        }

        if let Some(concurrency) = overrides.concurrency {
            self.concurrency.update(concurrency, ConfigSource::Cli);
        }

        if let Some(metric) = overrides.metric {
            self.metric.update(metric, ConfigSource::Cli);
        }
    }

    /// Reject values the upload pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.batch_size.value == 0 {
            return Err(VecsetError::ConfigInvalid {
                key: "batch_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.concurrency.value == 0 {
            return Err(VecsetError::ConfigInvalid {
                key: "concurrency".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.max_attempts.value == 0 {
            return Err(VecsetError::ConfigInvalid {
                key: "retry.max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.initial_backoff_ms.value > self.max_backoff_ms.value {
            return Err(VecsetError::ConfigInvalid {
                key: "retry.initial_backoff_ms".to_string(),
                reason: format!(
                    "initial backoff ({}) must be <= max backoff ({})",
                    self.initial_backoff_ms.value, self.max_backoff_ms.value
                ),
            });
        }

        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "catalog_root".to_string(),
            (self.catalog_root.value.display().to_string(), self.catalog_root.source),
        );
        map.insert(
            "batch_size".to_string(),
            (self.batch_size.value.to_string(), self.batch_size.source),
        );
        map.insert(
            "concurrency".to_string(),
            (self.concurrency.value.to_string(), self.concurrency.source),
        );
        map.insert(
            "retry.max_attempts".to_string(),
            (self.max_attempts.value.to_string(), self.max_attempts.source),
        );
        map.insert(
            "retry.initial_backoff_ms".to_string(),
            (self.initial_backoff_ms.value.to_string(), self.initial_backoff_ms.source),
        );
        map.insert(
            "retry.max_backoff_ms".to_string(),
            (self.max_backoff_ms.value.to_string(), self.max_backoff_ms.source),
        );
        map.insert("metric".to_string(), (self.metric.value.to_string(), self.metric.source));
        map.insert(
            "request_timeout_secs".to_string(),
            (self.request_timeout_secs.value.to_string(), self.request_timeout_secs.source),
        );

        map
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected a non-negative integer", key, raw);
            None
        }
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    catalog_root: Option<PathBuf>,
    batch_size: Option<usize>,
    concurrency: Option<usize>,
    metric: Option<Metric>,
    request_timeout_secs: Option<u64>,
    retry: Option<RetryFileConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RetryFileConfig {
    max_attempts: Option<u32>,
    initial_backoff_ms: Option<u64>,
    max_backoff_ms: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub catalog_root: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub concurrency: Option<usize>,
    pub metric: Option<Metric>,
}
