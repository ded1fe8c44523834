//! Configuration management for termination policy and launch timing.
//!
//! Stores configuration in JSON format at `~/.proctree/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::{TerminationPolicy, DEFAULT_COMPAT_LAYER_INDEX, DEFAULT_FAN_OUT_THRESHOLD};
use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Descendant count above which a tree is a fan-out application.
    #[serde(default = "default_fan_out_threshold", rename = "fanOutThreshold")]
    pub fan_out_threshold: usize,

    /// Discovery position of the compatibility-layer process.
    #[serde(default = "default_compat_layer_index", rename = "compatLayerIndex")]
    pub compat_layer_index: usize,

    /// Delay between spawning a root and the first snapshot, in milliseconds.
    #[serde(default = "default_settle_delay_ms", rename = "settleDelayMs")]
    pub settle_delay_ms: u64,

    /// Extra snapshots taken while a launched root has no descendants yet.
    #[serde(default = "default_snapshot_retries", rename = "snapshotRetries")]
    pub snapshot_retries: u32,

    /// Pause between those snapshots, in milliseconds.
    #[serde(default = "default_retry_interval_ms", rename = "retryIntervalMs")]
    pub retry_interval_ms: u64,

    /// Treat an unavailable snapshot as an empty process list.
    #[serde(default, rename = "lenientSnapshot")]
    pub lenient_snapshot: bool,
}

fn default_fan_out_threshold() -> usize {
    DEFAULT_FAN_OUT_THRESHOLD
}

fn default_compat_layer_index() -> usize {
    DEFAULT_COMPAT_LAYER_INDEX
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_snapshot_retries() -> u32 {
    3
}

fn default_retry_interval_ms() -> u64 {
    250
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fan_out_threshold: default_fan_out_threshold(),
            compat_layer_index: default_compat_layer_index(),
            settle_delay_ms: default_settle_delay_ms(),
            snapshot_retries: default_snapshot_retries(),
            retry_interval_ms: default_retry_interval_ms(),
            lenient_snapshot: false,
        }
    }
}

impl Config {
    /// Check that a fan-out tree always has a compatibility-layer element.
    pub fn validate(&self) -> Result<()> {
        if self.fan_out_threshold == 0 {
            return Err(Error::Config(
                "fanOutThreshold must be at least 1".to_string(),
            ));
        }
        if self.compat_layer_index > self.fan_out_threshold {
            return Err(Error::Config(format!(
                "compatLayerIndex ({}) must not exceed fanOutThreshold ({})",
                self.compat_layer_index, self.fan_out_threshold
            )));
        }
        Ok(())
    }

    /// The termination policy described by this configuration.
    pub fn policy(&self) -> TerminationPolicy {
        TerminationPolicy::new(self.fan_out_threshold, self.compat_layer_index)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Set a field by its JSON name from a string value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value
                .parse()
                .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
        }

        let mut updated = self.clone();
        match key {
            "fanOutThreshold" => updated.fan_out_threshold = parse(key, value)?,
            "compatLayerIndex" => updated.compat_layer_index = parse(key, value)?,
            "settleDelayMs" => updated.settle_delay_ms = parse(key, value)?,
            "snapshotRetries" => updated.snapshot_retries = parse(key, value)?,
            "retryIntervalMs" => updated.retry_interval_ms = parse(key, value)?,
            "lenientSnapshot" => updated.lenient_snapshot = parse(key, value)?,
            _ => return Err(Error::Config(format!("Unknown configuration key: {}", key))),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

/// Configuration store for managing settings.
///
/// Handles reading and writing configuration to `~/.proctree/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.proctree/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_path = home.join(".proctree").join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;

        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }

    /// Load, set one field, and save.
    pub async fn set(&self, key: &str, value: &str) -> Result<Config> {
        let mut config = self.load().await?;
        config.set(key, value)?;
        self.save(&config).await?;
        Ok(config)
    }

    /// Overwrite the stored configuration with defaults.
    pub async fn reset(&self) -> Result<Config> {
        let config = Config::default();
        self.save(&config).await?;
        Ok(config)
    }
}
