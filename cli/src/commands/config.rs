//! Config command - show or change configuration.

use anyhow::Result;
use proctree_core::{Config, ConfigStore};

use super::output::print_json;

pub async fn show(json: bool) -> Result<()> {
    let config = ConfigStore::new()?.load().await?;
    print_config(&config, json)
}

pub async fn set(key: &str, value: &str, json: bool) -> Result<()> {
    let config = ConfigStore::new()?.set(key, value).await?;
    print_config(&config, json)
}

pub async fn reset(json: bool) -> Result<()> {
    let config = ConfigStore::new()?.reset().await?;
    print_config(&config, json)
}

pub fn path() -> Result<()> {
    println!("{}", ConfigStore::new()?.path().display());
    Ok(())
}

fn print_config(config: &Config, json: bool) -> Result<()> {
    if json {
        return print_json(config);
    }

    println!("fanOutThreshold   {}", config.fan_out_threshold);
    println!("compatLayerIndex  {}", config.compat_layer_index);
    println!("settleDelayMs     {}", config.settle_delay_ms);
    println!("snapshotRetries   {}", config.snapshot_retries);
    println!("retryIntervalMs   {}", config.retry_interval_ms);
    println!("lenientSnapshot   {}", config.lenient_snapshot);
    Ok(())
}
