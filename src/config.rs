//! Configuration module / 配置模块
//!
//! Loads mounts and the log filter from a JSON file. A missing file means
//! defaults: `gs://` served by the GCS driver with ambient credentials.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration / 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default tracing filter, overridden by RUST_LOG / 默认日志过滤
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Scheme -> driver mounts / 协议挂载
    #[serde(default = "default_mounts")]
    pub mounts: Vec<MountConfig>,
}

/// One mounted client / 单个挂载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    /// URI scheme, e.g. "gs" / URI协议
    pub scheme: String,
    /// Driver type registered with the StorageManager / 驱动类型
    pub driver: String,
    /// Driver specific configuration / 驱动配置
    #[serde(default)]
    pub config: serde_json::Value,
}

fn default_log_filter() -> String {
    "bucketkit=info".to_string()
}

fn default_mounts() -> Vec<MountConfig> {
    vec![MountConfig {
        scheme: "gs".to_string(),
        driver: "gcs".to_string(),
        config: serde_json::json!({}),
    }]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            mounts: default_mounts(),
        }
    }
}

/// Load configuration from file, or defaults if it does not exist / 加载配置文件
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();

    if !path.exists() {
        tracing::info!("No config file at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;
    let config: AppConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file {:?}", path))?;

    tracing::info!("Loaded configuration from {:?}", path);
    Ok(config)
}
