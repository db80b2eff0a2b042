//! GCS驱动工厂

use serde_json::Value;

use super::config::{process_env, EnvLookup, GcsConfig};
use super::driver::GcsClient;
use crate::error::{Result, StorageError};
use crate::storage::{ClientFactory, StorageClient};

/// GCS驱动工厂
///
/// 挂载配置覆盖在 GCS_* 环境变量之上。
pub struct GcsClientFactory {
    env: EnvLookup,
}

impl Default for GcsClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl GcsClientFactory {
    pub fn new() -> Self {
        Self { env: process_env }
    }

    /// 使用自定义环境变量来源
    pub fn with_env(env: EnvLookup) -> Self {
        Self { env }
    }
}

impl ClientFactory for GcsClientFactory {
    fn driver_type(&self) -> &'static str {
        "gcs"
    }

    fn create_client(&self, config: Value) -> Result<Box<dyn StorageClient>> {
        let config = GcsConfig::from_value(config, self.env)
            .map_err(|e| StorageError::Config(format!("配置解析失败: {}", e)))?;
        Ok(Box::new(GcsClient::with_config(config)?))
    }
}
