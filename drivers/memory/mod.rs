//! In-memory driver / 内存驱动
//!
//! No network. Substitutes for a real provider in tests and local runs.

mod driver;

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub use driver::MemoryClient;

use crate::error::{Result, StorageError};
use crate::storage::{ClientFactory, StorageClient};

/// Memory driver configuration / 内存驱动配置
#[derive(Debug, Default, Deserialize)]
pub struct MemoryConfig {
    /// bucket -> object keys (size 0) / 预置对象
    #[serde(default)]
    pub buckets: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

pub struct MemoryClientFactory;

impl ClientFactory for MemoryClientFactory {
    fn driver_type(&self) -> &'static str {
        "memory"
    }

    fn create_client(&self, config: Value) -> Result<Box<dyn StorageClient>> {
        let config: MemoryConfig = if config.is_null() {
            MemoryConfig::default()
        } else {
            serde_json::from_value(config).map_err(|e| StorageError::Config(e.to_string()))?
        };

        let mut client = MemoryClient::new();
        if let Some(page_size) = config.page_size {
            client = client.with_page_size(page_size);
        }
        for (bucket, keys) in &config.buckets {
            client.create_bucket(bucket);
            for key in keys {
                client.insert(bucket, key, 0);
            }
        }
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_factory_seeds_buckets() {
        let client = MemoryClientFactory
            .create_client(serde_json::json!({
                "page_size": 1,
                "buckets": { "app": ["logs/a", "logs/b", "logs/c"], "empty": [] }
            }))
            .unwrap();

        let names: Vec<String> = client
            .objects("app", "logs/")
            .map_ok(|o| o.name)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(names, vec!["logs/a", "logs/b", "logs/c"]);

        let empty: Vec<_> = client.objects("empty", "").try_collect().await.unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_factory_rejects_bad_config() {
        let result = MemoryClientFactory.create_client(serde_json::json!({ "page_size": "big" }));
        assert!(matches!(result, Err(StorageError::Config(_))));
    }
}
