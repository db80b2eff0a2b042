use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::StorageClient;
use crate::config::{AppConfig, MountConfig};
use crate::error::{Result, StorageError};
use crate::utils::{parse_object_uri, ObjectUri};

pub type ClientBox = Arc<dyn StorageClient>;

/// Client factory trait / 客户端工厂 trait
pub trait ClientFactory: Send + Sync {
    /// Driver type name / 驱动类型名称
    fn driver_type(&self) -> &'static str;

    /// 创建客户端实例
    fn create_client(&self, config: Value) -> Result<Box<dyn StorageClient>>;
}

/// Storage manager (one client per URI scheme) / 存储管理器
#[derive(Clone, Default)]
pub struct StorageManager {
    clients: Arc<RwLock<HashMap<String, ClientBox>>>,
    factories: Arc<RwLock<HashMap<String, Arc<dyn ClientFactory>>>>,
}

impl StorageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manager with all built-in drivers registered and the configured
    /// mounts created / 按配置创建管理器
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let manager = Self::new();
        crate::drivers::register_all(&manager).await;
        manager.mount_all(&config.mounts).await?;
        Ok(manager)
    }

    /// Create every configured mount, stopping at the first failure / 批量挂载
    pub async fn mount_all(&self, mounts: &[MountConfig]) -> Result<()> {
        for mount in mounts {
            self.mount(&mount.scheme, &mount.driver, mount.config.clone())
                .await?;
        }
        Ok(())
    }

    /// Register client factory / 注册客户端工厂
    pub async fn register_factory(&self, factory: Box<dyn ClientFactory>) {
        let driver_type = factory.driver_type().to_string();
        let mut factories = self.factories.write().await;
        factories.insert(driver_type.clone(), Arc::from(factory));

        tracing::info!("Driver factory registered: {}", driver_type);
    }

    /// Create a client with the named factory and mount it under `scheme` / 创建并挂载客户端
    pub async fn mount(&self, scheme: &str, driver_type: &str, config: Value) -> Result<()> {
        let factory = {
            let factories = self.factories.read().await;
            factories
                .get(driver_type)
                .cloned()
                .ok_or_else(|| StorageError::UnknownDriver(driver_type.to_string()))?
        };

        match factory.create_client(config) {
            Ok(client) => {
                self.mount_client(scheme, Arc::from(client)).await;
                tracing::info!("Client mounted: {}:// ({})", scheme, driver_type);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Client creation failed: {}:// ({}) - {}", scheme, driver_type, e);
                Err(e)
            }
        }
    }

    /// Mount an existing client (e.g. a fake in tests) / 挂载已有客户端
    pub async fn mount_client(&self, scheme: &str, client: ClientBox) {
        let mut clients = self.clients.write().await;
        if clients.insert(scheme.to_string(), client).is_some() {
            tracing::debug!("Replaced client for scheme: {}", scheme);
        }
    }

    /// Remove client / 移除客户端
    pub async fn unmount(&self, scheme: &str) -> Result<()> {
        let mut clients = self.clients.write().await;
        clients
            .remove(scheme)
            .ok_or_else(|| StorageError::UnsupportedScheme(scheme.to_string()))?;

        tracing::info!("Client unmounted: {}", scheme);
        Ok(())
    }

    /// Get client instance / 获取客户端实例
    pub async fn client(&self, scheme: &str) -> Option<ClientBox> {
        let clients = self.clients.read().await;
        clients.get(scheme).cloned()
    }

    /// List mounted schemes / 列出已挂载的协议
    pub async fn schemes(&self) -> Vec<String> {
        let clients = self.clients.read().await;
        let mut schemes: Vec<String> = clients.keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// List registered driver types / 列出所有可用的驱动类型
    pub async fn driver_types(&self) -> Vec<String> {
        let factories = self.factories.read().await;
        let mut types: Vec<String> = factories.keys().cloned().collect();
        types.sort();
        types
    }

    /// Resolve a URI to its client plus bucket/key / 根据URI解析到对应客户端
    pub async fn resolve(&self, uri: &str) -> Result<(ClientBox, ObjectUri)> {
        let parsed = parse_object_uri(uri)?;
        let client = self
            .client(&parsed.scheme)
            .await
            .ok_or_else(|| StorageError::UnsupportedScheme(parsed.scheme.clone()))?;
        Ok((client, parsed))
    }
}
