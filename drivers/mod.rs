// Driver package / 驱动包
pub mod gcs;
pub mod memory;

use crate::storage::StorageManager;

/// Register all drivers to StorageManager / 注册所有驱动
pub async fn register_all(manager: &StorageManager) {
    // Register Google Cloud Storage driver / 注册GCS驱动
    manager.register_factory(Box::new(gcs::GcsClientFactory::new())).await;
    // Register in-memory driver / 注册内存驱动
    manager.register_factory(Box::new(memory::MemoryClientFactory)).await;
}
