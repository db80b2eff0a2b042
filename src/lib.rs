pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod utils;

// Driver modules (point to project root drivers via path attribute) / 驱动模块
#[path = "../drivers/mod.rs"]
pub mod drivers;

pub use drivers::gcs::{signed_url, GcsClient, GcsConfig};
pub use drivers::memory::MemoryClient;
pub use error::{Result, StorageError};
pub use storage::{
    BucketHandle, ClientBox, ObjectHandle, ObjectIterator, StorageClient, StorageManager,
};
pub use utils::{bucket_name, new_identifier, object_key, object_key_or_empty, parse_object_uri, ObjectUri};

// Register all storage drivers / 注册所有存储驱动
pub async fn register_storage_drivers(manager: &StorageManager) {
    drivers::register_all(manager).await
}
