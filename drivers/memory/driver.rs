use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::{Result, StorageError};
use crate::storage::{paginate, validate_expiration, ObjectHandle, ObjectIterator, ObjectPage, StorageClient};
use crate::utils::new_identifier;

const DEFAULT_PAGE_SIZE: usize = 1000;

/// In-memory storage client / 内存存储客户端
///
/// Listing keeps insertion order. Clones share the same buckets.
#[derive(Clone)]
pub struct MemoryClient {
    buckets: Arc<RwLock<HashMap<String, Vec<ObjectHandle>>>>,
    page_size: usize,
    fail_after_pages: Option<usize>,
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClient {
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            page_size: DEFAULT_PAGE_SIZE,
            fail_after_pages: None,
        }
    }

    /// Objects per listing page / 每页对象数
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Make every listing fail once `pages` pages were served / 注入列表失败
    pub fn fail_listing_after(mut self, pages: usize) -> Self {
        self.fail_after_pages = Some(pages);
        self
    }

    /// Create an empty bucket / 创建空存储桶
    pub fn create_bucket(&self, bucket: &str) {
        self.buckets.write().entry(bucket.to_string()).or_default();
    }

    /// Insert or replace an object / 写入对象
    pub fn insert(&self, bucket: &str, key: &str, size: u64) {
        let mut buckets = self.buckets.write();
        let objects = buckets.entry(bucket.to_string()).or_default();

        let mut handle = ObjectHandle::new(bucket, key);
        handle.size = Some(size);
        handle.updated = Some(Utc::now().to_rfc3339());

        match objects.iter_mut().find(|o| o.name == key) {
            Some(existing) => *existing = handle,
            None => objects.push(handle),
        }
    }

    /// Read the expiry back out of a URL produced by `signed_url` / 解析签名URL的过期时间
    pub fn decode_expiration(signed_url: &str) -> Option<DateTime<Utc>> {
        let url = Url::parse(signed_url).ok()?;
        let (_, expires) = url.query_pairs().find(|(k, _)| k == "expires")?;
        DateTime::from_timestamp(expires.parse().ok()?, 0)
    }

    fn list_page(&self, bucket: &str, prefix: &str, token: Option<String>) -> Result<ObjectPage> {
        let start = match token {
            Some(t) => t
                .parse::<usize>()
                .map_err(|_| StorageError::Iteration(format!("Invalid page token: {}", t)))?,
            None => 0,
        };

        let buckets = self.buckets.read();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::Iteration(format!("Bucket not found: {}", bucket)))?;

        let mut items: Vec<ObjectHandle> = objects
            .iter()
            .filter(|o| o.name.starts_with(prefix))
            .skip(start)
            .take(self.page_size + 1)
            .cloned()
            .collect();

        let next_token = if items.len() > self.page_size {
            items.truncate(self.page_size);
            Some((start + self.page_size).to_string())
        } else {
            None
        };

        Ok(ObjectPage { items, next_token })
    }
}

#[async_trait]
impl StorageClient for MemoryClient {
    fn name(&self) -> &str {
        "memory"
    }

    fn objects(&self, bucket: &str, prefix: &str) -> ObjectIterator {
        let client = self.clone();
        let bucket = bucket.to_string();
        let prefix = prefix.to_string();
        let mut served = 0usize;

        paginate(move |token| {
            let result = if client.fail_after_pages.is_some_and(|n| served >= n) {
                Err(StorageError::Iteration(format!("Listing failed after {} pages", served)))
            } else {
                client.list_page(&bucket, &prefix, token)
            };
            served += 1;
            std::future::ready(result)
        })
    }

    async fn signed_url(&self, bucket: &str, object: &str, expiration: Duration) -> Result<String> {
        if bucket.is_empty() || object.is_empty() {
            return Err(StorageError::Signing(
                "Bucket and object names must not be empty".to_string(),
            ));
        }
        let expiry_secs = validate_expiration(expiration)?;
        let expires = Utc::now() + chrono::Duration::seconds(i64::from(expiry_secs));

        let mut url = Url::parse("memory://localhost/")
            .map_err(|e| StorageError::Signing(e.to_string()))?;
        url.set_host(Some(bucket))
            .map_err(|e| StorageError::Signing(format!("Invalid bucket name {}: {}", bucket, e)))?;
        url.set_path(object);
        url.query_pairs_mut()
            .append_pair("method", "GET")
            .append_pair("expires", &expires.timestamp().to_string())
            .append_pair("token", &new_identifier());

        Ok(url.to_string())
    }
}
