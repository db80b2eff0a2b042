use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use crate::error::{Result, StorageError};

/// Longest validity a signed URL may carry (7 days) / 签名URL最长有效期
pub const MAX_SIGNED_URL_EXPIRATION: Duration = Duration::from_secs(7 * 24 * 3600);

/// Bucket handle (a name, not a live connection) / 存储桶句柄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketHandle {
    pub name: String,
}

impl BucketHandle {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }

    /// Handle to an object inside this bucket / 桶内对象句柄
    pub fn object(&self, name: &str) -> ObjectHandle {
        ObjectHandle::new(&self.name, name)
    }
}

/// Object handle / 对象句柄
///
/// Handles returned by listings carry the metadata the provider sent along;
/// handles built from names alone leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectHandle {
    pub bucket: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modified time as reported by the provider / 最后修改时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl ObjectHandle {
    pub fn new(bucket: &str, name: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            name: name.to_string(),
            size: None,
            updated: None,
            etag: None,
        }
    }

    /// Render back to `scheme://bucket/name` / 还原为URI
    pub fn uri(&self, scheme: &str) -> String {
        format!("{}://{}/{}", scheme, self.bucket, self.name)
    }
}

/// Lazy, single-pass object listing / 惰性对象迭代器
///
/// A failed page fetch yields one `Err` and ends the stream.
pub type ObjectIterator = BoxStream<'static, Result<ObjectHandle>>;

/// One page of a listing / 列表分页
#[derive(Debug, Default)]
pub struct ObjectPage {
    pub items: Vec<ObjectHandle>,
    /// Continuation token, None on the last page / 续页令牌
    pub next_token: Option<String>,
}

struct PageCursor<F> {
    fetch: F,
    buffer: VecDeque<ObjectHandle>,
    token: Option<String>,
    done: bool,
}

async fn next_item<F, Fut>(mut cursor: PageCursor<F>) -> Result<Option<(ObjectHandle, PageCursor<F>)>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ObjectPage>>,
{
    loop {
        if let Some(item) = cursor.buffer.pop_front() {
            return Ok(Some((item, cursor)));
        }
        if cursor.done {
            return Ok(None);
        }
        let page = (cursor.fetch)(cursor.token.take()).await?;
        cursor.done = page.next_token.is_none();
        cursor.token = page.next_token;
        cursor.buffer.extend(page.items);
    }
}

/// Turn a page fetcher into an [`ObjectIterator`] / 将分页拉取函数转换为迭代器
///
/// `fetch` receives the previous page's continuation token (None first) and is
/// only called when the caller has drained the buffered page.
pub fn paginate<F, Fut>(fetch: F) -> ObjectIterator
where
    F: FnMut(Option<String>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<ObjectPage>> + Send + 'static,
{
    let cursor = PageCursor {
        fetch,
        buffer: VecDeque::new(),
        token: None,
        done: false,
    };
    stream::try_unfold(cursor, next_item::<F, Fut>).boxed()
}

/// Iterator that fails immediately / 立即失败的迭代器
pub fn failed_iterator(err: StorageError) -> ObjectIterator {
    stream::once(async move { Err(err) }).boxed()
}

/// Check a signed URL lifetime and convert it to whole seconds (rounded up) / 校验过期时间
pub fn validate_expiration(expiration: Duration) -> Result<u32> {
    if expiration.is_zero() {
        return Err(StorageError::Signing("Expiration must be positive".to_string()));
    }
    let secs = expiration.as_secs() + u64::from(expiration.subsec_nanos() > 0);
    if secs > MAX_SIGNED_URL_EXPIRATION.as_secs() {
        return Err(StorageError::Signing(format!(
            "Expiration {}s exceeds maximum of {}s",
            secs,
            MAX_SIGNED_URL_EXPIRATION.as_secs()
        )));
    }
    Ok(secs as u32)
}

/// Storage client interface / 存储客户端接口
///
/// Wraps one provider session. Implementations must be safe to call
/// concurrently; each call is independent of the others.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Driver name / 驱动名称
    fn name(&self) -> &str;

    /// Handle to a bucket. Validation is deferred to first use by default / 获取存储桶句柄
    async fn bucket(&self, bucket: &str) -> Result<BucketHandle> {
        Ok(BucketHandle::new(bucket))
    }

    /// Handle to an object. Validation is deferred to first use by default / 获取对象句柄
    async fn object(&self, bucket: &str, object: &str) -> Result<ObjectHandle> {
        Ok(ObjectHandle::new(bucket, object))
    }

    /// Objects whose keys start with `prefix`, in provider order / 按前缀列出对象
    fn objects(&self, bucket: &str, prefix: &str) -> ObjectIterator;

    /// Time-limited GET URL, valid until now + `expiration` / 生成预签名下载URL
    async fn signed_url(&self, bucket: &str, object: &str, expiration: Duration) -> Result<String>;
}

pub mod manager;

pub use manager::{ClientBox, ClientFactory, StorageManager};
