//! GCS驱动核心实现
//!
//! 通过GCS的S3兼容XML API访问，签名与分页完全交给rust-s3：
//! - 句柄只是名称，不发起网络请求
//! - 列表按需分页拉取
//! - 预签名GET直链

use std::time::Duration;

use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::Region;

use super::config::{process_env, EnvLookup, GcsConfig};
use crate::error::{Result, StorageError};
use crate::storage::{
    failed_iterator, paginate, validate_expiration, ObjectHandle, ObjectIterator, ObjectPage,
    StorageClient,
};

/// GCS客户端
pub struct GcsClient {
    config: GcsConfig,
    region: Region,
    credentials: Credentials,
}

impl GcsClient {
    /// 使用环境中的凭证创建客户端
    ///
    /// Credentials are HMAC keys (GCS_ACCESS_KEY_ID / GCS_SECRET_ACCESS_KEY) or
    /// whatever rust-s3's AWS-style chain finds. A service-account JSON file
    /// (GOOGLE_APPLICATION_CREDENTIALS) alone is not read and yields `Connection`.
    pub fn new(project_id: Option<&str>) -> Result<Self> {
        Self::with_env(project_id, process_env)
    }

    /// 使用指定的环境变量来源创建客户端
    pub fn with_env(project_id: Option<&str>, env: EnvLookup) -> Result<Self> {
        let mut config = GcsConfig::from_lookup(env);
        if let Some(id) = project_id.filter(|id| !id.is_empty()) {
            config.project_id = Some(id.to_string());
        }
        Self::with_config(config)
    }

    /// 使用显式配置创建客户端
    pub fn with_config(config: GcsConfig) -> Result<Self> {
        let credentials = Self::resolve_credentials(&config)?;
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        };

        tracing::info!(
            endpoint = %config.endpoint,
            project = ?config.project_id,
            "GCS client initialized"
        );

        Ok(Self {
            config,
            region,
            credentials,
        })
    }

    /// 静态密钥优先，否则走rust-s3的凭证链（环境变量、profile、实例元数据）
    ///
    /// The fallback chain is blocking and may query instance metadata over HTTP.
    fn resolve_credentials(config: &GcsConfig) -> Result<Credentials> {
        let credentials = if config.has_static_credentials() {
            Credentials::new(
                Some(config.access_key_id.as_str()),
                Some(config.secret_access_key.as_str()),
                if config.session_token.is_empty() { None } else { Some(config.session_token.as_str()) },
                None,
                None,
            )
        } else {
            Credentials::new(None, None, None, None, None)
        };

        credentials.map_err(|e| StorageError::Connection(format!("Failed to resolve credentials: {}", e)))
    }

    pub fn project_id(&self) -> Option<&str> {
        self.config.project_id.as_deref()
    }

    pub fn config(&self) -> &GcsConfig {
        &self.config
    }

    /// 创建Bucket客户端（本地构造，不发请求）
    fn open_bucket(&self, name: &str) -> Result<Box<Bucket>, S3Error> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())?;
        Ok(if self.config.force_path_style {
            bucket.with_path_style()
        } else {
            bucket
        })
    }
}

#[async_trait]
impl StorageClient for GcsClient {
    fn name(&self) -> &str {
        "gcs"
    }

    fn objects(&self, bucket: &str, prefix: &str) -> ObjectIterator {
        let handle = match self.open_bucket(bucket) {
            Ok(handle) => handle,
            Err(e) => {
                return failed_iterator(StorageError::Iteration(format!(
                    "Failed to open bucket {}: {}",
                    bucket, e
                )))
            }
        };
        let bucket = bucket.to_string();
        let prefix = prefix.to_string();

        paginate(move |token| {
            let handle = handle.clone();
            let bucket = bucket.clone();
            let prefix = prefix.clone();
            async move {
                tracing::debug!("GCS list page: bucket={}, prefix={}, token={:?}", bucket, prefix, token);

                let (page, _) = handle
                    .list_page(prefix.clone(), None, token, None, None)
                    .await
                    .map_err(|e| {
                        tracing::warn!("GCS list failed: bucket={}, prefix={}, error={}", bucket, prefix, e);
                        StorageError::Iteration(format!("Failed to list gs://{}/{}: {}", bucket, prefix, e))
                    })?;

                let next_token = if page.is_truncated {
                    page.next_continuation_token
                } else {
                    None
                };
                let items = page
                    .contents
                    .into_iter()
                    .map(|obj| ObjectHandle {
                        bucket: bucket.clone(),
                        name: obj.key,
                        size: Some(obj.size),
                        updated: Some(obj.last_modified),
                        etag: obj.e_tag,
                    })
                    .collect();

                Ok::<_, StorageError>(ObjectPage { items, next_token })
            }
        })
    }

    async fn signed_url(&self, bucket: &str, object: &str, expiration: Duration) -> Result<String> {
        if bucket.is_empty() || object.is_empty() {
            return Err(StorageError::Signing(
                "Bucket and object names must not be empty".to_string(),
            ));
        }
        let expiry_secs = validate_expiration(expiration)?;

        let handle = self
            .open_bucket(bucket)
            .map_err(|e| StorageError::Signing(format!("Failed to open bucket {}: {}", bucket, e)))?;

        let url = handle
            .presign_get(format!("/{}", object), expiry_secs, None)
            .await
            .map_err(|e| StorageError::Signing(format!("Failed to sign gs://{}/{}: {}", bucket, object, e)))?;

        tracing::debug!("GCS signed URL generated: bucket={}, object={}, expires_in={}s", bucket, object, expiry_secs);
        Ok(url)
    }
}
