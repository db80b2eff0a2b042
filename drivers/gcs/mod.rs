//! Google Cloud Storage 驱动

mod config;
mod driver;
mod factory;

use std::time::Duration;

pub use config::{EnvLookup, GcsConfig};
pub use driver::GcsClient;
pub use factory::GcsClientFactory;

use config::process_env;
use crate::error::{Result, StorageError};
use crate::storage::StorageClient;

/// One-shot signed GET URL / 一次性生成签名URL
///
/// Builds a fresh client from ambient credentials on every call. Hold a
/// [`GcsClient`] instead when signing repeatedly. Credentials follow
/// [`GcsClient::new`]: HMAC keys, not a service-account JSON file.
pub async fn signed_url(
    project_id: Option<&str>,
    bucket: &str,
    object: &str,
    expiration: Duration,
) -> Result<String> {
    signed_url_with_env(process_env, project_id, bucket, object, expiration).await
}

pub(crate) async fn signed_url_with_env(
    env: EnvLookup,
    project_id: Option<&str>,
    bucket: &str,
    object: &str,
    expiration: Duration,
) -> Result<String> {
    // 凭证链可能阻塞，放到阻塞线程池中解析
    let project_id = project_id.map(str::to_string);
    let client = tokio::task::spawn_blocking(move || GcsClient::with_env(project_id.as_deref(), env))
        .await
        .map_err(|e| StorageError::Connection(format!("Credential resolution aborted: {}", e)))??;
    client.signed_url(bucket, object, expiration).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hmac_env(name: &str) -> Option<String> {
        match name {
            "GCS_ACCESS_KEY_ID" => Some("GOOG1EXAMPLEKEY".to_string()),
            "GCS_SECRET_ACCESS_KEY" => Some("example-secret".to_string()),
            _ => None,
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[tokio::test]
    async fn test_one_shot_signed_url() {
        let url = signed_url_with_env(
            hmac_env,
            None,
            "reports",
            "2024/jan/summary.csv",
            Duration::from_secs(3600),
        )
        .await
        .unwrap();

        assert!(url.starts_with("https://storage.googleapis.com/reports/"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Credential=GOOG1EXAMPLEKEY"));
    }

    #[tokio::test]
    async fn test_one_shot_signed_url_without_credentials() {
        // rust-s3 falls back to AWS_* variables, which would satisfy the chain
        if std::env::var_os("AWS_ACCESS_KEY_ID").is_some() {
            return;
        }
        let result = signed_url_with_env(no_env, Some("demo"), "reports", "a.csv", Duration::from_secs(60)).await;
        assert!(matches!(result, Err(StorageError::Connection(_))));
    }

    #[tokio::test]
    async fn test_one_shot_signed_url_rejects_expiration() {
        let result = signed_url_with_env(hmac_env, None, "reports", "a.csv", Duration::ZERO).await;
        assert!(matches!(result, Err(StorageError::Signing(_))));
    }
}
