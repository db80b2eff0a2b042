/// URI and identifier utility functions / URI与标识符工具函数

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, StorageError};

/// Bucket/object location decomposed from `scheme://bucket/key` / 对象位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectUri {
    pub scheme: String,
    pub bucket: String,
    pub key: String,
}

fn parse_uri(uri: &str) -> Result<Url> {
    Url::parse(uri).map_err(|e| StorageError::parse(uri, e))
}

/// Percent-decode the path and strip a single leading `/` / 解码路径并去掉一个前导斜杠
fn key_from_url(uri: &str, url: &Url) -> Result<String> {
    let decoded = urlencoding::decode(url.path()).map_err(|e| StorageError::parse(uri, e))?;
    Ok(decoded
        .strip_prefix('/')
        .unwrap_or(&*decoded)
        .to_string())
}

/// Parse a URI into scheme, bucket and object key in one pass / 一次解析出全部字段
pub fn parse_object_uri(uri: &str) -> Result<ObjectUri> {
    let url = parse_uri(uri)?;
    Ok(ObjectUri {
        scheme: url.scheme().to_string(),
        bucket: url.host_str().unwrap_or("").to_string(),
        key: key_from_url(uri, &url)?,
    })
}

/// Extract the object key (path without leading `/`) / 提取对象键
/// "gs://reports/2024/jan/summary.csv" -> "2024/jan/summary.csv"
pub fn object_key(uri: &str) -> Result<String> {
    let url = parse_uri(uri)?;
    key_from_url(uri, &url)
}

/// Like [`object_key`], but logs and returns "" on failure.
/// Callers cannot tell an empty path from a parse failure here; prefer `object_key`.
pub fn object_key_or_empty(uri: &str) -> String {
    match object_key(uri) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!("Failed to extract object key: {}", e);
            String::new()
        }
    }
}

/// Extract the bucket name (host component, verbatim) / 提取存储桶名称
/// A URI without a host yields an empty name.
pub fn bucket_name(uri: &str) -> Result<String> {
    let url = parse_uri(uri)?;
    Ok(url.host_str().unwrap_or("").to_string())
}

/// Random UUID v4 string, usable as a correlation id or object name / 生成随机标识符
pub fn new_identifier() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_uri() {
        let parsed = parse_object_uri("gs://reports/2024/jan/summary.csv").unwrap();
        assert_eq!(parsed.scheme, "gs");
        assert_eq!(parsed.bucket, "reports");
        assert_eq!(parsed.key, "2024/jan/summary.csv");

        assert_eq!(bucket_name("gs://my-bucket/path/to/object.txt").unwrap(), "my-bucket");
        assert_eq!(object_key("gs://my-bucket/path/to/object.txt").unwrap(), "path/to/object.txt");
    }

    #[test]
    fn test_object_key_edge_cases() {
        assert_eq!(object_key("gs://bucket").unwrap(), "");
        assert_eq!(object_key("gs://bucket/").unwrap(), "");
        // Only one leading separator is stripped / 只去掉一个斜杠
        assert_eq!(object_key("gs://bucket//nested/key").unwrap(), "/nested/key");
        assert_eq!(object_key("gs://bucket/dir/a%20b.txt").unwrap(), "dir/a b.txt");
        assert_eq!(object_key("s3://bucket/logs/").unwrap(), "logs/");
    }

    #[test]
    fn test_hostless_uri() {
        assert_eq!(bucket_name("unix:/run/foo.socket").unwrap(), "");
        assert_eq!(object_key("unix:/run/foo.socket").unwrap(), "run/foo.socket");
    }

    #[test]
    fn test_malformed_uri() {
        assert!(matches!(bucket_name("not a url"), Err(StorageError::Parse { .. })));
        assert!(matches!(object_key("not a url"), Err(StorageError::Parse { .. })));
        assert!(parse_object_uri("").is_err());
        assert_eq!(object_key_or_empty("not a url"), "");
        assert_eq!(object_key_or_empty("gs://b/k"), "k");
    }

    #[test]
    fn test_new_identifier() {
        let a = new_identifier();
        let b = new_identifier();
        assert_ne!(a, b);

        for id in [&a, &b] {
            assert_eq!(id.len(), 36);
            let chars: Vec<char> = id.chars().collect();
            for pos in [8, 13, 18, 23] {
                assert_eq!(chars[pos], '-');
            }
            assert_eq!(chars[14], '4');
            assert!(matches!(chars[19], '8' | '9' | 'a' | 'b'));
            assert_eq!(uuid::Uuid::parse_str(id).unwrap().get_version_num(), 4);
        }
    }
}
