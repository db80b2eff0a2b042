//! Storage error taxonomy / 存储错误类型
//!
//! Every failure propagates to the immediate caller; nothing here retries.

use thiserror::Error;

/// Storage layer error / 存储层错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// Malformed URI / URI格式错误
    #[error("Invalid URI `{uri}`: {reason}")]
    Parse { uri: String, reason: String },

    /// Client construction or credential resolution failed / 客户端创建失败
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Signed URL generation failed / 签名URL生成失败
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Object listing failed mid-traversal / 列举对象失败
    #[error("Listing failed: {0}")]
    Iteration(String),

    #[error("Driver type not found: {0}")]
    UnknownDriver(String),

    #[error("No client mounted for scheme: {0}")]
    UnsupportedScheme(String),

    /// Driver configuration rejected / 驱动配置无效
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl StorageError {
    pub fn parse(uri: &str, reason: impl ToString) -> Self {
        Self::Parse {
            uri: uri.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = StorageError> = std::result::Result<T, E>;
