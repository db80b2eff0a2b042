//! GCS驱动配置

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 环境变量读取函数（测试中可替换）
pub type EnvLookup = fn(&str) -> Option<String>;

/// 读取进程环境变量
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// GCS配置（XML API，HMAC密钥）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcsConfig {
    /// 端点地址
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// 签名区域，GCS使用 "auto"
    #[serde(default = "default_region")]
    pub region: String,
    /// HMAC Access Key，留空则从环境解析
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// Session Token（用于临时凭证）
    #[serde(default)]
    pub session_token: String,
    /// 项目ID（可选）
    #[serde(default)]
    pub project_id: Option<String>,
    /// 强制使用路径风格（而非虚拟主机风格）
    #[serde(default = "default_path_style")]
    pub force_path_style: bool,
}

fn default_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_path_style() -> bool {
    true
}

impl Default for GcsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            region: default_region(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: String::new(),
            project_id: None,
            force_path_style: default_path_style(),
        }
    }
}

impl GcsConfig {
    /// Defaults overlaid with GCS_* / GOOGLE_CLOUD_PROJECT environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(process_env)
    }

    /// 以环境变量为基础，挂载配置中显式给出的字段覆盖之
    ///
    /// `null` 与 `{}` 等价，都只使用环境变量。
    pub fn from_value(value: Value, env: EnvLookup) -> Result<Self, serde_json::Error> {
        let base = Self::from_lookup(env);
        let overrides = match value {
            Value::Null => return Ok(base),
            Value::Object(overrides) => overrides,
            other => {
                return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                    "GCS config must be an object, got {}",
                    other
                )))
            }
        };

        let mut merged = serde_json::to_value(base)?;
        if let Value::Object(fields) = &mut merged {
            fields.extend(overrides);
        }
        serde_json::from_value(merged)
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = var("GCS_ENDPOINT") {
            config.endpoint = v;
        }
        if let Some(v) = var("GCS_REGION") {
            config.region = v;
        }
        if let Some(v) = var("GCS_ACCESS_KEY_ID") {
            config.access_key_id = v;
        }
        if let Some(v) = var("GCS_SECRET_ACCESS_KEY") {
            config.secret_access_key = v;
        }
        if let Some(v) = var("GCS_SESSION_TOKEN") {
            config.session_token = v;
        }
        config.project_id = var("GOOGLE_CLOUD_PROJECT");
        if let Some(v) = var("GCS_FORCE_PATH_STYLE") {
            config.force_path_style = matches!(v.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        config
    }

    /// 是否配置了静态密钥
    pub fn has_static_credentials(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config: GcsConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(config.endpoint, "https://storage.googleapis.com");
        assert_eq!(config.region, "auto");
        assert!(config.force_path_style);
        assert!(config.project_id.is_none());
        assert!(!config.has_static_credentials());
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("GCS_ACCESS_KEY_ID", "GOOG1EXAMPLE"),
            ("GCS_SECRET_ACCESS_KEY", "secret"),
            ("GOOGLE_CLOUD_PROJECT", "demo-project"),
            ("GCS_FORCE_PATH_STYLE", "false"),
            ("GCS_REGION", "  "),
        ]
        .into_iter()
        .collect();

        let config = GcsConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()));
        assert!(config.has_static_credentials());
        assert_eq!(config.project_id.as_deref(), Some("demo-project"));
        assert!(!config.force_path_style);
        // Blank values are ignored / 空值忽略
        assert_eq!(config.region, "auto");
    }

    fn hmac_env(name: &str) -> Option<String> {
        match name {
            "GCS_ACCESS_KEY_ID" => Some("GOOG1EXAMPLE".to_string()),
            "GCS_SECRET_ACCESS_KEY" => Some("secret".to_string()),
            "GOOGLE_CLOUD_PROJECT" => Some("env-project".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_from_value_keeps_env() {
        let empty = GcsConfig::from_value(serde_json::json!({}), hmac_env).unwrap();
        let null = GcsConfig::from_value(Value::Null, hmac_env).unwrap();
        for config in [&empty, &null] {
            assert!(config.has_static_credentials());
            assert_eq!(config.access_key_id, "GOOG1EXAMPLE");
            assert_eq!(config.project_id.as_deref(), Some("env-project"));
            assert_eq!(config.endpoint, "https://storage.googleapis.com");
        }

        // Explicit keys win over the environment / 显式字段覆盖环境变量
        let config = GcsConfig::from_value(
            serde_json::json!({ "project_id": "demo", "force_path_style": false }),
            hmac_env,
        )
        .unwrap();
        assert!(config.has_static_credentials());
        assert_eq!(config.project_id.as_deref(), Some("demo"));
        assert!(!config.force_path_style);
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(GcsConfig::from_value(serde_json::json!("gs"), hmac_env).is_err());
        assert!(GcsConfig::from_value(serde_json::json!({ "force_path_style": "sometimes" }), hmac_env).is_err());
    }
}
