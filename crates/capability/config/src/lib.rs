//! 应用运行配置加载。
//!
//! 全部来自 `GWC_*` 环境变量，每一项都有默认值；
//! 未设置 `GWC_DATABASE_URL` 时使用内存存储。

use std::env;
use std::time::Duration;

/// 默认监听地址
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";
/// 默认单次存储操作超时（毫秒）
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
/// 默认请求体上限（4 MiB）
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
/// 默认数据库连接池大小
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    /// 为空时使用内存存储
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub store_timeout_ms: u64,
    pub max_body_bytes: usize,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置（测试时避免改动进程环境）。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_addr = read_optional(&lookup, "GWC_HTTP_ADDR")
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let database_url = read_optional(&lookup, "GWC_DATABASE_URL");
        let db_max_connections = read_u32_with_default(
            &lookup,
            "GWC_DB_MAX_CONNECTIONS",
            DEFAULT_DB_MAX_CONNECTIONS,
        )?;
        let store_timeout_ms =
            read_u64_with_default(&lookup, "GWC_STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS)?;
        if store_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "GWC_STORE_TIMEOUT_MS".to_string(),
                "0".to_string(),
            ));
        }
        let max_body_bytes =
            read_u64_with_default(&lookup, "GWC_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES as u64)?
                as usize;

        Ok(Self {
            http_addr,
            database_url,
            db_max_connections,
            store_timeout_ms,
            max_body_bytes,
        })
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

fn read_u32_with_default<F>(lookup: &F, key: &str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = read_optional(lookup, key) else {
        return Ok(default);
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = read_optional(lookup, key) else {
        return Ok(default);
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}
