//! 应用运行配置加载。

use mms_protocol::ReadoutGap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 存储后端。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// 进程内存储（本地演示与回放核对）
    Memory,
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    /// `storage = postgres` 时必填
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub storage_timeout: Duration,
    pub mqtt_enabled: bool,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_topic_prefix: String,
    pub mqtt_client_id: String,
    /// MQTT 帧中保留字节的位置
    pub mqtt_readout_gap: ReadoutGap,
    pub file_logs: Vec<PathBuf>,
    pub file_log_marker: String,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置（`from_env` 的底层实现）。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);
        let storage = match vars.get("MMS_STORAGE") {
            None => StorageBackend::Postgres,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "postgres" | "postgresql" => StorageBackend::Postgres,
                "memory" => StorageBackend::Memory,
                _ => return Err(ConfigError::Invalid("MMS_STORAGE".to_string(), value)),
            },
        };
        let database_url = vars.optional("MMS_DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("MMS_DATABASE_URL".to_string()));
        }
        let db_max_connections = vars.u32_with_default("MMS_DB_MAX_CONNECTIONS", 8)?;
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid(
                "MMS_DB_MAX_CONNECTIONS".to_string(),
                "0".to_string(),
            ));
        }
        let storage_timeout_ms = vars.u64_with_default("MMS_STORAGE_TIMEOUT_MS", 5_000)?;
        if storage_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "MMS_STORAGE_TIMEOUT_MS".to_string(),
                "0".to_string(),
            ));
        }
        let mqtt_enabled = vars.bool_with_default("MMS_MQTT_ENABLED", true);
        let mqtt_host = vars.get("MMS_MQTT_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let mqtt_port = vars.u16_with_default("MMS_MQTT_PORT", 1883)?;
        let mqtt_username = vars.optional("MMS_MQTT_USERNAME");
        let mqtt_password = vars.optional("MMS_MQTT_PASSWORD");
        let mqtt_topic_prefix = vars
            .get("MMS_MQTT_TOPIC_PREFIX")
            .unwrap_or_else(|| "fornalab".to_string());
        let mqtt_client_id = vars
            .optional("MMS_MQTT_CLIENT_ID")
            .unwrap_or_else(|| "mms-ingest".to_string());
        let mqtt_readout_gap = match vars.optional("MMS_MQTT_READOUT_GAP") {
            None => ReadoutGap::AfterCount,
            Some(value) => value
                .parse::<ReadoutGap>()
                .map_err(|_| ConfigError::Invalid("MMS_MQTT_READOUT_GAP".to_string(), value))?,
        };
        let file_logs = vars
            .optional("MMS_FILE_LOGS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|path| !path.is_empty())
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default();
        let file_log_marker = vars
            .get("MMS_FILE_LOG_MARKER")
            .unwrap_or_else(|| "INFO b'".to_string());

        Ok(Self {
            storage,
            database_url,
            db_max_connections,
            storage_timeout: Duration::from_millis(storage_timeout_ms),
            mqtt_enabled,
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_topic_prefix,
            mqtt_client_id,
            mqtt_readout_gap,
            file_logs,
            file_log_marker,
        })
    }
}

struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.get(key).filter(|value| !value.is_empty())
    }

    fn u16_with_default(&self, key: &str, default: u16) -> Result<u16, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        value
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value))
    }

    fn u32_with_default(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        value
            .parse::<u32>()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value))
    }

    fn u64_with_default(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        value
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value))
    }

    fn bool_with_default(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
            None => default,
        }
    }
}
